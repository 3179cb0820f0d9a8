//! Quality tag detection from listing titles.

/// Quality patterns in priority order. The first pattern found in the
/// title wins, so more specific tags ("DVDRip") precede their prefixes
/// ("DVD").
const QUALITY_PATTERNS: &[&str] = &[
    "4K", "2160p", "1080p", "720p", "BDRip", "HDRip", "WEB-DL", "BluRay", "HDTV", "DVDRip", "DVD",
    "UHD", "HDR",
];

/// Detect the quality tag of a listing title. Returns "Unknown" when no
/// pattern matches. Case-sensitive, matching release-name conventions.
pub fn detect_quality(name: &str) -> &'static str {
    QUALITY_PATTERNS
        .iter()
        .find(|p| name.contains(*p))
        .copied()
        .unwrap_or("Unknown")
}
