//! Human-readable size and ETA formatting for progress views.

const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with 1024-based units and two decimals.
/// Zero is special-cased as "0 B".
pub fn format_size(size_bytes: u64) -> String {
    if size_bytes == 0 {
        return "0 B".to_string();
    }
    let mut size = size_bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

/// Format a duration in seconds as "H:MM:SS" (zero-padded).
pub fn format_eta(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// ETA string for the remaining bytes at the given rate, or `None`
/// when the rate is zero (unknown).
pub fn eta_for(remaining_bytes: u64, rate_bps: u64) -> Option<String> {
    if rate_bps == 0 {
        return None;
    }
    Some(format_eta(remaining_bytes / rate_bps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_zero() {
        assert_eq!(format_size(0), "0 B");
    }

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(512), "512.00 B");
    }

    #[test]
    fn test_format_size_kilobytes() {
        assert_eq!(format_size(1536), "1.50 KB");
    }

    #[test]
    fn test_format_size_gigabytes() {
        assert_eq!(format_size(1024 * 1024 * 1024), "1.00 GB");
    }

    #[test]
    fn test_format_size_caps_at_terabytes() {
        assert_eq!(format_size(1024u64.pow(5)), "1024.00 TB");
    }

    #[test]
    fn test_format_eta() {
        assert_eq!(format_eta(0), "00:00:00");
        assert_eq!(format_eta(59), "00:00:59");
        assert_eq!(format_eta(3661), "01:01:01");
        assert_eq!(format_eta(100 * 3600), "100:00:00");
    }

    #[test]
    fn test_eta_for() {
        assert_eq!(eta_for(1024, 0), None);
        assert_eq!(eta_for(7200, 2).as_deref(), Some("01:00:00"));
    }
}
