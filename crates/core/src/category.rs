//! Filename -> storage category classifier.
//!
//! The storage tree keeps one directory per category; every filed payload
//! lands in the bucket its extension maps to.

/// All category buckets, in storage-tree order. Used to bootstrap the
/// category directories on startup.
pub const ALL_CATEGORIES: &[&str] = &[
    "images",
    "videos",
    "audio",
    "torrents",
    "documents",
    "scripts",
    "code",
    "archives",
    "executables",
    "databases",
    "other",
];

const IMAGES: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "svg", "bmp", "webp", "tiff", "ico", "ai", "psd", "xcf", "eps",
];
const VIDEOS: &[&str] = &[
    "mp4", "avi", "mov", "webm", "mkv", "flv", "3gp", "wmv", "mpg", "mpeg", "m4v",
];
const AUDIO: &[&str] = &["mp3", "wav", "ogg", "flac", "aac", "m4a", "wma", "opus"];
const DOCUMENTS: &[&str] = &[
    "doc", "docx", "pdf", "txt", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "csv", "md",
    "rtf",
];
const SCRIPTS: &[&str] = &["sh", "bash", "zsh", "bat", "cmd", "ps1", "vbs", "jsx", "cmake"];
const ARCHIVES: &[&str] = &[
    "zip", "rar", "tar", "gz", "7z", "bz2", "xz", "tgz", "iso", "dmg", "img",
];
const CODE: &[&str] = &[
    "py", "js", "html", "css", "c", "cpp", "h", "java", "php", "rb", "pl", "swift", "go", "ts",
    "json", "xml", "yml", "yaml", "toml", "ipynb", "sql", "r", "lua", "cs", "kt", "rs",
];
const EXECUTABLES: &[&str] = &[
    "exe", "msi", "apk", "deb", "rpm", "app", "pkg", "jar", "war", "dll",
];
const DATABASES: &[&str] = &["db", "sqlite", "sqlite3", "accdb", "mdb", "frm"];

/// Classify a filename into its storage bucket by extension.
///
/// Buckets are checked in a fixed order, so extensions claimed by an
/// earlier bucket never reach a later one ("sql" files as code, not
/// databases). Unknown or missing extensions go to "other".
pub fn classify(filename: &str) -> &'static str {
    let ext = match filename.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
        _ => return "other",
    };
    let ext = ext.as_str();

    if IMAGES.contains(&ext) {
        "images"
    } else if VIDEOS.contains(&ext) {
        "videos"
    } else if AUDIO.contains(&ext) {
        "audio"
    } else if ext == "torrent" {
        "torrents"
    } else if DOCUMENTS.contains(&ext) {
        "documents"
    } else if SCRIPTS.contains(&ext) {
        "scripts"
    } else if ARCHIVES.contains(&ext) {
        "archives"
    } else if CODE.contains(&ext) {
        "code"
    } else if EXECUTABLES.contains(&ext) {
        "executables"
    } else if DATABASES.contains(&ext) {
        "databases"
    } else {
        "other"
    }
}
