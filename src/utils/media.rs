//! Upload constraints and the fixed extension-to-MIME lookup used by the
//! image-fetch endpoints.

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Lowercased extension of `filename`, without the leading dot.
pub fn extension_of(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn is_allowed_extension(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext)
}

pub fn media_type_for(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
