use teloxide::types::PhotoSize;

const LINK_SCHEMES: [&str; 2] = ["https://", "http://"];

/// A link is anything with an http(s) scheme and something after it.
/// Which sites actually work is left for yt-dlp to decide.
pub fn is_video_link(text: &str) -> bool {
    let text = text.trim();
    if text.contains(char::is_whitespace) {
        return false;
    }

    let lower = text.to_lowercase();
    LINK_SCHEMES
        .iter()
        .any(|scheme| lower.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()))
}

/// Telegram sends every resolution of a photo; keep the biggest one.
pub fn largest_photo(photos: &[PhotoSize]) -> Option<&PhotoSize> {
    photos.iter().max_by_key(|p| (p.width * p.height, p.file.size))
}
