//! User-facing replies. All of them are sent with HTML parse mode.

use crate::menu::Platform;

pub const WELCOME: &str = "🎉 <b>Welcome to the Ultimate Media Downloader Bot!</b> 🎬\n\n\
    I can help you download videos and convert images into various formats. \
    Select an option below to get started.";

pub const BACK_TO_MAIN: &str = "🔙 Back to the main menu.";
pub const CANCELLED: &str = "🛑 Cancelled. Any uploaded files were removed.";

pub const SELECT_PLATFORM: &str = "🎥 <b>Select a platform:</b>";
pub const DOWNLOADING: &str = "⏳ Downloading your video, please wait...";
pub const DOWNLOAD_FAILED: &str =
    "❌ <b>Failed to download the video.</b>\nPlease check the link or try again later.";
pub const DOWNLOAD_TIMED_OUT: &str =
    "❌ <b>The download took too long and was stopped.</b>\nPlease try a shorter video.";
pub const VIDEO_TOO_LARGE: &str =
    "❌ <b>The video is too large to send.</b>\nPlease try a shorter video.";

pub const SELECT_FORMAT: &str = "🖼️ <b>Select the format to convert your image into:</b>";
pub const IMAGE_UPLOADED: &str = "📥 Image uploaded. Now select the format to convert into.";
pub const NO_IMAGE: &str = "❌ <b>No image uploaded.</b> Please upload an image first.";
pub const CONVERT_FAILED: &str = "❌ <b>Failed to convert the image.</b>\nPlease try again.";

pub const UNEXPECTED: &str =
    "❌ <b>An unexpected error occurred.</b>\nPlease try again later.";

pub fn ask_for_link(platform: Platform) -> String {
    format!(
        "📥 Send me the link for the {} video you'd like to download.",
        platform
    )
}
