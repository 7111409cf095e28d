mod photo_received;
mod text_received;

pub use photo_received::photo_received;
pub use text_received::text_received;
