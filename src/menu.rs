use strum::{Display, EnumIter, EnumString};

/// Every button label the bot shows. Labels are matched exactly, either with
/// the emoji the keyboard carries or as the bare word.
#[derive(EnumIter, Display, EnumString, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    #[strum(to_string = "🎥 Download Video", serialize = "Download Video")]
    DownloadVideo,
    #[strum(to_string = "🖼️ Convert Image", serialize = "Convert Image")]
    ConvertImage,
    #[strum(to_string = "📹 YouTube", serialize = "YouTube")]
    YouTube,
    #[strum(to_string = "🎵 TikTok", serialize = "TikTok")]
    TikTok,
    #[strum(to_string = "📷 JPG", serialize = "JPG")]
    Jpg,
    #[strum(to_string = "🖼️ PNG", serialize = "PNG")]
    Png,
    #[strum(to_string = "📜 PDF", serialize = "PDF")]
    Pdf,
    #[strum(to_string = "🔙 Back", serialize = "Back")]
    Back,
}

impl MenuOption {
    pub fn from_label(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }
}

#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    YouTube,
    TikTok,
}

#[derive(Display, EnumIter, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    #[strum(to_string = "JPG")]
    Jpg,
    #[strum(to_string = "PNG")]
    Png,
    #[strum(to_string = "PDF")]
    Pdf,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Pdf => "pdf",
        }
    }
}

/// Reply keyboards, laid out row by row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Main,
    VideoPlatform,
    ImageFormat,
}

impl Menu {
    pub fn rows(&self) -> Vec<Vec<MenuOption>> {
        use MenuOption::*;
        match self {
            Menu::Main => vec![vec![DownloadVideo, ConvertImage]],
            Menu::VideoPlatform => vec![vec![YouTube, TikTok], vec![Back]],
            Menu::ImageFormat => vec![vec![Jpg, Png], vec![Pdf, Back]],
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn labels_parse_with_and_without_emoji() {
        assert_eq!(
            MenuOption::from_label("🎥 Download Video"),
            Some(MenuOption::DownloadVideo)
        );
        assert_eq!(
            MenuOption::from_label("Download Video"),
            Some(MenuOption::DownloadVideo)
        );
        assert_eq!(MenuOption::from_label(" PNG "), Some(MenuOption::Png));
        assert_eq!(MenuOption::from_label("🔙 Back"), Some(MenuOption::Back));
    }

    #[test]
    fn unknown_or_differently_cased_labels_do_not_match() {
        assert_eq!(MenuOption::from_label("png"), None);
        assert_eq!(MenuOption::from_label("Download"), None);
        assert_eq!(MenuOption::from_label("https://youtu.be/x"), None);
    }

    #[test]
    fn every_option_round_trips_through_its_display_label() {
        for option in MenuOption::iter() {
            assert_eq!(MenuOption::from_label(&option.to_string()), Some(option));
        }
    }

    #[test]
    fn keyboards_match_the_menu_layout() {
        assert_eq!(
            Menu::VideoPlatform.rows(),
            vec![
                vec![MenuOption::YouTube, MenuOption::TikTok],
                vec![MenuOption::Back]
            ]
        );
        let image_labels: Vec<String> = Menu::ImageFormat
            .rows()
            .into_iter()
            .flatten()
            .map(|o| o.to_string())
            .collect();
        assert_eq!(image_labels, ["📷 JPG", "🖼️ PNG", "📜 PDF", "🔙 Back"]);
    }

    #[test]
    fn formats_map_to_file_extensions() {
        let extensions: Vec<&str> = ImageFormat::iter().map(|f| f.extension()).collect();
        assert_eq!(extensions, ["jpg", "png", "pdf"]);
    }
}
