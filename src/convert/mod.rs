mod pdf;

use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use image::{DynamicImage, ImageReader, codecs::jpeg::JpegEncoder};

use crate::{
    errors::{BotError, BotResult},
    menu::ImageFormat,
};

/// Encodes an image into another format.
///
/// The output lands next to `source` as `converted_image.<ext>`. Fails with
/// [`BotError::Encode`] on corrupt input and with [`BotError::Timeout`] once
/// `deadline` passes, in which case no output is left on disk.
#[async_trait]
pub trait ImageConverter: Send + Sync {
    async fn convert(
        &self,
        source: &Path,
        format: ImageFormat,
        deadline: Duration,
    ) -> BotResult<PathBuf>;
}

pub struct RasterConverter {
    jpeg_quality: u8,
}

impl RasterConverter {
    pub fn new(jpeg_quality: u8) -> Self {
        Self { jpeg_quality }
    }
}

pub fn output_path(source: &Path, format: ImageFormat) -> PathBuf {
    source.with_file_name(format!("converted_image.{}", format.extension()))
}

#[async_trait]
impl ImageConverter for RasterConverter {
    async fn convert(
        &self,
        source: &Path,
        format: ImageFormat,
        deadline: Duration,
    ) -> BotResult<PathBuf> {
        let output = output_path(source, format);
        let source = source.to_path_buf();
        let quality = self.jpeg_quality;
        encode_within(deadline, output, move || {
            convert_blocking(&source, format, quality)
        })
        .await
    }
}

/// Runs a CPU bound encode on the blocking pool.
///
/// A blocking task cannot be interrupted, so when `deadline` passes first this
/// still waits for `job` to finish and then removes `output` before reporting
/// the timeout.
pub async fn encode_within<F>(deadline: Duration, output: PathBuf, job: F) -> BotResult<PathBuf>
where
    F: FnOnce() -> BotResult<PathBuf> + Send + 'static,
{
    let mut task = tokio::task::spawn_blocking(job);
    match tokio::time::timeout(deadline, &mut task).await {
        Ok(joined) => joined?,
        Err(_) => {
            if let Ok(Err(e)) = task.await {
                log::debug!("Encode finished after its deadline with: {}", e);
            }
            match tokio::fs::remove_file(&output).await {
                Ok(()) => log::debug!("Removed late output {}", output.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            Err(BotError::timeout("image conversion", deadline))
        }
    }
}

fn convert_blocking(source: &Path, format: ImageFormat, quality: u8) -> BotResult<PathBuf> {
    // uploads are stored without an extension, so sniff the content
    let img = ImageReader::open(source)?.with_guessed_format()?.decode()?;
    let output = output_path(source, format);

    match format {
        ImageFormat::Jpg => {
            let writer = BufWriter::new(File::create(&output)?);
            write_jpeg(&img, writer, quality)?;
        }
        ImageFormat::Png => img.save_with_format(&output, image::ImageFormat::Png)?,
        ImageFormat::Pdf => {
            let mut jpeg = Vec::new();
            write_jpeg(&img, &mut jpeg, quality)?;
            let document = pdf::single_page(&jpeg, img.width(), img.height());
            std::fs::write(&output, document)?;
        }
    }

    log::info!(
        "Converted {} ({}x{}) to {}",
        source.display(),
        img.width(),
        img.height(),
        output.display()
    );
    Ok(output)
}

fn write_jpeg<W: std::io::Write>(img: &DynamicImage, writer: W, quality: u8) -> BotResult<()> {
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(writer, quality))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    const DEADLINE: Duration = Duration::from_secs(30);

    fn write_sample_png(dir: &Path) -> PathBuf {
        let path = dir.join("input_image");
        let img = RgbaImage::from_pixel(4, 3, Rgba([200, 30, 30, 128]));
        img.save_with_format(&path, image::ImageFormat::Png).unwrap();
        path
    }

    #[tokio::test]
    async fn converts_extensionless_upload_to_jpg() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_sample_png(tmp.path());

        let output = RasterConverter::new(90)
            .convert(&source, ImageFormat::Jpg, DEADLINE)
            .await
            .unwrap();

        assert_eq!(output, tmp.path().join("converted_image.jpg"));
        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[tokio::test]
    async fn converts_to_png() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_sample_png(tmp.path());

        let output = RasterConverter::new(90)
            .convert(&source, ImageFormat::Png, DEADLINE)
            .await
            .unwrap();

        let format = ImageReader::open(&output)
            .unwrap()
            .with_guessed_format()
            .unwrap()
            .format();
        assert_eq!(format, Some(image::ImageFormat::Png));
    }

    #[tokio::test]
    async fn converts_to_single_page_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let source = write_sample_png(tmp.path());

        let output = RasterConverter::new(90)
            .convert(&source, ImageFormat::Pdf, DEADLINE)
            .await
            .unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
    }

    #[tokio::test]
    async fn corrupt_source_is_an_encode_error() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("input_image");
        std::fs::write(&source, b"definitely not an image").unwrap();

        let err = RasterConverter::new(90)
            .convert(&source, ImageFormat::Png, DEADLINE)
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Encode(_)));
        assert!(!tmp.path().join("converted_image.png").exists());
    }

    #[tokio::test]
    async fn late_encode_leaves_no_output() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("converted_image.png");
        let written = output.clone();

        let err = encode_within(Duration::from_millis(20), output.clone(), move || {
            std::thread::sleep(Duration::from_millis(200));
            std::fs::write(&written, b"late")?;
            Ok(written)
        })
        .await
        .unwrap_err();

        assert!(matches!(err, BotError::Timeout { .. }));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn encode_within_deadline_keeps_output() {
        let tmp = tempfile::tempdir().unwrap();
        let output = tmp.path().join("converted_image.jpg");
        let written = output.clone();

        let path = encode_within(DEADLINE, output.clone(), move || {
            std::fs::write(&written, b"jpeg")?;
            Ok(written)
        })
        .await
        .unwrap();

        assert_eq!(path, output);
        assert!(output.exists());
    }
}
