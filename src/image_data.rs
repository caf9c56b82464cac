//! Turning a base64 payload into an image file on disk.

use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose;
use image::{ColorType, DynamicImage, ImageFormat, ImageReader};
use tracing::debug;

use crate::error::GenerationError;

/// Drops a `data:image/...;base64,` style header, if there is one.
pub fn strip_data_uri(payload: &str) -> &str {
    match payload.split_once(',') {
        Some((_, data)) => data.trim(),
        None => payload.trim(),
    }
}

/// Base64-decodes the payload and checks it is an image we can read.
///
/// `output_path` is only used to label the error.
pub fn decode_image(payload: &str, output_path: &Path) -> Result<DynamicImage, GenerationError> {
    let bytes = general_purpose::STANDARD
        .decode(strip_data_uri(payload))
        .map_err(|err| {
            debug!("Failed to base64-decode image: {}", err);
            GenerationError::persistence(output_path, format!("invalid base64: {err}"))
        })?;

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| GenerationError::persistence(output_path, err))?;
    let format = reader.format();
    let image = reader.decode().map_err(|err| {
        debug!("Failed to decode image: {}", err);
        GenerationError::persistence(output_path, err)
    })?;
    debug!(
        "Decoded {:?} image, {}x{}",
        format,
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Encodes `image` in the format implied by the extension of `output_path`.
///
/// PNG, JPEG, WebP (lossless), BMP and GIF are supported.
pub fn encode_for_path(image: &DynamicImage, output_path: &Path) -> Result<Vec<u8>, GenerationError> {
    let format = ImageFormat::from_path(output_path)
        .map_err(|err| GenerationError::persistence(output_path, err))?;

    let mut output = Vec::new();
    encodable_for(image, format)
        .write_to(&mut Cursor::new(&mut output), format)
        .map_err(|err| GenerationError::persistence(output_path, err))?;
    Ok(output)
}

/// Converts to a pixel layout the target encoder accepts, borrowing when it already does.
fn encodable_for(image: &DynamicImage, format: ImageFormat) -> Cow<'_, DynamicImage> {
    let color = image.color();
    match format {
        ImageFormat::Png => Cow::Borrowed(image),
        // JPEG has no alpha channel
        ImageFormat::Jpeg if !matches!(color, ColorType::Rgb8 | ColorType::L8) => {
            Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8()))
        }
        ImageFormat::Jpeg => Cow::Borrowed(image),
        _ if !matches!(color, ColorType::Rgb8 | ColorType::Rgba8) => {
            Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8()))
        }
        _ => Cow::Borrowed(image),
    }
}

/// Creates any missing parent directories, then writes `bytes` to `output_path`.
pub async fn write_image_file(bytes: &[u8], output_path: &Path) -> Result<(), GenerationError> {
    if let Some(parent) = output_path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| GenerationError::directory(parent, err))?;
    }

    tokio::fs::write(output_path, bytes)
        .await
        .map_err(|err| GenerationError::persistence(output_path, err))
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    use super::*;
    use crate::error::FailureKind;

    fn png_base64(image: &DynamicImage) -> String {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_strip_data_uri() {
        assert_eq!(strip_data_uri("data:image/png;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_uri("QUJD"), "QUJD");
        assert_eq!(strip_data_uri(" QUJD\n"), "QUJD");
        // only the first comma is a separator
        assert_eq!(strip_data_uri("a,b,c"), "b,c");
    }

    #[test]
    fn data_uri_round_trip_keeps_pixels() {
        let original = DynamicImage::ImageRgb8(RgbImage::from_fn(8, 4, |x, y| {
            Rgb([(x * 30) as u8, (y * 60) as u8, 200])
        }));
        let payload = format!("data:image/png;base64,{}", png_base64(&original));

        let decoded = decode_image(&payload, Path::new("out.png")).expect("decode");
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 4);
        assert_eq!(decoded.to_rgb8().into_raw(), original.to_rgb8().into_raw());
    }

    #[test]
    fn webp_payloads_decode() {
        let original = DynamicImage::ImageRgba8(RgbaImage::from_fn(6, 5, |x, y| {
            Rgba([(x * 40) as u8, (y * 50) as u8, 90, 255])
        }));
        let mut bytes = Vec::new();
        original
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::WebP)
            .expect("encode webp");
        let payload = format!(
            "data:image/webp;base64,{}",
            general_purpose::STANDARD.encode(bytes)
        );

        let decoded = decode_image(&payload, Path::new("out.webp")).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (6, 5));
        // lossless, so pixels survive
        assert_eq!(decoded.to_rgba8().into_raw(), original.to_rgba8().into_raw());
    }

    #[test]
    fn bad_payloads_are_persistence_failures() {
        let err = decode_image("!!not base64!!", Path::new("out.png")).expect_err("bad base64");
        assert_eq!(err.kind(), FailureKind::Persistence);

        let not_an_image = general_purpose::STANDARD.encode(b"This is not an image.");
        let err = decode_image(&not_an_image, Path::new("out.png")).expect_err("bad image");
        assert_eq!(err.kind(), FailureKind::Persistence);
    }

    #[test]
    fn encoding_follows_the_extension() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 128])));

        let png = encode_for_path(&image, Path::new("x/y.png")).expect("png");
        assert_eq!(image::guess_format(&png).expect("guess"), ImageFormat::Png);

        let jpeg = encode_for_path(&image, Path::new("x/y.JPG")).expect("jpeg");
        assert_eq!(image::guess_format(&jpeg).expect("guess"), ImageFormat::Jpeg);

        for (name, format) in [
            ("x/y.webp", ImageFormat::WebP),
            ("x/y.bmp", ImageFormat::Bmp),
            ("x/y.gif", ImageFormat::Gif),
        ] {
            let bytes = encode_for_path(&image, Path::new(name)).expect(name);
            assert_eq!(image::guess_format(&bytes).expect("guess"), format, "{name}");
            let decoded = image::load_from_memory(&bytes).expect(name);
            assert_eq!((decoded.width(), decoded.height()), (4, 4), "{name}");
        }

        // 16-bit sources are narrowed for encoders that only take 8-bit
        let deep = DynamicImage::ImageRgb16(image::ImageBuffer::from_pixel(
            2,
            2,
            image::Rgb([1000u16, 2000, 3000]),
        ));
        encode_for_path(&deep, Path::new("x/deep.bmp")).expect("bmp from 16-bit");
        encode_for_path(&deep, Path::new("x/deep.jpeg")).expect("jpeg from 16-bit");

        let err = encode_for_path(&image, Path::new("x/y.tiff")).expect_err("tiff not enabled");
        assert_eq!(err.kind(), FailureKind::Persistence);
        let err = encode_for_path(&image, Path::new("x/y")).expect_err("no extension");
        assert_eq!(err.kind(), FailureKind::Persistence);
        let err = encode_for_path(&image, Path::new("x/y.txt")).expect_err("unknown extension");
        assert_eq!(err.kind(), FailureKind::Persistence);
    }

    #[tokio::test]
    async fn write_creates_missing_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a").join("b").join("out.png");
        write_image_file(b"bytes", &path).await.expect("write");
        assert_eq!(tokio::fs::read(&path).await.expect("read"), b"bytes");

        // second write into the now-existing directory is fine too
        write_image_file(b"again", &path).await.expect("rewrite");
    }
}
