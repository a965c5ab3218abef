use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Cursor;

use image::{ColorType, DynamicImage, ImageDecoder, ImageReader};
use tracing::debug;

use super::FormatExtractor;
use crate::models::UploadedFile;
use crate::types::{ExtractError, ExtractionResult, FormatKind, ImageContent};

/// Decodes images; the result carries the pixels plus a caption.
pub struct ImageExtractor;

impl FormatExtractor for ImageExtractor {
    fn kind(&self) -> FormatKind {
        FormatKind::Image
    }

    fn try_extract(&self, file: &UploadedFile) -> Result<ExtractionResult, ExtractError> {
        let decode_err = |e: image::ImageError| ExtractError::decode(FormatKind::Image, e);

        let format = image::guess_format(&file.bytes).map_err(decode_err)?;
        let mut decoder = ImageReader::with_format(Cursor::new(file.bytes.as_slice()), format)
            .into_decoder()
            .map_err(decode_err)?;

        let metadata = embedded_metadata(&mut decoder);
        let image = DynamicImage::from_decoder(decoder).map_err(decode_err)?;

        let format = format!("{format:?}").to_uppercase();
        let color_mode = color_mode(image.color());
        let (width, height) = (image.width(), image.height());
        debug!(file = %file.name, width, height, format = %format, "Decoded image");

        let mut caption = format!(
            "Image file: {}\nDimensions: {} x {} pixels\nFormat: {}\nMode: {}\n",
            file.name, width, height, format, color_mode
        );
        if !metadata.is_empty() {
            let entries: Vec<String> = metadata.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            let _ = writeln!(caption, "Additional info: {{{}}}", entries.join(", "));
        }

        Ok(ExtractionResult::Image(ImageContent {
            image,
            width,
            height,
            format,
            color_mode,
            metadata,
            caption,
        }))
    }
}

/// Metadata blocks the decoder exposes, summarised by size
fn embedded_metadata(decoder: &mut impl ImageDecoder) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    if let Ok(Some(exif)) = decoder.exif_metadata() {
        metadata.insert("exif".to_string(), format!("{} bytes", exif.len()));
    }
    if let Ok(Some(icc)) = decoder.icc_profile() {
        metadata.insert("icc_profile".to_string(), format!("{} bytes", icc.len()));
    }
    metadata
}

/// Short channel-layout name for a pixel type
fn color_mode(color: ColorType) -> String {
    match color {
        ColorType::L8 => "L".to_string(),
        ColorType::La8 => "LA".to_string(),
        ColorType::Rgb8 => "RGB".to_string(),
        ColorType::Rgba8 => "RGBA".to_string(),
        ColorType::L16 => "L;16".to_string(),
        ColorType::La16 => "LA;16".to_string(),
        ColorType::Rgb16 => "RGB;16".to_string(),
        ColorType::Rgba16 => "RGBA;16".to_string(),
        ColorType::Rgb32F => "RGB;32F".to_string(),
        ColorType::Rgba32F => "RGBA;32F".to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    /// A small checkerboard PNG
    pub(crate) fn create_test_png(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 255, 0, 255])
            }
        });
        let mut bytes: Vec<u8> = Vec::new();
        let mut cursor = Cursor::new(&mut bytes);
        img.write_to(&mut cursor, image::ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_decodes_png() {
        let file = UploadedFile::new("dot.png", "image/png", create_test_png(3, 2));
        let extraction = ImageExtractor.extract(&file);
        assert!(extraction.error.is_none());

        let image = extraction.content.as_image().expect("image result");
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.format, "PNG");
        assert_eq!(image.color_mode, "RGBA");
        assert_eq!(
            image.caption,
            "Image file: dot.png\nDimensions: 3 x 2 pixels\nFormat: PNG\nMode: RGBA\n"
        );
    }

    /// Insert an extra chunk right after IHDR
    fn with_png_chunk(png: &[u8], kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
        const IHDR_END: usize = 8 + 4 + 4 + 13 + 4;
        let mut body = kind.to_vec();
        body.extend_from_slice(data);

        let mut out = png[..IHDR_END].to_vec();
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(&body);
        out.extend_from_slice(&crc32(&body).to_be_bytes());
        out.extend_from_slice(&png[IHDR_END..]);
        out
    }

    fn crc32(bytes: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for byte in bytes {
            crc ^= *byte as u32;
            for _ in 0..8 {
                crc = if crc & 1 == 1 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
            }
        }
        !crc
    }

    #[test]
    fn test_exif_reaches_caption() {
        // Big-endian TIFF header with an empty IFD
        let exif = b"MM\x00\x2a\x00\x00\x00\x08\x00\x00\x00\x00\x00\x00";
        let bytes = with_png_chunk(&create_test_png(2, 2), b"eXIf", exif);
        let file = UploadedFile::new("meta.png", "image/png", bytes);
        let extraction = ImageExtractor.extract(&file);
        assert!(extraction.error.is_none(), "{:?}", extraction.error);

        let image = extraction.content.as_image().expect("image result");
        assert_eq!(image.metadata.get("exif").map(String::as_str), Some("14 bytes"));
        assert!(image
            .caption
            .ends_with("Mode: RGBA\nAdditional info: {exif: 14 bytes}\n"));
    }

    #[test]
    fn test_no_metadata_no_additional_info() {
        let file = UploadedFile::new("plain.png", "image/png", create_test_png(2, 2));
        let image = ImageExtractor.extract(&file).content.as_image().cloned().expect("image result");
        assert!(image.metadata.is_empty());
        assert!(!image.caption.contains("Additional info"));
    }

    #[test]
    fn test_unknown_bytes() {
        let file = UploadedFile::new("x.png", "image/png", b"not an image".to_vec());
        let extraction = ImageExtractor.extract(&file);
        assert!(extraction
            .content
            .as_text()
            .unwrap()
            .starts_with("Error processing image file: "));
    }

    #[test]
    fn test_truncated_png() {
        let mut bytes = create_test_png(4, 4);
        bytes.truncate(20);
        let file = UploadedFile::new("cut.png", "image/png", bytes);
        let extraction = ImageExtractor.extract(&file);
        assert!(matches!(
            extraction.error,
            Some(ExtractError::Decode { kind: FormatKind::Image, .. })
        ));
    }
}
