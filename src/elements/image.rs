//! Image content referenced by marked content.
//!
//! Images reach the converter either as image XObjects painted with `Do` or as
//! inline images (`BI ... ID ... EI`). Both are carried as [`ImageContent`] and
//! encoded into `data:` URIs for `<img>` output.

use crate::converters::color::Rgb;
use crate::error::{Error, Result};
use crate::object::{Dictionary, Object};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::ImageBuffer;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// An image as delivered by the object-model provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    /// Image format of `data`
    pub format: ImageFormat,
    /// Image data: encoded bytes for JPEG/PNG, unfiltered samples for Raw
    #[serde(default)]
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Bits per component (typically 8)
    #[serde(default = "default_bpc")]
    pub bits_per_component: u8,
    /// Color space
    #[serde(default)]
    pub color_space: ColorSpace,
}

fn default_bpc() -> u8 {
    8
}

impl ImageContent {
    /// Create a new image content element.
    pub fn new(format: ImageFormat, data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            format,
            data,
            width,
            height,
            bits_per_component: 8,
            color_space: ColorSpace::RGB,
        }
    }

    /// Set the color space.
    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    /// Build an image from an inline image dictionary (abbreviated or full keys).
    ///
    /// PDF Spec: ISO 32000-1:2008, Section 8.9.7 - Inline Images
    pub fn from_inline(dict: &Dictionary, data: Vec<u8>) -> Self {
        let get = |short: &str, long: &str| dict.get(short).or_else(|| dict.get(long));
        let int = |short: &str, long: &str| {
            get(short, long)
                .and_then(Object::as_integer)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0)
        };

        let color_space = match get("CS", "ColorSpace").and_then(Object::as_name) {
            Some("G") | Some("DeviceGray") | Some("CalGray") => ColorSpace::Gray,
            Some("CMYK") | Some("DeviceCMYK") => ColorSpace::CMYK,
            Some("I") | Some("Indexed") => ColorSpace::Indexed,
            Some("Lab") => ColorSpace::Lab,
            _ => ColorSpace::RGB,
        };

        let filter = match get("F", "Filter") {
            Some(Object::Name(n)) => Some(n.as_str()),
            Some(Object::Array(arr)) => arr.last().and_then(Object::as_name),
            _ => None,
        };
        let format = match filter {
            None => ImageFormat::Raw,
            Some("DCT") | Some("DCTDecode") => ImageFormat::Jpeg,
            Some("JPXDecode") => ImageFormat::Jpeg2000,
            Some("JBIG2Decode") => ImageFormat::Jbig2,
            Some(other) => {
                log::debug!("Inline image filter {} left undecoded", other);
                ImageFormat::Unknown
            },
        };

        let bits = get("BPC", "BitsPerComponent")
            .and_then(Object::as_integer)
            .and_then(|v| u8::try_from(v).ok())
            .unwrap_or(8);

        Self {
            format,
            data,
            width: int("W", "Width"),
            height: int("H", "Height"),
            bits_per_component: bits,
            color_space,
        }
    }

    /// Encode as a `data:` URI.
    ///
    /// JPEG and PNG data pass through; raw 8-bit Gray, RGB and CMYK samples
    /// are encoded to PNG. Anything else is an error and the caller falls back
    /// to a placeholder.
    pub fn to_data_uri(&self) -> Result<String> {
        let (mime, bytes) = match self.format {
            ImageFormat::Jpeg | ImageFormat::Png => (self.format.mime_type(), self.data.clone()),
            ImageFormat::Raw => ("image/png", self.encode_png()?),
            other => {
                return Err(Error::Image(format!(
                    "{} images cannot be embedded",
                    other.mime_type()
                )))
            },
        };
        Ok(format!("data:{};base64,{}", mime, BASE64.encode(bytes)))
    }

    fn encode_png(&self) -> Result<Vec<u8>> {
        if self.bits_per_component != 8 {
            return Err(Error::Image(format!(
                "Unsupported bits per component: {}",
                self.bits_per_component
            )));
        }
        let pixels = self.width as usize * self.height as usize;
        let expected = pixels * self.color_space.components() as usize;
        if pixels == 0 || self.data.len() < expected {
            return Err(Error::Image(format!(
                "Image data too short: {} bytes for {}x{} {:?}",
                self.data.len(),
                self.width,
                self.height,
                self.color_space
            )));
        }
        let samples = &self.data[..expected];

        let mut output = Cursor::new(Vec::new());
        match self.color_space {
            ColorSpace::Gray => {
                let img: ImageBuffer<image::Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(self.width, self.height, samples.to_vec())
                        .ok_or_else(|| Error::Image("Failed to create image buffer".to_string()))?;
                img.write_to(&mut output, image::ImageFormat::Png)
            },
            ColorSpace::RGB | ColorSpace::CMYK => {
                let rgb = if self.color_space == ColorSpace::CMYK {
                    samples
                        .chunks_exact(4)
                        .flat_map(|px| {
                            let c = Rgb::from_cmyk(
                                px[0] as f32 / 255.0,
                                px[1] as f32 / 255.0,
                                px[2] as f32 / 255.0,
                                px[3] as f32 / 255.0,
                            );
                            [c.r, c.g, c.b]
                        })
                        .collect()
                } else {
                    samples.to_vec()
                };
                let img: ImageBuffer<image::Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(self.width, self.height, rgb)
                        .ok_or_else(|| Error::Image("Failed to create image buffer".to_string()))?;
                img.write_to(&mut output, image::ImageFormat::Png)
            },
            other => {
                return Err(Error::Image(format!("Unsupported color space: {:?}", other)));
            },
        }
        .map_err(|e| Error::Image(format!("PNG encoding failed: {}", e)))?;

        Ok(output.into_inner())
    }
}

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    /// JPEG format
    Jpeg,
    /// PNG format
    Png,
    /// JPEG 2000 format (JPX)
    Jpeg2000,
    /// JBIG2 format (typically for scanned documents)
    Jbig2,
    /// Raw uncompressed sample data
    Raw,
    /// Unknown or unsupported format
    Unknown,
}

impl ImageFormat {
    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg2000 => "image/jp2",
            ImageFormat::Jbig2 => "image/jbig2",
            ImageFormat::Raw | ImageFormat::Unknown => "application/octet-stream",
        }
    }
}

/// Color space for images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum ColorSpace {
    /// Grayscale (1 component)
    Gray,
    /// RGB color (3 components)
    #[default]
    RGB,
    /// CMYK color (4 components)
    CMYK,
    /// Indexed color (palette-based)
    Indexed,
    /// Lab color space
    Lab,
}

impl ColorSpace {
    /// Get the number of components for this color space.
    pub fn components(&self) -> u8 {
        match self {
            ColorSpace::Gray => 1,
            ColorSpace::RGB => 3,
            ColorSpace::CMYK => 4,
            ColorSpace::Indexed => 1,
            ColorSpace::Lab => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_passes_through() {
        let img = ImageContent::new(ImageFormat::Jpeg, vec![0xFF, 0xD8, 0xFF], 1, 1);
        assert_eq!(img.to_data_uri().unwrap(), "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_raw_rgb_encodes_png() {
        let img = ImageContent::new(ImageFormat::Raw, vec![255, 0, 0, 0, 255, 0], 2, 1);
        let uri = img.to_data_uri().unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        let png = BASE64.decode(&uri["data:image/png;base64,".len()..]).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_raw_gray_encodes_png() {
        let img = ImageContent::new(ImageFormat::Raw, vec![0, 128, 255, 64], 2, 2)
            .with_color_space(ColorSpace::Gray);
        assert!(img.to_data_uri().is_ok());
    }

    #[test]
    fn test_short_data_is_error() {
        let img = ImageContent::new(ImageFormat::Raw, vec![1, 2, 3], 2, 2);
        assert!(matches!(img.to_data_uri(), Err(Error::Image(_))));
    }

    #[test]
    fn test_jbig2_is_not_embeddable() {
        let img = ImageContent::new(ImageFormat::Jbig2, vec![1], 1, 1);
        assert!(img.to_data_uri().is_err());
    }

    #[test]
    fn test_from_inline_dictionary() {
        let mut dict = Dictionary::new();
        dict.insert("W".to_string(), Object::Integer(4));
        dict.insert("H".to_string(), Object::Integer(2));
        dict.insert("CS".to_string(), Object::name("G"));
        dict.insert("BPC".to_string(), Object::Integer(8));
        let img = ImageContent::from_inline(&dict, vec![0; 8]);
        assert_eq!((img.width, img.height), (4, 2));
        assert_eq!(img.color_space, ColorSpace::Gray);
        assert_eq!(img.format, ImageFormat::Raw);

        dict.insert("F".to_string(), Object::name("DCT"));
        assert_eq!(ImageContent::from_inline(&dict, vec![]).format, ImageFormat::Jpeg);
    }
}
