//! Content elements resolved out of page content.

mod image;

pub use image::{ColorSpace, ImageContent, ImageFormat};
