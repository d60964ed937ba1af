//! Configuration for structure-to-HTML conversion.

/// Conversion options.
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// CSS pixels per PDF point, used for image and SVG sizing.
    pub px_per_point: f32,

    /// Maximum edge length (px) of an SVG sized from accumulated path bounds.
    pub max_svg_edge: f32,

    /// Text emitted in place of vector content that could not be rendered.
    pub vector_placeholder: String,

    /// Embed image data as data URIs. When disabled every image becomes a
    /// same-dimension placeholder.
    pub embed_images: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self {
            px_per_point: 96.0 / 72.0,
            max_svg_edge: 2000.0,
            vector_placeholder: "[graphic]".to_string(),
            embed_images: true,
        }
    }

    /// Set the point to pixel factor.
    pub fn with_px_per_point(mut self, factor: f32) -> Self {
        self.px_per_point = factor;
        self
    }

    /// Set the SVG edge clamp.
    pub fn with_max_svg_edge(mut self, edge: f32) -> Self {
        self.max_svg_edge = edge;
        self
    }

    /// Set the vector placeholder text.
    pub fn with_vector_placeholder(mut self, text: impl Into<String>) -> Self {
        self.vector_placeholder = text.into();
        self
    }

    /// Enable or disable image embedding.
    pub fn with_embed_images(mut self, enable: bool) -> Self {
        self.embed_images = enable;
        self
    }

    /// Convert a length in PDF points to whole CSS pixels.
    pub fn to_px(&self, points: f32) -> u32 {
        (points * self.px_per_point).round().max(0.0) as u32
    }
}
