//! Structure tree to HTML conversion.
//!
//! - [`html`]: traversal and tag selection, the top-level [`render`]
//! - [`attributes`]: the owner-ordered attribute cascade
//! - [`svg`]: vector graphics to SVG
//! - [`tags`]: role to tag tables and list label parsing
//! - [`spacing`]: spaces between inline runs
//! - [`color`]: PDF colours to CSS `rgb()`

pub mod attributes;
pub mod color;
pub mod html;
pub mod spacing;
pub mod svg;
pub mod tags;

pub use attributes::{resolve_attributes, ResolvedAttributes};
pub use color::Rgb;
pub use html::{escape_html, render, ContentRef, RenderedDocument};
pub use svg::emit_svg;
pub use tags::{parse_list_label, LabelNumbering, ListNumbering};

/// Format a number with at most two decimals and no trailing zeros.
pub(crate) fn format_number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 || !rounded.is_finite() {
        return "0".to_string();
    }
    let text = format!("{:.2}", rounded);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(4.5), "4.5");
        assert_eq!(format_number(1.006), "1.01");
        assert_eq!(format_number(-0.001), "0");
        assert_eq!(format_number(-3.25), "-3.25");
    }
}
