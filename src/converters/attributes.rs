//! Attribute cascade.
//!
//! Owner-tagged attribute dictionaries are merged into one ordered map of HTML
//! attributes and one ordered map of CSS declarations. Categories are applied
//! in the order List, Table, Layout, HTML, CSS, ARIA; within a category the
//! dictionaries keep their declaration order. A later write to the same key
//! replaces the earlier value, with one exception: `display: block` set by a
//! margin property (SpaceBefore/After, StartIndent/EndIndent) is never
//! downgraded.
//!
//! A malformed value skips that one attribute and nothing else.

use super::color::Rgb;
use super::format_number;
use crate::object::Object;
use crate::structure::{AttributeDict, OwnerCategory};
use indexmap::IndexMap;
use phf::phf_map;

static WRITING_MODE: phf::Map<&'static str, &'static str> = phf_map! {
    "LrTb" => "horizontal-tb",
    "RlTb" => "horizontal-tb",
    "TbRl" => "vertical-rl",
    "TbLr" => "vertical-lr",
    "LrBt" => "horizontal-tb",
    "RlBt" => "horizontal-tb",
};

static TEXT_DECORATION: phf::Map<&'static str, &'static str> = phf_map! {
    "None" => "none",
    "Underline" => "underline",
    "Overline" => "overline",
    "LineThrough" => "line-through",
};

static RUBY_ALIGN: phf::Map<&'static str, &'static str> = phf_map! {
    "Start" => "start",
    "Center" => "center",
    "End" => "end",
    "Justify" => "space-around",
    "Distribute" => "space-between",
};

static RUBY_POSITION: phf::Map<&'static str, &'static str> = phf_map! {
    "Before" => "over",
    "After" => "under",
    "Warichu" => "inter-character",
};

static TEXT_ALIGN: phf::Map<&'static str, &'static str> = phf_map! {
    "Start" => "start",
    "Center" => "center",
    "End" => "end",
    "Justify" => "justify",
};

static BLOCK_ALIGN: phf::Map<&'static str, &'static str> = phf_map! {
    "Before" => "top",
    "Middle" => "middle",
    "After" => "bottom",
};

static BORDER_STYLE: phf::Map<&'static str, &'static str> = phf_map! {
    "None" => "none",
    "Hidden" => "hidden",
    "Dotted" => "dotted",
    "Dashed" => "dashed",
    "Solid" => "solid",
    "Double" => "double",
    "Groove" => "groove",
    "Ridge" => "ridge",
    "Inset" => "inset",
    "Outset" => "outset",
};

/// Result of the cascade.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedAttributes {
    /// HTML attributes in first-write order
    pub html: IndexMap<String, String>,
    /// CSS declarations in first-write order
    pub css: IndexMap<String, String>,
    display_locked: bool,
}

impl ResolvedAttributes {
    /// Render the CSS map as a `style` attribute value.
    pub fn style(&self) -> Option<String> {
        if self.css.is_empty() {
            return None;
        }
        Some(
            self.css
                .iter()
                .map(|(k, v)| format!("{}: {}", k, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Set a CSS property, honouring the `display` lock.
    pub fn set_css(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if key == "display" && self.display_locked && value != "block" {
            log::trace!("display: block is locked, ignoring display: {}", value);
            return;
        }
        self.css.insert(key.to_string(), value);
    }

    /// Set an HTML attribute.
    pub fn set_html(&mut self, key: &str, value: impl Into<String>) {
        self.html.insert(key.to_string(), value.into());
    }

    fn set_margin(&mut self, side: &str, value: String) {
        self.set_css("display", "block");
        self.display_locked = true;
        self.set_css(&format!("margin-{}", side), value);
    }
}

/// Merge attribute dictionaries into HTML attributes and CSS declarations.
pub fn resolve_attributes(dicts: &[&AttributeDict]) -> ResolvedAttributes {
    let mut ordered: Vec<(u8, &AttributeDict)> = dicts
        .iter()
        .filter_map(|d| d.owner.category.cascade_rank().map(|rank| (rank, *d)))
        .collect();
    // Stable: declaration order survives within a category.
    ordered.sort_by_key(|(rank, _)| *rank);

    let mut out = ResolvedAttributes::default();
    for (_, dict) in ordered {
        for (key, value) in &dict.entries {
            let applied = match dict.owner.category {
                OwnerCategory::List => Some(()),
                OwnerCategory::Table => apply_table(&mut out, key, value),
                OwnerCategory::Layout => apply_layout(&mut out, key, value),
                OwnerCategory::Html => apply_html(&mut out, key, value),
                OwnerCategory::Css => apply_css(&mut out, key, value),
                OwnerCategory::Aria => apply_aria(&mut out, key, value),
                _ => Some(()),
            };
            if applied.is_none() {
                log::debug!(
                    "Skipping malformed {} attribute {} = {:?}",
                    dict.owner.name,
                    key,
                    value
                );
            }
        }
    }
    out
}

/// Return `None` for a value that cannot be converted.
fn apply_table(out: &mut ResolvedAttributes, key: &str, value: &Object) -> Option<()> {
    match key {
        "ColSpan" => out.set_html("colspan", positive_integer(value)?),
        "RowSpan" => out.set_html("rowspan", positive_integer(value)?),
        "Headers" => {
            let ids: Vec<String> = value
                .as_array()?
                .iter()
                .filter_map(Object::as_name_or_text)
                .collect();
            if ids.is_empty() {
                return None;
            }
            out.set_html("headers", ids.join(" "));
        },
        "Scope" => match value.as_name_or_text()?.as_str() {
            "Row" => out.set_html("scope", "row"),
            "Column" => out.set_html("scope", "col"),
            "Both" => {},
            _ => return None,
        },
        "Short" | "Summary" => out.set_html("abbr", value.as_name_or_text()?),
        _ => log::trace!("Table attribute {} has no HTML mapping", key),
    }
    Some(())
}

fn apply_layout(out: &mut ResolvedAttributes, key: &str, value: &Object) -> Option<()> {
    match key {
        "Placement" => match value.as_name()? {
            "Block" => out.set_css("display", "block"),
            "Inline" => out.set_css("display", "inline"),
            "Start" => out.set_css("float", "left"),
            "End" => out.set_css("float", "right"),
            "Before" => {
                out.set_css("display", "block");
                out.set_css("clear", "both");
            },
            _ => return None,
        },
        "WritingMode" => {
            let mode = value.as_name()?;
            out.set_css("writing-mode", *WRITING_MODE.get(mode)?);
            if mode.starts_with("Rl") {
                out.set_css("direction", "rtl");
            }
        },
        "BackgroundColor" => out.set_css("background-color", color(value)?),
        "Color" => out.set_css("color", color(value)?),
        "BorderColor" => out.set_css("border-color", color_or_sides(value)?),
        "BorderStyle" => out.set_css("border-style", keyword_or_sides(value, &BORDER_STYLE)?),
        "BorderThickness" => out.set_css("border-width", length_or_sides(value)?),
        "Padding" => out.set_css("padding", length_or_sides(value)?),
        "SpaceBefore" => out.set_margin("top", length(value)?),
        "SpaceAfter" => out.set_margin("bottom", length(value)?),
        "StartIndent" => out.set_margin("left", length(value)?),
        "EndIndent" => out.set_margin("right", length(value)?),
        "TextIndent" => out.set_css("text-indent", length(value)?),
        "TextAlign" => out.set_css("text-align", *TEXT_ALIGN.get(value.as_name()?)?),
        "BlockAlign" => out.set_css("vertical-align", *BLOCK_ALIGN.get(value.as_name()?)?),
        "InlineAlign" => out.set_css("text-align", *TEXT_ALIGN.get(value.as_name()?)?),
        "Width" => out.set_css("width", length_or_auto(value)?),
        "Height" => out.set_css("height", length_or_auto(value)?),
        "LineHeight" => match value {
            Object::Name(n) if n == "Normal" || n == "Auto" => out.set_css("line-height", "normal"),
            other => out.set_css("line-height", length(other)?),
        },
        "BaselineShift" => out.set_css("vertical-align", length(value)?),
        "TextDecorationType" => {
            out.set_css("text-decoration", *TEXT_DECORATION.get(value.as_name()?)?)
        },
        "TextDecorationColor" => out.set_css("text-decoration-color", color(value)?),
        "TextDecorationThickness" => out.set_css("text-decoration-thickness", length(value)?),
        "RubyAlign" => out.set_css("ruby-align", *RUBY_ALIGN.get(value.as_name()?)?),
        "RubyPosition" => match value.as_name()? {
            "Inline" => {},
            pos => out.set_css("ruby-position", *RUBY_POSITION.get(pos)?),
        },
        "ColumnCount" => out.set_css("column-count", positive_integer(value)?),
        "ColumnGap" => match value {
            Object::Array(gaps) => out.set_css("column-gap", length(gaps.first()?)?),
            other => out.set_css("column-gap", length(other)?),
        },
        // Table-cell border/padding, bounding box and text position are
        // consumed elsewhere or have no CSS counterpart.
        "TBorderStyle" | "TPadding" | "BBox" | "TextPosition" | "GlyphOrientationVertical"
        | "ColumnWidths" => {},
        _ => log::trace!("Layout attribute {} has no CSS mapping", key),
    }
    Some(())
}

fn apply_html(out: &mut ResolvedAttributes, key: &str, value: &Object) -> Option<()> {
    match value {
        Object::Boolean(false) => {
            out.html.shift_remove(key);
        },
        Object::Boolean(true) => out.set_html(key, ""),
        other => out.set_html(key, plain_value(other)?),
    }
    Some(())
}

fn apply_css(out: &mut ResolvedAttributes, key: &str, value: &Object) -> Option<()> {
    let value = match value {
        Object::Name(n) => n.to_ascii_lowercase(),
        other => plain_value(other)?,
    };
    out.set_css(&kebab_case(key), value);
    Some(())
}

fn apply_aria(out: &mut ResolvedAttributes, key: &str, value: &Object) -> Option<()> {
    let lower = key.to_ascii_lowercase();
    let name = if lower == "role" || lower.starts_with("aria-") {
        lower
    } else {
        format!("aria-{}", lower)
    };
    let value = match value {
        Object::Boolean(b) => b.to_string(),
        other => plain_value(other)?,
    };
    out.set_html(&name, value);
    Some(())
}

/// Convert `CamelCase` or `camelCase` to `kebab-case`; kebab input is unchanged.
pub fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('-') {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Strings, names, numbers and arrays of those as text.
fn plain_value(value: &Object) -> Option<String> {
    match value {
        Object::Name(_) | Object::String(_) => value.as_name_or_text(),
        Object::Integer(_) | Object::Real(_) => value.as_number().map(format_number),
        Object::Array(items) => {
            let parts: Option<Vec<String>> = items.iter().map(plain_value).collect();
            Some(parts?.join(" "))
        },
        _ => None,
    }
}

fn positive_integer(value: &Object) -> Option<String> {
    let n = value.as_number()?;
    if n >= 1.0 && n.fract() == 0.0 {
        Some(format_number(n))
    } else {
        None
    }
}

fn length(value: &Object) -> Option<String> {
    let n = value.as_number()?;
    n.is_finite().then(|| format!("{}px", format_number(n)))
}

fn length_or_auto(value: &Object) -> Option<String> {
    match value {
        Object::Name(n) if n == "Auto" => Some("auto".to_string()),
        other => length(other),
    }
}

/// A single value, or a `[before after start end]` array in CSS side order.
fn sides<F>(value: &Object, single: F) -> Option<String>
where
    F: Fn(&Object) -> Option<String>,
{
    match value.as_array() {
        Some(items) if items.len() == 4 && !is_color_array(items) => {
            let v: Option<Vec<String>> = items.iter().map(&single).collect();
            let v = v?;
            // before, after, start, end -> top, right, bottom, left
            Some(format!("{} {} {} {}", v[0], v[3], v[1], v[2]))
        },
        _ => single(value),
    }
}

fn is_color_array(items: &[Object]) -> bool {
    items.iter().all(|o| o.as_number().is_some())
}

fn length_or_sides(value: &Object) -> Option<String> {
    match value.as_array() {
        Some(items) if items.len() == 4 => {
            let v: Option<Vec<String>> = items.iter().map(length).collect();
            let v = v?;
            Some(format!("{} {} {} {}", v[0], v[3], v[1], v[2]))
        },
        _ => length(value),
    }
}

fn keyword_or_sides(value: &Object, table: &phf::Map<&'static str, &'static str>) -> Option<String> {
    sides(value, |v| v.as_name().and_then(|n| table.get(n)).map(|s| s.to_string()))
}

fn color_or_sides(value: &Object) -> Option<String> {
    match value.as_array() {
        Some(items) if items.len() == 4 && items.iter().all(|i| i.as_array().is_some()) => {
            sides(value, color)
        },
        _ => color(value),
    }
}

fn color(value: &Object) -> Option<String> {
    let components: Option<Vec<f32>> = value
        .as_array()?
        .iter()
        .map(|c| c.as_number().map(|n| n as f32))
        .collect();
    Rgb::from_components(&components?).map(|c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(dicts: &[AttributeDict]) -> ResolvedAttributes {
        let refs: Vec<&AttributeDict> = dicts.iter().collect();
        resolve_attributes(&refs)
    }

    fn nums(values: &[f64]) -> Object {
        Object::Array(values.iter().map(|v| Object::Real(*v)).collect())
    }

    #[test]
    fn test_css_category_beats_layout() {
        let css = AttributeDict::new("CSS-2.00").with("TextAlign", Object::name("Right"));
        let layout = AttributeDict::new("Layout").with("TextAlign", Object::name("Center"));
        // Declaration order does not matter across categories.
        let out = resolve(&[css, layout]);
        assert_eq!(out.css.get("text-align").map(String::as_str), Some("right"));
        assert_eq!(out.style().as_deref(), Some("text-align: right"));
    }

    #[test]
    fn test_aria_beats_html() {
        let aria = AttributeDict::new("ARIA-1.1").with("Label", Object::text("from aria"));
        let html = AttributeDict::new("HTML-5.00").with("aria-label", Object::text("from html"));
        let table = AttributeDict::new("Table").with("Short", Object::text("abbr"));
        let out = resolve(&[aria, html, table]);
        assert_eq!(out.html.get("aria-label").map(String::as_str), Some("from aria"));
        assert_eq!(out.html.get("abbr").map(String::as_str), Some("abbr"));
    }

    #[test]
    fn test_margin_locks_display_block() {
        let layout = AttributeDict::new("Layout")
            .with("SpaceBefore", Object::Integer(12))
            .with("Placement", Object::name("Inline"));
        let out = resolve(&[layout]);
        assert_eq!(out.css.get("display").map(String::as_str), Some("block"));
        assert_eq!(out.css.get("margin-top").map(String::as_str), Some("12px"));
    }

    #[test]
    fn test_placement_without_margin() {
        let out = resolve(&[AttributeDict::new("Layout").with("Placement", Object::name("Inline"))]);
        assert_eq!(out.css.get("display").map(String::as_str), Some("inline"));

        let out = resolve(&[AttributeDict::new("Layout").with("Placement", Object::name("Before"))]);
        assert_eq!(out.css.get("clear").map(String::as_str), Some("both"));

        let out = resolve(&[AttributeDict::new("Layout").with("Placement", Object::name("End"))]);
        assert_eq!(out.css.get("float").map(String::as_str), Some("right"));
    }

    #[test]
    fn test_colors() {
        let layout = AttributeDict::new("Layout")
            .with("Color", nums(&[1.0, 0.0, 0.0]))
            .with("BackgroundColor", nums(&[0.5]))
            .with("BorderColor", nums(&[0.0, 0.0, 0.0, 1.0]));
        let out = resolve(&[layout]);
        assert_eq!(out.css["color"], "rgb(255, 0, 0)");
        assert_eq!(out.css["background-color"], "rgb(128, 128, 128)");
        assert_eq!(out.css["border-color"], "rgb(0, 0, 0)");
    }

    #[test]
    fn test_malformed_value_skips_only_that_attribute() {
        let layout = AttributeDict::new("Layout")
            .with("Color", nums(&[1.0, 0.0]))
            .with("TextAlign", Object::Integer(3))
            .with("TextIndent", Object::Real(4.5));
        let out = resolve(&[layout]);
        assert!(!out.css.contains_key("color"));
        assert!(!out.css.contains_key("text-align"));
        assert_eq!(out.css["text-indent"], "4.5px");
    }

    #[test]
    fn test_name_tables() {
        let layout = AttributeDict::new("Layout")
            .with("WritingMode", Object::name("RlTb"))
            .with("TextDecorationType", Object::name("LineThrough"))
            .with("RubyAlign", Object::name("Distribute"))
            .with("RubyPosition", Object::name("After"));
        let out = resolve(&[layout]);
        assert_eq!(out.css["writing-mode"], "horizontal-tb");
        assert_eq!(out.css["direction"], "rtl");
        assert_eq!(out.css["text-decoration"], "line-through");
        assert_eq!(out.css["ruby-align"], "space-between");
        assert_eq!(out.css["ruby-position"], "under");
    }

    #[test]
    fn test_table_attributes() {
        let table = AttributeDict::new("Table")
            .with("ColSpan", Object::Integer(2))
            .with("RowSpan", Object::Integer(0))
            .with("Scope", Object::name("Column"))
            .with("Headers", Object::Array(vec![Object::text("h1"), Object::text("h2")]));
        let out = resolve(&[table]);
        assert_eq!(out.html["colspan"], "2");
        assert!(!out.html.contains_key("rowspan"));
        assert_eq!(out.html["scope"], "col");
        assert_eq!(out.html["headers"], "h1 h2");
    }

    #[test]
    fn test_padding_sides() {
        let layout = AttributeDict::new("Layout").with("Padding", nums(&[1.0, 2.0, 3.0, 4.0]));
        let out = resolve(&[layout]);
        assert_eq!(out.css["padding"], "1px 4px 2px 3px");
    }

    #[test]
    fn test_ignored_owners() {
        let out = resolve(&[
            AttributeDict::new("PrintField").with("Role", Object::name("tv")),
            AttributeDict::new("List").with("ListNumbering", Object::name("Decimal")),
        ]);
        assert_eq!(out, ResolvedAttributes::default());
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("TextAlign"), "text-align");
        assert_eq!(kebab_case("fontSize"), "font-size");
        assert_eq!(kebab_case("margin-top"), "margin-top");
        assert_eq!(kebab_case("color"), "color");
    }

    #[test]
    fn test_aria_key_names() {
        let aria = AttributeDict::new("ARIA-1.1")
            .with("role", Object::text("note"))
            .with("Hidden", Object::Boolean(true));
        let out = resolve(&[aria]);
        assert_eq!(out.html["role"], "note");
        assert_eq!(out.html["aria-hidden"], "true");
    }
}
