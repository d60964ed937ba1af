//! Marked-content correlation.
//!
//! A single pass over a page's operators attributes text, images and drawing
//! operators to the marked-content identifiers (MCIDs) that are active when
//! they occur. The result is queried per MCID by the converter. Pages are
//! extracted at most once per conversion through [`ContentCache`].
//!
//! Attribution rules:
//! - content inside nested marked-content sequences belongs to every active MCID
//! - a sequence carrying `/ActualText` swallows its text; the replacement is
//!   attributed when the sequence ends
//! - whitespace-only text goes to the previously active MCIDs while the current
//!   ones have no visible text yet, and is dropped outside any sequence

use super::graphics_state::GraphicsStateStack;
use super::operators::Operator;
use crate::document::ObjectModelProvider;
use crate::elements::ImageContent;
use crate::object::{Dictionary, Object};
use crate::structure::PageId;
use std::collections::HashMap;

/// Marked-content properties captured from a `BDC` property list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkedContentProperties {
    /// `/Lang`
    pub lang: Option<String>,
    /// `/ActualText`
    pub actual_text: Option<String>,
    /// `/Alt`
    pub alt: Option<String>,
    /// `/E`
    pub expansion: Option<String>,
}

impl MarkedContentProperties {
    fn from_dict(dict: &Dictionary) -> Self {
        let text = |key: &str| dict.get(key).and_then(Object::as_name_or_text);
        Self {
            lang: text("Lang"),
            actual_text: text("ActualText"),
            alt: text("Alt"),
            expansion: text("E"),
        }
    }
}

/// A text value split around its edge whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextParts<'a> {
    /// Leading whitespace
    pub leading: &'a str,
    /// Text without edge whitespace
    pub core: &'a str,
    /// Trailing whitespace
    pub trailing: &'a str,
}

impl<'a> TextParts<'a> {
    /// Split a string into leading whitespace, core and trailing whitespace.
    pub fn split(text: &'a str) -> Self {
        let start = text.len() - text.trim_start().len();
        let core = text[start..].trim_end();
        let end = start + core.len();
        Self {
            leading: &text[..start],
            core,
            trailing: &text[end..],
        }
    }
}

/// Everything attributed to one MCID on one page.
#[derive(Debug, Clone, Default)]
pub struct McidContent {
    /// Assembled text
    pub text: String,
    /// Images painted inside the sequence
    pub images: Vec<ImageContent>,
    /// Drawing operators, preceded by the graphics state they started in
    pub operators: Vec<Operator>,
    /// Properties of the first `BDC` that declared this MCID
    pub properties: Option<MarkedContentProperties>,
    /// Text came from a marked-content `/ActualText`
    pub has_actual_text: bool,
    has_visible_text: bool,
    has_painting: bool,
}

impl McidContent {
    /// True when the sequence only draws paths: no visible text and no images.
    pub fn is_vector_only(&self) -> bool {
        self.has_painting && !self.has_visible_text && self.images.is_empty()
    }
}

/// One open marked-content sequence.
#[derive(Debug)]
struct Frame {
    mcid: Option<u32>,
    actual_text: Option<String>,
}

/// Per-page content, indexed by MCID.
#[derive(Debug, Default)]
pub struct PageContentIndex {
    regions: HashMap<u32, McidContent>,
}

impl PageContentIndex {
    /// Run the extraction pass over a page's operators.
    ///
    /// `resolve_image` maps an XObject name from a `Do` operator to an image;
    /// form XObjects and unknown names return `None`.
    pub fn extract<F>(ops: &[Operator], mut resolve_image: F) -> Self
    where
        F: FnMut(&str) -> Option<ImageContent>,
    {
        let mut ex = Extraction::default();

        for op in ops {
            match op {
                Operator::BeginMarkedContent { .. } => ex.push(Frame {
                    mcid: None,
                    actual_text: None,
                }),
                Operator::BeginMarkedContentDict { properties, .. } => {
                    let dict = properties.as_dict();
                    let mcid = dict
                        .and_then(|d| d.get("MCID"))
                        .and_then(Object::as_integer)
                        .and_then(|m| u32::try_from(m).ok());
                    let props = dict.map(MarkedContentProperties::from_dict).unwrap_or_default();
                    if let Some(mcid) = mcid {
                        let region = ex.index.regions.entry(mcid).or_default();
                        if region.properties.is_none() {
                            region.properties = Some(props.clone());
                        }
                    }
                    ex.push(Frame {
                        mcid,
                        actual_text: props.actual_text,
                    });
                },
                Operator::EndMarkedContent => ex.pop(),
                Operator::ShowText { text } => ex.text(text),
                Operator::Do { name } => {
                    ex.attribute_operator(op);
                    match resolve_image(name) {
                        Some(image) => ex.image(image),
                        None => log::trace!("XObject {} is not an image", name),
                    }
                },
                Operator::InlineImage { dict, data } => {
                    ex.attribute_operator(op);
                    ex.image(ImageContent::from_inline(dict, data.clone()));
                },
                other if other.is_path_operator() || other.is_graphics_state() => {
                    ex.attribute_operator(other);
                    ex.gs.apply(other);
                },
                _ => {},
            }
        }

        if !ex.stack.is_empty() {
            log::debug!("{} marked-content sequences left open at end of page", ex.stack.len());
        }

        ex.index
    }

    /// Content attributed to an MCID.
    pub fn region(&self, mcid: u32) -> Option<&McidContent> {
        self.regions.get(&mcid)
    }

    /// Assembled text for an MCID (empty when nothing was attributed).
    pub fn text_for(&self, mcid: u32) -> &str {
        self.regions.get(&mcid).map(|r| r.text.as_str()).unwrap_or("")
    }

    /// Text for an MCID split around edge whitespace.
    pub fn text_parts(&self, mcid: u32) -> TextParts<'_> {
        TextParts::split(self.text_for(mcid))
    }

    /// Images painted inside an MCID.
    pub fn images_for(&self, mcid: u32) -> &[ImageContent] {
        self.regions
            .get(&mcid)
            .map(|r| r.images.as_slice())
            .unwrap_or(&[])
    }

    /// Drawing operators attributed to an MCID.
    pub fn operators_for(&self, mcid: u32) -> &[Operator] {
        self.regions
            .get(&mcid)
            .map(|r| r.operators.as_slice())
            .unwrap_or(&[])
    }

    /// Marked-content properties of an MCID.
    pub fn properties_for(&self, mcid: u32) -> Option<&MarkedContentProperties> {
        self.regions.get(&mcid).and_then(|r| r.properties.as_ref())
    }

    /// True if the MCID only draws vector graphics.
    pub fn is_vector_only(&self, mcid: u32) -> bool {
        self.regions.get(&mcid).is_some_and(McidContent::is_vector_only)
    }
}

#[derive(Default)]
struct Extraction {
    index: PageContentIndex,
    stack: Vec<Frame>,
    previous: Vec<u32>,
    gs: GraphicsStateStack,
}

impl Extraction {
    fn active(&self) -> Vec<u32> {
        let mut ids = Vec::new();
        for mcid in self.stack.iter().filter_map(|f| f.mcid) {
            if !ids.contains(&mcid) {
                ids.push(mcid);
            }
        }
        ids
    }

    fn push(&mut self, frame: Frame) {
        let before = self.active();
        self.stack.push(frame);
        self.remember(before);
    }

    fn pop(&mut self) {
        let before = self.active();
        let Some(frame) = self.stack.pop() else {
            log::debug!("EMC without matching BMC/BDC ignored");
            return;
        };

        if let Some(actual) = frame.actual_text {
            // An enclosing ActualText replaces this one too.
            if !self.stack.iter().any(|f| f.actual_text.is_some()) {
                for mcid in &before {
                    let region = self.index.regions.entry(*mcid).or_default();
                    region.text.push_str(&actual);
                    region.has_actual_text = true;
                    if !actual.trim().is_empty() {
                        region.has_visible_text = true;
                    }
                }
            }
        }

        self.remember(before);
    }

    fn remember(&mut self, before: Vec<u32>) {
        if !before.is_empty() && before != self.active() {
            self.previous = before;
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() || self.stack.iter().any(|f| f.actual_text.is_some()) {
            return;
        }
        let active = self.active();
        if active.is_empty() {
            return;
        }

        let whitespace = text.trim().is_empty();
        let targets = if whitespace
            && !self.previous.is_empty()
            && !active
                .iter()
                .any(|m| self.index.regions.get(m).is_some_and(|r| r.has_visible_text))
        {
            self.previous.clone()
        } else {
            active
        };

        for mcid in targets {
            let region = self.index.regions.entry(mcid).or_default();
            region.text.push_str(text);
            if !whitespace {
                region.has_visible_text = true;
            }
        }
    }

    fn image(&mut self, image: ImageContent) {
        for mcid in self.active() {
            self.index
                .regions
                .entry(mcid)
                .or_default()
                .images
                .push(image.clone());
        }
    }

    fn attribute_operator(&mut self, op: &Operator) {
        let active = self.active();
        if active.is_empty() {
            return;
        }
        let prelude = self.gs.current().prelude();
        for mcid in active {
            let region = self.index.regions.entry(mcid).or_default();
            if region.operators.is_empty() {
                region.operators.extend(prelude.iter().cloned());
            }
            region.operators.push(op.clone());
            if op.is_path_painting() {
                region.has_painting = true;
            }
        }
    }
}

/// Per-conversion memo of extracted pages.
#[derive(Debug, Default)]
pub struct ContentCache {
    pages: HashMap<PageId, PageContentIndex>,
}

impl ContentCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The content index for a page, extracting it on first use.
    ///
    /// A page the provider cannot deliver yields an empty index.
    pub fn page(&mut self, page: PageId, provider: &dyn ObjectModelProvider) -> &PageContentIndex {
        self.pages.entry(page).or_insert_with(|| {
            log::debug!("Extracting marked content for page {}", page);
            match provider.page_operators(page) {
                Ok(ops) => PageContentIndex::extract(&ops, |name| provider.xobject_image(page, name)),
                Err(e) => {
                    log::warn!("Page {} content unavailable: {}", page, e);
                    PageContentIndex::default()
                },
            }
        })
    }

    /// Number of pages extracted so far.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// True if no page has been extracted.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ImageFormat;

    fn bdc(mcid: u32) -> Operator {
        bdc_with(mcid, vec![])
    }

    fn bdc_with(mcid: u32, extra: Vec<(&str, Object)>) -> Operator {
        let mut dict = Dictionary::new();
        dict.insert("MCID".to_string(), Object::Integer(mcid as i64));
        for (k, v) in extra {
            dict.insert(k.to_string(), v);
        }
        Operator::BeginMarkedContentDict {
            tag: "P".to_string(),
            properties: Object::Dictionary(dict),
        }
    }

    fn text(s: &str) -> Operator {
        Operator::ShowText { text: s.to_string() }
    }

    fn no_images(_: &str) -> Option<ImageContent> {
        None
    }

    #[test]
    fn test_text_attributed_to_mcid() {
        let ops = vec![bdc(0), text("Hello"), Operator::EndMarkedContent, bdc(1), text("World"), Operator::EndMarkedContent];
        let index = PageContentIndex::extract(&ops, no_images);
        assert_eq!(index.text_for(0), "Hello");
        assert_eq!(index.text_for(1), "World");
        assert_eq!(index.text_for(2), "");
    }

    #[test]
    fn test_nested_sequences_share_content() {
        let ops = vec![
            bdc(0),
            text("a"),
            bdc(1),
            text("b"),
            Operator::EndMarkedContent,
            Operator::EndMarkedContent,
        ];
        let index = PageContentIndex::extract(&ops, no_images);
        assert_eq!(index.text_for(0), "ab");
        assert_eq!(index.text_for(1), "b");
    }

    #[test]
    fn test_whitespace_goes_to_previous_set() {
        let ops = vec![
            bdc(0),
            text("One"),
            Operator::EndMarkedContent,
            bdc(1),
            text(" "),
            text("Two"),
            Operator::EndMarkedContent,
        ];
        let index = PageContentIndex::extract(&ops, no_images);
        assert_eq!(index.text_for(0), "One ");
        assert_eq!(index.text_for(1), "Two");
    }

    #[test]
    fn test_whitespace_after_visible_text_stays() {
        let ops = vec![
            bdc(0),
            text("One"),
            Operator::EndMarkedContent,
            bdc(1),
            text("Two"),
            text(" "),
            Operator::EndMarkedContent,
        ];
        let index = PageContentIndex::extract(&ops, no_images);
        assert_eq!(index.text_for(1), "Two ");
        assert_eq!(index.text_parts(1).trailing, " ");
    }

    #[test]
    fn test_whitespace_outside_regions_dropped() {
        let ops = vec![text(" "), bdc(0), text("x"), Operator::EndMarkedContent, text(" ")];
        let index = PageContentIndex::extract(&ops, no_images);
        assert_eq!(index.text_for(0), "x");
    }

    #[test]
    fn test_actual_text_replaces_region_text() {
        let ops = vec![
            bdc(0),
            text("The "),
            Operator::BeginMarkedContentDict {
                tag: "Span".to_string(),
                properties: Object::Dictionary(
                    [("ActualText".to_string(), Object::text("fi"))]
                        .into_iter()
                        .collect(),
                ),
            },
            text("\u{FB01}"),
            Operator::EndMarkedContent,
            text("ne"),
            Operator::EndMarkedContent,
        ];
        let index = PageContentIndex::extract(&ops, no_images);
        assert_eq!(index.text_for(0), "The fine");
        assert!(index.region(0).unwrap().has_actual_text);
    }

    #[test]
    fn test_properties_captured_once() {
        let ops = vec![
            bdc_with(3, vec![("Lang", Object::text("fr")), ("E", Object::text("et cetera"))]),
            Operator::EndMarkedContent,
            bdc_with(3, vec![("Lang", Object::text("de"))]),
            Operator::EndMarkedContent,
        ];
        let index = PageContentIndex::extract(&ops, no_images);
        let props = index.properties_for(3).unwrap();
        assert_eq!(props.lang.as_deref(), Some("fr"));
        assert_eq!(props.expansion.as_deref(), Some("et cetera"));
    }

    #[test]
    fn test_text_parts_split() {
        let parts = TextParts::split("  core text \n");
        assert_eq!(parts.leading, "  ");
        assert_eq!(parts.core, "core text");
        assert_eq!(parts.trailing, " \n");

        let blank = TextParts::split("   ");
        assert_eq!((blank.leading, blank.core, blank.trailing), ("   ", "", ""));
    }

    #[test]
    fn test_vector_only_region_gets_state_prelude() {
        let ops = vec![
            Operator::Cm {
                a: 2.0,
                b: 0.0,
                c: 0.0,
                d: 2.0,
                e: 0.0,
                f: 0.0,
            },
            bdc(0),
            Operator::Rectangle {
                x: 0.0,
                y: 0.0,
                width: 10.0,
                height: 10.0,
            },
            Operator::Fill,
            Operator::EndMarkedContent,
        ];
        let index = PageContentIndex::extract(&ops, no_images);
        assert!(index.is_vector_only(0));
        let attributed = index.operators_for(0);
        assert!(matches!(attributed[0], Operator::Cm { a, .. } if a == 2.0));
        assert_eq!(attributed.last(), Some(&Operator::Fill));
    }

    #[test]
    fn test_region_with_text_is_not_vector_only() {
        let ops = vec![
            bdc(0),
            Operator::MoveTo { x: 0.0, y: 0.0 },
            Operator::LineTo { x: 1.0, y: 1.0 },
            Operator::Stroke,
            text("label"),
            Operator::EndMarkedContent,
        ];
        let index = PageContentIndex::extract(&ops, no_images);
        assert!(!index.is_vector_only(0));
    }

    #[test]
    fn test_do_resolves_images() {
        let ops = vec![
            bdc(4),
            Operator::Do {
                name: "Im1".to_string(),
            },
            Operator::Do {
                name: "Fm1".to_string(),
            },
            Operator::EndMarkedContent,
        ];
        let index = PageContentIndex::extract(&ops, |name| {
            (name == "Im1").then(|| ImageContent::new(ImageFormat::Jpeg, vec![1], 1, 1))
        });
        assert_eq!(index.images_for(4).len(), 1);
        assert!(!index.is_vector_only(4));
    }

    #[test]
    fn test_unbalanced_emc_is_ignored() {
        let ops = vec![Operator::EndMarkedContent, bdc(0), text("ok"), Operator::EndMarkedContent];
        let index = PageContentIndex::extract(&ops, no_images);
        assert_eq!(index.text_for(0), "ok");
    }
}
