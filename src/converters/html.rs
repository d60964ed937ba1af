//! Structure tree to HTML.
//!
//! A single depth-first pass over the structure tree. Every element resolves
//! its role, selects a tag from the role and the inherited [`Context`], runs the
//! attribute cascade and renders its children; marked-content leaves pull text,
//! images and vector graphics from the per-page content index.
//!
//! Every element that produces a tag carries `data-pdf-se-type` (the resolved
//! role) and, when the raw type differs, `data-pdf-se-type-original`.

use super::attributes::resolve_attributes;
use super::spacing::{needs_space, InlineRun};
use super::svg::emit_svg;
use super::tags::{default_tag, is_math_token, parse_list_label, ListNumbering};
use crate::annotations::{Annotation, AnnotationSubtype, LinkAction, LinkDestination};
use crate::config::ConversionOptions;
use crate::content::{ContentCache, McidContent, TextParts};
use crate::document::{ObjectModelProvider, ReferencedObject};
use crate::elements::ImageContent;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::object::ObjectRef;
use crate::structure::{
    resolve_role, AttributeDict, ElemId, OwnerCategory, PageId, ResolvedRole, StructChild, StructElem,
    StructTreeRoot, StructType, MATHML_NS,
};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

lazy_static! {
    /// Tag names accepted from the HTML namespace
    static ref RE_TAG_NAME: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").unwrap();

    /// Attribute names that can be written without quoting problems
    static ref RE_ATTR_NAME: Regex = Regex::new(r"^[A-Za-z_:][-A-Za-z0-9_:.]*$").unwrap();
}

/// Prefix of generated element identifiers.
const ID_PREFIX: &str = "pdf-se-";

/// Nesting limit for the label and link look-ahead walks.
const MAX_LOOKAHEAD_DEPTH: usize = 64;

/// Tags that must become `span` in phrasing context.
static BLOCK_TAGS: phf::Set<&'static str> = phf::phf_set! {
    "p", "div", "section", "article", "aside", "blockquote", "figure", "figcaption",
    "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "dl", "li", "dt", "dd",
    "table", "caption", "thead", "tbody", "tfoot", "tr", "th", "td",
};

/// A marked-content reference in the id index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContentRef {
    /// Page index
    pub page: PageId,
    /// Marked-content identifier
    pub mcid: u32,
}

/// Output of [`render`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderedDocument {
    /// Body markup
    pub body: String,
    /// Element identifier to the marked content the element owns
    pub content_index: IndexMap<String, Vec<ContentRef>>,
}

/// Convert a tagged document's structure tree to HTML body markup.
///
/// Fails only when the document has no structure tree; every other problem is
/// logged and recovered locally.
///
/// ```
/// use tagged_pdf_html::document::SnapshotDocument;
/// use tagged_pdf_html::structure::{StructElem, StructTreeBuilder};
/// use tagged_pdf_html::{render, ConversionOptions};
///
/// let mut builder = StructTreeBuilder::new();
/// let sect = builder.add_root(StructElem::new("Sect"));
/// builder.add_child(sect, StructElem::new("H").with_actual_text("Intro"));
/// let doc = SnapshotDocument::new(builder.build());
///
/// let out = render(&doc, &ConversionOptions::default())?;
/// assert!(out.body.contains("<h2 data-pdf-se-type=\"H\">Intro</h2>"));
/// # Ok::<(), tagged_pdf_html::Error>(())
/// ```
pub fn render(provider: &dyn ObjectModelProvider, options: &ConversionOptions) -> Result<RenderedDocument> {
    let tree = provider.structure_tree().ok_or(Error::NotTagged)?;
    log::debug!("Rendering structure tree with {} elements", tree.elements.len());

    let mut renderer = Renderer::new(provider, tree, options);
    let root = renderer.render_children(&tree.root_children, &Context::default());
    log::debug!("Extracted content from {} pages", renderer.cache.len());

    Ok(RenderedDocument {
        body: root.html,
        content_index: renderer.content_index,
    })
}

/// Escape special HTML characters.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// State inherited down the tree. Cloned with overrides for each child.
#[derive(Debug, Clone, Default)]
struct Context {
    parent_role: Option<ResolvedRole>,
    page: Option<PageId>,
    list_numbering: Option<ListNumbering>,
    heading_depth: Option<u32>,
    bbox: Option<Rect>,
    prefer_svg: bool,
    image_alt: Option<String>,
    in_math: bool,
    in_math_token: bool,
    in_form: bool,
    in_anchor: bool,
    /// Inside an inline Figure/Formula: block tags degrade to `span`
    inline: bool,
}

impl Context {
    fn parent_is(&self, ty: &StructType) -> bool {
        self.parent_role.as_ref().is_some_and(|r| r.is(ty))
    }

    fn parent_type(&self) -> Option<&StructType> {
        self.parent_role.as_ref().and_then(ResolvedRole::struct_type)
    }

    fn parent_inline(&self) -> bool {
        self.inline || self.parent_type().is_some_and(StructType::is_inline_context)
    }

    fn in_description_list(&self) -> bool {
        self.list_numbering == Some(ListNumbering::Description)
    }
}

/// Result of rendering one node.
#[derive(Debug, Clone, Default)]
struct Rendered {
    html: String,
    text: String,
    /// Outermost tag, `None` for transparent nodes and leaves
    tag: Option<String>,
    role: Option<ResolvedRole>,
    is_script: bool,
    has_actual_text: bool,
    /// Contains an `<img>` or image placeholder carrying the alternate text
    has_image: bool,
}

/// Tag selection for one element.
#[derive(Debug)]
struct Selection {
    tag: Option<String>,
    attrs: IndexMap<String, String>,
    css: Vec<(&'static str, String)>,
    child: Context,
    math_wrapper: bool,
}

impl Selection {
    fn new(tag: &str, child: Context) -> Self {
        Self {
            tag: Some(tag.to_string()),
            attrs: IndexMap::new(),
            css: Vec::new(),
            child,
            math_wrapper: false,
        }
    }

    fn attr(&mut self, key: &str, value: impl Into<String>) {
        self.attrs.insert(key.to_string(), value.into());
    }
}

/// Run-scoped identifier table.
#[derive(Debug, Default)]
struct IdAllocator {
    assigned: HashMap<ElemId, String>,
    used: HashSet<String>,
    next: usize,
}

impl IdAllocator {
    fn new(tree: &StructTreeRoot) -> Self {
        Self {
            used: tree.elements.iter().filter_map(|e| e.id.clone()).collect(),
            ..Default::default()
        }
    }

    /// The element's explicit identifier, or a generated one that stays the
    /// same for the whole run.
    fn id_for(&mut self, id: ElemId, elem: &StructElem) -> String {
        if let Some(explicit) = &elem.id {
            return explicit.clone();
        }
        if let Some(existing) = self.assigned.get(&id) {
            return existing.clone();
        }
        let generated = loop {
            self.next += 1;
            let candidate = format!("{}{}", ID_PREFIX, self.next);
            if self.used.insert(candidate.clone()) {
                break candidate;
            }
        };
        self.assigned.insert(id, generated.clone());
        generated
    }
}

struct Renderer<'a> {
    provider: &'a dyn ObjectModelProvider,
    tree: &'a StructTreeRoot,
    options: &'a ConversionOptions,
    cache: ContentCache,
    ids: IdAllocator,
    content_index: IndexMap<String, Vec<ContentRef>>,
    /// Elements some structure destination points at
    link_targets: HashSet<ElemId>,
    visiting: HashSet<ElemId>,
}

impl<'a> Renderer<'a> {
    fn new(provider: &'a dyn ObjectModelProvider, tree: &'a StructTreeRoot, options: &'a ConversionOptions) -> Self {
        let mut renderer = Self {
            provider,
            tree,
            options,
            cache: ContentCache::new(),
            ids: IdAllocator::new(tree),
            content_index: IndexMap::new(),
            link_targets: HashSet::new(),
            visiting: HashSet::new(),
        };
        renderer.collect_link_targets();
        renderer
    }

    /// Find every element targeted by a structure destination, so that it
    /// gets an identifier even when it owns no content.
    fn collect_link_targets(&mut self) {
        let mut actions: Vec<LinkAction> = Vec::new();
        for elem in &self.tree.elements {
            if let Some(link) = &elem.link {
                actions.push(link.clone());
            }
            for child in &elem.children {
                if let StructChild::Object { obj, .. } = child {
                    if let Some(action) = self.link_annotation(*obj).and_then(|a| a.link_action()) {
                        actions.push(action);
                    }
                }
            }
        }
        for action in actions {
            if let LinkAction::GoTo(LinkDestination::Structure(target)) = action {
                match self.tree.element_by_ref(target) {
                    Some(id) => {
                        self.link_targets.insert(id);
                    },
                    None => log::debug!("Structure destination {} is not in the tree", target),
                }
            }
        }
    }

    fn role_of(&self, id: ElemId) -> Option<ResolvedRole> {
        self.tree
            .element(id)
            .filter(|e| !e.struct_type.is_empty())
            .map(|e| resolve_role(&e.struct_type, &e.namespace, &self.tree.role_map))
    }

    fn render_children(&mut self, children: &[StructChild], ctx: &Context) -> Rendered {
        let inline_parent = ctx.parent_type().is_some_and(StructType::is_inline_context);
        let list_parent = ctx.parent_type().is_some_and(StructType::is_list);

        let mut out = Rendered::default();
        let mut previous: Option<Rendered> = None;

        for child in self.caption_first(children) {
            let mut part = match child {
                StructChild::Element(id) => self.render_element(id, ctx),
                StructChild::MarkedContent { mcid, page } => self.render_mcid(mcid, page.or(ctx.page), ctx),
                StructChild::Object { obj, page } => self.render_object(obj, page.or(ctx.page), ctx),
            };
            if part.html.is_empty() {
                continue;
            }

            let nested_list = part.tag.is_some()
                && part
                    .role
                    .as_ref()
                    .and_then(ResolvedRole::struct_type)
                    .is_some_and(StructType::is_list);
            if list_parent && nested_list {
                let wrapper = if ctx.in_description_list() { "div" } else { "li" };
                part.html = format!("<{0}>{1}</{0}>", wrapper, part.html);
            }

            if inline_parent {
                if let Some(prev) = &previous {
                    if needs_space(&run(prev), &run(&part)) {
                        out.html.push(' ');
                        out.text.push(' ');
                    }
                }
            }

            out.html.push_str(&part.html);
            out.text.push_str(&part.text);
            out.has_actual_text |= part.has_actual_text;
            out.has_image |= part.has_image;
            previous = Some(part);
        }

        out
    }

    /// Children in output order: captions first, everything else in place.
    fn caption_first(&self, children: &[StructChild]) -> Vec<StructChild> {
        let is_caption = |child: &StructChild| match child {
            StructChild::Element(id) => self.role_of(*id).is_some_and(|r| r.is(&StructType::Caption)),
            _ => false,
        };
        let (mut captions, rest): (Vec<StructChild>, Vec<StructChild>) =
            children.iter().cloned().partition(|c| is_caption(c));
        captions.extend(rest);
        captions
    }

    fn render_element(&mut self, id: ElemId, ctx: &Context) -> Rendered {
        let tree = self.tree;
        let Some(elem) = tree.element(id) else {
            log::debug!("Structure element {:?} does not exist", id);
            return Rendered::default();
        };
        if !self.visiting.insert(id) {
            log::warn!("Structure element {:?} is its own ancestor, skipping", id);
            return Rendered::default();
        }
        let rendered = self.render_struct_elem(id, elem, ctx);
        self.visiting.remove(&id);
        rendered
    }

    fn render_struct_elem(&mut self, id: ElemId, elem: &'a StructElem, ctx: &Context) -> Rendered {
        let page = elem.page.or(ctx.page);

        if elem.struct_type.is_empty() {
            log::debug!("Element {:?} has no structure type, rendering children only", id);
            let child_ctx = Context { page, ..ctx.clone() };
            return self.render_children(&elem.children, &child_ctx);
        }

        let role = resolve_role(&elem.struct_type, &elem.namespace, &self.tree.role_map);
        match role.struct_type() {
            Some(StructType::Artifact) | Some(StructType::Private) => return Rendered::default(),
            Some(StructType::NonStruct) => {
                let child_ctx = Context { page, ..ctx.clone() };
                return self.render_children(&elem.children, &child_ctx);
            },
            _ => {},
        }

        let attributes = self.tree.effective_attributes(elem);
        let mut sel = self.select(elem, &role, ctx, page, &attributes);

        let mut is_script = false;
        if let Some(position) = text_position(&attributes) {
            if sel.tag.as_deref().is_some_and(|t| t != "sup" && t != "sub") {
                sel.tag = Some(position.to_string());
            }
            is_script = sel.tag.as_deref() == Some(position);
        }

        let content = match &elem.actual_text {
            Some(actual) => Rendered {
                html: escape_html(actual),
                text: actual.clone(),
                has_actual_text: true,
                ..Default::default()
            },
            None => self.render_children(&elem.children, &sel.child),
        };
        let mut html = content.html;
        if let Some(expansion) = &elem.expansion {
            html = format!("<abbr title=\"{}\">{}</abbr>", escape_html(expansion), html);
        }

        let Some(tag) = sel.tag.take() else {
            return Rendered {
                html,
                text: content.text,
                tag: None,
                role: Some(role),
                is_script,
                has_actual_text: content.has_actual_text,
                has_image: content.has_image,
            };
        };

        let math_wrapper = sel.math_wrapper;
        let attrs = self.element_attributes(id, elem, &role, page, sel, attributes, content.has_image);
        let mut html = format!("{}{}</{}>", open_tag(&tag, &attrs), html, tag);
        if math_wrapper {
            html = format!("<math xmlns=\"{}\">{}</math>", MATHML_NS, html);
        }

        Rendered {
            html,
            text: content.text,
            tag: Some(tag),
            role: Some(role),
            is_script,
            has_actual_text: content.has_actual_text,
            has_image: content.has_image,
        }
    }

    /// Output attributes in a fixed order: id, cascade, tag-specific,
    /// element properties, style, provenance.
    fn element_attributes(
        &mut self,
        id: ElemId,
        elem: &StructElem,
        role: &ResolvedRole,
        page: Option<PageId>,
        sel: Selection,
        attributes: Vec<&AttributeDict>,
        has_image: bool,
    ) -> IndexMap<String, String> {
        let mut attrs = IndexMap::new();

        let owned: Vec<ContentRef> = elem
            .children
            .iter()
            .filter_map(|c| match c {
                StructChild::MarkedContent { mcid, page: own } => own.or(page).map(|page| ContentRef { page, mcid: *mcid }),
                _ => None,
            })
            .collect();
        if elem.id.is_some() || !owned.is_empty() || self.link_targets.contains(&id) {
            let element_id = self.ids.id_for(id, elem);
            if !owned.is_empty() {
                self.content_index
                    .entry(element_id.clone())
                    .or_default()
                    .extend(owned);
            }
            attrs.insert("id".to_string(), element_id);
        }

        let mut cascade = resolve_attributes(&attributes);
        attrs.extend(std::mem::take(&mut cascade.html));
        attrs.extend(sel.attrs);

        if let Some(lang) = &elem.lang {
            attrs.insert("lang".to_string(), lang.clone());
        }
        if let Some(title) = &elem.title {
            attrs.insert("title".to_string(), title.clone());
        }
        // Figure and Formula hand their Alt to the images inside, when there are any
        let is_figure = role.is(&StructType::Figure) || role.is(&StructType::Formula);
        if let Some(alt) = &elem.alt {
            if !is_figure {
                attrs.insert("aria-label".to_string(), alt.clone());
            } else if !has_image {
                attrs.insert("role".to_string(), "img".to_string());
                attrs.insert("aria-label".to_string(), alt.clone());
            }
        }

        for (key, value) in sel.css {
            cascade.set_css(key, value);
        }
        if let Some(style) = cascade.style() {
            attrs.insert("style".to_string(), style);
        }

        let resolved = role.name();
        let differs = resolved != elem.struct_type;
        attrs.insert("data-pdf-se-type".to_string(), resolved);
        if differs {
            attrs.insert("data-pdf-se-type-original".to_string(), elem.struct_type.clone());
        }
        attrs
    }

    fn select(
        &mut self,
        elem: &StructElem,
        role: &ResolvedRole,
        ctx: &Context,
        page: Option<PageId>,
        attributes: &[&AttributeDict],
    ) -> Selection {
        let child = Context {
            parent_role: Some(role.clone()),
            page,
            in_math_token: false,
            ..ctx.clone()
        };

        let mut sel = match role {
            ResolvedRole::Html(name) => {
                if RE_TAG_NAME.is_match(name) {
                    Selection::new(&name.to_ascii_lowercase(), child)
                } else {
                    log::debug!("Invalid HTML tag name '{}', using div", name);
                    Selection::new("div", child)
                }
            },
            ResolvedRole::MathMl(name) => {
                let mut sel = Selection::new(name, child);
                if name == "math" && !ctx.in_math {
                    sel.attr("xmlns", MATHML_NS);
                }
                sel.math_wrapper = name != "math" && !ctx.in_math;
                sel.child.in_math = true;
                sel.child.in_math_token = is_math_token(name);
                sel
            },
            ResolvedRole::Pdf(ty) => self.select_pdf(elem, ty, ctx, child, attributes),
        };

        if ctx.inline {
            if let Some(tag) = &sel.tag {
                if BLOCK_TAGS.contains(tag.as_str()) {
                    sel.tag = Some("span".to_string());
                }
            }
        }
        sel
    }

    fn select_pdf(
        &mut self,
        elem: &StructElem,
        ty: &StructType,
        ctx: &Context,
        child: Context,
        attributes: &[&AttributeDict],
    ) -> Selection {
        let mut sel = Selection::new(default_tag(ty), child);

        match ty {
            StructType::H | StructType::Hn(_) | StructType::Title => {
                if ctx.parent_is(&StructType::TH) || ctx.parent_is(&StructType::TD) {
                    sel.tag = Some("p".to_string());
                } else {
                    let level = match ty {
                        StructType::Hn(n) => *n,
                        StructType::Title => 1,
                        _ => ctx.heading_depth.unwrap_or(2),
                    };
                    if level <= 6 {
                        sel.tag = Some(format!("h{}", level));
                    } else {
                        sel.tag = Some("p".to_string());
                        sel.attr("role", "heading");
                        sel.attr("aria-level", level.to_string());
                    }
                }
            },
            StructType::L | StructType::TOC => {
                let numbering = if *ty == StructType::TOC {
                    ListNumbering::Numbered("TOC".to_string())
                } else {
                    list_numbering(attributes)
                };
                let tag = if *ty == StructType::TOC { "ol" } else { numbering.list_tag() };
                sel.tag = Some(tag.to_string());

                match self.first_label(elem, sel.child.page) {
                    Some(label) => {
                        sel.css.push(("list-style-type", "none".to_string()));
                        if tag == "ol" {
                            let parsed = parse_list_label(&label);
                            if let Some(start) = parsed.start {
                                sel.attr("start", start.to_string());
                            }
                            if let Some(kind) = parsed.kind {
                                sel.attr("type", kind);
                            }
                        }
                    },
                    None => {
                        if let Some(kind) = numbering.ol_type() {
                            sel.attr("type", kind);
                        }
                    },
                }
                sel.child.list_numbering = Some(numbering);
            },
            StructType::LI => {
                let tag = if ctx.in_description_list() { "div" } else { "li" };
                sel.tag = Some(tag.to_string());
            },
            StructType::TOCI => sel.tag = Some("li".to_string()),
            StructType::Lbl => {
                let tag = if ctx.in_description_list() && ctx.parent_is(&StructType::LI) {
                    "dt"
                } else if ctx.in_form {
                    "label"
                } else {
                    "span"
                };
                sel.tag = Some(tag.to_string());
            },
            StructType::LBody => {
                let tag = if ctx.in_description_list() && ctx.parent_is(&StructType::LI) {
                    "dd"
                } else {
                    "div"
                };
                sel.tag = Some(tag.to_string());
            },
            StructType::Caption => {
                let tag = if ctx.parent_is(&StructType::Table) {
                    "caption"
                } else if ctx.parent_is(&StructType::Figure) || ctx.parent_is(&StructType::Formula) {
                    "figcaption"
                } else {
                    "div"
                };
                sel.tag = Some(tag.to_string());
            },
            StructType::Figure | StructType::Formula => {
                if ctx.parent_inline() {
                    sel.tag = Some("span".to_string());
                    sel.child.inline = true;
                }
                sel.child.prefer_svg = true;
                sel.child.image_alt = elem.alt.clone().or_else(|| ctx.image_alt.clone());
                sel.child.bbox = elem.bbox.or(ctx.bbox);
            },
            StructType::Link => {
                if ctx.in_anchor {
                    sel.tag = Some("span".to_string());
                } else {
                    if let Some(href) = self.link_href(elem) {
                        sel.attr("href", href);
                    }
                    sel.child.in_anchor = true;
                }
            },
            StructType::Reference => {
                if self.has_link_descendant(elem, 0) {
                    sel.tag = None;
                } else if ctx.in_anchor {
                    sel.tag = Some("span".to_string());
                } else {
                    if let Some(href) = self.link_href(elem) {
                        sel.attr("href", href);
                    }
                    sel.child.in_anchor = true;
                }
            },
            StructType::Form => sel.child.in_form = true,
            ty if ty.is_grouping() => {
                sel.child.heading_depth = Some(ctx.heading_depth.unwrap_or(1) + 1);
            },
            _ => {},
        }

        sel
    }

    /// Text of the first `Lbl` inside the list's items.
    fn first_label(&mut self, list: &StructElem, page: Option<PageId>) -> Option<String> {
        for item in child_elements(list) {
            if !self.role_of(item).is_some_and(|r| r.struct_type().is_some_and(StructType::is_list_item)) {
                continue;
            }
            let Some(item_elem) = self.tree.element(item) else {
                continue;
            };
            let item_page = item_elem.page.or(page);
            for label in child_elements(item_elem) {
                if self.role_of(label).is_some_and(|r| r.is(&StructType::Lbl)) {
                    return Some(self.element_text(label, item_page, 0));
                }
            }
        }
        None
    }

    /// Plain text of an element without rendering it.
    fn element_text(&mut self, id: ElemId, page: Option<PageId>, depth: usize) -> String {
        let tree = self.tree;
        let Some(elem) = tree.element(id) else {
            return String::new();
        };
        if depth > MAX_LOOKAHEAD_DEPTH {
            return String::new();
        }
        if let Some(actual) = &elem.actual_text {
            return actual.clone();
        }
        if self
            .role_of(id)
            .is_some_and(|r| r.is(&StructType::Artifact) || r.is(&StructType::Private))
        {
            return String::new();
        }
        let page = elem.page.or(page);
        let mut text = String::new();
        for child in &elem.children {
            match child {
                StructChild::Element(child_id) => text.push_str(&self.element_text(*child_id, page, depth + 1)),
                StructChild::MarkedContent { mcid, page: own } => {
                    if let Some(p) = own.or(page) {
                        text.push_str(self.cache.page(p, self.provider).text_for(*mcid));
                    }
                },
                StructChild::Object { .. } => {},
            }
        }
        text
    }

    fn has_link_descendant(&self, elem: &StructElem, depth: usize) -> bool {
        if depth > MAX_LOOKAHEAD_DEPTH {
            return false;
        }
        child_elements(elem).any(|id| {
            self.role_of(id).is_some_and(|r| r.is(&StructType::Link))
                || self
                    .tree
                    .element(id)
                    .is_some_and(|e| self.has_link_descendant(e, depth + 1))
        })
    }

    /// `href` from the element's own action, else from the first link
    /// annotation among its object references.
    fn link_href(&mut self, elem: &StructElem) -> Option<String> {
        let action = elem
            .link
            .clone()
            .or_else(|| self.first_link_action(elem, 0))?;
        self.href_for_action(&action)
    }

    fn first_link_action(&self, elem: &StructElem, depth: usize) -> Option<LinkAction> {
        if depth > MAX_LOOKAHEAD_DEPTH {
            return None;
        }
        elem.children.iter().find_map(|child| match child {
            StructChild::Object { obj, .. } => self.link_annotation(*obj).and_then(|a| a.link_action()),
            StructChild::Element(id) => self
                .tree
                .element(*id)
                .and_then(|e| self.first_link_action(e, depth + 1)),
            StructChild::MarkedContent { .. } => None,
        })
    }

    fn link_annotation(&self, obj: ObjectRef) -> Option<Annotation> {
        match self.provider.resolve_object(obj) {
            Some(ReferencedObject::Annotation(annot)) if annot.subtype == AnnotationSubtype::Link => Some(annot),
            _ => None,
        }
    }

    fn href_for_action(&mut self, action: &LinkAction) -> Option<String> {
        match action {
            LinkAction::Uri(uri) => Some(uri.clone()),
            LinkAction::GoTo(dest) => self.destination_href(dest),
            LinkAction::GoToRemote { file, destination } => {
                Some(match destination.as_ref().and_then(LinkDestination::fragment) {
                    Some(fragment) => format!("{}#{}", file, fragment),
                    None => file.clone(),
                })
            },
            LinkAction::Other { action_type } => {
                log::debug!("Action type {} has no href", action_type);
                None
            },
        }
    }

    fn destination_href(&mut self, dest: &LinkDestination) -> Option<String> {
        match dest {
            LinkDestination::Structure(target) => {
                let tree = self.tree;
                let id = tree.element_by_ref(*target)?;
                let elem = tree.element(id)?;
                Some(format!("#{}", self.ids.id_for(id, elem)))
            },
            other => other.fragment().map(|f| format!("#{}", f)),
        }
    }

    fn render_mcid(&mut self, mcid: u32, page: Option<PageId>, ctx: &Context) -> Rendered {
        let Some(page) = page else {
            log::debug!("MCID {} has no page", mcid);
            return Rendered::default();
        };
        let region: McidContent = match self.cache.page(page, self.provider).region(mcid) {
            Some(region) => region.clone(),
            None => {
                log::trace!("MCID {} on page {} has no content", mcid, page);
                return Rendered::default();
            },
        };

        if ctx.prefer_svg && region.is_vector_only() {
            return Rendered {
                html: self.vector_markup(&region, ctx),
                ..Default::default()
            };
        }

        let properties = region.properties.clone().unwrap_or_default();
        let text = if ctx.in_math_token {
            TextParts::split(&region.text).core.to_string()
        } else {
            region.text.clone()
        };

        let mut html = escape_html(&text);
        if !html.is_empty() {
            if let Some(expansion) = &properties.expansion {
                html = format!("<abbr title=\"{}\">{}</abbr>", escape_html(expansion), html);
            }
            if let Some(lang) = &properties.lang {
                html = format!("<span lang=\"{}\">{}</span>", escape_html(lang), html);
            }
        }

        let alt = ctx.image_alt.clone().or(properties.alt);
        for image in &region.images {
            html.push_str(&self.image_markup(image, alt.as_deref(), ctx));
        }

        Rendered {
            html,
            text,
            has_actual_text: region.has_actual_text,
            has_image: !region.images.is_empty(),
            ..Default::default()
        }
    }

    fn vector_markup(&self, region: &McidContent, ctx: &Context) -> String {
        match emit_svg(&region.operators, ctx.bbox, ctx.image_alt.as_deref(), self.options) {
            Ok(svg) => svg,
            Err(e) => {
                log::debug!("Vector content not rendered: {}", e);
                format!(
                    "<span class=\"pdf-vector-placeholder\">{}</span>",
                    escape_html(&self.options.vector_placeholder)
                )
            },
        }
    }

    /// `<img>` with a data URI, or a placeholder of the same size.
    fn image_markup(&self, image: &ImageContent, alt: Option<&str>, ctx: &Context) -> String {
        let (width, height) = match ctx.bbox {
            Some(b) => (self.options.to_px(b.width), self.options.to_px(b.height)),
            None => (image.width, image.height),
        };
        let alt = escape_html(alt.unwrap_or(""));

        if self.options.embed_images {
            match image.to_data_uri() {
                Ok(uri) => {
                    return format!(
                        "<img src=\"{}\" alt=\"{}\" width=\"{}\" height=\"{}\">",
                        uri, alt, width, height
                    )
                },
                Err(e) => log::warn!("Image replaced by placeholder: {}", e),
            }
        }
        format!(
            "<span class=\"pdf-image-placeholder\" role=\"img\" aria-label=\"{}\" \
             style=\"display: inline-block; width: {}px; height: {}px\"></span>",
            alt, width, height
        )
    }

    fn render_object(&mut self, obj: ObjectRef, page: Option<PageId>, ctx: &Context) -> Rendered {
        match self.provider.resolve_object(obj) {
            Some(ReferencedObject::Image(image)) => Rendered {
                html: self.image_markup(&image, ctx.image_alt.as_deref(), ctx),
                has_image: true,
                ..Default::default()
            },
            Some(ReferencedObject::Annotation(annot)) => match &annot.subtype {
                AnnotationSubtype::Widget => widget_markup(&annot),
                // Consumed by the enclosing Link's href
                AnnotationSubtype::Link => Rendered::default(),
                AnnotationSubtype::Other(subtype) => {
                    log::trace!("Annotation {} ({}) produces no markup", obj, subtype);
                    Rendered::default()
                },
            },
            None => {
                log::debug!("OBJR {} on page {:?} could not be resolved", obj, page);
                Rendered::default()
            },
        }
    }
}

fn run(rendered: &Rendered) -> InlineRun<'_> {
    InlineRun {
        text: &rendered.text,
        is_script: rendered.is_script,
        has_actual_text: rendered.has_actual_text,
    }
}

fn child_elements(elem: &StructElem) -> impl Iterator<Item = ElemId> + '_ {
    elem.children.iter().filter_map(|c| match c {
        StructChild::Element(id) => Some(*id),
        _ => None,
    })
}

/// Numbering of a list: own attributes first, then class attributes.
fn list_numbering(attributes: &[&AttributeDict]) -> ListNumbering {
    attributes
        .iter()
        .rev()
        .filter(|d| d.owner.category == OwnerCategory::List)
        .find_map(|d| d.get("ListNumbering").and_then(ListNumbering::from_object))
        .unwrap_or_default()
}

/// `sup` or `sub` from a Layout `TextPosition`.
fn text_position(attributes: &[&AttributeDict]) -> Option<&'static str> {
    attributes
        .iter()
        .rev()
        .filter(|d| d.owner.category == OwnerCategory::Layout)
        .find_map(|d| d.get("TextPosition").and_then(|v| v.as_name()))
        .and_then(|position| match position {
            "Sup" => Some("sup"),
            "Sub" => Some("sub"),
            _ => None,
        })
}

fn widget_markup(annot: &Annotation) -> Rendered {
    let name = annot.field_name.clone().unwrap_or_default();
    let value = annot.field_value.clone().unwrap_or_default();
    let mut html = format!("<span class=\"pdf-form-field\" data-field-name=\"{}\"", escape_html(&name));
    if let Some(field_type) = &annot.field_type {
        html.push_str(&format!(" data-field-type=\"{}\"", escape_html(field_type)));
    }
    html.push_str(&format!(">{}</span>", escape_html(&value)));
    Rendered {
        html,
        text: value,
        ..Default::default()
    }
}

fn open_tag(tag: &str, attrs: &IndexMap<String, String>) -> String {
    let mut out = format!("<{}", tag);
    for (key, value) in attrs {
        if !RE_ATTR_NAME.is_match(key) {
            log::debug!("Dropping attribute with invalid name '{}'", key);
            continue;
        }
        out.push_str(&format!(" {}=\"{}\"", key, escape_html(value)));
    }
    out.push('>');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
    }

    #[test]
    fn test_id_allocator_skips_explicit_ids() {
        let mut tree = StructTreeRoot::new();
        let taken = tree.push_element(StructElem::new("P").with_id("pdf-se-1"));
        let a = tree.push_element(StructElem::new("P"));
        let b = tree.push_element(StructElem::new("P"));

        let mut ids = IdAllocator::new(&tree);
        let elem = StructElem::new("P");
        assert_eq!(ids.id_for(a, &elem), "pdf-se-2");
        assert_eq!(ids.id_for(b, &elem), "pdf-se-3");
        assert_eq!(ids.id_for(a, &elem), "pdf-se-2");
        let explicit = tree.element(taken).cloned().unwrap();
        assert_eq!(ids.id_for(taken, &explicit), "pdf-se-1");
    }

    #[test]
    fn test_open_tag_drops_bad_attribute_names() {
        let mut attrs = IndexMap::new();
        attrs.insert("class".to_string(), "a\"b".to_string());
        attrs.insert("on click".to_string(), "x".to_string());
        assert_eq!(open_tag("p", &attrs), "<p class=\"a&quot;b\">");
    }

    #[test]
    fn test_text_position() {
        let sup = AttributeDict::new("Layout").with("TextPosition", crate::object::Object::name("Sup"));
        let normal = AttributeDict::new("Layout").with("TextPosition", crate::object::Object::name("Normal"));
        assert_eq!(text_position(&[&sup]), Some("sup"));
        assert_eq!(text_position(&[&normal]), None);
    }
}
