//! Types for PDF logical structure trees.
//!
//! The tree is stored as an arena: every [`StructElem`] lives in
//! [`StructTreeRoot::elements`] and children point at each other through
//! [`ElemId`]. The index doubles as the stable per-run identity used for
//! identifier allocation and structure destinations.

use crate::annotations::LinkAction;
use crate::geometry::Rect;
use crate::object::{Dictionary, Object, ObjectRef};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// Zero-based page index as assigned by the object-model provider.
pub type PageId = u32;

/// PDF 1.7 standard structure namespace.
pub const PDF_1_7_NS: &str = "http://iso.org/pdf/ssn";
/// PDF 2.0 standard structure namespace.
pub const PDF_2_0_NS: &str = "http://iso.org/pdf2/ssn";
/// MathML namespace.
pub const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";
/// HTML namespace.
pub const HTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Index of a structure element inside its [`StructTreeRoot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElemId(pub usize);

/// The root of a PDF structure tree (StructTreeRoot dictionary).
///
/// Holds the element arena plus the per-document tables every conversion reads:
/// - `/K` - the immediate children of the root
/// - `/RoleMap` - non-standard type name to parent type name
/// - `/ClassMap` - class name to attribute dictionaries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructTreeRoot {
    /// Element arena, indexed by [`ElemId`]
    #[serde(default)]
    pub elements: Vec<StructElem>,

    /// Root-level children (`/K` of the StructTreeRoot)
    #[serde(default)]
    pub root_children: Vec<StructChild>,

    /// Role map for custom structure types
    #[serde(default)]
    pub role_map: HashMap<String, String>,

    /// Class map: class name to attribute dictionaries
    #[serde(default)]
    pub class_map: HashMap<String, Vec<AttributeDict>>,
}

impl StructTreeRoot {
    /// Create an empty structure tree root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an element by id.
    pub fn element(&self, id: ElemId) -> Option<&StructElem> {
        self.elements.get(id.0)
    }

    /// Append an element to the arena and return its id.
    pub fn push_element(&mut self, elem: StructElem) -> ElemId {
        self.elements.push(elem);
        ElemId(self.elements.len() - 1)
    }

    /// Find the element carrying the given indirect reference.
    pub fn element_by_ref(&self, obj: ObjectRef) -> Option<ElemId> {
        self.elements
            .iter()
            .position(|e| e.obj_ref == Some(obj))
            .map(ElemId)
    }

    /// Attribute dictionaries that apply to an element: class-map entries first
    /// (in class-list order), then the element's own `/A` dictionaries.
    pub fn effective_attributes<'a>(&'a self, elem: &'a StructElem) -> Vec<&'a AttributeDict> {
        let mut out = Vec::new();
        for class in &elem.classes {
            match self.class_map.get(class) {
                Some(dicts) => out.extend(dicts.iter()),
                None => log::debug!("Class '{}' not present in class map", class),
            }
        }
        out.extend(elem.attributes.iter());
        out
    }
}

/// A structure element (StructElem) in the structure tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructElem {
    /// Raw structure type (`/S`); empty when the producer omitted it
    #[serde(default)]
    pub struct_type: String,

    /// Namespace governing `struct_type`
    #[serde(default)]
    pub namespace: Namespace,

    /// Child elements, marked-content references and object references
    #[serde(default)]
    pub children: Vec<StructChild>,

    /// Page this element's content is on by default (`/Pg`)
    #[serde(default)]
    pub page: Option<PageId>,

    /// Owned attribute dictionaries (`/A`), in declaration order
    #[serde(default)]
    pub attributes: Vec<AttributeDict>,

    /// Class names (`/C`)
    #[serde(default)]
    pub classes: Vec<String>,

    /// Element identifier (`/ID`)
    #[serde(default)]
    pub id: Option<String>,

    /// Language tag (`/Lang`)
    #[serde(default)]
    pub lang: Option<String>,

    /// Title (`/T`)
    #[serde(default)]
    pub title: Option<String>,

    /// Alternate description (`/Alt`)
    #[serde(default)]
    pub alt: Option<String>,

    /// Replacement text (`/ActualText`)
    #[serde(default)]
    pub actual_text: Option<String>,

    /// Expansion of an abbreviation (`/E`)
    #[serde(default)]
    pub expansion: Option<String>,

    /// Bounding box in PDF user space
    #[serde(default)]
    pub bbox: Option<Rect>,

    /// Action or destination attached directly to the element
    #[serde(default)]
    pub link: Option<LinkAction>,

    /// Indirect reference this element was loaded from, if any
    #[serde(default)]
    pub obj_ref: Option<ObjectRef>,
}

impl StructElem {
    /// Create a new structure element of the given raw type.
    pub fn new(struct_type: impl Into<String>) -> Self {
        Self {
            struct_type: struct_type.into(),
            ..Default::default()
        }
    }

    /// Set the namespace.
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// Add an attribute dictionary.
    pub fn with_attribute(mut self, dict: AttributeDict) -> Self {
        self.attributes.push(dict);
        self
    }

    /// Set the element identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the replacement text.
    pub fn with_actual_text(mut self, text: impl Into<String>) -> Self {
        self.actual_text = Some(text.into());
        self
    }

    /// Set the alternate description.
    pub fn with_alt(mut self, text: impl Into<String>) -> Self {
        self.alt = Some(text.into());
        self
    }

    /// Set the abbreviation expansion.
    pub fn with_expansion(mut self, text: impl Into<String>) -> Self {
        self.expansion = Some(text.into());
        self
    }

    /// Set the bounding box.
    pub fn with_bbox(mut self, bbox: Rect) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Set the default page.
    pub fn with_page(mut self, page: PageId) -> Self {
        self.page = Some(page);
        self
    }

    /// Attach an action or destination.
    pub fn with_link(mut self, link: LinkAction) -> Self {
        self.link = Some(link);
        self
    }

    /// Add a child to this structure element
    pub fn add_child(&mut self, child: StructChild) {
        self.children.push(child);
    }
}

/// Child of a structure element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StructChild {
    /// Another structure element
    Element(ElemId),

    /// Reference to marked content by MCID
    MarkedContent {
        /// Marked Content ID
        mcid: u32,
        /// Page containing the marked content; inherited from the parent when absent
        #[serde(default)]
        page: Option<PageId>,
    },

    /// Reference to an annotation or XObject (OBJR)
    Object {
        /// The referenced object
        obj: ObjectRef,
        /// Page the object is drawn on; inherited from the parent when absent
        #[serde(default)]
        page: Option<PageId>,
    },
}

/// Namespace qualifying a structure type name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Namespace {
    /// No namespace, or the PDF 1.7 standard namespace
    #[default]
    Default,
    /// The PDF 2.0 standard namespace
    Pdf2,
    /// MathML
    MathMl,
    /// HTML
    Html,
    /// Any other namespace URI
    Custom(String),
}

impl Namespace {
    /// Classify a namespace URI.
    pub fn from_uri(uri: &str) -> Self {
        match uri.trim() {
            "" | PDF_1_7_NS => Self::Default,
            PDF_2_0_NS => Self::Pdf2,
            MATHML_NS => Self::MathMl,
            HTML_NS => Self::Html,
            other => Self::Custom(other.to_string()),
        }
    }

    /// True for the namespaces whose vocabulary is the standard structure type set.
    pub fn is_standard(&self) -> bool {
        matches!(self, Self::Default | Self::Pdf2)
    }
}

/// Attribute owner category, decided once when an attribute dictionary is ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerCategory {
    /// `/O /List`
    List,
    /// `/O /Table`
    Table,
    /// `/O /Layout`
    Layout,
    /// `/O /PrintField`
    PrintField,
    /// `/O /HTML-*`
    Html,
    /// `/O /CSS-*`
    Css,
    /// `/O /ARIA-*`
    Aria,
    /// `/O /UserProperties`
    UserProperties,
    /// Any other owner (e.g. `NSO`, `XML-1.00`, vendor names)
    Other,
}

impl OwnerCategory {
    /// Position in the cascade; later categories win. `None` for categories
    /// that never produce HTML.
    pub fn cascade_rank(self) -> Option<u8> {
        match self {
            Self::List => Some(0),
            Self::Table => Some(1),
            Self::Layout => Some(2),
            Self::Html => Some(3),
            Self::Css => Some(4),
            Self::Aria => Some(5),
            Self::PrintField | Self::UserProperties | Self::Other => None,
        }
    }
}

/// Owner of an attribute dictionary: category plus any versioned suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AttributeOwner {
    /// Category used for cascade dispatch
    pub category: OwnerCategory,
    /// Version suffix, e.g. `5.00` for `HTML-5.00`
    pub version: Option<String>,
    /// Owner name as written by the producer
    pub name: String,
}

impl AttributeOwner {
    /// Classify an owner name such as `Layout`, `HTML-5.00` or `ARIA-1.1`.
    pub fn parse(name: &str) -> Self {
        let (base, version) = match name.split_once('-') {
            Some((base, version)) => (base, Some(version.to_string())),
            None => (name, None),
        };
        let category = match (base, version.is_some()) {
            ("List", false) => OwnerCategory::List,
            ("Table", false) => OwnerCategory::Table,
            ("Layout", false) => OwnerCategory::Layout,
            ("PrintField", false) => OwnerCategory::PrintField,
            ("UserProperties", false) => OwnerCategory::UserProperties,
            ("HTML", _) => OwnerCategory::Html,
            ("CSS", _) => OwnerCategory::Css,
            ("ARIA", _) => OwnerCategory::Aria,
            _ => OwnerCategory::Other,
        };
        Self {
            category,
            version: if matches!(category, OwnerCategory::Other) {
                None
            } else {
                version
            },
            name: name.to_string(),
        }
    }
}

impl From<String> for AttributeOwner {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<AttributeOwner> for String {
    fn from(owner: AttributeOwner) -> Self {
        owner.name
    }
}

/// An owner-tagged attribute dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDict {
    /// Owner (`/O`)
    pub owner: AttributeOwner,
    /// Attribute entries in declaration order, `/O` excluded
    #[serde(default)]
    pub entries: Dictionary,
}

impl AttributeDict {
    /// Create an empty dictionary for the given owner name.
    pub fn new(owner: &str) -> Self {
        Self {
            owner: AttributeOwner::parse(owner),
            entries: Dictionary::new(),
        }
    }

    /// Add an entry (builder style).
    pub fn with(mut self, key: impl Into<String>, value: Object) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Look up an entry.
    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.get(key)
    }
}

/// Standard structure types (ISO 32000-1 §14.8.4 and ISO 32000-2 §14.8.4).
///
/// Custom types can be mapped to standard types via the RoleMap; anything left
/// unmapped is carried as [`StructType::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StructType {
    /// Document root
    Document,
    /// Document fragment (PDF 2.0)
    DocumentFragment,
    /// Part (major division)
    Part,
    /// Article
    Art,
    /// Section
    Sect,
    /// Division
    Div,
    /// Aside (PDF 2.0)
    Aside,
    /// Block quotation
    BlockQuote,
    /// Caption
    Caption,
    /// Table of contents
    TOC,
    /// Table of contents item
    TOCI,
    /// Index
    Index,
    /// Non-structural grouping
    NonStruct,
    /// Producer-private content
    Private,
    /// Title (PDF 2.0)
    Title,
    /// Footnote or endnote (PDF 2.0)
    FENote,
    /// Sub-part of a paragraph (PDF 2.0)
    Sub,
    /// Paragraph
    P,
    /// Generic heading
    H,
    /// Numbered heading, `H1`, `H2`, ... (any positive level)
    Hn(u32),
    /// List
    L,
    /// List item
    LI,
    /// Label (list item marker)
    Lbl,
    /// List body (list item content)
    LBody,
    /// Table
    Table,
    /// Table row
    TR,
    /// Table header cell
    TH,
    /// Table data cell
    TD,
    /// Table header group
    THead,
    /// Table body group
    TBody,
    /// Table footer group
    TFoot,
    /// Span (inline generic)
    Span,
    /// Quote
    Quote,
    /// Note
    Note,
    /// Reference
    Reference,
    /// Bibliographic entry
    BibEntry,
    /// Code
    Code,
    /// Link
    Link,
    /// Annotation
    Annot,
    /// Ruby
    Ruby,
    /// Ruby base text
    RB,
    /// Ruby annotation text
    RT,
    /// Ruby punctuation
    RP,
    /// Warichu
    Warichu,
    /// Warichu text
    WT,
    /// Warichu punctuation
    WP,
    /// Figure
    Figure,
    /// Formula
    Formula,
    /// Form (input field)
    Form,
    /// Emphasis (PDF 2.0)
    Em,
    /// Strong importance (PDF 2.0)
    Strong,
    /// Artifact (PDF 2.0)
    Artifact,
    /// Custom structure type not defined in the PDF specification
    Custom(String),
}

impl StructType {
    /// Parse structure type from a name (e.g., "P" -> StructType::P)
    pub fn from_str(s: &str) -> Self {
        Self::standard(s).unwrap_or_else(|| Self::Custom(s.to_string()))
    }

    /// Parse a standard structure type, returning `None` for anything else.
    pub fn standard(s: &str) -> Option<Self> {
        let ty = match s {
            "Document" => Self::Document,
            "DocumentFragment" => Self::DocumentFragment,
            "Part" => Self::Part,
            "Art" => Self::Art,
            "Sect" => Self::Sect,
            "Div" => Self::Div,
            "Aside" => Self::Aside,
            "BlockQuote" => Self::BlockQuote,
            "Caption" => Self::Caption,
            "TOC" => Self::TOC,
            "TOCI" => Self::TOCI,
            "Index" => Self::Index,
            "NonStruct" => Self::NonStruct,
            "Private" => Self::Private,
            "Title" => Self::Title,
            "FENote" => Self::FENote,
            "Sub" => Self::Sub,
            "P" => Self::P,
            "H" => Self::H,
            "L" => Self::L,
            "LI" => Self::LI,
            "Lbl" => Self::Lbl,
            "LBody" => Self::LBody,
            "Table" => Self::Table,
            "TR" => Self::TR,
            "TH" => Self::TH,
            "TD" => Self::TD,
            "THead" => Self::THead,
            "TBody" => Self::TBody,
            "TFoot" => Self::TFoot,
            "Span" => Self::Span,
            "Quote" => Self::Quote,
            "Note" => Self::Note,
            "Reference" => Self::Reference,
            "BibEntry" => Self::BibEntry,
            "Code" => Self::Code,
            "Link" => Self::Link,
            "Annot" => Self::Annot,
            "Ruby" => Self::Ruby,
            "RB" => Self::RB,
            "RT" => Self::RT,
            "RP" => Self::RP,
            "Warichu" => Self::Warichu,
            "WT" => Self::WT,
            "WP" => Self::WP,
            "Figure" => Self::Figure,
            "Formula" => Self::Formula,
            "Form" => Self::Form,
            "Em" => Self::Em,
            "Strong" => Self::Strong,
            "Artifact" => Self::Artifact,
            _ => return heading_level(s).map(Self::Hn),
        };
        Some(ty)
    }

    /// True if the name is a member of the standard type set.
    pub fn is_standard_name(s: &str) -> bool {
        Self::standard(s).is_some()
    }

    /// The structure type name as written in a PDF.
    pub fn name(&self) -> Cow<'_, str> {
        let s = match self {
            Self::Document => "Document",
            Self::DocumentFragment => "DocumentFragment",
            Self::Part => "Part",
            Self::Art => "Art",
            Self::Sect => "Sect",
            Self::Div => "Div",
            Self::Aside => "Aside",
            Self::BlockQuote => "BlockQuote",
            Self::Caption => "Caption",
            Self::TOC => "TOC",
            Self::TOCI => "TOCI",
            Self::Index => "Index",
            Self::NonStruct => "NonStruct",
            Self::Private => "Private",
            Self::Title => "Title",
            Self::FENote => "FENote",
            Self::Sub => "Sub",
            Self::P => "P",
            Self::H => "H",
            Self::Hn(level) => return Cow::Owned(format!("H{}", level)),
            Self::L => "L",
            Self::LI => "LI",
            Self::Lbl => "Lbl",
            Self::LBody => "LBody",
            Self::Table => "Table",
            Self::TR => "TR",
            Self::TH => "TH",
            Self::TD => "TD",
            Self::THead => "THead",
            Self::TBody => "TBody",
            Self::TFoot => "TFoot",
            Self::Span => "Span",
            Self::Quote => "Quote",
            Self::Note => "Note",
            Self::Reference => "Reference",
            Self::BibEntry => "BibEntry",
            Self::Code => "Code",
            Self::Link => "Link",
            Self::Annot => "Annot",
            Self::Ruby => "Ruby",
            Self::RB => "RB",
            Self::RT => "RT",
            Self::RP => "RP",
            Self::Warichu => "Warichu",
            Self::WT => "WT",
            Self::WP => "WP",
            Self::Figure => "Figure",
            Self::Formula => "Formula",
            Self::Form => "Form",
            Self::Em => "Em",
            Self::Strong => "Strong",
            Self::Artifact => "Artifact",
            Self::Custom(name) => return Cow::Borrowed(name.as_str()),
        };
        Cow::Borrowed(s)
    }

    /// Check if this is a heading type (H, Hn, Title)
    pub fn is_heading(&self) -> bool {
        matches!(self, Self::H | Self::Hn(_) | Self::Title)
    }

    /// Grouping roles raise the heading depth of their descendants.
    pub fn is_grouping(&self) -> bool {
        matches!(
            self,
            Self::Sect | Self::Div | Self::Art | Self::Aside | Self::Part | Self::DocumentFragment
        )
    }

    /// Roles whose content is phrasing content in HTML; a Figure or Formula
    /// directly inside one of these must render inline.
    pub fn is_inline_context(&self) -> bool {
        matches!(
            self,
            Self::H
                | Self::Hn(_)
                | Self::Title
                | Self::P
                | Self::Span
                | Self::Em
                | Self::Strong
                | Self::Quote
                | Self::Reference
                | Self::Link
                | Self::Code
                | Self::Lbl
                | Self::Sub
                | Self::BibEntry
                | Self::TH
                | Self::TD
                | Self::Ruby
                | Self::RB
                | Self::RT
                | Self::RP
                | Self::Warichu
                | Self::WT
                | Self::WP
                | Self::Annot
        )
    }

    /// True for list-like containers (lists and tables of contents).
    pub fn is_list(&self) -> bool {
        matches!(self, Self::L | Self::TOC)
    }

    /// True for list items of either kind.
    pub fn is_list_item(&self) -> bool {
        matches!(self, Self::LI | Self::TOCI)
    }
}

/// Parse the level out of an `H<digits>` heading name.
pub fn heading_level(s: &str) -> Option<u32> {
    let digits = s.strip_prefix('H')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|&level| level > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_type_parsing() {
        assert_eq!(StructType::from_str("P"), StructType::P);
        assert_eq!(StructType::from_str("H1"), StructType::Hn(1));
        assert_eq!(StructType::from_str("H12"), StructType::Hn(12));
        assert_eq!(StructType::from_str("Document"), StructType::Document);

        match StructType::from_str("CustomType") {
            StructType::Custom(s) => assert_eq!(s, "CustomType"),
            _ => panic!("Expected Custom type"),
        }
    }

    #[test]
    fn test_heading_level_rejects_malformed_names() {
        assert_eq!(heading_level("H3"), Some(3));
        assert_eq!(heading_level("H"), None);
        assert_eq!(heading_level("H0"), None);
        assert_eq!(heading_level("Hx"), None);
        assert_eq!(heading_level("Head"), None);
    }

    #[test]
    fn test_name_round_trip() {
        for name in ["Sect", "H7", "TOCI", "LBody", "Artifact", "MyType"] {
            assert_eq!(StructType::from_str(name).name(), name);
        }
    }

    #[test]
    fn test_is_heading() {
        assert!(StructType::Hn(1).is_heading());
        assert!(StructType::H.is_heading());
        assert!(StructType::Title.is_heading());
        assert!(!StructType::P.is_heading());
    }

    #[test]
    fn test_grouping_roles() {
        assert!(StructType::Sect.is_grouping());
        assert!(StructType::DocumentFragment.is_grouping());
        assert!(!StructType::Document.is_grouping());
        assert!(!StructType::BlockQuote.is_grouping());
    }

    #[test]
    fn test_owner_classification() {
        let html = AttributeOwner::parse("HTML-5.00");
        assert_eq!(html.category, OwnerCategory::Html);
        assert_eq!(html.version.as_deref(), Some("5.00"));

        assert_eq!(AttributeOwner::parse("Layout").category, OwnerCategory::Layout);
        assert_eq!(AttributeOwner::parse("ARIA-1.1").category, OwnerCategory::Aria);
        assert_eq!(AttributeOwner::parse("CSS-2.00").category, OwnerCategory::Css);
        assert_eq!(AttributeOwner::parse("XML-1.00").category, OwnerCategory::Other);
        assert_eq!(AttributeOwner::parse("Layout-2").category, OwnerCategory::Other);
    }

    #[test]
    fn test_cascade_rank_order() {
        let order = [
            OwnerCategory::List,
            OwnerCategory::Table,
            OwnerCategory::Layout,
            OwnerCategory::Html,
            OwnerCategory::Css,
            OwnerCategory::Aria,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].cascade_rank() < pair[1].cascade_rank());
        }
        assert_eq!(OwnerCategory::PrintField.cascade_rank(), None);
    }

    #[test]
    fn test_namespace_from_uri() {
        assert_eq!(Namespace::from_uri(""), Namespace::Default);
        assert_eq!(Namespace::from_uri(PDF_2_0_NS), Namespace::Pdf2);
        assert_eq!(Namespace::from_uri(MATHML_NS), Namespace::MathMl);
        assert!(matches!(Namespace::from_uri("urn:x"), Namespace::Custom(_)));
    }

    #[test]
    fn test_effective_attributes_order() {
        let mut root = StructTreeRoot::new();
        root.class_map.insert(
            "c1".into(),
            vec![AttributeDict::new("Layout").with("TextAlign", Object::name("Center"))],
        );
        let mut elem = StructElem::new("P")
            .with_attribute(AttributeDict::new("Layout").with("TextAlign", Object::name("End")));
        elem.classes.push("c1".into());
        elem.classes.push("missing".into());

        let attrs = root.effective_attributes(&elem);
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].get("TextAlign"), Some(&Object::name("Center")));
        assert_eq!(attrs[1].get("TextAlign"), Some(&Object::name("End")));
    }
}
