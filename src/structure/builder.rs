//! Programmatic structure tree construction.
//!
//! Providers that already hold a decoded structure tree (and tests) build the
//! arena through [`StructTreeBuilder`] instead of going through raw objects.

use crate::object::ObjectRef;
use crate::structure::types::{AttributeDict, ElemId, PageId, StructChild, StructElem, StructTreeRoot};

/// Builds a [`StructTreeRoot`] element by element.
///
/// ```
/// use tagged_pdf_html::structure::{StructElem, StructTreeBuilder};
///
/// let mut builder = StructTreeBuilder::new();
/// let doc = builder.add_root(StructElem::new("Document"));
/// let p = builder.add_child(doc, StructElem::new("P").with_page(0));
/// builder.add_mcid(p, 0);
/// let tree = builder.build();
/// assert_eq!(tree.elements.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct StructTreeBuilder {
    root: StructTreeRoot,
}

impl StructTreeBuilder {
    /// Create a new structure tree builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a RoleMap entry.
    pub fn role(mut self, custom: &str, parent: &str) -> Self {
        self.root
            .role_map
            .insert(custom.to_string(), parent.to_string());
        self
    }

    /// Add a ClassMap entry.
    pub fn class(mut self, name: &str, dicts: Vec<AttributeDict>) -> Self {
        self.root.class_map.insert(name.to_string(), dicts);
        self
    }

    /// Add an element as a child of the StructTreeRoot.
    pub fn add_root(&mut self, elem: StructElem) -> ElemId {
        let id = self.root.push_element(elem);
        self.root.root_children.push(StructChild::Element(id));
        id
    }

    /// Add an element as the last child of `parent`.
    pub fn add_child(&mut self, parent: ElemId, elem: StructElem) -> ElemId {
        let id = self.root.push_element(elem);
        self.push(parent, StructChild::Element(id));
        id
    }

    /// Add a marked-content reference on the parent's page.
    pub fn add_mcid(&mut self, parent: ElemId, mcid: u32) {
        self.push(parent, StructChild::MarkedContent { mcid, page: None });
    }

    /// Add a marked-content reference on an explicit page.
    pub fn add_mcid_on_page(&mut self, parent: ElemId, mcid: u32, page: PageId) {
        self.push(
            parent,
            StructChild::MarkedContent {
                mcid,
                page: Some(page),
            },
        );
    }

    /// Add an object reference (OBJR) child.
    pub fn add_object(&mut self, parent: ElemId, obj: ObjectRef, page: Option<PageId>) {
        self.push(parent, StructChild::Object { obj, page });
    }

    /// Mutable access to an element already added.
    pub fn element_mut(&mut self, id: ElemId) -> Option<&mut StructElem> {
        self.root.elements.get_mut(id.0)
    }

    /// Finish building.
    pub fn build(self) -> StructTreeRoot {
        self.root
    }

    fn push(&mut self, parent: ElemId, child: StructChild) {
        match self.root.elements.get_mut(parent.0) {
            Some(elem) => elem.add_child(child),
            None => log::warn!("Dropping child of unknown element {:?}", parent),
        }
    }
}
