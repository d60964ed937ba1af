//! Document access for the converter.
//!
//! The converter does not read PDF files itself. It consumes an
//! [`ObjectModelProvider`], which exposes an already-parsed structure tree,
//! page operators and referenced objects. [`SnapshotDocument`] is a provider
//! backed by an in-memory (JSON-loadable) snapshot of exactly that data.

use crate::annotations::Annotation;
use crate::content::Operator;
use crate::elements::ImageContent;
use crate::error::{Error, Result};
use crate::object::ObjectRef;
use crate::structure::{PageId, StructTreeRoot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// An object reached through an OBJR structure child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReferencedObject {
    /// An annotation (link, widget, ...)
    Annotation(Annotation),
    /// An image XObject
    Image(ImageContent),
}

/// Source of everything the converter reads from a document.
pub trait ObjectModelProvider {
    /// The document's structure tree, `None` for untagged documents.
    fn structure_tree(&self) -> Option<&StructTreeRoot>;

    /// The page's content operators in stream order, with text already decoded.
    fn page_operators(&self, page: PageId) -> Result<Vec<Operator>>;

    /// Resolve an XObject name from the page's resources to an image.
    fn xobject_image(&self, page: PageId, name: &str) -> Option<ImageContent>;

    /// Resolve an object referenced from the structure tree.
    fn resolve_object(&self, obj: ObjectRef) -> Option<ReferencedObject>;
}

/// One page of a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotPage {
    /// Content operators
    #[serde(default)]
    pub operators: Vec<Operator>,
    /// Image XObjects by resource name
    #[serde(default)]
    pub xobjects: HashMap<String, ImageContent>,
}

/// A referenced object with its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotObject {
    /// Indirect reference
    pub id: ObjectRef,
    /// The object
    pub object: ReferencedObject,
}

/// In-memory document snapshot.
///
/// ```
/// use tagged_pdf_html::document::{ObjectModelProvider, SnapshotDocument};
///
/// let doc = SnapshotDocument::from_json(r#"{"pages": [{"operators": ["BeginText", "EndText"]}]}"#)?;
/// assert!(doc.structure_tree().is_none());
/// assert_eq!(doc.page_operators(0)?.len(), 2);
/// # Ok::<(), tagged_pdf_html::Error>(())
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Structure tree, absent for untagged documents
    #[serde(default)]
    pub structure: Option<StructTreeRoot>,
    /// Pages in order
    #[serde(default)]
    pub pages: Vec<SnapshotPage>,
    /// Objects referenced through OBJR
    #[serde(default)]
    pub objects: Vec<SnapshotObject>,
}

impl SnapshotDocument {
    /// Create a snapshot around a structure tree.
    pub fn new(structure: StructTreeRoot) -> Self {
        Self {
            structure: Some(structure),
            ..Default::default()
        }
    }

    /// Parse a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a snapshot from a JSON file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    /// Append a page.
    pub fn with_page(mut self, operators: Vec<Operator>) -> Self {
        self.pages.push(SnapshotPage {
            operators,
            xobjects: HashMap::new(),
        });
        self
    }

    /// Register an image XObject on an existing page.
    pub fn with_xobject(mut self, page: PageId, name: &str, image: ImageContent) -> Self {
        match self.pages.get_mut(page as usize) {
            Some(p) => {
                p.xobjects.insert(name.to_string(), image);
            },
            None => log::warn!("XObject {} added to missing page {}", name, page),
        }
        self
    }

    /// Register a referenced object.
    pub fn with_object(mut self, id: ObjectRef, object: ReferencedObject) -> Self {
        self.objects.push(SnapshotObject { id, object });
        self
    }
}

impl ObjectModelProvider for SnapshotDocument {
    fn structure_tree(&self) -> Option<&StructTreeRoot> {
        self.structure.as_ref()
    }

    fn page_operators(&self, page: PageId) -> Result<Vec<Operator>> {
        self.pages
            .get(page as usize)
            .map(|p| p.operators.clone())
            .ok_or_else(|| Error::Provider(format!("Page {} not in snapshot", page)))
    }

    fn xobject_image(&self, page: PageId, name: &str) -> Option<ImageContent> {
        self.pages
            .get(page as usize)
            .and_then(|p| p.xobjects.get(name))
            .cloned()
    }

    fn resolve_object(&self, obj: ObjectRef) -> Option<ReferencedObject> {
        self.objects
            .iter()
            .find(|o| o.id == obj)
            .map(|o| o.object.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::LinkAction;
    use crate::elements::ImageFormat;

    #[test]
    fn test_missing_page_is_provider_error() {
        let doc = SnapshotDocument::default();
        assert!(matches!(doc.page_operators(3), Err(Error::Provider(_))));
    }

    #[test]
    fn test_objects_and_xobjects() {
        let link = ReferencedObject::Annotation(Annotation::link(LinkAction::Uri("https://a".into())));
        let doc = SnapshotDocument::new(StructTreeRoot::new())
            .with_page(vec![])
            .with_xobject(0, "Im0", ImageContent::new(ImageFormat::Png, vec![], 1, 1))
            .with_object(ObjectRef::new(7, 0), link.clone());

        assert!(doc.xobject_image(0, "Im0").is_some());
        assert!(doc.xobject_image(0, "Im1").is_none());
        assert_eq!(doc.resolve_object(ObjectRef::new(7, 0)), Some(link));
        assert_eq!(doc.resolve_object(ObjectRef::new(8, 0)), None);
    }

    #[test]
    fn test_json_round_trip() {
        let doc = SnapshotDocument::new(StructTreeRoot::new()).with_page(vec![Operator::Fill]);
        let json = serde_json::to_string(&doc).unwrap();
        let back = SnapshotDocument::from_json(&json).unwrap();
        assert!(back.structure.is_some());
        assert_eq!(back.pages[0].operators, vec![Operator::Fill]);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(SnapshotDocument::from_json("{"), Err(Error::Json(_))));
    }
}
