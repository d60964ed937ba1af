//! Parser for PDF structure trees.
//!
//! Parses StructTreeRoot and StructElem dictionaries according to PDF spec
//! Section 14.7 into the arena form used by the converter.

use super::types::{AttributeDict, AttributeOwner, ElemId, Namespace, PageId, StructChild, StructElem, StructTreeRoot};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::object::{Dictionary, Object, ObjectRef};
use crate::structure::types::OwnerCategory;
use std::collections::HashSet;

/// Access to indirect objects of the underlying document.
pub trait ObjectResolver {
    /// Load an indirect object.
    fn resolve(&self, obj: ObjectRef) -> Option<Object>;

    /// Zero-based page index for a page object reference.
    fn page_index(&self, obj: ObjectRef) -> Option<PageId>;
}

/// Helper function to resolve an object (handles both direct objects and references).
fn resolve_object(resolver: &dyn ObjectResolver, obj: &Object) -> Result<Object> {
    match obj {
        Object::Reference(r) => resolver.resolve(*r).ok_or(Error::ObjectNotFound(r.id, r.gen)),
        _ => Ok(obj.clone()),
    }
}

/// Parse the structure tree reachable from a document catalog.
///
/// # Returns
/// * `Ok(Some(StructTreeRoot))` - If the document has a structure tree
/// * `Ok(None)` - If the document is not tagged (no StructTreeRoot)
/// * `Err(Error)` - If the StructTreeRoot itself cannot be loaded
pub fn parse_structure_tree(catalog: &Dictionary, resolver: &dyn ObjectResolver) -> Result<Option<StructTreeRoot>> {
    let root_obj = match catalog.get("StructTreeRoot") {
        Some(obj) => resolve_object(resolver, obj)?,
        None => return Ok(None),
    };

    let root_dict = root_obj
        .as_dict()
        .ok_or_else(|| Error::InvalidStructure("StructTreeRoot is not a dictionary".into()))?;

    let mut tree = StructTreeRoot::new();

    if let Some(role_map_obj) = root_dict.get("RoleMap") {
        if let Some(role_map) = resolve_object(resolver, role_map_obj)?.as_dict() {
            for (key, value) in role_map {
                match value.as_name() {
                    Some(name) => {
                        tree.role_map.insert(key.clone(), name.to_string());
                    },
                    None => log::debug!("RoleMap entry '{}' is not a name", key),
                }
            }
        }
    }

    if let Some(class_map_obj) = root_dict.get("ClassMap") {
        if let Some(class_map) = resolve_object(resolver, class_map_obj)?.as_dict() {
            for (name, value) in class_map {
                let dicts = parse_attribute_list(resolver, value);
                tree.class_map.insert(name.clone(), dicts);
            }
        }
    }

    let mut parser = TreeParser {
        resolver,
        tree,
        path: HashSet::new(),
    };

    if let Some(k_obj) = root_dict.get("K") {
        let children = parser.parse_k(k_obj, None);
        parser.tree.root_children = children;
    }

    Ok(Some(parser.tree))
}

struct TreeParser<'a> {
    resolver: &'a dyn ObjectResolver,
    tree: StructTreeRoot,
    /// References on the path from the root to the element being parsed.
    path: HashSet<ObjectRef>,
}

impl TreeParser<'_> {
    /// Parse the /K entry (children) of a structure element or the root.
    ///
    /// /K can be:
    /// 1. A single integer (MCID)
    /// 2. A dictionary (marked-content reference, object reference or StructElem)
    /// 3. A reference to a StructElem
    /// 4. An array of any of the above
    fn parse_k(&mut self, k_obj: &Object, page: Option<PageId>) -> Vec<StructChild> {
        let mut children = Vec::new();
        match k_obj {
            Object::Array(arr) => {
                for item in arr {
                    self.parse_kid(item, page, &mut children);
                }
            },
            Object::Reference(r) => match self.resolver.resolve(*r) {
                // An array-valued /K stored indirectly.
                Some(Object::Array(arr)) => {
                    for item in &arr {
                        self.parse_kid(item, page, &mut children);
                    }
                },
                _ => self.parse_kid(k_obj, page, &mut children),
            },
            other => self.parse_kid(other, page, &mut children),
        }
        children
    }

    fn parse_kid(&mut self, kid: &Object, page: Option<PageId>, out: &mut Vec<StructChild>) {
        match kid {
            Object::Integer(mcid) => match u32::try_from(*mcid) {
                Ok(mcid) => out.push(StructChild::MarkedContent { mcid, page: None }),
                Err(_) => log::debug!("Skipping negative MCID {}", mcid),
            },
            Object::Reference(r) => {
                if self.path.contains(r) {
                    log::warn!("Structure tree cycle through {}, skipping child", r);
                    return;
                }
                let Some(obj) = self.resolver.resolve(*r) else {
                    log::debug!("Structure child {} not found", r);
                    return;
                };
                if let Some(dict) = obj.as_dict() {
                    if let Some(child) = self.parse_kid_dict(dict, Some(*r), page) {
                        out.push(child);
                    }
                }
            },
            Object::Dictionary(dict) => {
                if let Some(child) = self.parse_kid_dict(dict, None, page) {
                    out.push(child);
                }
            },
            other => log::debug!("Ignoring /K entry of type {}", other.type_name()),
        }
    }

    fn parse_kid_dict(&mut self, dict: &Dictionary, obj_ref: Option<ObjectRef>, page: Option<PageId>) -> Option<StructChild> {
        let type_name = dict.get("Type").and_then(Object::as_name);

        if type_name == Some("MCR") || (type_name.is_none() && dict.contains_key("MCID")) {
            return self.parse_marked_content_ref(dict);
        }
        if type_name == Some("OBJR") || (type_name.is_none() && dict.contains_key("Obj")) {
            let obj = dict.get("Obj").and_then(Object::as_reference)?;
            return Some(StructChild::Object {
                obj,
                page: self.page_of(dict),
            });
        }

        self.parse_struct_elem(dict, obj_ref, page)
            .map(StructChild::Element)
    }

    /// Parse a marked content reference dictionary (/Type /MCR, /Pg, /MCID).
    fn parse_marked_content_ref(&self, dict: &Dictionary) -> Option<StructChild> {
        let mcid = dict
            .get("MCID")
            .and_then(Object::as_integer)
            .and_then(|m| u32::try_from(m).ok());
        match mcid {
            Some(mcid) => Some(StructChild::MarkedContent {
                mcid,
                page: self.page_of(dict),
            }),
            None => {
                log::debug!("MCR without a valid /MCID");
                None
            },
        }
    }

    fn page_of(&self, dict: &Dictionary) -> Option<PageId> {
        dict.get("Pg")
            .and_then(Object::as_reference)
            .and_then(|r| self.resolver.page_index(r))
    }

    /// Parse a structure element dictionary into the arena.
    fn parse_struct_elem(&mut self, dict: &Dictionary, obj_ref: Option<ObjectRef>, inherited_page: Option<PageId>) -> Option<ElemId> {
        if let Some(type_name) = dict.get("Type").and_then(Object::as_name) {
            if type_name != "StructElem" {
                log::debug!("Skipping /K dictionary of type {}", type_name);
                return None;
            }
        }

        // A missing or malformed /S leaves a transparent wrapper.
        let struct_type = match dict.get("S") {
            Some(Object::Name(name)) => name.clone(),
            Some(other) => {
                log::debug!("StructElem /S is a {}, not a name", other.type_name());
                String::new()
            },
            None => String::new(),
        };

        let mut elem = StructElem::new(struct_type);
        elem.obj_ref = obj_ref;
        elem.page = self.page_of(dict).or(inherited_page);

        if let Some(ns) = dict.get("NS") {
            elem.namespace = match resolve_object(self.resolver, ns) {
                Ok(Object::Dictionary(ns_dict)) => ns_dict
                    .get("NS")
                    .and_then(Object::as_name_or_text)
                    .map(|uri| Namespace::from_uri(&uri))
                    .unwrap_or_default(),
                _ => Namespace::Default,
            };
        }

        if let Some(a) = dict.get("A") {
            elem.attributes = parse_attribute_list(self.resolver, a);
        }
        elem.bbox = elem
            .attributes
            .iter()
            .filter(|d| d.owner.category == OwnerCategory::Layout)
            .find_map(|d| d.get("BBox"))
            .and_then(parse_rect);

        if let Some(c) = dict.get("C") {
            elem.classes = match c {
                Object::Name(n) => vec![n.clone()],
                Object::Array(arr) => arr
                    .iter()
                    .filter_map(|o| o.as_name().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            };
        }

        let text = |key: &str| {
            dict.get(key)
                .and_then(|o| resolve_object(self.resolver, o).ok())
                .and_then(|o| o.as_name_or_text())
        };
        elem.id = text("ID");
        elem.lang = text("Lang");
        elem.title = text("T");
        elem.alt = text("Alt");
        elem.actual_text = text("ActualText");
        elem.expansion = text("E");

        let page = elem.page;
        let id = self.tree.push_element(elem);

        if let Some(k_obj) = dict.get("K") {
            if let Some(r) = obj_ref {
                self.path.insert(r);
            }
            let children = self.parse_k(k_obj, page);
            if let Some(r) = obj_ref {
                self.path.remove(&r);
            }
            if let Some(elem) = self.tree.elements.get_mut(id.0) {
                elem.children = children;
            }
        }

        Some(id)
    }
}

/// Parse an /A or ClassMap value: a single attribute dictionary, or an array of
/// dictionaries optionally interleaved with revision numbers.
fn parse_attribute_list(resolver: &dyn ObjectResolver, value: &Object) -> Vec<AttributeDict> {
    let value = match resolve_object(resolver, value) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("Attribute object unavailable: {}", e);
            return Vec::new();
        },
    };
    match value {
        Object::Array(items) => items
            .iter()
            .filter(|item| !matches!(item, Object::Integer(_)))
            .filter_map(|item| resolve_object(resolver, item).ok())
            .filter_map(|item| parse_attribute_dict(&item))
            .collect(),
        other => parse_attribute_dict(&other).into_iter().collect(),
    }
}

fn parse_attribute_dict(obj: &Object) -> Option<AttributeDict> {
    let dict = obj.as_dict()?;
    let owner = match dict.get("O").and_then(Object::as_name) {
        Some(owner) => AttributeOwner::parse(owner),
        None => {
            log::debug!("Attribute dictionary without /O owner skipped");
            return None;
        },
    };
    let entries = dict
        .iter()
        .filter(|(k, _)| k.as_str() != "O")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Some(AttributeDict { owner, entries })
}

fn parse_rect(obj: &Object) -> Option<Rect> {
    let values: Vec<f32> = obj
        .as_array()?
        .iter()
        .filter_map(|o| o.as_number().map(|n| n as f32))
        .collect();
    Rect::from_pdf_array(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Objects {
        objects: HashMap<ObjectRef, Object>,
        pages: HashMap<ObjectRef, PageId>,
    }

    impl ObjectResolver for Objects {
        fn resolve(&self, r: ObjectRef) -> Option<Object> {
            self.objects.get(&r).cloned()
        }

        fn page_index(&self, r: ObjectRef) -> Option<PageId> {
            self.pages.get(&r).copied()
        }
    }

    fn dict(entries: Vec<(&str, Object)>) -> Object {
        Object::Dictionary(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    fn r(id: u32) -> ObjectRef {
        ObjectRef::new(id, 0)
    }

    fn catalog(root: Object) -> Dictionary {
        let mut d = Dictionary::new();
        d.insert("StructTreeRoot".to_string(), root);
        d
    }

    #[test]
    fn test_untagged_catalog() {
        let objects = Objects::default();
        assert!(parse_structure_tree(&Dictionary::new(), &objects)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_parse_tree_with_mcids_and_role_map() {
        let mut objects = Objects::default();
        objects.pages.insert(r(100), 0);
        let para = dict(vec![
            ("S", Object::name("Para")),
            ("Pg", Object::Reference(r(100))),
            (
                "K",
                Object::Array(vec![
                    Object::Integer(0),
                    dict(vec![
                        ("Type", Object::name("MCR")),
                        ("MCID", Object::Integer(1)),
                    ]),
                ]),
            ),
        ]);
        let root = dict(vec![
            ("RoleMap", dict(vec![("Para", Object::name("P"))])),
            ("K", para),
        ]);

        let tree = parse_structure_tree(&catalog(root), &objects)
            .unwrap()
            .unwrap();
        assert_eq!(tree.role_map.get("Para").map(String::as_str), Some("P"));
        assert_eq!(tree.root_children, vec![StructChild::Element(ElemId(0))]);
        let p = &tree.elements[0];
        assert_eq!(p.struct_type, "Para");
        assert_eq!(p.page, Some(0));
        assert_eq!(p.children.len(), 2);
    }

    #[test]
    fn test_attributes_with_revisions_and_bbox() {
        let objects = Objects::default();
        let elem = dict(vec![
            ("S", Object::name("Figure")),
            (
                "A",
                Object::Array(vec![
                    dict(vec![
                        ("O", Object::name("Layout")),
                        (
                            "BBox",
                            Object::Array(vec![
                                Object::Integer(0),
                                Object::Integer(0),
                                Object::Integer(72),
                                Object::Integer(36),
                            ]),
                        ),
                    ]),
                    Object::Integer(0),
                    dict(vec![("O", Object::name("HTML-5.00")), ("lang", Object::text("en"))]),
                ]),
            ),
            ("Alt", Object::text("A chart")),
        ]);
        let tree = parse_structure_tree(&catalog(dict(vec![("K", elem)])), &objects)
            .unwrap()
            .unwrap();
        let fig = &tree.elements[0];
        assert_eq!(fig.attributes.len(), 2);
        assert_eq!(fig.attributes[1].owner.category, OwnerCategory::Html);
        assert!(!fig.attributes[0].entries.contains_key("O"));
        assert_eq!(fig.bbox, Some(Rect::new(0.0, 0.0, 72.0, 36.0)));
        assert_eq!(fig.alt.as_deref(), Some("A chart"));
    }

    #[test]
    fn test_cycle_in_k_is_broken() {
        let mut objects = Objects::default();
        objects.objects.insert(
            r(1),
            dict(vec![("S", Object::name("Div")), ("K", Object::Reference(r(2)))]),
        );
        objects.objects.insert(
            r(2),
            dict(vec![("S", Object::name("Div")), ("K", Object::Reference(r(1)))]),
        );
        let root = dict(vec![("K", Object::Reference(r(1)))]);
        let tree = parse_structure_tree(&catalog(root), &objects)
            .unwrap()
            .unwrap();
        assert_eq!(tree.elements.len(), 2);
        assert!(tree.elements[1].children.is_empty());
    }

    #[test]
    fn test_missing_s_is_transparent_wrapper() {
        let objects = Objects::default();
        let root = dict(vec![("K", dict(vec![("K", Object::Integer(3))]))]);
        let tree = parse_structure_tree(&catalog(root), &objects)
            .unwrap()
            .unwrap();
        assert_eq!(tree.elements[0].struct_type, "");
        assert_eq!(tree.elements[0].children.len(), 1);
    }

    #[test]
    fn test_objr_and_namespace() {
        let mut objects = Objects::default();
        objects.objects.insert(
            r(5),
            dict(vec![("NS", Object::text("http://www.w3.org/1998/Math/MathML"))]),
        );
        let link = dict(vec![
            ("S", Object::name("mi")),
            ("NS", Object::Reference(r(5))),
            (
                "K",
                dict(vec![("Type", Object::name("OBJR")), ("Obj", Object::Reference(r(9)))]),
            ),
        ]);
        let tree = parse_structure_tree(&catalog(dict(vec![("K", link)])), &objects)
            .unwrap()
            .unwrap();
        assert_eq!(tree.elements[0].namespace, Namespace::MathMl);
        assert_eq!(
            tree.elements[0].children,
            vec![StructChild::Object { obj: r(9), page: None }]
        );
    }
}
