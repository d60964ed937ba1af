//! Link and widget annotations referenced from the structure tree.
//!
//! Structure elements reach annotations through OBJR children. Only the parts
//! the HTML derivation needs are modelled: the link action or destination of a
//! `Link` annotation and the field name/value of a `Widget`.
//!
//! PDF Spec: ISO 32000-1:2008, Section 12.3.2 (Destinations), 12.5 (Annotations)
//! and 12.6 (Actions).

use crate::error::{Error, Result};
use crate::object::{Dictionary, Object, ObjectRef};
use crate::structure::parser::ObjectResolver;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Characters escaped when a destination name becomes a URL fragment.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^');

/// Annotation subtypes the derivation distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnotationSubtype {
    /// Hyperlink
    Link,
    /// Interactive form field widget
    Widget,
    /// Anything else (kept by name for logging)
    Other(String),
}

impl AnnotationSubtype {
    /// Classify a `/Subtype` name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Link" => Self::Link,
            "Widget" => Self::Widget,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A PDF annotation as seen from the structure tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Annotation subtype
    pub subtype: AnnotationSubtype,

    /// Text contents (`/Contents`)
    #[serde(default)]
    pub contents: Option<String>,

    /// Rectangle bounds `[x1, y1, x2, y2]`
    #[serde(default)]
    pub rect: Option<[f32; 4]>,

    /// Link destination (`/Dest`)
    #[serde(default)]
    pub destination: Option<LinkDestination>,

    /// Link action (`/A`)
    #[serde(default)]
    pub action: Option<LinkAction>,

    /// Field type for widgets (`/FT`: Btn, Tx, Ch, Sig)
    #[serde(default)]
    pub field_type: Option<String>,

    /// Field name for widgets (`/T`)
    #[serde(default)]
    pub field_name: Option<String>,

    /// Field value for widgets (`/V`)
    #[serde(default)]
    pub field_value: Option<String>,
}

impl Annotation {
    /// Create an annotation of the given subtype with no other entries.
    pub fn new(subtype: AnnotationSubtype) -> Self {
        Self {
            subtype,
            contents: None,
            rect: None,
            destination: None,
            action: None,
            field_type: None,
            field_name: None,
            field_value: None,
        }
    }

    /// Create a link annotation carrying an action.
    pub fn link(action: LinkAction) -> Self {
        Self {
            action: Some(action),
            ..Self::new(AnnotationSubtype::Link)
        }
    }

    /// Create a widget annotation.
    pub fn widget(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            field_name: Some(name.into()),
            field_value: value,
            ..Self::new(AnnotationSubtype::Widget)
        }
    }

    /// The effective navigation target: `/A` wins over `/Dest`.
    pub fn link_action(&self) -> Option<LinkAction> {
        self.action
            .clone()
            .or_else(|| self.destination.clone().map(LinkAction::GoTo))
    }

    /// Parse an annotation dictionary.
    pub fn from_dict(dict: &Dictionary, resolver: &dyn ObjectResolver) -> Self {
        let subtype = dict
            .get("Subtype")
            .and_then(Object::as_name)
            .map(AnnotationSubtype::from_name)
            .unwrap_or_else(|| AnnotationSubtype::Other(String::new()));

        let rect = dict.get("Rect").and_then(Object::as_array).and_then(|arr| {
            let nums: Vec<f32> = arr.iter().filter_map(|o| o.as_number()).map(|n| n as f32).collect();
            <[f32; 4]>::try_from(nums.as_slice()).ok()
        });

        let action = dict.get("A").and_then(|a| match parse_action(a, resolver) {
            Ok(action) => Some(action),
            Err(e) => {
                log::debug!("Skipping malformed annotation action: {}", e);
                None
            },
        });
        let destination = dict.get("Dest").and_then(|d| match parse_destination(d, resolver) {
            Ok(dest) => Some(dest),
            Err(e) => {
                log::debug!("Skipping malformed annotation destination: {}", e);
                None
            },
        });

        let text = |key: &str| dict.get(key).and_then(Object::as_name_or_text);

        Self {
            subtype,
            contents: text("Contents"),
            rect,
            destination,
            action,
            field_type: dict.get("FT").and_then(Object::as_name).map(str::to_string),
            field_name: text("T"),
            field_value: text("V"),
        }
    }
}

/// Link destination within a PDF document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinkDestination {
    /// Named destination (string or name)
    Named(String),
    /// Explicit destination: `[page /FitType params...]`
    Explicit {
        /// Target page number (0-indexed)
        page: u32,
        /// Fit type (XYZ, Fit, FitH, FitV, FitR, FitB, FitBH, FitBV)
        fit_type: String,
        /// Additional parameters (coordinates, zoom factor, etc.)
        params: Vec<f32>,
    },
    /// Structure destination (PDF 2.0): the target is a structure element
    Structure(ObjectRef),
}

impl LinkDestination {
    /// URL fragment for destinations that do not point at a structure element.
    pub fn fragment(&self) -> Option<String> {
        match self {
            Self::Named(name) => Some(encode_fragment(name)),
            Self::Explicit { page, .. } => Some(format!("page-{}", page + 1)),
            Self::Structure(_) => None,
        }
    }
}

/// Link action associated with an annotation or structure element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinkAction {
    /// URI action - navigate to a web URL
    Uri(String),
    /// GoTo action - navigate to a destination within the document
    GoTo(LinkDestination),
    /// GoToR action - navigate to a destination in another document
    GoToRemote {
        /// File specification
        file: String,
        /// Destination in remote file
        destination: Option<LinkDestination>,
    },
    /// Other action types (Launch, Named, JavaScript, ...)
    Other {
        /// Action type (`/S` field)
        action_type: String,
    },
}

/// Percent-encode a destination name for use as a URL fragment.
pub fn encode_fragment(name: &str) -> String {
    utf8_percent_encode(name, FRAGMENT).to_string()
}

/// Parse a destination value.
///
/// PDF Spec: ISO 32000-1:2008, Section 12.3.2 - Destinations
pub fn parse_destination(dest_obj: &Object, resolver: &dyn ObjectResolver) -> Result<LinkDestination> {
    parse_destination_inner(dest_obj, resolver, &mut HashSet::new())
}

/// `seen` holds the references already followed for this destination.
fn parse_destination_inner(
    dest_obj: &Object,
    resolver: &dyn ObjectResolver,
    seen: &mut HashSet<ObjectRef>,
) -> Result<LinkDestination> {
    match dest_obj {
        Object::String(s) => Ok(LinkDestination::Named(crate::object::decode_text_string(s))),
        Object::Name(n) => Ok(LinkDestination::Named(n.clone())),
        Object::Array(arr) if !arr.is_empty() => {
            let page = match &arr[0] {
                Object::Integer(n) => u32::try_from(*n).unwrap_or(0),
                Object::Reference(r) => match resolver.page_index(*r) {
                    Some(index) => index,
                    None => {
                        // Not a page: a structure destination names its target element.
                        if resolver
                            .resolve(*r)
                            .as_ref()
                            .and_then(Object::as_dict)
                            .is_some_and(|d| d.contains_key("S") || d.contains_key("K"))
                        {
                            return Ok(LinkDestination::Structure(*r));
                        }
                        return Err(Error::ObjectNotFound(r.id, r.gen));
                    },
                },
                _ => 0,
            };

            let fit_type = arr
                .get(1)
                .and_then(Object::as_name)
                .unwrap_or("Fit")
                .to_string();

            let params: Vec<f32> = arr
                .iter()
                .skip(2)
                .filter_map(|obj| obj.as_number().map(|n| n as f32))
                .collect();

            Ok(LinkDestination::Explicit {
                page,
                fit_type,
                params,
            })
        },
        Object::Reference(r) => {
            if !seen.insert(*r) {
                return Err(Error::CircularReference(*r));
            }
            let loaded = resolver
                .resolve(*r)
                .ok_or(Error::ObjectNotFound(r.id, r.gen))?;
            parse_destination_inner(&loaded, resolver, seen)
        },
        // Destination dictionaries wrap the array in /D.
        Object::Dictionary(d) => match d.get("D") {
            Some(inner) => parse_destination_inner(inner, resolver, seen),
            None => Err(Error::InvalidStructure("Destination dictionary without /D".to_string())),
        },
        other => Err(Error::InvalidStructure(format!("Invalid destination: {}", other.type_name()))),
    }
}

/// Parse an action dictionary.
///
/// PDF Spec: ISO 32000-1:2008, Section 12.6 - Actions
pub fn parse_action(action_obj: &Object, resolver: &dyn ObjectResolver) -> Result<LinkAction> {
    let resolved;
    let action = match action_obj {
        Object::Reference(r) => {
            resolved = resolver
                .resolve(*r)
                .ok_or(Error::ObjectNotFound(r.id, r.gen))?;
            &resolved
        },
        other => other,
    };

    let dict = action
        .as_dict()
        .ok_or_else(|| Error::InvalidStructure("Action is not a dictionary".to_string()))?;

    let action_type = dict
        .get("S")
        .and_then(Object::as_name)
        .ok_or_else(|| Error::InvalidStructure("Action missing /S field".to_string()))?;

    match action_type {
        "URI" => {
            let uri = dict
                .get("URI")
                .and_then(Object::as_name_or_text)
                .ok_or_else(|| Error::InvalidStructure("URI action missing /URI".to_string()))?;
            Ok(LinkAction::Uri(uri))
        },
        "GoTo" => {
            let dest = dict
                .get("D")
                .ok_or_else(|| Error::InvalidStructure("GoTo action missing /D".to_string()))?;
            Ok(LinkAction::GoTo(parse_destination(dest, resolver)?))
        },
        "GoToR" => {
            let file = dict
                .get("F")
                .and_then(|f| match f {
                    Object::Dictionary(spec) => spec
                        .get("UF")
                        .or_else(|| spec.get("F"))
                        .and_then(Object::as_name_or_text),
                    other => other.as_name_or_text(),
                })
                .ok_or_else(|| Error::InvalidStructure("GoToR action missing /F".to_string()))?;
            let destination = dict.get("D").and_then(|d| parse_destination(d, resolver).ok());
            Ok(LinkAction::GoToRemote { file, destination })
        },
        other => Ok(LinkAction::Other {
            action_type: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Objects {
        objects: HashMap<ObjectRef, Object>,
        pages: HashMap<ObjectRef, u32>,
    }

    impl ObjectResolver for Objects {
        fn resolve(&self, r: ObjectRef) -> Option<Object> {
            self.objects.get(&r).cloned()
        }

        fn page_index(&self, r: ObjectRef) -> Option<u32> {
            self.pages.get(&r).copied()
        }
    }

    fn dict(entries: Vec<(&str, Object)>) -> Object {
        Object::Dictionary(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn test_named_destination_fragment_is_percent_encoded() {
        let dest = LinkDestination::Named("Chapter 1#a".to_string());
        assert_eq!(dest.fragment().as_deref(), Some("Chapter%201%23a"));
    }

    #[test]
    fn test_explicit_destination_resolves_page_reference() {
        let mut objects = Objects::default();
        objects.pages.insert(ObjectRef::new(4, 0), 2);
        let arr = Object::Array(vec![
            Object::Reference(ObjectRef::new(4, 0)),
            Object::name("XYZ"),
            Object::Integer(0),
            Object::Real(700.0),
        ]);
        let dest = parse_destination(&arr, &objects).unwrap();
        assert_eq!(dest.fragment().as_deref(), Some("page-3"));
    }

    #[test]
    fn test_structure_destination() {
        let mut objects = Objects::default();
        let target = ObjectRef::new(9, 0);
        objects.objects.insert(target, dict(vec![("S", Object::name("H1"))]));
        let arr = Object::Array(vec![Object::Reference(target), Object::name("Fit")]);
        assert_eq!(parse_destination(&arr, &objects).unwrap(), LinkDestination::Structure(target));
    }

    #[test]
    fn test_self_referencing_destination_is_circular() {
        let mut objects = Objects::default();
        let r = ObjectRef::new(5, 0);
        objects.objects.insert(r, Object::Reference(r));
        assert!(matches!(
            parse_destination(&Object::Reference(r), &objects),
            Err(Error::CircularReference(found)) if found == r
        ));
    }

    #[test]
    fn test_destination_cycle_through_dictionary() {
        let mut objects = Objects::default();
        let a = ObjectRef::new(6, 0);
        let b = ObjectRef::new(7, 0);
        objects.objects.insert(a, dict(vec![("D", Object::Reference(b))]));
        objects.objects.insert(b, dict(vec![("D", Object::Reference(a))]));
        assert!(matches!(
            parse_destination(&Object::Reference(a), &objects),
            Err(Error::CircularReference(_))
        ));

        // The same cycle reached from an annotation only drops the destination
        let annot = dict(vec![("Subtype", Object::name("Link")), ("Dest", Object::Reference(a))]);
        let annot = Annotation::from_dict(annot.as_dict().unwrap(), &objects);
        assert!(annot.destination.is_none());
    }

    #[test]
    fn test_goto_action_with_cyclic_destination_is_error() {
        let mut objects = Objects::default();
        let r = ObjectRef::new(8, 0);
        objects.objects.insert(r, Object::Reference(r));
        let action = dict(vec![("S", Object::name("GoTo")), ("D", Object::Reference(r))]);
        assert!(matches!(parse_action(&action, &objects), Err(Error::CircularReference(_))));
    }

    #[test]
    fn test_parse_uri_action() {
        let objects = Objects::default();
        let action = dict(vec![
            ("S", Object::name("URI")),
            ("URI", Object::text("https://example.com")),
        ]);
        assert_eq!(
            parse_action(&action, &objects).unwrap(),
            LinkAction::Uri("https://example.com".to_string())
        );
    }

    #[test]
    fn test_parse_remote_goto() {
        let objects = Objects::default();
        let action = dict(vec![
            ("S", Object::name("GoToR")),
            ("F", Object::text("other.pdf")),
            ("D", Object::text("intro")),
        ]);
        match parse_action(&action, &objects).unwrap() {
            LinkAction::GoToRemote { file, destination } => {
                assert_eq!(file, "other.pdf");
                assert_eq!(destination, Some(LinkDestination::Named("intro".to_string())));
            },
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_action_without_type_is_error() {
        let objects = Objects::default();
        assert!(parse_action(&dict(vec![]), &objects).is_err());
    }

    #[test]
    fn test_widget_from_dict() {
        let objects = Objects::default();
        let d = dict(vec![
            ("Subtype", Object::name("Widget")),
            ("FT", Object::name("Tx")),
            ("T", Object::text("email")),
            ("V", Object::text("a@b.c")),
        ]);
        let annot = Annotation::from_dict(d.as_dict().unwrap(), &objects);
        assert_eq!(annot.subtype, AnnotationSubtype::Widget);
        assert_eq!(annot.field_name.as_deref(), Some("email"));
        assert_eq!(annot.field_value.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_action_wins_over_dest() {
        let mut annot = Annotation::link(LinkAction::Uri("https://x".into()));
        annot.destination = Some(LinkDestination::Named("n".into()));
        assert_eq!(annot.link_action(), Some(LinkAction::Uri("https://x".into())));
    }
}
