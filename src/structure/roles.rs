//! Role resolution.
//!
//! Maps a raw structure type plus its namespace onto the role that drives tag
//! selection. Non-standard types are walked up the document's RoleMap until a
//! standard type is reached. A cycle in the RoleMap stops the walk at the first
//! repeated name and that name is used as-is.

use super::types::{Namespace, StructType};
use std::collections::{HashMap, HashSet};

/// The outcome of role resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedRole {
    /// A standard structure type (or an unmapped custom name)
    Pdf(StructType),
    /// HTML namespace: the raw type is the output tag
    Html(String),
    /// MathML namespace: the raw type is a MathML element name
    MathMl(String),
}

impl ResolvedRole {
    /// The PDF structure type, if this role is one.
    pub fn struct_type(&self) -> Option<&StructType> {
        match self {
            Self::Pdf(ty) => Some(ty),
            _ => None,
        }
    }

    /// True when the role is the given standard type.
    pub fn is(&self, ty: &StructType) -> bool {
        self.struct_type() == Some(ty)
    }

    /// Name recorded in the `data-pdf-se-type` provenance attribute.
    pub fn name(&self) -> String {
        match self {
            Self::Pdf(ty) => ty.name().into_owned(),
            Self::Html(tag) | Self::MathMl(tag) => tag.clone(),
        }
    }
}

/// Walk the role map from `raw_type`.
///
/// Returns every name visited, starting with `raw_type`. The walk stops at a
/// standard type, at a name with no mapping, or at the first name seen twice
/// (which is then the last entry). It performs at most `role_map.len()` steps.
pub fn role_chain(raw_type: &str, role_map: &HashMap<String, String>) -> Vec<String> {
    let mut chain = vec![raw_type.to_string()];
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = raw_type;

    loop {
        if !visited.insert(current) {
            log::debug!("RoleMap cycle at '{}' while resolving '{}'", current, raw_type);
            break;
        }
        let Some(parent) = role_map.get(current) else {
            break;
        };
        chain.push(parent.clone());
        current = parent.as_str();
        if StructType::is_standard_name(current) {
            break;
        }
    }

    chain
}

/// Resolve a raw structure type to its role.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use tagged_pdf_html::structure::{resolve_role, Namespace, ResolvedRole, StructType};
///
/// let mut role_map = HashMap::new();
/// role_map.insert("Chapter".to_string(), "Sect".to_string());
///
/// let role = resolve_role("Chapter", &Namespace::Default, &role_map);
/// assert_eq!(role, ResolvedRole::Pdf(StructType::Sect));
/// ```
pub fn resolve_role(raw_type: &str, namespace: &Namespace, role_map: &HashMap<String, String>) -> ResolvedRole {
    match namespace {
        Namespace::Html => return ResolvedRole::Html(raw_type.to_string()),
        Namespace::MathMl => return ResolvedRole::MathMl(raw_type.to_string()),
        ns if ns.is_standard() => {
            if let Some(ty) = StructType::standard(raw_type) {
                return ResolvedRole::Pdf(ty);
            }
        },
        _ => {},
    }

    let chain = role_chain(raw_type, role_map);
    let last = chain.last().map(String::as_str).unwrap_or(raw_type);
    ResolvedRole::Pdf(StructType::from_str(last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_standard_type_ignores_role_map() {
        let role_map = map(&[("P", "H1")]);
        assert_eq!(
            resolve_role("P", &Namespace::Default, &role_map),
            ResolvedRole::Pdf(StructType::P)
        );
    }

    #[test]
    fn test_chain_to_standard() {
        let role_map = map(&[("Heading", "Title1"), ("Title1", "H1"), ("H1", "P")]);
        assert_eq!(
            resolve_role("Heading", &Namespace::Default, &role_map),
            ResolvedRole::Pdf(StructType::Hn(1))
        );
    }

    #[test]
    fn test_unmapped_custom_type() {
        assert_eq!(
            resolve_role("Widget", &Namespace::Default, &HashMap::new()),
            ResolvedRole::Pdf(StructType::Custom("Widget".to_string()))
        );
    }

    #[test]
    fn test_cycle_stops_at_repeated_name() {
        let role_map = map(&[("A", "B"), ("B", "A")]);
        let chain = role_chain("A", &role_map);
        assert_eq!(chain, vec!["A", "B", "A"]);
        assert_eq!(
            resolve_role("A", &Namespace::Default, &role_map),
            ResolvedRole::Pdf(StructType::Custom("A".to_string()))
        );
    }

    #[test]
    fn test_self_loop() {
        let role_map = map(&[("X", "X")]);
        assert_eq!(role_chain("X", &role_map), vec!["X", "X"]);
    }

    #[test]
    fn test_foreign_namespaces_bypass_role_map() {
        let role_map = map(&[("mi", "Span"), ("section", "Div")]);
        assert_eq!(
            resolve_role("mi", &Namespace::MathMl, &role_map),
            ResolvedRole::MathMl("mi".to_string())
        );
        assert_eq!(
            resolve_role("section", &Namespace::Html, &role_map),
            ResolvedRole::Html("section".to_string())
        );
    }

    #[test]
    fn test_custom_namespace_uses_role_map_even_for_standard_names() {
        let role_map = map(&[("P", "Span")]);
        let ns = Namespace::Custom("urn:vendor".to_string());
        assert_eq!(resolve_role("P", &ns, &role_map), ResolvedRole::Pdf(StructType::Span));
    }

    proptest! {
        #[test]
        fn prop_role_walk_terminates(
            edges in proptest::collection::vec((0u8..12, 0u8..12), 0..24),
            start in 0u8..12,
        ) {
            let role_map: HashMap<String, String> = edges
                .iter()
                .map(|(a, b)| (format!("T{}", a), format!("T{}", b)))
                .collect();
            let chain = role_chain(&format!("T{}", start), &role_map);
            prop_assert!(chain.len() - 1 <= role_map.len());
        }

        #[test]
        fn prop_standard_types_resolve_to_themselves(
            idx in 0usize..8,
            targets in proptest::collection::vec("[A-Z][a-z]{0,4}", 8),
        ) {
            let names = ["P", "Sect", "H3", "Table", "LI", "Span", "Figure", "Link"];
            let role_map: HashMap<String, String> = names
                .iter()
                .zip(targets.iter())
                .map(|(n, t)| (n.to_string(), t.clone()))
                .collect();
            let role = resolve_role(names[idx], &Namespace::Default, &role_map);
            prop_assert_eq!(role, ResolvedRole::Pdf(StructType::from_str(names[idx])));
        }
    }
}
