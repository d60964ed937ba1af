//! Structure tree traversal for extracting reading order.
//!
//! Pre-order traversal of the structure tree yields marked content in logical
//! reading order, independent of the order in which it was painted.

use super::roles::{resolve_role, ResolvedRole};
use super::types::{ElemId, PageId, StructChild, StructTreeRoot};
use std::collections::HashSet;

/// An ordered content item extracted from the structure tree.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedContent {
    /// Page number
    pub page: PageId,

    /// Marked Content ID
    pub mcid: u32,

    /// Element that owns the marked content
    pub owner: ElemId,

    /// Resolved role of the owner
    pub role: ResolvedRole,
}

/// Traverse the structure tree and collect the marked content on one page.
///
/// Children inherit their parent's page when they do not name one.
pub fn traverse_structure_tree(struct_tree: &StructTreeRoot, page_num: PageId) -> Vec<OrderedContent> {
    let mut result = Vec::new();
    let mut visiting = HashSet::new();

    for child in &struct_tree.root_children {
        if let StructChild::Element(id) = child {
            traverse_element(struct_tree, *id, None, page_num, &mut visiting, &mut result);
        }
    }

    result
}

fn traverse_element(
    tree: &StructTreeRoot,
    id: ElemId,
    inherited_page: Option<PageId>,
    target_page: PageId,
    visiting: &mut HashSet<ElemId>,
    result: &mut Vec<OrderedContent>,
) {
    let Some(elem) = tree.element(id) else {
        return;
    };
    if !visiting.insert(id) {
        log::warn!("Element {:?} is its own ancestor, not descending", id);
        return;
    }

    let page = elem.page.or(inherited_page);
    let role = resolve_role(&elem.struct_type, &elem.namespace, &tree.role_map);

    for child in &elem.children {
        match child {
            StructChild::MarkedContent { mcid, page: own } => {
                if own.or(page) == Some(target_page) {
                    result.push(OrderedContent {
                        page: target_page,
                        mcid: *mcid,
                        owner: id,
                        role: role.clone(),
                    });
                }
            },
            StructChild::Element(child_id) => {
                traverse_element(tree, *child_id, page, target_page, visiting, result);
            },
            StructChild::Object { .. } => {},
        }
    }

    visiting.remove(&id);
}

/// Extract all marked content IDs in reading order for a page.
pub fn extract_reading_order(struct_tree: &StructTreeRoot, page_num: PageId) -> Vec<u32> {
    traverse_structure_tree(struct_tree, page_num)
        .into_iter()
        .map(|c| c.mcid)
        .collect()
}
