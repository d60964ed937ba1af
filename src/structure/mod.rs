//! PDF Logical Structure (Tagged PDF) support.
//!
//! This module holds the structure tree model according to ISO 32000-1:2008
//! Section 14.7 and ISO 32000-2 Section 14.7-14.8.
//!
//! ## Structure Tree
//!
//! A structure tree consists of:
//! - **StructTreeRoot**: the root, carrying the RoleMap and ClassMap
//! - **StructElem**: structure elements (paragraphs, headings, sections, etc.)
//! - **Marked Content**: tagged content in page streams (BMC/BDC/EMC operators)
//! - **OBJR**: references to annotations and XObjects
//!
//! Elements are stored in an arena and addressed by [`ElemId`], which is
//! also the identity used when generating element identifiers.
//!
//! ## Roles
//!
//! [`resolve_role`] maps a raw type to a standard type through the RoleMap,
//! or to a verbatim HTML/MathML element for those namespaces.

pub mod builder;
pub mod parser;
pub mod roles;
pub mod traversal;
mod types;

pub use builder::StructTreeBuilder;
pub use parser::{parse_structure_tree, ObjectResolver};
pub use roles::{resolve_role, role_chain, ResolvedRole};
pub use traversal::{extract_reading_order, traverse_structure_tree, OrderedContent};
pub use types::{
    heading_level, AttributeDict, AttributeOwner, ElemId, Namespace, OwnerCategory, PageId,
    StructChild, StructElem, StructTreeRoot, StructType, HTML_NS, MATHML_NS, PDF_1_7_NS,
    PDF_2_0_NS,
};
