// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::match_like_matches_macro)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Tagged PDF to HTML
//!
//! Derives semantic HTML5 and CSS from the structure tree of a Tagged PDF.
//!
//! The crate does not read PDF files. It consumes an already-parsed object
//! model through [`ObjectModelProvider`] and turns the logical structure into
//! well-nested HTML:
//!
//! - **Role resolution**: custom structure types are mapped to standard roles
//!   through the document's RoleMap, namespace-aware (PDF 1.7, PDF 2.0,
//!   MathML, HTML)
//! - **Tag selection**: headings by nesting depth, list/table/figure
//!   specialisation, link collapsing, inline containment
//! - **Attribute cascade**: List, Table, Layout, HTML, CSS and ARIA owners
//!   merged into HTML attributes and inline CSS
//! - **Content correlation**: text, images and drawing operators attributed to
//!   marked-content identifiers, one extraction pass per page
//! - **Vector graphics**: drawing-only content inside figures becomes SVG
//!
//! ## Quick Start
//!
//! ```
//! use tagged_pdf_html::content::Operator;
//! use tagged_pdf_html::document::SnapshotDocument;
//! use tagged_pdf_html::object::Object;
//! use tagged_pdf_html::structure::{StructElem, StructTreeBuilder};
//! use tagged_pdf_html::{render, ConversionOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = StructTreeBuilder::new();
//! let p = builder.add_root(StructElem::new("P").with_page(0));
//! builder.add_mcid(p, 0);
//!
//! let mcid = Object::Dictionary([("MCID".to_string(), Object::Integer(0))].into_iter().collect());
//! let doc = SnapshotDocument::new(builder.build()).with_page(vec![
//!     Operator::BeginMarkedContentDict { tag: "P".into(), properties: mcid },
//!     Operator::ShowText { text: "Hello".into() },
//!     Operator::EndMarkedContent,
//! ]);
//!
//! let out = render(&doc, &ConversionOptions::default())?;
//! assert_eq!(out.body, "<p id=\"pdf-se-1\" data-pdf-se-type=\"P\">Hello</p>");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Object model
pub mod geometry;
pub mod object;

// Document structure
pub mod annotations;
pub mod document;
/// Content elements resolved out of page content
pub mod elements;
/// PDF logical structure (Tagged PDFs)
pub mod structure;

// Page content
pub mod content;

// Format converters
pub mod converters;

// Re-exports
pub use annotations::{Annotation, LinkAction, LinkDestination};
pub use config::ConversionOptions;
pub use converters::{render, RenderedDocument};
pub use document::{ObjectModelProvider, SnapshotDocument};
pub use error::{Error, Result};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
