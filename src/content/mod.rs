//! Page content: operators, graphics state and marked-content correlation.

pub mod extractor;
pub mod graphics_state;
pub mod operators;

pub use extractor::{ContentCache, MarkedContentProperties, McidContent, PageContentIndex, TextParts};
pub use graphics_state::{GraphicsState, GraphicsStateStack, Matrix};
pub use operators::Operator;
