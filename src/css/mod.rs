//! CSS parsing for fallback validation.
//!
//! Two thin layers over cssparser: [`value`] turns one declaration value
//! into a tree of [`ValueNode`]s, and [`stylesheet`] finds declarations in
//! a whole document, walks them and writes edits back.

pub mod stylesheet;
pub mod value;

pub use stylesheet::{Declaration, DeclarationMut, StyleVisitor, Stylesheet};
pub use value::{ValueNode, ValueParseError, parse_value};
