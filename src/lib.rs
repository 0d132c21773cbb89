//! # varguard
//!
//! Validate and fix the fallback values of CSS custom property references.
//!
//! Given a table of canonical custom property values, varguard checks every
//! `var(--name, fallback)` reference that starts a declaration value. A
//! fallback that differs from the canonical value is reported and replaced,
//! so `var(--border-radius, 5px)` becomes `var(--border-radius, 4px)` when
//! the table says `--border-radius` is `4px`.
//!
//! ## Quick Start
//!
//! ```
//! use varguard::{Options, PropertyTable, Validator};
//!
//! let properties: PropertyTable = [("--border-radius", "4px")].into_iter().collect();
//! let mut validator = Validator::new(Options::new(properties)).unwrap();
//!
//! let result = validator.process(".danger { border-radius: var(--border-radius, 5px); }", None);
//!
//! assert_eq!(result.corrections.len(), 1);
//! assert_eq!(result.corrections[0].current, "5px");
//! assert_eq!(result.css, ".danger { border-radius: var(--border-radius, 4px); }");
//! ```
//!
//! ## Writing files
//!
//! With [`Options::write`] enabled, a stylesheet that needed corrections is
//! written back to the path it was loaded from. Write failures are not
//! returned as errors; they are passed to the completion callback and kept
//! in [`RunResult::persist_error`].

pub mod css;
pub mod error;
pub mod extract;
pub mod persist;
pub mod properties;
pub mod validate;

pub use css::Stylesheet;
pub use error::{Error, Result};
pub use extract::{CustomPropertyReference, extract, normalize_fallback};
pub use persist::{FsPersist, Persist};
pub use properties::PropertyTable;
pub use validate::{Callback, Correction, Options, RunResult, Validator};
