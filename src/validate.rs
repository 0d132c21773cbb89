//! Fallback validation and rewriting.
//!
//! A run walks every declaration of a [`Stylesheet`]. When a declaration
//! starts with a reference to a known custom property whose fallback is not
//! the canonical value, a [`Correction`] is recorded and the value is
//! rewritten to `var(<name>, <canonical value>)`. After the last
//! declaration the corrections are reported, the stylesheet is optionally
//! written back, and the completion callback fires exactly once.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::css::{DeclarationMut, StyleVisitor, Stylesheet};
use crate::error::{Error, Result};
use crate::extract::extract;
use crate::persist::{FsPersist, Persist};
use crate::properties::PropertyTable;

/// Completion callback: persistence error (if any) and the corrections.
pub type Callback = Box<dyn FnMut(Option<&Error>, &[Correction])>;

/// A fallback that did not match its canonical value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    /// Source file, `None` for in-memory input.
    pub path: Option<PathBuf>,
    /// 1-based line of the declaration.
    pub line: u32,
    pub key: String,
    pub current: String,
    pub expected: String,
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}", path.display(), self.line)?,
            None => write!(f, "<input>:{}", self.line)?,
        }
        write!(f, ": {}: {} -> {}", self.key, self.current, self.expected)
    }
}

/// Validator configuration.
pub struct Options {
    /// Canonical values. Required.
    pub properties: Option<PropertyTable>,
    /// Write corrected stylesheets back to their source path.
    pub write: bool,
    pub callback: Callback,
}

impl Options {
    pub fn new(properties: PropertyTable) -> Self {
        Self {
            properties: Some(properties),
            ..Self::default()
        }
    }

    pub fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    pub fn callback(mut self, callback: impl FnMut(Option<&Error>, &[Correction]) + 'static) -> Self {
        self.callback = Box::new(callback);
        self
    }
}

fn noop(_: Option<&Error>, _: &[Correction]) {}

impl Default for Options {
    fn default() -> Self {
        Self {
            properties: None,
            write: false,
            callback: Box::new(noop),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("properties", &self.properties)
            .field("write", &self.write)
            .finish_non_exhaustive()
    }
}

/// Outcome of one validation run.
#[derive(Debug)]
pub struct RunResult {
    /// Stylesheet text, with corrections applied.
    pub css: String,
    /// Corrections in source order.
    pub corrections: Vec<Correction>,
    /// Set when writing the corrected stylesheet failed.
    pub persist_error: Option<Error>,
}

impl RunResult {
    pub fn is_clean(&self) -> bool {
        self.corrections.is_empty()
    }
}

/// Validates custom property fallbacks against a [`PropertyTable`].
pub struct Validator<P = FsPersist> {
    properties: PropertyTable,
    write: bool,
    callback: Callback,
    persist: P,
}

impl Validator<FsPersist> {
    /// Create a validator that writes to the filesystem.
    ///
    /// Fails with [`Error::MissingProperties`] when no (or an empty)
    /// property table is configured.
    pub fn new(options: Options) -> Result<Self> {
        Self::with_persist(options, FsPersist)
    }
}

impl<P: Persist> Validator<P> {
    pub fn with_persist(options: Options, persist: P) -> Result<Self> {
        let properties = match options.properties {
            Some(properties) if !properties.is_empty() => properties,
            _ => return Err(Error::MissingProperties),
        };

        Ok(Self {
            properties,
            write: options.write,
            callback: options.callback,
            persist,
        })
    }

    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    /// Parse and validate a stylesheet.
    pub fn process(&mut self, css: &str, path: Option<PathBuf>) -> RunResult {
        let mut sheet = Stylesheet::parse(css, path);
        self.run(&mut sheet)
    }

    /// Validate a parsed stylesheet, rewriting wrong fallbacks in place.
    pub fn run(&mut self, sheet: &mut Stylesheet) -> RunResult {
        let mut scanner = Scanner {
            properties: &self.properties,
            corrections: Vec::new(),
            css: String::new(),
        };
        sheet.walk(&mut scanner);

        let Scanner {
            corrections, css, ..
        } = scanner;
        self.finalize(sheet.path(), css, corrections)
    }

    fn finalize(&mut self, path: Option<&Path>, css: String, corrections: Vec<Correction>) -> RunResult {
        let persist_error = if self.write && !corrections.is_empty() {
            match self.persist_css(path, &css) {
                Ok(()) => None,
                Err(err) => {
                    warn!(%err, "failed to write corrected stylesheet");
                    Some(err)
                }
            }
        } else {
            None
        };

        (self.callback)(persist_error.as_ref(), &corrections);

        RunResult {
            css,
            corrections,
            persist_error,
        }
    }

    fn persist_css(&self, path: Option<&Path>, css: &str) -> Result<()> {
        let path = path.ok_or(Error::MissingPath)?;
        self.persist.write(path, css)?;
        info!(path = %path.display(), "wrote corrected stylesheet");
        Ok(())
    }
}

impl<P> fmt::Debug for Validator<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("properties", &format!("{} properties", self.properties.len()))
            .field("write", &self.write)
            .finish_non_exhaustive()
    }
}

/// Per-declaration pass of a run.
struct Scanner<'a> {
    properties: &'a PropertyTable,
    corrections: Vec<Correction>,
    css: String,
}

impl StyleVisitor for Scanner<'_> {
    fn visit_declaration(&mut self, declaration: &mut DeclarationMut<'_>) {
        let Some(reference) = extract(declaration.value()) else {
            return;
        };

        let properties = self.properties;
        // An empty canonical value leaves the property unmanaged
        let Some(expected) = properties.get(&reference.key).filter(|v| !v.is_empty()) else {
            debug!(key = %reference.key, line = declaration.line(), "unknown custom property");
            return;
        };

        // Nothing to rewrite without a fallback
        let Some(current) = reference.value else {
            return;
        };
        if current == expected {
            return;
        }

        info!(
            key = %reference.key,
            line = declaration.line(),
            current = %current,
            expected,
            "wrong fallback value"
        );

        declaration.replace_value(format!("var({}, {})", reference.key, expected));
        self.corrections.push(Correction {
            path: declaration.path().map(Path::to_path_buf),
            line: declaration.line(),
            key: reference.key,
            current,
            expected: expected.to_string(),
        });
    }

    fn visit_end(&mut self, sheet: &Stylesheet) {
        self.css = sheet.to_css();
    }
}
