//! Writing corrected stylesheets back to their source.

use std::io;
use std::path::Path;

/// Destination for corrected stylesheet text.
pub trait Persist {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Writes files to the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPersist;

impl Persist for FsPersist {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }
}

impl<P: Persist + ?Sized> Persist for &P {
    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        (**self).write(path, contents)
    }
}
