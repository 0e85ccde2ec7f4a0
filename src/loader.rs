use std::fs;
use std::io;

/// Retrieves configuration documents and reference bitmaps by name.
///
/// A loader is supplied to [Matcher](crate::Matcher) at construction, so
/// tests and embedded deployments can serve files from memory instead of
/// the filesystem.
pub trait FileLoader {
    /// Return the raw bytes stored under `name`.
    fn load(&self, name: &str) -> io::Result<Vec<u8>>;
}

/// The default [FileLoader]: reads files from the filesystem.
#[derive(Debug, Default)]
pub struct DiskLoader;

impl FileLoader for DiskLoader {
    fn load(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(name)
    }
}
