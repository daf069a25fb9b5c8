//! The file access the walker and the applier depend on.

use std::ffi::OsString;
use std::io;
use std::path::Path;

/// Whether a path names a regular file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// A directory entry: its name and kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: OsString,
    pub kind: EntryKind,
}

/// Reads and writes text content.
pub trait FileSystem {
    /// Kind of `path`, or `None` when nothing exists there.
    fn kind(&self, path: &Path) -> io::Result<Option<EntryKind>>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Entries directly inside the directory `path`, in no particular order.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Replace the content of the file at `path`.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by the local disk. Symlinks are followed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn kind(&self, path: &Path) -> io::Result<Option<EntryKind>> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Ok(Some(EntryKind::Dir)),
            Ok(_) => Ok(Some(EntryKind::File)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        std::fs::read_dir(path)?
            .map(|entry| {
                let entry = entry?;
                // A dangling symlink still shows up, as a file that fails to read
                let kind = match std::fs::metadata(entry.path()) {
                    Ok(meta) if meta.is_dir() => EntryKind::Dir,
                    _ => EntryKind::File,
                };
                Ok(DirEntry {
                    name: entry.file_name(),
                    kind,
                })
            })
            .collect()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        std::fs::write(path, contents)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}
