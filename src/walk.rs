//! Comparing two directory trees.
//!
//! Entries are visited depth-first in the sorted union of the names found on
//! either side. Every compared file produces a header followed by its rows,
//! so the output of a walk is itself a patch for the first tree.

use crate::Options;
use crate::fs::{DirEntry, EntryKind, FileSystem, LocalFs};
use crate::header::{Header, KindMismatch};
use crate::render::render;
use error_set::error_set;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

error_set! {
    /// Errors from reading the inputs of a comparison
    InputError := {
        #[display("Failed to read {path}: {message}")]
        Unreadable { path: String, message: String },
        #[display("Neither {path1} nor {path2} exists")]
        Missing { path1: String, path2: String },
    }
}

/// Compare two files or directory trees on the local disk.
pub fn diff_paths(path1: &Path, path2: &Path, opts: &Options) -> Result<String, InputError> {
    diff_paths_with(&LocalFs, path1, path2, opts)
}

/// [`diff_paths`] against any [`FileSystem`].
///
/// Either root may be missing, in which case its side of every file has no
/// lines. Line selections and limits in `opts` do not apply here.
pub fn diff_paths_with<F: FileSystem>(
    fs: &F,
    path1: &Path,
    path2: &Path,
    opts: &Options,
) -> Result<String, InputError> {
    let walker = Walker {
        fs,
        root1: path1,
        root2: path2,
        opts,
    };
    let kind1 = walker.kind(path1)?;
    let kind2 = walker.kind(path2)?;
    if kind1.is_none() && kind2.is_none() {
        return Err(InputError::Missing {
            path1: path1.display().to_string(),
            path2: path2.display().to_string(),
        });
    }

    let mut out = String::new();
    walker.visit(Path::new(""), kind1, kind2, &mut out)?;
    Ok(out)
}

struct Walker<'a, F> {
    fs: &'a F,
    root1: &'a Path,
    root2: &'a Path,
    opts: &'a Options,
}

impl<F: FileSystem> Walker<'_, F> {
    fn visit(
        &self,
        rel: &Path,
        kind1: Option<EntryKind>,
        kind2: Option<EntryKind>,
        out: &mut String,
    ) -> Result<(), InputError> {
        let path1 = under(self.root1, rel);
        let path2 = under(self.root2, rel);

        match (kind1, kind2) {
            (Some(EntryKind::Dir), Some(EntryKind::File))
            | (Some(EntryKind::File), Some(EntryKind::Dir)) => {
                debug!(path = %rel.display(), "file/directory mismatch");
                let notice = KindMismatch {
                    old: path1.display().to_string(),
                    new: path2.display().to_string(),
                    old_is_dir: kind1 == Some(EntryKind::Dir),
                };
                out.push_str(&notice.to_string());
                out.push('\n');
            }
            (Some(EntryKind::Dir), _) | (_, Some(EntryKind::Dir)) => {
                let mut children: BTreeMap<OsString, (Option<EntryKind>, Option<EntryKind>)> =
                    BTreeMap::new();
                if kind1.is_some() {
                    for entry in self.list(&path1)? {
                        children.entry(entry.name).or_default().0 = Some(entry.kind);
                    }
                }
                if kind2.is_some() {
                    for entry in self.list(&path2)? {
                        children.entry(entry.name).or_default().1 = Some(entry.kind);
                    }
                }
                for (name, (child1, child2)) in children {
                    self.visit(&rel.join(name), child1, child2, out)?;
                }
            }
            _ => self.compare_file(rel, &path1, &path2, kind1.is_some(), kind2.is_some(), out)?,
        }
        Ok(())
    }

    fn compare_file(
        &self,
        rel: &Path,
        path1: &Path,
        path2: &Path,
        exists1: bool,
        exists2: bool,
        out: &mut String,
    ) -> Result<(), InputError> {
        if !self.opts.accepts(rel) {
            debug!(path = %rel.display(), "filtered out");
            return Ok(());
        }
        debug!(path = %rel.display(), "comparing");

        let text1 = if exists1 { Some(self.read(path1)?) } else { None };
        let text2 = if exists2 { Some(self.read(path2)?) } else { None };
        let lines1 = text1.as_deref().map(split_lines).unwrap_or_default();
        let lines2 = text2.as_deref().map(split_lines).unwrap_or_default();

        let header = Header::new(path1.display().to_string(), path2.display().to_string());
        out.push_str(&header.to_string());
        out.push('\n');
        out.push_str(&render(
            &self.opts.align(&lines1, &lines2),
            self.opts.color(),
        ));
        Ok(())
    }

    fn kind(&self, path: &Path) -> Result<Option<EntryKind>, InputError> {
        self.fs.kind(path).map_err(|e| unreadable(path, e))
    }

    fn list(&self, path: &Path) -> Result<Vec<DirEntry>, InputError> {
        self.fs.list_dir(path).map_err(|e| unreadable(path, e))
    }

    fn read(&self, path: &Path) -> Result<String, InputError> {
        self.fs.read_to_string(path).map_err(|e| unreadable(path, e))
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

/// `root` itself for the empty relative path, so a file root keeps its
/// exact spelling.
fn under(root: &Path, rel: &Path) -> PathBuf {
    if rel.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}

pub(crate) fn unreadable(path: &Path, err: std::io::Error) -> InputError {
    InputError::Unreadable {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::apply;
    use proptest::prelude::*;
    use similar_asserts::assert_eq;
    use std::fs;
    use std::path::Component;
    use tempfile::TempDir;

    struct Trees {
        _tmp: TempDir,
        a: PathBuf,
        b: PathBuf,
    }

    impl Trees {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let a = tmp.path().join("a");
            let b = tmp.path().join("b");
            fs::create_dir(&a).unwrap();
            fs::create_dir(&b).unwrap();
            Self { _tmp: tmp, a, b }
        }

        fn file(&self, side: &Path, rel: &str, content: &str) {
            let path = side.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }

        fn header(&self, rel: &str) -> String {
            Header::new(
                self.a.join(rel).display().to_string(),
                self.b.join(rel).display().to_string(),
            )
            .to_string()
        }
    }

    #[test]
    fn one_changed_file() {
        let t = Trees::new();
        t.file(&t.a, "f.txt", "content2\n");
        t.file(&t.b, "f.txt", "content2 modified\n");

        let out = diff_paths(&t.a, &t.b, &Options::default()).unwrap();

        assert_eq!(
            out,
            format!(
                "{}\ncontent2 q  content2 modified\n         == \n",
                t.header("f.txt")
            )
        );
    }

    #[test]
    fn one_sided_files() {
        let t = Trees::new();
        t.file(&t.a, "old.txt", "gone");
        t.file(&t.b, "new.txt", "new file\n");

        let out = diff_paths(&t.a, &t.b, &Options::default()).unwrap();

        assert_eq!(
            out,
            format!(
                "{}\n q  new file\n == \n{}\ngone 1d \n",
                t.header("new.txt"),
                t.header("old.txt")
            )
        );
    }

    #[test]
    fn entries_are_sorted_depth_first() {
        let t = Trees::new();
        t.file(&t.a, "b.txt", "x");
        t.file(&t.a, "a/inner.txt", "x");
        t.file(&t.b, "c.txt", "x");
        t.file(&t.b, "a/deeper/z.txt", "x");

        let out = diff_paths(&t.a, &t.b, &Options::default()).unwrap();
        let headers: Vec<String> = out
            .lines()
            .filter(|l| l.starts_with("Diff "))
            .map(str::to_string)
            .collect();

        assert_eq!(
            headers,
            vec![
                t.header("a/deeper/z.txt"),
                t.header("a/inner.txt"),
                t.header("b.txt"),
                t.header("c.txt"),
            ]
        );
    }

    #[test]
    fn kind_mismatch_does_not_recurse() {
        let t = Trees::new();
        t.file(&t.a, "x/inside.txt", "content");
        t.file(&t.b, "x", "a file");

        let out = diff_paths(&t.a, &t.b, &Options::default()).unwrap();

        let notice = KindMismatch {
            old: t.a.join("x").display().to_string(),
            new: t.b.join("x").display().to_string(),
            old_is_dir: true,
        };
        assert_eq!(out, format!("{notice}\n"));
    }

    #[test]
    fn filter_skips_files_silently() {
        let t = Trees::new();
        t.file(&t.a, "keep.rs", "a");
        t.file(&t.a, "skip.md", "a");
        t.file(&t.b, "keep.rs", "b");
        t.file(&t.b, "skip.md", "b");

        let opts = Options::default().with_filter(|rel| rel.extension().is_some_and(|e| e == "rs"));
        let out = diff_paths(&t.a, &t.b, &opts).unwrap();

        assert_eq!(out, format!("{}\na 1d b\n", t.header("keep.rs")));
    }

    #[test]
    fn filter_receives_relative_paths() {
        let t = Trees::new();
        t.file(&t.a, "sub/f.txt", "a");
        t.file(&t.b, "sub/f.txt", "a");

        let opts = Options::default().with_filter(|rel| rel == Path::new("sub/f.txt"));
        let out = diff_paths(&t.a, &t.b, &opts).unwrap();

        assert!(out.starts_with(&t.header("sub/f.txt")), "{out}");
    }

    #[test]
    fn root_files_are_never_filtered() {
        let t = Trees::new();
        t.file(&t.a, "f", "abc");
        t.file(&t.b, "g", "axc");

        let opts = Options::default().with_filter(|_| false);
        let out = diff_paths(&t.a.join("f"), &t.b.join("g"), &opts).unwrap();

        let header = Header::new(
            t.a.join("f").display().to_string(),
            t.b.join("g").display().to_string(),
        );
        assert_eq!(out, format!("{header}\nabc 1d axc\n"));
    }

    #[test]
    fn missing_roots() {
        let t = Trees::new();
        let err = diff_paths(&t.a.join("nope"), &t.b.join("nope"), &Options::default()).unwrap_err();
        assert!(matches!(err, InputError::Missing { .. }));
    }

    #[test]
    fn one_missing_root_is_all_inserts() {
        let t = Trees::new();
        t.file(&t.b, "f", "x");

        let out = diff_paths(&t.a.join("absent"), &t.b, &Options::default()).unwrap();

        let header = Header::new(
            t.a.join("absent/f").display().to_string(),
            t.b.join("f").display().to_string(),
        );
        assert_eq!(out, format!("{header}\n 1d x\n"));
    }

    #[test]
    fn identical_trees_produce_equal_rows() {
        let t = Trees::new();
        t.file(&t.a, "f", "same\n");
        t.file(&t.b, "f", "same\n");

        let out = diff_paths(&t.a, &t.b, &Options::default()).unwrap();

        assert_eq!(out, format!("{}\nsame == same\n     == \n", t.header("f")));
    }

    /// Where `path` lands when a patch naming it is applied below `root`
    fn mirrored(root: &Path, path: &Path) -> PathBuf {
        root.join(
            path.components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect::<PathBuf>(),
        )
    }

    const NAMES: [&str; 3] = ["f", "g", "sub/h"];

    proptest! {
        #[test]
        fn tree_patch_applied_to_a_copy_gives_the_second_tree(
            before in prop::collection::vec(prop::option::of("[abc \n]{0,20}"), 3),
            after in prop::collection::vec(prop::option::of("[abc \n]{0,20}"), 3),
        ) {
            let t = Trees::new();
            let copy = t._tmp.path().join("copy");
            let target = mirrored(&copy, &t.a);
            for (name, (old, new)) in NAMES.iter().zip(before.iter().zip(&after)) {
                if let Some(old) = old {
                    t.file(&t.a, name, old);
                    t.file(&target, name, old);
                }
                if let Some(new) = new {
                    t.file(&t.b, name, new);
                }
            }

            let patch = diff_paths(&t.a, &t.b, &Options::default()).unwrap();
            apply(&patch, &copy, None).unwrap();

            for (name, (old, new)) in NAMES.iter().zip(before.iter().zip(&after)) {
                let patched = fs::read_to_string(target.join(name)).ok();
                prop_assert_eq!(&patched, new, "{}\n{}", name, patch);
                let original = fs::read_to_string(t.a.join(name)).ok();
                prop_assert_eq!(&original, old);
            }
        }
    }
}
