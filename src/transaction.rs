//! Atomic publish: stage next to the target, then rename over it.
use anyhow::{Context, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::{Builder, NamedTempFile, TempDir};

/// A staging directory that replaces `target` on commit.
///
/// Dropping an uncommitted transaction deletes the stage and leaves
/// `target` untouched.
pub struct Transaction {
    stage: TempDir,
    target: PathBuf,
}

impl Transaction {
    /// Create a fresh staging directory beside `target`.
    pub fn begin(target: &Path) -> Result<Self> {
        let parent = parent_of(target);
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent dir {}", parent.display()))?;

        let stage = Builder::new()
            .prefix(".stage.")
            .tempdir_in(parent)
            .context("create staging dir")?;

        Ok(Self {
            stage,
            target: target.to_path_buf(),
        })
    }

    /// Path callers write rendered files into.
    #[inline]
    pub fn stage(&self) -> &Path {
        self.stage.path()
    }

    /// Replace `target` with the staged tree.
    pub fn commit(self) -> Result<()> {
        // From here on the stage must outlive any error, or a half-removed
        // target would leave nothing behind.
        let stage_path = self.stage.keep();

        if fs::symlink_metadata(&self.target).is_ok() {
            remove_any(&self.target).context("remove previous output")?;
        }

        // Same parent directory, so this is a same-filesystem rename.
        fs::rename(&stage_path, &self.target).with_context(|| {
            format!(
                "rename {} -> {}",
                stage_path.display(),
                self.target.display()
            )
        })
    }
}

/// Write `contents` to `path` via a temp file in the same directory.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = parent_of(path);
    fs::create_dir_all(parent)
        .with_context(|| format!("create parent dir {}", parent.display()))?;

    let mut tmp = NamedTempFile::new_in(parent).context("create temp file")?;
    tmp.write_all(contents.as_bytes())
        .context("write temp file")?;
    tmp.persist(path)
        .with_context(|| format!("persist {}", path.display()))?;
    Ok(())
}

/// `Path::parent` returns `""` for bare file names.
fn parent_of(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Clear whatever sits at the output path: a previous tree, a file, or a
/// symlink (which is removed, not followed).
fn remove_any(p: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(p).with_context(|| format!("stat {}", p.display()))?;

    if meta.is_dir() {
        fs::remove_dir_all(p)
    } else {
        fs::remove_file(p)
    }
    .with_context(|| format!("remove {}", p.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_replaces_existing_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("stale.txt"), "old").unwrap();

        let txn = Transaction::begin(&out).unwrap();
        fs::write(txn.stage().join("fresh.txt"), "new").unwrap();
        txn.commit().unwrap();

        assert!(!out.join("stale.txt").exists());
        assert_eq!(fs::read_to_string(out.join("fresh.txt")).unwrap(), "new");
    }

    #[test]
    fn dropped_transaction_leaves_target_alone() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("keep.txt"), "old").unwrap();

        let txn = Transaction::begin(&out).unwrap();
        fs::write(txn.stage().join("fresh.txt"), "new").unwrap();
        drop(txn);

        assert_eq!(fs::read_to_string(out.join("keep.txt")).unwrap(), "old");
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn write_atomic_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/file.txt");
        write_atomic(&path, "one").unwrap();
        write_atomic(&path, "two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
    }
}
