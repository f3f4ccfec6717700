//! Expanding input files and template trees.

use crate::transaction::Transaction;
use anyhow::{Context, Result, bail};
use oxidize_env::{Expander, VarStore};
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Expand each input in order and concatenate the results.
///
/// No inputs, or `-`, means stdin. Variables assigned by one input are
/// visible to the next.
pub fn expand_inputs<S: VarStore>(
    inputs: &[PathBuf],
    expander: &Expander,
    store: &mut S,
) -> Result<String> {
    let stdin = [PathBuf::from("-")];
    let inputs = if inputs.is_empty() { &stdin[..] } else { inputs };

    let mut out = String::new();
    for input in inputs {
        let src = read_input(input)?;
        let expanded = expander
            .expand(&src, &mut *store)
            .with_context(|| format!("expand {}", input.display()))?;
        out.push_str(&expanded);
    }
    Ok(out)
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Render every `*.tpl` under `templates_dir` into `out_dir`, atomically.
///
/// Templates are processed in path order so that `:=` assignments are
/// deterministic. Returns the number of files rendered.
pub fn render_tree<S: VarStore>(
    templates_dir: &Path,
    out_dir: &Path,
    expander: &Expander,
    store: &mut S,
) -> Result<usize> {
    if !templates_dir.is_dir() {
        bail!("templates directory not found: {}", templates_dir.display());
    }

    let txn = Transaction::begin(out_dir).context("begin transaction")?;

    let mut count = 0;
    for tpl in templates_in(templates_dir) {
        let rel = tpl.strip_prefix(templates_dir)?;
        render_one(&tpl, rel, expander, &mut *store, txn.stage())?;
        count += 1;
    }

    txn.commit().context("commit transaction")?;
    Ok(count)
}

/// Render a single template to `stage / rel` (minus `.tpl` extension).
fn render_one<S: VarStore>(
    tpl_path: &Path,
    rel: &Path,
    expander: &Expander,
    store: &mut S,
    stage: &Path,
) -> Result<()> {
    let src = fs::read_to_string(tpl_path)
        .with_context(|| format!("read template {}", tpl_path.display()))?;

    let rendered = expander
        .expand(&src, store)
        .with_context(|| format!("expand {}", tpl_path.display()))?;

    let out_path = stage.join(rel.with_extension(""));
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output subdir {}", parent.display()))?;
    }

    debug!(template = %rel.display(), "rendered");
    fs::write(&out_path, rendered).with_context(|| format!("write {}", out_path.display()))
}

/// Walk `dir` in sorted order and yield paths of all `*.tpl` files.
fn templates_in(dir: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|e| {
            e.file_type().is_file() && e.path().extension().and_then(|x| x.to_str()) == Some("tpl")
        })
        .map(|e| e.into_path())
}
