//! `oxidize-env` — expand `$VAR` / `${VAR:-default}` placeholders in files.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use oxidize_env::{Expander, Overlay, UnsetPolicy};
use std::{
    io::{self, Write},
    path::PathBuf,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod ctx;
mod render;
mod transaction;
mod vars;

use ctx::{Config, Ctx};

#[derive(Parser)]
#[command(name = "oxidize-env", version, about = "Shell-style placeholder expansion")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,

    /// Seed variables from a TOML file (nested tables become `parent_child`)
    #[arg(long, global = true, value_name = "FILE")]
    vars: Option<PathBuf>,

    /// Set a variable; may be repeated
    #[arg(short, long = "set", global = true, value_name = "NAME=VALUE",
          value_parser = vars::parse_assignment)]
    set: Vec<(String, String)>,

    /// Do not inherit the process environment
    #[arg(long, global = true)]
    isolated: bool,

    /// Leave unset `$VAR` / `${VAR}` placeholders as written
    #[arg(long, global = true)]
    keep_unset: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Cmd {
    /// Expand files (stdin if none) and concatenate the results
    Expand {
        inputs: Vec<PathBuf>,
        /// Write atomically to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Expand every `*.tpl` under a directory into an output directory
    Render {
        templates_dir: PathBuf,
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Ctx::new().context("initialise context")?;
    let config = Config::load(&ctx).context("load config")?;

    // Later sources win: config file, then --vars, then --set.
    let mut store = if cli.isolated {
        Overlay::isolated()
    } else {
        Overlay::inherited()
    };
    store.extend(config.vars);
    if let Some(path) = &cli.vars {
        store.extend(vars::load(path).context("load --vars")?);
    }
    store.extend(cli.set);

    let policy = if cli.keep_unset {
        UnsetPolicy::Keep
    } else {
        config.unset.unwrap_or_default()
    };
    let expander = Expander::new().unset_policy(policy);

    match cli.cmd {
        Cmd::Expand { inputs, output } => {
            let rendered = render::expand_inputs(&inputs, &expander, &mut store)?;
            match output {
                Some(path) => transaction::write_atomic(&path, &rendered)
                    .with_context(|| format!("write {}", path.display())),
                None => {
                    let mut stdout = io::stdout().lock();
                    stdout
                        .write_all(rendered.as_bytes())
                        .and_then(|()| stdout.flush())
                        .context("write stdout")
                }
            }
        }

        Cmd::Render {
            templates_dir,
            out_dir,
        } => {
            let count = render::render_tree(&templates_dir, &out_dir, &expander, &mut store)
                .context("render templates")?;
            info!(count, out = %out_dir.display(), "rendered templates");
            Ok(())
        }
    }
}

/// `RUST_LOG` wins unless `--verbose` is given; default is warnings only.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}
