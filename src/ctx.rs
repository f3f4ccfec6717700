//! Startup context: where the CLI looks for its config, and what it found.

use anyhow::{Context, Result, bail};
use oxidize_env::UnsetPolicy;
use std::{collections::HashMap, fs, io, path::PathBuf};

/// Paths resolved once at startup.
#[derive(Clone, Debug)]
pub struct Ctx {
    pub config_file: PathBuf,
}

impl Ctx {
    /// Resolve `$XDG_CONFIG_HOME/oxidize-env`, falling back to `~/.config`.
    pub fn new() -> Result<Self> {
        let base = match std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|s| !s.is_empty())
        {
            Some(xdg) => PathBuf::from(xdg),
            None => {
                let home = std::env::var("HOME")
                    .context("neither $XDG_CONFIG_HOME nor $HOME is set")?;
                PathBuf::from(home).join(".config")
            }
        };

        Ok(Self {
            config_file: base.join("oxidize-env").join("config.toml"),
        })
    }
}

/// Contents of `config.toml`.
///
/// ```toml
/// unset = "keep"      # or "empty"
///
/// [vars]
/// APP_ENV = "dev"
/// [vars.db]
/// port = 5432         # seeded as db_port
/// ```
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub unset: Option<UnsetPolicy>,
    pub vars: HashMap<String, String>,
}

impl Config {
    /// Load the config file. A missing file yields the defaults.
    pub fn load(ctx: &Ctx) -> Result<Self> {
        let path = &ctx.config_file;
        let src = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
        };

        let table: toml::Value =
            toml::from_str(&src).with_context(|| format!("parse {}", path.display()))?;

        let unset = match table.get("unset") {
            None => None,
            Some(toml::Value::String(s)) => Some(parse_policy(s)?),
            Some(other) => bail!("`unset` must be a string, got {}", other.type_str()),
        };

        let mut vars = HashMap::new();
        if let Some(v) = table.get("vars") {
            crate::vars::flatten("", v, &mut vars);
        }

        Ok(Self { unset, vars })
    }
}

fn parse_policy(s: &str) -> Result<UnsetPolicy> {
    match s {
        "empty" => Ok(UnsetPolicy::Empty),
        "keep" => Ok(UnsetPolicy::Keep),
        _ => bail!("unknown `unset` policy '{s}' (expected \"empty\" or \"keep\")"),
    }
}
