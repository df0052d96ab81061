use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use log::debug;
use rcred_reduce::{ModelKind, ReduceOptions};
use rcred_sim::DeckParams;
use serde::Deserialize;

/// Looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "rcred.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RcredConfig {
    pub deck: DeckParams,
    pub reduce: ReduceConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReduceConfig {
    pub model: ModelArg,
    /// Try the exact-topology detector before fitting.
    pub exact: bool,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            model: ModelArg::DoublePi,
            exact: true,
        }
    }
}

impl ReduceConfig {
    /// Pipeline options, with command-line flags taking precedence.
    pub fn options(&self, model: Option<ModelArg>, no_exact: bool) -> ReduceOptions {
        ReduceOptions {
            kind: model.unwrap_or(self.model).into(),
            try_exact: self.exact && !no_exact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelArg {
    Pi,
    DoublePi,
}

impl From<ModelArg> for ModelKind {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Pi => ModelKind::Pi,
            ModelArg::DoublePi => ModelKind::DoublePi,
        }
    }
}

/// Load `path`, or `rcred.toml` from the working directory if it exists.
pub fn load(path: Option<&Path>) -> Result<RcredConfig> {
    let path = match path {
        Some(path) => path,
        None if Path::new(CONFIG_FILE).is_file() => Path::new(CONFIG_FILE),
        None => return Ok(RcredConfig::default()),
    };
    debug!("Loading config from {}", path.display());

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse(&contents).with_context(|| format!("Failed to parse config {}", path.display()))
}

fn parse(contents: &str) -> Result<RcredConfig> {
    Ok(toml::from_str(contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse("").unwrap(), RcredConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config = parse(
            r#"
[deck]
vdd = 1.8
tstop = "5n"

[reduce]
model = "pi"
"#,
        )
        .unwrap();
        assert_eq!(config.deck.vdd, 1.8);
        assert_eq!(config.deck.tstop, "5n");
        assert_eq!(config.deck.rdrv, 100.0);
        assert_eq!(config.reduce.model, ModelArg::Pi);
        assert!(config.reduce.exact);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(parse("[deck]\nvoltage = 3\n").is_err());
        assert!(parse("[solver]\n").is_err());
        assert!(parse("[reduce]\nmodel = \"triple-pi\"\n").is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let config = ReduceConfig {
            model: ModelArg::Pi,
            exact: true,
        };
        let options = config.options(Some(ModelArg::DoublePi), true);
        assert_eq!(options.kind, ModelKind::DoublePi);
        assert!(!options.try_exact);

        let options = config.options(None, false);
        assert_eq!(options.kind, ModelKind::Pi);
        assert!(options.try_exact);
    }

    #[test]
    fn test_missing_explicit_config() {
        let err = load(Some(Path::new("/definitely/not/rcred.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
