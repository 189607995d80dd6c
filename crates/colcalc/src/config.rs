//! Engine configuration files
//!
//! An engine can be described by a JSON document listing named constants
//! and the formulas to apply, in order:
//!
//! ```json
//! {
//!   "version": 1,
//!   "constants": { "vat": 0.2 },
//!   "columns": {
//!     "tax": "@mul(price, @vat)",
//!     "gross": { "formula": "@add(price, tax)", "enabled": true }
//!   }
//! }
//! ```
//!
//! Column order in the document is the order formulas are applied in.
//! Exported configurations also carry a `functions` section with the
//! registry documentation; it is informational and ignored on import.

use colcalc_core::{OrderedMap, Value};
use colcalc_formula::FormulaEngine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Configuration format version written by this crate
pub const CONFIG_VERSION: u32 = 1;

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or saving a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid JSON or unexpected document shape
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Document written by an incompatible version
    #[error("Unsupported configuration version {0} (expected {})", CONFIG_VERSION)]
    UnsupportedVersion(u32),
}

/// One entry of the `columns` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    /// Just the formula text
    Formula(String),
    /// Formula with an on/off switch
    Detailed {
        formula: String,
        #[serde(default = "enabled_by_default")]
        enabled: bool,
    },
}

fn enabled_by_default() -> bool {
    true
}

impl ColumnSpec {
    /// The formula text
    pub fn formula(&self) -> &str {
        match self {
            ColumnSpec::Formula(formula) | ColumnSpec::Detailed { formula, .. } => formula,
        }
    }

    /// Whether the formula should be applied
    ///
    /// Disabled entries and blank formulas are skipped.
    pub fn is_enabled(&self) -> bool {
        let enabled = match self {
            ColumnSpec::Formula(_) => true,
            ColumnSpec::Detailed { enabled, .. } => *enabled,
        };
        enabled && !self.formula().trim().is_empty()
    }
}

/// The `columns` section: target column → formula, in document order
pub type ColumnSpecs = OrderedMap<ColumnSpec>;

/// A serialisable description of a formula engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Format version
    #[serde(default = "current_version")]
    pub version: u32,
    /// Named constants, usable as `@name`
    #[serde(default)]
    pub constants: BTreeMap<String, Value>,
    /// Formulas, in application order
    #[serde(default)]
    pub columns: ColumnSpecs,
    /// Registered functions and their documentation (export only)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub functions: BTreeMap<String, Option<String>>,
}

fn current_version() -> u32 {
    CONFIG_VERSION
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            constants: BTreeMap::new(),
            columns: ColumnSpecs::new(),
            functions: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(config.version));
        }
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        log::debug!("loading engine configuration from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialise to pretty-printed JSON
    pub fn to_json_string(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save to a file as pretty-printed JSON
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Build an engine with the built-in functions, these constants and
    /// the enabled formulas
    pub fn build_engine(&self) -> FormulaEngine {
        let mut engine = FormulaEngine::new();

        for (name, value) in &self.constants {
            engine.add_constant(name.as_str(), value.clone());
        }

        for (target, spec) in self.columns.iter() {
            if spec.is_enabled() {
                engine.add_formula(target, spec.formula());
            } else {
                log::debug!("skipping disabled column '{}'", target);
            }
        }

        engine
    }

    /// Describe an existing engine
    pub fn from_engine(engine: &FormulaEngine) -> Self {
        let mut columns = ColumnSpecs::new();
        for formula in engine.formulas() {
            columns.insert(
                formula.target.as_str(),
                ColumnSpec::Formula(formula.expression.clone()),
            );
        }

        Self {
            version: CONFIG_VERSION,
            constants: engine.constants().clone(),
            columns,
            functions: engine.registry().to_dict(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONFIG: &str = r#"{
        "version": 1,
        "constants": { "vat": 0.2, "label": "net" },
        "columns": {
            "zeta": "@mul(price, @vat)",
            "alpha": { "formula": "@add(price, zeta)" },
            "off": { "formula": "@neg(price)", "enabled": false },
            "blank": ""
        }
    }"#;

    #[test]
    fn test_parse_keeps_column_order() {
        let config = EngineConfig::from_json_str(CONFIG).unwrap();
        let names: Vec<&str> = config.columns.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "off", "blank"]);
        assert_eq!(config.constants["label"], Value::text("net"));
        assert_eq!(
            config.columns.get("alpha"),
            Some(&ColumnSpec::Detailed {
                formula: "@add(price, zeta)".into(),
                enabled: true,
            })
        );
    }

    #[test]
    fn test_serialize_keeps_column_order() {
        let config = EngineConfig::from_json_str(CONFIG).unwrap();
        let json = config.to_json_string().unwrap();

        let zeta = json.find("\"zeta\"").unwrap();
        let alpha = json.find("\"alpha\"").unwrap();
        let off = json.find("\"off\"").unwrap();
        assert!(zeta < alpha && alpha < off);
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_build_engine_skips_disabled() {
        let engine = EngineConfig::from_json_str(CONFIG).unwrap().build_engine();
        let targets: Vec<&str> = engine.formulas().targets().collect();
        assert_eq!(targets, vec!["zeta", "alpha"]);
        assert!(engine.registry().contains("vat"));
    }

    #[test]
    fn test_unsupported_version() {
        let err = EngineConfig::from_json_str(r#"{"version": 2}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_invalid_json() {
        let err = EngineConfig::from_json_str(r#"{"columns": ["a"]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_export_round_trip() {
        let mut engine = FormulaEngine::new();
        engine
            .add_constant("rate", 3)
            .add_formula("b", "@mul(a, @rate)")
            .add_formula("a2", "@add(b, 1)");

        let json = EngineConfig::from_engine(&engine).to_json_string().unwrap();
        let config = EngineConfig::from_json_str(&json).unwrap();

        assert!(config.functions.contains_key("add"));
        assert_eq!(config.constants["rate"], Value::Number(3.0));

        let rebuilt = config.build_engine();
        assert_eq!(rebuilt.formulas(), engine.formulas());
    }
}
