use std::path::{Path, PathBuf};

use metadiff_dialect_salesforce::SalesforceDialect;
use metadiff_xml::{Dialect, GenericDialect, KeyField, Layered, RuleSet, XmlCompareOptions};
use serde::{Deserialize, Serialize};

use crate::model::CompareOptions;

/// Errors raised while loading a [`CompareConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid rule for `{type_name}`: {message}")]
    InvalidRule { type_name: String, message: String },
}

/// How the comparison strategy is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeSelection {
    /// XML when either side looks like XML, lines otherwise.
    #[default]
    Auto,
    Lines,
    Xml,
}

/// Built-in identity rules to start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialectChoice {
    #[default]
    Salesforce,
    Generic,
}

/// Settings for one comparison, usually read from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    pub mode: ModeSelection,
    pub dialect: DialectChoice,
    pub lines: CompareOptions,
    pub xml: XmlCompareOptions,
    /// Extra rules consulted before the built-in dialect.
    pub rules: RuleSet,
}

impl CompareConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Reject rules that can never produce a key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (type_name, rule) in &self.rules.key_fields {
            let invalid = |message: &str| ConfigError::InvalidRule {
                type_name: type_name.clone(),
                message: message.to_string(),
            };
            match rule {
                KeyField::Single(field) if field.trim().is_empty() => {
                    return Err(invalid("key field name is empty"));
                }
                KeyField::Composite(fields) if fields.is_empty() => {
                    return Err(invalid("composite key has no fields"));
                }
                KeyField::Composite(fields) if fields.iter().any(|f| f.trim().is_empty()) => {
                    return Err(invalid("composite key has an empty field name"));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Dialect for structural comparison: configured rules over the built-in table.
    pub fn build_dialect(&self) -> Box<dyn Dialect + '_> {
        let layered = !self.rules.is_empty();
        match self.dialect {
            DialectChoice::Salesforce if layered => {
                Box::new(Layered::new(&self.rules, SalesforceDialect))
            }
            DialectChoice::Generic if layered => Box::new(Layered::new(&self.rules, GenericDialect)),
            DialectChoice::Salesforce => Box::new(SalesforceDialect),
            DialectChoice::Generic => Box::new(GenericDialect),
        }
    }
}
