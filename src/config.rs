use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::dialect::DialectId;
use crate::error::{NimbusError, Result};

/// Engine configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dialect used to translate query text
    pub dialect: DialectId,
    /// Document field holding the document identifier
    pub id_field: String,
    /// Result size used by callers that do not pass one
    pub default_size: usize,
    pub tokenizer: TokenizerConfig,
    pub parser: ParserOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dialect: DialectId::EsDsl,
            id_field: "id".to_string(),
            default_size: 10,
            tokenizer: TokenizerConfig::default(),
            parser: ParserOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON text; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| NimbusError::Config(format!("invalid engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id_field.is_empty() {
            return Err(NimbusError::Config("id_field must not be empty".to_string()));
        }
        if self.tokenizer.min_token_length > self.tokenizer.max_token_length {
            return Err(NimbusError::Config(format!(
                "min_token_length ({}) exceeds max_token_length ({})",
                self.tokenizer.min_token_length, self.tokenizer.max_token_length
            )));
        }
        Ok(())
    }
}

/// Tokenizer configuration
///
/// Defaults lowercase and split on Unicode word boundaries, without stemming
/// or stopword removal.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
    pub language: String,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: false,
            stem: false,
            min_token_length: 1,
            max_token_length: 50,
            language: "english".to_string(),
        }
    }
}

/// How a `nested` clause combines its `path` with an enclosing nested path
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestedPathMode {
    /// The inner path replaces the enclosing one
    #[default]
    Replace,
    /// The inner path is appended to the enclosing one (`outer.inner`)
    Compose,
}

/// Options shared by dialect parsers
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    pub nested_paths: NestedPathMode,
}
