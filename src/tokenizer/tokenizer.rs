use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use stop_words::{get, LANGUAGE};
use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::TokenizerConfig;

/// Text tokenizer with optional stemming and stopword removal
///
/// The same tokenizer analyzes document fields at index time and query text
/// at search time, so both sides agree on terms and positions.
pub struct Tokenizer {
    config: TokenizerConfig,
    stemmer: Option<Stemmer>,
    stopwords: HashSet<String>,
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("config", &self.config)
            .field("stopwords", &self.stopwords.len())
            .finish()
    }
}

impl Tokenizer {
    /// Create a new tokenizer from configuration
    pub fn new(config: &TokenizerConfig) -> Self {
        let language = Language::from_name(&config.language).unwrap_or_else(|| {
            warn!("Unknown tokenizer language '{}', using english", config.language);
            Language::English
        });

        let stemmer = if config.stem {
            Some(Stemmer::create(language.stemmer_algorithm()))
        } else {
            None
        };

        let stopwords = if config.remove_stopwords {
            get(language.stopword_language())
                .into_iter()
                .map(|s| s.to_lowercase())
                .collect()
        } else {
            HashSet::new()
        };

        Self {
            config: config.clone(),
            stemmer,
            stopwords,
        }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Tokenize text into a vector of terms
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokenize_with_positions_ordered(text)
            .into_iter()
            .map(|(term, _)| term)
            .collect()
    }

    /// Tokenize and return (term, position) pairs in order
    ///
    /// Positions count every word, including ones dropped as stopwords or
    /// for their length, so phrase matching sees the original gaps.
    pub fn tokenize_with_positions_ordered(&self, text: &str) -> Vec<(String, u32)> {
        self.tokenize_with_positions_from(text, 0).0
    }

    /// Like `tokenize_with_positions_ordered`, with positions starting at
    /// `start`. Also returns the position following the last word.
    pub fn tokenize_with_positions_from(&self, text: &str, start: u32) -> (Vec<(String, u32)>, u32) {
        let mut results = Vec::new();
        let mut pos = start;

        for word in text.unicode_words() {
            if let Some(token) = self.normalize(word) {
                results.push((token, pos));
            }
            pos += 1;
        }

        (results, pos)
    }

    fn normalize(&self, word: &str) -> Option<String> {
        let mut token = word.to_string();

        if self.config.lowercase {
            token = token.to_lowercase();
        }

        // Length is measured in chars so non-ASCII words are not penalized
        let len = token.chars().count();
        if len < self.config.min_token_length || len > self.config.max_token_length {
            return None;
        }

        if self.stopwords.contains(&token) {
            return None;
        }

        if let Some(stemmer) = &self.stemmer {
            token = stemmer.stem(&token).to_string();
        }

        Some(token)
    }
}

/// Languages with both a stemmer and a stopword list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Language {
    English,
    French,
    German,
    Spanish,
}

impl Language {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "english" | "en" => Some(Language::English),
            "french" | "fr" => Some(Language::French),
            "german" | "de" => Some(Language::German),
            "spanish" | "es" => Some(Language::Spanish),
            _ => None,
        }
    }

    fn stemmer_algorithm(self) -> Algorithm {
        match self {
            Language::English => Algorithm::English,
            Language::French => Algorithm::French,
            Language::German => Algorithm::German,
            Language::Spanish => Algorithm::Spanish,
        }
    }

    fn stopword_language(self) -> LANGUAGE {
        match self {
            Language::English => LANGUAGE::English,
            Language::French => LANGUAGE::French,
            Language::German => LANGUAGE::German,
            Language::Spanish => LANGUAGE::Spanish,
        }
    }
}
