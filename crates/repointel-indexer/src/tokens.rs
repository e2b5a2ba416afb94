//! Normalisation of block text into comparable tokens

use std::sync::LazyLock;

use regex::Regex;
use repointel_core::{RedundancyConfig, TokenBag};

static LINE_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)#.*$").expect("valid regex literal"));

static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex literal"));

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid regex literal"));

/// Lowercases text, optionally drops comments, and keeps word tokens of at
/// least `min_token_len` characters.
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer {
    strip_comments: bool,
    min_token_len: usize,
}

impl Tokenizer {
    pub fn new(strip_comments: bool, min_token_len: usize) -> Self {
        Tokenizer {
            strip_comments,
            min_token_len,
        }
    }

    pub fn from_config(config: &RedundancyConfig) -> Self {
        Self::new(config.strip_comments, config.min_token_len)
    }

    pub fn tokenize(&self, text: &str) -> TokenBag {
        let lowered = text.to_lowercase();
        let cleaned = if self.strip_comments {
            let without_html = HTML_COMMENT.replace_all(&lowered, " ");
            LINE_COMMENT.replace_all(&without_html, "").into_owned()
        } else {
            lowered
        };

        WORD.find_iter(&cleaned)
            .map(|m| m.as_str())
            .filter(|token| token.chars().count() >= self.min_token_len)
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::from_config(&RedundancyConfig::default())
    }
}
