// Vocabulary Store
// Immutable subword-string -> ID mapping, loaded once at process start and
// shared read-only across requests. Token IDs are the line positions of a
// standard BERT-style vocab.txt.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;

pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";
pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";

#[derive(Debug, Clone)]
pub struct Vocabulary {
    token_to_id: HashMap<String, u32>,
    id_to_token: Vec<String>,
    cls_id: u32,
    sep_id: u32,
    pad_id: u32,
    unk_id: u32,
}

impl Vocabulary {
    /// Build a vocabulary from an ordered token list. The position of each
    /// token is its ID. All four special tokens must be present, and no
    /// surface string may appear twice.
    pub fn from_tokens(tokens: Vec<String>) -> Result<Self> {
        if tokens.is_empty() {
            bail!("vocabulary is empty");
        }

        let mut token_to_id = HashMap::with_capacity(tokens.len());
        for (i, tok) in tokens.iter().enumerate() {
            if token_to_id.insert(tok.clone(), i as u32).is_some() {
                bail!("duplicate vocabulary entry {:?}", tok);
            }
        }

        let require = |name: &str| -> Result<u32> {
            token_to_id
                .get(name)
                .copied()
                .with_context(|| format!("vocabulary is missing the {} special token", name))
        };

        let cls_id = require(CLS_TOKEN)?;
        let sep_id = require(SEP_TOKEN)?;
        let pad_id = require(PAD_TOKEN)?;
        let unk_id = require(UNK_TOKEN)?;

        Ok(Self {
            token_to_id,
            id_to_token: tokens,
            cls_id,
            sep_id,
            pad_id,
            unk_id,
        })
    }

    /// Parse a vocab.txt payload: one token per line, line number = token ID.
    pub fn from_vocab_text(vocab_text: &str) -> Result<Self> {
        let tokens: Vec<String> = vocab_text
            .lines()
            .map(|l| l.trim_end_matches('\r').to_string())
            .collect();
        Self::from_tokens(tokens)
    }

    /// Load a vocab.txt file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read vocabulary file {}", path.display()))?;
        Self::from_vocab_text(&contents)
            .with_context(|| format!("invalid vocabulary file {}", path.display()))
    }

    pub fn id_of(&self, token: &str) -> Option<u32> {
        self.token_to_id.get(token).copied()
    }

    pub fn token_of(&self, id: u32) -> Option<&str> {
        self.id_to_token.get(id as usize).map(String::as_str)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.token_to_id.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    pub fn cls_id(&self) -> u32 {
        self.cls_id
    }

    pub fn sep_id(&self) -> u32 {
        self.sep_id
    }

    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    pub fn unk_id(&self) -> u32 {
        self.unk_id
    }
}
