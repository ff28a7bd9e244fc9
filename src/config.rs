//! Run configuration and attribute schema validation.

use crate::error::{Error, Result};
use std::str::FromStr;

/// Default reserved letter for star nodes.
pub const DEFAULT_STAR_LETTER: char = 'P';

/// Default name of the record identifier field.
pub const DEFAULT_ID_FIELD: &str = "id";

/// Default size (in bytes) above which the output buffer is written out.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 1_000_000;

/// Edge weighting policy applied after pruning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeightingScheme {
    /// Each record spreads a total weight of 1 over its attribute values.
    #[default]
    Publication,
    /// Each attribute node spreads a total weight of 1 over its star nodes.
    Metadata,
}

impl FromStr for WeightingScheme {
    type Err = Error;

    /// Anything starting with `p`/`P` selects [`WeightingScheme::Publication`];
    /// any other non-empty selector selects [`WeightingScheme::Metadata`].
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().chars().next() {
            None => Err(Error::EmptyWeightingSelector),
            Some('p' | 'P') => Ok(WeightingScheme::Publication),
            Some(_) => Ok(WeightingScheme::Metadata),
        }
    }
}

/// Configuration for a full similarity run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Attribute fields to read, in order.
    pub attributes: Vec<String>,
    /// Reserved type letter for star nodes.
    pub star_letter: char,
    /// Name of the record identifier field.
    pub id_field: String,
    pub weighting: WeightingScheme,
    /// Number of two-hop walks per star node.
    pub walks_per_node: usize,
    /// Worker pool size.
    pub workers: usize,
    /// Base seed; drawn from the thread RNG when absent.
    pub seed: Option<u64>,
    pub flush_threshold: usize,
}

impl SimConfig {
    pub fn new(
        attributes: Vec<String>,
        weighting: WeightingScheme,
        walks_per_node: usize,
        workers: usize,
    ) -> Self {
        Self {
            attributes,
            star_letter: DEFAULT_STAR_LETTER,
            id_field: DEFAULT_ID_FIELD.to_string(),
            weighting,
            walks_per_node,
            workers,
            seed: None,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_star_letter(mut self, star_letter: char) -> Self {
        self.star_letter = star_letter;
        self
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    pub fn with_flush_threshold(mut self, flush_threshold: usize) -> Self {
        self.flush_threshold = flush_threshold;
        self
    }

    /// Split a delimiter-separated attribute list (`"authors_venue"`).
    pub fn parse_attribute_list(list: &str, delimiter: char) -> Vec<String> {
        list.split(delimiter).map(|s| s.trim().to_string()).collect()
    }

    /// Check every setting and derive the attribute schema.
    ///
    /// Runs before any input is touched.
    pub fn validate(&self) -> Result<AttributeSchema> {
        if self.walks_per_node == 0 {
            return Err(Error::NonPositive { setting: "walk count" });
        }
        if self.workers == 0 {
            return Err(Error::NonPositive { setting: "worker count" });
        }
        AttributeSchema::new(self.attributes.as_slice(), self.star_letter)
    }
}

/// Validated mapping from attribute names to node type letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSchema {
    star_letter: char,
    attributes: Vec<(String, char)>,
}

impl AttributeSchema {
    /// Build a schema, rejecting empty names and colliding first letters.
    ///
    /// Letters compare case-insensitively and are stored upper-cased.
    pub fn new<S: AsRef<str>>(attributes: &[S], star_letter: char) -> Result<Self> {
        if attributes.is_empty() {
            return Err(Error::NoAttributes);
        }

        let star = upper(star_letter);
        let mut named = Vec::with_capacity(attributes.len());
        for (position, name) in attributes.iter().enumerate() {
            let name = name.as_ref();
            let first = name
                .chars()
                .next()
                .ok_or(Error::EmptyAttributeName { position })?;
            named.push((name.to_string(), upper(first)));
        }

        let mut letters: Vec<char> = named.iter().map(|(_, l)| *l).collect();
        letters.push(star);
        let mut sorted = letters.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != letters.len() {
            return Err(Error::TypeLetterCollision { letters, star });
        }

        Ok(Self { star_letter: star, attributes: named })
    }

    pub fn star_letter(&self) -> char {
        self.star_letter
    }

    /// `(field name, type letter)` pairs in configured order.
    pub fn attributes(&self) -> &[(String, char)] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

fn upper(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}
