//! Learner lexicon: lemma -> proficiency tier.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid lexicon JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line}: expected `lemma<TAB>tier`, got {content:?}")]
    Line { line: usize, content: String },
}

/// A proficiency tier label such as `N5`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tier(String);

impl Tier {
    pub fn new(label: impl Into<String>) -> Self {
        Tier(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    /// CSS class for this tier: lower-cased, non-alphanumerics replaced by `-`.
    ///
    /// `"N5"` -> `"n5"`, `"JLPT N3"` -> `"jlpt-n3"`
    pub fn css_class(&self) -> String {
        self.0
            .trim()
            .chars()
            .flat_map(char::to_lowercase)
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TierValue {
    Label(String),
    Level(i64),
}

/// Vocabulary keyed by exact lemma.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<String, Tier>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, replacing any previous tier for `lemma`.
    pub fn insert(&mut self, lemma: impl Into<String>, tier: Tier) {
        self.entries.insert(lemma.into(), tier);
    }

    /// Exact-match lookup.
    pub fn get(&self, lemma: &str) -> Option<&Tier> {
        self.entries.get(lemma)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lemmas in sorted order.
    pub fn lemmas(&self) -> Vec<&str> {
        let mut lemmas: Vec<_> = self.entries.keys().map(String::as_str).collect();
        lemmas.sort_unstable();
        lemmas
    }

    /// Parse a JSON object mapping lemma to tier (string or number).
    pub fn from_json(json: &str) -> Result<Self, LexiconError> {
        let raw: HashMap<String, TierValue> = serde_json::from_str(json)?;
        let entries = raw
            .into_iter()
            .map(|(lemma, tier)| {
                let label = match tier {
                    TierValue::Label(label) => label,
                    TierValue::Level(level) => level.to_string(),
                };
                (lemma, Tier(label))
            })
            .collect();
        Ok(Self { entries })
    }

    /// Parse `lemma<TAB>tier` (or comma-separated) lines. Blank lines and
    /// lines starting with `#` are skipped.
    pub fn from_tsv(text: &str) -> Result<Self, LexiconError> {
        let mut lexicon = Lexicon::new();
        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let (lemma, tier) = trimmed
                .split_once('\t')
                .or_else(|| trimmed.split_once(','))
                .map(|(l, t)| (l.trim(), t.trim()))
                .filter(|(l, t)| !l.is_empty() && !t.is_empty())
                .ok_or_else(|| LexiconError::Line {
                    line: idx + 1,
                    content: line.to_string(),
                })?;
            lexicon.insert(lemma, Tier::new(tier));
        }
        Ok(lexicon)
    }

    /// Load a lexicon file: `.json` as JSON, anything else as TSV/CSV.
    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let text = fs::read_to_string(path)?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let lexicon = if is_json {
            Self::from_json(text)?
        } else {
            Self::from_tsv(text)?
        };
        tracing::debug!(path = %path.display(), entries = lexicon.len(), "loaded lexicon");
        Ok(lexicon)
    }
}

impl<L: Into<String>, T: Into<String>> FromIterator<(L, T)> for Lexicon {
    fn from_iter<I: IntoIterator<Item = (L, T)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(lemma, tier)| (lemma.into(), Tier(tier.into())))
                .collect(),
        }
    }
}
