//! Tokenization of text runs into (surface, lemma) pairs.

use std::borrow::Cow;
use std::collections::HashMap;

use thiserror::Error;

use super::deinflect::inflections;
use super::lexicon::Lexicon;

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("tokenizer backend failed: {0}")]
    Backend(String),
}

/// One morphological unit of a text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Exact slice of the input.
    pub surface: &'a str,
    /// Dictionary form used for lexicon lookup.
    pub lemma: Cow<'a, str>,
}

impl<'a> Token<'a> {
    /// A token whose lemma is its own surface.
    pub fn verbatim(surface: &'a str) -> Self {
        Self {
            surface,
            lemma: Cow::Borrowed(surface),
        }
    }
}

/// Splits text into tokens.
///
/// The surfaces of the returned tokens must concatenate back to `text`.
pub trait Tokenizer: Send + Sync {
    fn tokenize<'a>(&self, text: &'a str) -> Result<Vec<Token<'a>>, TokenizeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Cjk,
    Word,
    Space,
    Other,
}

fn classify(c: char) -> CharClass {
    match c {
        '\u{3005}' | '\u{3006}' | '\u{3007}' | '\u{303b}' // 々 〆 〇 〻
        | '\u{3040}'..='\u{309f}' // hiragana
        | '\u{30a0}'..='\u{30ff}' // katakana (ー included)
        | '\u{31f0}'..='\u{31ff}'
        | '\u{3400}'..='\u{4dbf}'
        | '\u{4e00}'..='\u{9fff}'
        | '\u{f900}'..='\u{faff}'
        | '\u{ff66}'..='\u{ff9f}' // half-width katakana
        | '\u{20000}'..='\u{2ffff}' => CharClass::Cjk,
        c if c.is_whitespace() => CharClass::Space,
        c if c.is_alphanumeric() || c == '\'' || c == '\u{2019}' => CharClass::Word,
        _ => CharClass::Other,
    }
}

/// Longest-match tokenizer driven by the lexicon.
///
/// CJK runs are segmented greedily against the lexicon's lemmas and their
/// generated conjugations; characters that start no known form become
/// single-character tokens. Other scripts are split into words, whitespace
/// and punctuation runs.
#[derive(Debug, Clone, Default)]
pub struct DictionaryTokenizer {
    /// Known surface form -> lemma.
    forms: HashMap<String, String>,
    /// Longest known form, in chars.
    max_chars: usize,
}

impl DictionaryTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from every lemma in `lexicon` plus its conjugations.
    pub fn from_lexicon(lexicon: &Lexicon) -> Self {
        let mut tokenizer = Self::new();
        let lemmas = lexicon.lemmas();
        // Lemmas first so a lemma never gets shadowed by another word's
        // conjugation.
        for lemma in &lemmas {
            tokenizer.add_form(lemma, lemma);
        }
        for lemma in &lemmas {
            for form in inflections(lemma) {
                tokenizer.add_form(&form, lemma);
            }
        }
        tracing::debug!(
            lemmas = lemmas.len(),
            forms = tokenizer.forms.len(),
            "built dictionary tokenizer"
        );
        tokenizer
    }

    /// Register `surface` as a form of `lemma`. Earlier registrations win.
    pub fn add_form(&mut self, surface: &str, lemma: &str) {
        if surface.is_empty() {
            return;
        }
        if !self.forms.contains_key(surface) {
            self.max_chars = self.max_chars.max(surface.chars().count());
            self.forms.insert(surface.to_string(), lemma.to_string());
        }
    }

    fn segment_cjk<'a>(&self, run: &'a str, out: &mut Vec<Token<'a>>) {
        let boundaries: Vec<usize> = run
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(run.len()))
            .collect();
        let chars = boundaries.len() - 1;

        let mut start = 0;
        while start < chars {
            let longest = (start + 1..=chars.min(start + self.max_chars))
                .rev()
                .find_map(|end| {
                    let candidate = &run[boundaries[start]..boundaries[end]];
                    self.forms.get(candidate).map(|lemma| (end, lemma))
                });

            match longest {
                Some((end, lemma)) => {
                    out.push(Token {
                        surface: &run[boundaries[start]..boundaries[end]],
                        lemma: Cow::Owned(lemma.clone()),
                    });
                    start = end;
                }
                None => {
                    out.push(Token::verbatim(&run[boundaries[start]..boundaries[start + 1]]));
                    start += 1;
                }
            }
        }
    }

    fn word<'a>(&self, run: &'a str) -> Token<'a> {
        let lemma = match self.forms.get(run) {
            Some(lemma) => Cow::Owned(lemma.clone()),
            None if run.chars().any(char::is_uppercase) => Cow::Owned(run.to_lowercase()),
            None => Cow::Borrowed(run),
        };
        Token {
            surface: run,
            lemma,
        }
    }
}

impl Tokenizer for DictionaryTokenizer {
    fn tokenize<'a>(&self, text: &'a str) -> Result<Vec<Token<'a>>, TokenizeError> {
        let mut tokens = Vec::new();

        for (class, run) in script_runs(text) {
            match class {
                CharClass::Cjk => self.segment_cjk(run, &mut tokens),
                CharClass::Word => tokens.push(self.word(run)),
                CharClass::Space | CharClass::Other => tokens.push(Token::verbatim(run)),
            }
        }

        Ok(tokens)
    }
}

/// Split `text` into maximal runs of one character class.
fn script_runs(text: &str) -> Vec<(CharClass, &str)> {
    let mut runs = Vec::new();
    let mut current: Option<(CharClass, usize)> = None;

    for (idx, c) in text.char_indices() {
        let class = classify(c);
        match current {
            Some((cur, _)) if cur == class => {}
            Some((cur, start)) => {
                runs.push((cur, &text[start..idx]));
                current = Some((class, idx));
            }
            None => current = Some((class, idx)),
        }
    }
    if let Some((cur, start)) = current {
        runs.push((cur, &text[start..]));
    }
    runs
}
