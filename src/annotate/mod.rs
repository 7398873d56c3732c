//! Vocabulary annotation of rendered markup.
//!
//! Direct text children of prose elements are tokenized, and tokens whose
//! lemma is in the [`Lexicon`] are wrapped in
//! `<span class="{tier}" data-lemma="...">`. Elements, attributes and
//! unmatched text are left exactly as they were.
//!
//! The pass is best-effort: [`Annotator::annotate`] reports what happened
//! as an [`Annotation`], and the caller picks the fallback.

mod deinflect;
mod lexicon;
mod tokenize;

use thiserror::Error;

pub use deinflect::inflections;
pub use lexicon::{Lexicon, LexiconError, Tier};
pub use tokenize::{DictionaryTokenizer, Token, TokenizeError, Tokenizer};

use crate::dom::{self, Dom, NodeId};

/// Elements whose direct text is treated as prose.
///
/// `span` is absent: spans already in the page, including ones from an
/// earlier pass, are kept as they are.
pub const PROSE_ELEMENTS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "div", "li", "td", "th", "dt", "dd",
    "blockquote", "figcaption", "caption", "em", "strong", "i", "b", "small", "q", "cite",
    "label", "section", "article",
];

#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error("tokens do not reproduce the text run {0:?}")]
    Coverage(String),
}

/// Outcome of an annotation pass.
#[derive(Debug)]
pub enum Annotation {
    /// Annotated markup.
    Applied(String),
    /// Annotation was not requested.
    Skipped,
    /// The pass failed; the input should be used unchanged.
    Failed(AnnotateError),
}

impl Annotation {
    /// The markup to show: the annotated text, or `original` otherwise.
    pub fn into_markup(self, original: String) -> String {
        match self {
            Annotation::Applied(markup) => markup,
            Annotation::Skipped | Annotation::Failed(_) => original,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Annotation::Applied(_))
    }
}

/// Lexicon, tokenizer and span styling for one reading session.
pub struct Annotator {
    lexicon: Lexicon,
    tokenizer: Box<dyn Tokenizer>,
    class_prefix: String,
}

impl Annotator {
    /// Annotator using a [`DictionaryTokenizer`] built from `lexicon`.
    pub fn new(lexicon: Lexicon) -> Self {
        let tokenizer = DictionaryTokenizer::from_lexicon(&lexicon);
        Self::with_tokenizer(lexicon, Box::new(tokenizer))
    }

    pub fn with_tokenizer(lexicon: Lexicon, tokenizer: Box<dyn Tokenizer>) -> Self {
        Self {
            lexicon,
            tokenizer,
            class_prefix: String::new(),
        }
    }

    /// Prefix prepended to every tier class.
    pub fn class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Annotate `markup` when `enabled`.
    ///
    /// Never fails: errors come back as [`Annotation::Failed`] and are logged.
    pub fn annotate(&self, markup: &str, enabled: bool) -> Annotation {
        if !enabled {
            return Annotation::Skipped;
        }
        match self.try_annotate(markup) {
            Ok(annotated) => Annotation::Applied(annotated),
            Err(e) => {
                tracing::warn!(error = %e, "annotation failed; using unannotated content");
                Annotation::Failed(e)
            }
        }
    }

    /// Annotate `markup`, surfacing errors.
    pub fn try_annotate(&self, markup: &str) -> Result<String, AnnotateError> {
        let mut dom = dom::parse_html(markup);

        // Snapshot first: spans created below are never revisited.
        let containers: Vec<NodeId> = dom
            .descendants(dom.document())
            .into_iter()
            .filter(|&id| is_prose_element(&dom, id))
            .collect();

        let mut spans = 0;
        for container in containers {
            let runs: Vec<NodeId> = dom
                .children(container)
                .filter(|&child| dom.text(child).is_some())
                .collect();
            for run in runs {
                spans += self.annotate_run(&mut dom, run)?;
            }
        }

        tracing::debug!(spans, "annotated markup");
        Ok(dom::serialize(&dom))
    }

    /// Replace one text node with text and span nodes. Returns the number of
    /// spans inserted; the node is left untouched when nothing matches.
    fn annotate_run(&self, dom: &mut Dom, run: NodeId) -> Result<usize, AnnotateError> {
        let Some(text) = dom.text(run).map(str::to_string) else {
            return Ok(0);
        };
        if text.trim().is_empty() {
            return Ok(0);
        }

        let tokens = self.tokenizer.tokenize(&text)?;
        let covered: usize = tokens.iter().map(|t| t.surface.len()).sum();
        if covered != text.len() || tokens.iter().map(|t| t.surface).collect::<String>() != text {
            return Err(AnnotateError::Coverage(text));
        }
        if !tokens.iter().any(|t| self.lexicon.get(&t.lemma).is_some()) {
            return Ok(0);
        }

        let mut spans = 0;
        let mut pending = String::new();
        for token in &tokens {
            let Some(tier) = self.lexicon.get(&token.lemma) else {
                pending.push_str(token.surface);
                continue;
            };
            if !pending.is_empty() {
                let node = dom.create_text(std::mem::take(&mut pending));
                dom.insert_before(run, node);
            }
            let class = format!("{}{}", self.class_prefix, tier.css_class());
            let span = dom.create_html_element(
                "span",
                &[("class", class.as_str()), ("data-lemma", &*token.lemma)],
            );
            dom.append_text(span, token.surface);
            dom.insert_before(run, span);
            spans += 1;
        }
        if !pending.is_empty() {
            let node = dom.create_text(pending);
            dom.insert_before(run, node);
        }
        dom.detach(run);

        Ok(spans)
    }
}

fn is_prose_element(dom: &Dom, id: NodeId) -> bool {
    dom.qual_name(id).is_some_and(|name| {
        name.ns == html5ever::ns!(html) && PROSE_ELEMENTS.contains(&name.local.as_ref())
    })
}
