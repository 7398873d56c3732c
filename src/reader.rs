//! Per-request reading context: options, resource addressing and pages.
//!
//! Everything a render call depends on is carried by a [`ReadingContext`]
//! owned by the caller; nothing here is global, so several documents and
//! sessions can be served side by side.

use std::fs;
use std::path::{Path, PathBuf};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotate::{Annotator, Lexicon, LexiconError};
use crate::document::Document;
use crate::error::Result;
use crate::path;

/// Characters escaped in each path segment of a resource reference.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to read options: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid options: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Lexicon(#[from] LexiconError),

    #[error("resource prefix {0:?} must be root-absolute or carry a URL scheme")]
    RelativePrefix(String),
}

/// Reader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Prefix of rewritten resource references. Must start with `/` or a
    /// URL scheme, otherwise a rewritten reference would be resolved again
    /// as a package path.
    pub resource_prefix: String,
    /// Annotate vocabulary in rendered pages.
    pub annotate: bool,
    /// Prefix prepended to tier classes on annotation spans.
    pub class_prefix: String,
    /// Lexicon file (JSON or TSV) used for annotation.
    pub lexicon: Option<PathBuf>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            resource_prefix: "/resource/".to_string(),
            annotate: false,
            class_prefix: String::new(),
            lexicon: None,
        }
    }
}

impl ReaderOptions {
    pub fn from_json(json: &str) -> std::result::Result<Self, OptionsError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: &Path) -> std::result::Result<Self, OptionsError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> std::result::Result<(), OptionsError> {
        let prefix = self.resource_prefix.trim();
        if prefix.starts_with('/') || path::has_scheme(prefix) {
            Ok(())
        } else {
            Err(OptionsError::RelativePrefix(self.resource_prefix.clone()))
        }
    }
}

/// Map a package path to `{prefix}{percent-encoded path}`.
///
/// `"OEBPS/img/a b.png"` with prefix `/resource/` -> `/resource/OEBPS/img/a%20b.png`
pub fn resource_url(prefix: &str, path: &str) -> String {
    let mut url = String::with_capacity(prefix.len() + path.len());
    url.push_str(prefix);
    if !prefix.is_empty() && !prefix.ends_with('/') {
        url.push('/');
    }
    for (i, segment) in path.split('/').enumerate() {
        if i > 0 {
            url.push('/');
        }
        url.extend(utf8_percent_encode(segment, SEGMENT));
    }
    url
}

/// One rendered unit together with its place in the reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub position: usize,
    pub total: usize,
    pub markup: String,
}

impl Page {
    pub fn previous(&self) -> Option<usize> {
        self.position.checked_sub(1)
    }

    pub fn next(&self) -> Option<usize> {
        let next = self.position + 1;
        (next < self.total).then_some(next)
    }
}

/// Options plus the annotator they imply.
pub struct ReadingContext {
    options: ReaderOptions,
    annotator: Option<Annotator>,
}

impl ReadingContext {
    /// A context without annotation support.
    pub fn new(options: ReaderOptions) -> Self {
        Self {
            options,
            annotator: None,
        }
    }

    /// Build a context, loading the lexicon named by the options.
    pub fn from_options(options: ReaderOptions) -> std::result::Result<Self, OptionsError> {
        options.validate()?;
        let annotator = match &options.lexicon {
            Some(path) => Some(
                Annotator::new(Lexicon::load(path)?).class_prefix(options.class_prefix.clone()),
            ),
            None => None,
        };
        Ok(Self { options, annotator })
    }

    /// Use `lexicon` for annotation, replacing any loaded one.
    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.annotator = Some(Annotator::new(lexicon).class_prefix(self.options.class_prefix.clone()));
        self
    }

    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = Some(annotator);
        self
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// External reference for a package path.
    pub fn map_resource(&self, path: &str) -> String {
        resource_url(&self.options.resource_prefix, path)
    }

    /// Render the page at `position`, annotated when enabled.
    ///
    /// Annotation failures fall back to the unannotated page.
    pub fn render_page(&self, document: &Document, position: usize) -> Result<Page> {
        let markup = document.render_unit(position, &|path| self.map_resource(path))?;

        let markup = match &self.annotator {
            Some(annotator) => annotator
                .annotate(&markup, self.options.annotate)
                .into_markup(markup),
            None => {
                if self.options.annotate {
                    tracing::debug!("annotation requested without a lexicon");
                }
                markup
            }
        };

        Ok(Page {
            position,
            total: document.len(),
            markup,
        })
    }
}
