//! # lexipub
//!
//! EPUB pagination, resource rewriting and learner vocabulary annotation.
//!
//! A package is loaded once into an immutable [`Document`]. From it you get
//! the reading order, a flattened table of contents, rendered units with
//! image references pointing at your resource endpoint, and the resources
//! themselves.
//!
//! ## Quick Start
//!
//! ```no_run
//! use lexipub::{Document, ReaderOptions, ReadingContext};
//!
//! let doc = Document::open("book.epub").unwrap();
//! for entry in doc.toc() {
//!     println!("{:>3}  {}", entry.position, entry.title);
//! }
//!
//! let context = ReadingContext::new(ReaderOptions::default());
//! let page = context.render_page(&doc, 0).unwrap();
//! println!("{}", page.markup);
//! ```
//!
//! ## Annotation
//!
//! With a [`Lexicon`], prose text is tokenized and known lemmas are wrapped
//! in `<span class="{tier}" data-lemma="...">` elements:
//!
//! ```
//! use lexipub::{Annotator, Lexicon};
//!
//! let lexicon: Lexicon = [("食べる", "N5")].into_iter().collect();
//! let annotator = Annotator::new(lexicon);
//! let out = annotator
//!     .annotate("<p>私は食べる</p>", true)
//!     .into_markup("<p>私は食べる</p>".to_string());
//! assert!(out.contains(r#"<span class="n5" data-lemma="食べる">食べる</span>"#));
//! ```

pub mod annotate;
pub mod document;
pub mod dom;
pub mod error;
pub mod io;
pub mod package;
pub mod path;
pub mod reader;
pub mod render;
pub mod resource;
pub mod spine;
pub mod toc;
pub(crate) mod util;

pub use annotate::{Annotation, Annotator, Lexicon, Tier, Tokenizer};
pub use document::Document;
pub use error::{Error, Result};
pub use package::{ManifestItem, Metadata, SpineEntry};
pub use reader::{Page, ReaderOptions, ReadingContext};
pub use resource::Resource;
pub use spine::{AddressableUnit, ReadingOrder};
pub use toc::{NavNode, TocEntry};
