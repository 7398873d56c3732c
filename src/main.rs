//! lexipub - EPUB reader pipeline

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use lexipub::{Document, ReaderOptions, ReadingContext};

#[derive(Parser)]
#[command(name = "lexipub")]
#[command(version, about = "EPUB reader pipeline with vocabulary annotation", long_about = None)]
#[command(after_help = "EXAMPLES:
    lexipub info book.epub                          Show book metadata
    lexipub toc book.epub --json                    Print the table of contents as JSON
    lexipub render book.epub 3 --annotate --lexicon jlpt.tsv
    lexipub resource book.epub OEBPS/img/cover.jpg -o cover.jpg")]
struct Cli {
    /// Log pipeline details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show book metadata and reading order
    Info {
        #[arg(value_name = "BOOK")]
        book: PathBuf,
    },

    /// Print the flattened table of contents
    Toc {
        #[arg(value_name = "BOOK")]
        book: PathBuf,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Render one unit of the reading order
    Render {
        #[arg(value_name = "BOOK")]
        book: PathBuf,

        /// Zero-based position in the reading order
        #[arg(value_name = "POSITION")]
        position: usize,

        /// Reader options file (JSON); flags override its values
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Annotate vocabulary found in the lexicon
        #[arg(long)]
        annotate: bool,

        /// Lexicon file (JSON object or lemma<TAB>tier lines)
        #[arg(long, value_name = "FILE")]
        lexicon: Option<PathBuf>,

        /// Prefix for rewritten resource references
        #[arg(long, value_name = "PREFIX")]
        resource_prefix: Option<String>,

        /// Prefix for annotation span classes
        #[arg(long, value_name = "PREFIX")]
        class_prefix: Option<String>,
    },

    /// Extract a resource by package path
    Resource {
        #[arg(value_name = "BOOK")]
        book: PathBuf,

        #[arg(value_name = "PATH")]
        path: String,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Info { book } => show_info(&book),
        Command::Toc { book, json } => show_toc(&book, json),
        Command::Render {
            book,
            position,
            config,
            annotate,
            lexicon,
            resource_prefix,
            class_prefix,
        } => {
            let overrides = Overrides {
                annotate,
                lexicon,
                resource_prefix,
                class_prefix,
            };
            render(&book, position, config, overrides)
        }
        Command::Resource { book, path, output } => extract_resource(&book, &path, output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "lexipub=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn show_info(path: &Path) -> Result<(), String> {
    let doc = Document::open(path).map_err(|e| e.to_string())?;

    let meta = doc.metadata();
    println!("File: {}", path.display());
    println!("Title: {}", meta.title);
    if !meta.authors.is_empty() {
        println!("Authors: {}", meta.authors.join(", "));
    }
    if !meta.language.is_empty() {
        println!("Language: {}", meta.language);
    }
    if !meta.identifier.is_empty() {
        println!("Identifier: {}", meta.identifier);
    }
    if let Some(ref publisher) = meta.publisher {
        println!("Publisher: {publisher}");
    }
    println!("Units: {}", doc.len());
    println!("TOC entries: {}", doc.toc().len());
    println!("Manifest items: {}", doc.manifest().len());

    println!();
    for unit in doc.units() {
        let marker = if unit.linear { "" } else { "  (non-linear)" };
        println!("{:>4}  {}{marker}", unit.position, unit.path);
    }

    Ok(())
}

fn show_toc(path: &Path, json: bool) -> Result<(), String> {
    let doc = Document::open(path).map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(doc.toc()).map_err(|e| e.to_string())?;
        println!("{out}");
        return Ok(());
    }

    for entry in doc.toc() {
        println!("{:>4}  {}", entry.position, entry.title);
    }
    Ok(())
}

struct Overrides {
    annotate: bool,
    lexicon: Option<PathBuf>,
    resource_prefix: Option<String>,
    class_prefix: Option<String>,
}

fn render(
    path: &Path,
    position: usize,
    config: Option<PathBuf>,
    overrides: Overrides,
) -> Result<(), String> {
    let mut options = match config {
        Some(config) => ReaderOptions::load(&config).map_err(|e| e.to_string())?,
        None => ReaderOptions::default(),
    };
    if overrides.annotate {
        options.annotate = true;
    }
    if let Some(lexicon) = overrides.lexicon {
        options.lexicon = Some(lexicon);
    }
    if let Some(prefix) = overrides.resource_prefix {
        options.resource_prefix = prefix;
    }
    if let Some(prefix) = overrides.class_prefix {
        options.class_prefix = prefix;
    }
    if options.annotate && options.lexicon.is_none() {
        return Err("--annotate requires a lexicon (--lexicon or \"lexicon\" in --config)".into());
    }

    let context = ReadingContext::from_options(options).map_err(|e| e.to_string())?;
    let doc = Document::open(path).map_err(|e| e.to_string())?;
    let page = context
        .render_page(&doc, position)
        .map_err(|e| e.to_string())?;

    println!("{}", page.markup);
    Ok(())
}

fn extract_resource(book: &Path, path: &str, output: Option<PathBuf>) -> Result<(), String> {
    let doc = Document::open(book).map_err(|e| e.to_string())?;
    let resource = doc.resolve_resource(path).map_err(|e| e.to_string())?;

    match output {
        Some(out) => {
            fs::write(&out, &resource.bytes).map_err(|e| e.to_string())?;
            eprintln!(
                "{} ({}, {} bytes) -> {}",
                resource.path,
                resource.media_type,
                resource.bytes.len(),
                out.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&resource.bytes).map_err(|e| e.to_string())?;
            stdout.flush().map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}
