use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use ci_reader::data::DocumentFormat;
use ci_reader::language::detect_from_sentences;
use ci_reader::reader::normalize_json_chapters;
use ci_reader::{
    BodySelector, BookRecord, DocumentProcessor, LanguageCode, LibraryStore, ProcessedBook,
    ProgressRecord, ReaderConfig,
};

const SUPPORTED_EXTENSIONS: [&str; 6] = ["txt", "md", "pdf", "epub", "srt", "vtt"];

#[derive(Debug, Parser)]
#[command(author, version, about = "Comprehensible-input reader: document ingestion tools")]
struct Cli {
    /// Path to configuration JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ingest a document (or every document in a directory)
    Ingest(IngestArgs),
    /// Detect the language of a document
    Detect(DetectArgs),
    /// List the readable body chapters of a stored book
    Chapters(ChaptersArgs),
    /// Resolve a saved reading position against a stored book
    Locate(LocateArgs),
}

#[derive(Debug, Args)]
struct IngestArgs {
    /// Document file or directory of documents
    input: PathBuf,
    /// Language code to record (defaults to detection)
    #[arg(long)]
    language: Option<String>,
    /// Library directory to store records in; prints JSON when omitted
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct DetectArgs {
    /// Document file
    input: PathBuf,
}

#[derive(Debug, Args)]
struct ChaptersArgs {
    /// Stored content JSON file
    content: PathBuf,
}

#[derive(Debug, Args)]
struct LocateArgs {
    /// Stored content JSON file
    content: PathBuf,
    /// Saved progress: a flat index or a JSON position object
    progress: String,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Ingest(args) => ingest_command(args, &config),
        Commands::Detect(args) => detect_command(args, &config),
        Commands::Chapters(args) => chapters_command(args, &config),
        Commands::Locate(args) => locate_command(args, &config),
    }
}

fn load_config(path: Option<&Path>) -> Result<ReaderConfig> {
    let Some(path) = path else {
        return Ok(ReaderConfig::default());
    };

    info!("Loading configuration from: {:?}", path);
    let config = ReaderConfig::from_file(path)
        .with_context(|| format!("Failed to load config file: {:?}", path))?;
    info!("Configuration: {}", config);
    Ok(config)
}

fn ingest_command(args: IngestArgs, config: &ReaderConfig) -> Result<()> {
    let files = collect_documents(&args.input)?;
    if files.is_empty() {
        bail!("No supported documents found in {:?}", args.input);
    }

    let processor = DocumentProcessor::new(config);
    let language = LanguageCode::normalize(args.language.as_deref());
    let store = args
        .out
        .as_ref()
        .map(LibraryStore::open)
        .transpose()
        .with_context(|| format!("Failed to open library directory: {:?}", args.out))?;

    let mut ingested = 0;

    for (idx, path) in files.iter().enumerate() {
        info!("Processing {}/{}: {:?}", idx + 1, files.len(), path);

        let book = match processor.process_file(path) {
            Ok(book) => book,
            Err(e) if files.len() > 1 => {
                warn!("Failed to process {:?}: {}", path, e);
                continue;
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to process {:?}", path)),
        };

        match &store {
            Some(store) => {
                let record = BookRecord::from_processed(book, store.next_id(), language, config);
                store.save(&record)?;
                println!(
                    "{}\t{}\t{}\t{}",
                    record.metadata.id,
                    record.metadata.level,
                    record.metadata.language,
                    record.metadata.title
                );
            }
            None => println!("{}", serde_json::to_string_pretty(&book)?),
        }
        ingested += 1;
    }

    info!("Ingested {}/{} documents", ingested, files.len());
    Ok(())
}

fn collect_documents(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("Input does not exist: {:?}", input);
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    info!("Found {} documents", files.len());
    Ok(files)
}

fn detect_command(args: DetectArgs, config: &ReaderConfig) -> Result<()> {
    let book: ProcessedBook = DocumentProcessor::new(config)
        .process_file(&args.input)
        .with_context(|| format!("Failed to process {:?}", args.input))?;

    let sentences: Vec<&String> = book.sentences().collect();
    let hint = detect_from_sentences(
        &sentences,
        config.language.sample_sentences,
        config.language.sample_chars,
    );

    let format = DocumentFormat::from_filename(&args.input.to_string_lossy());
    println!("{}\t{}\t{} ({})", hint.code, hint.reason, hint.code.label(), format);
    Ok(())
}

fn read_body_chapters(path: &Path, config: &ReaderConfig) -> Result<Vec<ci_reader::Chapter>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read content file: {:?}", path))?;
    let value: serde_json::Value = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse content JSON: {:?}", path))?;

    let chapters =
        normalize_json_chapters(value.get("chapters").unwrap_or(&serde_json::Value::Null));
    Ok(BodySelector::new(&config.body).select(&chapters))
}

fn chapters_command(args: ChaptersArgs, config: &ReaderConfig) -> Result<()> {
    let body = read_body_chapters(&args.content, config)?;
    if body.is_empty() {
        println!("No readable chapters");
        return Ok(());
    }

    for (idx, chapter) in body.iter().enumerate() {
        println!(
            "{:>3}  {}  ({} paragraphs, {} sentences)",
            idx,
            chapter.title,
            chapter.paragraphs.len(),
            chapter.sentence_count()
        );
    }
    Ok(())
}

fn locate_command(args: LocateArgs, config: &ReaderConfig) -> Result<()> {
    let body = read_body_chapters(&args.content, config)?;
    let Some(record) = ProgressRecord::parse(&args.progress) else {
        bail!("Unrecognized progress record: {}", args.progress);
    };

    match record.resolve(&body) {
        Some(position) => {
            let sentence = body
                .get(position.chapter_index)
                .and_then(|c| c.paragraphs.get(position.paragraph_index))
                .and_then(|p| p.get(position.sentence_index))
                .map(String::as_str)
                .unwrap_or("");
            println!("{}", serde_json::to_string(&position)?);
            println!("{}", sentence);
        }
        None => println!("chapter {}", record.chapter_index(&body)),
    }
    Ok(())
}
