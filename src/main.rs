//! lexfind: Command-line interface for the legal document search engine

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use lexfind::config::{AppConfig, SearchOptions};
use lexfind::extract::{extract_metadata, UploadInfo};
use lexfind::normalizer::{NormalizedQuery, OracleClient, QueryNormalizer, QueryOracle};
use lexfind::search::{search_documents, SearchEngine};
use lexfind::store::{Document, DocumentStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// lexfind: LLM-normalized search over a legal document store
#[derive(Parser)]
#[command(name = "lexfind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true, default_value = "lexfind.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// Load documents into the store
    Ingest {
        /// A JSON file (array of documents) or a directory of HTML files
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the document database
        #[arg(short, long)]
        db: Option<String>,

        /// Language code assigned to HTML-ingested documents
        #[arg(short, long)]
        language: Option<String>,
    },
    /// Search the document store
    Search {
        /// Free-text query (sent to the oracle unless --terms is given)
        query: String,

        /// Comma-separated keywords, bypassing the oracle
        #[arg(short, long)]
        terms: Option<String>,

        /// Language filter
        #[arg(short, long)]
        language: Option<String>,

        /// Number of results to return
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Path to the document database
        #[arg(short, long)]
        db: Option<String>,

        /// Skip similarity re-ranking
        #[arg(long)]
        no_score: bool,
    },
    /// Run only the query normalizer and print the JSON (debug aid)
    Normalize {
        /// Free-text query
        query: String,
    },
}

/// Load config with env > file > defaults precedence
fn load_config(path: &Path) -> Result<AppConfig> {
    let base = if path.exists() {
        AppConfig::from_file(path)?
    } else {
        AppConfig::default()
    };
    let config = base.merge_with(&AppConfig::from_env());
    config.validate()?;
    Ok(config)
}

fn build_normalizer(config: &AppConfig) -> Result<QueryNormalizer> {
    let api_key = config.openrouter_api_key().ok_or_else(|| {
        anyhow!("OPENROUTER_API_KEY is not set; use --terms to search without the oracle")
    })?;
    Ok(QueryNormalizer::new(OracleClient::new(api_key)).with_model(config.model()))
}

/// Ingest one HTML file as a document
fn ingest_html_file(store: &DocumentStore, path: &Path, language: &str) -> Result<()> {
    let html = std::fs::read_to_string(path)?;
    let meta = std::fs::metadata(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();

    let upload = UploadInfo {
        filename: filename.clone(),
        extension,
        size_kb: meta.len() / 1024,
        uploaded_at: chrono::Utc::now(),
    };
    let metadata = extract_metadata(&html, &upload)?;

    let title = path
        .file_stem()
        .map(|s| s.to_string_lossy().replace(['-', '_'], " "))
        .unwrap_or_else(|| metadata.title.clone());

    let doc = Document::new(
        title,
        metadata.tags,
        metadata.snippet,
        format!("s3://lexfind-uploads/{}", filename),
        language.to_string(),
    );
    store.insert(&doc)?;
    eprintln!("  {} -> {}", filename, doc.doc_id);
    Ok(())
}

fn print_results(results: &[lexfind::ScoredDocument], query: &str) {
    if results.is_empty() {
        println!("No results found for '{}'", query);
        return;
    }
    println!("Found {} results for '{}':\n", results.len(), query);
    for (i, result) in results.iter().enumerate() {
        let doc = &result.document;
        println!("{}. [score: {:.4}] {}", i + 1, result.score, doc.title);
        println!("   Tags: {:?}", doc.tags);
        println!("   Language: {}", doc.language);
        println!("   Path: {}", doc.s3_path);
        println!("   {}", doc.snippet);
        println!();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Init { force } => {
            if cli.config.exists() && !force {
                eprintln!("Configuration file already exists: {}", cli.config.display());
                eprintln!("Use --force to overwrite");
                return Ok(());
            }

            let default_config = AppConfig::default();
            std::fs::write(&cli.config, default_config.to_toml()?)?;
            eprintln!("Created configuration file: {}", cli.config.display());
            Ok(())
        }
        Commands::Ingest {
            input,
            db,
            language,
        } => {
            let config = load_config(&cli.config)?;
            let db_path = db.unwrap_or_else(|| config.db_path().to_string());
            let language = language.unwrap_or_else(|| config.default_language().to_string());
            let store = DocumentStore::open(&db_path)?;

            if input.is_dir() {
                eprintln!("Ingesting HTML files from {}", input.display());
                let mut count = 0usize;
                for entry in std::fs::read_dir(&input)? {
                    let path = entry?.path();
                    let is_html = path
                        .extension()
                        .map(|e| e == "html" || e == "htm")
                        .unwrap_or(false);
                    if path.is_file() && is_html {
                        ingest_html_file(&store, &path, &language)?;
                        count += 1;
                    }
                }
                eprintln!("Ingested {} document(s) into {}", count, db_path);
            } else {
                eprintln!("Ingesting documents from {}", input.display());
                let content = std::fs::read_to_string(&input)?;
                let docs: Vec<Document> = serde_json::from_str(&content)
                    .map_err(|e| anyhow!("Failed to parse {}: {}", input.display(), e))?;
                let count = docs.len();
                for doc in &docs {
                    store.insert(doc)?;
                }
                eprintln!("Ingested {} document(s) into {}", count, db_path);
            }
            Ok(())
        }
        Commands::Search {
            query,
            terms,
            language,
            limit,
            db,
            no_score,
        } => {
            let config = load_config(&cli.config)?;
            let db_path = db.unwrap_or_else(|| config.db_path().to_string());
            let store = DocumentStore::open(&db_path)?;
            if store.is_empty()? {
                eprintln!("Document store at {} is empty; run `lexfind ingest` first", db_path);
            }

            let options = SearchOptions::new()
                .with_language(language)
                .with_limit(limit)
                .with_skip_scoring(no_score);

            let results = if let Some(terms) = terms {
                // Oracle bypass: keywords given on the command line
                let normalized = NormalizedQuery {
                    search_terms: terms
                        .split(',')
                        .map(|t| t.trim().to_string())
                        .filter(|t| !t.is_empty())
                        .collect(),
                    language: config.default_language().to_string(),
                };
                search_documents(&store, &normalized, &query, &options, config.default_language())?
            } else {
                let normalizer = build_normalizer(&config)?;
                let engine = SearchEngine::new(normalizer, store)
                    .with_default_language(config.default_language());
                engine.search(&query, &options).await?
            };

            print_results(&results, &query);
            Ok(())
        }
        Commands::Normalize { query } => {
            let config = load_config(&cli.config)?;
            let normalizer = build_normalizer(&config)?;
            let normalized = normalizer.normalize(&query).await?;
            println!("{}", serde_json::to_string_pretty(&normalized)?);
            Ok(())
        }
    }
}
