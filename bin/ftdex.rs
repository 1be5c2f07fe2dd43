use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ftdex::{FullTextIndexer, Indexer, IndexerConfig, MatchMode, TextDocument};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "ftdex")]
#[command(about = "Filesystem-backed full-text index", long_about = None)]
struct Args {
    /// Data directory holding config.json, stopWords.txt and the index
    #[arg(long, env = "FTDEX_DATA_DIR", default_value = "./data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index the contents of a text file under a document number
    Index {
        doc_number: u64,
        file: PathBuf,
    },
    /// Mark a document as deleted
    Delete { doc_number: u64 },
    /// Run a query and print matching document numbers with scores
    Query {
        text: String,
        /// exact, prefix or infix
        #[arg(long, default_value = "prefix")]
        mode: MatchMode,
    },
    /// Print queue depths and cache size
    Status,
    /// Print the indexer metrics in the Prometheus text format
    Metrics,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = IndexerConfig::load(&args.data_dir)
        .with_context(|| format!("failed to load configuration from {:?}", args.data_dir))?;
    info!("ftdex v{} using {:?}", ftdex::VERSION, config.index_root());

    let indexer = FullTextIndexer::open(config).context("failed to open index")?;

    match args.command {
        Command::Index { doc_number, file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {:?}", file))?;
            indexer.index(&TextDocument::new(text), doc_number)?;
            let units = indexer.flush()?;
            println!("indexed document {} ({} index files written)", doc_number, units);
        }
        Command::Delete { doc_number } => {
            indexer.delete_document(doc_number)?;
            println!("deleted document {}", doc_number);
        }
        Command::Query { text, mode } => {
            let result = indexer.process_query(&text, mode)?;
            for element in result.iter() {
                println!("{}\t{:.3}", element.doc_number, element.score);
            }
            eprintln!("{} documents", result.len());
        }
        Command::Status => {
            println!("{}", indexer.status());
            println!("cached posting lists: {}", indexer.cached_terms());
            println!("deleted documents: {}", indexer.invalidated_count());
        }
        Command::Metrics => {
            let text = indexer
                .metrics()
                .render()
                .context("failed to render metrics")?;
            print!("{}", text);
        }
    }

    indexer.shutdown();
    Ok(())
}
