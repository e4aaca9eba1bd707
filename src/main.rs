use std::path::{Path, PathBuf};
use clap::{Parser, Subcommand};
use pir::ircore::config::EngineConfig;
use pir::ircore::engine::{Engine, SearchHit};
use pir::ircore::query::Query;
use pir::ircore::{NormalizationType, QueryType, RankingType, Result};

#[derive(Parser)]
#[derive(Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
/// A persistent inverted index with ranked search and spelling correction
struct Cli {
    #[clap(short, long, value_parser, default_value_t = String::from(".pir/index"))]
    /// Index directory
    index_dir: String,
    #[clap(long, value_parser)]
    /// YAML config file, defaults to <index-dir>/.pircfg
    config: Option<String>,
    #[clap(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
#[derive(Debug)]
enum Commands {
    /// Build index
    Build {
        #[clap(short, long, value_parser)]
        /// Corpus directory
        corpus_dir: String,
    },
    /// Search the index
    Search {
        #[clap(value_parser)]
        /// query terms, `*` for wildcards
        query: String,
        #[clap(short, long, value_enum, default_value_t = QueryType::Ranked)]
        query_type: QueryType,
        #[clap(short, long, value_enum, default_value_t = RankingType::TermWeight)]
        ranking: RankingType,
        #[clap(short, long, value_enum, default_value_t = NormalizationType::ByTokenCount)]
        normalization: NormalizationType,
        #[clap(short, long, value_parser, default_value_t = 10)]
        /// number of results shown
        top: usize,
    },
    /// Suggest spelling corrections
    Spell {
        #[clap(value_parser)]
        query: String,
        #[clap(short, long, value_parser, default_value_t = 5)]
        limit: usize,
    },
    /// Top hubs and authorities of the link graph
    Hits {
        #[clap(short, long, value_parser, default_value_t = 30)]
        top: usize,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error in config: {}", e);
            std::process::exit(2);
        }
    };

    let res = match &cli.command {
        Some(Commands::Build { corpus_dir }) => command_build_index(Path::new(corpus_dir), config),
        Some(Commands::Search { query, query_type, ranking, normalization, top }) =>
            command_search(config, query, *query_type, *ranking, *normalization, *top),
        Some(Commands::Spell { query, limit }) => command_spell(config, query, *limit),
        Some(Commands::Hits { top }) => command_hits(config, *top),
        None => command_load_index(config),
    };
    if let Err(e) = res {
        log::error!("{}", e);
        eprintln!("error in processing: {}", e);
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let index_dir = PathBuf::from(&cli.index_dir);
    match &cli.config {
        Some(path) => {
            let mut config = EngineConfig::load(Path::new(path))?;
            config.index_dir = index_dir;
            Ok(config)
        }
        None => EngineConfig::load_or_default(&index_dir),
    }
}

fn command_build_index(corpus_dir: &Path, config: EngineConfig) -> Result<()> {
    let engine = Engine::build(corpus_dir, config)?;
    println!("{} documents indexed", engine.doc_count());
    Ok(())
}

fn print_hits(hits: &[SearchHit], top: usize) {
    println!("{} results", hits.len());
    if hits.len() > top {
        println!("top {}:", top);
    }
    for (i, hit) in hits.iter().take(top).enumerate() {
        println!("{}:{} {:.5}", i + 1, hit.name, hit.score);
    }
}

fn command_search(
    config: EngineConfig,
    query: &str,
    query_type: QueryType,
    ranking: RankingType,
    normalization: NormalizationType,
    top: usize,
) -> Result<()> {
    let engine = Engine::load(config)?;
    println!("index of {} documents loaded", engine.doc_count());
    let hits = engine.search(&Query::parse(query), query_type, ranking, normalization)?;
    print_hits(&hits, top);
    Ok(())
}

fn command_spell(config: EngineConfig, query: &str, limit: usize) -> Result<()> {
    let engine = Engine::load(config)?;
    let suggestions = engine.spell_check(&Query::parse(query), limit)?;
    if suggestions.is_empty() {
        println!("no suggestions");
    }
    for suggestion in suggestions {
        println!("{}", suggestion);
    }
    Ok(())
}

fn command_hits(config: EngineConfig, top: usize) -> Result<()> {
    let engine = Engine::load(config)?;
    let (hubs, authorities) = engine.hits_top(top)?;
    println!("hubs:");
    for (title, score) in hubs {
        println!("{}: {:.5}", title, score);
    }
    println!("authorities:");
    for (title, score) in authorities {
        println!("{}: {:.5}", title, score);
    }
    Ok(())
}

fn command_load_index(config: EngineConfig) -> Result<()> {
    let engine = Engine::load(config)?;
    println!("index of {} documents loaded", engine.doc_count());
    Ok(())
}
