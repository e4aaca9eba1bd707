pub mod common;
pub mod config;
pub mod dictionary;
pub mod doc;
pub mod engine;
pub mod error;
pub mod index;
pub mod kgram;
pub mod query;
pub mod ranking;
pub mod search;
pub mod spelling;
pub mod tokenizer;
pub mod utils;

pub use common::{DocId, NodeId, NormalizationType, QueryType, RankingType, TermOffset};
pub use error::{IrError, Result};

pub const CFG_NAME: &str = ".pircfg";
