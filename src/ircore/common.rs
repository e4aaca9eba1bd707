use clap::ValueEnum;

pub type DocId = u32;
pub type TermOffset = u32;
pub type NodeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryType {
    Intersection,
    Phrase,
    Ranked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RankingType {
    TermWeight,
    LinkAuthority,
    Combination,
    Hits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NormalizationType {
    ByTokenCount,
    ByEuclideanLength,
}
