//! Corpus reading, block extraction, file statistics and config loading

pub mod config;
pub mod extractor;
pub mod stats;
pub mod tokens;
pub mod walker;


#[cfg(test)]
pub mod test_utils;

pub use config::{load_config, load_manifest, parse_manifest};
pub use extractor::{
    extract_blocks, get_extractor, BlockExtractor, FencedBlockExtractor, WholeFileExtractor,
};
pub use stats::{file_stats, FileStats};
pub use tokens::Tokenizer;
pub use walker::{read_corpus, Corpus, SourceFile};
