//! Block extractor trait and the two extraction strategies

use repointel_core::{BlockId, BlockMode, CodeBlock, ContentHash, LineRange, RedundancyConfig};

use crate::tokens::Tokenizer;
use crate::walker::{Corpus, SourceFile};

/// Splits one file into comparable blocks.
pub trait BlockExtractor: Send + Sync {
    fn extract(&self, file: &SourceFile) -> Vec<CodeBlock>;
}

/// Get the extractor for the configured block mode
pub fn get_extractor(config: &RedundancyConfig) -> Box<dyn BlockExtractor> {
    let tokenizer = Tokenizer::from_config(config);
    match config.block_mode {
        BlockMode::Fenced => Box::new(FencedBlockExtractor::new(tokenizer, config.min_block_lines)),
        BlockMode::WholeFile => {
            Box::new(WholeFileExtractor::new(tokenizer, config.min_block_lines))
        }
    }
}

/// Run `extractor` over every corpus file, keeping corpus order.
pub fn extract_blocks(corpus: &Corpus, extractor: &dyn BlockExtractor) -> Vec<CodeBlock> {
    corpus.files.iter().flat_map(|file| extractor.extract(file)).collect()
}

/// One block per ```` ``` ```` fenced region. Prose outside fences is ignored,
/// as are fences left open at the end of the file.
pub struct FencedBlockExtractor {
    tokenizer: Tokenizer,
    min_block_lines: u32,
}

impl FencedBlockExtractor {
    pub fn new(tokenizer: Tokenizer, min_block_lines: u32) -> Self {
        FencedBlockExtractor {
            tokenizer,
            min_block_lines,
        }
    }
}

struct OpenFence {
    language: Option<String>,
    /// 1-based line of the opening marker.
    opened_at: u32,
    body: Vec<String>,
}

impl BlockExtractor for FencedBlockExtractor {
    fn extract(&self, file: &SourceFile) -> Vec<CodeBlock> {
        let mut blocks = Vec::new();
        let mut open: Option<OpenFence> = None;

        for (idx, line) in file.content.lines().enumerate() {
            let line_no = idx as u32 + 1;
            let trimmed = line.trim_start();

            match open.take() {
                None => {
                    if let Some(info) = trimmed.strip_prefix("```") {
                        let language = info.split_whitespace().next().map(str::to_string);
                        open = Some(OpenFence {
                            language,
                            opened_at: line_no,
                            body: Vec::new(),
                        });
                    }
                }
                Some(mut fence) => {
                    let closes = trimmed
                        .strip_prefix("```")
                        .is_some_and(|rest| rest.trim().is_empty());
                    if closes {
                        if let Some(block) = self.finish(file, fence) {
                            blocks.push(block);
                        }
                    } else {
                        fence.body.push(line.to_string());
                        open = Some(fence);
                    }
                }
            }
        }

        blocks
    }
}

impl FencedBlockExtractor {
    fn finish(&self, file: &SourceFile, fence: OpenFence) -> Option<CodeBlock> {
        let lines = fence.body.len() as u32;
        if lines == 0 || lines < self.min_block_lines {
            return None;
        }
        let start = fence.opened_at + 1;
        let range = LineRange::new(start, start + lines - 1);
        let text = fence.body.join("\n");
        Some(build_block(file, range, fence.language, text, &self.tokenizer))
    }
}

/// The whole file as a single block.
pub struct WholeFileExtractor {
    tokenizer: Tokenizer,
    min_block_lines: u32,
}

impl WholeFileExtractor {
    pub fn new(tokenizer: Tokenizer, min_block_lines: u32) -> Self {
        WholeFileExtractor {
            tokenizer,
            min_block_lines,
        }
    }
}

impl BlockExtractor for WholeFileExtractor {
    fn extract(&self, file: &SourceFile) -> Vec<CodeBlock> {
        let lines = file.line_count();
        if lines == 0 || lines < self.min_block_lines {
            return Vec::new();
        }
        let text = file.content.trim_end_matches('\n').to_string();
        vec![build_block(file, LineRange::new(1, lines), None, text, &self.tokenizer)]
    }
}

fn build_block(
    file: &SourceFile,
    line_range: LineRange,
    fence_language: Option<String>,
    raw_text: String,
    tokenizer: &Tokenizer,
) -> CodeBlock {
    CodeBlock {
        id: BlockId::new(&file.path, line_range.start),
        source_file: file.path.clone(),
        line_range,
        fence_language,
        content_hash: ContentHash::of(&raw_text),
        tokens: tokenizer.tokenize(&raw_text),
        raw_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fenced() -> FencedBlockExtractor {
        FencedBlockExtractor::new(Tokenizer::default(), 3)
    }

    #[test]
    fn test_fenced_block_lines_and_language() {
        let file = SourceFile::new(
            "guide.md",
            "# Guide\n\n```python\nimport os\nprint(os.name)\nprint('done')\n```\ntext\n",
        );
        let blocks = fenced().extract(&file);

        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.line_range, LineRange::new(4, 6));
        assert_eq!(block.fence_language.as_deref(), Some("python"));
        assert_eq!(block.id.to_string(), "guide.md:4");
        assert_eq!(block.raw_text, "import os\nprint(os.name)\nprint('done')");
    }

    #[test]
    fn test_short_and_unclosed_fences_skipped() {
        let file = SourceFile::new(
            "notes.md",
            "```\none\ntwo\n```\n\n```sh\nthis fence\nnever\ncloses\n",
        );
        assert!(fenced().extract(&file).is_empty());
    }

    #[test]
    fn test_fence_without_language() {
        let file = SourceFile::new("a.md", "```\nx = 1\ny = 2\nz = 3\n```\n");
        let blocks = fenced().extract(&file);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].fence_language, None);
    }

    #[test]
    fn test_whole_file_block() {
        let file = SourceFile::new("a.py", "import os\n\nprint(os.getcwd())\n");
        let blocks = WholeFileExtractor::new(Tokenizer::default(), 3).extract(&file);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].line_range, LineRange::new(1, 3));
    }

    #[test]
    fn test_factory_follows_block_mode() {
        let file = SourceFile::new("a.md", "one\ntwo\nthree\nfour\n");
        let mut config = RedundancyConfig::default();
        assert!(get_extractor(&config).extract(&file).is_empty());

        config.block_mode = BlockMode::WholeFile;
        assert_eq!(get_extractor(&config).extract(&file).len(), 1);
    }
}
