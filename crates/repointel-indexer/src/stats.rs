//! Line-based structural statistics per file
//!
//! Counting is heuristic and marker driven, no parsing:
//!
//! - markup files: headings are sections; function and import markers count
//!   only inside fenced code
//! - data files (YAML, TOML, JSON, SQL): only lines are counted
//! - everything else: function, type-declaration and import markers on any line

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::walker::SourceFile;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,3}\s+\S").expect("valid regex literal"));

// def / fn / function / func, with the usual visibility and async qualifiers
// and Go method receivers.
static FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(export\s+)?(pub(\([^)]*\))?\s+)?((async|unsafe|const|static)\s+)*(def|fn|function|func)\s+(\([^)]*\)\s*)?\*?\s*[A-Za-z_]\w*",
    )
    .expect("valid regex literal")
});

static TYPE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(export\s+)?(pub(\([^)]*\))?\s+)?((abstract|public|final|data)\s+)*(class|struct|enum|impl|interface|trait)\b")
        .expect("valid regex literal")
});

static IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(import\s|from\s+\S+\s+import\s|(pub\s+)?use\s+\w|#\s*include\s*[<"]|.*\brequire\s*\()"#)
        .expect("valid regex literal")
});

/// Raw marker counts for one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStats {
    pub line_count: u32,
    pub function_count: u32,
    pub section_count: u32,
    pub import_count: u32,
}

pub fn file_stats(file: &SourceFile) -> FileStats {
    let mut stats = FileStats {
        line_count: file.line_count(),
        ..FileStats::default()
    };

    if file.language.is_data() {
        return stats;
    }

    if file.language.is_markup() {
        let mut in_fence = false;
        for line in file.content.lines() {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                continue;
            }
            if in_fence {
                count_code_line(line, &mut stats);
            } else if HEADING.is_match(line) {
                stats.section_count += 1;
            }
        }
        return stats;
    }

    for line in file.content.lines() {
        count_code_line(line, &mut stats);
        if TYPE_DECL.is_match(line) {
            stats.section_count += 1;
        }
    }
    stats
}

fn count_code_line(line: &str, stats: &mut FileStats) {
    if FUNCTION.is_match(line) {
        stats.function_count += 1;
    }
    if IMPORT.is_match(line) {
        stats.import_count += 1;
    }
}
