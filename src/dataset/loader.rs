use super::TestExample;
use crate::error::{EvalError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Find the JSONL shards of a split.
///
/// A file path is returned as-is; a directory is walked recursively for
/// `*.jsonl` files, returned in path order so loading is reproducible. Any
/// entry the walk cannot read (e.g. a broken symlink) fails discovery.
pub fn discover_shards(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        return Err(EvalError::Dataset(format!(
            "Split path does not exist: {}",
            root.display()
        )));
    }

    let mut shards = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        // No partial splits
        let entry = entry.map_err(|e| {
            EvalError::Dataset(format!("Cannot read split under {}: {}", root.display(), e))
        })?;
        let path = entry.into_path();
        let is_jsonl = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("jsonl"))
            .unwrap_or(false);
        if is_jsonl && path.is_file() {
            shards.push(path);
        }
    }
    shards.sort();

    log::info!("Discovered {} shards in {}", shards.len(), root.display());
    Ok(shards)
}

/// Load every record of a split.
///
/// Blank lines are skipped; a malformed line fails the whole load with its
/// file and line number.
pub fn load_split(root: &Path) -> Result<Vec<TestExample>> {
    let mut examples = Vec::new();

    for shard in discover_shards(root)? {
        let content = std::fs::read_to_string(&shard)?;
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let example: TestExample = serde_json::from_str(line).map_err(|e| {
                EvalError::Dataset(format!("{}:{}: {}", shard.display(), line_no + 1, e))
            })?;
            examples.push(example);
        }
    }

    log::info!("Loaded {} examples from {}", examples.len(), root.display());
    Ok(examples)
}
