use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Width of the `_<index>` suffix every output filename carries.
const INDEX_SUFFIX_LEN: usize = 2;

/// Post ids that already have files in the output directory.
///
/// Ids are recovered from filenames by dropping the extension and the last two
/// characters. This only holds while the media index is a single digit:
/// `x-123_10.jpg` maps to a stray id `x-123_`. A post with ten or more items is
/// still found through its `_0`..`_9` files, and is only missed once those are
/// gone. Kept as-is until the naming scheme is settled.
#[derive(Debug, Default)]
pub struct Ledger {
    ids: HashSet<String>,
    files_seen: usize,
}

impl Ledger {
    /// Lists `dir` and derives one id per entry.
    pub fn scan(dir: &Path) -> Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to list {}", dir.display()))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        Ok(Self::from_filenames(names))
    }

    pub fn from_filenames<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ledger = Self::default();
        for name in names {
            ledger.files_seen += 1;
            ledger.ids.insert(post_id_from_filename(name.as_ref()));
        }
        ledger
    }

    pub fn contains(&self, post_id: &str) -> bool {
        self.ids.contains(post_id)
    }

    pub fn insert(&mut self, post_id: &str) {
        self.ids.insert(post_id.to_string());
    }

    /// Number of directory entries the ledger was built from.
    pub fn files_seen(&self) -> usize {
        self.files_seen
    }
}

pub fn post_id_from_filename(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let keep = stem.chars().count().saturating_sub(INDEX_SUFFIX_LEN);
    stem.chars().take(keep).collect()
}
