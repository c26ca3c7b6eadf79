//! Segment file naming and directory scanning, shared by [`super::writer`]
//! and [`super::reader`].

use std::path::{Path, PathBuf};

/// Path of segment `seq` within `dir`: `log_<seq>.log`.
pub fn segment_path(dir: &Path, seq: u64) -> PathBuf {
    dir.join(format!("log_{}.log", seq))
}

/// Every segment number present in `dir`, sorted ascending.
pub fn list_segment_numbers(dir: &Path) -> std::io::Result<Vec<u64>> {
    let mut seqs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if let Some(stripped) = name.strip_prefix("log_").and_then(|s| s.strip_suffix(".log")) {
            if let Ok(seq) = stripped.parse::<u64>() {
                seqs.push(seq);
            }
        }
    }
    seqs.sort_unstable();
    Ok(seqs)
}
