//! Entry catalog: the ordered `(source_id, text)` table that sits parallel to
//! the vector index.
//!
//! On disk it is UTF-8, one entry per line, `source_id\tentry_text`. Line order
//! is the entry's ordinal and must match the order vectors were written to the
//! index.
use anyhow::{anyhow, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Error;
use crate::types::{CorpusEntry, IndexHit, SearchHit};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryCatalog {
    entries: Vec<CorpusEntry>,
}

impl EntryCatalog {
    pub fn new(entries: Vec<CorpusEntry>) -> Self {
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_prefix(path, None)
    }

    /// Load a catalog file, optionally removing a leading prefix from every
    /// `source_id` (e.g. `../reference_book/`).
    pub fn load_with_prefix(path: &Path, strip_source_prefix: Option<&str>) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read catalog {}: {}", path.display(), e))?;
        let catalog = Self::parse(&content, strip_source_prefix)?;
        info!(path = %path.display(), entries = catalog.len(), "loaded entry catalog");
        Ok(catalog)
    }

    pub fn parse(content: &str, strip_source_prefix: Option<&str>) -> Result<Self, Error> {
        let mut entries = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let fields: Vec<&str> = line.trim().split('\t').collect();
            if fields.len() != 2 {
                return Err(Error::MalformedCatalogLine {
                    line: idx + 1,
                    fields: fields.len(),
                });
            }
            let source = match strip_source_prefix {
                Some(prefix) => fields[0].strip_prefix(prefix).unwrap_or(fields[0]),
                None => fields[0],
            };
            entries.push(CorpusEntry::new(source, fields[1]));
        }
        Ok(Self { entries })
    }

    /// Build a catalog from every `*.txt` file under `root` (sorted by path).
    /// Each non-empty line becomes one entry whose `source_id` is the file path.
    pub fn from_directory(root: &Path) -> Result<Self> {
        let files = list_txt_files(root);
        if files.is_empty() {
            return Err(
                Error::NotFound(format!("no .txt files under {}", root.display())).into(),
            );
        }
        let mut entries = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            debug!(
                "Processing file {}/{}: {}",
                file_index + 1,
                files.len(),
                file_path.display()
            );
            let content = read_file_content(file_path)?;
            let source_id = file_path.to_string_lossy().to_string();
            for line in content.lines() {
                let text = line.trim();
                if text.is_empty() {
                    continue;
                }
                entries.push(CorpusEntry::new(source_id.clone(), text.replace('\t', " ")));
            }
        }
        info!("Processed {} files into {} entries", files.len(), entries.len());
        Ok(Self { entries })
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut out = std::io::BufWriter::new(fs::File::create(path)?);
        for entry in &self.entries {
            writeln!(out, "{}\t{}", entry.source_id, entry.text)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&CorpusEntry> {
        self.entries.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorpusEntry> {
        self.entries.iter()
    }

    pub fn texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }

    /// Map an index hit back to its catalog row.
    pub fn resolve(&self, hit: IndexHit) -> Result<SearchHit, Error> {
        let entry = self
            .entries
            .get(hit.position)
            .ok_or_else(|| Error::NotFound(format!("catalog position {}", hit.position)))?;
        Ok(SearchHit {
            entry: entry.clone(),
            distance: hit.distance,
        })
    }
}

fn read_file_content(file_path: &Path) -> Result<String> {
    match fs::read_to_string(file_path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
    }
}

fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("txt"))
        .map(|e| e.path().to_path_buf())
        .collect();
    txt_files.sort();
    txt_files
}
