use std::path::{Path, PathBuf};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ResultEntry {
    path: PathBuf,
    size_mb: f64,
    is_dir: bool,
}

impl ResultEntry {
    pub fn file(path: PathBuf, size_bytes: u64) -> Self {
        Self {
            path,
            size_mb: size_bytes as f64 / BYTES_PER_MB,
            is_dir: false,
        }
    }

    pub fn dir(path: PathBuf) -> Self {
        Self {
            path,
            size_mb: 0.0,
            is_dir: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_mb(&self) -> f64 {
        self.size_mb
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    /// Literal byte-prefix test on the raw path, not a component-wise one.
    pub fn is_path_prefix_of(&self, other: &ResultEntry) -> bool {
        other
            .path
            .as_os_str()
            .as_encoded_bytes()
            .starts_with(self.path.as_os_str().as_encoded_bytes())
    }
}

/// Append-only, in discovery order. A matched directory is always followed
/// directly by its whole subtree.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    content: Vec<ResultEntry>,
    file_count: usize,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ResultEntry) {
        if !entry.is_dir {
            self.file_count += 1;
        }
        self.content.push(entry);
    }

    pub fn add_file(&mut self, path: PathBuf, size_bytes: u64) {
        self.push(ResultEntry::file(path, size_bytes));
    }

    pub fn add_dir(&mut self, path: PathBuf) {
        self.push(ResultEntry::dir(path));
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.content
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
