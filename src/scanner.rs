use crate::config::Config;
use crate::error::{Result, SeekError};
use crate::matcher::KeywordMatcher;
use crate::results::ResultSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Walks roots in search mode: names are tested against the matcher, a
/// matching directory switches its whole subtree to collect mode, and
/// non-matching directories are only descended through.
pub struct DirectoryScanner<'a> {
    matcher: &'a KeywordMatcher,
}

struct ListedEntry {
    path: PathBuf,
    name: String,
    is_dir: bool,
    size: u64,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(matcher: &'a KeywordMatcher) -> Self {
        Self { matcher }
    }

    pub fn scan(&self, roots: &[PathBuf]) -> Result<ResultSet> {
        let mut results = ResultSet::new();
        for root in roots {
            self.scan_into(root, &mut results)?;
        }
        info!(
            "Found {} matching files ({} entries)",
            results.file_count(),
            results.len()
        );
        Ok(results)
    }

    pub fn scan_into(&self, root: &Path, results: &mut ResultSet) -> Result<()> {
        info!("Scanning {:?}", root);
        self.search(root, results)
    }

    fn search(&self, dir: &Path, results: &mut ResultSet) -> Result<()> {
        let context = dir.to_string_lossy();
        for entry in list_dir(dir) {
            if self.matcher.is_match(&entry.name, &context) {
                if entry.is_dir {
                    collect_all(&entry.path, results)?;
                } else {
                    debug!("Matched file {:?}", entry.path);
                    results.add_file(entry.path, entry.size);
                }
            } else if entry.is_dir {
                self.search(&entry.path, results)?;
            }
        }
        Ok(())
    }
}

/// Immediate children of `dir` in file-name order. A directory that cannot
/// be listed counts as empty.
fn list_dir(dir: &Path) -> Vec<ListedEntry> {
    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(source) => {
            let err = SeekError::Enumeration {
                path: dir.to_path_buf(),
                source,
            };
            debug!("{}", err);
            return Vec::new();
        }
    };

    let mut entries = Vec::new();
    for item in read_dir {
        let entry = match item {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry in {:?}: {}", dir, e);
                continue;
            }
        };
        // DirEntry::metadata does not traverse symlinks
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("Skipping {:?}: {}", entry.path(), e);
                continue;
            }
        };
        entries.push(ListedEntry {
            path: entry.path(),
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: metadata.is_dir(),
            size: if metadata.is_dir() { 0 } else { metadata.len() },
        });
    }
    entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    entries
}

/// Records `dir` and every descendant in pre-order, unconditionally.
pub(crate) fn collect_all(dir: &Path, results: &mut ResultSet) -> Result<()> {
    debug!("Collecting everything under {:?}", dir);
    let mut seen_root = false;
    for item in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) if seen_root => {
                debug!("Cannot list {:?}: {}", err.path().unwrap_or(dir), err);
                continue;
            }
            Err(err) => {
                return Err(SeekError::Integrity {
                    path: dir.to_path_buf(),
                    reason: err.to_string(),
                });
            }
        };
        seen_root = true;

        if entry.file_type().is_dir() {
            results.add_dir(entry.into_path());
        } else {
            let size = entry
                .metadata()
                .map_err(|e| SeekError::Integrity {
                    path: entry.path().to_path_buf(),
                    reason: e.to_string(),
                })?
                .len();
            results.add_file(entry.into_path(), size);
        }
    }
    Ok(())
}

/// Explicit roots win over drive probing; either way only roots that can
/// currently be listed are returned.
pub fn discover_roots(config: &Config) -> Vec<PathBuf> {
    let candidates = if config.roots.is_empty() {
        config.drives.root_prefixes()
    } else {
        config.roots.clone()
    };

    candidates
        .into_iter()
        .filter(|root| match fs::read_dir(root) {
            Ok(_) => true,
            Err(e) => {
                debug!("Root {:?} not accessible: {}", root, e);
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(path: &Path, len: usize) {
        let mut f = File::create(path).unwrap();
        f.write_all(&vec![b'x'; len]).unwrap();
    }

    fn setup_library(base: &Path) {
        fs::create_dir_all(base.join("Beatles").join("cd1")).unwrap();
        fs::create_dir_all(base.join("other")).unwrap();
        write_file(&base.join("Beatles").join("cd1").join("01.mp3"), 2048);
        write_file(&base.join("Beatles").join("cover.jpg"), 10);
        write_file(&base.join("other").join("beatles_live.mp3"), 4);
        write_file(&base.join("other").join("notes.txt"), 4);
        write_file(&base.join("z.txt"), 1);
    }

    fn relative_paths(results: &ResultSet, base: &Path) -> Vec<(String, bool)> {
        results
            .entries()
            .iter()
            .map(|e| {
                let rel = e.path().strip_prefix(base).unwrap();
                let rel = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                (rel, e.is_dir())
            })
            .collect()
    }

    #[test]
    fn test_matching_dir_collects_whole_subtree() {
        let dir = tempdir().unwrap();
        setup_library(dir.path());
        let matcher = KeywordMatcher::new("beatles");

        let results = DirectoryScanner::new(&matcher)
            .scan(&[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(
            relative_paths(&results, dir.path()),
            vec![
                ("Beatles".to_string(), true),
                ("Beatles/cd1".to_string(), true),
                ("Beatles/cd1/01.mp3".to_string(), false),
                ("Beatles/cover.jpg".to_string(), false),
                ("other/beatles_live.mp3".to_string(), false),
            ]
        );
        assert_eq!(results.file_count(), 3);
        assert_eq!(results.entries()[0].size_mb(), 0.0);
        assert!((results.entries()[2].size_mb() - 2048.0 / 1024.0 / 1024.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_match_gives_empty_results() {
        let dir = tempdir().unwrap();
        setup_library(dir.path());
        let matcher = KeywordMatcher::new("mozart");

        let results = DirectoryScanner::new(&matcher)
            .scan(&[dir.path().to_path_buf()])
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(results.file_count(), 0);
    }

    #[test]
    fn test_non_matching_dirs_are_descended() {
        let dir = tempdir().unwrap();
        let deep = dir.path().join("a").join("b").join("c");
        fs::create_dir_all(&deep).unwrap();
        write_file(&deep.join("target.flac"), 1);
        write_file(&dir.path().join("a").join("skip.flac"), 1);
        let matcher = KeywordMatcher::new("TARGET");

        let results = DirectoryScanner::new(&matcher)
            .scan(&[dir.path().to_path_buf()])
            .unwrap();
        assert_eq!(
            relative_paths(&results, dir.path()),
            vec![("a/b/c/target.flac".to_string(), false)]
        );
    }

    #[test]
    fn test_unlistable_root_counts_as_empty() {
        let dir = tempdir().unwrap();
        let matcher = KeywordMatcher::new("");
        let results = DirectoryScanner::new(&matcher)
            .scan(&[dir.path().join("missing")])
            .unwrap();
        assert!(results.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdir_does_not_stop_siblings() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("a_locked");
        let open = dir.path().join("b_open");
        fs::create_dir(&locked).unwrap();
        fs::create_dir(&open).unwrap();
        write_file(&locked.join("target.mp3"), 1);
        write_file(&open.join("target.mp3"), 1);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // root ignores directory permissions
        let enforced = fs::read_dir(&locked).is_err();

        let matcher = KeywordMatcher::new("target");
        let scanned = DirectoryScanner::new(&matcher).scan(&[dir.path().to_path_buf()]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let found = relative_paths(&scanned.unwrap(), dir.path());
        assert!(found.contains(&("b_open/target.mp3".to_string(), false)));
        if enforced {
            assert_eq!(found, vec![("b_open/target.mp3".to_string(), false)]);
        }
    }

    #[test]
    fn test_collect_all_on_vanished_dir_is_integrity_error() {
        let dir = tempdir().unwrap();
        let mut results = ResultSet::new();
        let err = collect_all(&dir.path().join("gone"), &mut results).unwrap_err();
        assert!(matches!(err, SeekError::Integrity { .. }));
        assert!(results.is_empty());
    }

    #[test]
    fn test_discover_explicit_roots_filters_inaccessible() {
        let dir = tempdir().unwrap();
        let config = Config {
            roots: vec![dir.path().to_path_buf(), dir.path().join("nope")],
            ..Config::default()
        };
        assert_eq!(discover_roots(&config), vec![dir.path().to_path_buf()]);
    }
}
