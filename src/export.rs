//! Writes a filtered view of a [`ResultSet`] to a listing and a playlist.
//!
//! Both artifacts are UTF-16LE with a byte-order mark so that non-ASCII
//! file names survive the trip into media players and text editors.

use crate::error::{Result, SeekError};
use crate::extensions::{Classification, ExtensionTables};
use crate::matcher::{KeywordMatcher, NO_CONTEXT};
use crate::results::{ResultEntry, ResultSet};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const BYTE_ORDER_MARK: char = '\u{FEFF}';
const PLAYLIST_SUFFIX: &str = ".m3u";
const RESERVED_NAME_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];
const UNNAMED_EXPORT: &str = "_all";

/// Line-oriented UTF-16LE text sink.
pub struct Utf16Writer<W: Write> {
    inner: W,
}

impl<W: Write> Utf16Writer<W> {
    /// Wraps `inner` and writes the byte-order mark.
    pub fn new(mut inner: W) -> io::Result<Self> {
        write_utf16(&mut inner, &BYTE_ORDER_MARK.to_string())?;
        Ok(Self { inner })
    }

    pub fn write_line(&mut self, text: &str) -> io::Result<()> {
        write_utf16(&mut self.inner, text)?;
        write_utf16(&mut self.inner, "\n")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

fn write_utf16<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
    out.write_all(&bytes)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSummary {
    pub listed: usize,
    pub playlisted: usize,
    pub unknown_extensions: Vec<PathBuf>,
}

pub struct ExportWriter<'a> {
    tables: &'a ExtensionTables,
}

impl<'a> ExportWriter<'a> {
    pub fn new(tables: &'a ExtensionTables) -> Self {
        Self { tables }
    }

    pub fn export<L: Write, P: Write>(
        &self,
        results: &ResultSet,
        matcher: &KeywordMatcher,
        listing: &mut Utf16Writer<L>,
        playlist: &mut Utf16Writer<P>,
    ) -> io::Result<ExportSummary> {
        let mut summary = ExportSummary::default();
        let entries = results.entries();

        for (i, entry) in entries.iter().enumerate() {
            let path = entry.path().to_string_lossy();
            if !matcher.is_match(&path, NO_CONTEXT) {
                continue;
            }

            if entry.is_dir() {
                if !is_followed_by_own_content(entry, entries.get(i + 1)) {
                    listing.write_line(&path)?;
                    summary.listed += 1;
                }
                continue;
            }

            listing.write_line(&format!("{}\t\t{:.6}", path, entry.size_mb()))?;
            summary.listed += 1;

            let Some(ext) = extension_of(&path) else {
                continue;
            };
            match self.tables.classify(&ext) {
                Classification::Playable => {
                    playlist.write_line(&path)?;
                    summary.playlisted += 1;
                }
                Classification::Unplayable => {}
                Classification::Unknown => {
                    warn!("Unknown ext for: {}", path);
                    summary.unknown_extensions.push(entry.path().to_path_buf());
                }
            }
        }

        Ok(summary)
    }
}

fn is_followed_by_own_content(dir: &ResultEntry, next: Option<&ResultEntry>) -> bool {
    next.is_some_and(|next| dir.is_path_prefix_of(next))
}

/// Lower-cased text after the last `.` of the whole path.
fn extension_of(path: &str) -> Option<String> {
    path.rfind('.').map(|dot| path[dot + 1..].to_lowercase())
}

/// The listing / playlist file pair for one export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    results_dir: PathBuf,
    listing: PathBuf,
    playlist: PathBuf,
}

impl ExportTarget {
    pub fn new(results_dir: &Path, name: &str) -> Self {
        let file_name = safe_file_name(name);
        Self {
            results_dir: results_dir.to_path_buf(),
            listing: results_dir.join(&file_name),
            playlist: results_dir.join(format!("{}{}", file_name, PLAYLIST_SUFFIX)),
        }
    }

    pub fn listing_path(&self) -> &Path {
        &self.listing
    }

    pub fn playlist_path(&self) -> &Path {
        &self.playlist
    }

    /// Creates fresh sinks, runs the export and closes both files. Close
    /// failures are reported and otherwise ignored.
    pub fn write(
        &self,
        writer: &ExportWriter<'_>,
        results: &ResultSet,
        matcher: &KeywordMatcher,
    ) -> Result<ExportSummary> {
        fs::create_dir_all(&self.results_dir).map_err(|source| SeekError::OutputCreate {
            path: self.results_dir.clone(),
            source,
        })?;

        let mut listing = open_sink(&self.listing)?;
        let mut playlist = open_sink(&self.playlist)?;
        debug!("Writing {:?} and {:?}", self.listing, self.playlist);

        let summary = writer.export(results, matcher, &mut listing, &mut playlist)?;

        close_sink(listing, &self.listing);
        close_sink(playlist, &self.playlist);
        Ok(summary)
    }
}

fn open_sink(path: &Path) -> Result<Utf16Writer<BufWriter<File>>> {
    let create_error = |source| SeekError::OutputCreate {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(create_error)?;
    Utf16Writer::new(BufWriter::new(file)).map_err(create_error)
}

fn close_sink(mut sink: Utf16Writer<BufWriter<File>>, path: &Path) {
    let closed = sink
        .flush()
        .and_then(|_| sink.into_inner().into_inner().map_err(|e| e.into_error()))
        .and_then(|file| file.sync_all());
    if let Err(source) = closed {
        let err = SeekError::OutputClose {
            path: path.to_path_buf(),
            source,
        };
        warn!("{}", err);
    }
}

fn safe_file_name(name: &str) -> String {
    let file_name: String = name
        .chars()
        .map(|c| {
            if RESERVED_NAME_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    // "", "." and ".." would name the results directory or its parent
    if file_name.chars().all(|c| c == '.') {
        return UNNAMED_EXPORT.to_string();
    }
    file_name
}
