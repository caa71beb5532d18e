//! The read-export loop that runs once the scan is done.

use crate::error::{Result, SeekError};
use crate::export::{ExportTarget, ExportWriter};
use crate::extensions::ExtensionTables;
use crate::interrupt::InterruptGate;
use crate::matcher::{canonicalize, KeywordMatcher};
use crate::results::ResultSet;
use inquire::Text;
use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;
use tracing::info;

pub const PRINT_ALL_COMMAND: &str = "just print";
const SEARCH_TERM_PROMPT: &str = "Search term: ";
const KEYWORD_PROMPT: &str = "Keyword: (empty for all, or print all)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    PrintAll,
    /// `keyword` filters the results and also names the output files.
    Export { keyword: String },
}

impl Command {
    pub fn parse(line: &str, initial_term: &str) -> Self {
        match line {
            PRINT_ALL_COMMAND => Command::PrintAll,
            "" => Command::Export {
                keyword: canonicalize(initial_term),
            },
            keyword => Command::Export {
                keyword: keyword.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    EndOfInput,
    Interrupted,
}

pub struct Session<'a> {
    results: &'a ResultSet,
    writer: ExportWriter<'a>,
    initial_term: &'a str,
    results_dir: &'a Path,
    gate: &'a InterruptGate,
}

impl<'a> Session<'a> {
    pub fn new(
        results: &'a ResultSet,
        tables: &'a ExtensionTables,
        initial_term: &'a str,
        results_dir: &'a Path,
        gate: &'a InterruptGate,
    ) -> Self {
        Self {
            results,
            writer: ExportWriter::new(tables),
            initial_term,
            results_dir,
            gate,
        }
    }

    pub fn run<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> Result<SessionEnd> {
        loop {
            writeln!(out, "{}", KEYWORD_PROMPT)?;
            out.flush()?;
            let Some(line) = read_line(input)? else {
                return Ok(SessionEnd::EndOfInput);
            };

            match Command::parse(&line, self.initial_term) {
                Command::PrintAll => {
                    for entry in self.results.entries() {
                        writeln!(out, "{}", entry.path().display())?;
                    }
                }
                Command::Export { keyword } => {
                    let Some(target) = self.export(&keyword)? else {
                        return Ok(SessionEnd::Interrupted);
                    };
                    writeln!(out, "File {} printed", target.listing_path().display())?;
                    if self.gate.is_pending() {
                        return Ok(SessionEnd::Interrupted);
                    }
                }
            }
        }
    }

    /// `None` when an interrupt arrived before the export could start.
    fn export(&self, keyword: &str) -> Result<Option<ExportTarget>> {
        let target = ExportTarget::new(self.results_dir, keyword);
        let matcher = KeywordMatcher::new(keyword);

        let summary = {
            let Some(_guard) = self.gate.hold() else {
                return Ok(None);
            };
            target.write(&self.writer, self.results, &matcher)?
        };
        info!(
            "Exported {} lines ({} playable, {} unknown extensions) for '{}'",
            summary.listed,
            summary.playlisted,
            summary.unknown_extensions.len(),
            keyword
        );
        Ok(Some(target))
    }
}

/// Prompts for the initial search term when none was given on the command line.
pub fn read_search_term<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<String> {
    write!(out, "{}", SEARCH_TERM_PROMPT)?;
    out.flush()?;
    read_line(input)?.ok_or_else(|| SeekError::Prompt("no search term on standard input".into()))
}

/// One line without its terminator; `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}

/// Keeps a console window open long enough to read a fatal startup error.
pub fn pause_for_operator() {
    if !std::io::stdin().is_terminal() {
        return;
    }
    let _ = Text::new("Press Enter to exit").prompt();
}
