use anyhow::Context;
use clap::Parser;
use seeklist::config::{Config, DEFAULT_CONFIG_FILE};
use seeklist::interrupt::INTERRUPTED_EXIT_CODE;
use seeklist::session::{pause_for_operator, read_search_term};
use seeklist::{
    discover_roots, DirectoryScanner, ExtensionTables, InterruptGate, KeywordMatcher, SeekError,
    Session, SessionEnd,
};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Keyword expression; alternatives are separated by '='
    #[arg()]
    search_term: Option<String>,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Scan this root instead of probing drive letters (repeatable)
    #[arg(long = "root")]
    roots: Vec<PathBuf>,

    /// Directory receiving listings and playlists
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// File listing playable extensions, one per line
    #[arg(long)]
    playable: Option<PathBuf>,

    /// File listing unplayable extensions, one per line
    #[arg(long)]
    unplayable: Option<PathBuf>,
}

impl Args {
    fn apply_overrides(&self, config: &mut Config) {
        if !self.roots.is_empty() {
            config.roots = self.roots.clone();
        }
        if let Some(dir) = &self.results_dir {
            config.results_dir = dir.clone();
        }
        if let Some(path) = &self.playable {
            config.playable_list = path.clone();
        }
        if let Some(path) = &self.unplayable {
            config.unplayable_list = path.clone();
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(SessionEnd::EndOfInput) => ExitCode::SUCCESS,
        Ok(SessionEnd::Interrupted) => ExitCode::from(INTERRUPTED_EXIT_CODE),
        Err(e) => {
            error!("{:#}", e);
            if matches!(
                e.downcast_ref::<SeekError>(),
                Some(SeekError::Configuration { .. } | SeekError::ConfigFormat(_))
            ) {
                pause_for_operator();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<SessionEnd> {
    let mut config = Config::load(&args.config).context("Failed to load configuration")?;
    args.apply_overrides(&mut config);

    let tables = ExtensionTables::load(&config.playable_list, &config.unplayable_list)
        .context("Failed to load extension tables")?;

    let gate = InterruptGate::new();
    gate.install()?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();

    let search_term = match args.search_term {
        Some(term) => term,
        None => read_search_term(&mut input, &mut stdout)?,
    };
    let matcher = KeywordMatcher::new(&search_term);

    let roots = discover_roots(&config);
    if roots.is_empty() {
        warn!("No accessible roots to scan");
    }
    info!("Searching {} roots for '{}'", roots.len(), search_term);

    let results = DirectoryScanner::new(&matcher)
        .scan(&roots)
        .context("Scan aborted")?;
    println!("{} files", results.file_count());

    let session = Session::new(
        &results,
        &tables,
        &search_term,
        &config.results_dir,
        &gate,
    );
    Ok(session.run(&mut input, &mut stdout)?)
}
