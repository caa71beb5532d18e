pub mod config;
pub mod error;
pub mod export;
pub mod extensions;
pub mod interrupt;
pub mod matcher;
pub mod results;
pub mod scanner;
pub mod session;

pub use config::Config;
pub use error::{Result, SeekError};
pub use export::{ExportSummary, ExportTarget, ExportWriter, Utf16Writer};
pub use extensions::{Classification, ExtensionTables};
pub use interrupt::InterruptGate;
pub use matcher::{canonicalize, KeywordMatcher, MatchOutcome};
pub use results::{ResultEntry, ResultSet};
pub use scanner::{discover_roots, DirectoryScanner};
pub use session::{Session, SessionEnd};
