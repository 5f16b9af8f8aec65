//! Pull request collaborators and the top-level check runner.

pub mod metadata;
pub mod publish;
pub mod runner;
pub mod sink;
pub mod source;

pub use metadata::PrMetadata;
pub use publish::{render, CollectingPublisher, ReportPublisher, StdoutPublisher};
pub use runner::{check_pr, RunOutcome, LOCAL_SKIP_MESSAGE};
pub use sink::{ConsoleMessenger, Level, Messenger, Notification, RecordingMessenger, Tee};
pub use source::{Commit, DiffLines, PrDataSource, SourceError};
