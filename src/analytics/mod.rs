pub mod activity;
pub mod blacklist;
pub mod certificate;
pub mod metrics;
pub mod processor;
pub mod progress;

pub use blacklist::Blacklist;
pub use certificate::{CertificateMatch, CertificateMatcher, MatchKind};
pub use metrics::WalletMetrics;
pub use processor::{process_wallets, ProcessorSettings, WalletProcessor};
pub use progress::{ProgressSink, Stage, StageTracker, TaskProgress, TaskStatus};
