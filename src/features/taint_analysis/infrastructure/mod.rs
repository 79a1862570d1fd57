//! Infrastructure: reference implementations of the core components that
//! consume the `ports` traits — C4 through C7, plus the reporting
//! pipeline and a usable `SummaryStore`.

pub mod footprint;
pub mod reporting;
pub mod summary_apply;
pub mod summary_build;
pub mod summary_store;
pub mod transfer;

pub use summary_apply::{apply_summary, to_caller};
pub use summary_build::build_summary;
pub use summary_store::{GuardedSummaryStore, InMemorySummaryStore, SummaryStoreStats};
pub use transfer::StandardTransferFunction;
