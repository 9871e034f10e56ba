pub mod credits;
pub mod document;
pub mod live_feed;
pub mod report;
pub mod workspace;

pub use credits::{BillingRecord, CreditError, CreditLedger};
pub use document::{DocumentKind, ExtractedDocument};
pub use live_feed::{LiveFeedEntry, LiveFeedForm};
pub use report::{Report, SourceRef};
pub use workspace::ResearchWorkspace;
