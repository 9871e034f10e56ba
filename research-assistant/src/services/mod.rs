pub mod export;
pub mod extraction;
pub mod metrics;
pub mod prompt;
pub mod providers;
pub mod report;
pub mod research;

pub use research::{ResearchRequest, ResearchService, Upload};
