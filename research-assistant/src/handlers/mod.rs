pub mod app;
pub mod export;
pub mod htmx;
pub mod live_feed;
pub mod metrics;
pub mod research;
pub mod views;
pub mod workspace;
