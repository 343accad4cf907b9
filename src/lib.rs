// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod config;
pub mod digest;
pub mod feed;
pub mod notify;
pub mod run;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{collect_headlines, DedupeBy, FeedFailure};
pub use crate::config::{Config, Overrides};
pub use crate::digest::{render, Digest, RenderedDigest};
pub use crate::feed::{FeedEntry, FeedSource, FetchError, Fetcher};
pub use crate::notify::{dispatch_all, DeliveryResult, Dispatcher};
pub use crate::run::{run, RunSummary};
