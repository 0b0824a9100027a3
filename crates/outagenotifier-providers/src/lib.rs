//! Feed retrieval and normalization.
//!
//! This crate turns the published outage calendar into canonical
//! [`OutageRecord`](outagenotifier_core::OutageRecord)s:
//!
//! - [`FeedSource`] - where raw content comes from ([`FeedClient`] over HTTP)
//! - [`FeedIngestor`] - fetch, raw cache on disk, normalize
//! - [`parse_ics`] / [`parse_rss`] - the two feed normalizers
//! - [`ResolvedMarker`] - manual resolution flag in descriptions
//! - [`ProviderError`] - error types, with fetch errors told apart
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │   ICS export    │    │    RSS feed     │
//! └────────┬────────┘    └────────┬────────┘
//!          │       FeedClient     │
//!          └──────────┬───────────┘
//!                     ▼
//!          ┌─────────────────────┐
//!          │  OutagesCache.*     │  raw copy, temp + rename
//!          └──────────┬──────────┘
//!            parse_ics │ parse_rss (+ DateRangeParser)
//!                     ▼
//!              ┌──────────────┐
//!              │ OutageRecord │
//!              └──────────────┘
//! ```

pub mod client;
pub mod error;
pub mod feed;
pub mod ics;
pub mod ingest;
pub mod resolved;
pub mod rss;
pub mod source;

pub use client::{FeedClient, FeedClientConfig};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use feed::FeedFormat;
pub use ics::parse_ics;
pub use ingest::{FeedIngestor, normalize};
pub use resolved::{DEFAULT_RESOLVED_MARKER, ResolvedMarker};
pub use rss::parse_rss;
pub use source::{BoxFuture, ErrorSource, FeedSource};
