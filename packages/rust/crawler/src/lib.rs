//! Page sources and the positional enumeration engine.
//!
//! This crate provides:
//! - [`PageSource`]: the single-session browsing seam, with [`HttpPageSource`]
//! - [`IdentifierExtractor`]: location string → identifier
//! - [`build_query`]: position parameter replace-or-append, and
//!   [`resolve_location`] for bare queries against the listing base
//! - [`Pacer`]: jittered delays between remote interactions
//! - [`PositionalCollector`]: circuit-broken walk over listing positions

pub mod engine;
pub mod identifier;
pub mod pacing;
pub mod query;
pub mod source;

pub use engine::{
    CollectProgress, CollectResult, PositionOutcome, PositionalCollector, SilentCollectProgress,
    StopReason,
};
pub use identifier::IdentifierExtractor;
pub use pacing::{Pacer, jitter};
pub use query::{build_query, resolve_location};
pub use source::{
    DocumentSnapshot, ElementHandle, ElementQuery, HttpPageSource, PageSource, find_in_html,
};
