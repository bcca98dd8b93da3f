//! # parlasent — Parliamentary speech sentiment corpus
//!
//! Builds a topic-filtered, sentiment-annotated corpus of parliamentary
//! speeches about AI and military technology, persists it as a CSV snapshot
//! and serves dashboard datasets over it.
//!
//! ## Architecture
//!
//! - **[`config`]** — Configuration loading, validation and defaults
//! - **[`corpus`]** — Topic patterns, document selection, speech/metadata tables
//! - **[`sentiment`]** — Sentiment scorer trait (VADER lexicon, mock for tests)
//! - **[`pipeline`]** — Flagging, scoring, metadata join and derived fields
//! - **[`snapshot`]** — CSV write and read-back of the enriched table
//! - **[`dashboard`]** — Filters, chart datasets and the HTTP API

pub mod config;
pub mod corpus;
pub mod dashboard;
pub mod pipeline;
pub mod sentiment;
pub mod snapshot;
