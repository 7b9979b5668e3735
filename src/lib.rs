//! # feedroll
//!
//! A scheduled batch job that keeps a rolling, day-grouped dataset of new
//! videos from a fixed list of channels.
//!
//! Each run loads the previous dataset, resolves the configured channel
//! URLs, reads every channel's public feed, keeps only videos that are not
//! already stored, merges them in under the retention window, optionally
//! regenerates digests for days whose content changed, and writes the
//! result back atomically.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────────────┐   ┌───────────┐
//! │   Resolver   │──▶│  Feed source │──▶│ filter ▸ merge ▸  │──▶│ JSON file │
//! │ URL → id     │   │ Atom feeds   │   │ fingerprint       │   │ (atomic)  │
//! └──────────────┘   └──────────────┘   └─────────┬─────────┘   └───────────┘
//!                                                 ▼
//!                                         ┌──────────────┐
//!                                         │ Digest (AI)  │
//!                                         └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! feedroll sources --resolve     # check the configured channels
//! feedroll run                   # one full cycle
//! feedroll stats                 # what the dataset holds now
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Dataset types (re-exported from `feedroll-core`) |
//! | [`traits`] | Collaborator traits |
//! | [`resolver`] | Channel URL → channel id |
//! | [`feed`] | Atom feed fetching and parsing |
//! | [`digest`] | Daily digest generation |
//! | [`file_store`] | Atomic JSON file store |
//! | [`pipeline`] | Run orchestration |
//! | [`progress`] | Fetch progress reporting |
//! | [`stats`] | Dataset summaries |
//! | [`sources`] | Channel listing |

pub mod config;
pub mod digest;
pub mod feed;
pub mod file_store;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod sources;
pub mod stats;
pub mod traits;
