//! # Cabinet Architecture
//!
//! Cabinet is a **personal records library** with a CLI client. The library
//! owns every rule about records (validation, identity, storage layout,
//! interchange); the binary only parses input and prints results.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments and shell lines, renders output         │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Normalizes inputs (textual ids, field names, formats)    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One function per operation, returns CmdResult            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - RecordStore trait                                        │
//! │  - MemoryStore, FileStore, LoggedStore, TimedStore          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stores are constructed once by [`store::open_store`] and handed to the
//! API. Nothing in the library keeps a global store.
//!
//! ## No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never exits
//! the process. Diagnostics go through `tracing`; the binary decides where
//! they end up.
//!
//! ## Module Overview
//!
//! - [`api`]: the API facade
//! - [`commands`]: one module per operation
//! - [`store`]: storage trait, backends, and decorators
//! - [`validation`]: per-field validators, composition, and rule presets
//! - [`snapshot`]: point-in-time copies and CSV/XML interchange
//! - [`model`]: `Record`, `RecordFields`, and field parsing
//! - [`query`]: `where`/`set`/column clauses for delete, update and select
//! - [`generator`]: random valid records
//! - [`config`]: `cabinet.json` handling
//! - [`error`]: error types
//! - `cli`: argument parsing, interactive shell, and rendering for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod query;
pub mod snapshot;
pub mod store;
pub mod validation;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
