//! Judge integration for problem authoring.
//!
//! Reference solutions are proven against visible test cases by an external
//! Judge0-compatible service:
//! `language` resolves ids, `batch` builds requests, `client` moves them,
//! `poll` waits for terminal statuses and `verdict` decides.

pub mod batch;
pub mod client;
pub mod config;
pub mod error;
pub mod language;
pub mod pipeline;
pub mod poll;
pub mod submission;
pub mod verdict;

pub use client::{Judge, Judge0Client};
pub use config::{JudgeConfig, PollPolicy};
pub use error::JudgeError;
pub use language::LanguageRegistry;
pub use pipeline::{validate_reference_solutions, Verdict};
