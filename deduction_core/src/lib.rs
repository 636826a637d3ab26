//! # Deduction Core
//!
//! The evaluation side of a mystery case. This crate takes the player's
//! questions, quiz answers and final statements, asks a remote language model
//! to judge them against the case content from `case_rules`, and turns
//! whatever comes back into typed results.
//!
//! ## Core Components
//!
//! - **gateway**: Completion and embedding calls to the remote model
//! - **response_parser**: Tolerant decoding of model output into verdicts and scores
//! - **vector_index**: In-memory cosine-similarity index over discovered clues
//! - **pipeline**: Prompt building and the evaluation modes
//! - **history**: Correlates asynchronous results with the questions that caused them
//! - **session**: Wires the services together for one play-through
//! - **experiment**: Repeated-run harness for measuring verdict reliability
//!
//! ## Design Philosophy
//!
//! - **Fail Soft**: Evaluations never raise; transport and parse failures become `Unexpected` results
//! - **Single Attempt**: One request per evaluation, no retries
//! - **Narrow Seams**: The model sits behind one trait so it can be swapped or scripted

pub mod error;
pub mod experiment;
pub mod gateway;
pub mod history;
pub mod pipeline;
pub mod response_parser;
pub mod session;
pub mod vector_index;

pub use error::{DeductionError, Result};
pub use experiment::*;
pub use gateway::*;
pub use history::*;
pub use pipeline::*;
pub use response_parser::*;
pub use session::*;
pub use vector_index::*;
