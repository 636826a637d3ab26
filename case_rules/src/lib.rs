//! # Case Rules
//!
//! The "Case File" crate - contains the clue definitions, the hidden story truth
//! and the closed verdict taxonomy a mystery is judged with.
//! This crate is the single source of truth for case content and does not contain any AI logic.

pub mod clues;
pub mod story;
pub mod verdict;

pub use clues::*;
pub use story::*;
pub use verdict::*;
