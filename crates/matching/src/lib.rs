//! Name matching for modelmap
//!
//! This crate provides:
//! - tokenize(): split member names into lower-cased tokens
//! - score(): rate a candidate source path against a destination
//! - best(): choose among candidates, reporting ties as ambiguous
//!
//! Matching is pure: no caches, no configuration beyond the
//! [`MatchingStrategy`](modelmap_core::MatchingStrategy) and
//! [`NameTokenizer`](modelmap_core::NameTokenizer) passed in.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod matcher;
pub mod tokenizer;

pub use matcher::{best, score, Outcome, Score};
pub use tokenizer::tokenize;
