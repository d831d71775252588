//! Skincare advisor - rule-based question answering over the dermis knowledge base
//!
//! A question flows through three stages:
//! 1. **Parsing** (`conversation`) - normalize, tokenize, scan for ingredient mentions
//! 2. **Classification** (`classifier`) - ordered first-match rules pick a `QueryType`
//! 3. **Answering** (`advisor`) - per-type answer composed from knowledge base facts
//!
//! # Grounding
//!
//! Every factual claim in an answer comes from the knowledge base, and `sources` lists the
//! edges or ingredient records it was drawn from. There is no language model in the loop.

pub mod advisor;
pub mod classifier;
pub mod conversation;

pub use advisor::{AdvisorAgent, AdvisorResponse, AdvisorSettings};
pub use classifier::{classify, QuerySignals, QueryType};
pub use conversation::ParsedQuestion;
