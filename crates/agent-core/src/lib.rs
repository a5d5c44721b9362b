//! Core agent primitives: the tool-invocation loop, its boundary contracts,
//! and the model availability cache.
//!
//! This crate is transport-agnostic: the model endpoint, the tool backend, and
//! the catalog lookup are all reached through narrow traits so the loop can be
//! driven deterministically in tests. `llm` provides the concrete HTTP
//! adapters for an OpenAI-style chat endpoint.

pub mod agent;
pub mod catalog;
pub mod config;
pub mod llm;
