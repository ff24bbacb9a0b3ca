//! # rag-recommender
//!
//! A small web application recommending restaurant dishes or meal plans.
//! Candidates come from semantic search in a hosted vector database and are
//! re-ranked by a hosted generative model.
//!
//! ## Architecture
//!
//! ```text
//!        ┌────────────────────┐
//!        │ free text / form   │
//!        └─────────┬──────────┘
//!                  ▼
//!        ┌────────────────────┐
//!        │ Query Normalizer   │  submitted = false → "not ready"
//!        └─────────┬──────────┘
//!                  ▼
//!        ┌────────────────────┐
//!        │ Retrieval          │  near-text, limit 10, session closed
//!        │ (Weaviate)         │  on every path; writes resp.json
//!        └─────────┬──────────┘
//!                  │ CandidateSet (relevance order)
//!                  ▼
//!        ┌────────────────────┐
//!        │ Ranking (LLM)      │  JSON validated against candidates;
//!        │                    │  failure → unranked fallback
//!        └─────────┬──────────┘
//!                  ▼
//!        ┌────────────────────┐
//!        │ Top pick + others  │  optional dish illustration
//!        └────────────────────┘
//! ```
//!
//! "Ask AI" skips retrieval and sends the whole catalog to the model;
//! "I'm Feeling Lucky" picks a random catalog entry without any network call.
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for services, paths and variant
//! - [`models`] - Fixed-shape records, CandidateSet, request/response types
//! - [`catalog`] - Static menu / plan store and random pick
//! - [`query`] - Free-text and profile-form query normalization
//! - [`retrieval`] - Vector search seam, Weaviate client, debug artifact
//! - [`llm::generate`] - Gemini, OpenAI-compatible and Ollama completions
//! - [`llm::rerank`] - Candidate re-ranking with response validation
//! - [`llm::ask`] - Free-form recommendations over the whole catalog
//! - [`llm::image`] - Text-to-image illustration of the top dish
//! - [`pipeline`] - The Custom query flow tying the above together
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state built once at startup

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod retrieval;
pub mod state;
