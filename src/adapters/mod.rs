//! Adapters - Implementations of port interfaces.
//!
//! - `ai` - language-model providers (Anthropic, OpenAI, failover, mock)
//! - `catalog` - YAML-seeded campus directory and catalogs
//! - `http` - axum API over the conversation registry
//! - `postgres` - submission store
//! - `storage` - in-memory and file-backed stores

pub mod ai;
pub mod catalog;
pub mod http;
pub mod postgres;
pub mod storage;
