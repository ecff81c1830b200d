//! Test utilities and fixtures for the memodex crates.
//!
//! This crate provides:
//! - The book catalog fixture used across the indexer tests
//! - Seeded random record generation and list mutation helpers
//!
//! # Usage
//!
//! This crate is intended for the memodex test suites and development tools only.
//! Use it from integration tests (`tests/`), not from unit tests inside
//! `memodex-index`, so that both sides see the same `memodex-index` types.

pub mod books;
pub mod data_gen;
