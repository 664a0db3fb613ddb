//! Storage layer for the school portal client
//!
//! This crate provides the local key-value storage used to persist the
//! session and device-level preferences.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;

pub use kv::{keys, KvConfig, KvError, KvStore, Scope, ScopedStore};
