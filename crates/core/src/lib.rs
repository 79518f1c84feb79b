//! Larkspur Core - Shared types library.
//!
//! This crate provides common types used across the Larkspur Mercantile
//! storefront:
//! - `storefront` - Public-facing e-commerce site
//! - `integration-tests` - End-to-end tests over the in-memory store
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no store access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails,
//!   statuses, and the heterogeneous document timestamp

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
