//! Easy Kart Core - Shared types and the storefront derivation pipeline.
//!
//! This crate provides the records exchanged with the remote catalog API and
//! the pure functions the storefront derives its views from:
//! - [`catalog`] - Category groups and per-group product sections
//! - [`membership`] - Cart and wishlist membership predicates
//! - [`totals`] - Cart subtotal, item count and grand total
//! - [`commands`] - Cart quantity policy and wishlist toggling
//! - [`filters`] - Brand/category filter sets and the listing query
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no shared state. Every derivation takes the current snapshot of
//! its inputs by reference and returns a fresh value, so calling it twice
//! with the same inputs yields equal outputs.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, request statuses and entity records
//! - [`notice`], [`stock`], [`pagination`], [`navigation`] - Small view
//!   derivations used by the storefront's JSON responses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod commands;
pub mod filters;
pub mod membership;
pub mod navigation;
pub mod notice;
pub mod pagination;
pub mod stock;
pub mod totals;
pub mod types;

pub use types::*;
