//! Core types for Easy Kart.
//!
//! This module provides type-safe wrappers for ids, money and request
//! statuses, plus the records exchanged with the remote API.

pub mod entity;
pub mod id;
pub mod price;
pub mod status;

pub use entity::*;
pub use id::*;
pub use price::Price;
pub use status::*;
