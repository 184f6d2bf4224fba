//! `supplyline-ai` — the assistant boundary.
//!
//! This crate is intentionally **not** part of the domain model:
//! - It never mutates domain state.
//! - It reads a point-in-time [`ContextSnapshot`] and produces text.
//! - Its failures never surface as errors to the caller.

pub mod client;
pub mod context;

pub use client::{APOLOGY, ChatClient};
pub use context::{ContextSnapshot, build_context, RECENT_MOVEMENTS, RECENT_ORDERS};
