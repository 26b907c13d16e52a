//! Domain modules organized as vertical slices.
//!
//! Each sub-module contains:
//! - `mod.rs` — Typed records and the rules that apply to them
//! - `wire.rs` — Request bodies as the backend expects them
//! - `view.rs` / `state.rs` — Pure projections and app-owned state (orders)
//! - `client.rs` — Sub-client with HTTP methods

pub mod admin;
pub mod order;
pub mod transaction;
