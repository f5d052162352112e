//! Codec Integration Test Suite
//!
//! End-to-end encode/decode passes against the in-memory store.
//!
//! ## Modules
//!
//! - `scenarios`: the reference person scenarios
//! - `round_trip`: value shapes that must survive encode then decode
//! - `graph`: reference graph shape, de-duplication and parent linkage
//! - `missing`: absent, optional and unreachable references
//! - `cycles`: cycle guard and depth limit
//! - `attachments`: URL and path boxing strategies
//! - `config`: options loaded from `flatrec.toml`
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test codec
//! cargo test --test codec cycles::
//! ```

#[path = "../common/mod.rs"]
mod common;

mod attachments;
mod config;
mod cycles;
mod graph;
mod round_trip;
mod scenarios;
