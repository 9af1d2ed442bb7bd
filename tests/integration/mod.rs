//! Integration tests for tokio_heavy
//!
//! These tests drive the public API against the real clock and, on Linux,
//! the real process memory figures.
//! Run with: cargo test --test integration

mod helpers;

mod lifecycle;
mod load_shedding;
mod metrics;
