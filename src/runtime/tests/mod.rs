//! Tests for the effect runtime
//!
//! Organized by component

mod escape_tests;
mod helpers;
