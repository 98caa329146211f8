//! Helpers for tests in this crate and its dependents. Enable the `test_utils` feature to use them outside the crate.
pub mod callbacks;
pub mod fakes;
pub mod prepare_env;
