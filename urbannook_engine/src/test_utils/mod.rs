//! Helpers for tests that need a real, throwaway SQLite database. Enabled with the `test_utils` feature.
pub mod prepare_env;
