//! # Shared Constants
//!
//! This module provides a centralized location for constants that are shared across
//! the `anysql` workspace. Using these constants helps to avoid "magic strings" and
//! keeps collection names and identifier suffixes consistent between writers and readers.

/// The dataset tag used when a caller does not provide one.
pub const DEFAULT_DATASET: &str = "default";

/// The default directory holding the persistent vector store.
pub const DEFAULT_STORE_PATH: &str = ".";

/// The database file created inside the store directory.
pub const STORE_DB_FILE: &str = "anysql.db";

/// The number of neighbours returned by similarity queries unless overridden.
pub const DEFAULT_N_RESULTS: u32 = 10;

/// Noise tokens some models emit around generated SQL.
pub const SQL_NOISE_TOKENS: [&str; 2] = ["intermediate_sql", "final_sql"];

/// The SQL dialect named in prompts unless configured.
pub const DEFAULT_DIALECT: &str = "SQL";

/// Character budget for DDL and documentation in the system prompt.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 14_000;
