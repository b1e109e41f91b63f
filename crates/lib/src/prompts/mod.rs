//! # Prompt Template Modules
//!
//! This module organizes the prompt templates used by the `PromptClient`.

pub mod sql;
