//! Small text helpers used when preparing training data and provider names.

use crate::errors::PromptError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static BRACKETED_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)]").expect("bracket pattern is valid"));

static REPEATED_HYPHENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+").expect("hyphen pattern is valid"));

static DISALLOWED_MODEL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("model name pattern is valid"));

/// Removes square brackets around table and column names in a DDL script.
///
/// `CREATE TABLE [dbo].[users] ([id] INT)` becomes `CREATE TABLE dbo.users (id INT)`.
pub fn strip_brackets(ddl: &str) -> String {
    BRACKETED_IDENTIFIER.replace_all(ddl, "$1").into_owned()
}

/// Normalizes a free-form model name into a lowercase, hyphenated slug.
pub fn sanitize_model_name(model_name: &str) -> Result<String, PromptError> {
    let mut name = model_name.to_lowercase().replace(' ', "-");

    if name.contains('-') {
        name = REPEATED_HYPHENS.replace_all(&name, "-").into_owned();
        if name.contains('_') {
            name = name.replace('_', "-");
        }
    }

    name = DISALLOWED_MODEL_CHARS.replace_all(&name, "").into_owned();

    if name.ends_with(['-', '_']) {
        name.pop();
    }
    if name.starts_with(['-', '_']) {
        name.remove(0);
    }
    if name.is_empty() {
        return Err(PromptError::Validation(format!(
            "model name '{model_name}' has no usable characters"
        )));
    }

    Ok(name)
}

/// A business glossary entry that can be stored as documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessTerm {
    pub business_term: String,
    pub business_description: String,
    pub related_tables: String,
    pub related_columns: String,
}

/// Renders glossary entries as one documentation line each.
pub fn format_business_terms(terms: &[BusinessTerm]) -> Vec<String> {
    terms
        .iter()
        .map(|t| {
            format!(
                "business_term : {}; business_description : {}; related_tables : {}; related_columns : {}; ",
                t.business_term, t.business_description, t.related_tables, t.related_columns
            )
        })
        .collect()
}
