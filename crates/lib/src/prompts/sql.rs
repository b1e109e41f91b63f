//! # SQL Generation Prompts
//!
//! The system prompt is assembled from a fixed persona, the related DDL and
//! documentation (bounded by a character budget), and the response guidelines.
//! Prior question/SQL pairs are not part of it; they become user/assistant turns.

/// The opening of the system prompt.
///
/// Placeholders: `{dialect}`
pub const SQL_SYSTEM_PROMPT: &str = "You are a {dialect} expert. Please help to generate a SQL query to answer the question. Your response should ONLY be based on the given context and follow the response guidelines and format instructions. ";

pub const TABLES_HEADER: &str = "\n===Tables \n";

pub const ADDITIONAL_CONTEXT_HEADER: &str = "\n===Additional Context \n\n";

/// The closing rules of the system prompt.
///
/// Placeholders: `{dialect}`
pub const RESPONSE_GUIDELINES: &str = "===Response Guidelines \n\
    1. If the provided context is sufficient, please generate a valid SQL query without any explanations for the question. \n\
    2. If the provided context is almost sufficient but requires knowledge of a specific string in a particular column, please generate an intermediate SQL query to find the distinct strings in that column. Prepend the query with a comment saying intermediate_sql \n\
    3. If the provided context is insufficient, please explain why it can't be generated. \n\
    4. Please use the most relevant table(s). \n\
    5. If the question has been asked and answered before, please repeat the answer exactly as it was given before. \n\
    6. Ensure that the output SQL is {dialect}-compliant and executable, and free of syntax errors. \n";

/// Appends a titled section, adding items in order while they fit the budget.
///
/// Items that would push the prompt past `max_chars` are skipped; a shorter item
/// later in the list may still be added.
fn append_within_budget(prompt: &mut String, header: &str, items: &[String], max_chars: usize) {
    if items.is_empty() {
        return;
    }
    prompt.push_str(header);
    for item in items {
        if prompt.chars().count() + item.chars().count() < max_chars {
            prompt.push_str(item);
            prompt.push_str("\n\n");
        }
    }
}

/// Builds the system prompt for SQL generation.
pub fn build_system_prompt(
    dialect: &str,
    ddl: &[String],
    documentation: &[String],
    max_chars: usize,
) -> String {
    let mut prompt = SQL_SYSTEM_PROMPT.replace("{dialect}", dialect);
    append_within_budget(&mut prompt, TABLES_HEADER, ddl, max_chars);
    append_within_budget(&mut prompt, ADDITIONAL_CONTEXT_HEADER, documentation, max_chars);
    prompt.push_str(&RESPONSE_GUIDELINES.replace("{dialect}", dialect));
    prompt
}
