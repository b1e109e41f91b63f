//! # SQL Extraction
//!
//! Models rarely answer with a bare statement. This module pulls the most likely SQL
//! statement out of a free-form response, trying fenced ```` ```sql ```` blocks first
//! and falling back to scanning for `WITH`/`SELECT` statements. When nothing looks
//! like SQL, the normalized response is returned unchanged and the caller decides
//! what to do with it.

use crate::constants::SQL_NOISE_TOKENS;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, info};

static FENCED_SQL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)```sql[ \t]*\r?\n(.*?)```").expect("fenced SQL pattern is valid")
});

static BARE_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\b(?:WITH|SELECT)\b.*?(?:;|\[|```|$)")
        .expect("bare statement pattern is valid")
});

static READ_ONLY_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(?:SELECT|WITH)\b").expect("read-only statement pattern is valid")
});

/// Options controlling which candidate is returned and whether it is logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Return the last candidate instead of the first.
    #[serde(default)]
    pub take_last: bool,
    /// Log the extracted text before returning it.
    #[serde(default)]
    pub show_sql: bool,
}

/// Extracts the best-guess SQL statement from a raw model response.
///
/// This never fails: if no pattern matches, the backslash-normalized response is
/// returned as-is and may not be SQL at all.
pub fn extract_sql(llm_response: &str, options: &ExtractOptions) -> String {
    let response = normalize_response(llm_response);

    let blocks: Vec<&str> = FENCED_SQL
        .captures_iter(&response)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    if let Some(block) = pick(&blocks, options.take_last) {
        debug!("Extracted SQL from {} fenced block(s).", blocks.len());
        return finish(strip_noise(block), options);
    }

    let statements: Vec<&str> = BARE_STATEMENT
        .find_iter(&response)
        .map(|m| trim_terminator(m.as_str()))
        .collect();
    if let Some(statement) = pick(&statements, options.take_last) {
        debug!("Extracted SQL from {} bare statement(s).", statements.len());
        return finish(strip_noise(statement), options);
    }

    debug!("No SQL pattern matched; returning the normalized response.");
    finish(response, options)
}

/// Returns true for a single statement starting with `SELECT` or `WITH`.
///
/// Anything but whitespace after the first `;` outside quotes and comments counts
/// as a second statement and is rejected.
pub fn is_sql_valid(sql: &str) -> bool {
    READ_ONLY_STATEMENT.is_match(sql)
        && after_first_statement(sql).is_none_or(|rest| rest.trim().is_empty())
}

/// The text following the first `;` that is not inside a quoted string or comment.
fn after_first_statement(sql: &str) -> Option<&str> {
    let mut chars = sql.char_indices().peekable();
    let mut quote = None;

    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        let next = chars.peek().map(|&(_, n)| n);
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '-' if next == Some('-') => {
                for (_, n) in chars.by_ref() {
                    if n == '\n' {
                        break;
                    }
                }
            }
            '/' if next == Some('*') => {
                chars.next();
                let mut prev = '\0';
                for (_, n) in chars.by_ref() {
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            ';' => return Some(&sql[i + 1..]),
            _ => {}
        }
    }
    None
}

/// Unescapes `\_` and drops any remaining backslashes.
fn normalize_response(llm_response: &str) -> String {
    llm_response.replace("\\_", "_").replace('\\', "")
}

fn pick<'a>(candidates: &[&'a str], take_last: bool) -> Option<&'a str> {
    if take_last {
        candidates.last().copied()
    } else {
        candidates.first().copied()
    }
}

/// A `;` terminator belongs to the statement, a `[` or code fence does not.
fn trim_terminator(statement: &str) -> &str {
    statement
        .strip_suffix("```")
        .or_else(|| statement.strip_suffix('['))
        .unwrap_or(statement)
}

fn strip_noise(sql: &str) -> String {
    SQL_NOISE_TOKENS
        .iter()
        .fold(sql.to_string(), |acc, token| acc.replace(token, ""))
}

fn finish(sql: String, options: &ExtractOptions) -> String {
    if options.show_sql {
        info!("Extracted SQL: {sql}");
    }
    sql
}
