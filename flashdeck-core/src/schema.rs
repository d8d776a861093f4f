use crate::CoreError;
use std::path::Path;

/// Splits a DDL script on `;`, dropping chunks with no alphanumeric content
/// (blank lines, trailing separators, stray punctuation).
pub fn split_statements(script: &str) -> Vec<String> {
    script
        .split(';')
        .map(str::trim)
        .filter(|chunk| chunk.chars().any(|c| c.is_ascii_alphanumeric()))
        .map(str::to_string)
        .collect()
}

pub fn load_schema(path: impl AsRef<Path>) -> Result<Vec<String>, CoreError> {
    let path = path.as_ref();
    let script = std::fs::read_to_string(path)
        .map_err(|e| CoreError::Config(format!("schema file {}: {e}", path.display())))?;
    Ok(split_statements(&script))
}
