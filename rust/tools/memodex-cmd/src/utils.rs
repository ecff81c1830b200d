//! Common utilities for memodex-cmd

use anyhow::{Context, Result};
use std::path::Path;

/// Checks if a file exists and is readable
pub fn validate_file_exists(path: &str) -> Result<()> {
    let file_path = Path::new(path);
    if !file_path.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }
    if !file_path.is_file() {
        anyhow::bail!("Path is not a file: {}", path);
    }
    Ok(())
}

/// Reads a whole input file as text.
pub fn read_input(path: &str) -> Result<String> {
    validate_file_exists(path).with_context(|| format!("Invalid input file: {}", path))?;
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
}
