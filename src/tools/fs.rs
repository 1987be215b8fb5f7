// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Filesystem tool operations
//!
//! Create, write, read, and list operations used by the tool executor.
//! `write_to_file` keeps the historical positional line diff: lines are
//! compared by index, not aligned by content, so an insertion near the top
//! classifies every following line as changed. This is reproduced for
//! behavioral parity with earlier releases.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::ToolError;

/// Resolve a tool-supplied path against the workspace root
pub fn resolve(root: &Path, path: &str) -> PathBuf {
    let candidate = PathBuf::from(path);
    if candidate.is_absolute() {
        candidate
    } else {
        root.join(candidate)
    }
}

/// Create a new file, creating parent directories as needed
pub fn create_file(path: &Path, content: &str) -> Result<String, ToolError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| ToolError::Io {
                action: "creating",
                path: path.display().to_string(),
                source,
            })?;
        }
    }

    std::fs::write(path, content).map_err(|source| ToolError::Io {
        action: "creating",
        path: path.display().to_string(),
        source,
    })?;

    Ok(format!("File created: {}", path.display()))
}

/// Write content to a file, reporting a line-change summary
///
/// If the target exists its old content is diffed positionally against the
/// new content and the file is rewritten, even when nothing changed. If the
/// target does not exist it is created.
pub fn write_to_file(path: &Path, content: &str) -> Result<String, ToolError> {
    if !path.exists() {
        return create_file(path, content);
    }

    let old = std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        action: "reading",
        path: path.display().to_string(),
        source,
    })?;

    let summary = positional_diff_summary(&old, content);

    // The file is rewritten unconditionally, identical content included.
    std::fs::write(path, content).map_err(|source| ToolError::Io {
        action: "writing",
        path: path.display().to_string(),
        source,
    })?;

    match summary {
        Some(summary) => Ok(format!("File updated: {}\n{}", path.display(), summary)),
        None => Ok("No changes detected.".to_string()),
    }
}

/// Positional line diff: index-aligned comparison of old vs new lines
///
/// Returns `None` when the contents are line-for-line identical.
fn positional_diff_summary(old: &str, new: &str) -> Option<String> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let common = old_lines.len().min(new_lines.len());
    let changed = (0..common)
        .filter(|&i| old_lines[i] != new_lines[i])
        .count();
    let added = new_lines.len().saturating_sub(old_lines.len());
    let removed = old_lines.len().saturating_sub(new_lines.len());

    if changed == 0 && added == 0 && removed == 0 {
        return None;
    }

    let mut parts = Vec::new();
    if changed > 0 {
        parts.push(format!("{} line(s) changed", changed));
    }
    if added > 0 {
        parts.push(format!("{} line(s) added", added));
    }
    if removed > 0 {
        parts.push(format!("{} line(s) removed", removed));
    }

    Some(parts.join(", "))
}

/// Read a file, or concatenate every file under a directory
pub fn read_file(path: &Path) -> Result<String, ToolError> {
    if path.is_dir() {
        return read_directory(path);
    }

    std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        action: "reading",
        path: path.display().to_string(),
        source,
    })
}

/// Concatenate the contents of every file under a directory
fn read_directory(dir: &Path) -> Result<String, ToolError> {
    let mut content = String::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| ToolError::Io {
            action: "reading",
            path: dir.display().to_string(),
            source: e.into(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let file_content =
            std::fs::read_to_string(entry.path()).map_err(|source| ToolError::Io {
                action: "reading",
                path: entry.path().display().to_string(),
                source,
            })?;

        content.push_str(&format!(
            "Filename: {}\nContent:\n{}\n",
            entry.file_name().to_string_lossy(),
            file_content
        ));
    }

    Ok(content)
}

/// List the entries of a directory, directories marked with a trailing slash
pub fn list_files(dir: &Path) -> Result<String, ToolError> {
    let entries = std::fs::read_dir(dir).map_err(|source| ToolError::Io {
        action: "listing",
        path: dir.display().to_string(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ToolError::Io {
            action: "listing",
            path: dir.display().to_string(),
            source,
        })?;

        let mut name = entry.file_name().to_string_lossy().to_string();
        if entry.path().is_dir() {
            name.push('/');
        }
        names.push(name);
    }

    names.sort();
    Ok(names.join("\n"))
}
