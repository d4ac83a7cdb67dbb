//! Agent file frontmatter parsing
//!
//! Splits an agent markdown file into its YAML frontmatter and body.
//!
//! # Format
//!
//! ```markdown
//! ---
//! name: code-reviewer
//! category: quality-testing
//! description: Reviews diffs for correctness and style
//! version: 1.2.0
//! author: Jane Doe
//! license: MIT
//! tools: Read, Grep, Glob
//! ---
//!
//! You are a meticulous code reviewer...
//! ```

use serde_yaml::{Mapping, Value};

/// Frontmatter and body of an agent file
#[derive(Debug, Clone)]
pub struct Document {
    pub frontmatter: Mapping,
    pub body: String,
}

/// Split and parse an agent file.
///
/// Returns a human-readable reason on failure; callers record it as a
/// validation error.
pub fn parse_document(content: &str) -> Result<Document, String> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    if !trimmed.starts_with("---") {
        return Err("file must start with YAML frontmatter (---)".to_string());
    }

    let rest = &trimmed[3..];
    let end_pos = rest
        .find("\n---")
        .ok_or_else(|| "no closing frontmatter delimiter (---) found".to_string())?;

    let yaml_content = rest[..end_pos].trim();
    let after = &rest[end_pos + 4..];
    // Drop the remainder of the delimiter line
    let body = match after.find('\n') {
        Some(idx) => &after[idx + 1..],
        None => "",
    };

    let frontmatter = if yaml_content.is_empty() {
        Mapping::new()
    } else {
        match serde_yaml::from_str::<Value>(yaml_content) {
            Ok(Value::Mapping(map)) => map,
            Ok(Value::Null) => Mapping::new(),
            Ok(_) => return Err("frontmatter must be a YAML mapping".to_string()),
            Err(e) => return Err(format!("invalid YAML frontmatter: {}", e)),
        }
    };

    Ok(Document {
        frontmatter,
        body: body.to_string(),
    })
}

impl Document {
    /// Scalar field rendered as a trimmed string; empty values count as absent
    pub fn scalar(&self, key: &str) -> Option<String> {
        let text = match self.frontmatter.get(key)? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        let text = text.trim().to_string();
        if text.is_empty() { None } else { Some(text) }
    }

    /// List field; accepts a YAML sequence or a comma-separated string
    pub fn list(&self, key: &str) -> Vec<String> {
        let items: Vec<String> = match self.frontmatter.get(key) {
            Some(Value::Sequence(seq)) => seq
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
            _ => Vec::new(),
        };

        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
