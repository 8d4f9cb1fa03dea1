//! Artifact name extraction from loosely structured call payloads.
//!
//! Payloads arrive as JSON objects, JSON-encoded strings, or free text with
//! tag-delimited parameters. Nothing here fails: an unrecognizable payload
//! simply yields no artifact.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys that name a target file, highest priority first.
pub const PATH_KEYS: &[&str] = &["file_path", "target_file", "path", "file_name", "filename"];

/// Wrapper keys whose value may hold the real arguments.
const NESTED_KEYS: &[&str] = &["arguments", "parameters", "input", "args"];

const MAX_DEPTH: usize = 4;

/// Text patterns in priority order; within a pattern, keys follow [`PATH_KEYS`].
static TEXT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    let templates: [fn(&str) -> String; 5] = [
        |k| format!(r#"<parameter\s+name\s*=\s*["']{k}["']\s*>\s*([^<]+?)\s*</parameter>"#),
        |k| format!(r"<{k}>\s*([^<]+?)\s*</{k}>"),
        |k| format!(r#"\b{k}\s*=\s*["']([^"'\n]+)["']"#),
        |k| format!(r#"\b{k}\s*:\s*["']([^"'\n]+)["']"#),
        |k| format!(r#""{k}"\s*:\s*"((?:[^"\\\n]|\\.)+)""#),
    ];
    templates
        .iter()
        .flat_map(|t| PATH_KEYS.iter().map(move |k| t(*k)))
        .filter_map(|src| Regex::new(&src).ok())
        .collect()
});

/// What extraction found. Both fields `None` means "not a candidate".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedArtifact {
    pub file_name: Option<String>,
    /// Normalized path; only set when the payload named a directory too.
    pub file_path: Option<String>,
}

impl ExtractedArtifact {
    fn from_raw(raw: &str) -> Option<Self> {
        let cleaned = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        let normalized = normalize_separators(cleaned);
        let file_name = basename(&normalized)?;
        let file_path = if normalized.contains('/') {
            Some(normalized)
        } else {
            None
        };
        Some(Self {
            file_name: Some(file_name),
            file_path,
        })
    }

    /// Strip the first matching workspace root prefix from `file_path`.
    pub fn strip_roots(mut self, roots: &[String]) -> Self {
        if let Some(path) = self.file_path.take() {
            let stripped = roots
                .iter()
                .map(|r| normalize_separators(r))
                .filter(|r| !r.is_empty())
                .find_map(|r| {
                    let prefix = if r.ends_with('/') { r } else { format!("{r}/") };
                    path.strip_prefix(prefix.as_str()).map(|s| s.to_string())
                })
                .unwrap_or(path);
            self.file_path = Some(stripped);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.file_name.is_none()
    }
}

/// Pull a target file name (and path, if any) out of a call payload.
pub fn extract_artifact(payload: &Value) -> ExtractedArtifact {
    find_in_value(payload, 0)
        .and_then(|raw| ExtractedArtifact::from_raw(&raw))
        .unwrap_or_default()
}

fn find_in_value(value: &Value, depth: usize) -> Option<String> {
    if depth > MAX_DEPTH {
        return None;
    }
    match value {
        Value::Object(_) | Value::Array(_) => {
            find_structured(value, depth).or_else(|| find_in_leaves(value, depth))
        }
        Value::String(s) => find_in_str(s, depth),
        _ => None,
    }
}

fn find_in_str(s: &str, depth: usize) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') || trimmed.starts_with('"') {
        if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
            // A JSON-encoded plain string would loop forever without the depth bump.
            if let Some(found) = find_in_value(&parsed, depth + 1) {
                return Some(found);
            }
        }
    }
    find_in_text(trimmed)
}

fn find_structured(value: &Value, depth: usize) -> Option<String> {
    match value {
        Value::Object(map) => {
            for key in PATH_KEYS {
                if let Some(s) = map.get(*key).and_then(|v| v.as_str()) {
                    if !s.trim().is_empty() {
                        return Some(s.to_string());
                    }
                }
            }
            NESTED_KEYS
                .iter()
                .filter_map(|k| map.get(*k))
                .find_map(|nested| match nested {
                    Value::String(s) => serde_json::from_str::<Value>(s)
                        .ok()
                        .and_then(|v| find_structured(&v, depth + 1)),
                    other => find_structured(other, depth + 1),
                })
        }
        Value::Array(items) => items.iter().find_map(|v| find_structured(v, depth + 1)),
        _ => None,
    }
}

/// Last resort for structured input: scan every string leaf as text.
fn find_in_leaves(value: &Value, depth: usize) -> Option<String> {
    if depth > MAX_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => map.values().find_map(|v| find_in_leaves(v, depth + 1)),
        Value::Array(items) => items.iter().find_map(|v| find_in_leaves(v, depth + 1)),
        Value::String(s) => find_in_text(s),
        _ => None,
    }
}

fn find_in_text(text: &str) -> Option<String> {
    TEXT_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

fn normalize_separators(raw: &str) -> String {
    let mut path = raw.replace('\\', "/");
    while path.contains("//") {
        path = path.replace("//", "/");
    }
    while let Some(rest) = path.strip_prefix("./") {
        path = rest.to_string();
    }
    path
}

/// Last path segment, tolerant of both separator conventions.
pub fn basename(path: &str) -> Option<String> {
    path.rsplit(['/', '\\'])
        .find(|seg| !seg.is_empty())
        .map(|seg| seg.trim().to_string())
        .filter(|seg| !seg.is_empty())
}
