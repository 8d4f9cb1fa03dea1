//! JSONL invocation stream loading.
//!
//! One [`ToolInvocation`] per line. `sequence_index` may be omitted, in which
//! case it is one past the previous kept record's index (0 for the first).
//! Blank lines, and malformed lines skipped in [`LoadMode::SkipInvalid`],
//! consume no index.

use std::path::Path;

use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::{LookoutError, Result};
use crate::types::{derive_success, ToolInvocation, ToolName};

/// What to do with a line that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Strict,
    SkipInvalid,
}

#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    sequence_index: Option<usize>,
    tool_name: String,
    #[serde(default)]
    call_payload: serde_json::Value,
    #[serde(default)]
    result_payload: Option<serde_json::Value>,
    #[serde(default)]
    result_succeeded: Option<bool>,
    #[serde(default)]
    invoked_at: String,
    #[serde(default)]
    completed_at: Option<String>,
}

/// Read and parse a JSONL invocation file.
pub fn load_invocations(path: &Path, mode: LoadMode) -> Result<Vec<ToolInvocation>> {
    let content = std::fs::read_to_string(path).map_err(|source| LookoutError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_invocations(&content, path, mode)
}

/// Parse JSONL text. `origin` only labels errors.
pub fn parse_invocations(
    content: &str,
    origin: &Path,
    mode: LoadMode,
) -> Result<Vec<ToolInvocation>> {
    let mut out: Vec<ToolInvocation> = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let raw: RawRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(source) => match mode {
                LoadMode::Strict => {
                    return Err(LookoutError::Parse {
                        path: origin.to_path_buf(),
                        line: idx + 1,
                        source,
                    })
                }
                LoadMode::SkipInvalid => {
                    tracing::warn!(line = idx + 1, "skipping malformed invocation: {source}");
                    continue;
                }
            },
        };

        let position = out.len();
        let sequence_index = match raw.sequence_index {
            Some(i) if out.last().is_none_or(|prev| i > prev.sequence_index) => i,
            Some(i) => {
                tracing::warn!(
                    line = idx + 1,
                    declared = i,
                    "sequence_index not increasing, using stream position {position}"
                );
                out.last().map(|p| p.sequence_index + 1).unwrap_or(position)
            }
            None => out.last().map(|p| p.sequence_index + 1).unwrap_or(position),
        };

        let result_succeeded = raw
            .result_succeeded
            .or_else(|| raw.result_payload.as_ref().and_then(derive_success));

        out.push(ToolInvocation {
            sequence_index,
            tool_name: ToolName::new(&raw.tool_name),
            call_payload: raw.call_payload,
            result_payload: raw.result_payload,
            result_succeeded,
            invoked_at: raw.invoked_at,
            completed_at: raw.completed_at,
        });
    }
    Ok(out)
}

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

/// Milliseconds between invocation and completion, when both stamps parse.
pub fn duration_ms(inv: &ToolInvocation) -> Option<i64> {
    let start = OffsetDateTime::parse(&inv.invoked_at, &Rfc3339).ok()?;
    let end = OffsetDateTime::parse(inv.completed_at.as_deref()?, &Rfc3339).ok()?;
    i64::try_from((end - start).whole_milliseconds()).ok()
}
