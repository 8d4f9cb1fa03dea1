use serde::{Deserialize, Serialize};
use std::fmt;

/// Result payload value hosts use to mark an invocation that is still executing.
pub const STREAMING_SENTINEL: &str = "__streaming__";

/// Normalized tool identifier: trimmed, lowercase, separators unified to `-`.
///
/// `Create_File`, `create file` and `create.file` all normalize to `create-file`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ToolName(String);

impl ToolName {
    pub fn new(raw: &str) -> Self {
        let mut out = String::with_capacity(raw.len());
        let mut last_dash = false;
        for ch in raw.trim().chars() {
            let mapped = if ch == '_' || ch == '.' || ch.is_whitespace() {
                '-'
            } else {
                ch
            };
            if mapped == '-' {
                // Collapse runs like "create__file" into a single separator.
                if last_dash {
                    continue;
                }
                last_dash = true;
            } else {
                last_dash = false;
            }
            out.extend(mapped.to_lowercase());
        }
        Self(out.trim_matches('-').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ToolName {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<&str> for ToolName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<ToolName> for String {
    fn from(name: ToolName) -> Self {
        name.0
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One agent tool call plus its eventual result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub sequence_index: usize,
    pub tool_name: ToolName,
    #[serde(default)]
    pub call_payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_succeeded: Option<bool>,
    #[serde(default)]
    pub invoked_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl ToolInvocation {
    /// A freshly issued call with no result yet.
    pub fn new(
        sequence_index: usize,
        tool_name: impl Into<ToolName>,
        call_payload: serde_json::Value,
        invoked_at: impl Into<String>,
    ) -> Self {
        Self {
            sequence_index,
            tool_name: tool_name.into(),
            call_payload,
            result_payload: None,
            result_succeeded: None,
            invoked_at: invoked_at.into(),
            completed_at: None,
        }
    }

    /// Attach a result. This is the only mutation an invocation ever sees.
    pub fn complete(&mut self, result: serde_json::Value, completed_at: impl Into<String>) {
        self.result_succeeded = derive_success(&result);
        self.result_payload = Some(result);
        self.completed_at = Some(completed_at.into());
    }

    /// Builder form of [`ToolInvocation::complete`], handy for fixtures.
    pub fn with_result(mut self, result: serde_json::Value, completed_at: impl Into<String>) -> Self {
        self.complete(result, completed_at);
        self
    }

    /// True while the result is absent, `null`, or the streaming sentinel.
    pub fn is_streaming(&self) -> bool {
        match &self.result_payload {
            None | Some(serde_json::Value::Null) => true,
            Some(serde_json::Value::String(s)) => s == STREAMING_SENTINEL,
            Some(_) => false,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.is_streaming()
    }

    /// Tri-state success collapsed to a bool; undecidable counts as success.
    pub fn succeeded(&self) -> bool {
        self.result_succeeded.unwrap_or(true)
    }
}

/// Derive a success flag from a loosely structured result payload.
///
/// Object fields win over textual markers. Returns `None` when nothing in the
/// payload says either way.
pub fn derive_success(result: &serde_json::Value) -> Option<bool> {
    match result {
        serde_json::Value::Object(map) => {
            if let Some(b) = map.get("success").and_then(|v| v.as_bool()) {
                return Some(b);
            }
            if let Some(b) = map.get("is_error").and_then(|v| v.as_bool()) {
                return Some(!b);
            }
            // Tool outputs are often wrapped one level deep.
            for key in ["output", "content", "result"] {
                if let Some(inner) = map.get(key) {
                    if let Some(b) = derive_success(inner) {
                        return Some(b);
                    }
                }
            }
            None
        }
        serde_json::Value::String(s) => success_from_text(s),
        _ => None,
    }
}

fn success_from_text(text: &str) -> Option<bool> {
    if text == STREAMING_SENTINEL {
        return None;
    }
    let lower = text.to_lowercase();
    let compact: String = lower.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.contains("success=false") || compact.contains("\"success\":false") {
        Some(false)
    } else if compact.contains("success=true") || compact.contains("\"success\":true") {
        Some(true)
    } else {
        None
    }
}
