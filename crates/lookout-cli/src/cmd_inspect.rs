use std::path::Path;

use lookout_core::stream::duration_ms;
use lookout_core::{DetectionConfig, ToolInvocation};
use lookout_detect::{classify, rank_candidates, select_main_artifact, InvocationKind};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct InspectRow {
    pub raw_index: usize,
    pub sequence_index: usize,
    pub tool: String,
    pub status: &'static str,
    pub kind: InvocationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
    pub main: bool,
}

fn status(inv: &ToolInvocation) -> &'static str {
    if inv.is_streaming() {
        "running"
    } else if inv.succeeded() {
        "ok"
    } else {
        "failed"
    }
}

pub(crate) fn build_rows(invocations: &[ToolInvocation], config: &DetectionConfig) -> Vec<InspectRow> {
    let total = invocations.len();
    let main = select_main_artifact(invocations, config);
    let ranked = rank_candidates(invocations, config);

    invocations
        .iter()
        .enumerate()
        .map(|(raw_index, inv)| {
            let candidate = ranked.iter().find(|c| c.raw_index == raw_index);
            InspectRow {
                raw_index,
                sequence_index: inv.sequence_index,
                tool: inv.tool_name.to_string(),
                status: status(inv),
                kind: classify(inv, total, config),
                file: candidate.map(|c| c.file_name.clone()),
                score: candidate.map(|c| c.score()),
                duration_ms: duration_ms(inv),
                main: main == Some(raw_index),
            }
        })
        .collect()
}

/// `lookout inspect <file>`
pub fn execute(file: &Path, config: &DetectionConfig, json: bool, lenient: bool) -> anyhow::Result<()> {
    let invocations = crate::load_stream(file, lenient)?;
    let rows = build_rows(&invocations, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("(empty stream)");
        return Ok(());
    }
    for row in &rows {
        let marker = if row.main { "*" } else { " " };
        let kind = serde_json::to_value(row.kind)?;
        let kind = kind.as_str().unwrap_or("other");
        let file = row.file.as_deref().unwrap_or("-");
        let score = row
            .score
            .map(|s| format!("{s:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{marker}{:>4}  {:<26} {:<8} {:<14} {:<28} {:>7}",
            row.raw_index, row.tool, row.status, kind, file, score
        );
    }
    let deliveries = rows.iter().filter(|r| r.kind.is_delivery()).count();
    println!();
    println!(
        "{} invocations, {} delivery moments, main: {}",
        rows.len(),
        deliveries,
        rows.iter()
            .find(|r| r.main)
            .map(|r| r.raw_index.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rows_mark_main_and_status() {
        let invs = vec![
            ToolInvocation::new(0, "execute-command", json!("ls"), "2026-01-01T00:00:00Z")
                .with_result(json!({"success": false}), "2026-01-01T00:00:01Z"),
            ToolInvocation::new(1, "create-file", json!({"file_path": "index.html"}), "t1"),
            ToolInvocation::new(2, "deploy", json!({}), "t2").with_result(json!("ok"), "t3"),
        ];
        let rows = build_rows(&invs, &DetectionConfig::default());
        assert_eq!(rows[0].status, "failed");
        assert_eq!(rows[0].duration_ms, Some(1000));
        assert_eq!(rows[1].status, "running");
        assert!(rows[1].main);
        assert_eq!(rows[1].file.as_deref(), Some("index.html"));
        assert_eq!(rows[2].kind, InvocationKind::Deployment);
        assert_eq!(rows[2].score, None);
    }
}
