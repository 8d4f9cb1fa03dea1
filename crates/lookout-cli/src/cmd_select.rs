use std::path::Path;

use lookout_core::{DetectionConfig, ToolInvocation};
use lookout_detect::{rank_candidates, select_main_artifact};

/// Plain output is the bare index; `-1` means no main artifact.
pub(crate) fn render(
    invocations: &[ToolInvocation],
    config: &DetectionConfig,
    json: bool,
) -> anyhow::Result<String> {
    let main = select_main_artifact(invocations, config);

    if !json {
        return Ok(match main {
            Some(i) => i.to_string(),
            None => "-1".to_string(),
        });
    }

    let winner = main.and_then(|i| {
        rank_candidates(invocations, config)
            .into_iter()
            .find(|c| c.raw_index == i)
    });
    let out = serde_json::json!({
        "main_index": main.map(|i| i as i64).unwrap_or(-1),
        "threshold": config.main_threshold,
        "candidate": winner,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}

/// `lookout select <file>`
pub fn execute(file: &Path, config: &DetectionConfig, json: bool, lenient: bool) -> anyhow::Result<()> {
    let invocations = crate::load_stream(file, lenient)?;
    println!("{}", render(&invocations, config, json)?);
    Ok(())
}
