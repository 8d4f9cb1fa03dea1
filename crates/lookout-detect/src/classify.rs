use lookout_core::tools::{is_credential, is_deployment, is_file_producing, is_technical};
use lookout_core::{DetectionConfig, ToolInvocation};
use serde::Serialize;

use crate::score::is_known_main_file;
use crate::select::{eligible_artifact, score_invocation};

/// How an invocation reads to someone reviewing the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationKind {
    /// A file that looks like something the user asked for.
    DeliveryFile,
    Deployment,
    Credential,
    Technical,
    Other,
}

impl InvocationKind {
    pub fn is_delivery(self) -> bool {
        matches!(
            self,
            InvocationKind::DeliveryFile | InvocationKind::Deployment | InvocationKind::Credential
        )
    }
}

/// Classify one invocation. `total` is the stream length used for recency.
pub fn classify(inv: &ToolInvocation, total: usize, config: &DetectionConfig) -> InvocationKind {
    if is_deployment(&inv.tool_name) {
        return InvocationKind::Deployment;
    }
    if is_credential(&inv.tool_name) {
        return InvocationKind::Credential;
    }
    if is_file_producing(&inv.tool_name) && is_delivery_file(inv, total, config) {
        return InvocationKind::DeliveryFile;
    }
    if is_technical(&inv.tool_name) {
        InvocationKind::Technical
    } else {
        InvocationKind::Other
    }
}

fn is_delivery_file(inv: &ToolInvocation, total: usize, config: &DetectionConfig) -> bool {
    let Some((file_name, file_path)) = eligible_artifact(inv, config) else {
        return false;
    };
    // Either trigger suffices; the name check is cheaper so it goes first.
    if is_known_main_file(&file_name) {
        return true;
    }
    let breakdown = score_invocation(inv, &file_name, file_path.as_deref(), total, config);
    breakdown.total >= config.main_threshold
}

pub fn is_delivery_moment(inv: &ToolInvocation, total: usize, config: &DetectionConfig) -> bool {
    classify(inv, total, config).is_delivery()
}

/// Raw indices of every delivery moment, in stream order.
pub fn delivery_moments(invocations: &[ToolInvocation], config: &DetectionConfig) -> Vec<usize> {
    let total = invocations.len();
    invocations
        .iter()
        .enumerate()
        .filter(|(_, inv)| is_delivery_moment(inv, total, config))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::select_main_artifact;
    use serde_json::json;

    fn inv(i: usize, tool: &str, payload: serde_json::Value) -> ToolInvocation {
        ToolInvocation::new(i, tool, payload, format!("t{i}"))
    }

    #[test]
    fn deploy_is_always_delivery() {
        let config = DetectionConfig::default();
        let d = inv(0, "deploy", json!("nothing to extract"));
        assert_eq!(classify(&d, 1, &config), InvocationKind::Deployment);
        assert!(is_delivery_moment(&d, 1, &config));
        assert!(is_delivery_moment(&inv(0, "expose_port", json!({"port": 8080})), 1, &config));
    }

    #[test]
    fn credential_setup_is_always_delivery() {
        let config = DetectionConfig::default();
        let c = inv(0, "connect-service", json!({}));
        assert_eq!(classify(&c, 1, &config), InvocationKind::Credential);
    }

    #[test]
    fn main_file_by_score_or_name() {
        let config = DetectionConfig::default();
        let by_name = inv(0, "str-replace", json!({"file_path": "a/b/c/d/home.css"}));
        assert_eq!(classify(&by_name, 10, &config), InvocationKind::DeliveryFile);

        // No keyword, but html from create-file scores far above threshold.
        let by_score = inv(5, "create-file", json!({"file_path": "about.html"}));
        assert_eq!(classify(&by_score, 10, &config), InvocationKind::DeliveryFile);
    }

    #[test]
    fn low_scoring_edit_is_technical() {
        let config = DetectionConfig::default();
        let edit = inv(0, "edit-file", json!({"file_path": "src/lib/utils.css"}));
        assert_eq!(classify(&edit, 10, &config), InvocationKind::Technical);
        assert!(!is_delivery_moment(&edit, 10, &config));
    }

    #[test]
    fn excluded_names_never_deliver() {
        let config = DetectionConfig::default();
        let t = inv(9, "create-file", json!({"file_path": "index.test.html"}));
        assert!(!is_delivery_moment(&t, 10, &config));
        let p = inv(9, "create-file", json!({"file_path": "package.json"}));
        assert!(!is_delivery_moment(&p, 10, &config));
    }

    #[test]
    fn unknown_tool_is_other() {
        let config = DetectionConfig::default();
        let x = inv(0, "web-search", json!({"file_path": "index.html"}));
        assert_eq!(classify(&x, 1, &config), InvocationKind::Other);
    }

    #[test]
    fn main_artifact_is_always_a_delivery_moment() {
        let config = DetectionConfig::default();
        let invs = vec![
            inv(0, "execute-command", json!("npm init")),
            inv(1, "create-file", json!({"file_path": "index.html"})),
            inv(2, "deploy", json!({})),
            inv(3, "create-file", json!({"file_path": "package.json"})),
        ];
        let main = select_main_artifact(&invs, &config).unwrap();
        let moments = delivery_moments(&invs, &config);
        assert!(moments.contains(&main));
        assert_eq!(moments, vec![1, 2]);
    }
}
