//! One entry point for hosts: feed the stream in, read navigation state and
//! promotion requests out.

use lookout_core::{DetectionConfig, ToolInvocation};
use lookout_detect::{delivery_moments, rank_candidates, select_main_artifact, ScoredCandidate};
use serde::Serialize;

use crate::navigator::{Direction, NavOrigin, NavigationState, Navigator};
use crate::promote::{Promotion, PromotionGate, PromotionTracker};
use crate::snapshot::DisplayPosition;

/// Host-supplied status of the stream at refresh time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamFlags {
    /// The agent is still producing invocations.
    pub running: bool,
    /// Long-running load in progress; promotion waits it out.
    pub loading: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub main_index: Option<usize>,
    pub delivery_moments: Vec<usize>,
    pub promotion: Option<Promotion>,
    pub state: NavigationState,
    pub display: Option<DisplayPosition>,
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryEngine {
    config: DetectionConfig,
    invocations: Vec<ToolInvocation>,
    delivery: Vec<usize>,
    navigator: Navigator,
    tracker: PromotionTracker,
    running: bool,
}

impl DeliveryEngine {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn state(&self) -> &NavigationState {
        self.navigator.state()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn display_position(&self) -> Option<DisplayPosition> {
        self.navigator.display_position()
    }

    pub fn delivery_moments(&self) -> &[usize] {
        &self.delivery
    }

    /// Recompute everything from the latest full stream.
    pub fn refresh(&mut self, invocations: &[ToolInvocation], flags: StreamFlags) -> RefreshOutcome {
        self.invocations = invocations.to_vec();
        self.running = flags.running;

        let main_index = select_main_artifact(invocations, &self.config);
        self.delivery = delivery_moments(invocations, &self.config);
        self.navigator.ingest(invocations, main_index);

        let gate = PromotionGate {
            user_interacted: self.navigator.state().has_user_interacted,
            loading: flags.loading,
        };
        let promotion = self
            .tracker
            .observe(main_index, self.delivery.last().copied(), gate);

        RefreshOutcome {
            main_index,
            delivery_moments: self.delivery.clone(),
            promotion,
            state: self.navigator.state().clone(),
            display: self.navigator.display_position(),
        }
    }

    /// Scored candidates for diagnostics, best first.
    pub fn candidates(&self) -> Vec<ScoredCandidate> {
        rank_candidates(&self.invocations, &self.config)
    }

    pub fn mark_user_interacted(&mut self) {
        self.navigator.mark_user_interacted();
    }

    pub fn navigate_to(&mut self, raw: usize) -> bool {
        self.navigator.navigate_to(raw, NavOrigin::User)
    }

    /// Step using the configured skip-technical default.
    pub fn step(&mut self, direction: Direction) -> bool {
        self.navigator.step(direction, self.config.skip_technical)
    }

    pub fn step_with(&mut self, direction: Direction, skip_technical: bool) -> bool {
        self.navigator.step(direction, skip_technical)
    }

    /// Next/previous completed delivery moment.
    pub fn step_delivery(&mut self, direction: Direction) -> bool {
        let delivery = &self.delivery;
        self.navigator
            .step_delivery(direction, |raw, _| delivery.binary_search(&raw).is_ok())
    }

    pub fn jump_to_live(&mut self) -> bool {
        self.navigator.jump_to_live()
    }

    pub fn jump_to_latest(&mut self) -> bool {
        self.navigator.jump_to_latest(self.running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::NavMode;
    use serde_json::json;

    fn done(i: usize, tool: &str, payload: serde_json::Value) -> ToolInvocation {
        ToolInvocation::new(i, tool, payload, format!("t{i}")).with_result(json!("ok"), "d")
    }

    fn running(i: usize, tool: &str, payload: serde_json::Value) -> ToolInvocation {
        ToolInvocation::new(i, tool, payload, format!("t{i}"))
    }

    const LIVE: StreamFlags = StreamFlags {
        running: true,
        loading: false,
    };

    #[test]
    fn streaming_session_end_to_end() {
        let mut engine = DeliveryEngine::new(DetectionConfig::default());
        let mut invs = vec![done(0, "execute-command", json!("npm init -y"))];

        let out = engine.refresh(&invs, LIVE);
        assert_eq!(out.main_index, None);
        assert!(out.promotion.is_none());
        assert_eq!(out.state.cursor, Some(0));

        invs.push(running(1, "create-file", json!({"file_path": "index.html"})));
        let out = engine.refresh(&invs, LIVE);
        // Selected from the call payload alone, before the result lands.
        assert_eq!(out.main_index, Some(1));
        assert_eq!(out.promotion, Some(Promotion { raw_index: 1, maximize: true }));
        assert_eq!(out.state.cursor, Some(0));
        assert_eq!(out.display.unwrap().total, 1);

        invs[1].complete(json!("ok"), "d");
        let out = engine.refresh(&invs, LIVE);
        assert!(out.promotion.is_none());
        assert_eq!(out.state.cursor, Some(1));
        assert_eq!(out.state.mode, NavMode::Live);
    }

    #[test]
    fn user_interaction_suppresses_promotion() {
        let mut engine = DeliveryEngine::new(DetectionConfig::default());
        let mut invs = vec![done(0, "ask", json!({})), done(1, "read-file", json!({}))];
        engine.refresh(&invs, LIVE);
        assert!(engine.navigate_to(0));
        assert_eq!(engine.state().mode, NavMode::Manual);

        invs.push(done(2, "create-file", json!({"file_path": "index.html"})));
        let out = engine.refresh(&invs, LIVE);
        assert_eq!(out.main_index, Some(2));
        assert!(out.promotion.is_none());
        assert_eq!(out.state.cursor, Some(0));
    }

    #[test]
    fn loading_defers_promotion() {
        let mut engine = DeliveryEngine::new(DetectionConfig::default());
        let invs = vec![done(0, "create-file", json!({"file_path": "index.html"}))];
        let loading = StreamFlags {
            running: true,
            loading: true,
        };
        assert!(engine.refresh(&invs, loading).promotion.is_none());
        assert!(engine.refresh(&invs, LIVE).promotion.is_some());
    }

    #[test]
    fn deployment_without_main_opens_surface() {
        let mut engine = DeliveryEngine::new(DetectionConfig::default());
        let invs = vec![done(0, "execute-command", json!("ls")), done(1, "deploy", json!({}))];
        let out = engine.refresh(&invs, LIVE);
        assert_eq!(out.delivery_moments, vec![1]);
        assert_eq!(out.promotion, Some(Promotion { raw_index: 1, maximize: false }));
    }

    #[test]
    fn step_delivery_and_latest() {
        let mut engine = DeliveryEngine::new(DetectionConfig::default());
        let invs = vec![
            done(0, "create-file", json!({"file_path": "index.html"})),
            done(1, "execute-command", json!("python -m http.server")),
            done(2, "expose-port", json!({"port": 8000})),
            done(3, "complete", json!({})),
        ];
        engine.refresh(&invs, StreamFlags::default());
        assert!(engine.navigate_to(0));
        assert!(engine.step_delivery(Direction::Forward));
        assert_eq!(engine.state().cursor, Some(2));
        assert!(!engine.step_delivery(Direction::Forward));

        assert!(engine.jump_to_latest());
        assert_eq!(engine.state().cursor, Some(3));
        assert_eq!(engine.state().mode, NavMode::Manual);
    }

    #[test]
    fn step_uses_configured_skip_default() {
        let config = DetectionConfig {
            skip_technical: false,
            ..DetectionConfig::default()
        };
        let mut engine = DeliveryEngine::new(config);
        let invs = vec![
            done(0, "create-file", json!({"file_path": "main.py"})),
            done(1, "execute-command", json!("python main.py")),
            done(2, "deploy", json!({})),
        ];
        engine.refresh(&invs, StreamFlags::default());
        engine.navigate_to(0);
        assert!(engine.step(Direction::Forward));
        assert_eq!(engine.state().cursor, Some(1));
        assert!(engine.step_with(Direction::Backward, true));
        assert_eq!(engine.state().cursor, Some(0));
    }

    #[test]
    fn candidates_reflect_last_refresh() {
        let mut engine = DeliveryEngine::new(DetectionConfig::default());
        let invs = vec![
            done(0, "create-file", json!({"file_path": "styles.css"})),
            done(1, "create-file", json!({"file_path": "index.html"})),
        ];
        engine.refresh(&invs, StreamFlags::default());
        let c = engine.candidates();
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].file_name, "index.html");
    }
}
