use std::collections::BTreeSet;

use serde::Serialize;

/// The host's presentation surface for the current invocation.
pub trait HostSurface {
    /// Make sure the surface is visible.
    fn open(&mut self);
    fn maximize(&mut self);
}

/// Request to bring a newly detected deliverable forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Promotion {
    pub raw_index: usize,
    /// Only a main artifact earns maximization; other delivery moments just open.
    pub maximize: bool,
}

impl Promotion {
    pub fn apply(&self, host: &mut impl HostSurface) {
        host.open();
        if self.maximize {
            host.maximize();
        }
    }
}

/// Conditions under which promotion is held back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromotionGate {
    pub user_interacted: bool,
    pub loading: bool,
}

/// Fires at most once per distinct index and promotion kind.
#[derive(Debug, Clone, Default)]
pub struct PromotionTracker {
    fired: BTreeSet<(usize, bool)>,
}

impl PromotionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether the latest detection warrants a promotion.
    ///
    /// A main artifact takes precedence over a plain delivery moment.
    pub fn observe(
        &mut self,
        main: Option<usize>,
        latest_delivery: Option<usize>,
        gate: PromotionGate,
    ) -> Option<Promotion> {
        if gate.user_interacted || gate.loading {
            return None;
        }
        let promotion = match (main, latest_delivery) {
            (Some(raw_index), _) => Promotion {
                raw_index,
                maximize: true,
            },
            (None, Some(raw_index)) => Promotion {
                raw_index,
                maximize: false,
            },
            (None, None) => return None,
        };
        if !self.fired.insert((promotion.raw_index, promotion.maximize)) {
            return None;
        }
        tracing::info!(
            raw_index = promotion.raw_index,
            maximize = promotion.maximize,
            "promoting deliverable"
        );
        Some(promotion)
    }

    pub fn has_fired(&self, raw_index: usize) -> bool {
        self.fired.iter().any(|(i, _)| *i == raw_index)
    }
}
