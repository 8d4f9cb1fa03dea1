//! Cursor over the invocation stream with Live and Manual modes.
//!
//! Live follows the newest completed entry as the stream grows. Any explicit
//! move to an earlier entry pins the cursor (Manual) until the user jumps
//! back to live. All state changes go through the methods here.

use lookout_core::tools::{is_complete_action, is_technical};
use lookout_core::ToolInvocation;
use serde::Serialize;

use crate::snapshot::{DisplayPosition, NavSnapshot, SnapshotArena};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavMode {
    Live,
    Manual,
}

/// Who asked for a move. Only user moves set the interaction latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOrigin {
    User,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationState {
    /// Raw index; `None` only while the stream is empty.
    pub cursor: Option<usize>,
    pub mode: NavMode,
    pub main_delivery: Option<usize>,
    /// Latched by the first user navigation; never cleared.
    pub has_user_interacted: bool,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            cursor: None,
            mode: NavMode::Live,
            main_delivery: None,
            has_user_interacted: false,
        }
    }
}

impl NavigationState {
    /// Main index in the numeric form hosts expect: `-1` when there is none.
    pub fn main_delivery_raw(&self) -> i64 {
        self.main_delivery
            .and_then(|i| i64::try_from(i).ok())
            .unwrap_or(-1)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    arena: SnapshotArena,
    state: NavigationState,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn arena(&self) -> &SnapshotArena {
        &self.arena
    }

    pub fn current(&self) -> Option<&NavSnapshot> {
        self.state.cursor.and_then(|c| self.arena.get(c))
    }

    pub fn display_position(&self) -> Option<DisplayPosition> {
        self.state.cursor.and_then(|c| self.arena.to_display(c))
    }

    pub fn mark_user_interacted(&mut self) {
        self.state.has_user_interacted = true;
    }

    /// Re-snapshot the stream and move (or hold) the cursor per mode.
    pub fn ingest(&mut self, invocations: &[ToolInvocation], main_delivery: Option<usize>) {
        self.arena = SnapshotArena::from_invocations(invocations);
        self.state.main_delivery = main_delivery;

        let Some(last) = self.arena.last_raw() else {
            self.state.cursor = None;
            return;
        };

        match (self.state.cursor, self.state.mode) {
            // First look at a non-empty stream: last completed, else last raw.
            (None, _) => self.state.cursor = Some(self.live_target(last)),
            (Some(_), NavMode::Live) => {
                let target = self.live_target(last);
                if self.state.cursor != Some(target) {
                    tracing::debug!(cursor = target, "live cursor follows stream");
                }
                self.state.cursor = Some(target);
            }
            (Some(c), NavMode::Manual) => self.state.cursor = Some(c.min(last)),
        }
    }

    /// Newest entry if it finished, otherwise the last completed one.
    fn live_target(&self, last: usize) -> usize {
        if self.arena.newest_is_complete() {
            last
        } else {
            self.arena.last_completed_raw().unwrap_or(last)
        }
    }

    /// Point the cursor at `raw`. Out-of-range requests are ignored.
    ///
    /// Landing on the last entry means Live; anything earlier means Manual.
    pub fn navigate_to(&mut self, raw: usize, origin: NavOrigin) -> bool {
        let Some(last) = self.arena.last_raw() else {
            return false;
        };
        if raw > last {
            tracing::debug!(raw, last, "ignoring out-of-range navigation");
            return false;
        }
        let mode = if raw == last {
            NavMode::Live
        } else {
            NavMode::Manual
        };
        self.set_cursor(raw, mode, origin);
        true
    }

    /// Move one completed entry, optionally skipping technical steps.
    pub fn step(&mut self, direction: Direction, skip_technical: bool) -> bool {
        let main = self.state.main_delivery;
        self.step_until(direction, |raw, inv| {
            !(skip_technical && is_skippable(raw, inv, main))
        })
    }

    /// Move to the next/previous completed entry accepted by `is_delivery`.
    pub fn step_delivery(
        &mut self,
        direction: Direction,
        is_delivery: impl Fn(usize, &ToolInvocation) -> bool,
    ) -> bool {
        self.step_until(direction, is_delivery)
    }

    fn step_until(
        &mut self,
        direction: Direction,
        accept: impl Fn(usize, &ToolInvocation) -> bool,
    ) -> bool {
        let Some(pos) = self.display_position() else {
            return false;
        };
        let mut display = pos.index;
        loop {
            display = match direction {
                Direction::Forward if display + 1 < pos.total => display + 1,
                Direction::Backward if display > 0 => display - 1,
                _ => return false,
            };
            let Some(raw) = self.arena.to_raw(display) else {
                return false;
            };
            let Some(snapshot) = self.arena.get(raw) else {
                return false;
            };
            if accept(raw, &snapshot.invocation) {
                return self.navigate_to(raw, NavOrigin::User);
            }
        }
    }

    /// Follow the stream again from its newest entry.
    pub fn jump_to_live(&mut self) -> bool {
        let Some(last) = self.arena.last_raw() else {
            return false;
        };
        self.set_cursor(last, NavMode::Live, NavOrigin::User);
        true
    }

    /// One-time catch-up to the newest entry once the stream has stopped.
    ///
    /// While the stream is still running this is the same as [`Self::jump_to_live`].
    pub fn jump_to_latest(&mut self, running: bool) -> bool {
        if running {
            return self.jump_to_live();
        }
        let Some(last) = self.arena.last_raw() else {
            return false;
        };
        self.set_cursor(last, NavMode::Manual, NavOrigin::User);
        true
    }

    fn set_cursor(&mut self, raw: usize, mode: NavMode, origin: NavOrigin) {
        if self.state.mode != mode {
            tracing::info!(from = ?self.state.mode, to = ?mode, cursor = raw, "navigation mode changed");
        }
        self.state.cursor = Some(raw);
        self.state.mode = mode;
        if origin == NavOrigin::User {
            self.state.has_user_interacted = true;
        }
    }
}

/// Technical steps are skipped; `complete` is skipped unless it is the main delivery.
fn is_skippable(raw: usize, inv: &ToolInvocation, main_delivery: Option<usize>) -> bool {
    if is_complete_action(&inv.tool_name) {
        return main_delivery != Some(raw);
    }
    is_technical(&inv.tool_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn done(i: usize, tool: &str) -> ToolInvocation {
        ToolInvocation::new(i, tool, json!({}), format!("t{i}")).with_result(json!("ok"), "d")
    }

    fn running(i: usize, tool: &str) -> ToolInvocation {
        ToolInvocation::new(i, tool, json!({}), format!("t{i}"))
    }

    fn nav_with(invs: &[ToolInvocation]) -> Navigator {
        let mut nav = Navigator::new();
        nav.ingest(invs, None);
        nav
    }

    #[test]
    fn empty_stream_has_no_cursor() {
        let mut nav = nav_with(&[]);
        assert_eq!(nav.state().cursor, None);
        assert!(!nav.navigate_to(0, NavOrigin::User));
        assert!(!nav.step(Direction::Forward, true));
        assert!(!nav.jump_to_live());
        assert!(!nav.state().has_user_interacted);
    }

    #[test]
    fn first_ingest_prefers_last_completed() {
        let nav = nav_with(&[done(0, "ask"), done(1, "create-file"), running(2, "deploy")]);
        assert_eq!(nav.state().cursor, Some(1));
        assert_eq!(nav.state().mode, NavMode::Live);

        let nothing_done = nav_with(&[running(0, "ask"), running(1, "deploy")]);
        assert_eq!(nothing_done.state().cursor, Some(1));
    }

    #[test]
    fn live_append_follows_completed_entries() {
        let mut invs = vec![done(0, "ask")];
        let mut nav = nav_with(&invs);

        invs.push(running(1, "create-file"));
        nav.ingest(&invs, None);
        assert_eq!(nav.state().cursor, Some(0));
        assert_eq!(nav.state().mode, NavMode::Live);

        invs[1].complete(json!("ok"), "d");
        nav.ingest(&invs, None);
        assert_eq!(nav.state().cursor, Some(1));
        assert_eq!(nav.state().mode, NavMode::Live);
    }

    #[test]
    fn manual_mode_holds_on_append() {
        let mut invs = vec![done(0, "ask"), done(1, "create-file"), done(2, "deploy")];
        let mut nav = nav_with(&invs);
        assert!(nav.navigate_to(0, NavOrigin::User));
        assert_eq!(nav.state().mode, NavMode::Manual);

        invs.push(done(3, "complete"));
        nav.ingest(&invs, None);
        assert_eq!(nav.state().cursor, Some(0));
        assert_eq!(nav.state().mode, NavMode::Manual);
    }

    #[test]
    fn navigate_to_last_is_live_and_out_of_range_is_ignored() {
        let mut nav = nav_with(&[done(0, "ask"), done(1, "deploy")]);
        assert!(nav.navigate_to(0, NavOrigin::System));
        assert_eq!(nav.state().mode, NavMode::Manual);
        assert!(!nav.state().has_user_interacted);

        assert!(!nav.navigate_to(7, NavOrigin::User));
        assert_eq!(nav.state().cursor, Some(0));
        assert!(!nav.state().has_user_interacted);

        assert!(nav.navigate_to(1, NavOrigin::User));
        assert_eq!(nav.state().mode, NavMode::Live);
        assert!(nav.state().has_user_interacted);
    }

    #[test]
    fn dual_indexing_hides_streaming_entry() {
        let invs = vec![done(0, "create-file"), running(1, "execute-command")];
        let mut nav = nav_with(&invs);
        let pos = nav.display_position().unwrap();
        assert_eq!((pos.index, pos.total), (0, 1));
        assert!(!nav.step(Direction::Forward, false));
        assert_eq!(nav.state().cursor, Some(0));
    }

    #[test]
    fn step_skips_technical_entries() {
        let invs = vec![
            done(0, "create-file"),
            done(1, "execute-command"),
            done(2, "read-file"),
            done(3, "deploy"),
            done(4, "complete"),
        ];
        let mut nav = nav_with(&invs);
        nav.navigate_to(0, NavOrigin::User);

        assert!(nav.step(Direction::Forward, true));
        assert_eq!(nav.state().cursor, Some(3));
        assert_eq!(nav.state().mode, NavMode::Manual);

        // Only a non-main `complete` remains ahead: nothing to land on.
        assert!(!nav.step(Direction::Forward, true));
        assert_eq!(nav.state().cursor, Some(3));

        assert!(nav.step(Direction::Forward, false));
        assert_eq!(nav.state().cursor, Some(4));
        assert_eq!(nav.state().mode, NavMode::Live);

        assert!(nav.step(Direction::Backward, true));
        assert_eq!(nav.state().cursor, Some(3));
        assert!(nav.step(Direction::Backward, true));
        assert_eq!(nav.state().cursor, Some(0));
        assert!(!nav.step(Direction::Backward, true));
    }

    #[test]
    fn complete_is_kept_when_it_is_the_main_delivery() {
        let invs = vec![done(0, "create-file"), done(1, "complete")];
        let mut nav = Navigator::new();
        nav.ingest(&invs, Some(1));
        nav.navigate_to(0, NavOrigin::User);
        assert!(nav.step(Direction::Forward, true));
        assert_eq!(nav.state().cursor, Some(1));
    }

    #[test]
    fn stepping_translates_through_ids_around_running_entries() {
        let invs = vec![
            done(0, "create-file"),
            running(1, "execute-command"),
            done(2, "create-file"),
            running(3, "deploy"),
        ];
        let mut nav = nav_with(&invs);
        assert_eq!(nav.state().cursor, Some(2));
        assert!(nav.step(Direction::Backward, false));
        assert_eq!(nav.state().cursor, Some(0));
        assert!(nav.step(Direction::Forward, false));
        assert_eq!(nav.state().cursor, Some(2));
        // Raw 2 is not the last raw entry, so even this forward move is Manual.
        assert_eq!(nav.state().mode, NavMode::Manual);
    }

    #[test]
    fn step_delivery_uses_predicate() {
        let invs = vec![
            done(0, "deploy"),
            done(1, "create-file"),
            done(2, "ask"),
            done(3, "connect-service"),
        ];
        let mut nav = nav_with(&invs);
        nav.navigate_to(0, NavOrigin::User);
        let is_deploy_or_connect =
            |_: usize, inv: &ToolInvocation| matches!(inv.tool_name.as_str(), "deploy" | "connect-service");
        assert!(nav.step_delivery(Direction::Forward, is_deploy_or_connect));
        assert_eq!(nav.state().cursor, Some(3));
        assert!(nav.step_delivery(Direction::Backward, is_deploy_or_connect));
        assert_eq!(nav.state().cursor, Some(0));
    }

    #[test]
    fn jump_to_live_and_latest() {
        let invs = vec![done(0, "ask"), done(1, "create-file"), running(2, "deploy")];
        let mut nav = nav_with(&invs);
        nav.navigate_to(0, NavOrigin::User);

        assert!(nav.jump_to_live());
        assert_eq!(nav.state().cursor, Some(2));
        assert_eq!(nav.state().mode, NavMode::Live);
        let pos = nav.display_position().unwrap();
        assert!(pos.behind_live);
        assert_eq!(pos.index, 1);

        nav.navigate_to(0, NavOrigin::User);
        assert!(nav.jump_to_latest(false));
        assert_eq!(nav.state().cursor, Some(2));
        assert_eq!(nav.state().mode, NavMode::Manual);

        assert!(nav.jump_to_latest(true));
        assert_eq!(nav.state().mode, NavMode::Live);
    }

    #[test]
    fn main_delivery_numeric_form() {
        let mut nav = nav_with(&[done(0, "create-file")]);
        assert_eq!(nav.state().main_delivery_raw(), -1);
        nav.ingest(&[done(0, "create-file")], Some(0));
        assert_eq!(nav.state().main_delivery_raw(), 0);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut invs = vec![running(0, "ask")];
        let mut nav = nav_with(&invs);
        for i in 1..6 {
            invs.push(if i % 2 == 0 { done(i, "deploy") } else { running(i, "ask") });
            nav.ingest(&invs, None);
            let c = nav.state().cursor.unwrap();
            assert!(c < invs.len());
        }
    }

    #[test]
    fn manual_cursor_is_clamped_when_stream_shrinks() {
        let invs: Vec<_> = (0..5).map(|i| done(i, "ask")).collect();
        let mut nav = nav_with(&invs);
        assert!(nav.navigate_to(3, NavOrigin::User));
        assert_eq!(nav.state().mode, NavMode::Manual);

        nav.ingest(&invs[..2], None);
        assert_eq!(nav.state().cursor, Some(1));
        assert_eq!(nav.state().mode, NavMode::Manual);
        let pos = nav.display_position().unwrap();
        assert_eq!((pos.index, pos.total), (1, 2));
    }
}
