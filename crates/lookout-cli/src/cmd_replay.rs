use std::path::Path;

use lookout_core::{DetectionConfig, ToolInvocation};
use lookout_nav::{DeliveryEngine, Direction, HostSurface, NavMode, RefreshOutcome, StreamFlags};

pub struct ReplayParams<'a> {
    pub file: &'a Path,
    pub config: &'a DetectionConfig,
    pub skip_technical: bool,
    pub json: bool,
    pub lenient: bool,
}

/// Stand-in presentation surface that records what the engine asked for.
#[derive(Debug, Default)]
pub(crate) struct ConsoleHost {
    pub opened: bool,
    pub maximized: bool,
}

impl HostSurface for ConsoleHost {
    fn open(&mut self) {
        self.opened = true;
    }

    fn maximize(&mut self) {
        self.maximized = true;
    }
}

/// One refresh of the replay, as printed.
#[derive(Debug, serde::Serialize)]
pub(crate) struct ReplayFrame {
    pub step: String,
    pub outcome: RefreshOutcome,
}

/// Feed the stream in one call at a time: first as running, then completed.
pub(crate) fn replay(
    invocations: &[ToolInvocation],
    config: &DetectionConfig,
    host: &mut ConsoleHost,
) -> (DeliveryEngine, Vec<ReplayFrame>) {
    let mut engine = DeliveryEngine::new(config.clone());
    let mut frames = Vec::new();
    let mut visible: Vec<ToolInvocation> = Vec::with_capacity(invocations.len());

    for (i, inv) in invocations.iter().enumerate() {
        let mut pending = inv.clone();
        pending.result_payload = None;
        pending.result_succeeded = None;
        pending.completed_at = None;
        visible.push(pending);
        let flags = StreamFlags {
            running: true,
            loading: false,
        };
        let outcome = engine.refresh(&visible, flags);
        record(&mut frames, host, format!("+{i} {} (running)", inv.tool_name), outcome);

        if inv.is_complete() {
            visible[i] = inv.clone();
            let last = i + 1 == invocations.len();
            let flags = StreamFlags {
                running: !last,
                loading: false,
            };
            let outcome = engine.refresh(&visible, flags);
            record(&mut frames, host, format!(" {i} {} done", inv.tool_name), outcome);
        }
    }
    (engine, frames)
}

fn record(frames: &mut Vec<ReplayFrame>, host: &mut ConsoleHost, step: String, outcome: RefreshOutcome) {
    if let Some(p) = &outcome.promotion {
        p.apply(host);
    }
    frames.push(ReplayFrame { step, outcome });
}

fn render_frame(frame: &ReplayFrame) -> String {
    let o = &frame.outcome;
    let cursor = o
        .state
        .cursor
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mode = match o.state.mode {
        NavMode::Live => "live",
        NavMode::Manual => "manual",
    };
    let display = o
        .display
        .map(|d| {
            let behind = if d.behind_live { " behind" } else { "" };
            format!("{}/{}{behind}", d.index + 1, d.total)
        })
        .unwrap_or_else(|| "0/0".to_string());
    let main = o
        .main_index
        .map(|m| m.to_string())
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "{:<40} cursor={cursor:<4} {mode:<6} view={display:<12} main={main}",
        frame.step
    );
    if let Some(p) = &o.promotion {
        let action = if p.maximize { "open+maximize" } else { "open" };
        line.push_str(&format!("  >> promote #{} ({action})", p.raw_index));
    }
    line
}

/// `lookout replay <file>`
pub fn execute(params: &ReplayParams<'_>) -> anyhow::Result<()> {
    let invocations = crate::load_stream(params.file, params.lenient)?;
    let mut host = ConsoleHost::default();
    let (mut engine, frames) = replay(&invocations, params.config, &mut host);

    for frame in &frames {
        if params.json {
            println!("{}", serde_json::to_string(frame)?);
        } else {
            println!("{}", render_frame(frame));
        }
    }

    if params.skip_technical && !params.json {
        println!();
        println!("walkthrough (skipping technical steps):");
        engine.navigate_to(0);
        if let Some(first) = engine.navigator().current() {
            println!("  #{} {}", first.raw_index, first.invocation.tool_name);
        }
        while engine.step_with(Direction::Forward, true) {
            if let Some(cur) = engine.navigator().current() {
                println!("  #{} {}", cur.raw_index, cur.invocation.tool_name);
            }
        }
    }

    if !params.json {
        println!();
        println!(
            "surface: opened={} maximized={}",
            host.opened, host.maximized
        );
    }
    Ok(())
}
