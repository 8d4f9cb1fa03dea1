use clap::Subcommand;
use std::path::Path;

use lookout_core::DetectionConfig;

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// List effective config values (files and LOOKOUT_* overrides applied)
    List,
    /// Show where config is read from
    Path,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd, cwd: &Path, effective: &DetectionConfig) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::List => list(effective),
        ConfigCmd::Path => path(cwd),
    }
}

// ── Command Implementations ──

/// `lookout config list`
fn list(effective: &DetectionConfig) -> anyhow::Result<()> {
    let val = serde_json::to_value(effective)?;
    if let serde_json::Value::Object(map) = val {
        for (k, v) in &map {
            println!("{k} = {v}");
        }
    }
    Ok(())
}

/// `lookout config path`
fn path(cwd: &Path) -> anyhow::Result<()> {
    let project = DetectionConfig::project_path(cwd);
    let state = |p: &Path| -> anyhow::Result<&'static str> {
        Ok(match DetectionConfig::from_file(p)? {
            Some(_) => "active",
            None if p.exists() => "no detection section",
            None => "missing",
        })
    };
    println!("project: {} ({})", project.display(), state(&project)?);
    match DetectionConfig::user_path() {
        Some(user) => println!("user:    {} ({})", user.display(), state(&user)?),
        None => println!("user:    (no config directory)"),
    }
    Ok(())
}
