//! Additive confidence scoring for candidate artifacts.
//!
//! Each contribution is independent; the total is their plain sum and may be
//! negative. The weights are fixed constants carried over unchanged from the
//! heuristic's first tuning. Treat them as compatibility data, not as
//! something to re-derive.

use std::path::Path;
use std::sync::LazyLock;

use lookout_core::config::DEFAULT_RECENCY_WEIGHT;
use lookout_core::tools;
use lookout_core::ToolName;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_EXTENSION_SCORE: f64 = 20.0;
pub const KNOWN_NAME_BONUS: f64 = 80.0;
pub const SLIDE_BONUS: f64 = 160.0;
pub const KEYWORD_BONUS: f64 = 25.0;
pub const NEGATIVE_KEYWORD_PENALTY: f64 = -50.0;
pub const AUXILIARY_PENALTY: f64 = -80.0;
pub const PATH_DEPTH_BASE: f64 = 40.0;
pub const PATH_DEPTH_STEP: f64 = 12.0;
pub const PUBLIC_ROOT_BONUS: f64 = 10.0;
pub const SUSPICIOUS_DIR_PENALTY: f64 = -70.0;
/// Files with no known location are assumed to sit at the top level.
pub const ROOT_DEFAULT_BONUS: f64 = 30.0;

const EXTENSION_SCORES: &[(&str, f64)] = &[
    ("html", 140.0),
    ("htm", 130.0),
    ("tsx", 110.0),
    ("jsx", 105.0),
    ("ts", 95.0),
    ("js", 90.0),
    ("py", 85.0),
    ("vue", 80.0),
    ("svelte", 80.0),
    ("php", 70.0),
    ("css", 45.0),
    ("md", 40.0),
    ("scss", 40.0),
    ("json", 35.0),
    ("xml", 30.0),
    ("yaml", 30.0),
    ("yml", 30.0),
    ("csv", 30.0),
    ("txt", 25.0),
];

/// Canonical entry points, grouped by project archetype.
pub const KNOWN_MAIN_FILES: &[(&str, &[&str])] = &[
    ("web", &["index.html", "index.htm", "home.html", "app.html"]),
    ("game", &["game.html", "game.js", "snake.html", "tetris.html"]),
    ("script", &["main.py", "app.py", "run.py", "script.py", "main.js"]),
    ("dashboard", &["dashboard.html", "dashboard.py", "streamlit_app.py"]),
    ("api", &["server.js", "server.py", "api.py", "index.js", "app.js"]),
    ("landing", &["landing.html", "landing_page.html", "landing-page.html"]),
];

pub const KEYWORDS: &[&str] = &[
    "index",
    "main",
    "landing",
    "home",
    "app",
    "dashboard",
    "page",
    "start",
];

pub const NEGATIVE_KEYWORDS: &[&str] = &["test", "spec", "mock", "draft", "backup", "placeholder"];

/// Config and metadata files that are never the deliverable.
pub const AUXILIARY_FILES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "tsconfig.json",
    "requirements.txt",
    "pyproject.toml",
    "readme.md",
    "license",
    "license.md",
    ".gitignore",
    ".env",
    ".env.example",
    ".eslintrc.json",
    ".prettierrc",
    "vite.config.js",
    "vite.config.ts",
    "tailwind.config.js",
    "postcss.config.js",
    "dockerfile",
];

/// Directory names that mark a file as test, migration or archive material.
const SUSPICIOUS_DIRS: &[&str] = &[
    "test",
    "tests",
    "__tests__",
    "spec",
    "specs",
    "__mocks__",
    "mocks",
    "fixtures",
    "migrations",
    "migration",
    "archive",
    "archives",
    "backup",
    "backups",
    "old",
    "deprecated",
];

static SLIDE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^slide_\d+\.html$").expect("static slide pattern"));

/// Everything the score depends on. Borrowed so callers never clone payloads.
#[derive(Debug, Clone)]
pub struct CandidateContext<'a> {
    pub sequence_index: usize,
    pub total_invocations: usize,
    pub file_name: &'a str,
    pub file_path: Option<&'a str>,
    pub tool_name: &'a ToolName,
    pub recency_weight: f64,
}

impl<'a> CandidateContext<'a> {
    pub fn new(
        sequence_index: usize,
        total_invocations: usize,
        file_name: &'a str,
        file_path: Option<&'a str>,
        tool_name: &'a ToolName,
    ) -> Self {
        Self {
            sequence_index,
            total_invocations,
            file_name,
            file_path,
            tool_name,
            recency_weight: DEFAULT_RECENCY_WEIGHT,
        }
    }

    pub fn with_recency_weight(mut self, weight: f64) -> Self {
        self.recency_weight = weight;
        self
    }
}

/// Ordered `(reason, contribution)` pairs and their sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub parts: Vec<(String, f64)>,
    pub total: f64,
}

impl ScoreBreakdown {
    fn from_parts(parts: Vec<(&'static str, f64)>) -> Self {
        let total = parts.iter().map(|(_, v)| v).sum();
        Self {
            parts: parts.into_iter().map(|(r, v)| (r.to_string(), v)).collect(),
            total,
        }
    }

    pub fn get(&self, reason: &str) -> Option<f64> {
        self.parts.iter().find(|(r, _)| r == reason).map(|(_, v)| *v)
    }

    /// One-line `reason=+N` rendering for logs.
    pub fn render(&self) -> String {
        let parts: Vec<String> = self
            .parts
            .iter()
            .filter(|(_, v)| *v != 0.0)
            .map(|(r, v)| format!("{r}={v:+}"))
            .collect();
        format!("{} [{}]", self.total, parts.join(" "))
    }
}

pub fn score(ctx: &CandidateContext<'_>) -> f64 {
    score_breakdown(ctx).total
}

pub fn score_breakdown(ctx: &CandidateContext<'_>) -> ScoreBreakdown {
    let lower = ctx.file_name.to_lowercase();
    let (path_depth, public_root, path_penalty) = path_contributions(ctx.file_path);

    ScoreBreakdown::from_parts(vec![
        ("extension", extension_score(&lower)),
        (
            "known_name",
            if known_name_archetype(&lower).is_some() {
                KNOWN_NAME_BONUS
            } else {
                0.0
            },
        ),
        (
            "slide",
            if is_slide_file(&lower) { SLIDE_BONUS } else { 0.0 },
        ),
        ("keywords", keyword_hits(&lower) as f64 * KEYWORD_BONUS),
        (
            "negative_keywords",
            negative_keyword_hits(&lower) as f64 * NEGATIVE_KEYWORD_PENALTY,
        ),
        (
            "auxiliary",
            if is_auxiliary_file(&lower) {
                AUXILIARY_PENALTY
            } else {
                0.0
            },
        ),
        ("path_depth", path_depth),
        ("public_root", public_root),
        ("path_penalty", path_penalty),
        ("tool", tool_bonus(ctx.tool_name)),
        (
            "recency",
            recency_bonus(ctx.sequence_index, ctx.total_invocations, ctx.recency_weight),
        ),
    ])
}

pub fn extension_score(file_name: &str) -> f64 {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    ext.and_then(|e| {
        EXTENSION_SCORES
            .iter()
            .find(|(known, _)| *known == e)
            .map(|(_, s)| *s)
    })
    .unwrap_or(UNKNOWN_EXTENSION_SCORE)
}

/// The archetype a canonical entry-point name belongs to.
pub fn known_name_archetype(file_name: &str) -> Option<&'static str> {
    let lower = file_name.to_lowercase();
    KNOWN_MAIN_FILES
        .iter()
        .find(|(_, names)| names.contains(&lower.as_str()))
        .map(|(archetype, _)| *archetype)
}

pub fn is_slide_file(file_name: &str) -> bool {
    file_name.eq_ignore_ascii_case("metadata.json") || SLIDE_FILE.is_match(file_name)
}

pub fn keyword_hits(file_name: &str) -> usize {
    let lower = file_name.to_lowercase();
    KEYWORDS.iter().filter(|k| lower.contains(*k)).count()
}

pub fn negative_keyword_hits(file_name: &str) -> usize {
    let lower = file_name.to_lowercase();
    NEGATIVE_KEYWORDS.iter().filter(|k| lower.contains(*k)).count()
}

pub fn is_auxiliary_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    AUXILIARY_FILES.contains(&lower.as_str())
}

/// Known name, slide pattern, or any keyword hit.
pub fn is_known_main_file(file_name: &str) -> bool {
    known_name_archetype(file_name).is_some()
        || is_slide_file(file_name)
        || keyword_hits(file_name) > 0
}

/// `(depth, public root, suspicious directory)` contributions.
fn path_contributions(file_path: Option<&str>) -> (f64, f64, f64) {
    let Some(path) = file_path else {
        return (ROOT_DEFAULT_BONUS, 0.0, 0.0);
    };
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let count = segments.len().max(1);
    let depth = (PATH_DEPTH_BASE - PATH_DEPTH_STEP * (count - 1) as f64).max(0.0);

    let public = match segments.first() {
        Some(first) if count > 1 && first.eq_ignore_ascii_case("public") => PUBLIC_ROOT_BONUS,
        _ => 0.0,
    };

    let dirs = &segments[..segments.len().saturating_sub(1)];
    let suspicious = dirs.iter().any(|d| {
        let lower = d.to_lowercase();
        SUSPICIOUS_DIRS.contains(&lower.as_str())
    });
    let penalty = if suspicious { SUSPICIOUS_DIR_PENALTY } else { 0.0 };

    (depth, public, penalty)
}

/// How likely this kind of invocation is to produce the final deliverable.
pub fn tool_bonus(tool: &ToolName) -> f64 {
    match tool.as_str() {
        tools::CREATE_FILE => 40.0,
        tools::FULL_FILE_REWRITE => 30.0,
        tools::CREATE_SLIDE => 25.0,
        tools::VALIDATE_SLIDE => 20.0,
        tools::EDIT_FILE => 15.0,
        tools::STR_REPLACE => 10.0,
        _ => 0.0,
    }
}

/// Linear in position: 0 at the first invocation, `weight` at the last.
/// A single-invocation stream counts as fully recent.
pub fn recency_bonus(sequence_index: usize, total: usize, weight: f64) -> f64 {
    if total <= 1 {
        return weight;
    }
    let ratio = sequence_index as f64 / (total - 1) as f64;
    ratio.clamp(0.0, 1.0) * weight
}
