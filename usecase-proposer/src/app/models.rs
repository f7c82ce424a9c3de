//! Main application state

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use usecase_proposer_sdk::{Orchestrator, PipelineOptions, RunHandle, RunStatus, StageEvent};

use crate::config::CredentialCheck;
use crate::history::RunHistory;

/// Per-run state machine of the run view
///
/// `Failed` is terminal for that run only: it gates nothing and the next
/// run starts from it exactly as from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunPhase {
    Idle,
    Validating,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Run,
    History,
}

/// Display state for one pipeline stage
#[derive(Debug, Clone)]
pub struct StageProgress {
    pub stage: usize,
    pub role: String,
    pub status: RunStatus,
    pub messages: Vec<String>,
    /// Artifact path reported by the orchestrator, once written
    pub artifact: Option<String>,
}

/// One stage artifact as the presentation layer sees it
#[derive(Debug, Clone)]
pub struct ArtifactView {
    pub label: &'static str,
    pub file: &'static str,
    /// `None` when the file is absent; rendered as a warning
    pub content: Option<String>,
}

/// Main application state
pub struct App {
    // Input form
    pub company_input: String,
    pub is_editing: bool,
    pub options: PipelineOptions,
    pub example_idx: usize,

    // Credentials (cached, re-checked on every run attempt)
    pub credentials: CredentialCheck,

    pub current_view: View,
    pub should_quit: bool,
    pub confirm_quit: bool,

    // Run state
    pub phase: RunPhase,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub stages: Vec<StageProgress>,
    pub result: Option<String>,
    /// Company of the currently displayed result
    pub displayed_company: String,
    pub artifacts: Vec<ArtifactView>,
    pub result_scroll: u16,

    // History
    pub history: RunHistory,
    pub history_cursor: usize,

    // Orchestration plumbing
    pub orchestrator: Arc<dyn Orchestrator>,
    pub output_dir: PathBuf,
    pub active_run: Option<RunHandle>,
    pub events_rx: Option<broadcast::Receiver<StageEvent>>,
    pub run_started: Option<Instant>,

    // Tokio runtime for async operations
    pub tokio_runtime: tokio::runtime::Runtime,
}
