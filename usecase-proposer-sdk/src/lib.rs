//! Shared contracts between the TUI and orchestrator implementations.
//!
//! The external multi-agent engine is modelled as a narrow [`Orchestrator`]
//! trait: kick off a run, observe its stage events, query its status. The
//! consumer never sees agent internals, only descriptors in and text out.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::broadcast;
use uuid::Uuid;

// Re-export async trait for convenience
pub use async_trait::async_trait;

/// Tunable options applied to a whole pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Token budget handed to the model for each stage
    pub max_tokens: u32,
    /// Emit per-stage message events while the run is in flight
    pub verbose: bool,
    /// Ask the analysis stage to cover competitor offerings as well
    pub include_competitors: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_tokens: 5000,
            verbose: true,
            include_competitors: false,
        }
    }
}

/// An agent role participating in the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDescriptor {
    pub name: String,
    pub goal: String,
    pub backstory: String,
}

/// One pipeline stage handed to the orchestrator
///
/// Built fresh per run from static templates, read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDescriptor {
    /// Name of the [`RoleDescriptor`] that executes this stage
    pub role: String,
    /// Goal text, already interpolated with the company name
    pub goal: String,
    pub backstory: String,
    pub expected_output: String,
    /// Relative path the stage's artifact is written to
    pub output_file: PathBuf,
}

/// Run status for TUI tracking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunStatus {
    NotStarted,
    Running,
    Completed,
    Failed,
}

/// Structured events emitted by a run in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageEvent {
    /// Stage started
    StageStarted {
        stage: usize,
        role: String,
        total_stages: usize,
    },
    /// Intermediate output from a stage (verbose runs only)
    StageMessage { stage: usize, message: String },
    /// Stage finished and its artifact was flushed to disk
    StageCompleted { stage: usize, role: String },
    /// Stage failed; the whole run fails with it
    StageFailed {
        stage: usize,
        role: String,
        error: String,
    },
    /// Artifact file written for a stage
    ArtifactWritten { stage: usize, path: String },
    /// Run finished with the aggregate proposal text
    RunCompleted { result: String },
    /// Run failed; no partial result is recovered
    RunFailed { error: String },
}

/// Handle for tracking an async run
#[derive(Debug, Clone)]
pub struct RunHandle {
    pub id: Uuid,
}

impl RunHandle {
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }
}

/// A freshly kicked-off run: its handle plus an event receiver that was
/// subscribed before the first event could fire
pub struct LiveRun {
    pub handle: RunHandle,
    pub events: broadcast::Receiver<StageEvent>,
}

/// Result type for orchestrator operations
pub type RunResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Narrow interface over the external multi-agent execution engine
///
/// Implementations own stage sequencing, artifact writing and LLM calls.
/// Any error inside the run surfaces as a single [`StageEvent::RunFailed`];
/// there is no retry and no partial-result recovery.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Start a run and return its handle together with an event stream
    async fn kickoff(
        &self,
        roles: Vec<RoleDescriptor>,
        stages: Vec<StageDescriptor>,
        options: PipelineOptions,
    ) -> RunResult<LiveRun>;

    /// Current status of a run
    async fn status(&self, handle_id: &Uuid) -> RunResult<RunStatus>;

    /// Aggregate result text of a completed run, if any
    async fn result_text(&self, handle_id: &Uuid) -> RunResult<Option<String>>;
}
