//! Staged crew orchestrator
//!
//! Concrete [`Orchestrator`] that drives the three stages in declared
//! order on a background task. Each stage's output is fed into the next
//! stage's prompt and flushed to the stage's artifact file before the
//! stage is reported complete. Any error fails the whole run: no retry,
//! no partial-result recovery.

use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use usecase_proposer_sdk::{
    async_trait, LiveRun, Orchestrator, PipelineOptions, RoleDescriptor, RunHandle, RunResult,
    RunStatus, StageDescriptor, StageEvent,
};
use uuid::Uuid;

use crate::llm::TextModel;
use crate::search::{format_hits, SearchProvider};

/// Event channel capacity per run
const EVENT_CAPACITY: usize = 256;

/// Verbose stage messages are previews, not full transcripts
const MESSAGE_PREVIEW_CHARS: usize = 240;

/// Internal state for one run
struct RunState {
    status: RunStatus,
    events_tx: broadcast::Sender<StageEvent>,
    result: Option<String>,
}

/// Sequential three-stage crew over an LLM and a search tool
pub struct StagedCrew {
    model: Arc<dyn TextModel>,
    search: Arc<dyn SearchProvider>,
    /// Directory the stage artifacts are written into
    output_dir: PathBuf,
    /// Active and finished runs (uuid -> state)
    runs: Arc<Mutex<HashMap<Uuid, RunState>>>,
}

impl StagedCrew {
    pub fn new(
        model: Arc<dyn TextModel>,
        search: Arc<dyn SearchProvider>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            model,
            search,
            output_dir,
            runs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Drop state for finished runs, freeing their event channels and
    /// result text. History keeps the results the UI still needs.
    fn cleanup_finished_runs(&self) {
        let mut runs = self.runs.lock().unwrap();
        runs.retain(|_, state| matches!(state.status, RunStatus::Running));
    }
}

#[async_trait]
impl Orchestrator for StagedCrew {
    async fn kickoff(
        &self,
        roles: Vec<RoleDescriptor>,
        stages: Vec<StageDescriptor>,
        options: PipelineOptions,
    ) -> RunResult<LiveRun> {
        // Finished runs are only queried until the next kickoff
        self.cleanup_finished_runs();

        if stages.is_empty() {
            return Err("Cannot kick off a run without stages".into());
        }
        for stage in &stages {
            if !roles.iter().any(|r| r.name == stage.role) {
                return Err(format!("Stage role '{}' has no descriptor", stage.role).into());
            }
        }

        let (events_tx, events_rx) = broadcast::channel(EVENT_CAPACITY);
        let run_id = Uuid::new_v4();

        self.runs.lock().unwrap().insert(
            run_id,
            RunState {
                status: RunStatus::Running,
                events_tx: events_tx.clone(),
                result: None,
            },
        );

        let model = self.model.clone();
        let search = self.search.clone();
        let output_dir = self.output_dir.clone();
        let runs = self.runs.clone();
        tokio::spawn(async move {
            let outcome =
                execute_stages(&*model, &*search, &output_dir, &roles, &stages, &options, &events_tx)
                    .await;

            let mut runs = runs.lock().unwrap();
            if let Some(state) = runs.get_mut(&run_id) {
                match outcome {
                    Ok(result) => {
                        state.status = RunStatus::Completed;
                        state.result = Some(result.clone());
                        let _ = events_tx.send(StageEvent::RunCompleted { result });
                    }
                    Err(e) => {
                        state.status = RunStatus::Failed;
                        let _ = events_tx.send(StageEvent::RunFailed {
                            error: format!("{:#}", e),
                        });
                    }
                }
            }
        });

        Ok(LiveRun {
            handle: RunHandle::new(run_id),
            events: events_rx,
        })
    }

    async fn status(&self, handle_id: &Uuid) -> RunResult<RunStatus> {
        let runs = self.runs.lock().unwrap();
        let state = runs
            .get(handle_id)
            .ok_or_else(|| format!("Run not found: {}", handle_id))?;
        Ok(state.status.clone())
    }

    async fn result_text(&self, handle_id: &Uuid) -> RunResult<Option<String>> {
        let runs = self.runs.lock().unwrap();
        let state = runs
            .get(handle_id)
            .ok_or_else(|| format!("Run not found: {}", handle_id))?;
        Ok(state.result.clone())
    }
}

/// Run every stage in order, returning the final stage's output
async fn execute_stages(
    model: &dyn TextModel,
    search: &dyn SearchProvider,
    output_dir: &std::path::Path,
    roles: &[RoleDescriptor],
    stages: &[StageDescriptor],
    options: &PipelineOptions,
    events_tx: &broadcast::Sender<StageEvent>,
) -> Result<String> {
    let total_stages = stages.len();
    let mut earlier_findings = String::new();
    let mut last_output = String::new();

    for (idx, stage) in stages.iter().enumerate() {
        let stage_no = idx + 1;
        let _ = events_tx.send(StageEvent::StageStarted {
            stage: stage_no,
            role: stage.role.clone(),
            total_stages,
        });

        let stage_result = run_stage(
            model,
            search,
            output_dir,
            roles,
            stage,
            stage_no,
            idx == 0,
            &earlier_findings,
            options,
            events_tx,
        )
        .await;

        let output = match stage_result {
            Ok(output) => output,
            Err(e) => {
                let _ = events_tx.send(StageEvent::StageFailed {
                    stage: stage_no,
                    role: stage.role.clone(),
                    error: format!("{:#}", e),
                });
                return Err(e);
            }
        };

        let _ = events_tx.send(StageEvent::StageCompleted {
            stage: stage_no,
            role: stage.role.clone(),
        });

        earlier_findings.push_str(&format!("\n## {}\n{}\n", stage.role, output));
        last_output = output;
    }

    Ok(last_output)
}

async fn run_stage(
    model: &dyn TextModel,
    search: &dyn SearchProvider,
    output_dir: &std::path::Path,
    roles: &[RoleDescriptor],
    stage: &StageDescriptor,
    stage_no: usize,
    grounded: bool,
    earlier_findings: &str,
    options: &PipelineOptions,
    events_tx: &broadcast::Sender<StageEvent>,
) -> Result<String> {
    let role = roles
        .iter()
        .find(|r| r.name == stage.role)
        .ok_or_else(|| anyhow!("Role '{}' missing", stage.role))?;

    let mut prompt = stage.goal.clone();

    // The research stage is grounded with fresh web snippets
    if grounded {
        let hits = search
            .search(&stage.goal)
            .await
            .context("Web search for the research stage failed")?;
        if !hits.is_empty() {
            prompt.push_str("\n\n# Web search snippets\n");
            prompt.push_str(&format_hits(&hits));
        }
    }

    if !earlier_findings.is_empty() {
        prompt.push_str("\n\n# Findings from earlier stages\n");
        prompt.push_str(earlier_findings);
    }
    prompt.push_str("\n\n# Expected output\n");
    prompt.push_str(&stage.expected_output);

    let system = format!(
        "You are the {}. {}\nYour goal: {}",
        role.name, role.backstory, role.goal
    );

    let output = model
        .generate(&system, &prompt, options.max_tokens)
        .await
        .with_context(|| format!("Stage {} ({}) generation failed", stage_no, stage.role))?;

    if options.verbose {
        let preview: String = output.chars().take(MESSAGE_PREVIEW_CHARS).collect();
        let _ = events_tx.send(StageEvent::StageMessage {
            stage: stage_no,
            message: preview,
        });
    }

    // Flush the artifact before reporting the stage complete, so the
    // presentation layer never observes a completed stage without its file
    let path = output_dir.join(&stage.output_file);
    tokio::fs::write(&path, &output)
        .await
        .with_context(|| format!("Failed to write artifact {}", path.display()))?;
    let _ = events_tx.send(StageEvent::ArtifactWritten {
        stage: stage_no,
        path: stage.output_file.display().to_string(),
    });

    Ok(output)
}
