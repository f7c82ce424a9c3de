//! Run lifecycle operations
//!
//! `start_run` validates and kicks off the pipeline; `poll_run_events`
//! drains the event channel from the TUI loop; success records history
//! and loads artifacts, failure surfaces the error and frees the run.

use tokio::sync::broadcast::error::TryRecvError;
use usecase_proposer_sdk::{RunStatus, StageEvent};

use super::{App, ArtifactView, RunPhase, StageProgress, View};
use crate::artifacts::{export_artifact, read_artifact, STAGE_ARTIFACTS};
use crate::config::check_credentials;
use crate::pipeline::{build_roles, build_stages, EXAMPLE_COMPANIES};

impl App {
    /// Whether the run control is enabled right now
    pub fn can_run(&self) -> bool {
        self.phase != RunPhase::Running
            && self.credentials.valid
            && !self.company_input.trim().is_empty()
    }

    /// Validate credentials and input, then kick off a pipeline run
    pub fn start_run(&mut self) {
        if self.phase == RunPhase::Running {
            return;
        }
        self.phase = RunPhase::Validating;
        self.error = None;
        self.notice = None;

        self.credentials = check_credentials();
        if !self.credentials.valid {
            self.error = Some(format!(
                "Missing API keys in environment: {}",
                self.credentials.missing_summary()
            ));
            self.phase = RunPhase::Idle;
            return;
        }

        let company = self.company_input.trim().to_string();
        if company.is_empty() {
            self.error = Some("Enter a company name first".to_string());
            self.phase = RunPhase::Idle;
            return;
        }

        let roles = build_roles();
        let stages = build_stages(&company, &self.options);
        self.stages = stages
            .iter()
            .enumerate()
            .map(|(idx, s)| StageProgress {
                stage: idx + 1,
                role: s.role.clone(),
                status: RunStatus::NotStarted,
                messages: Vec::new(),
                artifact: None,
            })
            .collect();

        let orchestrator = self.orchestrator.clone();
        let options = self.options.clone();
        let kicked = self
            .tokio_runtime
            .block_on(orchestrator.kickoff(roles, stages, options));

        match kicked {
            Ok(live) => {
                self.active_run = Some(live.handle);
                self.events_rx = Some(live.events);
                self.run_started = Some(std::time::Instant::now());
                self.displayed_company = company;
                self.result = None;
                self.artifacts.clear();
                self.result_scroll = 0;
                self.history.clear_selection();
                self.phase = RunPhase::Running;
            }
            Err(e) => {
                self.error = Some(format!("Failed to start run: {}", e));
                self.phase = RunPhase::Failed;
            }
        }
    }

    /// Drain pending stage events; called once per TUI tick
    pub fn poll_run_events(&mut self) {
        if self.phase != RunPhase::Running {
            return;
        }

        let mut finished: Option<Result<String, String>> = None;
        let mut channel_closed = false;

        if let Some(rx) = self.events_rx.as_mut() {
            loop {
                match rx.try_recv() {
                    Ok(event) => {
                        if let Some(outcome) = apply_event(&mut self.stages, event) {
                            finished = Some(outcome);
                            break;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Lagged(_)) => continue,
                    Err(TryRecvError::Closed) => {
                        channel_closed = true;
                        break;
                    }
                }
            }
        }

        // Channel closed without a terminal event (e.g. lagged past it):
        // fall back to polling the orchestrator directly
        if finished.is_none() && channel_closed {
            finished = self.resolve_from_status();
        }

        match finished {
            Some(Ok(result)) => self.finish_success(result),
            Some(Err(error)) => self.finish_failure(error),
            None => {}
        }
    }

    fn resolve_from_status(&mut self) -> Option<Result<String, String>> {
        let handle = self.active_run.as_ref()?;
        let orchestrator = self.orchestrator.clone();
        let id = *handle.id();
        let status = self
            .tokio_runtime
            .block_on(orchestrator.status(&id))
            .ok()?;
        match status {
            RunStatus::Completed => {
                let result = self
                    .tokio_runtime
                    .block_on(orchestrator.result_text(&id))
                    .ok()
                    .flatten()
                    .unwrap_or_default();
                Some(Ok(result))
            }
            RunStatus::Failed => Some(Err("Run failed".to_string())),
            _ => None,
        }
    }

    fn finish_success(&mut self, result: String) {
        let duration = self
            .run_started
            .take()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        self.history
            .record(&self.displayed_company, &result, duration);
        self.result = Some(result);
        self.load_artifacts();
        self.events_rx = None;
        self.active_run = None;
        self.phase = RunPhase::Succeeded;
    }

    fn finish_failure(&mut self, error: String) {
        self.error = Some(error);
        self.events_rx = None;
        self.active_run = None;
        self.run_started = None;
        self.phase = RunPhase::Failed;
    }

    /// Read the three stage artifact files; absent files stay `None` and
    /// render as per-artifact warnings
    pub fn load_artifacts(&mut self) {
        self.artifacts = STAGE_ARTIFACTS
            .iter()
            .map(|(label, file)| ArtifactView {
                label,
                file,
                content: read_artifact(&self.output_dir, file),
            })
            .collect();
    }

    /// Show a past run from history in the run view
    pub fn show_history_entry(&mut self, seq: u64) {
        if !self.history.select(seq) {
            return;
        }
        if let Some(record) = self.history.selected() {
            self.result = Some(record.result.clone());
            self.displayed_company = record.company.clone();
        }
        self.result_scroll = 0;
        self.load_artifacts();
        self.current_view = View::Run;
    }

    /// Export one displayed artifact under its download name
    pub fn export_artifact_at(&mut self, index: usize) {
        let Some(file) = self.artifacts.get(index).map(|v| v.file) else {
            return;
        };
        match export_artifact(&self.output_dir, file, &self.displayed_company) {
            Ok(path) => self.notice = Some(format!("Saved {}", path.display())),
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Cycle the company input through the example shortcuts
    pub fn cycle_example(&mut self) {
        self.company_input = EXAMPLE_COMPANIES[self.example_idx].to_string();
        self.example_idx = (self.example_idx + 1) % EXAMPLE_COMPANIES.len();
    }
}

/// Fold one event into the stage display; `Some` when the run is over
fn apply_event(
    stages: &mut [StageProgress],
    event: StageEvent,
) -> Option<Result<String, String>> {
    match event {
        StageEvent::StageStarted { stage, .. } => {
            if let Some(s) = stage_slot(stages, stage) {
                s.status = RunStatus::Running;
            }
            None
        }
        StageEvent::StageMessage { stage, message } => {
            if let Some(s) = stage_slot(stages, stage) {
                s.messages.push(message);
            }
            None
        }
        StageEvent::StageCompleted { stage, .. } => {
            if let Some(s) = stage_slot(stages, stage) {
                s.status = RunStatus::Completed;
            }
            None
        }
        StageEvent::StageFailed { stage, .. } => {
            if let Some(s) = stage_slot(stages, stage) {
                s.status = RunStatus::Failed;
            }
            None
        }
        StageEvent::ArtifactWritten { stage, path } => {
            if let Some(s) = stage_slot(stages, stage) {
                s.artifact = Some(path);
            }
            None
        }
        StageEvent::RunCompleted { result } => Some(Ok(result)),
        StageEvent::RunFailed { error } => Some(Err(error)),
    }
}

/// Stage numbers are 1-based on the wire; 0 or out-of-range numbers from a
/// foreign orchestrator must not panic the render loop
fn stage_slot(stages: &mut [StageProgress], stage: usize) -> Option<&mut StageProgress> {
    stage.checked_sub(1).and_then(|i| stages.get_mut(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_stages() -> Vec<StageProgress> {
        ["Researcher", "Analyst", "Proposal Writer"]
            .iter()
            .enumerate()
            .map(|(idx, role)| StageProgress {
                stage: idx + 1,
                role: role.to_string(),
                status: RunStatus::NotStarted,
                messages: Vec::new(),
                artifact: None,
            })
            .collect()
    }

    #[test]
    fn stage_zero_events_are_ignored() {
        let mut stages = three_stages();
        let outcome = apply_event(
            &mut stages,
            StageEvent::StageStarted {
                stage: 0,
                role: "Researcher".to_string(),
                total_stages: 3,
            },
        );
        assert!(outcome.is_none());
        assert!(stages.iter().all(|s| s.status == RunStatus::NotStarted));
    }

    #[test]
    fn out_of_range_stage_events_are_ignored() {
        let mut stages = three_stages();
        let outcome = apply_event(
            &mut stages,
            StageEvent::StageCompleted {
                stage: 9,
                role: "Researcher".to_string(),
            },
        );
        assert!(outcome.is_none());
        assert!(stages.iter().all(|s| s.status == RunStatus::NotStarted));
    }

    #[test]
    fn in_range_events_update_their_stage() {
        let mut stages = three_stages();
        apply_event(
            &mut stages,
            StageEvent::StageStarted {
                stage: 2,
                role: "Analyst".to_string(),
                total_stages: 3,
            },
        );
        assert_eq!(stages[1].status, RunStatus::Running);
        assert_eq!(stages[0].status, RunStatus::NotStarted);
    }
}
