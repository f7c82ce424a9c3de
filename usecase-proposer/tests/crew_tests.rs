//! Integration tests for the staged crew orchestrator
//!
//! Drives full runs against scripted model and search providers: stage
//! ordering, context chaining, artifact writing, and failure semantics.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::timeout;

use usecase_proposer::artifacts::STAGE_ARTIFACTS;
use usecase_proposer::crew::StagedCrew;
use usecase_proposer::llm::TextModel;
use usecase_proposer::pipeline::{build_roles, build_stages};
use usecase_proposer::search::{SearchHit, SearchProvider};
use usecase_proposer_sdk::{Orchestrator, PipelineOptions, RunStatus, StageEvent};

// ============================================================================
// Test doubles
// ============================================================================

/// Create a temporary directory for testing
fn create_temp_dir(name: &str) -> PathBuf {
    let temp_dir = std::env::temp_dir().join(format!("crew_test_{}", name));
    std::fs::create_dir_all(&temp_dir).unwrap();
    temp_dir
}

/// Clean up temporary directory
fn cleanup_temp_dir(path: &PathBuf) {
    if path.exists() {
        std::fs::remove_dir_all(path).ok();
    }
}

#[derive(Default)]
struct ScriptedModel {
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn generate(&self, _system: &str, prompt: &str, _max_tokens: u32) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(format!("stage-{}-output", call))
    }
}

/// Fails on the given call number, succeeds otherwise
struct FailingModel {
    fail_at: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl TextModel for FailingModel {
    async fn generate(&self, _system: &str, _prompt: &str, _max_tokens: u32) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_at {
            Err(anyhow!("model unavailable"))
        } else {
            Ok(format!("stage-{}-output", call))
        }
    }
}

#[derive(Default)]
struct StaticSearch {
    calls: AtomicUsize,
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![SearchHit {
            title: "Company profile".to_string(),
            link: "https://example.com".to_string(),
            snippet: "industry snapshot".to_string(),
        }])
    }
}

async fn drain_until_terminal(
    events: &mut tokio::sync::broadcast::Receiver<StageEvent>,
) -> (Vec<StageEvent>, Result<String, String>) {
    let mut seen = Vec::new();
    loop {
        let event = timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for events")
            .expect("event channel closed before a terminal event");
        match event {
            StageEvent::RunCompleted { result } => return (seen, Ok(result)),
            StageEvent::RunFailed { error } => return (seen, Err(error)),
            other => seen.push(other),
        }
    }
}

// ============================================================================
// Successful runs
// ============================================================================

#[tokio::test]
async fn full_run_completes_and_writes_all_artifacts() {
    let dir = create_temp_dir("full_run");
    let model = Arc::new(ScriptedModel::default());
    let search = Arc::new(StaticSearch::default());
    let crew = StagedCrew::new(model.clone(), search.clone(), dir.clone());

    let options = PipelineOptions::default();
    let live = crew
        .kickoff(build_roles(), build_stages("Tesla", &options), options)
        .await
        .unwrap();
    let mut events = live.events;

    let (seen, outcome) = drain_until_terminal(&mut events).await;
    let result = outcome.expect("run should succeed");

    let completed = seen
        .iter()
        .filter(|e| matches!(e, StageEvent::StageCompleted { .. }))
        .count();
    assert_eq!(completed, 3);
    assert_eq!(result, "stage-3-output");

    for (_, file) in STAGE_ARTIFACTS {
        assert!(dir.join(file).exists(), "artifact {} not written", file);
    }
    assert_eq!(
        std::fs::read_to_string(dir.join("final_proposal.txt")).unwrap(),
        "stage-3-output"
    );

    assert_eq!(
        crew.status(live.handle.id()).await.unwrap(),
        RunStatus::Completed
    );
    assert_eq!(
        crew.result_text(live.handle.id()).await.unwrap().as_deref(),
        Some("stage-3-output")
    );

    cleanup_temp_dir(&dir);
}

#[tokio::test]
async fn research_is_search_grounded_and_stages_chain_context() {
    let dir = create_temp_dir("chaining");
    let model = Arc::new(ScriptedModel::default());
    let search = Arc::new(StaticSearch::default());
    let crew = StagedCrew::new(model.clone(), search.clone(), dir.clone());

    let options = PipelineOptions::default();
    let live = crew
        .kickoff(build_roles(), build_stages("Netflix", &options), options)
        .await
        .unwrap();
    let mut events = live.events;
    drain_until_terminal(&mut events).await.1.unwrap();

    // Search ran once, for the research stage only
    assert_eq!(search.calls.load(Ordering::SeqCst), 1);

    let prompts = model.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].contains("Web search snippets"));
    assert!(prompts[0].contains("industry snapshot"));
    // Stage N+1 sees stage N's output
    assert!(prompts[1].contains("stage-1-output"));
    assert!(prompts[2].contains("stage-2-output"));
    // Every stage carries its expected-output contract
    for prompt in prompts.iter() {
        assert!(prompt.contains("Expected output"));
    }

    cleanup_temp_dir(&dir);
}

#[tokio::test]
async fn verbose_runs_emit_stage_messages_and_quiet_runs_do_not() {
    let dir = create_temp_dir("verbosity");
    let search = Arc::new(StaticSearch::default());

    for verbose in [true, false] {
        let model = Arc::new(ScriptedModel::default());
        let crew = StagedCrew::new(model, search.clone(), dir.clone());
        let options = PipelineOptions {
            verbose,
            ..Default::default()
        };
        let live = crew
            .kickoff(build_roles(), build_stages("Acme", &options), options)
            .await
            .unwrap();
        let mut events = live.events;
        let (seen, outcome) = drain_until_terminal(&mut events).await;
        outcome.unwrap();

        let messages = seen
            .iter()
            .filter(|e| matches!(e, StageEvent::StageMessage { .. }))
            .count();
        if verbose {
            assert_eq!(messages, 3);
        } else {
            assert_eq!(messages, 0);
        }
    }

    cleanup_temp_dir(&dir);
}

// ============================================================================
// Failure semantics
// ============================================================================

#[tokio::test]
async fn stage_failure_fails_the_whole_run_without_later_artifacts() {
    let dir = create_temp_dir("failure");
    let model = Arc::new(FailingModel {
        fail_at: 2,
        calls: AtomicUsize::new(0),
    });
    let search = Arc::new(StaticSearch::default());
    let crew = StagedCrew::new(model, search, dir.clone());

    let options = PipelineOptions::default();
    let live = crew
        .kickoff(build_roles(), build_stages("Acme", &options), options)
        .await
        .unwrap();
    let mut events = live.events;

    let (seen, outcome) = drain_until_terminal(&mut events).await;
    let error = outcome.expect_err("run should fail");
    assert!(error.contains("Stage 2"));

    assert!(seen.iter().any(|e| matches!(
        e,
        StageEvent::StageFailed { stage: 2, .. }
    )));

    // The failed stage and everything after it left no artifact
    assert!(dir.join(STAGE_ARTIFACTS[0].1).exists());
    assert!(!dir.join(STAGE_ARTIFACTS[1].1).exists());
    assert!(!dir.join(STAGE_ARTIFACTS[2].1).exists());

    assert_eq!(
        crew.status(live.handle.id()).await.unwrap(),
        RunStatus::Failed
    );
    assert_eq!(crew.result_text(live.handle.id()).await.unwrap(), None);

    cleanup_temp_dir(&dir);
}

#[tokio::test]
async fn finished_runs_are_dropped_on_the_next_kickoff() {
    let dir = create_temp_dir("run_cleanup");
    let crew = StagedCrew::new(
        Arc::new(ScriptedModel::default()),
        Arc::new(StaticSearch::default()),
        dir.clone(),
    );

    let options = PipelineOptions::default();
    let first = crew
        .kickoff(build_roles(), build_stages("Acme", &options), options.clone())
        .await
        .unwrap();
    let mut events = first.events;
    drain_until_terminal(&mut events).await.1.unwrap();
    assert_eq!(
        crew.status(first.handle.id()).await.unwrap(),
        RunStatus::Completed
    );

    // The next kickoff retires the finished run's state
    let second = crew
        .kickoff(build_roles(), build_stages("Tesla", &options), options)
        .await
        .unwrap();
    assert!(crew.status(first.handle.id()).await.is_err());

    let mut events = second.events;
    drain_until_terminal(&mut events).await.1.unwrap();
    assert_eq!(
        crew.status(second.handle.id()).await.unwrap(),
        RunStatus::Completed
    );

    cleanup_temp_dir(&dir);
}

#[tokio::test]
async fn kickoff_rejects_malformed_pipelines() {
    let dir = create_temp_dir("malformed");
    let crew = StagedCrew::new(
        Arc::new(ScriptedModel::default()),
        Arc::new(StaticSearch::default()),
        dir.clone(),
    );

    let empty = crew
        .kickoff(build_roles(), Vec::new(), PipelineOptions::default())
        .await;
    assert!(empty.is_err());

    let options = PipelineOptions::default();
    let mut stages = build_stages("Acme", &options);
    stages[1].role = "Ghost".to_string();
    let unknown_role = crew.kickoff(build_roles(), stages, options).await;
    assert!(unknown_role.is_err());

    cleanup_temp_dir(&dir);
}
