//! Application state and module organization
//!
//! This module contains the main App struct and its behavior, organized
//! by domain: run operations and keyboard input live in submodules.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use usecase_proposer_sdk::Orchestrator;

mod models;
pub use models::*;

mod input;
mod run_ops;

use crate::config::check_credentials;
use crate::history::RunHistory;

impl App {
    /// Create the app around an orchestrator and the directory the stage
    /// artifacts live in
    pub fn new(orchestrator: Arc<dyn Orchestrator>, output_dir: PathBuf) -> Result<Self> {
        let tokio_runtime =
            tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

        Ok(Self {
            company_input: String::new(),
            is_editing: false,
            options: Default::default(),
            example_idx: 0,
            credentials: check_credentials(),
            current_view: View::Run,
            should_quit: false,
            confirm_quit: false,
            phase: RunPhase::Idle,
            error: None,
            notice: None,
            stages: Vec::new(),
            result: None,
            displayed_company: String::new(),
            artifacts: Vec::new(),
            result_scroll: 0,
            history: RunHistory::new(),
            history_cursor: 0,
            orchestrator,
            output_dir,
            active_run: None,
            events_rx: None,
            run_started: None,
            tokio_runtime,
        })
    }
}
