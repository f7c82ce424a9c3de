use anyhow::{anyhow, bail, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use usecase_proposer_sdk::{Orchestrator, PipelineOptions, RunStatus, StageEvent};

use usecase_proposer::app::App;
use usecase_proposer::config::check_credentials;
use usecase_proposer::crew::StagedCrew;
use usecase_proposer::llm::GeminiClient;
use usecase_proposer::pipeline::{build_roles, build_stages};
use usecase_proposer::search::SerperClient;
use usecase_proposer::ui::ui;

#[derive(Parser)]
#[command(
    name = "usecase-proposer",
    about = "Generate AI/ML use case proposals for a company"
)]
struct Cli {
    /// Run once for this company without the TUI and print the proposal
    #[arg(long)]
    company: Option<String>,

    /// Token budget per pipeline stage
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Cover competitor offerings in the analysis stage
    #[arg(long)]
    include_competitors: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut options = PipelineOptions::default();
    if let Some(max_tokens) = cli.max_tokens {
        options.max_tokens = max_tokens;
    }
    options.include_competitors = cli.include_competitors;

    let output_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    if let Some(company) = cli.company {
        return run_headless(&company, options, output_dir);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let orchestrator = build_orchestrator(output_dir.clone());
    let mut app = App::new(orchestrator, output_dir)?;
    app.options = options;

    // Run main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn build_orchestrator(output_dir: PathBuf) -> Arc<dyn Orchestrator> {
    // Keys may be absent here; the run gate re-checks before any call
    let gemini_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
    let serper_key = std::env::var("SERPER_API_KEY").unwrap_or_default();

    Arc::new(StagedCrew::new(
        Arc::new(GeminiClient::new(gemini_key)),
        Arc::new(SerperClient::new(serper_key)),
        output_dir,
    ))
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        app.poll_run_events();

        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// One pipeline run on the console, no TUI
fn run_headless(company: &str, options: PipelineOptions, output_dir: PathBuf) -> Result<()> {
    let check = check_credentials();
    if !check.valid {
        bail!(
            "Missing API keys in environment: {}",
            check.missing_summary()
        );
    }
    if company.trim().is_empty() {
        bail!("Company name must not be empty");
    }

    let orchestrator = build_orchestrator(output_dir);
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async move {
        let roles = build_roles();
        let stages = build_stages(company, &options);
        let mut live = orchestrator
            .kickoff(roles, stages, options)
            .await
            .map_err(|e| anyhow!("{}", e))?;

        loop {
            match live.events.recv().await {
                Ok(StageEvent::StageStarted {
                    stage,
                    role,
                    total_stages,
                }) => println!("═══ STAGE {}/{}: {} ═══", stage, total_stages, role),
                Ok(StageEvent::StageMessage { message, .. }) => println!("{}", message),
                Ok(StageEvent::ArtifactWritten { path, .. }) => println!("✓ Saved: {}", path),
                Ok(StageEvent::StageCompleted { stage, .. }) => {
                    println!("✓ Stage {} complete", stage)
                }
                Ok(StageEvent::StageFailed { .. }) => {}
                Ok(StageEvent::RunCompleted { result }) => {
                    println!("\n{}", result);
                    return Ok(());
                }
                Ok(StageEvent::RunFailed { error }) => bail!("Run failed: {}", error),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => {
                    // Missed the terminal event; resolve from run status
                    let status = orchestrator
                        .status(live.handle.id())
                        .await
                        .map_err(|e| anyhow!("{}", e))?;
                    match status {
                        RunStatus::Completed => {
                            let result = orchestrator
                                .result_text(live.handle.id())
                                .await
                                .map_err(|e| anyhow!("{}", e))?
                                .unwrap_or_default();
                            println!("\n{}", result);
                            return Ok(());
                        }
                        _ => bail!("Run ended without a result"),
                    }
                }
            }
        }
    })
}
