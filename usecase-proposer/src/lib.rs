// Credential validation module
pub mod config;

// Pipeline stage templates module
pub mod pipeline;

// Orchestrator implementation module
pub mod crew;

// LLM client module
pub mod llm;

// Web search client module
pub mod search;

// Run history module
pub mod history;

// Stage artifact I/O module
pub mod artifacts;

// Application state module
pub mod app;

// TUI rendering module
pub mod ui;
