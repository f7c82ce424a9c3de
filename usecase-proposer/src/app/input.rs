//! Keyboard handling
//!
//! Navigation mode drives hotkeys; edit mode captures typed characters
//! into the company input until committed or cancelled.

use crossterm::event::{KeyCode, KeyEvent};

use super::{App, RunPhase, View};

/// Ceiling for the token budget adjustment keys
const MAX_TOKEN_BUDGET: u32 = 32_000;
const TOKEN_STEP: u32 = 500;

impl App {
    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.confirm_quit {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => self.should_quit = true,
                _ => self.confirm_quit = false,
            }
            return;
        }

        if self.is_editing {
            self.handle_edit_key(key.code);
            return;
        }

        match self.current_view {
            View::Run => self.handle_run_key(key.code),
            View::History => self.handle_history_key(key.code),
        }
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.company_input.push(c),
            KeyCode::Backspace => {
                self.company_input.pop();
            }
            KeyCode::Enter | KeyCode::Esc => self.is_editing = false,
            _ => {}
        }
    }

    fn handle_run_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.confirm_quit = true,
            KeyCode::Char('e') | KeyCode::Char('i') => {
                self.is_editing = true;
                self.notice = None;
            }
            KeyCode::Enter => {
                // start_run re-validates and surfaces why a blocked run
                // cannot proceed
                if self.phase != RunPhase::Running {
                    self.start_run();
                }
            }
            KeyCode::Char('x') => self.cycle_example(),
            KeyCode::Char('v') => self.options.verbose = !self.options.verbose,
            KeyCode::Char('c') => {
                self.options.include_competitors = !self.options.include_competitors
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.options.max_tokens =
                    (self.options.max_tokens + TOKEN_STEP).min(MAX_TOKEN_BUDGET);
            }
            KeyCode::Char('-') => {
                self.options.max_tokens =
                    self.options.max_tokens.saturating_sub(TOKEN_STEP).max(TOKEN_STEP);
            }
            KeyCode::Char('h') | KeyCode::Tab => {
                self.current_view = View::History;
                self.history_cursor = 0;
            }
            KeyCode::Up => self.result_scroll = self.result_scroll.saturating_sub(1),
            KeyCode::Down => self.result_scroll = self.result_scroll.saturating_add(1),
            KeyCode::Char('d') => self.export_artifact_at(2),
            KeyCode::Char('1') => self.export_artifact_at(0),
            KeyCode::Char('2') => self.export_artifact_at(1),
            KeyCode::Char('3') => self.export_artifact_at(2),
            KeyCode::Char('r') => self.credentials = crate::config::check_credentials(),
            _ => {}
        }
    }

    fn handle_history_key(&mut self, code: KeyCode) {
        let visible = self.history.recent(crate::ui::HISTORY_LIMIT).len();
        match code {
            KeyCode::Char('q') => self.confirm_quit = true,
            KeyCode::Esc | KeyCode::Tab | KeyCode::Char('h') => {
                self.current_view = View::Run;
            }
            KeyCode::Up => {
                self.history_cursor = self.history_cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                if visible > 0 && self.history_cursor < visible - 1 {
                    self.history_cursor += 1;
                }
            }
            KeyCode::Enter => {
                let seq = self
                    .history
                    .recent(crate::ui::HISTORY_LIMIT)
                    .get(self.history_cursor)
                    .map(|r| r.seq);
                if let Some(seq) = seq {
                    self.show_history_entry(seq);
                }
            }
            _ => {}
        }
    }
}
