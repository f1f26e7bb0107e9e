use crate::tui::app::{AppState, InputAction, Scene};
use crate::tui::ui;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::prelude::{CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

pub fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut AppState,
    tick_rate: Duration,
) -> io::Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(app, key.code) {
                    break;
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }
    }
    Ok(())
}

/// Map a key to an input action; returns true to quit.
pub fn handle_key(app: &mut AppState, code: KeyCode) -> bool {
    if app.claim_dialog_open() {
        let action = match code {
            KeyCode::Esc => Some(InputAction::ClaimCancel),
            KeyCode::Enter => Some(InputAction::ClaimSubmit),
            KeyCode::Left => Some(InputAction::ClaimCategoryPrev),
            KeyCode::Right => Some(InputAction::ClaimCategoryNext),
            KeyCode::Up => Some(InputAction::ClaimRankUp),
            KeyCode::Down => Some(InputAction::ClaimRankDown),
            KeyCode::Char(']') => Some(InputAction::ClaimSecondUp),
            KeyCode::Char('[') => Some(InputAction::ClaimSecondDown),
            KeyCode::Char('s') | KeyCode::Char('S') => Some(InputAction::ClaimSuitNext),
            _ => None,
        };
        if let Some(action) = action {
            let _ = app.handle_input(action);
        }
        return false;
    }
    if matches!(code, KeyCode::Char('?')) {
        let _ = app.handle_input(InputAction::ToggleHelp);
        return false;
    }
    if matches!(code, KeyCode::Char('h') | KeyCode::Char('H')) {
        let _ = app.handle_input(InputAction::ToggleHistory);
        return false;
    }
    if app.help_open() {
        if matches!(code, KeyCode::Esc) {
            let _ = app.handle_input(InputAction::ToggleHelp);
        }
        return false;
    }
    if app.history_open() {
        match code {
            KeyCode::Up => {
                let _ = app.handle_input(InputAction::HistoryUp);
            }
            KeyCode::Down => {
                let _ = app.handle_input(InputAction::HistoryDown);
            }
            KeyCode::Esc => {
                let _ = app.handle_input(InputAction::ToggleHistory);
            }
            _ => {}
        }
        return false;
    }

    match app.scene {
        Scene::Menu => match code {
            KeyCode::Up => {
                let _ = app.handle_input(InputAction::MenuPrev);
            }
            KeyCode::Down => {
                let _ = app.handle_input(InputAction::MenuNext);
            }
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
                let _ = app.handle_input(InputAction::MenuInc);
            }
            KeyCode::Char('-') | KeyCode::Char('_') | KeyCode::Left => {
                let _ = app.handle_input(InputAction::MenuDec);
            }
            KeyCode::Enter => {
                let _ = app.handle_input(InputAction::MenuApply);
            }
            KeyCode::Esc => {
                let _ = app.handle_input(InputAction::MenuCancel);
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                let _ = app.handle_input(InputAction::ToggleMenu);
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            _ => {}
        },
        Scene::Table => match code {
            KeyCode::Char('m') | KeyCode::Char('M') => {
                let _ = app.handle_input(InputAction::ToggleMenu);
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                let _ = app.handle_input(InputAction::NewGame);
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                let _ = app.handle_input(InputAction::ClaimOpen);
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                let _ = app.handle_input(InputAction::CallBullshit);
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            _ => {}
        },
    }
    false
}
