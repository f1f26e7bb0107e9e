use bullshit_poker::logging;
use bullshit_poker::tui::{app::AppState, controller};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::prelude::*;
use std::io::{self, IsTerminal, Stdout};
use std::time::Duration;

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn main() -> io::Result<()> {
    if !io::stdout().is_terminal() {
        println!(
            "bullshit-poker needs a real terminal (TTY).\n\
             Run it in a terminal and press q to quit. Version: {}",
            bullshit_poker::VERSION
        );
        return Ok(());
    }
    if let Err(e) = logging::init_from_env() {
        eprintln!("logging disabled: {e}");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("room")
        .enable_all()
        .build()?;
    let mut app = AppState::new(runtime.handle().clone());

    let mut terminal = setup_terminal()?;
    let res = controller::run(&mut terminal, &mut app, Duration::from_millis(200));

    // Always attempt to restore terminal
    restore_terminal(terminal)?;
    drop(app);
    runtime.shutdown_timeout(Duration::from_millis(500));
    res
}
