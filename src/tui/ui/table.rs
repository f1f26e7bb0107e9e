use crate::game::{Phase, Resolution, RoundResult};
use crate::snapshot::{ClaimMode, GameView, PlayerView};
use crate::tui::app::AppState;
use ratatui::prelude::*;
use ratatui::widgets::*;

use super::layout::{card_span, centered_rect, inner};

pub(super) fn draw_table(f: &mut Frame, app: &AppState) {
    let Some(view) = app.view() else {
        let msg = app.action_error().unwrap_or("No table. Press M for the menu.");
        let para = Paragraph::new(msg.to_string())
            .block(Block::default().title("bullshit-poker").borders(Borders::ALL));
        f.render_widget(para, f.area());
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // header
            Constraint::Length(5), // claims
            Constraint::Min(6),    // seats
            Constraint::Length(7), // last round
            Constraint::Length(4), // status bar
        ])
        .split(f.area());

    draw_header(f, chunks[0], app, view);
    draw_claims(f, chunks[1], view);
    draw_seats(f, chunks[2], view);
    draw_last_round(f, chunks[3], view);
    draw_status(f, chunks[4], app, view);

    if app.help_open() {
        draw_help(f);
    } else if app.history_open() {
        draw_history(f, app);
    } else if app.claim_dialog_open() {
        draw_claim_dialog(f, app, view);
    }
}

fn seat_name(view: &GameView, seat: usize) -> &str {
    view.players.get(seat).map(|p| p.name.as_str()).unwrap_or("?")
}

fn draw_header(f: &mut Frame, area: Rect, app: &AppState, view: &GameView) {
    let timer = view
        .turn_remaining()
        .map(|d| format!("{}s", d.as_secs()))
        .unwrap_or_else(|| "--".to_string());
    let phase = match view.phase {
        Phase::AwaitingOpeningClaim => "opening",
        Phase::ClaimOutstanding => "claiming",
        Phase::GameOver => "game over",
    };
    let lines = vec![
        Line::from(format!(
            "Room {}   Round {}   Cards in play: {}   Out at: {} cards",
            app.room_id().unwrap_or("-"),
            view.round,
            view.cards_in_play,
            u16::from(view.penalty_limit) + 1,
        )),
        Line::from(format!(
            "Turn: {}   Timer: {}   Phase: {}",
            seat_name(view, view.turn),
            timer,
            phase
        )),
    ];
    let header = Paragraph::new(lines)
        .block(Block::default().title("bullshit-poker").borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_claims(f: &mut Frame, area: Rect, view: &GameView) {
    let mut lines: Vec<Line> = Vec::new();
    match &view.current_claim {
        Some(entry) => lines.push(Line::from(vec![
            Span::raw("Standing claim: "),
            Span::styled(
                entry.claim.to_string(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" by {}", entry.player)),
        ])),
        None if view.winner.is_none() => lines.push(Line::from(format!(
            "No claim yet. {} opens round {}.",
            seat_name(view, view.opener),
            view.round
        ))),
        None => {}
    }
    if !view.history.is_empty() {
        let trail: Vec<String> = view.history.iter().map(|e| e.claim.to_string()).collect();
        lines.push(Line::from(Span::styled(
            trail.join(" > "),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Claims").borders(Borders::ALL));
    f.render_widget(para, area);
}

fn draw_seats(f: &mut Frame, area: Rect, view: &GameView) {
    let total = view.players.len();
    if total == 0 {
        return;
    }
    // Two rows around the table: top left-to-right, bottom right-to-left.
    let top_cols = total.div_ceil(2);
    let bottom_cols = total - top_cols;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(area);
    for (r, cols) in [top_cols, bottom_cols].into_iter().enumerate() {
        if cols == 0 {
            continue;
        }
        let col_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, cols as u32); cols])
            .split(rows[r]);
        for c in 0..cols {
            let seat = if r == 0 { c } else { total - 1 - c };
            if let Some(p) = view.players.get(seat) {
                draw_seat(f, col_chunks[c], view, p);
            }
        }
    }
}

fn draw_seat(f: &mut Frame, area: Rect, view: &GameView, p: &PlayerView) {
    let mut title = format!("P{} {}", p.seat + 1, p.name);
    if p.is_bot {
        title.push_str(" [BOT]");
    }
    if p.is_host {
        title.push_str(" [Host]");
    }
    if p.seat == view.opener && view.winner.is_none() {
        title.push_str(" [Opener]");
    }
    let border = if p.eliminated {
        Color::DarkGray
    } else if view.winner == Some(p.seat) {
        Color::Green
    } else if p.seat == view.turn && view.viewer == Some(p.seat) {
        Color::Magenta
    } else if p.seat == view.turn {
        Color::Yellow
    } else if view.viewer == Some(p.seat) {
        Color::Cyan
    } else {
        Color::Reset
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let mut lines = Vec::with_capacity(4);
    if p.eliminated {
        lines.push(Line::from(Span::styled("Out", Style::default().fg(Color::DarkGray))));
    } else {
        lines.push(Line::from(format!("Cards: {}", p.card_count)));
        lines.push(Line::from(format!("Penalty: {}/{}", p.penalty_count, view.penalty_limit)));
    }
    if view.winner == Some(p.seat) {
        lines.push(Line::from(Span::styled("Winner", Style::default().fg(Color::Green))));
    }
    if let Some(hand) = p.hand.as_ref().filter(|h| !h.is_empty()) {
        let mut spans = vec![Span::raw("Hand: ")];
        for (i, c) in hand.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(card_span(*c));
        }
        lines.push(Line::from(spans));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}

/// Plain-language summary of a resolved round.
fn describe_result(view: &GameView, r: &RoundResult) -> Vec<String> {
    let claim = r.claim.map(|c| c.to_string()).unwrap_or_else(|| "nothing".to_string());
    let verdict = match r.claim_true {
        Some(true) => "TRUE",
        Some(false) => "FALSE",
        None => "unjudged",
    };
    let mut out = Vec::with_capacity(4);
    out.push(match r.resolution {
        Resolution::Challenge { caller, author } => format!(
            "Round {}: {} called bullshit on {}: {} was {}",
            r.round,
            seat_name(view, caller),
            seat_name(view, author),
            claim,
            verdict
        ),
        Resolution::ClosingClaim { speaker } => format!(
            "Round {}: {} closed with {}: {}",
            r.round,
            seat_name(view, speaker),
            claim,
            verdict
        ),
        Resolution::Timeout { player } => {
            format!("Round {}: {} ran out of time", r.round, seat_name(view, player))
        }
    });
    if !r.cards.is_empty() {
        out.push(format!("Cards: {}", r.cards_desc));
    }
    out.push(match (&r.penalized_name, r.eliminated) {
        (Some(name), true) => format!("{name} is eliminated"),
        (Some(name), false) => format!("{name} takes a penalty card"),
        (None, _) => "Nobody is penalized".to_string(),
    });
    if let Some(w) = r.winner {
        out.push(format!("{} wins the game!", seat_name(view, w)));
    }
    out
}

fn draw_last_round(f: &mut Frame, area: Rect, view: &GameView) {
    let lines: Vec<Line> = match &view.last_result {
        Some(r) => describe_result(view, r).into_iter().map(Line::from).collect(),
        None => vec![Line::from(Span::styled(
            "No round finished yet.",
            Style::default().add_modifier(Modifier::DIM),
        ))],
    };
    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Last round").borders(Borders::ALL));
    f.render_widget(para, area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &AppState, view: &GameView) {
    f.render_widget(Block::default().borders(Borders::ALL).title("Status"), area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(inner(area));

    let action_style = |enabled: bool| {
        if enabled {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        }
    };
    let claim_label = match view.legal.claim {
        Some(ClaimMode::Close) => "C closing claim",
        _ => "C claim",
    };
    let mut left = vec![if view.winner.is_some() {
        Line::from("Game over. Press N for a new game.")
    } else {
        Line::from(vec![
            Span::raw("Actions: "),
            Span::styled(claim_label, action_style(view.legal.claim.is_some())),
            Span::raw(" • "),
            Span::styled("B bullshit!", action_style(view.legal.challenge)),
        ])
    }];
    if let Some(err) = app.action_error() {
        left.push(Line::from(Span::styled(
            format!("Error: {err}"),
            Style::default().fg(Color::Red),
        )));
    }
    let right = vec![Line::from("? help • H history"), Line::from("M menu • Q quit")];
    f.render_widget(Paragraph::new(left).wrap(Wrap { trim: true }), cols[0]);
    f.render_widget(
        Paragraph::new(right).wrap(Wrap { trim: true }).alignment(Alignment::Right),
        cols[1],
    );
}

fn draw_claim_dialog(f: &mut Frame, app: &AppState, view: &GameView) {
    let Some(draft) = app.draft() else {
        return;
    };
    let area = centered_rect(60, 50, f.area());
    let title = match view.legal.claim {
        Some(ClaimMode::Close) => "Closing claim",
        _ => "Make a claim",
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().add_modifier(Modifier::DIM);
    let mut lines = vec![
        Line::from(vec![Span::raw("Category: "), Span::styled(draft.category.to_string(), bold)]),
        Line::from(vec![Span::raw("Rank: "), Span::styled(draft.rank.to_string(), bold)]),
    ];
    if draft.category.needs_second_rank() {
        lines.push(Line::from(vec![
            Span::raw("Second rank: "),
            Span::styled(draft.second.to_string(), bold),
        ]));
    }
    if draft.category.needs_suit() {
        lines.push(Line::from(vec![
            Span::raw("Suit: "),
            Span::styled(draft.suit.symbol().to_string(), bold),
        ]));
    }
    lines.push(Line::from(""));
    match app.draft_preview() {
        Some(Ok(claim)) => lines.push(Line::from(Span::styled(
            format!("Claim: {claim}"),
            Style::default().fg(Color::Green),
        ))),
        Some(Err(msg)) => {
            lines.push(Line::from(Span::styled(msg, Style::default().fg(Color::Red))))
        }
        None => {}
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("←/→ category • ↑/↓ rank • [/] second rank", dim)));
    lines.push(Line::from(Span::styled("S suit • Enter claim • Esc cancel", dim)));
    f.render_widget(Clear, area);
    f.render_widget(Block::default().title(title).borders(Borders::ALL), area);
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).alignment(Alignment::Center),
        inner(area),
    );
}

fn draw_history(f: &mut Frame, app: &AppState) {
    let area = centered_rect(70, 80, f.area());
    let block = Block::default().title("Rounds").borders(Borders::ALL);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line> = Vec::new();
    let results = app.results();
    match app.view() {
        Some(view) if !results.is_empty() => {
            let end = results.len().saturating_sub(app.history_offset());
            let start = end.saturating_sub(AppState::HISTORY_PAGE_SIZE);
            for r in results[start..end].iter().rev() {
                for (i, text) in describe_result(view, r).into_iter().enumerate() {
                    let style = if i == 0 { bold } else { Style::default().fg(Color::Gray) };
                    lines.push(Line::from(Span::styled(text, style)));
                }
            }
        }
        _ => lines.push(Line::from("No rounds finished yet.")),
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Up/Down scroll • Close: H or Esc",
        Style::default().add_modifier(Modifier::DIM),
    )));
    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    f.render_widget(para, inner(area));
}

fn draw_help(f: &mut Frame) {
    let area = centered_rect(70, 80, f.area());
    let block = Block::default().title("Help").borders(Borders::ALL);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(Span::styled("Rules:", bold)),
        Line::from("- Claims are about every card in play, not just yours."),
        Line::from("- Each claim must beat the last. Call bullshit on any claim you doubt."),
        Line::from("- Wrong call or false claim: one more card. Past the limit you're out."),
        Line::from("- When the turn returns to the opener, their claim closes the round."),
        Line::from(""),
        Line::from(Span::styled("Table:", bold)),
        Line::from("- C: make a claim"),
        Line::from("- B: call bullshit"),
        Line::from("- N: new game (after game over)"),
        Line::from("- H: round history"),
        Line::from(""),
        Line::from(Span::styled("Claim dialog:", bold)),
        Line::from("- Left / Right: category"),
        Line::from("- Up / Down: rank"),
        Line::from("- [ / ]: second rank (two pair, full house)"),
        Line::from("- S: suit (flushes)"),
        Line::from("- Enter: claim • Esc: cancel"),
        Line::from(""),
        Line::from(Span::styled("Menu:", bold)),
        Line::from("- M: open / close menu"),
        Line::from("- Up / Down: move • + / -: adjust • Enter: deal"),
        Line::from("- Q: quit"),
        Line::from(""),
        Line::from("Close help: ? or Esc"),
    ];
    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    f.render_widget(para, inner(area));
}
