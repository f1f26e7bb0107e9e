use crate::agents::{BotProfile, Difficulty};
use crate::cards::{Rank, Suit};
use crate::catalog::escalations_of;
use crate::claim::{Claim, ClaimError, HandCategory};
use crate::config::TableConfig;
use crate::engine::Intent;
use crate::evaluator::is_escalation;
use crate::game::RoundResult;
use crate::lobby::{PlayerId, Roster};
use crate::room::{generate_pin, spawn_room, RoomHandle, RoomOptions};
use crate::snapshot::{ClaimMode, GameView};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Scene {
    Menu,
    Table,
}

/// High-level input actions for the TUI controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputAction {
    MenuNext,
    MenuPrev,
    MenuInc,
    MenuDec,
    MenuApply,
    MenuCancel,
    ToggleMenu,
    ToggleHelp,
    ToggleHistory,
    HistoryUp,
    HistoryDown,
    NewGame,
    ClaimOpen,
    ClaimCategoryNext,
    ClaimCategoryPrev,
    ClaimRankUp,
    ClaimRankDown,
    ClaimSecondUp,
    ClaimSecondDown,
    ClaimSuitNext,
    ClaimSubmit,
    ClaimCancel,
    CallBullshit,
}

/// A claim being built in the claim dialog. Every field is always set so the
/// player can flip categories without losing their picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimDraft {
    pub category: HandCategory,
    pub rank: Rank,
    pub second: Rank,
    pub suit: Suit,
}

impl ClaimDraft {
    pub fn from_claim(claim: &Claim) -> Self {
        let fallback = if claim.rank() == Rank::Two { Rank::Three } else { Rank::Two };
        Self {
            category: claim.category(),
            rank: claim.rank(),
            second: claim.second_rank().unwrap_or(fallback),
            suit: claim.suit().unwrap_or(Suit::Spades),
        }
    }

    pub fn claim(&self) -> Result<Claim, ClaimError> {
        Claim::new(self.category, self.rank, Some(self.second), Some(self.suit))
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub struct AppState {
    pub scene: Scene,
    pub started: Instant,
    runtime: Handle,
    room: Option<RoomHandle>,
    me: Option<PlayerId>,
    view: Option<GameView>,
    results: Vec<RoundResult>,
    draft: Option<ClaimDraft>,
    // Menu config being edited
    pub menu_index: usize,
    pub cfg_bots: usize,
    pub cfg_turn_secs: u16,
    pub cfg_bot_difficulty: Difficulty,
    pub cfg_bot_delay_ms: u64,
    pub bots: usize,
    pub turn_secs: u16,
    pub bot_difficulty: Difficulty,
    pub bot_delay_ms: u64,
    help_open: bool,
    history_open: bool,
    history_offset: usize,
    action_error: Option<String>,
    action_error_at: Option<Instant>,
}

impl AppState {
    pub const HISTORY_PAGE_SIZE: usize = 20;
    pub const PLAYER_NAME: &'static str = "You";
    const ACTION_ERROR_TTL: Duration = Duration::from_secs(3);
    const DEFAULT_BOTS: usize = 3;
    const DEFAULT_BOT_DELAY_MS: u64 = 900;

    /// Rooms are spawned on `runtime`; the app itself runs on a plain thread.
    pub fn new(runtime: Handle) -> Self {
        Self {
            scene: Scene::Menu,
            started: Instant::now(),
            runtime,
            room: None,
            me: None,
            view: None,
            results: Vec::new(),
            draft: None,
            menu_index: 0,
            cfg_bots: Self::DEFAULT_BOTS,
            cfg_turn_secs: TableConfig::DEFAULT_TURN_SECS,
            cfg_bot_difficulty: Difficulty::Medium,
            cfg_bot_delay_ms: Self::DEFAULT_BOT_DELAY_MS,
            bots: Self::DEFAULT_BOTS,
            turn_secs: TableConfig::DEFAULT_TURN_SECS,
            bot_difficulty: Difficulty::Medium,
            bot_delay_ms: Self::DEFAULT_BOT_DELAY_MS,
            help_open: false,
            history_open: false,
            history_offset: 0,
            action_error: None,
            action_error_at: None,
        }
    }

    pub fn view(&self) -> Option<&GameView> {
        self.view.as_ref()
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room.as_ref().map(|r| r.id())
    }

    /// Finished rounds this session, oldest first.
    pub fn results(&self) -> &[RoundResult] {
        &self.results
    }

    pub fn draft(&self) -> Option<&ClaimDraft> {
        self.draft.as_ref()
    }

    pub fn claim_dialog_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn help_open(&self) -> bool {
        self.help_open
    }

    pub fn history_open(&self) -> bool {
        self.history_open
    }

    pub fn history_offset(&self) -> usize {
        self.history_offset
    }

    pub(crate) fn close_help(&mut self) {
        self.help_open = false;
    }

    pub(crate) fn close_history(&mut self) {
        self.history_open = false;
    }

    fn set_action_error(&mut self, msg: String) {
        self.action_error = Some(msg);
        self.action_error_at = Some(Instant::now());
    }

    fn clear_action_error(&mut self) {
        self.action_error = None;
        self.action_error_at = None;
    }

    /// Start a new room with the applied settings, closing any previous one.
    pub fn start_game(&mut self) {
        if let Some(old) = self.room.take() {
            old.close();
        }
        self.view = None;
        self.me = None;
        self.draft = None;
        self.results.clear();
        self.history_offset = 0;
        self.clear_action_error();

        let config = match TableConfig::default().with_turn_time(self.turn_secs) {
            Ok(c) => c,
            Err(e) => return self.set_action_error(e.to_string()),
        };
        let mut roster = Roster::new(config);
        let seated = roster.join(Self::PLAYER_NAME).and_then(|me| {
            for _ in 0..self.bots {
                roster.add_bot()?;
            }
            roster.ensure_startable()?;
            Ok(me)
        });
        let me = match seated {
            Ok(me) => me,
            Err(e) => return self.set_action_error(e.to_string()),
        };

        let delay = self.bot_delay_ms;
        let options = RoomOptions {
            bot_profile: BotProfile::for_difficulty(self.bot_difficulty)
                .with_delay(delay, delay.saturating_mul(2)),
            ..RoomOptions::default()
        };
        let spawned = {
            let _guard = self.runtime.enter();
            spawn_room(generate_pin(&mut rand::rng()), &roster, options)
        };
        match spawned {
            Ok(room) => {
                info!(room = room.id(), bots = self.bots, "table started");
                self.room = Some(room);
                self.me = Some(me);
                self.refresh();
            }
            Err(e) => self.set_action_error(e.to_string()),
        }
    }

    /// Pull the latest view from the room and record finished rounds.
    pub fn refresh(&mut self) {
        let (Some(room), Some(me)) = (self.room.as_ref(), self.me.as_ref()) else {
            return;
        };
        let view = room.view_for(me);
        if let Some(result) = view.as_ref().and_then(|v| v.last_result.as_ref()) {
            if self.results.last().map(|r| r.round) != Some(result.round) {
                self.results.push(result.clone());
            }
        }
        if view.as_ref().is_some_and(|v| !v.is_my_turn()) {
            self.draft = None;
        }
        self.view = view;
    }

    /// Periodic housekeeping from the controller loop.
    pub fn tick(&mut self) {
        if let Some(at) = self.action_error_at {
            if at.elapsed() >= Self::ACTION_ERROR_TTL {
                self.clear_action_error();
            }
        }
        self.refresh();
    }

    fn act(&mut self, intent: Intent) -> bool {
        let (Some(room), Some(me)) = (self.room.as_ref(), self.me.as_ref()) else {
            return false;
        };
        let expected = self.view.as_ref().map(|v| v.version);
        match room.blocking_act(me, intent, expected) {
            Ok(_) => {
                self.clear_action_error();
                self.refresh();
                true
            }
            Err(e) => {
                debug!(error = %e, "action refused");
                self.set_action_error(e.to_string());
                self.refresh();
                false
            }
        }
    }

    fn open_claim_dialog(&mut self) -> bool {
        let Some(view) = self.view.as_ref() else {
            return false;
        };
        if !view.is_my_turn() || view.legal.claim.is_none() {
            return false;
        }
        let current = view.current_claim.as_ref().map(|e| e.claim);
        let seed = match current {
            Some(c) => escalations_of(Some(&c)).next().copied().unwrap_or(c),
            None => Claim::high_card(Rank::Two),
        };
        self.draft = Some(ClaimDraft::from_claim(&seed));
        true
    }

    fn edit_draft(&mut self, f: impl FnOnce(&mut ClaimDraft)) {
        if let Some(d) = self.draft.as_mut() {
            f(d);
        }
    }

    /// The draft as a claim, or why it cannot be made right now.
    pub fn draft_preview(&self) -> Option<Result<Claim, String>> {
        let draft = self.draft.as_ref()?;
        let claim = match draft.claim() {
            Ok(c) => c,
            Err(e) => return Some(Err(e.to_string())),
        };
        let view = self.view.as_ref()?;
        let previous = view.current_claim.as_ref().map(|e| &e.claim);
        if view.legal.claim == Some(ClaimMode::Escalate) && !is_escalation(&claim, previous) {
            let prev = previous.map(|c| c.to_string()).unwrap_or_default();
            return Some(Err(format!("does not beat {prev}")));
        }
        Some(Ok(claim))
    }

    fn submit_claim(&mut self) -> bool {
        match self.draft_preview() {
            Some(Ok(claim)) => {
                let sent = self.act(Intent::Claim(claim));
                if sent {
                    self.draft = None;
                }
                sent
            }
            Some(Err(msg)) => {
                self.set_action_error(msg);
                false
            }
            None => false,
        }
    }

    fn call_bullshit(&mut self) -> bool {
        if !self.view.as_ref().is_some_and(|v| v.legal.challenge) {
            return false;
        }
        self.draft = None;
        self.act(Intent::Challenge)
    }

    /// Returns true when an action reached the room and was accepted.
    pub fn handle_input(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::ToggleMenu => {
                self.toggle_menu();
                false
            }
            InputAction::ToggleHelp => {
                if self.scene == Scene::Table {
                    self.history_open = false;
                    self.help_open = !self.help_open;
                }
                false
            }
            InputAction::ToggleHistory => {
                if self.scene == Scene::Table {
                    self.help_open = false;
                    if !self.history_open {
                        self.history_offset = 0;
                    }
                    self.history_open = !self.history_open;
                }
                false
            }
            InputAction::HistoryUp => {
                if self.scene == Scene::Table && self.history_open {
                    let max_offset = self.results.len().saturating_sub(Self::HISTORY_PAGE_SIZE);
                    self.history_offset = (self.history_offset + 1).min(max_offset);
                }
                false
            }
            InputAction::HistoryDown => {
                if self.scene == Scene::Table && self.history_open && self.history_offset > 0 {
                    self.history_offset -= 1;
                }
                false
            }
            InputAction::MenuNext => {
                if self.scene == Scene::Menu {
                    self.menu_next();
                }
                false
            }
            InputAction::MenuPrev => {
                if self.scene == Scene::Menu {
                    self.menu_prev();
                }
                false
            }
            InputAction::MenuInc => {
                if self.scene == Scene::Menu {
                    self.menu_inc();
                }
                false
            }
            InputAction::MenuDec => {
                if self.scene == Scene::Menu {
                    self.menu_dec();
                }
                false
            }
            InputAction::MenuApply => {
                if self.scene == Scene::Menu {
                    self.apply_menu();
                }
                false
            }
            InputAction::MenuCancel => {
                if self.scene == Scene::Menu {
                    self.cancel_menu();
                }
                false
            }
            InputAction::NewGame => {
                let over = self.view.as_ref().map_or(true, |v| v.winner.is_some());
                if self.scene == Scene::Table && over {
                    self.start_game();
                }
                false
            }
            InputAction::ClaimOpen => self.scene == Scene::Table && self.open_claim_dialog(),
            InputAction::ClaimCategoryNext => {
                self.edit_draft(|d| d.category = d.category.next_wrapping());
                false
            }
            InputAction::ClaimCategoryPrev => {
                self.edit_draft(|d| d.category = d.category.prev_wrapping());
                false
            }
            InputAction::ClaimRankUp => {
                self.edit_draft(|d| d.rank = d.rank.next_wrapping());
                false
            }
            InputAction::ClaimRankDown => {
                self.edit_draft(|d| d.rank = d.rank.prev_wrapping());
                false
            }
            InputAction::ClaimSecondUp => {
                self.edit_draft(|d| d.second = d.second.next_wrapping());
                false
            }
            InputAction::ClaimSecondDown => {
                self.edit_draft(|d| d.second = d.second.prev_wrapping());
                false
            }
            InputAction::ClaimSuitNext => {
                self.edit_draft(|d| d.suit = d.suit.next_wrapping());
                false
            }
            InputAction::ClaimSubmit => self.submit_claim(),
            InputAction::ClaimCancel => {
                self.draft = None;
                false
            }
            InputAction::CallBullshit => self.scene == Scene::Table && self.call_bullshit(),
        }
    }
}

impl Drop for AppState {
    fn drop(&mut self) {
        if let Some(room) = self.room.take() {
            room.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Phase;

    fn table_app(rt: &tokio::runtime::Runtime) -> AppState {
        let mut app = AppState::new(rt.handle().clone());
        app.cfg_bots = 2;
        app.cfg_bot_delay_ms = 60_000;
        app.apply_menu();
        app
    }

    #[test]
    fn human_opens_the_first_round() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = table_app(&rt);
        let view = app.view().cloned().unwrap();
        assert_eq!(view.phase, Phase::AwaitingOpeningClaim);
        assert!(view.is_my_turn());
        assert_eq!(view.own_hand().len(), 1);
        assert!(!app.handle_input(InputAction::CallBullshit), "nothing to call yet");

        assert!(app.handle_input(InputAction::ClaimOpen));
        assert_eq!(app.draft().map(|d| d.category), Some(HandCategory::HighCard));
        assert!(app.handle_input(InputAction::ClaimSubmit));
        assert!(!app.claim_dialog_open());
        let view = app.view().unwrap();
        assert_eq!(view.version, 1);
        assert_eq!(view.current_claim.as_ref().map(|e| e.claim), Some(Claim::high_card(Rank::Two)));
    }

    #[test]
    fn invalid_draft_is_reported_not_sent() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut app = table_app(&rt);
        assert!(app.handle_input(InputAction::ClaimOpen));
        // High Card -> Straight, rank stays Two
        for _ in 0..4 {
            let _ = app.handle_input(InputAction::ClaimCategoryNext);
        }
        assert_eq!(app.draft().map(|d| d.category), Some(HandCategory::Straight));
        assert!(matches!(app.draft_preview(), Some(Err(_))));
        assert!(!app.handle_input(InputAction::ClaimSubmit));
        assert!(app.action_error().is_some());
        assert_eq!(app.view().map(|v| v.version), Some(0));
    }
}
