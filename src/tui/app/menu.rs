use crate::agents::Difficulty;
use crate::config::TableConfig;

use super::AppState;

const MAX_BOTS: usize = 9;
const TURN_STEP_SECS: u16 = 30;
const DELAY_STEP_MS: u64 = 100;
const MAX_DELAY_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy)]
enum MenuItem {
    Bots,
    TurnTime,
    BotDifficulty,
    BotDelayMs,
}

const MENU_ITEMS: [MenuItem; 4] =
    [MenuItem::Bots, MenuItem::TurnTime, MenuItem::BotDifficulty, MenuItem::BotDelayMs];

impl MenuItem {
    fn display(self, app: &AppState) -> String {
        match self {
            MenuItem::Bots => format!("Bots: {}", app.cfg_bots),
            MenuItem::TurnTime => format!("Turn Time: {}s", app.cfg_turn_secs),
            MenuItem::BotDifficulty => format!("Bot Difficulty: {}", app.cfg_bot_difficulty),
            MenuItem::BotDelayMs => format!("Bot Delay (ms): {}", app.cfg_bot_delay_ms),
        }
    }

    fn inc(self, app: &mut AppState) {
        match self {
            MenuItem::Bots => {
                if app.cfg_bots < MAX_BOTS {
                    app.cfg_bots += 1;
                }
            }
            MenuItem::TurnTime => {
                app.cfg_turn_secs =
                    (app.cfg_turn_secs + TURN_STEP_SECS).min(TableConfig::MAX_TURN_SECS);
            }
            MenuItem::BotDelayMs => {
                app.cfg_bot_delay_ms = (app.cfg_bot_delay_ms + DELAY_STEP_MS).min(MAX_DELAY_MS);
            }
            MenuItem::BotDifficulty => {
                app.cfg_bot_difficulty = match app.cfg_bot_difficulty {
                    Difficulty::Easy => Difficulty::Medium,
                    Difficulty::Medium => Difficulty::Hard,
                    Difficulty::Hard => Difficulty::Easy,
                };
            }
        }
    }

    fn dec(self, app: &mut AppState) {
        match self {
            MenuItem::Bots => {
                if app.cfg_bots > 1 {
                    app.cfg_bots -= 1;
                }
            }
            MenuItem::TurnTime => {
                app.cfg_turn_secs = app
                    .cfg_turn_secs
                    .saturating_sub(TURN_STEP_SECS)
                    .max(TableConfig::MIN_TURN_SECS);
            }
            MenuItem::BotDelayMs => {
                app.cfg_bot_delay_ms = app.cfg_bot_delay_ms.saturating_sub(DELAY_STEP_MS);
            }
            MenuItem::BotDifficulty => {
                app.cfg_bot_difficulty = match app.cfg_bot_difficulty {
                    Difficulty::Easy => Difficulty::Hard,
                    Difficulty::Medium => Difficulty::Easy,
                    Difficulty::Hard => Difficulty::Medium,
                };
            }
        }
    }
}

impl AppState {
    pub fn menu_items_display(&self) -> Vec<String> {
        MENU_ITEMS.iter().map(|item| item.display(self)).collect()
    }

    pub fn toggle_menu(&mut self) {
        self.close_help();
        self.close_history();
        self.scene = match self.scene {
            super::Scene::Menu if self.room_id().is_some() => super::Scene::Table,
            super::Scene::Menu => super::Scene::Menu,
            _ => {
                self.open_menu();
                super::Scene::Menu
            }
        };
    }

    pub fn open_menu(&mut self) {
        self.close_help();
        self.close_history();
        self.menu_index = 0;
        self.cfg_bots = self.bots;
        self.cfg_turn_secs = self.turn_secs;
        self.cfg_bot_difficulty = self.bot_difficulty;
        self.cfg_bot_delay_ms = self.bot_delay_ms;
        self.scene = super::Scene::Menu;
    }

    /// Commit the edited settings and deal a fresh game.
    pub fn apply_menu(&mut self) {
        self.bots = self.cfg_bots.clamp(1, MAX_BOTS);
        self.turn_secs =
            self.cfg_turn_secs.clamp(TableConfig::MIN_TURN_SECS, TableConfig::MAX_TURN_SECS);
        self.bot_difficulty = self.cfg_bot_difficulty;
        self.bot_delay_ms = self.cfg_bot_delay_ms.min(MAX_DELAY_MS);
        self.start_game();
        self.scene = super::Scene::Table;
    }

    /// Back to the table, unless there is no table yet.
    pub fn cancel_menu(&mut self) {
        if self.room_id().is_some() {
            self.scene = super::Scene::Table;
        }
    }

    pub fn menu_next(&mut self) {
        self.menu_index = (self.menu_index + 1) % MENU_ITEMS.len();
    }
    pub fn menu_prev(&mut self) {
        self.menu_index = (self.menu_index + MENU_ITEMS.len() - 1) % MENU_ITEMS.len();
    }
    pub fn menu_inc(&mut self) {
        let item = MENU_ITEMS[self.menu_index % MENU_ITEMS.len()];
        item.inc(self);
    }
    pub fn menu_dec(&mut self) {
        let item = MENU_ITEMS[self.menu_index % MENU_ITEMS.len()];
        item.dec(self);
    }
}
