//! Agents: pluggable players that decide for a seat from what that seat can see.
//!
//! `PlayerAgent` is the decision seam; `AgentTable` maps seats to agents so the
//! room actor (or a test) can ask whichever agent holds the turn for an intent.
//! Agents never touch the game directly: their intents go back through the same
//! path as human actions.

use crate::engine::{Applied, GameEngine, Intent};
use crate::game::GameError;
use crate::snapshot::GameView;
use core::fmt;
use std::time::{Duration, Instant};

/// Kinds of agents attached to seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AgentKind {
    Human,
    Bot,
}

/// A seat controller.
pub trait PlayerAgent: Send {
    /// Pick an intent for the viewer of `view`, or `None` to pass on this tick.
    fn decide(&mut self, view: &GameView) -> Option<Intent>;
    /// The kind of this agent (human, bot, etc.).
    fn kind(&self) -> AgentKind {
        AgentKind::Bot
    }
    /// How long to appear to think before acting.
    fn thinking_delay(&mut self) -> Duration {
        Duration::ZERO
    }
}

mod bots;

pub use bots::{choose_action, BotAgent, BotDecision, BotProfile, BotWeights, Difficulty};

/// One optional agent per seat.
#[derive(Default)]
pub struct AgentTable {
    seats: Vec<Option<Box<dyn PlayerAgent>>>,
}

impl fmt::Debug for AgentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags: String =
            self.seats.iter().map(|a| if a.is_some() { 'B' } else { '-' }).collect();
        write!(f, "AgentTable({flags})")
    }
}

impl AgentTable {
    /// Create a table with `n` seats, all empty.
    pub fn for_seats(n: usize) -> Self {
        let mut seats = Vec::with_capacity(n);
        seats.resize_with(n, || None);
        Self { seats }
    }

    /// Assign an agent to a seat (or remove when `None`).
    pub fn set_agent(&mut self, seat: usize, agent: Option<Box<dyn PlayerAgent>>) {
        if seat >= self.seats.len() {
            self.seats.resize_with(seat + 1, || None);
        }
        self.seats[seat] = agent;
    }

    /// Return the kind of agent at a seat, if any.
    pub fn agent_kind(&self, seat: usize) -> Option<AgentKind> {
        self.seats.get(seat).and_then(|a| a.as_deref().map(|ag| ag.kind()))
    }

    /// Whether a seat currently has an agent assigned.
    pub fn has_agent(&self, seat: usize) -> bool {
        self.seats.get(seat).is_some_and(|a| a.is_some())
    }

    /// Whether any bot agents are assigned.
    pub fn any_bots(&self) -> bool {
        self.seats.iter().filter_map(|a| a.as_deref()).any(|ag| ag.kind() == AgentKind::Bot)
    }

    /// Thinking delay for the agent at `seat`; `None` when nobody sits there.
    pub fn thinking_delay(&mut self, seat: usize) -> Option<Duration> {
        self.seats.get_mut(seat)?.as_deref_mut().map(|a| a.thinking_delay())
    }

    /// Ask the agent at `view.viewer` for an intent.
    pub fn decide(&mut self, view: &GameView) -> Option<Intent> {
        let seat = view.viewer?;
        self.seats.get_mut(seat)?.as_deref_mut()?.decide(view)
    }

    /// Drive the agent holding the turn, ignoring thinking delays. Returns
    /// `Ok(None)` when that seat has no agent or the agent passes.
    pub fn on_turn(
        &mut self,
        engine: &mut dyn GameEngine,
        now: Instant,
    ) -> Result<Option<Applied>, GameError> {
        if engine.is_over() {
            return Ok(None);
        }
        let seat = engine.current();
        let view = engine.view(Some(seat), now);
        match self.decide(&view) {
            Some(intent) => engine.apply(seat, intent, Some(view.version), now).map(Some),
            None => Ok(None),
        }
    }
}
