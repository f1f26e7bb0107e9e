//! Rooms: one sequential task per game that owns the authoritative state.
//!
//! Every action (human intents, bot intents, the turn timer) is applied by the
//! room task in arrival order, so two actions never observe the same version.
//! New states are published on a `watch` channel and mirrored into an optional
//! [`SnapshotStore`]; the store never decides anything.

use crate::agents::{AgentKind, AgentTable, BotAgent, BotProfile};
use crate::engine::{Applied, GameEngine, Intent};
use crate::game::{Game, GameError};
use crate::lobby::{PlayerId, Roster};
use crate::snapshot::{GameSnapshot, GameView, SnapshotError};
use rand::Rng;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

pub type RoomId = String;

/// Rooms idle longer than this are reaped by [`RoomRegistry::reap_stale`].
pub const DEFAULT_ROOM_TTL: Duration = Duration::from_secs(5 * 60 * 60);
pub const PIN_LEN: usize = 6;

const COMMAND_BUFFER: usize = 64;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoomError {
    #[error("room {0} not found")]
    NotFound(RoomId),
    #[error("room is closed")]
    Closed,
    #[error("{0} is not seated in this room")]
    NotSeated(PlayerId),
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("room registry lock poisoned")]
    StoragePoisoned,
    #[error("could not resume room: {0}")]
    Resume(String),
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("room id {0:?} cannot be used as a storage key")]
    InvalidKey(String),
    #[error("snapshot store lock poisoned")]
    Poisoned,
}

/// Downstream mirror of room state: read, write, forget.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, room: &str, snapshot: &GameSnapshot) -> Result<(), StoreError>;
    fn load(&self, room: &str) -> Result<Option<GameSnapshot>, StoreError>;
    fn remove(&self, room: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: Mutex<HashMap<RoomId, GameSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn save(&self, room: &str, snapshot: &GameSnapshot) -> Result<(), StoreError> {
        let mut guard = self.snapshots.lock().map_err(|_| StoreError::Poisoned)?;
        guard.insert(room.to_string(), snapshot.clone());
        Ok(())
    }

    fn load(&self, room: &str) -> Result<Option<GameSnapshot>, StoreError> {
        let guard = self.snapshots.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.get(room).cloned())
    }

    fn remove(&self, room: &str) -> Result<(), StoreError> {
        let mut guard = self.snapshots.lock().map_err(|_| StoreError::Poisoned)?;
        guard.remove(room);
        Ok(())
    }
}

/// One pretty-printed JSON file per room.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, room: &str) -> Result<PathBuf, StoreError> {
        let ok = !room.is_empty()
            && room.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !ok {
            return Err(StoreError::InvalidKey(room.to_string()));
        }
        Ok(self.dir.join(format!("{room}.json")))
    }
}

impl SnapshotStore for JsonDirStore {
    fn save(&self, room: &str, snapshot: &GameSnapshot) -> Result<(), StoreError> {
        let path = self.path_for(room)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, snapshot.to_json()?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn load(&self, room: &str) -> Result<Option<GameSnapshot>, StoreError> {
        let path = self.path_for(room)?;
        match std::fs::read_to_string(&path) {
            Ok(json) => Ok(Some(GameSnapshot::from_json(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, room: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(room)?) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// How a room runs its bots and where it mirrors state.
#[derive(Clone, Default)]
pub struct RoomOptions {
    pub bot_profile: BotProfile,
    pub store: Option<Arc<dyn SnapshotStore>>,
    /// Seeds the deal and every bot for reproducible rooms.
    pub seed: Option<u64>,
}

enum RoomCommand {
    Act {
        player: PlayerId,
        intent: Intent,
        expected_version: Option<u64>,
        reply: oneshot::Sender<Result<Applied, RoomError>>,
    },
    Shutdown,
}

/// Cheap cloneable access to a running room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    id: RoomId,
    commands: mpsc::Sender<RoomCommand>,
    updates: watch::Receiver<Arc<Game>>,
}

impl RoomHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn act(
        &self,
        player: &PlayerId,
        intent: Intent,
        expected_version: Option<u64>,
    ) -> Result<Applied, RoomError> {
        let (reply, rx) = oneshot::channel();
        let cmd = RoomCommand::Act { player: player.clone(), intent, expected_version, reply };
        self.commands.send(cmd).await.map_err(|_| RoomError::Closed)?;
        rx.await.map_err(|_| RoomError::Closed)?
    }

    pub async fn claim(
        &self,
        player: &PlayerId,
        claim: crate::claim::Claim,
        expected_version: Option<u64>,
    ) -> Result<Applied, RoomError> {
        self.act(player, Intent::Claim(claim), expected_version).await
    }

    pub async fn challenge(
        &self,
        player: &PlayerId,
        expected_version: Option<u64>,
    ) -> Result<Applied, RoomError> {
        self.act(player, Intent::Challenge, expected_version).await
    }

    /// [`RoomHandle::act`] for callers outside the runtime, such as a UI thread.
    /// Must not be called from within an async context.
    pub fn blocking_act(
        &self,
        player: &PlayerId,
        intent: Intent,
        expected_version: Option<u64>,
    ) -> Result<Applied, RoomError> {
        let (reply, rx) = oneshot::channel();
        let cmd = RoomCommand::Act { player: player.clone(), intent, expected_version, reply };
        self.commands.blocking_send(cmd).map_err(|_| RoomError::Closed)?;
        rx.blocking_recv().map_err(|_| RoomError::Closed)?
    }

    /// Latest published state with every hand visible. Server side only;
    /// players get [`RoomHandle::view_for`] or [`RoomHandle::subscribe_view`].
    pub fn current(&self) -> Arc<Game> {
        Arc::clone(&self.updates.borrow())
    }

    /// Latest state as `player` may see it.
    pub fn view_for(&self, player: &PlayerId) -> Option<GameView> {
        let game = self.current();
        let seat = game.seat_of(player)?;
        Some(game.view_for(Some(seat), tokio::time::Instant::now().into_std()))
    }

    /// Receive every newly published state, unredacted. Server side only.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Game>> {
        self.updates.clone()
    }

    /// Receive every newly published state as `player` may see it.
    pub fn subscribe_view(&self, player: &PlayerId) -> Result<ViewUpdates, RoomError> {
        let seat = self
            .current()
            .seat_of(player)
            .ok_or_else(|| RoomError::NotSeated(player.clone()))?;
        Ok(ViewUpdates { seat, updates: self.updates.clone() })
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Ask the room task to stop. Queued commands ahead of it still run.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(RoomCommand::Shutdown).await;
    }

    /// Ask the room task to stop without waiting.
    pub fn close(&self) {
        let _ = self.commands.try_send(RoomCommand::Shutdown);
    }
}

/// One seat's feed of published states, other players' hands withheld.
#[derive(Debug, Clone)]
pub struct ViewUpdates {
    seat: usize,
    updates: watch::Receiver<Arc<Game>>,
}

impl ViewUpdates {
    pub fn seat(&self) -> usize {
        self.seat
    }

    /// The most recent state, whether or not it has been seen.
    pub fn latest(&self) -> GameView {
        self.updates.borrow().view_for(Some(self.seat), clock_now())
    }

    /// Wait for the next published state. Fails once the room has closed.
    pub async fn changed(&mut self) -> Result<GameView, RoomError> {
        self.updates.changed().await.map_err(|_| RoomError::Closed)?;
        Ok(self.updates.borrow_and_update().view_for(Some(self.seat), clock_now()))
    }
}

/// Start a fresh game for `roster` and spawn its room task. Bot seats get a
/// [`BotAgent`] built from `options.bot_profile`. Requires a tokio runtime.
pub fn spawn_room(
    id: RoomId,
    roster: &Roster,
    options: RoomOptions,
) -> Result<RoomHandle, RoomError> {
    let now = clock_now();
    let game = match options.seed {
        Some(seed) => Game::start_seeded(roster, seed, now)?,
        None => Game::start(roster, now)?,
    };
    Ok(spawn_game(id, game, options))
}

/// Spawn a room task around an existing game (e.g. a restored snapshot).
pub fn spawn_game(id: RoomId, game: Game, options: RoomOptions) -> RoomHandle {
    let mut agents = AgentTable::for_seats(game.players().len());
    for (seat, p) in game.players().iter().enumerate() {
        if p.is_bot() {
            let mut profile = options.bot_profile.clone();
            if let Some(seed) = options.seed {
                profile = profile.with_seed(seed.wrapping_add(seat as u64 + 1));
            }
            agents.set_agent(seat, Some(Box::new(BotAgent::new(profile))));
        }
    }

    let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
    let (updates_tx, updates_rx) = watch::channel(Arc::new(game.clone()));
    info!(room = %id, players = game.players().len(), version = game.version(), "room opened");

    let actor = RoomActor {
        id: id.clone(),
        game,
        agents,
        store: options.store,
        updates: updates_tx,
        commands: rx,
        pending_bot: None,
        halted: false,
    };
    actor.mirror();
    tokio::spawn(actor.run());
    RoomHandle { id, commands: tx, updates: updates_rx }
}

#[derive(Debug, Clone, Copy)]
struct PendingBot {
    seat: usize,
    version: u64,
    due: tokio::time::Instant,
}

struct RoomActor {
    id: RoomId,
    game: Game,
    agents: AgentTable,
    store: Option<Arc<dyn SnapshotStore>>,
    updates: watch::Sender<Arc<Game>>,
    commands: mpsc::Receiver<RoomCommand>,
    pending_bot: Option<PendingBot>,
    /// Set by an integrity failure; the room stops after the current step.
    halted: bool,
}

impl RoomActor {
    async fn run(mut self) {
        loop {
            self.schedule_bot();
            let deadline = self.game.deadline().map(tokio::time::Instant::from_std);
            let bot_due = self.pending_bot.map(|b| b.due);
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(RoomCommand::Act { player, intent, expected_version, reply }) => {
                        let result = self.act(&player, intent, expected_version);
                        let _ = reply.send(result);
                    }
                    Some(RoomCommand::Shutdown) | None => break,
                },
                _ = sleep_until_some(deadline) => self.on_deadline(),
                _ = sleep_until_some(bot_due) => self.on_bot_due(),
            }
            if self.halted {
                break;
            }
        }
        info!(room = %self.id, version = self.game.version(), "room closed");
    }

    fn act(
        &mut self,
        player: &PlayerId,
        intent: Intent,
        expected_version: Option<u64>,
    ) -> Result<Applied, RoomError> {
        let seat = self.game.seat_of(player).ok_or_else(|| RoomError::NotSeated(player.clone()))?;
        self.apply(seat, intent, expected_version)
    }

    fn apply(
        &mut self,
        seat: usize,
        intent: Intent,
        expected_version: Option<u64>,
    ) -> Result<Applied, RoomError> {
        let now = clock_now();
        match self.game.apply(seat, intent, expected_version, now) {
            Ok(applied) => {
                self.publish();
                Ok(applied)
            }
            Err(e) => {
                self.fail(seat, &e);
                Err(e.into())
            }
        }
    }

    fn on_deadline(&mut self) {
        match self.game.timeout(clock_now()) {
            Ok(result) => {
                info!(
                    room = %self.id,
                    round = result.round,
                    penalized = ?result.penalized_name,
                    "turn timer fired"
                );
                self.publish();
            }
            // already resolved by an action that raced the timer
            Err(GameError::Rejected(_)) => {}
            Err(e) => self.fail(self.game.current(), &e),
        }
    }

    /// Keep exactly one pending bot turn, tied to the version it was planned for.
    fn schedule_bot(&mut self) {
        let version = self.game.version();
        if let Some(p) = self.pending_bot {
            if p.version == version {
                return;
            }
            debug!(room = %self.id, seat = p.seat, "pending bot turn cancelled");
            self.pending_bot = None;
        }
        if self.game.is_over() {
            return;
        }
        let seat = self.game.current();
        if self.agents.agent_kind(seat) != Some(AgentKind::Bot) {
            return;
        }
        if let Some(delay) = self.agents.thinking_delay(seat) {
            let due = tokio::time::Instant::now() + delay;
            self.pending_bot = Some(PendingBot { seat, version, due });
        }
    }

    fn on_bot_due(&mut self) {
        let Some(pending) = self.pending_bot.take() else {
            return;
        };
        if pending.version != self.game.version() {
            return;
        }
        let view = self.game.view_for(Some(pending.seat), clock_now());
        match self.agents.decide(&view) {
            Some(intent) => {
                let _ = self.apply(pending.seat, intent, Some(pending.version));
            }
            None => debug!(room = %self.id, seat = pending.seat, "bot passed"),
        }
    }

    fn publish(&self) {
        self.updates.send_replace(Arc::new(self.game.clone()));
        self.mirror();
    }

    fn mirror(&self) {
        if let Some(store) = &self.store {
            let snapshot = self.game.snapshot(clock_now());
            if let Err(e) = store.save(&self.id, &snapshot) {
                warn!(
                    room = %self.id,
                    version = snapshot.version,
                    error = %e,
                    "snapshot mirror failed"
                );
            }
        }
    }

    /// Rejections are routine. An integrity failure leaves the state it
    /// committed published and mirrored, then stops the room.
    fn fail(&mut self, seat: usize, e: &GameError) {
        match e {
            GameError::Integrity(_) => {
                error!(room = %self.id, seat, error = %e, "integrity failure, room halted");
                self.publish();
                self.pending_bot = None;
                self.halted = true;
            }
            _ => debug!(room = %self.id, seat, reason = %e, "action rejected"),
        }
    }
}

async fn sleep_until_some(at: Option<tokio::time::Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Wall clock for game actions; follows tokio's clock so paused-time tests work.
fn clock_now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// A fresh 6-character room PIN, uppercase letters and digits.
pub fn generate_pin<R: Rng + ?Sized>(rng: &mut R) -> RoomId {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    (0..PIN_LEN).map(|_| char::from(CHARS[rng.random_range(0..CHARS.len())])).collect()
}

struct RoomEntry {
    handle: RoomHandle,
    created: Instant,
}

/// All live rooms by PIN.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, RoomEntry>>,
    ttl: Duration,
    options: RoomOptions,
}

impl RoomRegistry {
    pub fn new(options: RoomOptions) -> Self {
        Self::with_ttl(options, DEFAULT_ROOM_TTL)
    }

    pub fn with_ttl(options: RoomOptions, ttl: Duration) -> Self {
        Self { rooms: RwLock::new(HashMap::new()), ttl, options }
    }

    /// Start a game for `roster` under a new unique PIN.
    pub fn create(&self, roster: &Roster) -> Result<RoomHandle, RoomError> {
        let mut guard = self.rooms.write().map_err(|_| RoomError::StoragePoisoned)?;
        let mut rng = rand::rng();
        let pin = loop {
            let pin = generate_pin(&mut rng);
            if !guard.contains_key(&pin) {
                break pin;
            }
        };
        let handle = spawn_room(pin.clone(), roster, self.options.clone())?;
        guard.insert(pin, RoomEntry { handle: handle.clone(), created: clock_now() });
        Ok(handle)
    }

    /// Reopen a room from its mirrored snapshot.
    pub fn resume(&self, pin: &str) -> Result<RoomHandle, RoomError> {
        let store = self.options.store.as_ref().ok_or_else(|| RoomError::NotFound(pin.into()))?;
        let snapshot = store
            .load(pin)
            .map_err(|e| RoomError::Resume(e.to_string()))?
            .ok_or_else(|| RoomError::NotFound(pin.into()))?;
        let game = Game::restore(snapshot, self.options.seed, clock_now())
            .map_err(|e| RoomError::Resume(e.to_string()))?;
        let mut guard = self.rooms.write().map_err(|_| RoomError::StoragePoisoned)?;
        if let Some(live) = guard.get(pin).filter(|e| !e.handle.is_closed()) {
            return Ok(live.handle.clone());
        }
        let handle = spawn_game(pin.to_string(), game, self.options.clone());
        guard.insert(pin.to_string(), RoomEntry { handle: handle.clone(), created: clock_now() });
        Ok(handle)
    }

    pub fn get(&self, pin: &str) -> Result<RoomHandle, RoomError> {
        let guard = self.rooms.read().map_err(|_| RoomError::StoragePoisoned)?;
        guard.get(pin).map(|e| e.handle.clone()).ok_or_else(|| RoomError::NotFound(pin.into()))
    }

    pub fn len(&self) -> usize {
        self.rooms.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shut down and forget rooms older than the registry's TTL, and their
    /// mirrored snapshots. Returns the reaped PINs.
    pub fn reap_stale(&self) -> Vec<RoomId> {
        let now = clock_now();
        let mut reaped = Vec::new();
        {
            let mut guard = match self.rooms.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            guard.retain(|pin, entry| {
                if now.saturating_duration_since(entry.created) >= self.ttl {
                    entry.handle.close();
                    reaped.push(pin.clone());
                    false
                } else {
                    true
                }
            });
        }
        for pin in &reaped {
            info!(room = %pin, "stale room reaped");
            if let Some(store) = &self.options.store {
                if let Err(e) = store.remove(pin) {
                    warn!(room = %pin, error = %e, "failed to drop mirrored snapshot");
                }
            }
        }
        reaped
    }
}
