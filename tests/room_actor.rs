use bullshit_poker::agents::{BotProfile, Difficulty};
use bullshit_poker::cards::Rank;
use bullshit_poker::claim::Claim;
use bullshit_poker::engine::Applied;
use bullshit_poker::game::{GameError, Resolution};
use bullshit_poker::lobby::{PlayerId, Roster};
use bullshit_poker::room::{
    spawn_room, MemoryStore, RoomError, RoomHandle, RoomOptions, RoomRegistry, SnapshotStore,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const BOT_DELAY_MS: u64 = 500;

fn options() -> RoomOptions {
    let mut profile = BotProfile::for_difficulty(Difficulty::Medium)
        .with_delay(BOT_DELAY_MS, BOT_DELAY_MS);
    profile.samples = 32;
    RoomOptions { bot_profile: profile, seed: Some(11), ..RoomOptions::default() }
}

/// "ann" at seat 0, then a bot, then "bob".
fn two_humans_and_a_bot() -> (Roster, PlayerId, PlayerId) {
    let mut roster = Roster::default();
    let ann = roster.join_as(PlayerId::new("ann"), "Ann").unwrap();
    roster.add_bot().unwrap();
    let bob = roster.join_as(PlayerId::new("bob"), "Bob").unwrap();
    (roster, ann, bob)
}

fn human_and_bots(bots: usize) -> (Roster, PlayerId) {
    let mut roster = Roster::default();
    let me = roster.join_as(PlayerId::new("me"), "Me").unwrap();
    for _ in 0..bots {
        roster.add_bot().unwrap();
    }
    (roster, me)
}

async fn wait_for_version(room: &RoomHandle, version: u64) {
    let mut updates = room.subscribe();
    updates.wait_for(|g| g.version() >= version).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn turn_timer_penalizes_the_idle_player() {
    let (roster, me) = human_and_bots(2);
    let room = spawn_room("TIMER1".into(), &roster, options()).unwrap();
    let started = Instant::now();
    assert_eq!(room.view_for(&me).unwrap().turn_remaining_ms, Some(120_000));

    wait_for_version(&room, 1).await;
    assert!(started.elapsed() >= Duration::from_secs(120));

    let game = room.current();
    let result = game.last_result().unwrap();
    assert_eq!(result.resolution, Resolution::Timeout { player: 0 });
    assert_eq!(result.penalized, Some(0));
    assert_eq!(game.players()[0].penalty_count(), 2);
    assert_eq!(game.round(), 2);
}

#[tokio::test(start_paused = true)]
async fn bot_answers_after_thinking() {
    let (roster, me) = human_and_bots(2);
    let room = spawn_room("BOTS01".into(), &roster, options()).unwrap();

    let applied = room.claim(&me, Claim::high_card(Rank::Two), Some(0)).await;
    assert_eq!(applied, Ok(Applied::Claimed));
    let claimed_at = Instant::now();
    assert_eq!(room.current().current(), 1);

    wait_for_version(&room, 2).await;
    assert!(claimed_at.elapsed() >= Duration::from_millis(BOT_DELAY_MS));
    assert_eq!(room.current().version(), 2, "exactly one bot action");
}

#[tokio::test(start_paused = true)]
async fn stale_and_unseated_actions_are_refused() {
    let (roster, me) = human_and_bots(1);
    let room = spawn_room("STALE1".into(), &roster, options()).unwrap();

    let stale = room.claim(&me, Claim::high_card(Rank::Two), Some(7)).await;
    assert_eq!(stale, Err(RoomError::Game(GameError::Stale { expected: 7, actual: 0 })));

    let ghost = PlayerId::new("ghost");
    assert_eq!(room.challenge(&ghost, None).await, Err(RoomError::NotSeated(ghost)));
    assert_eq!(room.current().version(), 0);
}

#[tokio::test(start_paused = true)]
async fn challenge_while_bot_thinks_cancels_its_turn() {
    let (roster, ann, bob) = two_humans_and_a_bot();
    let room = spawn_room("RACE01".into(), &roster, options()).unwrap();

    room.claim(&ann, Claim::high_card(Rank::Two), None).await.unwrap();
    // seat 1 is thinking; bob calls out of turn
    let applied = room.challenge(&bob, Some(1)).await.unwrap();
    let Applied::Resolved(result) = applied else {
        panic!("challenge should resolve the round");
    };
    assert_eq!(result.resolution, Resolution::Challenge { caller: 2, author: 0 });

    // round 2 opens at the bot, which plans a fresh turn for the new version
    wait_for_version(&room, 3).await;
    let game = room.current();
    assert_eq!(game.version(), 3);
    assert_eq!(game.round(), 2);
    assert_eq!(game.opener(), 1);
    assert_eq!(game.current_claim().map(|e| e.seat), Some(1));
}

#[tokio::test(start_paused = true)]
async fn view_feed_shows_only_the_viewers_hand() {
    let (roster, ann, bob) = two_humans_and_a_bot();
    let room = spawn_room("VIEW01".into(), &roster, options()).unwrap();
    let mut feed = room.subscribe_view(&bob).unwrap();
    assert_eq!(feed.seat(), 2);
    assert_eq!(feed.latest().version, 0);

    room.claim(&ann, Claim::high_card(Rank::Two), None).await.unwrap();
    let view = feed.changed().await.unwrap();
    assert!(view.version >= 1);
    assert_eq!(view.own_hand().len(), 1);
    for p in view.players.iter().filter(|p| p.seat != 2) {
        assert_eq!(p.hand, None, "seat {} hand leaked", p.seat);
    }

    let ghost = PlayerId::new("ghost");
    assert_eq!(room.subscribe_view(&ghost).err(), Some(RoomError::NotSeated(ghost)));

    room.shutdown().await;
    while feed.changed().await.is_ok() {}
}

#[tokio::test(start_paused = true)]
async fn shutdown_closes_the_room() {
    let (roster, me) = human_and_bots(1);
    let room = spawn_room("SHUT01".into(), &roster, options()).unwrap();
    room.shutdown().await;
    while !room.is_closed() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(room.challenge(&me, None).await, Err(RoomError::Closed));
}

#[tokio::test(start_paused = true)]
async fn registry_reaps_rooms_past_their_ttl() {
    let store = Arc::new(MemoryStore::new());
    let options = RoomOptions { store: Some(store.clone()), ..options() };
    let registry = RoomRegistry::with_ttl(options, Duration::from_secs(60));
    let (roster, _) = human_and_bots(1);

    let room = registry.create(&roster).unwrap();
    let pin = room.id().to_string();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(&pin).unwrap().id(), pin);
    assert!(store.load(&pin).unwrap().is_some(), "new rooms are mirrored");

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(registry.reap_stale().is_empty());

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(registry.reap_stale(), vec![pin.clone()]);
    assert!(registry.is_empty());
    assert_eq!(registry.get(&pin).err(), Some(RoomError::NotFound(pin.clone())));
    assert!(store.load(&pin).unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn closed_room_resumes_from_its_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let options = RoomOptions { store: Some(store.clone()), ..options() };
    let registry = RoomRegistry::new(options);
    let (roster, ann, _bob) = two_humans_and_a_bot();

    let room = registry.create(&roster).unwrap();
    let pin = room.id().to_string();
    room.claim(&ann, Claim::pair(Rank::Ace), None).await.unwrap();

    // a live room is handed back as is
    let again = registry.resume(&pin).unwrap();
    assert_eq!(again.current().version(), 1);

    room.shutdown().await;
    while !room.is_closed() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let resumed = registry.resume(&pin).unwrap();
    assert!(!resumed.is_closed());
    let game = resumed.current();
    assert!(game.version() >= 1);
    assert_eq!(game.history()[0].claim, Claim::pair(Rank::Ace));
    assert_eq!(game.history()[0].player, "Ann");
    assert_eq!(registry.len(), 1);

    assert_eq!(registry.resume("NOPE00").err(), Some(RoomError::NotFound("NOPE00".into())));
}
