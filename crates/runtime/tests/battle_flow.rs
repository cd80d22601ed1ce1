use async_trait::async_trait;
use tokio::sync::broadcast;

use battle_core::{
    ActionDef, ActionEffect, ActionId, ActiveTurn, Battle, BattleConfig, BattleOutcome,
    BattleSetup, CombatEventKind, CombatantTemplate, DeckSlot, Element, EntityId, IgnoreReason,
    TapOutcome,
};
use battle_runtime::{
    ActionProvider, BattleEvent, BattleHandle, Event, EventBus, GreedyMatchProvider, Runtime,
    RuntimeConfig, RuntimeError, Topic, TurnAction, TurnEvent,
};

fn fighter(code: &str, hp: u32, atk: u32, spd: u32, element: Element) -> CombatantTemplate {
    CombatantTemplate {
        code: code.into(),
        name: code.to_uppercase(),
        hp,
        atk,
        def: 5,
        spd,
        element,
        breaks: Vec::new(),
        actions: vec![
            ActionDef {
                id: ActionId(1),
                name: "Strike".into(),
                element,
                effect: ActionEffect::Damage { true_damage: false },
            },
            ActionDef {
                id: ActionId(2),
                name: "Guard".into(),
                element: Element::Neutral,
                effect: ActionEffect::Shield { amount: 5 },
            },
        ],
    }
}

fn setup(player_spd: u32, enemy_hp: u32, enemy_spd: u32) -> BattleSetup {
    let elements = [Element::Fire, Element::Water, Element::Leaf];
    BattleSetup {
        party: elements
            .iter()
            .enumerate()
            .map(|(i, &el)| Some(fighter(&format!("p{i}"), 120, 40, player_spd, el)))
            .collect(),
        enemies: vec![fighter("boss", enemy_hp, 30, enemy_spd, Element::Dark)],
        deck: (0..3)
            .flat_map(|owner| [DeckSlot::new(owner, 1), DeckSlot::new(owner, 2)])
            .chain([DeckSlot::new(0, 1), DeckSlot::new(1, 1)])
            .collect(),
        seed: 7,
    }
}

async fn next_matching(
    rx: &mut broadcast::Receiver<Event>,
    pred: impl Fn(&Event) -> bool,
) -> Event {
    loop {
        match rx.recv().await {
            Ok(event) if pred(&event) => return event,
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(error) => panic!("event stream ended: {error}"),
        }
    }
}

async fn awaiting_input(rx: &mut broadcast::Receiver<Event>) -> u8 {
    match next_matching(rx, |e| {
        matches!(e, Event::Turn(TurnEvent::AwaitingInput { .. }))
    })
    .await
    {
        Event::Turn(TurnEvent::AwaitingInput { slot, .. }) => slot,
        _ => unreachable!(),
    }
}

/// Double-taps the first tile `slot` owns.
async fn double_tap_owned(handle: &BattleHandle, slot: u8) {
    let snapshot = handle.snapshot().await.unwrap();
    let coord = snapshot
        .board
        .iter()
        .find(|view| view.tile.owner == slot && !view.dimmed)
        .map(|view| view.coord)
        .unwrap();
    assert_eq!(handle.tap(coord).await.unwrap(), TapOutcome::Selected(coord));
    assert!(matches!(
        handle.tap(coord).await.unwrap(),
        TapOutcome::Eliminated(_)
    ));
}

/// Never acts.
struct PassProvider;

#[async_trait]
impl ActionProvider for PassProvider {
    async fn provide_action(
        &self,
        _turn: &ActiveTurn,
        _battle: &Battle,
    ) -> battle_runtime::Result<TurnAction> {
        Ok(TurnAction::Pass)
    }
}

/// Always hits the front opponent.
struct FrontAttackProvider;

#[async_trait]
impl ActionProvider for FrontAttackProvider {
    async fn provide_action(
        &self,
        _turn: &ActiveTurn,
        _battle: &Battle,
    ) -> battle_runtime::Result<TurnAction> {
        Ok(TurnAction::Attack { target: None })
    }
}

#[tokio::test]
async fn build_without_setup_fails() {
    let result = Runtime::builder().build();
    assert!(matches!(result, Err(RuntimeError::MissingSetup)));
}

#[tokio::test(start_paused = true)]
async fn autoplay_battle_reaches_victory() {
    let bus = EventBus::with_capacity(4096);
    let mut battle_rx = bus.subscribe(Topic::Battle);

    let runtime = Runtime::builder()
        .setup(setup(60, 150, 10))
        .player_provider(GreedyMatchProvider)
        .enemy_provider(PassProvider)
        .event_bus(bus)
        .build()
        .unwrap();

    let outcome = runtime.wait().await.unwrap();
    assert_eq!(outcome, BattleOutcome::Victory);

    assert!(matches!(
        battle_rx.recv().await,
        Ok(Event::Battle(BattleEvent::Started { .. }))
    ));
    let ended = next_matching(&mut battle_rx, |e| {
        matches!(e, Event::Battle(BattleEvent::Ended { .. }))
    })
    .await;
    assert!(matches!(
        ended,
        Event::Battle(BattleEvent::Ended {
            outcome: BattleOutcome::Victory
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn passive_party_is_defeated() {
    let runtime = Runtime::builder()
        .config(RuntimeConfig::default().with_seed(3))
        .setup(setup(10, 500, 90))
        .player_provider(PassProvider)
        .enemy_provider(FrontAttackProvider)
        .build()
        .unwrap();

    assert_eq!(runtime.seed(), 3);
    assert_eq!(runtime.wait().await.unwrap(), BattleOutcome::Defeat);
}

#[tokio::test(start_paused = true)]
async fn double_tap_resolves_waiting_player_turn() {
    let runtime = Runtime::builder()
        .setup(setup(100, 5000, 1))
        .build()
        .unwrap();
    let handle = runtime.handle();
    let mut turn_rx = runtime.subscribe(Topic::Turn);
    let mut battle_rx = runtime.subscribe(Topic::Battle);

    let slot = awaiting_input(&mut turn_rx).await;
    let snapshot = handle.snapshot().await.unwrap();
    let actor = snapshot.current.unwrap();
    let coord = snapshot
        .board
        .iter()
        .find(|view| view.tile.owner == slot && !view.dimmed)
        .map(|view| view.coord)
        .unwrap();

    assert_eq!(handle.tap(coord).await.unwrap(), TapOutcome::Selected(coord));
    assert!(matches!(
        handle.tap(coord).await.unwrap(),
        TapOutcome::Eliminated(_)
    ));

    let acted = next_matching(&mut battle_rx, |e| {
        matches!(
            e,
            Event::Battle(BattleEvent::Combat(c)) if matches!(c.kind, CombatEventKind::Acted { .. })
        )
    })
    .await;
    match acted {
        Event::Battle(BattleEvent::Combat(event)) => assert_eq!(event.entity, actor),
        _ => unreachable!(),
    }

    let finished = next_matching(&mut turn_rx, |e| {
        matches!(e, Event::Turn(TurnEvent::Finished { .. }))
    })
    .await;
    assert!(matches!(finished, Event::Turn(TurnEvent::Finished { actor: a, .. }) if a == actor));

    runtime.abort();
}

#[tokio::test(start_paused = true)]
async fn taps_outside_player_turn_are_ignored() {
    let runtime = Runtime::builder()
        .setup(setup(1, 5000, 100))
        .player_provider(PassProvider)
        .build()
        .unwrap();
    let handle = runtime.handle();

    let outcome = handle
        .tap(battle_core::Coord::new(0, 0))
        .await
        .unwrap();
    assert!(matches!(outcome, TapOutcome::Ignored(_)));

    runtime.abort();
}

#[tokio::test(start_paused = true)]
async fn pause_blocks_taps_until_resumed() {
    let runtime = Runtime::builder()
        .setup(setup(100, 5000, 1))
        .build()
        .unwrap();
    let handle = runtime.handle();
    let mut turn_rx = runtime.subscribe(Topic::Turn);
    let mut battle_rx = runtime.subscribe(Topic::Battle);

    awaiting_input(&mut turn_rx).await;

    assert!(handle.pause().await.unwrap());
    assert!(!handle.pause().await.unwrap());
    next_matching(&mut battle_rx, |e| {
        matches!(e, Event::Battle(BattleEvent::Paused))
    })
    .await;

    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.paused);
    let coord = snapshot.board[0].coord;
    assert_eq!(
        handle.tap(coord).await.unwrap(),
        TapOutcome::Ignored(IgnoreReason::Paused)
    );

    assert!(handle.resume().await.unwrap());
    assert!(!handle.snapshot().await.unwrap().paused);

    runtime.abort();
}

#[tokio::test(start_paused = true)]
async fn surrender_abandons_waiting_turn() {
    let runtime = Runtime::builder()
        .setup(setup(100, 5000, 1))
        .build()
        .unwrap();
    let handle = runtime.handle();
    let mut turn_rx = runtime.subscribe(Topic::Turn);

    awaiting_input(&mut turn_rx).await;
    handle.surrender().await.unwrap();
    drop(handle);

    assert_eq!(runtime.wait().await.unwrap(), BattleOutcome::Surrendered);
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_surrenders_waiting_turn() {
    let runtime = Runtime::builder()
        .setup(setup(100, 5000, 1))
        .build()
        .unwrap();
    let mut turn_rx = runtime.subscribe(Topic::Turn);

    awaiting_input(&mut turn_rx).await;

    assert_eq!(runtime.wait().await.unwrap(), BattleOutcome::Surrendered);
}

#[tokio::test(start_paused = true)]
async fn order_preview_accompanies_each_turn() {
    let runtime = Runtime::builder()
        .setup(setup(100, 5000, 1))
        .build()
        .unwrap();
    let mut turn_rx = runtime.subscribe(Topic::Turn);

    let started = next_matching(&mut turn_rx, |e| {
        matches!(e, Event::Turn(TurnEvent::Started { .. }))
    })
    .await;
    match started {
        Event::Turn(TurnEvent::Started { turn, order }) => {
            assert_eq!(turn.turn, 1);
            assert!(turn.team.is_player());
            assert_eq!(order.len(), 8);
            assert_eq!(order[0].id, turn.actor);
            assert!(order[0].is_current);
            assert!(order[1..].iter().all(|entry| !entry.is_current));
        }
        _ => unreachable!(),
    }

    runtime.abort();
}

#[tokio::test(start_paused = true)]
async fn unresolved_party_member_passes_instead_of_blocking() {
    let mut setup = setup(50, 5000, 50);
    setup.party[1] = None;
    let config = RuntimeConfig {
        battle: BattleConfig::default().with_speed_range(50, 50),
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::builder()
        .config(config)
        .setup(setup)
        .enemy_provider(PassProvider)
        .build()
        .unwrap();
    let handle = runtime.handle();
    let mut turn_rx = runtime.subscribe(Topic::Turn);
    let mut battle_rx = runtime.subscribe(Topic::Battle);

    assert_eq!(awaiting_input(&mut turn_rx).await, 0);
    double_tap_owned(&handle, 0).await;

    assert_eq!(awaiting_input(&mut turn_rx).await, 2);
    let passed = next_matching(&mut battle_rx, |e| {
        matches!(
            e,
            Event::Battle(BattleEvent::Combat(c)) if c.kind == CombatEventKind::Passed
        )
    })
    .await;
    match passed {
        Event::Battle(BattleEvent::Combat(event)) => assert_eq!(event.entity, EntityId(1)),
        _ => unreachable!(),
    }

    runtime.abort();
}

#[tokio::test(start_paused = true)]
async fn frozen_action_points_end_the_battle() {
    let config = RuntimeConfig {
        battle: BattleConfig::default()
            .with_speed_range(0, 100)
            .with_iteration_caps(50, 50),
        ..RuntimeConfig::default()
    };
    let runtime = Runtime::builder()
        .config(config)
        .setup(setup(0, 500, 0))
        .player_provider(PassProvider)
        .enemy_provider(PassProvider)
        .build()
        .unwrap();
    let mut turn_rx = runtime.subscribe(Topic::Turn);

    assert_eq!(runtime.wait().await.unwrap(), BattleOutcome::Surrendered);
    next_matching(&mut turn_rx, |e| matches!(e, Event::Turn(TurnEvent::Stalled))).await;
}
