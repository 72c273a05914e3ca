//! End-to-end tests driving entities through the event loop.


use std::sync::Arc;

use parking_lot::Mutex;
use proptest::prelude::*;
use test_utils::{
    FRAGILE, SCOUT, TOWER, activity, node_labelled, recording_simulation, spawn_at_zero, t,
    test_factory,
};
use vanguard_activity::{ActivityError, ActivityEvent, ActivityEventKind, NodeId};
use vanguard_curve::{Coord, SimTime};
use vanguard_event::EventError;
use vanguard_gamestate::{
    ActivitySnapshot, ActivitySystem, Command, CommandQueue, EntityId, GameStateError,
    MoveAbility, Ownership, Phys3, Plugin, Position, Simulation, SimulationConfig, SpawnRequest,
};

fn queue_len(simulation: &Simulation, entity: EntityId) -> usize {
    simulation
        .state()
        .entity(entity)
        .unwrap()
        .get::<CommandQueue>()
        .unwrap()
        .len()
}

fn position_at(simulation: &Simulation, entity: EntityId, time: SimTime) -> Phys3 {
    simulation
        .state()
        .entity(entity)
        .unwrap()
        .get::<Position>()
        .unwrap()
        .get_position(time)
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMMANDS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn move_command_wakes_waiting_unit() {
    let (mut simulation, _) = recording_simulation(SimulationConfig::default());
    let scout = spawn_at_zero(&mut simulation, SCOUT);
    let wait_command = node_labelled(&simulation, scout, "wait for command");
    let wait_arrival = node_labelled(&simulation, scout, "wait for arrival");

    assert_eq!(activity(&simulation, scout).current_node(), Some(wait_command));

    simulation.advance_to(t(10)).unwrap();
    assert_eq!(activity(&simulation, scout).current_node(), Some(wait_command));

    let target = Phys3::from_ints(10, 0, 0);
    let keyed = simulation
        .enqueue_command(scout, t(20), Command::Move { target })
        .unwrap();
    assert_eq!(keyed, t(20));

    let report = simulation.advance_to(t(20)).unwrap();
    assert!(report.is_ok());
    assert_eq!(report.invoked, 1);

    let state = activity(&simulation, scout);
    assert_eq!(state.current_node(), Some(wait_arrival));
    assert_eq!(state.timer(), Some(t(25)));
    assert_eq!(queue_len(&simulation, scout), 0);
    assert_eq!(position_at(&simulation, scout, t(20)), Phys3::from_ints(0, 0, 0));
    assert_eq!(position_at(&simulation, scout, t(25)), target);

    let heading = simulation
        .state()
        .entity(scout)
        .unwrap()
        .get::<Position>()
        .unwrap()
        .get_angle(t(20));
    assert_eq!(heading, Coord::ZERO);

    simulation.advance_to(t(30)).unwrap();
    let state = activity(&simulation, scout);
    assert_eq!(state.current_node(), Some(wait_command));
    assert_eq!(state.timer(), None);
}

#[test]
fn idle_command_is_consumed() {
    let (mut simulation, _) = recording_simulation(SimulationConfig::default());
    let scout = spawn_at_zero(&mut simulation, SCOUT);

    simulation
        .enqueue_command(scout, t(5), Command::Idle)
        .unwrap();
    simulation
        .enqueue_command(scout, t(6), Command::Attack { target: scout })
        .unwrap();
    simulation.advance_to(t(10)).unwrap();

    assert_eq!(queue_len(&simulation, scout), 0);
    assert_eq!(
        activity(&simulation, scout).current_node(),
        Some(node_labelled(&simulation, scout, "wait for command"))
    );
    assert_eq!(position_at(&simulation, scout, t(10)), Phys3::from_ints(0, 0, 0));
}

#[test]
fn enqueue_to_unknown_entity_fails() {
    let (mut simulation, _) = recording_simulation(SimulationConfig::default());
    let err = simulation
        .enqueue_command(EntityId(42), t(1), Command::Idle)
        .unwrap_err();
    assert!(matches!(err, GameStateError::EntityNotFound(EntityId(42))));
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPAWNING
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn spawn_places_entity_and_reports() {
    let (mut simulation, _) = recording_simulation(SimulationConfig::default());
    simulation
        .spawn(
            SpawnRequest::new(3, SCOUT)
                .with_position(Phys3::from_ints(3, 4, 0))
                .with_owner(2),
            t(4),
        )
        .unwrap();

    simulation.advance_to(t(3)).unwrap();
    assert_eq!(simulation.state().entity_count(), 0);

    simulation.advance_to(t(4)).unwrap();
    let responses = simulation.state_mut().take_spawn_responses();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].request_id, 3);
    assert_eq!(responses[0].entity, EntityId(1));
    assert_eq!(responses[0].time, t(4));
    assert!(simulation.state().spawn_responses().is_empty());

    let entity = simulation.state().entity(EntityId(1)).unwrap();
    assert_eq!(entity.template(), SCOUT);
    let position = entity.get::<Position>().unwrap();
    assert_eq!(position.get_position(t(4)), Phys3::from_ints(3, 4, 0));
    assert_eq!(position.get_angle(t(4)), Coord::from_int(315));
    assert_eq!(entity.get::<Ownership>().unwrap().get_owner(t(4)), 2);
    assert!(activity(&simulation, EntityId(1)).is_active());
}

#[test]
fn spawned_entities_get_fresh_ids() {
    let (mut simulation, _) = recording_simulation(SimulationConfig::default());
    for request in 0..3 {
        simulation
            .spawn(SpawnRequest::new(request, TOWER), t(1))
            .unwrap();
    }
    simulation.advance_to(t(1)).unwrap();

    let ids: Vec<EntityId> = simulation
        .state()
        .get_game_entities()
        .map(|entity| entity.id())
        .collect();
    assert_eq!(ids, vec![EntityId(1), EntityId(2), EntityId(3)]);
}

#[test]
fn unknown_template_is_reported() {
    let (mut simulation, _) = recording_simulation(SimulationConfig::default());
    simulation
        .spawn(SpawnRequest::new(1, "dragon"), t(0))
        .unwrap();

    let report = simulation.advance_to(t(0)).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.to_string().contains("dragon"));
    assert_eq!(simulation.state().entity_count(), 0);
    assert!(simulation.state().spawn_responses().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// FAILURES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn failing_behavior_deactivates_actor() {
    let (mut simulation, recorder) = recording_simulation(SimulationConfig::default());
    let fragile = spawn_at_zero(&mut simulation, FRAGILE);

    let state = activity(&simulation, fragile);
    assert!(!state.is_active());
    assert!(state.events().is_empty());
    assert!(
        recorder
            .events()
            .iter()
            .any(|event| event.kind() == ActivityEventKind::TaskFailed)
    );

    // a deactivated actor ignores later advances
    simulation
        .enqueue_command(fragile, t(5), Command::Idle)
        .unwrap();
    let report = simulation.advance_to(t(10)).unwrap();
    assert_eq!(report.invoked, 0);
}

#[test]
fn failing_behavior_surfaces_without_deactivation() {
    let (mut simulation, _) =
        recording_simulation(SimulationConfig::default().with_deactivate_on_error(false));
    simulation
        .spawn(SpawnRequest::new(1, FRAGILE), t(0))
        .unwrap();

    let report = simulation.advance_to(t(0)).unwrap();
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.to_string().contains("blocked"));
    assert!(simulation.state().contains_entity(EntityId(1)));

    let responses = simulation.state().spawn_responses();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].entity, EntityId(1));

    let state = activity(&simulation, EntityId(1));
    assert!(state.is_active());
    assert_eq!(state.stalled_at(), Some(t(0)));
    assert_eq!(state.events().len(), 1);
}

#[test]
fn failed_move_retries_on_next_command() {
    let (mut simulation, _) =
        recording_simulation(SimulationConfig::default().with_deactivate_on_error(false));
    let tower = spawn_at_zero(&mut simulation, TOWER);
    let move_node = node_labelled(&simulation, tower, "move");
    let target = Phys3::from_ints(3, 4, 0);

    simulation
        .enqueue_command(tower, t(2), Command::Move { target })
        .unwrap();
    let report = simulation.advance_to(t(3)).unwrap();
    assert_eq!(report.failures.len(), 1);

    let state = activity(&simulation, tower);
    assert!(state.is_active());
    assert_eq!(state.current_node(), Some(move_node));
    assert_eq!(state.stalled_at(), Some(t(2)));
    assert_eq!(state.events().len(), 1);
    assert_eq!(
        simulation.event_loop().prediction(state.events()[0]),
        Some(SimTime::MAX)
    );
    assert_eq!(queue_len(&simulation, tower), 1);

    // nothing changes until a command arrives
    let report = simulation.advance_to(t(4)).unwrap();
    assert_eq!(report.invoked, 0);

    simulation
        .state_mut()
        .entity_mut(tower)
        .unwrap()
        .add_component(MoveAbility {
            speed: Coord::from_int(1),
        });
    simulation
        .enqueue_command(tower, t(5), Command::Idle)
        .unwrap();

    let report = simulation.advance_to(t(100)).unwrap();
    assert!(report.is_ok());
    assert!(report.invoked >= 1);
    assert_eq!(position_at(&simulation, tower, t(5)), Phys3::from_ints(0, 0, 0));
    assert_eq!(position_at(&simulation, tower, t(10)), target);
    assert_eq!(queue_len(&simulation, tower), 0);

    let state = activity(&simulation, tower);
    assert_eq!(state.stalled_at(), None);
    assert_eq!(
        state.current_node(),
        Some(node_labelled(&simulation, tower, "wait for command"))
    );
}

#[test]
fn immobile_unit_fails_move() {
    let (mut simulation, _) = recording_simulation(SimulationConfig::default());
    let tower = spawn_at_zero(&mut simulation, TOWER);

    simulation
        .enqueue_command(
            tower,
            t(2),
            Command::Move {
                target: Phys3::from_ints(5, 5, 0),
            },
        )
        .unwrap();
    simulation.advance_to(t(2)).unwrap();

    assert!(!activity(&simulation, tower).is_active());
    assert_eq!(position_at(&simulation, tower, t(2)), Phys3::from_ints(0, 0, 0));
    // the move was never started, so it is still queued
    assert_eq!(queue_len(&simulation, tower), 1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// REMOVAL
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn removed_entity_leaves_no_events() {
    let (mut simulation, _) = recording_simulation(SimulationConfig::default());
    let scout = spawn_at_zero(&mut simulation, SCOUT);
    simulation
        .enqueue_command(
            scout,
            t(20),
            Command::Move {
                target: Phys3::from_ints(4, 0, 0),
            },
        )
        .unwrap();
    assert_eq!(simulation.event_loop().pending(), 1);

    let removed = simulation.remove_entity(scout).unwrap();
    assert_eq!(removed.id(), scout);
    assert!(simulation.remove_entity(scout).is_none());
    assert_eq!(simulation.event_loop().pending(), 0);

    let report = simulation.advance_to(t(30)).unwrap();
    assert!(report.is_ok());
    assert_eq!(report.invoked, 0);
}

#[test]
fn removing_parked_entities_drains_the_loop() {
    let (mut simulation, _) = recording_simulation(SimulationConfig::default());
    for request in 0..5 {
        simulation
            .spawn(SpawnRequest::new(request, TOWER), t(1))
            .unwrap();
    }
    simulation.advance_to(t(1)).unwrap();
    assert_eq!(simulation.event_loop().pending(), 5);

    for response in simulation.state_mut().take_spawn_responses() {
        simulation.remove_entity(response.entity).unwrap();
    }
    assert_eq!(simulation.state().entity_count(), 0);
    assert_eq!(simulation.event_loop().pending(), 0);
}

#[test]
fn advancing_backwards_is_rejected() {
    let (mut simulation, _) = recording_simulation(SimulationConfig::default());
    let scout = spawn_at_zero(&mut simulation, SCOUT);
    simulation
        .enqueue_command(
            scout,
            t(20),
            Command::Move {
                target: Phys3::from_ints(4, 0, 0),
            },
        )
        .unwrap();
    simulation.advance_to(t(20)).unwrap();

    let err = simulation.advance_to(t(10)).unwrap_err();
    assert!(matches!(
        err,
        GameStateError::Event(EventError::TimeRegression { .. })
    ));

    let executor = simulation.state().executor().clone();
    let entity = simulation.state_mut().entity_mut(scout).unwrap();
    let err = ActivitySystem::advance(entity, t(5), &executor).unwrap_err();
    assert!(matches!(
        err,
        GameStateError::TimeRegression { requested, last, .. } if requested == t(5) && last == t(20)
    ));
}

#[test]
fn zero_step_bound_is_rejected() {
    let err = Simulation::new(
        SimulationConfig::default().with_max_activity_steps(0),
        test_factory(),
    )
    .unwrap_err();
    assert!(matches!(err, GameStateError::Config(_)));
}

#[test]
fn transition_logging_installs_observer() {
    let simulation = Simulation::new(
        SimulationConfig::default().with_log_transitions(true),
        test_factory(),
    )
    .unwrap();
    assert_eq!(simulation.hooks().hook_count(ActivityEventKind::NodeEntered), 1);
    assert_eq!(simulation.hooks().hook_count(ActivityEventKind::TaskStarted), 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPLAY AND SNAPSHOTS
// ═══════════════════════════════════════════════════════════════════════════════

fn scripted_run() -> Vec<ActivityEvent> {
    let (mut simulation, recorder) = recording_simulation(SimulationConfig::default());
    simulation.spawn(SpawnRequest::new(1, SCOUT), t(0)).unwrap();
    simulation
        .spawn(
            SpawnRequest::new(2, SCOUT).with_position(Phys3::from_ints(6, 8, 0)),
            t(1),
        )
        .unwrap();
    simulation.advance_to(t(1)).unwrap();

    for (entity, time, x) in [(1, 3, 6), (2, 3, 0), (1, 4, -2), (2, 12, 9)] {
        simulation
            .enqueue_command(
                EntityId(entity),
                t(time),
                Command::Move {
                    target: Phys3::from_ints(x, 0, 0),
                },
            )
            .unwrap();
    }
    simulation.advance_to(t(50)).unwrap();
    recorder.events()
}

#[test]
fn replay_is_deterministic() {
    let first = scripted_run();
    let second = scripted_run();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn snapshot_round_trips_and_restores() {
    let (mut simulation, _) = recording_simulation(SimulationConfig::default());
    let scout = spawn_at_zero(&mut simulation, SCOUT);
    simulation
        .enqueue_command(
            scout,
            t(20),
            Command::Move {
                target: Phys3::from_ints(10, 0, 0),
            },
        )
        .unwrap();
    simulation.advance_to(t(20)).unwrap();

    let snapshot = simulation.snapshot(scout).unwrap();
    assert_eq!(
        snapshot.node,
        Some(node_labelled(&simulation, scout, "wait for arrival"))
    );
    assert_eq!(snapshot.timer, Some(t(25)));
    assert!(snapshot.commands.is_empty());

    let decoded = ActivitySnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
    assert_eq!(decoded, snapshot);

    simulation
        .enqueue_command(scout, t(22), Command::Idle)
        .unwrap();
    assert_eq!(queue_len(&simulation, scout), 1);

    simulation.restore(&decoded, t(21)).unwrap();
    assert_eq!(queue_len(&simulation, scout), 0);
    assert_eq!(activity(&simulation, scout).events().len(), 1);

    simulation.advance_to(t(30)).unwrap();
    let state = activity(&simulation, scout);
    assert_eq!(
        state.current_node(),
        Some(node_labelled(&simulation, scout, "wait for command"))
    );
    assert_eq!(state.timer(), None);
}

#[test]
fn restore_before_now_is_rejected() {
    let (mut simulation, _) = recording_simulation(SimulationConfig::default());
    let scout = spawn_at_zero(&mut simulation, SCOUT);
    simulation.advance_to(t(50)).unwrap();

    let mut snapshot = simulation.snapshot(scout).unwrap();
    let target = Phys3::from_ints(4, 0, 0);
    snapshot.commands.push((t(5), Command::Move { target }));

    let err = simulation.restore(&snapshot, t(5)).unwrap_err();
    assert!(matches!(
        err,
        GameStateError::Event(EventError::TimeRegression { requested, now })
            if requested == t(5) && now == t(50)
    ));
    assert_eq!(queue_len(&simulation, scout), 0);
    assert_eq!(activity(&simulation, scout).last_advance(), Some(t(0)));
    assert_eq!(position_at(&simulation, scout, t(6)), Phys3::from_ints(0, 0, 0));

    simulation.restore(&snapshot, t(50)).unwrap();
    assert_eq!(position_at(&simulation, scout, t(50)), Phys3::from_ints(0, 0, 0));
    assert_eq!(position_at(&simulation, scout, t(52)), target);
}

#[test]
fn restore_rejects_foreign_node() {
    let (mut simulation, _) = recording_simulation(SimulationConfig::default());
    let scout = spawn_at_zero(&mut simulation, SCOUT);

    let mut snapshot = simulation.snapshot(scout).unwrap();
    snapshot.node = Some(NodeId::new(999));

    let err = simulation.restore(&snapshot, t(1)).unwrap_err();
    assert!(matches!(
        err,
        GameStateError::Activity(ActivityError::NodeNotFound(_))
    ));
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLUGINS
// ═══════════════════════════════════════════════════════════════════════════════

type Journal = Arc<Mutex<Vec<String>>>;

struct Recording {
    name: &'static str,
    journal: Journal,
}

impl Plugin for Recording {
    fn build(&self, simulation: &mut Simulation) {
        self.journal.lock().push(format!("build {}", self.name));
        simulation.insert_resource(self.name.len());
    }

    fn ready(&self, _simulation: &mut Simulation) {
        self.journal.lock().push(format!("ready {}", self.name));
    }

    fn cleanup(&self, _simulation: &mut Simulation) {
        self.journal.lock().push(format!("cleanup {}", self.name));
    }

    fn is_unique(&self) -> bool {
        false
    }
}

struct Singleton;

impl Plugin for Singleton {
    fn build(&self, simulation: &mut Simulation) {
        simulation.insert_resource("singleton");
    }
}

#[test]
fn plugin_lifecycle_runs_in_order() {
    let journal = Journal::default();
    let mut simulation = Simulation::new(SimulationConfig::default(), test_factory()).unwrap();
    simulation
        .add_plugins(Recording {
            name: "a",
            journal: Arc::clone(&journal),
        })
        .unwrap()
        .add_plugins(Recording {
            name: "bb",
            journal: Arc::clone(&journal),
        })
        .unwrap();
    assert!(journal.lock().is_empty());

    simulation.finish().unwrap();
    simulation
        .add_plugins(Recording {
            name: "late",
            journal: Arc::clone(&journal),
        })
        .unwrap();
    simulation.cleanup();

    assert_eq!(
        *journal.lock(),
        vec![
            "build a",
            "build bb",
            "ready a",
            "ready bb",
            "build late",
            "ready late",
            "cleanup late",
            "cleanup bb",
            "cleanup a",
        ]
    );
    assert_eq!(simulation.get_resource::<usize>(), Some(&4));
    assert!(matches!(
        simulation.finish(),
        Err(GameStateError::AlreadyFinished)
    ));
}

#[test]
fn unique_plugin_is_rejected_twice() {
    let mut simulation = Simulation::new(SimulationConfig::default(), test_factory()).unwrap();
    simulation.add_plugins(Singleton).unwrap();
    let err = simulation.add_plugins(Singleton).unwrap_err();
    assert!(matches!(err, GameStateError::DuplicatePlugin(_)));
    assert!(simulation.has_plugin::<Singleton>());

    simulation.finish().unwrap();
    assert_eq!(simulation.get_resource::<&'static str>(), Some(&"singleton"));
    assert!(!simulation.contains_resource::<u8>());
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every queued move is executed once, the last one decides where the
    /// unit ends up, and observed time never runs backwards.
    #[test]
    fn prop_moves_execute_in_time_order(
        commands in prop::collection::btree_map(1i64..200, (-50i64..50, -50i64..50), 1..8)
    ) {
        let (mut simulation, recorder) = recording_simulation(SimulationConfig::default());
        let scout = spawn_at_zero(&mut simulation, SCOUT);
        let move_node = node_labelled(&simulation, scout, "move");

        for (time, (x, y)) in &commands {
            simulation
                .enqueue_command(scout, t(*time), Command::Move { target: Phys3::from_ints(*x, *y, 0) })
                .unwrap();
        }
        simulation.advance_to(SimTime::from_int(10_000)).unwrap();

        prop_assert_eq!(queue_len(&simulation, scout), 0);

        let events = recorder.events();
        let moves = events
            .iter()
            .filter(|event| matches!(event, ActivityEvent::TaskStarted { node, .. } if *node == move_node))
            .count();
        prop_assert_eq!(moves, commands.len());

        let times: Vec<SimTime> = events.iter().map(ActivityEvent::time).collect();
        prop_assert!(times.windows(2).all(|pair| pair[0] <= pair[1]));

        let (x, y) = commands.values().last().copied().unwrap();
        prop_assert_eq!(
            position_at(&simulation, scout, SimTime::from_int(10_000)),
            Phys3::from_ints(x, y, 0)
        );
    }
}
