//! Integration tests for activity advancement.
//!
//! Covers the canonical scenarios (linear task to end, waiting for a command,
//! unset task, divergent cycle), idempotence of repeated advances, branch
//! selection and the observer event stream.

mod test_utils;

use proptest::prelude::*;
use test_utils::{TestActor, recording_executor, t};
use vanguard_activity::{
    ActivityError, ActivityEvent, ActivityExecutor, ActivityGraph, AdvanceOutcome, Condition,
    NodeId, Task, TaskError, WaitCondition,
};

fn log_task(label: &'static str) -> Task<TestActor> {
    Task::infallible(move |_, actor: &mut TestActor| actor.log.push(label.to_owned()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn task_then_end_runs_once() {
    let mut graph = ActivityGraph::new();
    let start = graph.add_start();
    let place = graph.add_task(
        "set position",
        Task::infallible(|_, actor: &mut TestActor| actor.position += 10),
    );
    let end = graph.add_end();
    graph.connect(start, place).unwrap();
    graph.connect(place, end).unwrap();

    let executor = ActivityExecutor::new();
    let mut actor = TestActor::new(1);
    executor.init(&graph, &mut actor, t(0)).unwrap();

    let outcome = executor.advance(&graph, &mut actor, t(0)).unwrap();
    assert_eq!(outcome, AdvanceOutcome::Finished { node: end });
    assert_eq!(actor.position, 10);

    let outcome = executor.advance(&graph, &mut actor, t(100)).unwrap();
    assert_eq!(outcome, AdvanceOutcome::Finished { node: end });
    assert_eq!(actor.position, 10);
}

#[test]
fn wait_for_command_then_move() {
    let mut graph = ActivityGraph::new();
    let start = graph.add_start();
    let wait = graph.add_wait("wait for command");
    let do_move = graph.add_task(
        "move",
        Task::new(|time, actor: &mut TestActor| {
            let command = actor
                .commands
                .pop_front(time)
                .ok_or_else(|| TaskError::failed("no command"))?;
            actor.log.push(command.to_owned());
            Ok(())
        }),
    );
    let end = graph.add_end();
    graph.connect(start, wait).unwrap();
    graph
        .add_wait_branch(wait, WaitCondition::Command, do_move)
        .unwrap();
    graph.connect(do_move, end).unwrap();

    let executor = ActivityExecutor::new();
    let mut actor = TestActor::new(1);
    executor.init(&graph, &mut actor, t(0)).unwrap();

    let outcome = executor.advance(&graph, &mut actor, t(10)).unwrap();
    assert_eq!(
        outcome,
        AdvanceOutcome::Waiting {
            node: wait,
            wake_at: None
        }
    );

    actor.commands.insert(t(20), "move");
    let outcome = executor.advance(&graph, &mut actor, t(15)).unwrap();
    assert_eq!(
        outcome,
        AdvanceOutcome::Waiting {
            node: wait,
            wake_at: Some(t(20))
        }
    );
    assert!(actor.log.is_empty());

    let outcome = executor.advance(&graph, &mut actor, t(20)).unwrap();
    assert_eq!(outcome, AdvanceOutcome::Finished { node: end });
    assert_eq!(actor.log, vec!["move"]);
}

#[test]
fn unset_task_fails_and_keeps_pointer() {
    let mut graph = ActivityGraph::new();
    let start = graph.add_start();
    let broken = graph.add_task("unconfigured", Task::unset());
    let end = graph.add_end();
    graph.connect(start, broken).unwrap();
    graph.connect(broken, end).unwrap();

    let executor = ActivityExecutor::new();
    let mut actor = TestActor::new(1);
    executor.init(&graph, &mut actor, t(0)).unwrap();

    let err = executor.advance(&graph, &mut actor, t(0)).unwrap_err();
    assert!(matches!(err, ActivityError::UnsetTask(node) if node == broken));
    assert_eq!(actor.node, Some(broken));

    let err = executor.advance(&graph, &mut actor, t(1)).unwrap_err();
    assert!(matches!(err, ActivityError::UnsetTask(node) if node == broken));
    assert_eq!(actor.node, Some(broken));
}

#[test]
fn cycle_without_wait_diverges() {
    let mut graph = ActivityGraph::new();
    let start = graph.add_start();
    let a = graph.add_task("a", log_task("a"));
    let b = graph.add_task("b", log_task("b"));
    graph.connect(start, a).unwrap();
    graph.connect(a, b).unwrap();
    graph.connect(b, a).unwrap();

    let executor = ActivityExecutor::new().with_max_steps(50);
    let mut actor = TestActor::new(1);
    executor.init(&graph, &mut actor, t(0)).unwrap();

    let err = executor.advance(&graph, &mut actor, t(0)).unwrap_err();
    let ActivityError::GraphDivergence {
        max_steps, chain, ..
    } = err
    else {
        panic!("expected divergence, got {err}");
    };
    assert_eq!(max_steps, 50);
    assert!(!chain.is_empty());
    assert!(chain.iter().all(|node| *node == a || *node == b || *node == start));
    assert_eq!(actor.log.len(), 49);
}

// ═══════════════════════════════════════════════════════════════════════════════
// SEMANTICS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn advance_before_init_fails() {
    let mut graph: ActivityGraph<TestActor> = ActivityGraph::new();
    graph.add_start();
    let executor = ActivityExecutor::new();
    let mut actor = TestActor::new(1);

    assert!(matches!(
        executor.advance(&graph, &mut actor, t(0)),
        Err(ActivityError::NotInitialized)
    ));
}

#[test]
fn init_without_start_fails() {
    let graph: ActivityGraph<TestActor> = ActivityGraph::new();
    let mut actor = TestActor::new(1);
    assert!(matches!(
        ActivityExecutor::new().init(&graph, &mut actor, t(0)),
        Err(ActivityError::NoStartNode)
    ));
}

#[test]
fn repeated_advance_is_idempotent() {
    let mut graph = ActivityGraph::new();
    let start = graph.add_start();
    let greet = graph.add_task("greet", log_task("greet"));
    let wait = graph.add_wait("idle");
    graph.connect(start, greet).unwrap();
    graph.connect(greet, wait).unwrap();
    graph.connect(wait, greet).unwrap();

    let executor = ActivityExecutor::new();
    let mut actor = TestActor::new(1);
    executor.init(&graph, &mut actor, t(0)).unwrap();

    let first = executor.advance(&graph, &mut actor, t(5)).unwrap();
    let second = executor.advance(&graph, &mut actor, t(5)).unwrap();
    assert_eq!(first, second);
    assert_eq!(actor.log, vec!["greet"]);
}

#[test]
fn timer_wait_reports_wake_time_and_clears() {
    let mut graph = ActivityGraph::new();
    let start = graph.add_start();
    let wait = graph.add_wait("cooldown");
    let end = graph.add_end();
    graph.connect(start, wait).unwrap();
    graph
        .add_wait_branch(wait, WaitCondition::Timer, end)
        .unwrap();

    let executor = ActivityExecutor::new();
    let mut actor = TestActor::new(1);
    actor.timer = Some(t(30));
    executor.init(&graph, &mut actor, t(0)).unwrap();

    assert_eq!(
        executor.advance(&graph, &mut actor, t(10)).unwrap(),
        AdvanceOutcome::Waiting {
            node: wait,
            wake_at: Some(t(30))
        }
    );
    assert!(
        executor
            .advance(&graph, &mut actor, t(30))
            .unwrap()
            .is_finished()
    );
    assert_eq!(actor.timer, None);
}

#[test]
fn first_ready_wait_branch_wins() {
    let mut graph = ActivityGraph::new();
    let start = graph.add_start();
    let wait = graph.add_wait("either");
    let on_timer = graph.add_task("timer", log_task("timer"));
    let on_command = graph.add_task("command", log_task("command"));
    let end = graph.add_end();
    graph.connect(start, wait).unwrap();
    graph
        .add_wait_branch(wait, WaitCondition::Timer, on_timer)
        .unwrap();
    graph
        .add_wait_branch(wait, WaitCondition::Command, on_command)
        .unwrap();
    graph.connect(on_timer, end).unwrap();
    graph.connect(on_command, end).unwrap();

    let executor = ActivityExecutor::new();
    let mut actor = TestActor::new(1);
    actor.timer = Some(t(5));
    actor.commands.insert(t(5), "go");
    executor.init(&graph, &mut actor, t(0)).unwrap();

    assert_eq!(
        executor.advance(&graph, &mut actor, t(1)).unwrap(),
        AdvanceOutcome::Waiting {
            node: wait,
            wake_at: Some(t(5))
        }
    );
    executor.advance(&graph, &mut actor, t(5)).unwrap();
    assert_eq!(actor.log, vec!["timer"]);
}

#[test]
fn condition_routes_on_actor_state() {
    let mut graph = ActivityGraph::new();
    let start = graph.add_start();
    let check = graph.add_condition("far away?");
    let walk = graph.add_task("walk", log_task("walk"));
    let stay = graph.add_task("stay", log_task("stay"));
    let end = graph.add_end();
    graph.connect(start, check).unwrap();
    graph
        .add_branch(
            check,
            Condition::new(|_, actor: &TestActor| actor.position > 100),
            walk,
        )
        .unwrap();
    graph.connect(check, stay).unwrap();
    graph.connect(walk, end).unwrap();
    graph.connect(stay, end).unwrap();

    let executor = ActivityExecutor::new();

    let mut near = TestActor::new(1);
    executor.init(&graph, &mut near, t(0)).unwrap();
    executor.advance(&graph, &mut near, t(0)).unwrap();
    assert_eq!(near.log, vec!["stay"]);

    let mut far = TestActor::new(2);
    far.position = 500;
    executor.init(&graph, &mut far, t(0)).unwrap();
    executor.advance(&graph, &mut far, t(0)).unwrap();
    assert_eq!(far.log, vec!["walk"]);
}

#[test]
fn failing_action_surfaces_source() {
    let mut graph = ActivityGraph::new();
    let start = graph.add_start();
    let fail = graph.add_task(
        "fail",
        Task::new(|_, _: &mut TestActor| Err(TaskError::failed("blocked"))),
    );
    let end = graph.add_end();
    graph.connect(start, fail).unwrap();
    graph.connect(fail, end).unwrap();

    let executor = ActivityExecutor::new();
    let mut actor = TestActor::new(1);
    executor.init(&graph, &mut actor, t(0)).unwrap();

    let err = executor.advance(&graph, &mut actor, t(0)).unwrap_err();
    assert!(matches!(&err, ActivityError::Task { node, .. } if *node == fail));
    assert_eq!(err.to_string(), format!("task {fail} failed: blocked"));
    assert_eq!(actor.node, Some(fail));
}

#[test]
fn task_without_successor_does_not_run() {
    let mut graph = ActivityGraph::new();
    let start = graph.add_start();
    let dangling = graph.add_task("dangling", log_task("dangling"));
    graph.connect(start, dangling).unwrap();

    let executor = ActivityExecutor::new();
    let mut actor = TestActor::new(1);
    executor.init(&graph, &mut actor, t(0)).unwrap();

    assert!(matches!(
        executor.advance(&graph, &mut actor, t(0)),
        Err(ActivityError::NoSuccessor(node)) if node == dangling
    ));
    assert!(actor.log.is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOOKS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn observers_see_transition_sequence() {
    let mut graph = ActivityGraph::new();
    let start = graph.add_start();
    let task = graph.add_task("work", log_task("work"));
    let end = graph.add_end();
    graph.connect(start, task).unwrap();
    graph.connect(task, end).unwrap();

    let (executor, recorder) = recording_executor();
    let mut actor = TestActor::new(9);
    executor.init(&graph, &mut actor, t(0)).unwrap();
    executor.advance(&graph, &mut actor, t(0)).unwrap();

    let nodes: Vec<(NodeId, &'static str)> = recorder
        .events()
        .iter()
        .map(|event| {
            let kind = match event {
                ActivityEvent::NodeEntered { .. } => "entered",
                ActivityEvent::TaskStarted { .. } => "started",
                ActivityEvent::TaskCompleted { .. } => "completed",
                ActivityEvent::Finished { .. } => "finished",
                _ => "other",
            };
            (event.node(), kind)
        })
        .collect();

    assert_eq!(
        nodes,
        vec![
            (start, "entered"),
            (task, "entered"),
            (task, "started"),
            (task, "completed"),
            (end, "entered"),
            (end, "finished"),
        ]
    );
    assert!(recorder.events().iter().all(|event| event.actor() == 9));
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// On an acyclic chain of tasks separated by timer waits, advancing at
    /// non-decreasing times never moves the pointer back to a visited node.
    #[test]
    fn prop_acyclic_graph_never_moves_backward(
        timers in prop::collection::vec(1i64..20, 1..8),
        mut times in prop::collection::vec(0i64..200, 1..24),
    ) {
        times.sort_unstable();

        let mut graph = ActivityGraph::new();
        let mut previous = graph.add_start();
        for index in 0..timers.len() {
            let task = graph.add_task(format!("step {index}"), log_task("step"));
            let wait = graph.add_wait(format!("wait {index}"));
            if index == 0 {
                graph.connect(previous, task).unwrap();
            } else {
                graph.add_wait_branch(previous, WaitCondition::Timer, task).unwrap();
            }
            graph.connect(task, wait).unwrap();
            previous = wait;
        }
        let end = graph.add_end();
        graph.add_wait_branch(previous, WaitCondition::Timer, end).unwrap();

        let order: Vec<NodeId> = graph.nodes().map(|node| node.id()).collect();
        let position = |id: NodeId| order.iter().position(|n| *n == id).unwrap_or(usize::MAX);

        let executor = ActivityExecutor::new();
        let mut actor = TestActor::new(1);
        executor.init(&graph, &mut actor, t(0)).unwrap();

        let mut last_position = 0;
        let mut timer_index = 0;
        for time in times {
            if actor.timer.is_none() && timer_index < timers.len() {
                actor.timer = Some(t(time + timers[timer_index]));
                timer_index += 1;
            }
            let outcome = executor.advance(&graph, &mut actor, t(time));
            prop_assert!(outcome.is_ok());
            let here = position(actor.node.unwrap());
            prop_assert!(here >= last_position);
            last_position = here;
        }
    }
}
