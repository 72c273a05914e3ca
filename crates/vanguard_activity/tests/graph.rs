//! Tests for graph construction and validation in `vanguard_activity`.

mod test_utils;

use test_utils::TestActor;
use vanguard_activity::{
    ActivityError, ActivityGraph, IdAllocator, Node, NodeId, Task, TaskNode, ValidationError,
    ValidationWarning, WaitCondition,
};

fn noop() -> Task<TestActor> {
    Task::infallible(|_, _| {})
}

#[test]
fn linear_graph_is_valid() {
    let mut graph = ActivityGraph::new();
    let start = graph.add_start();
    let task = graph.add_task("work", noop());
    let end = graph.add_end();
    graph.connect(start, task).unwrap();
    graph.connect(task, end).unwrap();

    assert!(graph.validate().is_ok());
    assert!(graph.warnings().is_empty());
    assert_eq!(graph.start(), Some(start));
    assert_eq!(graph.node_count(), 3);
}

#[test]
fn missing_start_is_reported() {
    let mut graph: ActivityGraph<TestActor> = ActivityGraph::new();
    graph.add_end();

    let errors = graph.validate().unwrap_err();
    assert_eq!(errors, vec![ValidationError::NoStartNode]);
}

#[test]
fn second_start_is_reported_but_first_is_kept() {
    let mut graph: ActivityGraph<TestActor> = ActivityGraph::new();
    let first = graph.add_start();
    let second = graph.add_start();
    let end = graph.add_end();
    graph.connect(first, end).unwrap();
    graph.connect(second, end).unwrap();

    assert_eq!(graph.start(), Some(first));
    let errors = graph.validate().unwrap_err();
    assert_eq!(
        errors,
        vec![ValidationError::MultipleStartNodes(vec![first, second])]
    );
}

#[test]
fn missing_successors_and_branches_are_reported() {
    let mut graph: ActivityGraph<TestActor> = ActivityGraph::new();
    let start = graph.add_start();
    let task = graph.add_task("work", noop());
    let check = graph.add_condition("check");
    let wait = graph.add_wait("wait");
    graph.connect(start, task).unwrap();

    let errors = graph.validate().unwrap_err();
    assert!(errors.contains(&ValidationError::MissingSuccessor(task)));
    assert!(errors.contains(&ValidationError::EmptyBranches(check)));
    assert!(errors.contains(&ValidationError::EmptyBranches(wait)));
}

#[test]
fn dangling_successor_from_prebuilt_node() {
    let mut graph: ActivityGraph<TestActor> = ActivityGraph::new();
    let start = graph.add_start();
    let ghost = NodeId::new(90);
    let task = TaskNode::new(NodeId::new(40))
        .with_label("prebuilt")
        .with_task(noop())
        .with_output(ghost);
    let task_id = graph.insert(Node::Task(task)).unwrap();
    graph.connect(start, task_id).unwrap();

    let errors = graph.validate().unwrap_err();
    assert_eq!(
        errors,
        vec![ValidationError::DanglingSuccessor {
            node: task_id,
            successor: ghost
        }]
    );

    // ids allocated afterwards skip past the inserted node
    let next = graph.add_end();
    assert!(next.index() > task_id.index());
}

#[test]
fn duplicate_insert_is_rejected() {
    let mut graph: ActivityGraph<TestActor> = ActivityGraph::new();
    let start = graph.add_start();
    let clash = TaskNode::new(start).with_task(noop());

    assert!(matches!(
        graph.insert(Node::Task(clash)),
        Err(ActivityError::DuplicateNode(id)) if id == start
    ));
}

#[test]
fn connect_rejects_unknown_and_terminal_nodes() {
    let mut graph: ActivityGraph<TestActor> = ActivityGraph::new();
    let start = graph.add_start();
    let end = graph.add_end();

    assert!(matches!(
        graph.connect(start, NodeId::new(77)),
        Err(ActivityError::NodeNotFound(_))
    ));
    assert!(matches!(
        graph.connect(end, start),
        Err(ActivityError::TerminalNode(id)) if id == end
    ));
    assert!(matches!(
        graph.add_wait_branch(start, WaitCondition::Timer, end),
        Err(ActivityError::NodeNotFound(id)) if id == start
    ));
}

#[test]
fn connecting_a_task_twice_replaces_its_successor() {
    let mut graph: ActivityGraph<TestActor> = ActivityGraph::new();
    let task = graph.add_task("work", noop());
    let first = graph.add_end();
    let second = graph.add_end();
    graph.connect(task, first).unwrap();
    graph.connect(task, second).unwrap();

    assert_eq!(graph.node(task).unwrap().outputs(), vec![second]);
}

#[test]
fn warnings_flag_unset_and_unreachable_nodes() {
    let mut graph: ActivityGraph<TestActor> = ActivityGraph::new();
    let start = graph.add_start();
    let placeholder = graph.add_task("todo", Task::unset());
    let end = graph.add_end();
    let orphan = graph.add_end();
    graph.connect(start, placeholder).unwrap();
    graph.connect(placeholder, end).unwrap();

    let warnings = graph.warnings();
    assert_eq!(
        warnings,
        vec![
            ValidationWarning::UnsetTask(placeholder),
            ValidationWarning::Unreachable(orphan),
        ]
    );
    assert!(graph.validate().is_ok());
}

#[test]
fn shared_allocator_keeps_ids_unique_across_graphs() {
    let allocator = IdAllocator::new();
    let mut first: ActivityGraph<TestActor> = ActivityGraph::with_allocator(allocator.clone());
    let mut second: ActivityGraph<TestActor> = ActivityGraph::with_allocator(allocator.clone());

    let a = first.add_start();
    let b = second.add_start();
    let c = first.add_end();

    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_eq!(allocator.current_node_id(), 3);
}
