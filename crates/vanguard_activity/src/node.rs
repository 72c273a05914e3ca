//! Node types for activity graphs.
//!
//! Nodes are the vertices of an actor's behavior graph. Edges are stored as
//! [`NodeId`]s on the source node, never as references, so graphs may contain
//! cycles without any ownership concerns.

use core::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use vanguard_curve::SimTime;

use crate::actor::ActivityActor;
use crate::error::ActivityError;
use crate::task::{Condition, Task};

/// Unique identifier for a node in an activity graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Creates a new node ID.
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// Variant tag of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// Entry point of a graph.
    Start,
    /// Terminal node.
    End,
    /// Runs an action.
    Task,
    /// Branches on a predicate.
    Condition,
    /// Waits for an external change.
    Wait,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Start => "start",
            NodeType::End => "end",
            NodeType::Task => "task",
            NodeType::Condition => "condition",
            NodeType::Wait => "wait",
        };
        f.write_str(name)
    }
}

/// A node in an activity graph.
pub enum Node<A> {
    /// Entry point, forwards to a single successor.
    Start(StartNode),
    /// Terminal node. Reaching it finishes the activity.
    End(EndNode),
    /// Runs an action and forwards to a single successor.
    Task(TaskNode<A>),
    /// Selects a successor based on actor state.
    Condition(ConditionNode<A>),
    /// Blocks until one of its conditions is ready.
    Wait(WaitNode),
}

impl<A> Node<A> {
    /// Returns the node's ID.
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Node::Start(n) => n.id,
            Node::End(n) => n.id,
            Node::Task(n) => n.id,
            Node::Condition(n) => n.id,
            Node::Wait(n) => n.id,
        }
    }

    /// Returns the node's label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Node::Start(n) => &n.label,
            Node::End(n) => &n.label,
            Node::Task(n) => &n.label,
            Node::Condition(n) => &n.label,
            Node::Wait(n) => &n.label,
        }
    }

    /// Returns the node's variant tag.
    #[must_use]
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Start(_) => NodeType::Start,
            Node::End(_) => NodeType::End,
            Node::Task(_) => NodeType::Task,
            Node::Condition(_) => NodeType::Condition,
            Node::Wait(_) => NodeType::Wait,
        }
    }

    /// Returns the successor ids in insertion order.
    #[must_use]
    pub fn outputs(&self) -> Vec<NodeId> {
        match self {
            Node::Start(n) => n.output.into_iter().collect(),
            Node::End(_) => Vec::new(),
            Node::Task(n) => n.output.into_iter().collect(),
            Node::Condition(n) => n.successors(),
            Node::Wait(n) => n.successors(),
        }
    }

    /// Looks up the successor `successor`.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::UnknownSuccessor`] if the node has no such
    /// successor.
    pub fn next(&self, successor: NodeId) -> Result<NodeId, ActivityError> {
        let known = match self {
            Node::Start(n) => n.output == Some(successor),
            Node::End(_) => false,
            Node::Task(n) => n.output == Some(successor),
            Node::Condition(n) => n.branches.iter().any(|(_, next)| *next == successor),
            Node::Wait(n) => n.branches.values().any(|next| *next == successor),
        };
        if known {
            Ok(successor)
        } else {
            Err(ActivityError::UnknownSuccessor {
                node: self.id(),
                successor,
            })
        }
    }

    /// Adds a successor.
    ///
    /// Start and task nodes hold a single successor which is replaced.
    /// Condition nodes add an unguarded branch, used when no guarded branch
    /// matches. Wait nodes set their branch waiting for a command.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::TerminalNode`] for end nodes.
    pub fn add_output(&mut self, successor: NodeId) -> Result<(), ActivityError> {
        match self {
            Node::Start(n) => n.output = Some(successor),
            Node::End(n) => return Err(ActivityError::TerminalNode(n.id)),
            Node::Task(n) => n.add_output(successor),
            Node::Condition(n) => n.add_default(successor),
            Node::Wait(n) => n.add_branch(WaitCondition::Command, successor),
        }
        Ok(())
    }
}

impl<A> fmt::Display for Node<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.node_type(), self.id(), self.label())
    }
}

impl<A> fmt::Debug for Node<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id())
            .field("type", &self.node_type())
            .field("label", &self.label())
            .field("outputs", &self.outputs())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Start / End
// ─────────────────────────────────────────────────────────────────────────────

/// Entry point of a graph.
#[derive(Debug, Clone)]
pub struct StartNode {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Human-readable label.
    pub label: String,
    /// The sole successor.
    pub output: Option<NodeId>,
}

impl StartNode {
    /// Creates a start node labelled `"Start"`.
    #[must_use]
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            label: "Start".to_owned(),
            output: None,
        }
    }

    /// Returns the successor.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::NoSuccessor`] if none is set.
    pub fn get_next(&self) -> Result<NodeId, ActivityError> {
        self.output.ok_or(ActivityError::NoSuccessor(self.id))
    }
}

/// Terminal node.
#[derive(Debug, Clone)]
pub struct EndNode {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Human-readable label.
    pub label: String,
}

impl EndNode {
    /// Creates an end node labelled `"End"`.
    #[must_use]
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            label: "End".to_owned(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Task
// ─────────────────────────────────────────────────────────────────────────────

/// A node that runs an action and continues to a single successor.
///
/// Unlike the multi-successor nodes, adding an output to a task node
/// *replaces* its successor.
pub struct TaskNode<A> {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Human-readable label.
    pub label: String,
    /// The action run on every visit.
    pub task: Task<A>,
    /// The sole successor.
    pub output: Option<NodeId>,
}

impl<A> TaskNode<A> {
    /// Creates a task node labelled `"Task"`, with no successor and the
    /// placeholder action.
    #[must_use]
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            label: "Task".to_owned(),
            task: Task::unset(),
            output: None,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the action.
    #[must_use]
    pub fn with_task(mut self, task: Task<A>) -> Self {
        self.task = task;
        self
    }

    /// Sets the successor.
    #[must_use]
    pub fn with_output(mut self, output: NodeId) -> Self {
        self.output = Some(output);
        self
    }

    /// Replaces the action.
    pub fn set_task(&mut self, task: Task<A>) {
        self.task = task;
    }

    /// Returns the action.
    #[must_use]
    pub fn task(&self) -> &Task<A> {
        &self.task
    }

    /// Replaces the successor.
    pub fn add_output(&mut self, output: NodeId) {
        self.output = Some(output);
    }

    /// Returns the successor.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::NoSuccessor`] if none is set.
    pub fn get_next(&self) -> Result<NodeId, ActivityError> {
        self.output.ok_or(ActivityError::NoSuccessor(self.id))
    }
}

impl<A> fmt::Debug for TaskNode<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskNode")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("task", &self.task)
            .field("output", &self.output)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Condition
// ─────────────────────────────────────────────────────────────────────────────

/// A node that selects one of its successors by evaluating predicates.
///
/// Guarded branches are tried in insertion order; the first one whose
/// predicate holds wins. If none holds, the first unguarded branch is taken.
/// Branches are positional: several guards may lead to the same successor.
pub struct ConditionNode<A> {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Human-readable label.
    pub label: String,
    branches: Vec<(Option<Condition<A>>, NodeId)>,
}

impl<A> ConditionNode<A> {
    /// Creates a condition node with no branches.
    #[must_use]
    pub fn new(id: NodeId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            branches: Vec::new(),
        }
    }

    /// Appends a branch taken when `condition` holds.
    pub fn add_branch(&mut self, condition: Condition<A>, successor: NodeId) {
        self.branches.push((Some(condition), successor));
    }

    /// Appends an unguarded fallback branch.
    pub fn add_default(&mut self, successor: NodeId) {
        self.branches.push((None, successor));
    }

    /// Returns `true` if the node has no branches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Number of branches, guarded and unguarded.
    #[must_use]
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Distinct successors in first-insertion order.
    #[must_use]
    pub fn successors(&self) -> Vec<NodeId> {
        let mut successors = Vec::with_capacity(self.branches.len());
        for (_, successor) in &self.branches {
            if !successors.contains(successor) {
                successors.push(*successor);
            }
        }
        successors
    }

    /// Selects the successor for `actor` at `time`. Has no side effects.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::NoMatchingBranch`] if no guard holds and no
    /// unguarded branch exists.
    pub fn select(&self, time: SimTime, actor: &A) -> Result<NodeId, ActivityError> {
        let guarded = self.branches.iter().find_map(|(guard, successor)| {
            guard
                .as_ref()
                .filter(|condition| condition.evaluate(time, actor))
                .map(|_| *successor)
        });
        guarded
            .or_else(|| {
                self.branches
                    .iter()
                    .find(|(guard, _)| guard.is_none())
                    .map(|(_, successor)| *successor)
            })
            .ok_or(ActivityError::NoMatchingBranch(self.id))
    }
}

impl<A> fmt::Debug for ConditionNode<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionNode")
            .field("id", &self.id)
            .field("label", &self.label)
            .field(
                "branches",
                &self.branches.iter().map(|(_, next)| next).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wait
// ─────────────────────────────────────────────────────────────────────────────

/// What a wait node waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaitCondition {
    /// A command is queued and due.
    Command,
    /// The actor's wake timer has elapsed.
    Timer,
}

/// A node that blocks until one of its conditions becomes ready.
#[derive(Debug, Clone)]
pub struct WaitNode {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Human-readable label.
    pub label: String,
    branches: IndexMap<WaitCondition, NodeId>,
}

impl WaitNode {
    /// Creates a wait node with no branches.
    #[must_use]
    pub fn new(id: NodeId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            branches: IndexMap::new(),
        }
    }

    /// Adds a branch taken once `condition` is ready. Each condition has at
    /// most one branch; re-adding it replaces the successor and keeps its
    /// position.
    pub fn add_branch(&mut self, condition: WaitCondition, successor: NodeId) {
        self.branches.insert(condition, successor);
    }

    /// Returns `true` if the node has no branches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Iterates over `(successor, condition)` in insertion order.
    pub fn branches(&self) -> impl Iterator<Item = (NodeId, WaitCondition)> + '_ {
        self.branches.iter().map(|(condition, successor)| (*successor, *condition))
    }

    /// Distinct successors in first-insertion order.
    #[must_use]
    pub fn successors(&self) -> Vec<NodeId> {
        let mut successors = Vec::with_capacity(self.branches.len());
        for successor in self.branches.values() {
            if !successors.contains(successor) {
                successors.push(*successor);
            }
        }
        successors
    }

    /// Returns the first ready branch at `time`.
    #[must_use]
    pub fn ready_branch<A: ActivityActor>(
        &self,
        actor: &A,
        time: SimTime,
    ) -> Option<(WaitCondition, NodeId)> {
        self.branches()
            .find(|(_, condition)| actor.wait_ready(*condition, time))
            .map(|(successor, condition)| (condition, successor))
    }

    /// Earliest time any branch could become ready, or `None` if only an
    /// external change can wake the node.
    #[must_use]
    pub fn predict<A: ActivityActor>(&self, actor: &A, not_before: SimTime) -> Option<SimTime> {
        self.branches()
            .filter_map(|(_, condition)| actor.wait_prediction(condition, not_before))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: usize) -> NodeId {
        NodeId::new(value)
    }

    #[test]
    fn task_node_defaults() {
        let node: TaskNode<()> = TaskNode::new(id(1));
        assert_eq!(node.label, "Task");
        assert!(node.task().is_unset());
        assert!(matches!(node.get_next(), Err(ActivityError::NoSuccessor(n)) if n == id(1)));
    }

    #[test]
    fn task_add_output_replaces() {
        let mut node: Node<()> = Node::Task(TaskNode::new(id(1)));
        node.add_output(id(2)).unwrap();
        node.add_output(id(3)).unwrap();

        assert_eq!(node.outputs(), vec![id(3)]);
        assert!(node.next(id(3)).is_ok());
        assert!(matches!(
            node.next(id(2)),
            Err(ActivityError::UnknownSuccessor { .. })
        ));
    }

    #[test]
    fn condition_add_output_accumulates() {
        let mut node: Node<()> = Node::Condition(ConditionNode::new(id(1), "branch"));
        node.add_output(id(2)).unwrap();
        node.add_output(id(3)).unwrap();
        assert_eq!(node.outputs(), vec![id(2), id(3)]);
    }

    #[test]
    fn end_rejects_outputs() {
        let mut node: Node<()> = Node::End(EndNode::new(id(4)));
        assert!(matches!(
            node.add_output(id(5)),
            Err(ActivityError::TerminalNode(n)) if n == id(4)
        ));
    }

    #[test]
    fn condition_prefers_guarded_branch() {
        let mut node = ConditionNode::new(id(1), "is_big");
        node.add_default(id(2));
        node.add_branch(Condition::new(|_, value: &u32| *value > 10), id(3));

        assert_eq!(node.select(SimTime::ZERO, &50).unwrap(), id(3));
        assert_eq!(node.select(SimTime::ZERO, &5).unwrap(), id(2));
    }

    #[test]
    fn condition_keeps_default_and_guard_to_same_successor() {
        let mut node = ConditionNode::new(id(1), "shared");
        node.add_default(id(2));
        node.add_branch(Condition::new(|_, value: &u32| *value == 1), id(2));
        node.add_branch(Condition::new(|_, value: &u32| *value == 2), id(2));
        node.add_branch(Condition::new(|_, value: &u32| *value == 3), id(3));

        assert_eq!(node.branch_count(), 4);
        assert_eq!(node.successors(), vec![id(2), id(3)]);
        assert_eq!(node.select(SimTime::ZERO, &1).unwrap(), id(2));
        assert_eq!(node.select(SimTime::ZERO, &2).unwrap(), id(2));
        assert_eq!(node.select(SimTime::ZERO, &3).unwrap(), id(3));
        // the default survived the guards added after it
        assert_eq!(node.select(SimTime::ZERO, &9).unwrap(), id(2));
    }

    #[test]
    fn wait_conditions_may_share_a_successor() {
        let mut node = WaitNode::new(id(1), "either");
        node.add_branch(WaitCondition::Command, id(2));
        node.add_branch(WaitCondition::Timer, id(2));
        assert_eq!(node.branches().count(), 2);
        assert_eq!(node.successors(), vec![id(2)]);

        node.add_branch(WaitCondition::Command, id(3));
        assert_eq!(
            node.branches().collect::<Vec<_>>(),
            vec![(id(3), WaitCondition::Command), (id(2), WaitCondition::Timer)]
        );
    }

    #[test]
    fn condition_without_match_fails() {
        let mut node = ConditionNode::new(id(1), "never");
        node.add_branch(Condition::new(|_, _: &u32| false), id(2));
        assert!(matches!(
            node.select(SimTime::ZERO, &0),
            Err(ActivityError::NoMatchingBranch(_))
        ));
    }

    #[test]
    fn display_combines_type_id_and_label() {
        let node: Node<()> = Node::Task(TaskNode::new(id(7)).with_label("Move"));
        assert_eq!(node.to_string(), "task node_7 (Move)");
    }
}
