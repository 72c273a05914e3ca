//! Graph structure and builder API.
//!
//! An [`ActivityGraph`] is an arena of [`Node`]s addressed by [`NodeId`].
//! Graphs are built once, validated, then shared read-only (usually behind an
//! `Arc`) by every actor running that behavior.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use hashbrown::HashSet;
use indexmap::IndexMap;

use crate::error::ActivityError;
use crate::node::{
    ConditionNode, EndNode, Node, NodeId, NodeType, StartNode, TaskNode, WaitCondition, WaitNode,
};
use crate::task::{Condition, Task};

// ─────────────────────────────────────────────────────────────────────────────
// ID Allocator
// ─────────────────────────────────────────────────────────────────────────────

/// Shared allocator for node IDs.
///
/// Clones share the same counter, so graphs built from one allocator never
/// hand out the same id twice.
///
/// # Example
///
/// ```
/// use vanguard_activity::graph::IdAllocator;
///
/// let allocator = IdAllocator::new();
/// let first = allocator.allocate_node_id();
///
/// let shared = allocator.clone();
/// let second = shared.allocate_node_id();
/// assert_ne!(first, second);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next_node_id: Arc<AtomicUsize>,
}

impl IdAllocator {
    /// Creates a new ID allocator starting at 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next unique node ID.
    pub fn allocate_node_id(&self) -> NodeId {
        NodeId::new(self.next_node_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Makes sure `id` is never allocated.
    pub fn reserve(&self, id: NodeId) {
        self.next_node_id
            .fetch_max(id.index().saturating_add(1), Ordering::Relaxed);
    }

    /// Returns the current node ID counter value (for debugging).
    #[must_use]
    pub fn current_node_id(&self) -> usize {
        self.next_node_id.load(Ordering::Relaxed)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ActivityGraph
// ─────────────────────────────────────────────────────────────────────────────

/// A behavior graph over actors of type `A`.
///
/// # Example
///
/// ```
/// use vanguard_activity::{ActivityGraph, Task};
///
/// let mut graph: ActivityGraph<u32> = ActivityGraph::new();
/// let start = graph.add_start();
/// let grow = graph.add_task("grow", Task::infallible(|_, size: &mut u32| *size += 1));
/// let end = graph.add_end();
/// graph.connect(start, grow).unwrap();
/// graph.connect(grow, end).unwrap();
///
/// assert!(graph.validate().is_ok());
/// assert_eq!(graph.start(), Some(start));
/// ```
pub struct ActivityGraph<A> {
    nodes: IndexMap<NodeId, Node<A>>,
    start: Option<NodeId>,
    allocator: IdAllocator,
}

impl<A> ActivityGraph<A> {
    /// Creates an empty graph with its own allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(IdAllocator::new())
    }

    /// Creates an empty graph drawing ids from `allocator`.
    #[must_use]
    pub fn with_allocator(allocator: IdAllocator) -> Self {
        Self {
            nodes: IndexMap::new(),
            start: None,
            allocator,
        }
    }

    /// Returns the graph's allocator.
    #[must_use]
    pub fn allocator(&self) -> &IdAllocator {
        &self.allocator
    }

    /// Returns the start node, if one was added.
    #[must_use]
    pub fn start(&self) -> Option<NodeId> {
        self.start
    }

    /// Designates `id` as the start node.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::NodeNotFound`] if `id` is not in the graph.
    pub fn set_start(&mut self, id: NodeId) -> Result<(), ActivityError> {
        if !self.nodes.contains_key(&id) {
            return Err(ActivityError::NodeNotFound(id));
        }
        self.start = Some(id);
        Ok(())
    }

    /// Iterates over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<A>> {
        self.nodes.values()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `true` if `id` is in the graph.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Looks up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node<A>> {
        self.nodes.get(&id)
    }

    /// Looks up a node mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<A>> {
        self.nodes.get_mut(&id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Builder API
    // ─────────────────────────────────────────────────────────────────────

    fn push(&mut self, node: Node<A>) -> NodeId {
        let id = node.id();
        if self.start.is_none() && node.node_type() == NodeType::Start {
            self.start = Some(id);
        }
        self.nodes.insert(id, node);
        id
    }

    /// Adds a start node. The first start node added becomes the graph's
    /// start.
    pub fn add_start(&mut self) -> NodeId {
        let id = self.allocator.allocate_node_id();
        self.push(Node::Start(StartNode::new(id)))
    }

    /// Adds an end node.
    pub fn add_end(&mut self) -> NodeId {
        let id = self.allocator.allocate_node_id();
        self.push(Node::End(EndNode::new(id)))
    }

    /// Adds a task node running `task`.
    pub fn add_task(&mut self, label: impl Into<String>, task: Task<A>) -> NodeId {
        let id = self.allocator.allocate_node_id();
        self.push(Node::Task(
            TaskNode::new(id).with_label(label).with_task(task),
        ))
    }

    /// Adds a condition node without branches.
    pub fn add_condition(&mut self, label: impl Into<String>) -> NodeId {
        let id = self.allocator.allocate_node_id();
        self.push(Node::Condition(ConditionNode::new(id, label)))
    }

    /// Adds a wait node without branches.
    pub fn add_wait(&mut self, label: impl Into<String>) -> NodeId {
        let id = self.allocator.allocate_node_id();
        self.push(Node::Wait(WaitNode::new(id, label)))
    }

    /// Inserts a pre-built node under its own id.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::DuplicateNode`] if the id is taken.
    pub fn insert(&mut self, node: Node<A>) -> Result<NodeId, ActivityError> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(ActivityError::DuplicateNode(id));
        }
        self.allocator.reserve(id);
        Ok(self.push(node))
    }

    /// Adds `to` as a successor of `from`, following the variant's
    /// [`add_output`](Node::add_output) semantics.
    ///
    /// # Errors
    ///
    /// - [`ActivityError::NodeNotFound`] if either node is missing.
    /// - [`ActivityError::TerminalNode`] if `from` is an end node.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), ActivityError> {
        if !self.nodes.contains_key(&to) {
            return Err(ActivityError::NodeNotFound(to));
        }
        self.nodes
            .get_mut(&from)
            .ok_or(ActivityError::NodeNotFound(from))?
            .add_output(to)
    }

    /// Adds a guarded branch `node → to` to a condition node.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::NodeNotFound`] if `to` is missing or `node`
    /// is not a condition node.
    pub fn add_branch(
        &mut self,
        node: NodeId,
        condition: Condition<A>,
        to: NodeId,
    ) -> Result<(), ActivityError> {
        if !self.nodes.contains_key(&to) {
            return Err(ActivityError::NodeNotFound(to));
        }
        match self.nodes.get_mut(&node) {
            Some(Node::Condition(n)) => {
                n.add_branch(condition, to);
                Ok(())
            }
            _ => Err(ActivityError::NodeNotFound(node)),
        }
    }

    /// Adds a branch `node → to` to a wait node, released by `condition`.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityError::NodeNotFound`] if `to` is missing or `node`
    /// is not a wait node.
    pub fn add_wait_branch(
        &mut self,
        node: NodeId,
        condition: WaitCondition,
        to: NodeId,
    ) -> Result<(), ActivityError> {
        if !self.nodes.contains_key(&to) {
            return Err(ActivityError::NodeNotFound(to));
        }
        match self.nodes.get_mut(&node) {
            Some(Node::Wait(n)) => {
                n.add_branch(condition, to);
                Ok(())
            }
            _ => Err(ActivityError::NodeNotFound(node)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Validation API
    // ─────────────────────────────────────────────────────────────────────

    /// Validates the graph structure.
    ///
    /// Checks that exactly one start node exists, that every successor id
    /// resolves within this graph, that single-successor nodes have their
    /// successor and that branching nodes have at least one branch.
    ///
    /// # Errors
    ///
    /// Returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let starts: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.node_type() == NodeType::Start)
            .map(Node::id)
            .collect();
        match starts.len() {
            0 => errors.push(ValidationError::NoStartNode),
            1 => {}
            _ => errors.push(ValidationError::MultipleStartNodes(starts)),
        }

        for node in self.nodes.values() {
            for successor in node.outputs() {
                if !self.nodes.contains_key(&successor) {
                    errors.push(ValidationError::DanglingSuccessor {
                        node: node.id(),
                        successor,
                    });
                }
            }
            match node {
                Node::Start(n) if n.output.is_none() => {
                    errors.push(ValidationError::MissingSuccessor(n.id));
                }
                Node::Task(n) if n.output.is_none() => {
                    errors.push(ValidationError::MissingSuccessor(n.id));
                }
                Node::Condition(n) if n.is_empty() => {
                    errors.push(ValidationError::EmptyBranches(n.id));
                }
                Node::Wait(n) if n.is_empty() => {
                    errors.push(ValidationError::EmptyBranches(n.id));
                }
                _ => {}
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Reports suspicious but executable structure: unset task actions and
    /// nodes unreachable from the start node.
    #[must_use]
    pub fn warnings(&self) -> Vec<ValidationWarning> {
        let mut warnings: Vec<ValidationWarning> = self
            .nodes
            .values()
            .filter_map(|node| match node {
                Node::Task(n) if n.task.is_unset() => Some(ValidationWarning::UnsetTask(n.id)),
                _ => None,
            })
            .collect();

        let reachable = self.reachable();
        warnings.extend(
            self.nodes
                .keys()
                .filter(|id| !reachable.contains(*id))
                .map(|id| ValidationWarning::Unreachable(*id)),
        );
        warnings
    }

    fn reachable(&self) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut pending: VecDeque<NodeId> = self.start.into_iter().collect();
        while let Some(id) = pending.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(&id) {
                pending.extend(node.outputs());
            }
        }
        seen
    }
}

impl<A> Default for ActivityGraph<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> core::fmt::Debug for ActivityGraph<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActivityGraph")
            .field("start", &self.start)
            .field("nodes", &self.nodes.values().collect::<Vec<_>>())
            .finish()
    }
}

/// Structural errors reported by [`ActivityGraph::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The graph has no start node.
    #[error("graph has no start node")]
    NoStartNode,
    /// The graph has more than one start node.
    #[error("graph has {} start nodes", .0.len())]
    MultipleStartNodes(Vec<NodeId>),
    /// A successor id does not resolve within the graph.
    #[error("{node} references missing successor {successor}")]
    DanglingSuccessor {
        /// The referencing node.
        node: NodeId,
        /// The missing successor.
        successor: NodeId,
    },
    /// A start or task node has no successor.
    #[error("{0} has no successor")]
    MissingSuccessor(NodeId),
    /// A condition or wait node has no branches.
    #[error("{0} has no branches")]
    EmptyBranches(NodeId),
}

/// Non-fatal findings reported by [`ActivityGraph::warnings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// A task node still has the placeholder action.
    UnsetTask(NodeId),
    /// A node cannot be reached from the start node.
    Unreachable(NodeId),
}

impl core::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ValidationWarning::UnsetTask(id) => write!(f, "task action of {id} is not set"),
            ValidationWarning::Unreachable(id) => write!(f, "{id} is unreachable from start"),
        }
    }
}
