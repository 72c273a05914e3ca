//! Error types for activity graphs.

use crate::node::NodeId;

/// Boxed error carried by failing task actions.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// Errors raised while building or advancing an activity graph.
#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
    /// A successor id was requested that the node does not have.
    #[error("{node} has no successor {successor}")]
    UnknownSuccessor {
        /// The node that was asked.
        node: NodeId,
        /// The requested successor.
        successor: NodeId,
    },

    /// A single-successor node has no successor set.
    #[error("{0} has no successor")]
    NoSuccessor(NodeId),

    /// The step guard tripped: the graph kept executing without reaching a
    /// wait or end node.
    #[error(
        "graph diverged at {node}: more than {max_steps} steps without waiting (chain: {})",
        format_chain(.chain)
    )]
    GraphDivergence {
        /// Node the pointer was on when the guard tripped.
        node: NodeId,
        /// The configured step bound.
        max_steps: usize,
        /// The most recently visited nodes, oldest first.
        chain: Vec<NodeId>,
    },

    /// A task node was visited whose action was never set.
    #[error("task action of {0} is not set")]
    UnsetTask(NodeId),

    /// A task action failed.
    #[error("task {node} failed: {source}")]
    Task {
        /// The failing task node.
        node: NodeId,
        /// The action's error.
        #[source]
        source: BoxError,
    },

    /// A node id does not exist in the graph.
    #[error("{0} not found in graph")]
    NodeNotFound(NodeId),

    /// The actor was advanced before its activity was initialized.
    #[error("activity is not initialized")]
    NotInitialized,

    /// The graph has no start node.
    #[error("graph has no start node")]
    NoStartNode,

    /// No branch of a condition node matched and no default was set.
    #[error("no branch of {0} matched")]
    NoMatchingBranch(NodeId),

    /// Successors cannot be added to an end node.
    #[error("{0} is terminal and cannot have successors")]
    TerminalNode(NodeId),

    /// A node with this id already exists in the graph.
    #[error("{0} already exists in graph")]
    DuplicateNode(NodeId),
}

fn format_chain(chain: &[NodeId]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
