//! Persisted graph topology shape.
//!
//! Import/export lives outside the layout core, but whatever produces the
//! entities has to agree on this shape and on the registration-boundary rules
//! (no self-loops, no duplicate pairs, no dangling endpoints).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ConstraintEdge, EntityId, GraphNode};

/// Errors raised while reading a snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// JSON could not be parsed into the snapshot shape.
    #[error("invalid snapshot json: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two nodes share an identifier.
    #[error("duplicate node id {0}")]
    DuplicateNode(EntityId),
}

/// Nodes and edges as exchanged with the persistence collaborator.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// All nodes.
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    /// All constraint edges.
    #[serde(default)]
    pub edges: Vec<ConstraintEdge>,
}

impl GraphSnapshot {
    /// Parse and sanitize a snapshot.
    pub fn from_json_str(json: &str) -> Result<Self, SnapshotError> {
        let mut snapshot: GraphSnapshot = serde_json::from_str(json)?;
        snapshot.sanitize()?;
        Ok(snapshot)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Enforce node invariants and drop edges the layout must never see.
    ///
    /// Returns the number of edges that were dropped.
    pub fn sanitize(&mut self) -> Result<usize, SnapshotError> {
        let mut ids = HashSet::with_capacity(self.nodes.len());
        for node in &mut self.nodes {
            if !ids.insert(node.id) {
                return Err(SnapshotError::DuplicateNode(node.id));
            }
            node.sanitize();
        }

        let before = self.edges.len();
        let mut pairs = HashSet::with_capacity(self.edges.len());
        let mut edge_ids = HashSet::with_capacity(self.edges.len());
        self.edges.retain(|edge| {
            if edge.is_self_loop() {
                tracing::warn!("dropping self-loop edge {} on {}", edge.id, edge.source);
                return false;
            }
            if !ids.contains(&edge.source) || !ids.contains(&edge.target) {
                tracing::warn!(
                    "dropping edge {} with missing endpoint ({} -> {})",
                    edge.id,
                    edge.source,
                    edge.target
                );
                return false;
            }
            if !edge_ids.insert(edge.id) || !pairs.insert(edge.endpoint_key()) {
                tracing::warn!("dropping duplicate edge {}", edge.id);
                return false;
            }
            true
        });

        Ok(before - self.edges.len())
    }

    /// Look up a node by id.
    pub fn node(&self, id: EntityId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
