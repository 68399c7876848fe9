//! In-memory workflow graph builder.
//!
//! `GraphBuilder` holds a working copy of a [`Graph`] and applies the editor's
//! mutations to it. Nothing here executes or traverses the graph.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::primitives::new_id;
use crate::domain::{Edge, Graph, Node, Position};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node {0} already exists")]
    DuplicateNode(String),
    #[error("edge {0} already exists")]
    DuplicateEdge(String),
    #[error("node {0} not found")]
    NodeNotFound(String),
    #[error("edge {0} not found")]
    EdgeNotFound(String),
    #[error("edge {edge} references missing node {node}")]
    DanglingEdge { edge: String, node: String },
}

/// A failed op within a batch; `index` is its position in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("op {index}: {source}")]
pub struct BatchError {
    pub index: usize,
    pub source: GraphError,
}

/// One builder mutation in serialized form, e.g.
/// `{"op": "moveNode", "id": "n1", "position": {"x": 0, "y": 40}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum GraphOp {
    AddNode {
        node: Node,
    },
    UpdateNode {
        id: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        data: Option<Value>,
    },
    MoveNode {
        id: String,
        position: Position,
    },
    RemoveNode {
        id: String,
    },
    AddEdge {
        edge: Edge,
    },
    RemoveEdge {
        id: String,
    },
    Clear,
}

#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_graph(graph: Graph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Add a node. A blank id is replaced with a fresh one; the id actually
    /// used is returned.
    pub fn add_node(&mut self, mut node: Node) -> Result<String, GraphError> {
        if node.id.trim().is_empty() {
            node.id = new_id();
        }
        if self.graph.node(&node.id).is_some() {
            return Err(GraphError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        self.graph.nodes.push(node);
        Ok(id)
    }

    /// Replace the label and/or merge `data` into the node's data.
    ///
    /// Object data is merged key by key; any other JSON value replaces the
    /// existing data outright.
    pub fn update_node(
        &mut self,
        id: &str,
        label: Option<String>,
        data: Option<Value>,
    ) -> Result<(), GraphError> {
        let node = self.node_mut(id)?;
        if let Some(label) = label {
            node.label = label;
        }
        if let Some(data) = data {
            match (&mut node.data, data) {
                (Value::Object(current), Value::Object(patch)) => {
                    for (key, value) in patch {
                        current.insert(key, value);
                    }
                }
                (slot, other) => *slot = other,
            }
        }
        Ok(())
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), GraphError> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    /// Remove a node together with every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Result<Node, GraphError> {
        let index = self
            .graph
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;
        let node = self.graph.nodes.remove(index);
        self.graph
            .edges
            .retain(|e| e.source != node.id && e.target != node.id);
        Ok(node)
    }

    /// Connect two existing nodes. A blank id is replaced with a fresh one.
    pub fn add_edge(&mut self, mut edge: Edge) -> Result<String, GraphError> {
        if edge.id.trim().is_empty() {
            edge.id = new_id();
        }
        if self.graph.edge(&edge.id).is_some() {
            return Err(GraphError::DuplicateEdge(edge.id));
        }
        for endpoint in [&edge.source, &edge.target] {
            if self.graph.node(endpoint).is_none() {
                return Err(GraphError::DanglingEdge {
                    edge: edge.id.clone(),
                    node: endpoint.clone(),
                });
            }
        }
        let id = edge.id.clone();
        self.graph.edges.push(edge);
        Ok(id)
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<Edge, GraphError> {
        let index = self
            .graph
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.to_string()))?;
        Ok(self.graph.edges.remove(index))
    }

    pub fn clear(&mut self) {
        self.graph = Graph::default();
    }

    pub fn apply(&mut self, op: GraphOp) -> Result<(), GraphError> {
        match op {
            GraphOp::AddNode { node } => self.add_node(node).map(|_| ()),
            GraphOp::UpdateNode { id, label, data } => self.update_node(&id, label, data),
            GraphOp::MoveNode { id, position } => self.move_node(&id, position),
            GraphOp::RemoveNode { id } => self.remove_node(&id).map(|_| ()),
            GraphOp::AddEdge { edge } => self.add_edge(edge).map(|_| ()),
            GraphOp::RemoveEdge { id } => self.remove_edge(&id).map(|_| ()),
            GraphOp::Clear => {
                self.clear();
                Ok(())
            }
        }
    }

    /// Apply a batch of ops. Either every op succeeds or the graph is left
    /// exactly as it was.
    pub fn apply_all(&mut self, ops: Vec<GraphOp>) -> Result<(), BatchError> {
        let mut working = self.clone();
        for (index, op) in ops.into_iter().enumerate() {
            working
                .apply(op)
                .map_err(|source| BatchError { index, source })?;
        }
        *self = working;
        Ok(())
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node, GraphError> {
        self.graph
            .nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }
}
