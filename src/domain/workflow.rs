//! Workflows and their versioned node/edge graphs.

use serde::{Deserialize, Serialize};

use super::primitives::string_enum;
use super::validate::{optional_text, required_text, ValidationError};

string_enum! {
    WorkflowStatus ("workflow status", default = Draft) {
        Draft => "draft",
        Active => "active",
        Archived => "archived",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: WorkflowStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// An immutable snapshot of a workflow's graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowVersion {
    pub workflow_id: String,
    pub version: i64,
    pub graph: Graph,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    /// Node type as understood by the editor, e.g. `trigger`, `action`.
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkflow {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: WorkflowStatus,
    /// Initial graph stored as version 1; defaults to an empty graph.
    #[serde(default)]
    pub graph: Option<Graph>,
}

impl NewWorkflow {
    pub fn validate(mut self) -> Result<Self, ValidationError> {
        self.name = required_text("name", &self.name)?;
        self.description = optional_text(self.description);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_json_shape() {
        let json = r#"{
            "nodes": [
                {"id": "n1", "kind": "trigger", "label": "Invoice paid", "position": {"x": 10, "y": 20}},
                {"id": "n2", "kind": "action"}
            ],
            "edges": [{"id": "e1", "source": "n1", "target": "n2"}]
        }"#;
        let graph: Graph = serde_json::from_str(json).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.node("n1").unwrap().position, Position { x: 10.0, y: 20.0 });
        assert_eq!(graph.node("n2").unwrap().data, serde_json::json!({}));
        assert_eq!(graph.edge("e1").unwrap().target, "n2");

        let back = serde_json::to_value(&graph).unwrap();
        assert!(back["edges"][0].get("sourceHandle").is_none());
    }

    #[test]
    fn test_missing_graph_fields_default_empty() {
        let graph: Graph = serde_json::from_str("{}").unwrap();
        assert!(graph.is_empty());
    }
}
