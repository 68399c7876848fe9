use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::extract::JsonBody;
use crate::api::{or_empty, AppState};
use crate::domain::{Graph, NewWorkflow, Workflow, WorkflowVersion};
use crate::engine::{GraphBuilder, GraphOp};
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct CreatedWorkflow {
    pub workflow: Workflow,
    pub version: WorkflowVersion,
}

#[derive(Debug, Serialize)]
pub struct WorkflowDetail {
    #[serde(flatten)]
    pub workflow: Workflow,
    /// `None` only if the workflow has no stored version.
    pub latest: Option<WorkflowVersion>,
}

#[derive(Debug, Deserialize)]
pub struct GraphOpsRequest {
    pub ops: Vec<GraphOp>,
}

/// Replay a submitted graph through the builder so duplicate ids and
/// dangling edges are rejected before anything is stored.
fn checked_graph(graph: Graph) -> Result<Graph, AppError> {
    let ops = graph
        .nodes
        .into_iter()
        .map(|node| GraphOp::AddNode { node })
        .chain(graph.edges.into_iter().map(|edge| GraphOp::AddEdge { edge }))
        .collect();

    let mut builder = GraphBuilder::new();
    builder
        .apply_all(ops)
        .map_err(|e| AppError::BadRequest(format!("invalid graph: {e}")))?;
    Ok(builder.into_graph())
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("workflow {id}"))
}

pub async fn list_workflows(State(state): State<AppState>) -> Json<Vec<Workflow>> {
    Json(or_empty(state.repo.list_workflows().await, "workflows"))
}

pub async fn create_workflow(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewWorkflow>,
) -> Result<(StatusCode, Json<CreatedWorkflow>), AppError> {
    let mut input = input.validate()?;
    input.graph = input.graph.map(checked_graph).transpose()?;

    let (workflow, version) = state
        .repo
        .insert_workflow(input)
        .await
        .map_err(AppError::write_failed)?;

    tracing::info!(id = %workflow.id, name = %workflow.name, "Workflow created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedWorkflow { workflow, version }),
    ))
}

pub async fn get_workflow(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<WorkflowDetail>, AppError> {
    let workflow = state
        .repo
        .get_workflow(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    let latest = state.repo.latest_workflow_version(&id).await?;

    Ok(Json(WorkflowDetail { workflow, latest }))
}

pub async fn list_versions(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<WorkflowVersion>>, AppError> {
    state
        .repo
        .get_workflow(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;

    Ok(Json(or_empty(
        state.repo.list_workflow_versions(&id).await,
        "workflow versions",
    )))
}

/// Store a complete graph as the workflow's next version.
pub async fn create_version(
    Path(id): Path<String>,
    State(state): State<AppState>,
    JsonBody(graph): JsonBody<Graph>,
) -> Result<(StatusCode, Json<WorkflowVersion>), AppError> {
    let graph = checked_graph(graph)?;
    save_version(&state, &id, graph).await
}

/// Apply builder ops to the latest graph and store the result as the next
/// version. A failing op rejects the whole batch.
pub async fn apply_graph_ops(
    Path(id): Path<String>,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<GraphOpsRequest>,
) -> Result<(StatusCode, Json<WorkflowVersion>), AppError> {
    let latest = state.repo.latest_workflow_version(&id).await?;
    let graph = match latest {
        Some(version) => version.graph,
        None => {
            state
                .repo
                .get_workflow(&id)
                .await?
                .ok_or_else(|| not_found(&id))?;
            Graph::default()
        }
    };

    let op_count = request.ops.len();
    let mut builder = GraphBuilder::from_graph(graph);
    builder
        .apply_all(request.ops)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    tracing::debug!(workflow = %id, ops = op_count, "Applied graph ops");
    save_version(&state, &id, builder.into_graph()).await
}

async fn save_version(
    state: &AppState,
    id: &str,
    graph: Graph,
) -> Result<(StatusCode, Json<WorkflowVersion>), AppError> {
    let version = match state.repo.insert_workflow_version(id, graph).await {
        Ok(version) => version,
        Err(sqlx::Error::RowNotFound) => return Err(not_found(id)),
        Err(e) => return Err(AppError::write_failed(e)),
    };

    tracing::info!(workflow = %id, version = version.version, "Workflow version saved");
    Ok((StatusCode::CREATED, Json(version)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Edge, Node, Position};

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            kind: "action".to_string(),
            label: String::new(),
            position: Position::default(),
            data: serde_json::json!({}),
        }
    }

    fn edge(id: &str, source: &str, target: &str) -> Edge {
        Edge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            source_handle: None,
            target_handle: None,
            label: None,
        }
    }

    #[test]
    fn test_checked_graph_accepts_consistent_graph() {
        let graph = Graph {
            nodes: vec![node("a"), node("b")],
            edges: vec![edge("e1", "a", "b")],
        };
        assert_eq!(checked_graph(graph.clone()).unwrap(), graph);
    }

    #[test]
    fn test_checked_graph_rejects_dangling_edge() {
        let graph = Graph {
            nodes: vec![node("a")],
            edges: vec![edge("e1", "a", "ghost")],
        };
        match checked_graph(graph) {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("ghost"), "{msg}"),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_checked_graph_rejects_duplicate_nodes() {
        let graph = Graph {
            nodes: vec![node("a"), node("a")],
            edges: vec![],
        };
        assert!(matches!(checked_graph(graph), Err(AppError::BadRequest(_))));
    }
}
