//! Model types for cluster API responses
//!
//! Task-listing types are deliberately lenient: every field defaults, so a
//! cluster may omit or add fields without failing deserialization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Version block of the root-endpoint response
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterVersion {
    pub number: String,
    pub build_flavor: String,
    pub build_type: String,
    pub build_hash: String,
    pub build_date: String,
    pub build_snapshot: bool,
    pub lucene_version: String,
    pub minimum_wire_compatibility_version: String,
    pub minimum_index_compatibility_version: String,
}

/// Root-endpoint response, the liveness signature of a search cluster.
///
/// A healthy target answers with a string `tagline`; the client treats its
/// absence as "not a search cluster".
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterInfo {
    pub name: String,
    pub cluster_name: String,
    pub cluster_uuid: String,
    pub version: ClusterVersion,
    pub tagline: String,
}

/// Grouping mode for the task-listing API
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaskGroupBy {
    /// Group tasks under the node running them
    Nodes,
    /// Nest child tasks under their parent task
    Parents,
    /// Flat task list
    #[default]
    None,
}

impl TaskGroupBy {
    /// Wire value for the `group_by` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskGroupBy::Nodes => "nodes",
            TaskGroupBy::Parents => "parents",
            TaskGroupBy::None => "none",
        }
    }
}

impl std::fmt::Display for TaskGroupBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single task as reported by the task-listing API
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskInfo {
    pub node: String,
    pub id: i64,
    #[serde(rename = "type")]
    pub task_type: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    pub start_time_in_millis: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub running_time: Option<String>,
    pub running_time_in_nanos: i64,
    pub cancellable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<String>,
    pub headers: HashMap<String, String>,
    /// Present when grouping by parents
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaskInfo>,
}

/// Per-node task bucket, present when grouping by nodes
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeTasks {
    pub name: String,
    pub transport_address: String,
    pub host: String,
    pub ip: String,
    pub roles: Vec<String>,
    pub attributes: HashMap<String, String>,
    pub tasks: HashMap<String, TaskInfo>,
}

/// Task-listing response; the populated field depends on the grouping mode
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<HashMap<String, NodeTasks>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<HashMap<String, TaskInfo>>,
}

impl TaskListResponse {
    /// All top-level tasks regardless of the grouping mode, as
    /// `(task id, task)` pairs.
    pub fn all_tasks(&self) -> Vec<(&str, &TaskInfo)> {
        let mut tasks: Vec<(&str, &TaskInfo)> = Vec::new();

        if let Some(nodes) = &self.nodes {
            for node in nodes.values() {
                tasks.extend(node.tasks.iter().map(|(id, task)| (id.as_str(), task)));
            }
        }

        if let Some(flat) = &self.tasks {
            tasks.extend(flat.iter().map(|(id, task)| (id.as_str(), task)));
        }

        tasks.sort_by_key(|(id, _)| *id);
        tasks
    }
}
