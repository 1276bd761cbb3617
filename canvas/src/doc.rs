//! Document model: projects, nodes, connections and version snapshots.
//!
//! This module defines the data types that describe a diagram (`Project`,
//! `SystemNode`, `NodeConnection`, `ProjectVersion`), sparse-update types for
//! incremental edits (`NodePatch`, `ConnectionPatch`), and the project-level
//! operations that keep the model's invariants: unique node ids, finite
//! positions, and node deletion that takes its connections with it.
//!
//! Data flows into this layer from storage and agent output (JSON
//! deserialization) and from the interaction engine (mutations). Agent JSON is
//! accepted leniently: missing optional fields default, a few camelCase
//! aliases are recognized, and unknown node types become `custom`.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::collections::{BTreeMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;

/// Identifier of a node within a project.
pub type NodeId = String;

/// Identifier of a connection within a project.
pub type ConnectionId = String;

/// Identifier of a project.
pub type ProjectId = String;

/// Canvas-space position of a node's top-left corner.
pub type Position = Point;

/// Open-ended per-node specification values (technology, capacity, latency, ...).
pub type Specifications = BTreeMap<String, serde_json::Value>;

/// Generate a fresh opaque identifier.
#[must_use]
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current wall-clock time in Unix epoch milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// ERRORS
// =============================================================================

/// Violations of the project model's invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(NodeId),
    #[error("duplicate connection id: {0}")]
    DuplicateConnectionId(ConnectionId),
    #[error("node {0} has a non-finite position")]
    NonFinitePosition(NodeId),
    #[error("connection from {0} to itself is not allowed")]
    SelfLoop(NodeId),
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
    #[error("connection not found: {0}")]
    ConnectionNotFound(ConnectionId),
    #[error("version not found: {0}")]
    VersionNotFound(u32),
    #[error("requirements are empty")]
    EmptyRequirements,
    #[error("a generation is already in progress")]
    AlreadyGenerating,
}

// =============================================================================
// ENUMS
// =============================================================================

/// The kind of component a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    ApiGateway,
    Database,
    Cache,
    Queue,
    Service,
    /// Anything outside the built-in catalog.
    #[default]
    Custom,
}

impl NodeKind {
    /// Every kind, catalog kinds first.
    pub const ALL: [NodeKind; 6] = [
        NodeKind::ApiGateway,
        NodeKind::Database,
        NodeKind::Cache,
        NodeKind::Queue,
        NodeKind::Service,
        NodeKind::Custom,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiGateway => "api-gateway",
            Self::Database => "database",
            Self::Cache => "cache",
            Self::Queue => "queue",
            Self::Service => "service",
            Self::Custom => "custom",
        }
    }

    /// Parse a kind name. Case, `_` vs `-`, and a bare `gateway` are tolerated;
    /// anything unrecognized maps to [`NodeKind::Custom`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "api-gateway" | "apigateway" | "gateway" => Self::ApiGateway,
            "database" | "db" => Self::Database,
            "cache" => Self::Cache,
            "queue" | "message-queue" => Self::Queue,
            "service" | "microservice" => Self::Service,
            _ => Self::Custom,
        }
    }
}

impl From<String> for NodeKind {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_owned()
    }
}

/// How a connection communicates. Descriptive only; affects rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConnectionKind {
    #[default]
    Sync,
    Async,
    Bidirectional,
}

impl ConnectionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Async => "async",
            Self::Bidirectional => "bidirectional",
        }
    }

    /// Parse a connection kind; anything unrecognized is treated as `sync`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "async" | "asynchronous" => Self::Async,
            "bidirectional" | "bi-directional" => Self::Bidirectional,
            _ => Self::Sync,
        }
    }
}

impl From<String> for ConnectionKind {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<ConnectionKind> for String {
    fn from(kind: ConnectionKind) -> Self {
        kind.as_str().to_owned()
    }
}

/// Who the generated architecture is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    Technical,
    Executive,
    Adaptive,
}

impl Audience {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Executive => "executive",
            Self::Adaptive => "adaptive",
        }
    }
}

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Generating,
    Completed,
}

// =============================================================================
// NODES AND CONNECTIONS
// =============================================================================

/// Horizontal/vertical scaling metadata for a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scaling {
    pub horizontal: bool,
    pub vertical: bool,
    #[serde(alias = "autoScaling")]
    pub auto_scaling: bool,
    pub details: String,
}

/// Redundancy metadata for a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultTolerance {
    pub replication: bool,
    pub backup: bool,
    pub failover: bool,
    pub details: String,
}

/// A component placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemNode {
    /// Assigned at creation and never changed.
    #[serde(default = "new_id")]
    pub id: NodeId,
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Top-left corner of the node box in canvas coordinates.
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub specifications: Specifications,
    #[serde(default)]
    pub scaling: Scaling,
    #[serde(default, alias = "faultTolerance")]
    pub fault_tolerance: FaultTolerance,
    /// Ids of related connections. Advisory only; `Project::connections` is authoritative.
    #[serde(default)]
    pub connections: Vec<ConnectionId>,
}

impl SystemNode {
    /// A specification value as a string, if present and a string.
    #[must_use]
    pub fn spec_str(&self, key: &str) -> Option<&str> {
        self.specifications
            .get(key)
            .and_then(serde_json::Value::as_str)
    }

    fn has_finite_position(&self) -> bool {
        self.position.x.is_finite() && self.position.y.is_finite()
    }
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConnection {
    #[serde(default = "new_id")]
    pub id: ConnectionId,
    #[serde(alias = "from")]
    pub source: NodeId,
    #[serde(alias = "to")]
    pub target: NodeId,
    #[serde(rename = "type", default)]
    pub kind: ConnectionKind,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub description: String,
}

impl NodeConnection {
    /// Whether `node_id` is either endpoint of this connection.
    #[must_use]
    pub fn involves(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Immutable copy of a project's diagram at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectVersion {
    pub id: String,
    /// Monotonic per-project number starting at 1.
    pub version: u32,
    pub timestamp: i64,
    pub nodes: Vec<SystemNode>,
    pub connections: Vec<NodeConnection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_name: Option<String>,
}

/// Nodes and connections without the surrounding project, as produced by the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagramPayload {
    #[serde(default)]
    pub nodes: Vec<SystemNode>,
    #[serde(default)]
    pub connections: Vec<NodeConnection>,
}

// =============================================================================
// PATCHES
// =============================================================================

/// Sparse update for a node. Only present fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    /// Specification keys to merge or remove (null values delete keys).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling: Option<Scaling>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_tolerance: Option<FaultTolerance>,
}

/// Sparse update for a connection. Endpoints are not editable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ConnectionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Label given to connections drawn in connect mode.
pub const DEFAULT_CONNECTION_LABEL: &str = "API Call";

/// Protocol given to connections drawn in connect mode.
pub const DEFAULT_CONNECTION_PROTOCOL: &str = "HTTP";

// =============================================================================
// PROJECT
// =============================================================================

/// The unit of persistence: one diagram plus its metadata and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    /// Free-text requirements fed to the agent.
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub audience: Audience,
    #[serde(default)]
    pub status: ProjectStatus,
    /// Draw order; later nodes render on top.
    #[serde(default)]
    pub nodes: Vec<SystemNode>,
    #[serde(default)]
    pub connections: Vec<NodeConnection>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub versions: Vec<ProjectVersion>,
}

impl Project {
    /// Create an empty draft project.
    #[must_use]
    pub fn new(name: impl Into<String>, requirements: impl Into<String>, audience: Audience) -> Self {
        let now = now_ms();
        Self {
            id: new_id(),
            name: name.into(),
            requirements: requirements.into(),
            audience,
            status: ProjectStatus::Draft,
            nodes: Vec::new(),
            connections: Vec::new(),
            created_at: now,
            updated_at: now,
            versions: Vec::new(),
        }
    }

    // --- Lookups ---

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&SystemNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut SystemNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    #[must_use]
    pub fn connection(&self, id: &str) -> Option<&NodeConnection> {
        self.connections.iter().find(|c| c.id == id)
    }

    /// Whether both endpoints of `conn` exist in this project.
    #[must_use]
    pub fn is_renderable(&self, conn: &NodeConnection) -> bool {
        self.node(&conn.source).is_some() && self.node(&conn.target).is_some()
    }

    /// Connections whose source or target is missing. They are kept, just not drawn.
    #[must_use]
    pub fn dangling_connections(&self) -> Vec<&NodeConnection> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.connections
            .iter()
            .filter(|c| !ids.contains(c.source.as_str()) || !ids.contains(c.target.as_str()))
            .collect()
    }

    /// Check the node invariants: unique ids and finite positions.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) {
                return Err(ModelError::DuplicateNodeId(node.id.clone()));
            }
            if !node.has_finite_position() {
                return Err(ModelError::NonFinitePosition(node.id.clone()));
            }
        }
        Ok(())
    }

    // --- Node edits ---

    /// Append a node on top of the z-order.
    ///
    /// # Errors
    ///
    /// Fails if the id is already taken or the position is not finite.
    pub fn add_node(&mut self, node: SystemNode) -> Result<(), ModelError> {
        if self.node(&node.id).is_some() {
            return Err(ModelError::DuplicateNodeId(node.id));
        }
        if !node.has_finite_position() {
            return Err(ModelError::NonFinitePosition(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Apply a sparse update to a node.
    ///
    /// # Errors
    ///
    /// Fails if the node is missing or the new position is not finite.
    pub fn update_node(&mut self, id: &str, patch: &NodePatch) -> Result<(), ModelError> {
        if let Some(pos) = patch.position {
            if !pos.x.is_finite() || !pos.y.is_finite() {
                return Err(ModelError::NonFinitePosition(id.to_owned()));
            }
        }
        let node = self
            .node_mut(id)
            .ok_or_else(|| ModelError::NodeNotFound(id.to_owned()))?;
        if let Some(name) = &patch.name {
            node.name.clone_from(name);
        }
        if let Some(description) = &patch.description {
            node.description.clone_from(description);
        }
        if let Some(kind) = patch.kind {
            node.kind = kind;
        }
        if let Some(pos) = patch.position {
            node.position = pos;
        }
        if let Some(specs) = &patch.specifications {
            for (k, v) in specs {
                if v.is_null() {
                    node.specifications.remove(k);
                } else {
                    node.specifications.insert(k.clone(), v.clone());
                }
            }
        }
        if let Some(scaling) = &patch.scaling {
            node.scaling = scaling.clone();
        }
        if let Some(ft) = &patch.fault_tolerance {
            node.fault_tolerance = ft.clone();
        }
        Ok(())
    }

    /// Move a node to a new canvas position.
    ///
    /// # Errors
    ///
    /// Fails if the node is missing or the position is not finite.
    pub fn move_node(&mut self, id: &str, position: Point) -> Result<(), ModelError> {
        self.update_node(id, &NodePatch { position: Some(position), ..Default::default() })
    }

    /// Remove a node together with every connection touching it.
    ///
    /// Returns the ids of the removed connections. Either everything is
    /// removed or, when the node does not exist, nothing is.
    ///
    /// # Errors
    ///
    /// Fails if the node does not exist.
    pub fn remove_node_cascade(&mut self, id: &str) -> Result<Vec<ConnectionId>, ModelError> {
        let Some(index) = self.nodes.iter().position(|n| n.id == id) else {
            return Err(ModelError::NodeNotFound(id.to_owned()));
        };
        let removed: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|c| c.involves(id))
            .map(|c| c.id.clone())
            .collect();

        self.nodes.remove(index);
        self.connections.retain(|c| !c.involves(id));
        for node in &mut self.nodes {
            node.connections.retain(|cid| !removed.contains(cid));
        }
        Ok(removed)
    }

    // --- Connection edits ---

    /// Create a directed connection with the default label and protocol.
    ///
    /// # Errors
    ///
    /// Fails on a self-loop or when either endpoint is missing.
    pub fn add_connection(&mut self, source: &str, target: &str) -> Result<NodeConnection, ModelError> {
        if source == target {
            return Err(ModelError::SelfLoop(source.to_owned()));
        }
        for endpoint in [source, target] {
            if self.node(endpoint).is_none() {
                return Err(ModelError::NodeNotFound(endpoint.to_owned()));
            }
        }
        let conn = NodeConnection {
            id: new_id(),
            source: source.to_owned(),
            target: target.to_owned(),
            kind: ConnectionKind::Sync,
            label: DEFAULT_CONNECTION_LABEL.to_owned(),
            protocol: DEFAULT_CONNECTION_PROTOCOL.to_owned(),
            description: String::new(),
        };
        self.insert_connection(conn.clone())?;
        Ok(conn)
    }

    /// Insert a fully-formed connection, linking it into both endpoints' advisory lists.
    ///
    /// # Errors
    ///
    /// Fails on a self-loop or a duplicate connection id.
    pub fn insert_connection(&mut self, conn: NodeConnection) -> Result<(), ModelError> {
        if conn.source == conn.target {
            return Err(ModelError::SelfLoop(conn.source));
        }
        if self.connection(&conn.id).is_some() {
            return Err(ModelError::DuplicateConnectionId(conn.id));
        }
        for node in &mut self.nodes {
            if conn.involves(&node.id) && !node.connections.contains(&conn.id) {
                node.connections.push(conn.id.clone());
            }
        }
        self.connections.push(conn);
        Ok(())
    }

    /// Apply a sparse update to a connection.
    ///
    /// # Errors
    ///
    /// Fails if the connection does not exist.
    pub fn update_connection(&mut self, id: &str, patch: &ConnectionPatch) -> Result<(), ModelError> {
        let conn = self
            .connections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ModelError::ConnectionNotFound(id.to_owned()))?;
        if let Some(kind) = patch.kind {
            conn.kind = kind;
        }
        if let Some(label) = &patch.label {
            conn.label.clone_from(label);
        }
        if let Some(protocol) = &patch.protocol {
            conn.protocol.clone_from(protocol);
        }
        if let Some(description) = &patch.description {
            conn.description.clone_from(description);
        }
        Ok(())
    }

    /// Remove a single connection.
    ///
    /// # Errors
    ///
    /// Fails if the connection does not exist.
    pub fn remove_connection(&mut self, id: &str) -> Result<NodeConnection, ModelError> {
        let Some(index) = self.connections.iter().position(|c| c.id == id) else {
            return Err(ModelError::ConnectionNotFound(id.to_owned()));
        };
        let conn = self.connections.remove(index);
        for node in &mut self.nodes {
            node.connections.retain(|cid| cid != id);
        }
        Ok(conn)
    }

    // --- Versions ---

    /// Capture the current nodes and connections as the next version.
    pub fn snapshot(&mut self, snapshot_name: Option<String>) -> &ProjectVersion {
        let next = self
            .versions
            .iter()
            .map(|v| v.version)
            .max()
            .unwrap_or(0)
            + 1;
        self.versions.push(ProjectVersion {
            id: new_id(),
            version: next,
            timestamp: now_ms(),
            nodes: self.nodes.clone(),
            connections: self.connections.clone(),
            snapshot_name,
        });
        &self.versions[self.versions.len() - 1]
    }

    #[must_use]
    pub fn version(&self, version: u32) -> Option<&ProjectVersion> {
        self.versions.iter().find(|v| v.version == version)
    }

    /// Replace the live diagram with a copy of a stored version.
    ///
    /// # Errors
    ///
    /// Fails if no version with that number exists.
    pub fn restore_version(&mut self, version: u32) -> Result<(), ModelError> {
        let snapshot = self
            .version(version)
            .ok_or(ModelError::VersionNotFound(version))?;
        let nodes = snapshot.nodes.clone();
        let connections = snapshot.connections.clone();
        self.nodes = nodes;
        self.connections = connections;
        Ok(())
    }

    // --- Generation lifecycle ---

    /// Enter `generating`, returning the status to restore if generation fails.
    ///
    /// # Errors
    ///
    /// Fails when the requirements are blank or a generation is already running.
    pub fn begin_generation(&mut self) -> Result<ProjectStatus, ModelError> {
        if self.requirements.trim().is_empty() {
            return Err(ModelError::EmptyRequirements);
        }
        if self.status == ProjectStatus::Generating {
            return Err(ModelError::AlreadyGenerating);
        }
        let previous = self.status;
        self.status = ProjectStatus::Generating;
        Ok(previous)
    }

    /// Replace the diagram with generated output and mark the project completed.
    pub fn complete_generation(&mut self, payload: DiagramPayload) {
        self.nodes = payload.nodes;
        self.connections = payload.connections;
        self.status = ProjectStatus::Completed;
    }

    /// Leave `generating` without touching the diagram.
    pub fn abort_generation(&mut self, previous: ProjectStatus) {
        self.status = previous;
    }
}
