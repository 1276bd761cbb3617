//! Component templates: the built-in catalog and node instantiation.
//!
//! Each catalog entry carries the defaults a freshly dropped node starts with.
//! Instantiation is pure construction; inserting the node into a project is
//! left to the caller.

#[cfg(test)]
#[path = "template_test.rs"]
mod template_test;

use serde::Serialize;
use serde_json::json;

use crate::camera::Point;
use crate::doc::{FaultTolerance, NodeKind, Scaling, Specifications, SystemNode, new_id};

/// Details text given to every instantiated node's scaling block.
pub const DEFAULT_SCALING_DETAILS: &str = "Horizontal scaling with auto-scaling enabled";

/// Details text given to every instantiated node's fault-tolerance block.
pub const DEFAULT_FAULT_TOLERANCE_DETAILS: &str = "Replicated with automated backups and failover";

/// A library entry that can be dropped onto the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentTemplate {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    pub description: String,
    /// Icon reference resolved by the renderer.
    pub icon: String,
    pub default_specs: Specifications,
}

fn entry(kind: NodeKind, name: &str, description: &str, icon: &str, specs: [(&str, &str); 3]) -> ComponentTemplate {
    ComponentTemplate {
        kind,
        name: name.to_owned(),
        description: description.to_owned(),
        icon: icon.to_owned(),
        default_specs: specs
            .into_iter()
            .map(|(k, v)| (k.to_owned(), json!(v)))
            .collect(),
    }
}

/// The fixed five-entry component catalog.
#[must_use]
pub fn default_templates() -> Vec<ComponentTemplate> {
    vec![
        entry(
            NodeKind::ApiGateway,
            "API Gateway",
            "Routes, authenticates and rate-limits incoming requests",
            "gateway",
            [("technology", "Kong"), ("capacity", "10k req/s"), ("latency", "< 10ms")],
        ),
        entry(
            NodeKind::Database,
            "Database",
            "Durable relational storage for core business data",
            "database",
            [("technology", "PostgreSQL"), ("capacity", "1 TB"), ("latency", "< 5ms")],
        ),
        entry(
            NodeKind::Cache,
            "Cache",
            "In-memory store for hot reads",
            "zap",
            [("technology", "Redis"), ("capacity", "16 GB"), ("latency", "< 1ms")],
        ),
        entry(
            NodeKind::Queue,
            "Message Queue",
            "Buffers asynchronous work between services",
            "inbox",
            [("technology", "RabbitMQ"), ("capacity", "50k msg/s"), ("latency", "< 20ms")],
        ),
        entry(
            NodeKind::Service,
            "Service",
            "Stateless application service",
            "server",
            [("technology", "Node.js"), ("capacity", "1k req/s"), ("latency", "< 50ms")],
        ),
    ]
}

/// Look up the catalog entry for a kind. `Custom` has none.
#[must_use]
pub fn template_for(kind: NodeKind) -> Option<ComponentTemplate> {
    default_templates().into_iter().find(|t| t.kind == kind)
}

/// Blank template used for `custom` nodes, which are not in the catalog.
#[must_use]
pub fn custom_template() -> ComponentTemplate {
    ComponentTemplate {
        kind: NodeKind::Custom,
        name: "Custom Component".to_owned(),
        description: String::new(),
        icon: "box".to_owned(),
        default_specs: Specifications::new(),
    }
}

/// Build a new node from `template` at a canvas-space drop position.
#[must_use]
pub fn instantiate(template: &ComponentTemplate, position: Point) -> SystemNode {
    SystemNode {
        id: new_id(),
        kind: template.kind,
        name: template.name.clone(),
        description: template.description.clone(),
        position,
        specifications: template.default_specs.clone(),
        scaling: Scaling {
            horizontal: true,
            vertical: false,
            auto_scaling: true,
            details: DEFAULT_SCALING_DETAILS.to_owned(),
        },
        fault_tolerance: FaultTolerance {
            replication: true,
            backup: true,
            failover: true,
            details: DEFAULT_FAULT_TOLERANCE_DETAILS.to_owned(),
        },
        connections: Vec::new(),
    }
}
