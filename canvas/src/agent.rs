//! Agent Service wire types and the response normalizer.
//!
//! The agent proposes a whole diagram from free-text requirements. Its output
//! is heterogeneous: sometimes a structured `{nodes, connections}` object,
//! sometimes prose with JSON embedded in it. [`normalize`] turns any response
//! into a [`DiagramPayload`] by trying a fixed list of pure parse attempts in
//! order and, when all of them come up empty, synthesizing a reference
//! diagram. It never fails.

#[cfg(test)]
#[path = "agent_test.rs"]
mod agent_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::camera::Point;
use crate::doc::{Audience, ConnectionKind, DiagramPayload, NodeConnection, NodeKind, SystemNode, new_id};
use crate::template::{custom_template, instantiate, template_for};

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Body POSTed to the agent's chat endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub message: String,
    #[serde(rename = "agentId")]
    pub agent_id: String,
}

/// Envelope returned by the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// `"success"` or `"error"`.
    pub status: String,
    #[serde(default)]
    pub result: AgentResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AgentMetadata>,
}

impl AgentResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    /// Free-text answer. May embed the diagram as JSON.
    #[serde(default)]
    pub response: String,
    /// Structured diagram, kept raw so a malformed block never rejects the envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
}

// =============================================================================
// PROMPT
// =============================================================================

/// Message text asking the agent for a diagram.
#[must_use]
pub fn build_generation_prompt(requirements: &str, audience: Audience) -> String {
    let tone = match audience {
        Audience::Technical => "Include concrete technologies, capacities and protocols.",
        Audience::Executive => "Keep names and descriptions short and focused on business capabilities.",
        Audience::Adaptive => "Balance implementation detail with business context.",
    };
    format!(
        "Design a software architecture for the following requirements.\n\n\
         Requirements:\n{}\n\n\
         Audience: {}. {tone}\n\n\
         Respond with a JSON object {{\"nodes\": [...], \"connections\": [...]}}. \
         Each node has id, type (one of api-gateway, database, cache, queue, service, custom), \
         name, description, position {{\"x\", \"y\"}}, specifications, scaling and fault_tolerance. \
         Each connection has id, source, target, type (sync, async or bidirectional), label and protocol.",
        requirements.trim(),
        audience.as_str(),
    )
}

// =============================================================================
// NORMALIZER
// =============================================================================

/// Resolve any agent response into a diagram.
///
/// Attempts run in order and the first one yielding a non-empty node list
/// wins: structured `result.data`, a fenced code block in `result.response`,
/// then the outermost brace span of `result.response`. Otherwise the
/// reference diagram from [`fallback_diagram`] is returned.
#[must_use]
pub fn normalize(response: &AgentResponse) -> DiagramPayload {
    let attempts: [fn(&AgentResponse) -> Option<DiagramPayload>; 3] =
        [from_structured_data, from_fenced_block, from_brace_span];
    attempts
        .iter()
        .find_map(|attempt| attempt(response))
        .unwrap_or_else(fallback_diagram)
}

/// `result.data` when it holds a non-empty `nodes` array.
#[must_use]
pub fn from_structured_data(response: &AgentResponse) -> Option<DiagramPayload> {
    payload_from_value(response.result.data.as_ref()?)
}

/// The first fenced code block in the response text that parses as a payload.
///
/// Blocks tagged `json` or left untagged are tried before blocks in other
/// languages.
#[must_use]
pub fn from_fenced_block(response: &AgentResponse) -> Option<DiagramPayload> {
    let (preferred, others): (Vec<Fence<'_>>, Vec<Fence<'_>>) = fenced_blocks(&response.result.response)
        .into_iter()
        .partition(|fence| fence.tag.is_empty() || fence.tag.eq_ignore_ascii_case("json"));
    preferred
        .iter()
        .chain(&others)
        .find_map(|fence| payload_from_str(fence.body))
}

/// The span from the first `{` to the last `}` of the response text.
#[must_use]
pub fn from_brace_span(response: &AgentResponse) -> Option<DiagramPayload> {
    let text = &response.result.response;
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    payload_from_str(&text[start..=end])
}

fn payload_from_str(raw: &str) -> Option<DiagramPayload> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => payload_from_value(&value),
        Err(_) => None,
    }
}

/// Read `nodes` and `connections` independently.
///
/// The node list must decode as a whole and be non-empty. A missing or null
/// `connections` is empty, and single connections that do not decode are
/// dropped.
fn payload_from_value(value: &Value) -> Option<DiagramPayload> {
    let nodes = match serde_json::from_value::<Vec<SystemNode>>(value.get("nodes")?.clone()) {
        Ok(nodes) if !nodes.is_empty() => nodes,
        _ => return None,
    };
    let connections = value
        .get("connections")
        .and_then(Value::as_array)
        .map(|raw| {
            raw.iter()
                .filter_map(|conn| match serde_json::from_value::<NodeConnection>(conn.clone()) {
                    Ok(conn) => Some(conn),
                    Err(_) => None,
                })
                .collect()
        })
        .unwrap_or_default();
    Some(DiagramPayload { nodes, connections })
}

/// One ```` ``` ```` block: its info string and trimmed body.
struct Fence<'a> {
    tag: &'a str,
    body: &'a str,
}

/// Every closed fenced block in `text`, in order.
fn fenced_blocks(text: &str) -> Vec<Fence<'_>> {
    let mut fences = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let after = &rest[open + 3..];
        // The info string runs to the end of its line, or up to the first
        // non-letter on a single-line fence.
        let (tag, body_start) = match after.find('\n') {
            Some(nl) if after[..nl].trim().chars().all(char::is_alphanumeric) => (after[..nl].trim(), nl + 1),
            _ => {
                let len = after.len() - after.trim_start_matches(char::is_alphabetic).len();
                (&after[..len], len)
            }
        };
        let body = &after[body_start..];
        let Some(close) = body.find("```") else {
            break;
        };
        fences.push(Fence { tag, body: body[..close].trim() });
        rest = &body[close + 3..];
    }
    fences
}

// =============================================================================
// FALLBACK
// =============================================================================

fn fallback_node(kind: NodeKind, name: &str, description: &str, x: f64, y: f64) -> SystemNode {
    let template = template_for(kind).unwrap_or_else(custom_template);
    let mut node = instantiate(&template, Point::new(x, y));
    node.kind = kind;
    node.name = name.to_owned();
    node.description = description.to_owned();
    node
}

fn fallback_edge(source: &SystemNode, target: &SystemNode, label: &str, protocol: &str) -> NodeConnection {
    NodeConnection {
        id: new_id(),
        source: source.id.clone(),
        target: target.id.clone(),
        kind: ConnectionKind::Sync,
        label: label.to_owned(),
        protocol: protocol.to_owned(),
        description: String::new(),
    }
}

/// Four-node reference diagram: gateway to service, service to database and cache.
///
/// Ids are fresh on every call. Connections are built after the nodes, so
/// every endpoint names a node in the same payload.
#[must_use]
pub fn fallback_diagram() -> DiagramPayload {
    let mut nodes = vec![
        fallback_node(NodeKind::ApiGateway, "API Gateway", "Entry point for client requests", 100.0, 200.0),
        fallback_node(NodeKind::Service, "Application Service", "Core business logic", 400.0, 200.0),
        fallback_node(NodeKind::Database, "Primary Database", "Persistent data storage", 700.0, 100.0),
        fallback_node(NodeKind::Cache, "Cache Layer", "Caches frequently read data", 700.0, 300.0),
    ];
    let connections = vec![
        fallback_edge(&nodes[0], &nodes[1], "Routes requests", "HTTPS"),
        fallback_edge(&nodes[1], &nodes[2], "Reads/Writes", "SQL"),
        fallback_edge(&nodes[1], &nodes[3], "Caches data", "Redis"),
    ];
    for node in &mut nodes {
        node.connections = connections
            .iter()
            .filter(|c| c.involves(&node.id))
            .map(|c| c.id.clone())
            .collect();
    }
    DiagramPayload { nodes, connections }
}
