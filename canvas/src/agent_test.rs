use serde_json::json;

use super::*;

fn with_text(text: &str) -> AgentResponse {
    AgentResponse {
        status: "success".into(),
        result: AgentResult { response: text.into(), ..Default::default() },
        metadata: None,
    }
}

fn with_data(data: serde_json::Value) -> AgentResponse {
    AgentResponse {
        status: "success".into(),
        result: AgentResult { response: "Here is your design.".into(), data: Some(data), suggestions: Vec::new() },
        metadata: None,
    }
}

fn assert_is_fallback(payload: &DiagramPayload) {
    assert_eq!(payload.nodes.len(), 4);
    assert_eq!(payload.connections.len(), 3);
    for conn in &payload.connections {
        assert!(payload.nodes.iter().any(|n| n.id == conn.source), "dangling source {}", conn.source);
        assert!(payload.nodes.iter().any(|n| n.id == conn.target), "dangling target {}", conn.target);
    }
}

// =============================================================
// Wire format
// =============================================================

#[test]
fn request_uses_camel_case_agent_id() {
    let req = AgentRequest { message: "hi".into(), agent_id: "architecture-designer".into() };
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value, json!({ "message": "hi", "agentId": "architecture-designer" }));
}

#[test]
fn response_parses_full_envelope() {
    let raw = json!({
        "status": "success",
        "result": {
            "response": "ok",
            "data": { "nodes": [], "connections": [] },
            "suggestions": ["add a CDN"]
        },
        "metadata": { "agent_name": "designer", "timestamp": "2024-01-01T00:00:00Z" }
    });
    let resp: AgentResponse = serde_json::from_value(raw).unwrap();
    assert!(resp.is_success());
    assert_eq!(resp.result.suggestions, vec!["add a CDN".to_owned()]);
    assert_eq!(resp.metadata.unwrap().agent_name.as_deref(), Some("designer"));
}

#[test]
fn error_envelope_without_result_parses() {
    let resp: AgentResponse = serde_json::from_value(json!({ "status": "error" })).unwrap();
    assert!(!resp.is_success());
    assert!(resp.result.response.is_empty());
}

// =============================================================
// Structured data
// =============================================================

#[test]
fn structured_nodes_are_used_verbatim() {
    let resp = with_data(json!({
        "nodes": [
            { "id": "n1", "type": "service", "name": "Orders", "position": { "x": 10.0, "y": 20.0 } },
            { "id": "n2", "type": "database", "name": "Orders DB", "position": { "x": 300.0, "y": 20.0 } }
        ],
        "connections": [{ "id": "c1", "source": "n1", "target": "n2", "type": "sync" }]
    }));
    let payload = normalize(&resp);
    assert_eq!(payload.nodes.len(), 2);
    assert_eq!(payload.nodes[0].id, "n1");
    assert_eq!(payload.nodes[0].name, "Orders");
    assert_eq!(payload.nodes[1].kind, NodeKind::Database);
    assert_eq!(payload.nodes[1].position, Point::new(300.0, 20.0));
    assert_eq!(payload.connections.len(), 1);
}

#[test]
fn structured_data_accepts_camel_case_and_unknown_types() {
    let resp = with_data(json!({
        "nodes": [{
            "id": "n1",
            "type": "load-balancer",
            "name": "LB",
            "faultTolerance": { "replication": true },
            "scaling": { "autoScaling": true }
        }]
    }));
    let payload = from_structured_data(&resp).unwrap();
    let node = &payload.nodes[0];
    assert_eq!(node.kind, NodeKind::Custom);
    assert!(node.fault_tolerance.replication);
    assert!(node.scaling.auto_scaling);
}

#[test]
fn empty_structured_nodes_fall_through_to_text() {
    let mut resp = with_data(json!({ "nodes": [], "connections": [] }));
    resp.result.response = r#"{"nodes":[{"id":"t1","name":"From text"}]}"#.into();
    let payload = normalize(&resp);
    assert_eq!(payload.nodes.len(), 1);
    assert_eq!(payload.nodes[0].id, "t1");
}

#[test]
fn malformed_structured_data_falls_through() {
    let resp = with_data(json!({ "nodes": "not a list" }));
    assert!(from_structured_data(&resp).is_none());
    assert_is_fallback(&normalize(&resp));
}

#[test]
fn null_connections_keep_structured_nodes() {
    let resp = with_data(json!({ "nodes": [{"id": "a"}, {"id": "b"}], "connections": null }));
    let payload = normalize(&resp);
    assert_eq!(payload.nodes.len(), 2);
    assert_eq!(payload.nodes[0].id, "a");
    assert!(payload.connections.is_empty());
}

#[test]
fn malformed_connection_is_dropped_not_the_payload() {
    let resp = with_data(json!({
        "nodes": [{"id": "a"}, {"id": "b"}],
        "connections": [
            {"id": "c1", "source": "a", "target": "b"},
            {"id": "c2", "target": "b"}
        ]
    }));
    let payload = from_structured_data(&resp).unwrap();
    assert_eq!(payload.nodes.len(), 2);
    assert_eq!(payload.connections.len(), 1);
    assert_eq!(payload.connections[0].id, "c1");
}

// =============================================================
// Fenced block
// =============================================================

#[test]
fn fenced_json_block_is_extracted() {
    let text = "Here is the design:\n```json\n{\"nodes\":[{\"id\":\"n1\",\"type\":\"cache\",\"name\":\"Redis\"}],\"connections\":[]}\n```\nLet me know.";
    let payload = normalize(&with_text(text));
    assert_eq!(payload.nodes.len(), 1);
    assert_eq!(payload.nodes[0].id, "n1");
    assert_eq!(payload.nodes[0].kind, NodeKind::Cache);
    assert!(payload.connections.is_empty());
}

#[test]
fn untagged_fence_is_extracted() {
    let text = "```\n{\"nodes\":[{\"id\":\"n9\"}]}\n```";
    let payload = from_fenced_block(&with_text(text)).unwrap();
    assert_eq!(payload.nodes[0].id, "n9");
}

#[test]
fn single_line_fence_is_extracted() {
    let text = "```json {\"nodes\":[{\"id\":\"n3\"}]} ``` trailing";
    let payload = from_fenced_block(&with_text(text)).unwrap();
    assert_eq!(payload.nodes[0].id, "n3");
}

#[test]
fn json_fence_wins_over_earlier_code_fence() {
    let text = "Config:\n```js\nconst opts = { retries: 3 };\n```\nDiagram:\n```json\n{\"nodes\":[{\"id\":\"n1\"}],\"connections\":[]}\n```";
    let payload = normalize(&with_text(text));
    assert_eq!(payload.nodes.len(), 1);
    assert_eq!(payload.nodes[0].id, "n1");
}

#[test]
fn later_untagged_fence_is_tried_after_a_bad_one() {
    let text = "```json\nnot json\n```\nretry:\n```\n{\"nodes\":[{\"id\":\"n2\"}]}\n```";
    let payload = from_fenced_block(&with_text(text)).unwrap();
    assert_eq!(payload.nodes[0].id, "n2");
}

#[test]
fn unterminated_fence_yields_nothing() {
    assert!(from_fenced_block(&with_text("```json\n{\"nodes\":[{\"id\":\"n1\"}]}")).is_none());
}

#[test]
fn broken_fence_falls_back_to_brace_span() {
    let text = "```json\n{oops}\n```\nActual: {\"nodes\":[{\"id\":\"b1\"}]}";
    // The brace span runs from the broken block to the end, so it fails too.
    assert_is_fallback(&normalize(&with_text(text)));

    let text = "```json\nnot json\n```\nActual: {\"nodes\":[{\"id\":\"b1\"}]}";
    let payload = normalize(&with_text(text));
    assert_eq!(payload.nodes[0].id, "b1");
}

// =============================================================
// Brace span
// =============================================================

#[test]
fn brace_span_in_prose_is_parsed() {
    let text = "Sure! {\"nodes\":[{\"id\":\"x\",\"name\":\"Queue\",\"type\":\"queue\"}],\"connections\":[]} Hope that helps.";
    let payload = from_brace_span(&with_text(text)).unwrap();
    assert_eq!(payload.nodes[0].kind, NodeKind::Queue);
}

#[test]
fn reversed_braces_yield_nothing() {
    assert!(from_brace_span(&with_text("} nothing here {")).is_none());
}

// =============================================================
// Fallback
// =============================================================

#[test]
fn unparseable_response_yields_wired_fallback() {
    let payload = normalize(&with_text("I cannot help with that."));
    assert_is_fallback(&payload);
}

#[test]
fn fallback_has_fixed_layout_and_topology() {
    let payload = fallback_diagram();
    let kinds: Vec<NodeKind> = payload.nodes.iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NodeKind::ApiGateway, NodeKind::Service, NodeKind::Database, NodeKind::Cache]);
    assert_eq!(payload.nodes[0].position, Point::new(100.0, 200.0));
    assert_eq!(payload.nodes[3].position, Point::new(700.0, 300.0));

    let gateway = &payload.nodes[0].id;
    let service = &payload.nodes[1].id;
    assert_eq!(&payload.connections[0].source, gateway);
    assert_eq!(&payload.connections[0].target, service);
    assert_eq!(payload.connections[0].protocol, "HTTPS");
    assert!(payload.connections.iter().skip(1).all(|c| &c.source == service));
    assert!(payload.connections.iter().all(|c| c.kind == ConnectionKind::Sync));
    assert_eq!(payload.nodes[1].connections.len(), 3);
}

#[test]
fn fallback_ids_are_fresh_per_call() {
    let a = fallback_diagram();
    let b = fallback_diagram();
    assert_ne!(a.nodes[0].id, b.nodes[0].id);
    assert_ne!(a.connections[0].id, b.connections[0].id);
}

// =============================================================
// Prompt
// =============================================================

#[test]
fn prompt_carries_requirements_and_audience() {
    let prompt = build_generation_prompt("  An online bookstore  ", Audience::Executive);
    assert!(prompt.contains("Requirements:\nAn online bookstore\n"));
    assert!(prompt.contains("Audience: executive."));
    assert!(prompt.contains("\"nodes\""));
}
