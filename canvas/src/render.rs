//! Scene geometry: the finished node boxes and connection paths in screen space.
//!
//! This module turns a project plus a camera into plain geometry that any
//! renderer (canvas, SVG export, raster export) can draw without knowing
//! about the camera. It reads state and produces values; it mutates nothing.
//!
//! Connections whose endpoints are missing are not drawn. They stay in the
//! project untouched.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;

use serde::Serialize;

use crate::camera::{Camera, Point};
use crate::consts::{NODE_HEIGHT, NODE_WIDTH};
use crate::doc::{ConnectionId, ConnectionKind, NodeId, NodeKind, Project, SystemNode};

/// Arrowhead length in screen pixels at zoom 1.
const ARROW_SIZE: f64 = 10.0;

/// Arrowhead half-angle in radians (~30°).
const ARROW_ANGLE: f64 = PI / 6.0;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// One node as drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeBox {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub name: String,
    pub rect: Rect,
}

/// One connection as drawn: a straight segment between node centres.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgePath {
    pub id: ConnectionId,
    #[serde(rename = "type")]
    pub kind: ConnectionKind,
    pub label: String,
    pub from: Point,
    pub to: Point,
    /// Where the label is anchored.
    pub midpoint: Point,
    /// Arrowhead wing tips at `to`.
    pub head: [Point; 2],
    /// Arrowhead wing tips at `from`; only bidirectional edges have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail: Option<[Point; 2]>,
    /// Async edges are drawn dashed.
    pub dashed: bool,
}

/// Everything a renderer needs for one frame, in draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    /// Drawn first, beneath the nodes.
    pub edges: Vec<EdgePath>,
    /// Back to front.
    pub nodes: Vec<NodeBox>,
    /// Canvas-space bounding box of every node footprint.
    bounds: Option<Rect>,
}

impl Scene {
    /// Canvas-space bounding box of all nodes, for the minimap. `None` when empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }
}

/// Build screen-space geometry for `project` as seen through `camera`.
#[must_use]
pub fn build_scene(project: &Project, camera: &Camera) -> Scene {
    let nodes: Vec<NodeBox> = project
        .nodes
        .iter()
        .map(|node| NodeBox {
            id: node.id.clone(),
            kind: node.kind,
            name: node.name.clone(),
            rect: screen_rect(node, camera),
        })
        .collect();

    let arrow = camera.world_dist_to_screen(ARROW_SIZE);
    let edges = project
        .connections
        .iter()
        .filter_map(|conn| {
            let from = nodes.iter().find(|n| n.id == conn.source)?.rect.center();
            let to = nodes.iter().find(|n| n.id == conn.target)?.rect.center();
            Some(EdgePath {
                id: conn.id.clone(),
                kind: conn.kind,
                label: conn.label.clone(),
                from,
                to,
                midpoint: Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0),
                head: arrowhead(from, to, arrow),
                tail: (conn.kind == ConnectionKind::Bidirectional).then(|| arrowhead(to, from, arrow)),
                dashed: conn.kind == ConnectionKind::Async,
            })
        })
        .collect();

    Scene { edges, nodes, bounds: canvas_bounds(&project.nodes) }
}

fn screen_rect(node: &SystemNode, camera: &Camera) -> Rect {
    let origin = camera.world_to_screen(node.position);
    Rect {
        x: origin.x,
        y: origin.y,
        width: camera.world_dist_to_screen(NODE_WIDTH),
        height: camera.world_dist_to_screen(NODE_HEIGHT),
    }
}

/// Wing tips of an arrowhead pointing along `from -> tip`.
fn arrowhead(from: Point, tip: Point, size: f64) -> [Point; 2] {
    let angle = (tip.y - from.y).atan2(tip.x - from.x);
    [
        Point::new(tip.x - size * (angle - ARROW_ANGLE).cos(), tip.y - size * (angle - ARROW_ANGLE).sin()),
        Point::new(tip.x - size * (angle + ARROW_ANGLE).cos(), tip.y - size * (angle + ARROW_ANGLE).sin()),
    ]
}

fn canvas_bounds(nodes: &[SystemNode]) -> Option<Rect> {
    let first = nodes.first()?;
    let (mut min_x, mut min_y) = (first.position.x, first.position.y);
    let (mut max_x, mut max_y) = (min_x + NODE_WIDTH, min_y + NODE_HEIGHT);
    for node in &nodes[1..] {
        min_x = min_x.min(node.position.x);
        min_y = min_y.min(node.position.y);
        max_x = max_x.max(node.position.x + NODE_WIDTH);
        max_y = max_y.max(node.position.y + NODE_HEIGHT);
    }
    Some(Rect { x: min_x, y: min_y, width: max_x - min_x, height: max_y - min_y })
}
