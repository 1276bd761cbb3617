#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::consts::{NODE_HEIGHT, NODE_WIDTH};
use crate::doc::{NodeId, Project, SystemNode};

/// Whether `world_pt` falls inside the node's canvas-space footprint (edges inclusive).
#[must_use]
pub fn node_contains(node: &SystemNode, world_pt: Point) -> bool {
    let p = node.position;
    world_pt.x >= p.x && world_pt.x <= p.x + NODE_WIDTH && world_pt.y >= p.y && world_pt.y <= p.y + NODE_HEIGHT
}

/// Test which node (if any) is under `world_pt`.
///
/// Later nodes draw on top, so the search runs back to front.
#[must_use]
pub fn hit_test(world_pt: Point, project: &Project) -> Option<NodeId> {
    project
        .nodes
        .iter()
        .rev()
        .find(|n| node_contains(n, world_pt))
        .map(|n| n.id.clone())
}
