//! Editor session: the interaction state machine over one project.
//!
//! `EditorSession` consumes pointer, wheel and keyboard events in screen
//! space, converts them through the camera, and mutates its project. Every
//! entry point returns the [`Action`]s the host must carry out. Whenever the
//! project must be flushed to storage the list contains [`Action::Persist`];
//! intermediate drag positions are written through to the project without it.

use crate::camera::{Camera, Point, clamp_zoom};
use crate::consts::{DRAG_CLICK_SLOP_PX, FIT_PADDING, NODE_HEIGHT, NODE_WIDTH, ZOOM_STEP};
use crate::doc::{
    ConnectionId, ConnectionPatch, DiagramPayload, ModelError, NodeConnection, NodeId, NodeKind, NodePatch, Project,
    SystemNode,
};
use crate::fit::{Footprint, fit_to_view};
use crate::hit::hit_test;
use crate::input::{Button, InteractionState, Key, Mode, UiState, WheelDelta};
use crate::template::{custom_template, instantiate, template_for};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    RenderNeeded,
    /// Flush the whole project to the persistence backend.
    Persist,
    NodeCreated(SystemNode),
    NodeUpdated { id: NodeId },
    NodeDeleted { id: NodeId, connections: Vec<ConnectionId> },
    ConnectionCreated(NodeConnection),
    ConnectionUpdated { id: ConnectionId },
    ConnectionDeleted { id: ConnectionId },
    /// Open the node's detail view.
    NodeSelected { id: NodeId },
    SelectionCleared,
    ModeChanged(Mode),
    SetCursor(String),
}

/// One open project plus the transient state of editing it.
pub struct EditorSession {
    pub project: Project,
    pub camera: Camera,
    pub ui: UiState,
    pub state: InteractionState,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Set when a real drag ends so the click the host reports next is swallowed.
    suppress_click: bool,
}

impl EditorSession {
    #[must_use]
    pub fn new(project: Project) -> Self {
        Self {
            project,
            camera: Camera::default(),
            ui: UiState::default(),
            state: InteractionState::Idle,
            viewport_width: 0.0,
            viewport_height: 0.0,
            suppress_click: false,
        }
    }

    // --- Data inputs ---

    /// Replace the open project (e.g. after a reload from storage).
    pub fn load_project(&mut self, project: Project) -> Vec<Action> {
        self.project = project;
        self.state = InteractionState::Idle;
        self.suppress_click = false;
        let mut actions = Vec::new();
        if self.ui.selected.take().is_some() {
            actions.push(Action::SelectionCleared);
        }
        actions.push(Action::ModeChanged(Mode::Idle));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Apply an agent-generated diagram as one atomic replace.
    pub fn apply_generation(&mut self, payload: DiagramPayload) -> Vec<Action> {
        self.project.complete_generation(payload);
        let mut actions = Vec::new();
        if matches!(self.state, InteractionState::Panning { .. } | InteractionState::DraggingNode { .. }) {
            self.state = InteractionState::Idle;
            actions.push(Action::ModeChanged(Mode::Idle));
        }
        self.forget_missing_references(&mut actions);
        actions.push(Action::Persist);
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Viewport ---

    /// Update viewport dimensions in screen pixels.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Change zoom by `delta`, clamped to the allowed range. Pan is unchanged.
    ///
    /// A zoom already outside the range (fit-to-view can go below the
    /// minimum) never moves against the direction of `delta`.
    pub fn zoom_by(&mut self, delta: f64) -> Vec<Action> {
        let target = clamp_zoom(self.camera.zoom + delta);
        let zoom = if delta < 0.0 { target.min(self.camera.zoom) } else { target.max(self.camera.zoom) };
        if (zoom - self.camera.zoom).abs() < f64::EPSILON {
            return Vec::new();
        }
        self.camera.zoom = zoom;
        vec![Action::RenderNeeded]
    }

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.zoom_by(ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.zoom_by(-ZOOM_STEP)
    }

    /// Frame every node in the viewport, replacing zoom and pan together.
    pub fn fit_to_view(&mut self) -> Vec<Action> {
        let positions: Vec<Point> = self.project.nodes.iter().map(|n| n.position).collect();
        let footprint = Footprint { width: NODE_WIDTH, height: NODE_HEIGHT };
        self.camera = fit_to_view(&positions, self.viewport_width, self.viewport_height, FIT_PADDING, footprint);
        vec![Action::RenderNeeded]
    }

    pub fn toggle_grid(&mut self) -> Vec<Action> {
        self.ui.show_grid = !self.ui.show_grid;
        vec![Action::RenderNeeded]
    }

    pub fn toggle_minimap(&mut self) -> Vec<Action> {
        self.ui.show_minimap = !self.ui.show_minimap;
        vec![Action::RenderNeeded]
    }

    // --- Connect mode ---

    /// Engage connect mode from idle, or leave it if already engaged.
    pub fn toggle_connect_mode(&mut self) -> Vec<Action> {
        if self.state.is_connecting() {
            return self.cancel();
        }
        if self.state != InteractionState::Idle {
            return Vec::new();
        }
        self.state = InteractionState::ConnectingAwaitingSource;
        vec![Action::ModeChanged(Mode::ConnectingSource), Action::SetCursor("crosshair".into())]
    }

    /// Return to idle from any state, discarding a pending connection source.
    pub fn cancel(&mut self) -> Vec<Action> {
        let previous = std::mem::take(&mut self.state);
        let mut actions = Vec::new();
        if let InteractionState::DraggingNode { moved: true, .. } = previous {
            actions.push(Action::Persist);
        }
        if previous != InteractionState::Idle {
            actions.push(Action::ModeChanged(Mode::Idle));
            actions.push(Action::SetCursor("default".into()));
        }
        actions
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if self.state != InteractionState::Idle {
            return Vec::new();
        }
        let hit = match button {
            Button::Primary => hit_test(self.camera.screen_to_world(screen_pt), &self.project),
            Button::Middle => None,
            Button::Secondary => return Vec::new(),
        };

        if let Some(id) = hit {
            let Some(node) = self.project.node(&id) else {
                return Vec::new();
            };
            let origin = self.camera.world_to_screen(node.position);
            self.state = InteractionState::DraggingNode {
                id,
                grab_offset: screen_pt.sub(origin),
                press_screen: screen_pt,
                moved: false,
            };
            return vec![Action::ModeChanged(Mode::Dragging), Action::SetCursor("grabbing".into())];
        }

        self.state = InteractionState::Panning { pan_start: screen_pt.sub(self.camera.pan()) };
        vec![Action::ModeChanged(Mode::Panning), Action::SetCursor("grabbing".into())]
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        match &self.state {
            InteractionState::Panning { pan_start } => {
                let pan = screen_pt.sub(*pan_start);
                self.camera.pan_x = pan.x;
                self.camera.pan_y = pan.y;
                vec![Action::RenderNeeded]
            }
            InteractionState::DraggingNode { .. } => self.drag_to(screen_pt),
            _ => Vec::new(),
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point) -> Vec<Action> {
        match &self.state {
            InteractionState::Panning { .. } => self.finish_gesture(Vec::new()),
            InteractionState::DraggingNode { press_screen, moved, .. } => {
                let mut actions = Vec::new();
                if *moved || screen_pt.distance(*press_screen) > DRAG_CLICK_SLOP_PX {
                    actions = self.drag_to(screen_pt);
                }
                if let InteractionState::DraggingNode { moved, .. } = &self.state {
                    self.suppress_click = *moved;
                }
                if self.state != InteractionState::Idle {
                    actions.push(Action::Persist);
                }
                self.finish_gesture(actions)
            }
            _ => Vec::new(),
        }
    }

    /// The pointer left the canvas. Ends a pan; ends a drag as if released in place.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        match &self.state {
            InteractionState::Panning { .. } => self.finish_gesture(Vec::new()),
            InteractionState::DraggingNode { moved, .. } => {
                self.suppress_click = *moved;
                self.finish_gesture(vec![Action::Persist])
            }
            _ => Vec::new(),
        }
    }

    /// A click (press and release without a drag) at `screen_pt`.
    pub fn on_click(&mut self, screen_pt: Point) -> Vec<Action> {
        if std::mem::take(&mut self.suppress_click) {
            return Vec::new();
        }
        let hit = hit_test(self.camera.screen_to_world(screen_pt), &self.project);
        let Some(id) = hit else {
            return Vec::new();
        };

        match &self.state {
            InteractionState::Idle => self.select(&id),
            InteractionState::ConnectingAwaitingSource => {
                self.state = InteractionState::ConnectingAwaitingTarget { source: id };
                vec![Action::ModeChanged(Mode::ConnectingTarget), Action::RenderNeeded]
            }
            InteractionState::ConnectingAwaitingTarget { source } => {
                if *source == id {
                    return Vec::new();
                }
                let source = source.clone();
                self.state = InteractionState::Idle;
                let mut actions = Vec::new();
                if let Ok(conn) = self.project.add_connection(&source, &id) {
                    actions.push(Action::ConnectionCreated(conn));
                    actions.push(Action::Persist);
                }
                actions.push(Action::ModeChanged(Mode::Idle));
                actions.push(Action::SetCursor("default".into()));
                actions.push(Action::RenderNeeded);
                actions
            }
            InteractionState::Panning { .. } | InteractionState::DraggingNode { .. } => Vec::new(),
        }
    }

    /// One discrete zoom step per wheel event; scrolling up zooms in.
    pub fn on_wheel(&mut self, delta: WheelDelta) -> Vec<Action> {
        if delta.dy < 0.0 {
            self.zoom_in()
        } else if delta.dy > 0.0 {
            self.zoom_out()
        } else {
            Vec::new()
        }
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        match key.0.as_str() {
            "Escape" => {
                if self.state != InteractionState::Idle {
                    self.cancel()
                } else {
                    self.clear_selection()
                }
            }
            "Delete" | "Backspace" => self.delete_selected(),
            "+" | "=" => self.zoom_in(),
            "-" => self.zoom_out(),
            "0" => self.fit_to_view(),
            "c" | "C" => self.toggle_connect_mode(),
            _ => Vec::new(),
        }
    }

    // --- Selection ---

    /// Select a node, opening its detail view. Unknown ids are ignored.
    pub fn select(&mut self, id: &str) -> Vec<Action> {
        if self.project.node(id).is_none() {
            return Vec::new();
        }
        self.ui.selected = Some(id.to_owned());
        vec![Action::NodeSelected { id: id.to_owned() }, Action::RenderNeeded]
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        if self.ui.selected.take().is_none() {
            return Vec::new();
        }
        vec![Action::SelectionCleared, Action::RenderNeeded]
    }

    // --- Editing ---

    /// Drop a new node of `kind` at a screen position.
    ///
    /// # Errors
    ///
    /// Fails if the drop position maps to a non-finite canvas point.
    pub fn add_node_from_template(&mut self, kind: NodeKind, screen_pt: Point) -> Result<Vec<Action>, ModelError> {
        let template = template_for(kind).unwrap_or_else(custom_template);
        let node = instantiate(&template, self.camera.screen_to_world(screen_pt));
        self.project.add_node(node.clone())?;
        Ok(vec![Action::NodeCreated(node), Action::Persist, Action::RenderNeeded])
    }

    /// Edit a node's fields from its detail view.
    ///
    /// # Errors
    ///
    /// Fails if the node is missing or the patch moves it to a non-finite position.
    pub fn update_node(&mut self, id: &str, patch: &NodePatch) -> Result<Vec<Action>, ModelError> {
        self.project.update_node(id, patch)?;
        Ok(vec![Action::NodeUpdated { id: id.to_owned() }, Action::Persist, Action::RenderNeeded])
    }

    /// Delete a node and every connection touching it, in one step.
    ///
    /// # Errors
    ///
    /// Fails if the node does not exist; nothing is changed in that case.
    pub fn delete_node(&mut self, id: &str) -> Result<Vec<Action>, ModelError> {
        let connections = self.project.remove_node_cascade(id)?;
        let mut actions = vec![Action::NodeDeleted { id: id.to_owned(), connections }];
        self.forget_missing_references(&mut actions);
        actions.push(Action::Persist);
        actions.push(Action::RenderNeeded);
        Ok(actions)
    }

    /// Delete the selected node, if any.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.selected.clone() else {
            return Vec::new();
        };
        match self.delete_node(&id) {
            Ok(actions) => actions,
            Err(_) => self.clear_selection(),
        }
    }

    /// Edit a connection's descriptive fields.
    ///
    /// # Errors
    ///
    /// Fails if the connection does not exist.
    pub fn update_connection(&mut self, id: &str, patch: &ConnectionPatch) -> Result<Vec<Action>, ModelError> {
        self.project.update_connection(id, patch)?;
        Ok(vec![Action::ConnectionUpdated { id: id.to_owned() }, Action::Persist, Action::RenderNeeded])
    }

    /// Remove one connection.
    ///
    /// # Errors
    ///
    /// Fails if the connection does not exist.
    pub fn delete_connection(&mut self, id: &str) -> Result<Vec<Action>, ModelError> {
        self.project.remove_connection(id)?;
        Ok(vec![Action::ConnectionDeleted { id: id.to_owned() }, Action::Persist, Action::RenderNeeded])
    }

    // --- Queries ---

    #[must_use]
    pub fn project(&self) -> &Project {
        &self.project
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// The node whose detail view is open, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&str> {
        self.ui.selected.as_deref()
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    // --- Internals ---

    fn drag_to(&mut self, screen_pt: Point) -> Vec<Action> {
        let InteractionState::DraggingNode { id, grab_offset, press_screen, moved } = &mut self.state else {
            return Vec::new();
        };
        if screen_pt.distance(*press_screen) > DRAG_CLICK_SLOP_PX {
            *moved = true;
        }
        let id = id.clone();
        let position = self.camera.screen_to_world(screen_pt.sub(*grab_offset));
        match self.project.move_node(&id, position) {
            Ok(()) => vec![Action::NodeUpdated { id }, Action::RenderNeeded],
            Err(_) => {
                self.state = InteractionState::Idle;
                vec![Action::ModeChanged(Mode::Idle), Action::SetCursor("default".into())]
            }
        }
    }

    fn finish_gesture(&mut self, mut actions: Vec<Action>) -> Vec<Action> {
        if self.state != InteractionState::Idle {
            self.state = InteractionState::Idle;
            actions.push(Action::ModeChanged(Mode::Idle));
            actions.push(Action::SetCursor("default".into()));
        }
        actions
    }

    /// Drop selection and gesture state that point at nodes no longer in the project.
    fn forget_missing_references(&mut self, actions: &mut Vec<Action>) {
        if let Some(selected) = &self.ui.selected {
            if self.project.node(selected).is_none() {
                self.ui.selected = None;
                actions.push(Action::SelectionCleared);
            }
        }
        let stale = match &self.state {
            InteractionState::DraggingNode { id, .. } => self.project.node(id).is_none(),
            InteractionState::ConnectingAwaitingTarget { source } => self.project.node(source).is_none(),
            _ => false,
        };
        if stale {
            self.state = InteractionState::Idle;
            actions.push(Action::ModeChanged(Mode::Idle));
        }
    }
}
