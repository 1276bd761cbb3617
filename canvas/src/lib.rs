//! Diagram canvas engine for architecture sketches.
//!
//! This crate owns everything about a diagram that is independent of pixels
//! and storage: translating raw pointer/keyboard input into project mutations,
//! maintaining camera state for pan/zoom, framing nodes in the viewport,
//! instantiating component templates, and normalizing agent output into a
//! diagram. The host is responsible only for wiring input events to the
//! session and persisting the project whenever an [`engine::Action::Persist`]
//! comes back.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EditorSession`]: the interaction state machine over one project |
//! | [`doc`] | Project, node, connection and version types with their invariants |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`fit`] | Fit-to-view zoom/pan computation |
//! | [`input`] | Input event types and interaction states |
//! | [`hit`] | Hit-testing against node footprints |
//! | [`template`] | Default component catalog and node instantiation |
//! | [`agent`] | Agent Service wire types and the response normalizer |
//! | [`render`] | Screen-space scene geometry for a renderer |
//! | [`consts`] | Shared numeric constants (zoom limits, node footprint, etc.) |

pub mod agent;
pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod fit;
pub mod hit;
pub mod input;
pub mod render;
pub mod template;
