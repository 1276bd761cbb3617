//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own persistence and the generation workflow so route
//! handlers stay focused on request/response translation.

pub mod generate;
pub mod project;
pub mod store;
