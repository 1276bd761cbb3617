use super::*;

#[test]
fn default_state_is_idle() {
    assert_eq!(InteractionState::default(), InteractionState::Idle);
    assert_eq!(InteractionState::default().mode(), Mode::Idle);
}

#[test]
fn connecting_states_report_connecting() {
    assert!(InteractionState::ConnectingAwaitingSource.is_connecting());
    assert!(InteractionState::ConnectingAwaitingTarget { source: "a".into() }.is_connecting());
}

#[test]
fn gesture_states_are_not_connecting() {
    let panning = InteractionState::Panning { pan_start: Point::new(1.0, 2.0) };
    let dragging = InteractionState::DraggingNode {
        id: "a".into(),
        grab_offset: Point::default(),
        press_screen: Point::default(),
        moved: false,
    };
    assert!(!InteractionState::Idle.is_connecting());
    assert!(!panning.is_connecting());
    assert!(!dragging.is_connecting());
    assert_eq!(panning.mode(), Mode::Panning);
    assert_eq!(dragging.mode(), Mode::Dragging);
}

#[test]
fn mode_serializes_snake_case() {
    assert_eq!(serde_json::to_string(&Mode::ConnectingTarget).unwrap(), "\"connecting_target\"");
}

#[test]
fn ui_state_defaults_hide_overlays() {
    let ui = UiState::default();
    assert!(ui.selected.is_none());
    assert!(!ui.show_grid);
    assert!(!ui.show_minimap);
}

#[test]
fn key_new_wraps_name() {
    assert_eq!(Key::new("Escape"), Key("Escape".to_owned()));
}
