use super::*;

#[test]
fn generation_guard_blocks_second_entry() {
    let state = test_helpers::test_app_state();
    let guard = state.try_begin_generation("p1");
    assert!(guard.is_some());
    assert!(state.try_begin_generation("p1").is_none());
    assert!(state.is_generating("p1"));
}

#[test]
fn generation_guard_releases_on_drop() {
    let state = test_helpers::test_app_state();
    {
        let _guard = state.try_begin_generation("p1").unwrap();
        assert!(state.is_generating("p1"));
    }
    assert!(!state.is_generating("p1"));
    assert!(state.try_begin_generation("p1").is_some());
}

#[test]
fn generation_guards_are_per_project() {
    let state = test_helpers::test_app_state();
    let _a = state.try_begin_generation("a").unwrap();
    let _b = state.try_begin_generation("b").unwrap();
    assert!(state.is_generating("a"));
    assert!(state.is_generating("b"));
}

#[test]
fn clones_share_the_generation_set() {
    let state = test_helpers::test_app_state();
    let clone = state.clone();
    let _guard = state.try_begin_generation("shared").unwrap();
    assert!(clone.try_begin_generation("shared").is_none());
}

#[test]
fn dummy_project_is_valid() {
    let project = test_helpers::dummy_project("reqs");
    assert_eq!(project.nodes.len(), 2);
    assert_eq!(project.connections.len(), 1);
    assert!(project.validate().is_ok());
}
