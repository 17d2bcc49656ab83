use std::cell::RefCell;
use std::rc::Rc;
use taskdeck_core::model::seed::default_profile;
use taskdeck_core::{
    AppContext, AuthState, MemoryStateRepository, ProfilePatch, SqliteStateRepository, TagColor,
};

#[test]
fn pin_gate_scenario() {
    let ctx = AppContext::with_memory(MemoryStateRepository::new()).unwrap();
    assert_eq!(ctx.auth().state(), AuthState::Unauthenticated);

    assert!(!ctx.auth().validate_pin("0000"));
    assert_eq!(ctx.auth().state(), AuthState::Unauthenticated);

    assert!(ctx.auth().validate_pin("1234"));
    assert_eq!(ctx.auth().state(), AuthState::Authenticated);

    ctx.auth().logout();
    assert_eq!(ctx.auth().state(), AuthState::Unauthenticated);
}

#[test]
fn configured_pin_replaces_demo_pin() {
    let conn = taskdeck_core::db::open_db_in_memory().unwrap();
    let ctx = AppContext::with_repository(SqliteStateRepository::new(conn), "2468").unwrap();
    assert!(!ctx.auth().validate_pin("1234"));
    assert!(ctx.auth().validate_pin("2468"));
}

#[test]
fn auth_subscribers_see_transitions_only() {
    let ctx = AppContext::with_memory(MemoryStateRepository::new()).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    ctx.auth().subscribe(move |state| sink.borrow_mut().push(*state));

    ctx.auth().validate_pin("9999");
    ctx.auth().validate_pin("1234");
    ctx.auth().validate_pin("1234");
    ctx.auth().logout();
    ctx.auth().logout();

    assert_eq!(
        *seen.borrow(),
        vec![AuthState::Authenticated, AuthState::Unauthenticated]
    );
}

#[test]
fn profile_partial_update_and_reset() {
    let ctx = AppContext::open_in_memory().unwrap();
    ctx.profile().update_profile(&ProfilePatch {
        tag: Some("Night owl".to_string()),
        tag_color: Some(TagColor::Purple),
        ..ProfilePatch::default()
    });

    let profile = ctx.profile().profile();
    assert_eq!(profile.tag, "Night owl");
    assert_eq!(profile.tag_color, TagColor::Purple);
    assert_eq!(profile.name, default_profile().name);

    ctx.profile().reset_profile();
    assert_eq!(ctx.profile().profile(), default_profile());
}
