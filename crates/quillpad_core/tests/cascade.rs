use quillpad_core::{
    CoreConfig, CoreError, CoreService, MemorySnapshotStore, NewNote, NoteFilter, UserId,
};

fn open_service() -> CoreService {
    CoreService::open(
        CoreConfig::new("integration-secret"),
        Box::new(MemorySnapshotStore::new()),
    )
    .unwrap()
}

fn register(service: &mut CoreService, username: &str) -> UserId {
    service.register(username, "pw-secret").unwrap().id
}

#[test]
fn deleting_a_tag_strips_it_from_referencing_notes() {
    let mut service = open_service();
    let alice = register(&mut service, "alice");
    let work = service.create_tag(alice, "work").unwrap();
    let home = service.create_tag(alice, "home").unwrap();

    let both = service
        .create_note(
            alice,
            NewNote {
                title: "both".to_string(),
                tag_ids: vec![work.id, home.id],
                ..NewNote::default()
            },
        )
        .unwrap();
    let untagged = service
        .create_note(
            alice,
            NewNote {
                title: "untagged".to_string(),
                ..NewNote::default()
            },
        )
        .unwrap();

    service.delete_tag(work.id, alice).unwrap();

    assert!(matches!(
        service.get_tag(work.id, alice).unwrap_err(),
        CoreError::TagNotFound(_)
    ));
    // The note survives with the reference stripped, order preserved.
    let loaded = service.get_note(both.id, alice).unwrap();
    assert_eq!(loaded.tag_ids, vec![home.id]);
    // Notes never referencing the tag keep their timestamps and content.
    let unrelated = service.get_note(untagged.id, alice).unwrap();
    assert_eq!(unrelated.updated_at, untagged.updated_at);
}

#[test]
fn tag_cascade_never_deletes_notes() {
    let mut service = open_service();
    let alice = register(&mut service, "alice");
    let tag = service.create_tag(alice, "solo").unwrap();
    let note = service
        .create_note(
            alice,
            NewNote {
                title: "kept".to_string(),
                tag_ids: vec![tag.id],
                ..NewNote::default()
            },
        )
        .unwrap();

    service.delete_tag(tag.id, alice).unwrap();

    let loaded = service.get_note(note.id, alice).unwrap();
    assert!(loaded.tag_ids.is_empty());
    assert!(!loaded.archived);
}

#[test]
fn tag_cascade_ignores_other_owners_even_with_colliding_ids() {
    let mut service = open_service();
    let alice = register(&mut service, "alice");
    let bob = register(&mut service, "bob");
    let alices_tag = service.create_tag(alice, "shared-name").unwrap();

    // Tag references are weak, so bob's note can hold alice's tag id.
    let bobs_note = service
        .create_note(
            bob,
            NewNote {
                title: "bob".to_string(),
                tag_ids: vec![alices_tag.id],
                ..NewNote::default()
            },
        )
        .unwrap();

    service.delete_tag(alices_tag.id, alice).unwrap();

    let loaded = service.get_note(bobs_note.id, bob).unwrap();
    assert_eq!(loaded.tag_ids, vec![alices_tag.id]);
}

#[test]
fn deleting_a_missing_tag_mutates_nothing() {
    let mut service = open_service();
    let alice = register(&mut service, "alice");
    let tag = service.create_tag(alice, "work").unwrap();
    let note = service
        .create_note(
            alice,
            NewNote {
                title: "note".to_string(),
                tag_ids: vec![tag.id],
                ..NewNote::default()
            },
        )
        .unwrap();

    let ghost = uuid::Uuid::new_v4();
    assert!(matches!(
        service.delete_tag(ghost, alice).unwrap_err(),
        CoreError::TagNotFound(_)
    ));
    // First failing step aborts before any rewrite.
    let loaded = service.get_note(note.id, alice).unwrap();
    assert_eq!(loaded.tag_ids, vec![tag.id]);
    assert_eq!(loaded.updated_at, note.updated_at);
}

#[test]
fn deleting_a_user_removes_all_owned_rows() {
    let mut service = open_service();
    let alice = register(&mut service, "alice");
    let tag = service.create_tag(alice, "work").unwrap();
    let note = service
        .create_note(
            alice,
            NewNote {
                title: "mine".to_string(),
                tag_ids: vec![tag.id],
                ..NewNote::default()
            },
        )
        .unwrap();

    service.delete_user(alice).unwrap();

    assert!(matches!(
        service.get_user(alice).unwrap_err(),
        CoreError::UserNotFound(_)
    ));
    assert!(matches!(
        service.get_note(note.id, alice).unwrap_err(),
        CoreError::NoteNotFound(_)
    ));
    assert!(matches!(
        service.get_tag(tag.id, alice).unwrap_err(),
        CoreError::TagNotFound(_)
    ));
    assert!(matches!(
        service.delete_user(alice).unwrap_err(),
        CoreError::UserNotFound(_)
    ));
}

#[test]
fn user_cascade_leaves_other_tenants_untouched() {
    let mut service = open_service();
    let alice = register(&mut service, "alice");
    let bob = register(&mut service, "bob");
    let bobs_tag = service.create_tag(bob, "bob-tag").unwrap();
    let bobs_note = service
        .create_note(
            bob,
            NewNote {
                title: "bob".to_string(),
                tag_ids: vec![bobs_tag.id],
                ..NewNote::default()
            },
        )
        .unwrap();
    service
        .create_note(
            alice,
            NewNote {
                title: "alice".to_string(),
                ..NewNote::default()
            },
        )
        .unwrap();

    service.delete_user(alice).unwrap();

    assert!(service.get_user(bob).is_ok());
    assert_eq!(service.list_notes(bob, &NoteFilter::default()).len(), 1);
    let loaded = service.get_note(bobs_note.id, bob).unwrap();
    assert_eq!(loaded.tag_ids, vec![bobs_tag.id]);
    assert_eq!(service.list_tags(bob).len(), 1);
}

#[test]
fn scripted_scenario_tag_delete_leaves_note_clean() {
    // register alice -> tag T1 -> note N1 with [T1] -> delete T1.
    let mut service = open_service();
    let alice = register(&mut service, "alice");
    let t1 = service.create_tag(alice, "t1").unwrap();
    let n1 = service
        .create_note(
            alice,
            NewNote {
                title: "n1".to_string(),
                tag_ids: vec![t1.id],
                ..NewNote::default()
            },
        )
        .unwrap();

    service.delete_tag(t1.id, alice).unwrap();

    let loaded = service.get_note(n1.id, alice).unwrap();
    assert!(loaded.tag_ids.is_empty());
    assert!(!loaded.archived);
}
