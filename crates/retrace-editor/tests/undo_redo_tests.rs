//! End-to-end tests: record, mutate, resolve, undo, redo.

use std::cell::RefCell;
use std::rc::Rc;

use retrace_editor::prelude::*;

// -- test component types ---------------------------------------------------

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Body {
    x: i64,
    tags: Vec<String>,
}

impl Serializable for Body {
    const TYPE_NAME: &'static str = "body";
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::new("x", FieldKind::Integer),
        FieldDescriptor::new("tags", FieldKind::List(&FieldKind::Text)),
    ];
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct Emitter {
    rate: f64,
}

impl Serializable for Emitter {
    const TYPE_NAME: &'static str = "emitter";
    const FIELDS: &'static [FieldDescriptor] = &[FieldDescriptor::new("rate", FieldKind::Float)];
}

/// Records every hook call in order.
#[derive(Clone, Default)]
struct HookLog(Rc<RefCell<Vec<String>>>);

impl EditorHooks for HookLog {
    fn select(&mut self, objects: &[SceneObjectId]) {
        let names: Vec<String> = objects.iter().map(ToString::to_string).collect();
        self.0.borrow_mut().push(format!("select [{}]", names.join(", ")));
    }
    fn focus_field(&mut self, object: SceneObjectId, path: &str) {
        self.0.borrow_mut().push(format!("focus {object} {path}"));
    }
    fn refresh_inspector(&mut self) {
        self.0.borrow_mut().push("refresh".to_owned());
    }
}

fn session() -> EditorSession {
    let mut session = EditorSession::new(SessionConfig::default()).unwrap();
    session.scene_mut().register_component::<Body>();
    session.scene_mut().register_component::<Emitter>();
    session
}

fn with_body(session: &mut EditorSession, x: i64) -> (SceneObjectId, ComponentId) {
    let obj = session.scene_mut().create_object("ball", None).unwrap();
    let body = session
        .scene_mut()
        .add_component(obj, Body { x, tags: vec![] })
        .unwrap();
    (obj, body)
}

fn body_x(session: &EditorSession, body: ComponentId) -> i64 {
    session.scene().component::<Body>(body).unwrap().x
}

// -- 1. Record / resolve ----------------------------------------------------

#[test]
fn five_to_nine_undo_redo() {
    let mut s = session();
    let (_, body) = with_body(&mut s, 5);

    s.record_component(body, Some("x")).unwrap();
    s.scene_mut().component_mut::<Body>(body).unwrap().x = 9;
    let report = s.end_frame();
    assert_eq!(report.committed.len(), 1);

    assert!(matches!(s.undo(), StackStep::Undone { .. }));
    assert_eq!(body_x(&s, body), 5);
    assert!(matches!(s.redo(), StackStep::Redone { .. }));
    assert_eq!(body_x(&s, body), 9);
}

#[test]
fn no_mutation_produces_no_command() {
    let mut s = session();
    let (obj, body) = with_body(&mut s, 5);
    s.record_component(body, None).unwrap();
    s.record_header(obj, Some(HeaderField::Position)).unwrap();
    s.record_object(obj, true, "Edit ball").unwrap();

    let report = s.end_frame();
    assert!(report.is_empty());
    assert_eq!(report.dropped_empty, 3);
    assert!(s.undo_stack().is_empty());
}

#[test]
fn destroyed_target_produces_no_command() {
    let mut s = session();
    let (obj, body) = with_body(&mut s, 5);
    s.record_component(body, Some("x")).unwrap();
    s.record_header(obj, None).unwrap();
    s.scene_mut().component_mut::<Body>(body).unwrap().x = 6;
    s.scene_mut().destroy_object(obj).unwrap();

    let report = s.end_frame();
    assert!(report.is_empty());
    assert_eq!(report.skipped_destroyed, 2);
    assert!(s.undo().is_nothing());
}

#[test]
fn undo_redo_undo_restores_original() {
    let mut s = session();
    let (_, body) = with_body(&mut s, 1);
    s.record_component(body, Some("tags")).unwrap();
    s.scene_mut()
        .component_mut::<Body>(body)
        .unwrap()
        .tags
        .push("bouncy".into());
    s.end_frame();

    s.undo();
    s.redo();
    s.undo();
    assert_eq!(
        s.scene().component::<Body>(body).unwrap(),
        &Body { x: 1, tags: vec![] }
    );
}

#[test]
fn forward_and_backward_patches_reproduce_states() {
    let mut s = session();
    let (_, body) = with_body(&mut s, 3);
    let before = s.scene().capture_component(body).unwrap();
    {
        let b = s.scene_mut().component_mut::<Body>(body).unwrap();
        b.x = 4;
        b.tags = vec!["a".into(), "b".into()];
    }
    let after = s.scene().capture_component(body).unwrap();

    let diff = DiffPair::between(&before, &after).unwrap();
    let replayed = diff.forward.apply_to_snapshot(&before).unwrap();
    assert!(replayed.same_state(&after));
    let reverted = diff.backward.apply_to_snapshot(&after).unwrap();
    assert!(reverted.same_state(&before));
}

// -- 2. Stack behaviour -----------------------------------------------------

#[test]
fn recording_after_undo_truncates_redo_tail() {
    let mut s = session();
    let (_, body) = with_body(&mut s, 0);
    for x in 1..=3 {
        s.record_component(body, Some("x")).unwrap();
        s.scene_mut().component_mut::<Body>(body).unwrap().x = x;
        s.end_frame();
    }
    s.undo();
    s.undo();
    assert_eq!(body_x(&s, body), 1);

    s.record_component(body, Some("x")).unwrap();
    s.scene_mut().component_mut::<Body>(body).unwrap().x = 10;
    s.end_frame();

    assert!(!s.undo_stack().can_redo());
    assert_eq!(s.undo_stack().len(), 2);
    assert!(s.redo().is_nothing());
}

#[test]
fn capacity_keeps_newest_commands() {
    let mut config = SessionConfig::default();
    config.undo.capacity = 3;
    let mut s = EditorSession::new(config).unwrap();
    s.scene_mut().register_component::<Body>();
    let (_, body) = with_body(&mut s, 0);

    for x in 1..=5 {
        s.record_component(body, Some("x")).unwrap();
        s.scene_mut().component_mut::<Body>(body).unwrap().x = x;
        s.end_frame();
    }
    assert_eq!(s.undo_stack().len(), 3);
    while !s.undo().is_nothing() {}
    assert_eq!(body_x(&s, body), 2);
}

#[test]
fn pop_command_discards_provisional_record() {
    let mut s = session();
    let (obj, body) = with_body(&mut s, 0);
    s.record_component(body, Some("x")).unwrap();
    s.scene_mut().component_mut::<Body>(body).unwrap().x = 1;
    let keep = s.end_frame().committed[0];

    let rename = RenameObject::new(s.scene(), obj, "ball").unwrap();
    let provisional = s.execute(Box::new(rename));
    assert_eq!(s.undo_stack().top_command_id(), Some(provisional));

    assert!(s.undo_stack_mut().pop_command(provisional));
    assert_eq!(s.undo_stack().top_command_id(), Some(keep));
    s.undo();
    assert_eq!(body_x(&s, body), 0);
}

// -- 3. Headers and whole objects -------------------------------------------

#[test]
fn multi_object_move_is_single_command() {
    let mut s = session();
    let objects: Vec<_> = (0..3)
        .map(|i| s.scene_mut().create_object(format!("o{i}"), None).unwrap())
        .collect();
    s.record_headers(&objects).unwrap();
    for (i, &obj) in objects.iter().enumerate() {
        s.scene_mut()
            .set_position(obj, Vec3::new(i as f32, 1.0, 0.0))
            .unwrap();
    }
    let report = s.end_frame();
    assert_eq!(report.committed.len(), 1);

    s.undo();
    for &obj in &objects {
        assert_eq!(s.scene().header(obj).unwrap().position, Vec3::ZERO);
    }
    s.redo();
    assert_eq!(
        s.scene().header(objects[2]).unwrap().position,
        Vec3::new(2.0, 1.0, 0.0)
    );
}

#[test]
fn delete_then_undo_resurrects_with_components() {
    let mut s = session();
    let (obj, body) = with_body(&mut s, 7);
    let child = s.scene_mut().create_object("trail", Some(obj)).unwrap();
    let emitter = s
        .scene_mut()
        .add_component(child, Emitter { rate: 2.5 })
        .unwrap();

    let delete = DeleteObject::new(s.scene(), obj).unwrap();
    s.execute(Box::new(delete));
    assert!(!s.scene().is_alive(obj));
    assert!(!s.scene().is_alive(emitter));

    s.undo();
    assert!(s.scene().is_alive(obj));
    assert_eq!(body_x(&s, body), 7);
    assert_eq!(s.scene().children(obj).unwrap(), &[child]);
    assert_eq!(
        s.scene().component::<Emitter>(emitter).unwrap(),
        &Emitter { rate: 2.5 }
    );

    s.redo();
    assert!(!s.scene().is_alive(obj));
}

#[test]
fn stale_commands_below_a_delete_are_skipped() {
    let mut s = session();
    let (obj, body) = with_body(&mut s, 0);
    s.record_component(body, Some("x")).unwrap();
    s.scene_mut().component_mut::<Body>(body).unwrap().x = 1;
    s.end_frame();

    // Destroyed outside the command system, so nothing can bring it back.
    s.scene_mut().destroy_object(obj).unwrap();
    assert!(matches!(s.undo(), StackStep::Undone { .. }));
    assert!(matches!(s.redo(), StackStep::Redone { .. }));
    assert!(!s.scene().is_alive(body));
}

#[test]
fn structural_edit_with_hierarchy_round_trips() {
    let mut s = session();
    let (obj, body) = with_body(&mut s, 0);
    s.record_object(obj, true, "Add child").unwrap();
    let child = s.scene_mut().create_object("child", Some(obj)).unwrap();
    s.scene_mut().remove_component(body).unwrap();
    s.end_frame();

    s.undo();
    assert!(!s.scene().is_alive(child));
    assert!(s.scene().is_alive(body));
    assert!(s.scene().children(obj).unwrap().is_empty());

    s.redo();
    assert!(s.scene().is_alive(child));
    assert!(!s.scene().is_alive(body));
}

#[test]
fn shallow_record_ignores_children_list() {
    let mut s = session();
    let parent = s.scene_mut().create_object("parent", None).unwrap();
    let child = s.scene_mut().create_object("child", Some(parent)).unwrap();

    s.record_object(parent, false, "Detach child").unwrap();
    s.scene_mut().set_parent(child, None).unwrap();
    let report = s.end_frame();
    assert!(report.is_empty());
    assert_eq!(report.dropped_empty, 1);
    assert!(s.undo().is_nothing());
}

#[test]
fn reparent_is_undone_through_the_moved_object() {
    let mut s = session();
    let parent = s.scene_mut().create_object("parent", None).unwrap();
    let child = s.scene_mut().create_object("child", Some(parent)).unwrap();

    s.record_object(child, false, "Detach child").unwrap();
    s.scene_mut().set_parent(child, None).unwrap();
    assert_eq!(s.end_frame().committed.len(), 1);

    s.undo();
    assert_eq!(s.scene().parent(child).unwrap(), Some(parent));
    assert_eq!(s.scene().children(parent).unwrap(), &[child]);
    assert_eq!(s.scene().roots(), &[parent]);

    s.redo();
    assert_eq!(s.scene().parent(child).unwrap(), None);
    assert!(s.scene().children(parent).unwrap().is_empty());
}

// -- 4. Hooks ---------------------------------------------------------------

#[test]
fn hooks_see_select_focus_refresh() {
    let log = HookLog::default();
    let mut s = EditorSession::with_hooks(SessionConfig::default(), Box::new(log.clone())).unwrap();
    s.scene_mut().register_component::<Body>();
    let (obj, body) = with_body(&mut s, 0);

    s.record_component(body, Some("x")).unwrap();
    s.scene_mut().component_mut::<Body>(body).unwrap().x = 2;
    s.end_frame();
    s.undo();

    assert_eq!(
        *log.0.borrow(),
        vec![
            format!("select [{obj}]"),
            format!("focus {obj} body.x"),
            "refresh".to_owned(),
        ]
    );
}

#[test]
fn history_serializes_to_json() {
    let mut s = session();
    let obj = s.scene_mut().create_object("a", None).unwrap();
    let rename = RenameObject::new(s.scene(), obj, "b").unwrap();
    s.execute(Box::new(rename));
    s.undo();

    let json = serde_json::to_value(s.undo_stack().history()).unwrap();
    assert_eq!(json[0]["description"], "Rename scene object 'a' to 'b'");
    assert_eq!(json[0]["applied"], false);
}
