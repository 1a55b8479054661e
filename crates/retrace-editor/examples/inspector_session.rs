//! Scripted inspector session -- records a few edits, then walks the undo
//! history back and forth while printing the scene.
//!
//! Run with:
//!   cargo run --example inspector_session -p retrace-editor
//!
//! Set `RUST_LOG=retrace_editor=debug` to see commands being registered.

use anyhow::Result;
use retrace_editor::logging;
use retrace_editor::prelude::*;

// ---------------------------------------------------------------------------
// Component types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
struct PointLight {
    intensity: f32,
    color: [f32; 3],
}

impl Serializable for PointLight {
    const TYPE_NAME: &'static str = "point_light";
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::new("intensity", FieldKind::Float),
        FieldDescriptor::new("color", FieldKind::List(&FieldKind::Float)),
    ];
}

/// Prints what the undo stack asks the inspector to show.
struct PrintHooks;

impl EditorHooks for PrintHooks {
    fn select(&mut self, objects: &[SceneObjectId]) {
        println!("  inspector: select {objects:?}");
    }

    fn focus_field(&mut self, object: SceneObjectId, path: &str) {
        println!("  inspector: focus {object} {path}");
    }
}

fn print_scene(session: &EditorSession) -> Result<()> {
    let scene = session.scene();
    for &root in scene.roots() {
        let header = scene.header(root)?;
        println!(
            "  {root} '{}' at ({:.1}, {:.1}, {:.1}) active={}",
            header.name, header.position.x, header.position.y, header.position.z, header.active
        );
        for &component in scene.components_of(root)? {
            println!("    {component}: {}", scene.component_value(component)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let config = SessionConfig::from_json_str(r#"{ "undo": { "capacity": 16 } }"#)?;
    logging::init(&config.log_filter);

    let mut session = EditorSession::with_hooks(config, Box::new(PrintHooks))?;
    session.scene_mut().register_component::<PointLight>();

    let create = CreateObject::new("lamp", None);
    session.execute(Box::new(create));
    let lamp = session.scene().roots()[0];
    let light = session.scene_mut().add_component(
        lamp,
        PointLight {
            intensity: 1.0,
            color: [1.0, 1.0, 1.0],
        },
    )?;

    // Frame 1: drag the intensity slider.
    session.record_component(light, Some("intensity"))?;
    let point = session.scene_mut().component_mut::<PointLight>(light)?;
    point.intensity = 4.0;
    session.end_frame();

    // Frame 2: pick a warmer color and move the lamp.
    session.record_component(light, Some("color[2]"))?;
    let point = session.scene_mut().component_mut::<PointLight>(light)?;
    point.color[2] = 0.6;
    session.record_header(lamp, Some(HeaderField::Position))?;
    let raised = Vec3::new(0.0, 3.0, 0.0);
    session.scene_mut().set_position(lamp, raised)?;
    session.end_frame();

    println!("after editing:");
    print_scene(&session)?;

    println!("history:");
    for entry in session.undo_stack().history() {
        println!("  {} {}", entry.id, entry.description);
    }

    while let StackStep::Undone { description, .. } = session.undo() {
        println!("undo '{description}':");
        print_scene(&session)?;
    }

    while let StackStep::Redone { description, .. } = session.redo() {
        println!("redo '{description}':");
        print_scene(&session)?;
    }

    Ok(())
}
