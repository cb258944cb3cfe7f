use anyhow::{Context, Result};
use log::info;
use vantage_engine::logging::{LoggingConfig, init_logging};
use vantage_engine::scene::{GenericNode, MemoryScene, Node, NodeId, SceneStore, Screenshot};
use vantage_views::SceneViewsController;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║        VANTAGE SCENE VIEWS v0.1        ║");
    println!("  ╚════════════════════════════════════════╝");
    println!();

    let mut scene = MemoryScene::new();
    let camera = scene
        .add_node(GenericNode::new("Camera").with_property("position", "0,2,10").into())
        .context("adding the camera")?;
    scene
        .add_node(GenericNode::new("Sun").with_property("elevation", "35").into())
        .context("adding the light")?;

    let mut views = SceneViewsController::with_scene(scene);
    views.set_observer(|| info!("tree view refreshed"));

    let thumbnail = Screenshot::new(64, 36);
    let front = views.create("Front", "establishing shot", 0, Some(&thumbnail))?;
    views.create("", "auto-named", 0, Some(&thumbnail))?;

    // ── grouping ──────────────────────────────────────────────────────────
    views.add_hierarchy().context("adding a hierarchy")?;
    let detail = views.create("Detail", "close-up", 1, Some(&thumbnail))?;
    views.set_active_hierarchy(None)?;
    let overhead = views.create("Overhead", "", 0, Some(&thumbnail))?;

    // ── ordering ──────────────────────────────────────────────────────────
    views.move_up(overhead.as_str());
    views.move_down(front.as_str());

    // ── restore ───────────────────────────────────────────────────────────
    let scene = views.scene_mut().context("scene detached")?;
    if let Some(Node::Generic(node)) = scene.node_mut(&camera) {
        node.set_property("position", "8,8,8");
    }
    views.restore(&detail)?;

    let scene = views.scene().context("scene detached")?;
    println!("{}", render_tree(scene));
    let position = scene
        .node(&camera)
        .and_then(Node::as_generic)
        .and_then(|c| c.property("position"))
        .unwrap_or("?");
    println!("  camera position after restoring {}: {position}", views.name(&detail)?);
    println!();
    Ok(())
}

/// Indented listing of the hierarchy, with proxies labelled by the scene
/// view they stand for.
fn render_tree<S: SceneStore>(scene: &S) -> String {
    let mut out = String::new();
    render_children(scene, None, 1, &mut out);
    out
}

fn render_children<S: SceneStore>(
    scene: &S,
    parent: Option<&NodeId>,
    depth: usize,
    out: &mut String,
) {
    for id in scene.children(parent) {
        let Some(h) = scene.hierarchy(&id) else { continue };
        let indent = "  ".repeat(depth);
        match h.associated_node_id.as_ref().and_then(|c| scene.scene_view(c)) {
            Some(view) => out.push_str(&format!("{indent}- {} ({})\n", view.name, id)),
            None => out.push_str(&format!("{indent}+ {}\n", h.name)),
        }
        render_children(scene, Some(&id), depth + 1, out);
    }
}
