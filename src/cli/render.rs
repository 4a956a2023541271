//! Terminal rendering of trees, frames, layouts and statistics

use itertools::Itertools;

use crate::application::{AnimationEvent, Frame, Session};
use crate::cli::output;
use crate::domain::{BstNode, ToTermTree, Viewport};

/// Tree with the session's current highlights applied.
pub fn tree_text(session: &Session) -> String {
    session
        .tree()
        .to_tree_string_with(&|node: &BstNode| {
            let label = node.key.to_string();
            match session.highlight_of(node.id) {
                Some(class) => format!("{} [{}]", output::highlighted(&label, class), class),
                None => label,
            }
        })
        .to_string()
}

pub fn print_tree(session: &Session) {
    print!("{}", tree_text(session));
}

pub fn print_stats(session: &Session) {
    let stats = session.stats();
    output::action("Height", &stats.height);
    output::action("Nodes", &stats.count);
    output::action(
        "Steps",
        &stats.steps.map_or_else(|| "-".to_string(), |s| s.to_string()),
    );
    output::action("Complexity", &stats.verdict);
}

/// One line per frame; layout changes also redraw the tree.
pub fn print_frame(session: &Session, frame: &Frame) {
    match &frame.event {
        AnimationEvent::ClearHighlights => {}
        AnimationEvent::Highlight { node, class } => {
            let key = session
                .tree()
                .key_of(*node)
                .map_or_else(|| node.to_string(), |k| k.to_string());
            output::detail(&format!("{} {}", output::highlighted("●", *class), key));
        }
        AnimationEvent::Relayout(_) => print_tree(session),
        AnimationEvent::Notice(notice) => output::info(notice),
        AnimationEvent::Finished(report) => {
            tracing::debug!("finished: {:?}", report);
        }
    }
}

/// Coordinates in increasing x, then canvas extent and optional fit scale.
pub fn print_layout(session: &Session, viewport: Option<Viewport>) {
    let layout = session.layout();
    let tree = session.tree();
    output::header("Layout");
    if layout.is_empty() {
        output::detail("(empty tree)");
    }
    for pos in layout.iter() {
        let key = tree
            .key_of(pos.node)
            .map_or_else(|| "?".to_string(), |k| k.to_string());
        output::detail(&format!(
            "{:<6} key={:<8} x={:>8.1} y={:>7.1} depth={}",
            pos.node.to_string(),
            key,
            pos.x,
            pos.y,
            pos.depth
        ));
    }
    let edges = tree
        .edges()
        .into_iter()
        .map(|(p, c)| format!("{}→{}", p, c))
        .join(", ");
    if !edges.is_empty() {
        output::action("Edges", &edges);
    }
    output::action(
        "Canvas",
        &format!("{:.1}x{:.1}", layout.canvas_width, layout.canvas_height),
    );
    if let Some(viewport) = viewport {
        output::action(
            "Fit scale",
            &format!("{:.3} (viewport {})", layout.fit_scale(viewport), viewport),
        );
    }
}
