use nima2d::{Actor, ComponentKind};
use serde_json::json;
use std::path::PathBuf;

fn kind_name(kind: &ComponentKind) -> &'static str {
    match kind {
        ComponentKind::Node(_) => "node",
        ComponentKind::Bone(_) => "bone",
        ComponentKind::RootBone(_) => "rootBone",
        ComponentKind::JellyBone(_) => "jellyBone",
        ComponentKind::Jelly(_) => "jelly",
        ComponentKind::SoloNode(_) => "solo",
        ComponentKind::Image(_) => "image",
        ComponentKind::ImageSequence(_) => "imageSequence",
        ComponentKind::NestedActorNode(_) => "nestedActor",
        ComponentKind::Collider(_) => "collider",
        ComponentKind::Event => "event",
        ComponentKind::CustomProperty(_) => "customProperty",
        ComponentKind::IkTarget(_) => "ikTarget",
        ComponentKind::IkConstraint(_) => "ikConstraint",
        ComponentKind::DistanceConstraint(_) => "distanceConstraint",
        ComponentKind::TransformConstraint(_) => "transformConstraint",
        ComponentKind::TranslationConstraint(_) => "translationConstraint",
        ComponentKind::ScaleConstraint(_) => "scaleConstraint",
        ComponentKind::RotationConstraint(_) => "rotationConstraint",
    }
}

fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let path = args
        .first()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./assets/actor.nma"));
    let animation = args.get(1).cloned();
    let time: f64 = args
        .get(2)
        .and_then(|t| t.parse().ok())
        .unwrap_or(0.0);

    let bytes = std::fs::read(&path).expect("read actor file");
    let mut actor = Actor::from_bytes(&bytes).expect("parse actor header");
    if let Some(error) = &actor.error {
        eprintln!("decoded with errors: {error}");
    }
    actor.update();

    let components: Vec<_> = actor
        .components
        .iter()
        .enumerate()
        .map(|(i, component)| match component {
            None => json!({ "i": i, "missing": true }),
            Some(c) => {
                let world = c.node().map(|n| n.world_transform.to_cols_array());
                json!({
                    "i": i,
                    "name": c.name,
                    "kind": kind_name(&c.kind),
                    "parent": c.parent,
                    "children": c.children,
                    "world": world,
                })
            }
        })
        .collect();

    let animations: Vec<_> = actor
        .animations
        .iter()
        .map(|a| {
            let sampled = (animation.as_deref() == Some(a.name.as_str())).then(|| {
                a.components
                    .iter()
                    .flat_map(|c| {
                        c.properties.iter().map(move |p| {
                            json!({
                                "component": c.component_index,
                                "property": p.property.name(),
                                "value": p.scalar_at(time),
                            })
                        })
                    })
                    .collect::<Vec<_>>()
            });
            json!({
                "name": a.name,
                "fps": a.fps,
                "duration": a.duration,
                "loop": a.is_looping,
                "keyed": a.components.len(),
                "triggers": a.trigger_components.len(),
                "sampled": sampled,
            })
        })
        .collect();

    let out = json!({
        "version": actor.version,
        "components": components,
        "animations": animations,
        "atlases": actor.atlases.len(),
        "nestedActors": actor
            .nested_actor_assets
            .iter()
            .map(|a| json!({ "name": a.name, "id": a.id }))
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&out).expect("serialize dump"));
}
