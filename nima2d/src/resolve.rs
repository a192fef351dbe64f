//! Wires the flat component arena into a hierarchy.
//!
//! Components reference each other by arena index and may point forward, so nothing is
//! resolved while decoding. Once a components block is fully read, pass 1 attaches
//! children to parents and turns every cross-reference into a resolved index; pass 2
//! then derives the links that depend on the finished hierarchy (first child bone,
//! jelly follower chains).

use crate::{Actor, Component, ComponentKind, ROOT_COMPONENT};

fn live(components: &[Option<Component>], index: u16) -> Option<usize> {
    let index = index as usize;
    components.get(index)?.as_ref().map(|_| index)
}

/// Optional links use the root slot for "none".
fn live_optional(components: &[Option<Component>], index: u16) -> Option<usize> {
    if index as usize == ROOT_COMPONENT {
        None
    } else {
        live(components, index)
    }
}

fn resolve_list(components: &[Option<Component>], indices: &[u16]) -> Vec<usize> {
    indices
        .iter()
        .filter_map(|&index| live(components, index))
        .collect()
}

fn resolve_references(kind: &mut ComponentKind, components: &[Option<Component>]) {
    match kind {
        ComponentKind::Jelly(jelly) => {
            jelly.in_target = live_optional(components, jelly.in_target_index);
            jelly.out_target = live_optional(components, jelly.out_target_index);
        }
        ComponentKind::IkTarget(target) => {
            target.bones = resolve_list(components, &target.bone_indices);
        }
        ComponentKind::IkConstraint(ik) => {
            ik.bones = resolve_list(components, &ik.bone_indices);
        }
        ComponentKind::Image(image) | ComponentKind::ImageSequence(image) => {
            for connection in &mut image.connected_bones {
                connection.component = live(components, connection.component_index);
            }
        }
        _ => {}
    }
    if let Some(constraint) = kind.constraint_mut() {
        constraint.target = live_optional(components, constraint.target_index);
    }
}

/// Pass 1: parent/child links and cross-reference indices.
fn resolve_indices(actor: &mut Actor) {
    for component in actor.components.iter_mut().flatten() {
        component.parent = None;
        component.children.clear();
    }

    let links: Vec<(usize, usize)> = actor
        .live_components()
        .filter_map(|c| {
            let parent = live(&actor.components, c.parent_index)?;
            (parent != c.index).then_some((c.index, parent))
        })
        .collect();
    for (child, parent) in links {
        if let Some(component) = actor.component_mut(child) {
            component.parent = Some(parent);
        }
        if let Some(component) = actor.component_mut(parent) {
            component.children.push(child);
        }
    }

    for index in 0..actor.components.len() {
        // Taken out while resolving so the rest of the arena can be read; a component
        // referencing itself therefore resolves to nothing.
        let Some(mut component) = actor.components[index].take() else {
            continue;
        };
        resolve_references(&mut component.kind, &actor.components);
        actor.components[index] = Some(component);
    }
}

/// Pass 2: links that need the finished hierarchy.
fn complete_resolve(actor: &mut Actor) {
    for index in 0..actor.components.len() {
        let Some(component) = actor.component(index) else {
            continue;
        };
        match &component.kind {
            ComponentKind::Bone(_) | ComponentKind::JellyBone(_) => {
                let first_bone = component.children.iter().copied().find(|&child| {
                    matches!(
                        actor.component(child).map(|c| &c.kind),
                        Some(ComponentKind::Bone(_))
                    )
                });
                if let Some(bone) = actor.component_mut(index).and_then(|c| c.kind.bone_mut()) {
                    bone.first_bone = first_bone;
                }
            }
            ComponentKind::Jelly(_) => {
                let Some(bone_index) = component.parent else {
                    continue;
                };
                let Some(bone) = actor.component(bone_index) else {
                    continue;
                };
                if bone.kind.bone().is_none() {
                    log::debug!("jelly {index} is not parented to a bone");
                    continue;
                }
                let followers: Vec<usize> = bone
                    .children
                    .iter()
                    .copied()
                    .filter(|&child| {
                        matches!(
                            actor.component(child).map(|c| &c.kind),
                            Some(ComponentKind::JellyBone(_))
                        )
                    })
                    .collect();

                if let Some(bone) = actor
                    .component_mut(bone_index)
                    .and_then(|c| c.kind.bone_mut())
                {
                    bone.jelly = Some(index);
                }
                if let Some(ComponentKind::Jelly(jelly)) =
                    actor.component_mut(index).map(|c| &mut c.kind)
                {
                    jelly.bones = followers;
                }
            }
            _ => {}
        }
    }
}

pub(crate) fn resolve_hierarchy(actor: &mut Actor) {
    resolve_indices(actor);
    complete_resolve(actor);
}

/// Nested actor nodes point at assets, which may be declared after the components.
pub(crate) fn link_nested_actors(actor: &mut Actor) {
    let asset_count = actor.nested_actor_assets.len();
    for component in actor.components.iter_mut().flatten() {
        if let ComponentKind::NestedActorNode(nested) = &mut component.kind {
            let index = nested.asset_index as usize;
            nested.asset = (nested.is_visible && index < asset_count).then_some(index);
        }
    }
}
