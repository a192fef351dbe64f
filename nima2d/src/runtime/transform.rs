use crate::{Actor, Component, ComponentKind, Error};
use glam::{Affine2, Vec2};

/// Inverse of `affine`, or `None` when its linear part is singular.
pub fn try_inverse(affine: &Affine2) -> Option<Affine2> {
    let det = affine.matrix2.determinant();
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    Some(affine.inverse())
}

pub(crate) fn invert_world(actor: &Actor, component: usize) -> Result<Affine2, Error> {
    let world = world_transform(actor, component);
    try_inverse(&world).ok_or_else(|| {
        log::warn!("failed to invert world transform of component {component}: {world:?}");
        Error::SingularTransform { component }
    })
}

pub(crate) fn world_transform(actor: &Actor, component: usize) -> Affine2 {
    actor
        .component(component)
        .and_then(Component::node)
        .map_or(Affine2::IDENTITY, |node| node.world_transform)
}

pub(crate) fn world_translation(actor: &Actor, component: usize) -> Option<Vec2> {
    actor
        .component(component)
        .and_then(Component::node)
        .map(|node| node.world_translation())
}

fn compose(kind: &mut ComponentKind, parent_world: Affine2) -> Affine2 {
    let override_world = kind.image().and_then(|image| image.world_override);
    let Some(node) = kind.node_mut() else {
        return parent_world;
    };
    node.world_transform = override_world.unwrap_or_else(|| parent_world * node.local_transform());
    node.transform_dirty = false;
    node.world_transform
}

impl Actor {
    /// Recomputes the world transform of every node from the root down.
    ///
    /// Components without a transform pass their parent's world on to their children.
    /// Components whose parent could not be resolved are treated as roots.
    pub fn update_world_transforms(&mut self) {
        let mut stack: Vec<(usize, Affine2)> = self
            .live_components()
            .filter(|c| c.parent.is_none())
            .map(|c| (c.index, Affine2::IDENTITY))
            .rev()
            .collect();
        let mut visited = vec![false; self.components.len()];

        while let Some((index, parent_world)) = stack.pop() {
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }
            let Some(component) = self.component_mut(index) else {
                continue;
            };
            let world = compose(&mut component.kind, parent_world);
            stack.extend(component.children.iter().rev().map(|&child| (child, world)));
        }
    }

    /// One runtime step: world transforms, every jelly driver, then world transforms
    /// again so the jelly followers pick up their new local transforms.
    pub fn update(&mut self) {
        self.update_world_transforms();
        let jellies: Vec<usize> = self
            .live_components()
            .filter(|c| matches!(c.kind, ComponentKind::Jelly(_)))
            .map(|c| c.index)
            .collect();
        for jelly in jellies {
            if let Err(e) = self.update_jelly_in_point(jelly) {
                log::warn!("jelly {jelly} update abandoned: {e}");
            }
        }
        self.update_world_transforms();
    }
}
