use super::transform::invert_world;
use crate::resolve::resolve_hierarchy;
use crate::test_support::assert_approx;
use crate::{Actor, Component, ComponentKind, Error, Image, Node, try_inverse};
use glam::{Affine2, Vec2};
use std::f32::consts::FRAC_PI_2;

fn push(actor: &mut Actor, parent: u16, kind: ComponentKind) -> usize {
    let name = format!("c{}", actor.components.len());
    actor.push_component(Some(Component::new(name, parent, kind)))
}

fn node(translation: Vec2, rotation: f32) -> ComponentKind {
    ComponentKind::Node(Node {
        translation,
        rotation,
        ..Node::default()
    })
}

fn world(actor: &Actor, index: usize) -> Vec2 {
    actor.component(index).unwrap().node().unwrap().world_translation()
}

#[test]
fn world_is_parent_times_local() {
    let mut actor = Actor::new(15);
    let a = push(&mut actor, 0, node(Vec2::new(10.0, 0.0), FRAC_PI_2));
    let b = push(&mut actor, a as u16, node(Vec2::new(5.0, 0.0), 0.0));
    resolve_hierarchy(&mut actor);
    actor.update_world_transforms();

    let p = world(&actor, b);
    assert_approx(p.x, 10.0, 1e-4, "b.x");
    assert_approx(p.y, 5.0, 1e-4, "b.y");
    assert!(!actor.component(b).unwrap().node().unwrap().transform_dirty);
}

#[test]
fn transformless_components_pass_their_parent_world_through() {
    let mut actor = Actor::new(15);
    let a = push(&mut actor, 0, node(Vec2::new(10.0, 0.0), 0.0));
    let event = push(&mut actor, a as u16, ComponentKind::Event);
    let c = push(&mut actor, event as u16, node(Vec2::new(1.0, 2.0), 0.0));
    resolve_hierarchy(&mut actor);
    actor.update_world_transforms();

    assert_eq!(world(&actor, c), Vec2::new(11.0, 2.0));
}

#[test]
fn image_world_override_wins() {
    let mut actor = Actor::new(15);
    let a = push(&mut actor, 0, node(Vec2::new(10.0, 10.0), 0.0));
    let image = Image {
        node: Node {
            translation: Vec2::new(1.0, 1.0),
            ..Node::default()
        },
        world_override: Some(Affine2::from_translation(Vec2::new(3.0, 4.0))),
        ..Image::default()
    };
    let i = push(&mut actor, a as u16, ComponentKind::Image(image));
    resolve_hierarchy(&mut actor);
    actor.update_world_transforms();

    assert_eq!(world(&actor, i), Vec2::new(3.0, 4.0));
}

#[test]
fn unresolved_parents_are_treated_as_roots() {
    let mut actor = Actor::new(15);
    actor.push_component(None);
    let orphan = push(&mut actor, 1, node(Vec2::new(7.0, -2.0), 0.0));
    resolve_hierarchy(&mut actor);
    actor.update_world_transforms();

    assert_eq!(actor.component(orphan).unwrap().parent, None);
    assert_eq!(world(&actor, orphan), Vec2::new(7.0, -2.0));
}

#[test]
fn inverse_rejects_singular_matrices() {
    let flat = Affine2::from_scale(Vec2::new(0.0, 1.0));
    assert!(try_inverse(&flat).is_none());

    let m = Affine2::from_scale_angle_translation(Vec2::new(2.0, 0.5), 0.3, Vec2::new(4.0, 1.0));
    let inv = try_inverse(&m).unwrap();
    let p = (m * inv).transform_point2(Vec2::new(3.0, -6.0));
    assert_approx(p.x, 3.0, 1e-4, "x");
    assert_approx(p.y, -6.0, 1e-4, "y");
}

#[test]
fn collapsed_world_reports_the_component() {
    let mut actor = Actor::new(15);
    let a = push(
        &mut actor,
        0,
        ComponentKind::Node(Node {
            scale: Vec2::ZERO,
            ..Node::default()
        }),
    );
    resolve_hierarchy(&mut actor);
    actor.update_world_transforms();

    assert!(matches!(
        invert_world(&actor, a),
        Err(Error::SingularTransform { component }) if component == a
    ));
    assert!(invert_world(&actor, 0).is_ok());
}

#[test]
fn emptied_arena_has_no_root() {
    let mut actor = Actor::new(15);
    assert_eq!(actor.root().map(|r| r.name.as_str()), Some("Root"));
    assert_eq!(actor.root().map(|r| r.index), Some(crate::ROOT_COMPONENT));

    actor.components.clear();
    assert!(actor.root().is_none());
    actor.update();
}
