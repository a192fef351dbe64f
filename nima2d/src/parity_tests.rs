//! The binary and JSON encodings of one actor must decode to the same result.

use crate::test_support::BinaryWriter;
use crate::{
    Actor, AtlasSource, BlockType, ComponentKind, DistanceMode, DrawOrderEntry, Interpolation,
    KeyFrameValue, PropertyType, TransformSpace,
};
use serde_json::{Value, json};

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn node_json(name: &str, parent: u16, translation: [f32; 2], extra: Value) -> Value {
    let mut base = json!({
        "name": name,
        "parent": parent,
        "translation": translation,
        "rotation": 0.0,
        "scale": [1.0, 1.0],
        "opacity": 1.0,
        "isCollapsed": false
    });
    if let (Some(base), Value::Object(extra)) = (base.as_object_mut(), extra) {
        base.extend(extra);
    }
    base
}

fn binary_fixture() -> Vec<u8> {
    let mut w = BinaryWriter::actor(15);
    w.block(BlockType::Components, |c| {
        c.u16(15);
        c.block(BlockType::Node, |b| {
            b.node("root_node", 0, [0.0, 0.0], 0.0);
        });
        c.block(BlockType::Bone, |b| {
            b.bone("upper", 1, [10.0, 0.0], 0.0, 100.0);
        });
        c.block(BlockType::Jelly, |b| {
            b.header("upper_jelly", 2)
                .f32(1.0)
                .f32(1.0)
                .f32(1.0)
                .f32(0.5)
                .u16(0)
                .u16(0);
        });
        for name in ["jb0", "jb1", "jb2"] {
            c.block(BlockType::JellyBone, |b| {
                b.header(name, 2).f32(1.0).bool(false);
            });
        }
        c.block(BlockType::Bone, |b| {
            b.bone("lower", 2, [100.0, 0.0], 0.0, 50.0);
        });
        c.block(BlockType::Image, |b| {
            b.node("skin", 1, [0.0, 0.0], 0.0)
                .bool(true)
                .u8(0)
                .u16(1)
                .u8(0)
                .u8(1)
                .u16(2)
                .f32s(&IDENTITY)
                .f32s(&IDENTITY)
                .u32(1)
                .f32s(&[0.25; 12])
                .u32(0);
        });
        c.block(BlockType::IkConstraint, |b| {
            b.header("reach", 7)
                .f32(0.75)
                .bool(true)
                .u16(10)
                .bool(false)
                .u8(2)
                .u16(2)
                .u16(7);
        });
        c.block(BlockType::Node, |b| {
            b.node("goal", 1, [150.0, 20.0], 0.0);
        });
        c.block(BlockType::Event, |b| {
            b.header("footstep", 1);
        });
        c.block(BlockType::CustomIntProperty, |b| {
            b.header("hp", 1).i32(42);
        });
        c.block(BlockType::NestedActorNode, |b| {
            b.node("hat", 1, [0.0, 0.0], 0.0).u8(1).u16(3).u16(0);
        });
        c.block(BlockType::DistanceConstraint, |b| {
            b.header("leash", 7)
                .f32(1.0)
                .bool(true)
                .u16(10)
                .f32(25.0)
                .u8(2);
        });
        c.block(BlockType::RotationConstraint, |b| {
            b.header("spin", 7)
                .f32(0.5)
                .bool(false)
                .u16(0)
                .bool(true)
                .f32(2.0)
                .bool(false)
                .bool(true)
                .f32(1.5)
                .bool(true)
                .u8(1)
                .u8(0)
                .u8(1);
        });
    });
    w.block(BlockType::Animations, |a| {
        a.u16(1);
        a.block(BlockType::Animation, |b| {
            b.string("walk").u8(24).f32(2.0).bool(true);
            b.u16(5);

            b.u16(2).u16(2);
            b.property(PropertyType::Rotation, |p| {
                p.u16(2);
                p.f64(0.0).u8(2).f64(0.25).f32(0.0).f64(0.25).f32(0.5).f32(0.0);
                p.f64(1.0).u8(1).f32(1.0);
            });
            b.property(PropertyType::PosX, |p| {
                p.u16(2);
                p.f64(0.0).u8(0).f64(0.0).f32(0.0).f32(5.0);
                p.f64(1.0).u8(1).f32(10.0);
            });

            b.u16(11).u16(1);
            b.property(PropertyType::Trigger, |p| {
                p.u16(1).f64(0.5);
            });

            b.u16(1).u16(1);
            b.property(PropertyType::DrawOrder, |p| {
                p.u16(1).f64(0.0).u16(1).u16(8).u16(2);
            });

            b.u16(12).u16(1);
            b.property(PropertyType::IntProperty, |p| {
                p.u16(1).f64(0.0).u8(1).i32(7);
            });

            b.u16(99).u16(1);
            b.property(PropertyType::PosY, |p| {
                p.u16(1).f64(0.0).u8(1).f32(3.0);
            });
        });
    });
    w.block(BlockType::Atlases, |b| {
        b.bool(true).u16(2).string("a.png").string("b.png");
    });
    w.block(BlockType::NestedActorAssets, |n| {
        n.u16(1);
        n.block(BlockType::NestedActorAsset, |b| {
            b.string("hat").string("hat-01");
        });
    });
    w.into_bytes()
}

fn json_fixture() -> Value {
    json!({
        "version": 15,
        "blocks": [
            { "components": [
                { "node": node_json("root_node", 0, [0.0, 0.0], json!({})) },
                { "bone": node_json("upper", 1, [10.0, 0.0], json!({ "length": 100.0 })) },
                { "jelly": {
                    "name": "upper_jelly", "parent": 2,
                    "easeIn": 1.0, "easeOut": 1.0, "scaleIn": 1.0, "scaleOut": 0.5,
                    "inTarget": 0, "outTarget": 0
                } },
                { "jellyBone": {
                    "name": "jb0", "parent": 2, "opacity": 1.0, "isCollapsed": false
                } },
                { "jellyBone": {
                    "name": "jb1", "parent": 2, "opacity": 1.0, "isCollapsed": false
                } },
                { "jellyBone": {
                    "name": "jb2", "parent": 2, "opacity": 1.0, "isCollapsed": false
                } },
                { "bone": node_json("lower", 2, [100.0, 0.0], json!({ "length": 50.0 })) },
                { "image": node_json("skin", 1, [0.0, 0.0], json!({
                    "isVisible": true,
                    "blendMode": 0,
                    "drawOrder": 1,
                    "atlas": 0,
                    "bones": [ { "component": 2, "bind": IDENTITY } ],
                    "worldTransform": IDENTITY,
                    "numVertices": 1,
                    "vertices": vec![0.25_f32; 12],
                    "numTriangles": 0,
                    "triangles": []
                })) },
                { "ikConstraint": {
                    "name": "reach", "parent": 7, "strength": 0.75, "isEnabled": true,
                    "target": 10, "isInverted": false, "bones": [2, 7]
                } },
                { "node": node_json("goal", 1, [150.0, 20.0], json!({})) },
                { "event": { "name": "footstep", "parent": 1 } },
                { "customInt": { "name": "hp", "parent": 1, "int": 42 } },
                { "nestedActor": node_json("hat", 1, [0.0, 0.0], json!({
                    "isVisible": 1, "drawOrder": 3, "assetIndex": 0
                })) },
                { "distanceConstraint": {
                    "name": "leash", "parent": 7, "strength": 1.0, "isEnabled": true,
                    "target": 10, "distance": 25.0, "modeId": 2
                } },
                { "rotationConstraint": {
                    "name": "spin", "parent": 7, "strength": 0.5, "isEnabled": false,
                    "target": 0, "copy": true, "scale": 2.0, "enableMin": false,
                    "enableMax": true, "max": 1.5, "offset": true,
                    "sourceSpaceId": 1, "destSpaceId": 0, "minMaxSpaceId": 1
                } }
            ] },
            { "animations": [
                { "animation": {
                    "name": "walk", "fps": 24, "duration": 2.0, "isLooping": true,
                    "keyed": [
                        { "component": 2, "properties": [
                            { "rotation": { "frames": [
                                { "time": 0.0, "type": 2, "inFactor": 0.25, "inValue": 0.0,
                                  "outFactor": 0.25, "outValue": 0.5, "value": 0.0 },
                                { "time": 1.0, "type": 1, "value": 1.0 }
                            ] } },
                            { "posX": { "frames": [
                                {
                                    "time": 0.0, "type": 0,
                                    "inFactor": 0.0, "inValue": 0.0, "value": 5.0
                                },
                                { "time": 1.0, "type": 1, "value": 10.0 }
                            ] } }
                        ] },
                        { "component": 11, "properties": [
                            { "trigger": { "frames": [ { "time": 0.5 } ] } }
                        ] },
                        { "component": 1, "properties": [
                            { "drawOrder": { "frames": [
                                { "time": 0.0, "drawOrder": [ { "component": 8, "order": 2 } ] }
                            ] } }
                        ] },
                        { "component": 12, "properties": [
                            { "intProperty": { "frames": [
                                { "time": 0.0, "type": 1, "value": 7 }
                            ] } }
                        ] },
                        { "component": 99, "properties": [
                            { "posY": { "frames": [ { "time": 0.0, "type": 1, "value": 3.0 } ] } }
                        ] }
                    ]
                } }
            ] },
            { "atlases": { "isOOB": true, "data": ["a.png", "b.png"] } },
            { "nestedActorAssets": [
                { "nestedActorAsset": { "name": "hat", "id": "hat-01" } }
            ] }
        ]
    })
}

fn decode_both() -> (Actor, Actor) {
    let binary = Actor::from_binary(&binary_fixture()).unwrap();
    let json = Actor::from_json_value(&json_fixture()).unwrap();
    assert!(binary.error.is_none(), "binary: {:?}", binary.error);
    assert!(json.error.is_none(), "json: {:?}", json.error);
    (binary, json)
}

#[test]
fn encodings_decode_identically() {
    let (binary, json) = decode_both();
    assert_eq!(binary.version, json.version);
    assert_eq!(binary.components, json.components);
    assert_eq!(binary.animations, json.animations);

    let sources = |actor: &Actor| -> Vec<Option<AtlasSource>> {
        actor.atlases.iter().map(|a| a.source.clone()).collect()
    };
    assert_eq!(sources(&binary), sources(&json));
    assert_eq!(
        sources(&binary),
        vec![
            Some(AtlasSource::Uri("a.png".to_string())),
            Some(AtlasSource::Uri("b.png".to_string()))
        ]
    );

    let names = |actor: &Actor| -> Vec<(String, String)> {
        actor
            .nested_actor_assets
            .iter()
            .map(|a| (a.name.clone(), a.id.clone()))
            .collect()
    };
    assert_eq!(names(&binary), names(&json));
}

#[test]
fn cross_references_resolve() {
    let (actor, _) = decode_both();

    let upper = actor.component(2).unwrap().kind.bone().unwrap();
    assert_eq!(upper.first_bone, Some(7));
    assert_eq!(upper.jelly, Some(3));
    assert_eq!(actor.jelly(3).unwrap().bones, vec![4, 5, 6]);
    assert_eq!(actor.jelly(3).unwrap().in_target, None);

    let ComponentKind::IkConstraint(ik) = &actor.component(9).unwrap().kind else {
        panic!("expected an IK constraint");
    };
    assert_eq!(ik.bones, vec![2, 7]);
    assert_eq!(ik.constraint.target, Some(10));

    let ComponentKind::DistanceConstraint(leash) = &actor.component(14).unwrap().kind else {
        panic!("expected a distance constraint");
    };
    assert_eq!(leash.mode, DistanceMode::Exact);
    assert_eq!(leash.constraint.target, Some(10));

    let ComponentKind::RotationConstraint(spin) = &actor.component(15).unwrap().kind else {
        panic!("expected a rotation constraint");
    };
    assert_eq!(spin.constraint.target, None);
    assert!(spin.limits.copy);
    assert_eq!(spin.limits.scale, 2.0);
    assert!(!spin.limits.enable_min);
    assert_eq!(spin.limits.max, 1.5);
    assert_eq!(spin.source_space, TransformSpace::Local);
    assert_eq!(spin.min_max_space, TransformSpace::Local);

    let ComponentKind::NestedActorNode(hat) = &actor.component(13).unwrap().kind else {
        panic!("expected a nested actor node");
    };
    assert_eq!(hat.draw_order, 3);
    assert_eq!(hat.asset, Some(0));

    let skin = actor.component(8).unwrap().kind.image().unwrap();
    assert_eq!(skin.connected_bones[0].component, Some(2));
    assert!(skin.is_skinned());
}

#[test]
fn animation_timelines_follow_their_kinds() {
    let (actor, _) = decode_both();
    let walk = actor.animation("walk").unwrap();
    assert_eq!(walk.fps, 24);
    assert_eq!(walk.duration, 2.0);
    assert!(walk.is_looping);

    // The dangling key for component 99 produced nothing.
    assert_eq!(walk.components.len(), 3);
    assert_eq!(walk.trigger_components.len(), 1);
    assert_eq!(walk.trigger_components[0].component_index, 11);
    let trigger = &walk.trigger_components[0].properties[0];
    assert_eq!(trigger.key_frames[0].value, KeyFrameValue::None);

    let upper = walk.animated_component(2).unwrap();
    let rotation = &upper.properties[0];
    assert_eq!(rotation.property, PropertyType::Rotation);
    let first = &rotation.key_frames[0];
    assert_eq!(first.interpolation, Interpolation::Mirrored);
    assert_eq!(first.out_factor, 0.25);
    assert_eq!(first.out_value, 0.5);
    assert_eq!(first.next, Some(1));
    assert_eq!(rotation.key_frames[1].previous, Some(0));
    assert_eq!(rotation.key_frames[1].next, None);
    assert_eq!(rotation.key_frames[1].in_value, 1.0);

    let pos_x = &upper.properties[1];
    assert_eq!(pos_x.key_frames[0].interpolation, Interpolation::Hold);
    assert_eq!(pos_x.key_frames[0].out_value, 5.0);

    let draw_order = &walk.animated_component(1).unwrap().properties[0];
    assert_eq!(draw_order.key_frames[0].interpolation, Interpolation::Hold);
    assert_eq!(
        draw_order.key_frames[0].value,
        KeyFrameValue::DrawOrder(vec![DrawOrderEntry {
            component: 8,
            order: 2
        }])
    );

    let hp = &walk.animated_component(12).unwrap().properties[0];
    assert_eq!(hp.key_frames[0].value, KeyFrameValue::Integer(7));
}
