//! Record layouts that changed between format revisions.

use crate::test_support::BinaryWriter;
use crate::{
    Actor, AtlasSource, BlockType, ComponentKind, Error, Interpolation, KeyFrameValue,
    LEGACY_VERSION_WORD, PropertyType,
};

/// A node record without the collapse flag.
fn basic_node(w: &mut BinaryWriter, name: &str, parent: u16, translation: [f32; 2]) {
    w.header(name, parent)
        .f32s(&translation)
        .f32(0.0)
        .f32s(&[1.0, 1.0])
        .f32(1.0);
}

fn one_node_actor(version: u32) -> Vec<u8> {
    let mut w = BinaryWriter::actor(version);
    w.block(BlockType::Components, |c| {
        c.u16(1);
        c.block(BlockType::Node, |b| basic_node(b, "hip", 0, [3.0, 4.0]));
    });
    w.into_bytes()
}

#[test]
fn nodes_before_revision_13_have_no_collapse_flag() {
    let actor = Actor::from_binary(&one_node_actor(12)).unwrap();
    assert!(actor.error.is_none(), "{:?}", actor.error);
    let hip = actor.find_component("hip").unwrap().node().unwrap();
    assert_eq!(hip.translation.to_array(), [3.0, 4.0]);
    assert!(!hip.is_collapsed);

    // The same bytes are one byte short for a revision 13 node.
    let actor = Actor::from_binary(&one_node_actor(13)).unwrap();
    assert!(matches!(actor.error, Some(Error::UnexpectedEof { .. })));
    assert!(actor.components[1].is_none());
}

fn ik_target_actor(version: u32) -> Vec<u8> {
    let mut w = BinaryWriter::actor(version);
    w.block(BlockType::Components, |c| {
        c.u16(2);
        c.block(BlockType::Bone, |b| {
            b.bone("arm", 0, [0.0, 0.0], 0.0, 10.0);
        });
        c.block(BlockType::IkTarget, |b| {
            b.node("grab", 0, [5.0, 5.0], 0.0);
            if version < 14 {
                b.u16(3);
            }
            b.f32(0.5).bool(true).u8(1).u16(1);
        });
    });
    w.into_bytes()
}

#[test]
fn ik_targets_store_their_order_until_revision_14() {
    for (version, order) in [(13, 3), (14, 0)] {
        let actor = Actor::from_binary(&ik_target_actor(version)).unwrap();
        assert!(actor.error.is_none(), "v{version}: {:?}", actor.error);
        let ComponentKind::IkTarget(target) = &actor.component(2).unwrap().kind else {
            panic!("v{version}: expected an IK target");
        };
        assert_eq!(target.order, order);
        assert_eq!(target.strength, 0.5);
        assert!(target.invert_direction);
        assert_eq!(target.bones, vec![1]);
    }
}

#[test]
fn atlases_before_revision_15_are_split_channel_pairs() {
    let mut w = BinaryWriter::actor(14);
    w.block(BlockType::Atlases, |b| {
        b.u16(2)
            .bytes(&[1, 2, 3])
            .bytes(&[4])
            .bytes(&[5, 6])
            .bytes(&[]);
    });
    let actor = Actor::from_binary(&w.into_bytes()).unwrap();
    assert!(actor.error.is_none(), "{:?}", actor.error);
    let sources: Vec<_> = actor.atlases.iter().map(|a| a.source.clone()).collect();
    assert_eq!(
        sources,
        vec![
            Some(AtlasSource::SplitChannels {
                color: vec![1, 2, 3],
                alpha: vec![4]
            }),
            Some(AtlasSource::SplitChannels {
                color: vec![5, 6],
                alpha: vec![]
            }),
        ]
    );
}

#[test]
fn embedded_atlases_are_byte_payloads() {
    let mut w = BinaryWriter::actor(15);
    w.block(BlockType::Atlases, |b| {
        b.bool(false).u16(1).bytes(&[0x89, b'P', b'N', b'G']);
    });
    let actor = Actor::from_binary(&w.into_bytes()).unwrap();
    assert_eq!(
        actor.atlases[0].source,
        Some(AtlasSource::Bytes(vec![0x89, b'P', b'N', b'G']))
    );
}

#[test]
fn revision_one_animations_use_the_legacy_layout() {
    let mut w = BinaryWriter::new();
    w.raw(&crate::BINARY_MAGIC).u32(LEGACY_VERSION_WORD);
    w.block(BlockType::Components, |c| {
        c.u16(1);
        c.block(BlockType::Node, |b| basic_node(b, "hip", 0, [0.0, 0.0]));
    });
    w.block(BlockType::Animations, |a| {
        a.u16(1);
        a.block(BlockType::Animation, |b| {
            b.u16(1);
            b.u16(1).u16(1);
            b.property(PropertyType::PosY, |p| {
                p.u16(2);
                // time, value, type, then the tangents the type calls for
                p.f64(0.0).f32(2.0).u8(3).f64(0.5).f32(1.0).f64(0.5).f32(4.0);
                p.f64(0.5).f32(6.0).u8(0).f64(0.0).f32(6.0);
            });
            b.u8(30);
        });
    });
    let actor = Actor::from_binary(&w.into_bytes()).unwrap();
    assert_eq!(actor.version, 1);
    assert!(actor.error.is_none(), "{:?}", actor.error);

    let animation = &actor.animations[0];
    assert_eq!(animation.fps, 30);
    assert!(animation.name.is_empty());
    let frames = &animation.animated_component(1).unwrap().properties[0].key_frames;
    assert_eq!(frames[0].interpolation, Interpolation::Asymmetric);
    assert_eq!(frames[0].value, KeyFrameValue::Float(2.0));
    assert_eq!(frames[0].out_value, 4.0);
    assert_eq!(frames[1].interpolation, Interpolation::Hold);
    assert_eq!(frames[1].out_value, 6.0);
}

#[test]
fn revisions_2_to_10_store_untyped_key_frames() {
    let mut w = BinaryWriter::actor(10);
    w.block(BlockType::Components, |c| {
        c.u16(1);
        c.block(BlockType::Node, |b| basic_node(b, "hip", 0, [0.0, 0.0]));
    });
    w.block(BlockType::Animations, |a| {
        a.u16(1);
        a.block(BlockType::Animation, |b| {
            b.u16(1);
            b.u16(1).u16(1);
            b.property(PropertyType::Opacity, |p| {
                p.u16(2).f64(0.0).f32(0.0).f64(1.0).f32(1.0);
            });
        });
    });
    let actor = Actor::from_binary(&w.into_bytes()).unwrap();
    assert!(actor.error.is_none(), "{:?}", actor.error);

    let animation = &actor.animations[0];
    assert_eq!(animation.fps, 0);
    let opacity = &animation.animated_component(1).unwrap().properties[0];
    assert!(opacity
        .key_frames
        .iter()
        .all(|f| f.interpolation == Interpolation::Linear));
    assert_eq!(opacity.key_frames[1].in_value, 1.0);
    assert_eq!(opacity.scalar_at(0.25), Some(0.25));
}
