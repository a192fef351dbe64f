//! Component decoders, version gating and the top-level block loop.
//!
//! Every decoder is written once against [`RecordStream`]; the binary and JSON forms of
//! a file therefore decode to the same actor. Schema differences between format
//! revisions are resolved once per file by [`DecoderTable::for_version`].

use crate::animation::{
    AnimationSection, KeyFrameReader, read_animation_header, read_animations_block,
    read_key_frame, read_legacy_animation_trailer, read_legacy_key_frame, read_untyped_key_frame,
    skip_animation_section,
};
use crate::block::BlockType;
use crate::resolve::{link_nested_actors, resolve_hierarchy};
use crate::stream::{RecordStream, read_next_block};
use crate::version::{
    ANIMATION_HEADER_VERSION, ATLAS_IMAGE_LIST_VERSION, IK_TARGET_IMPLICIT_ORDER_VERSION,
    LATEST_KNOWN_VERSION, NODE_COLLAPSE_VERSION, normalize_version,
};
use crate::{
    Actor, Atlas, AtlasSource, AxisConstraint, AxisLimits, BlendMode, Bone, BoneConnection,
    Collider, ColliderShape, Component, ComponentKind, Constraint, CustomValue,
    DistanceConstraint, DistanceMode, Error, IkConstraint, IkTarget, Image, Jelly,
    NestedActorAsset, NestedActorNode, Node, RotationConstraint, SequenceFrame, SoloNode,
    TransformConstraint, TransformSpace, ViewBounds,
};
use glam::{Affine2, Vec2};

/// Name and declared parent shared by every component record.
#[derive(Clone, Debug)]
pub(crate) struct Header {
    pub name: String,
    pub parent: u16,
}

impl Header {
    fn into_component(self, kind: ComponentKind) -> Component {
        Component::new(self.name, self.parent, kind)
    }
}

type NodeReader<S> = fn(&mut S) -> Result<(Header, Node), Error>;
type OrderReader<S> = fn(&mut S) -> Result<u16, Error>;
type AtlasesReader<S> = fn(&mut S) -> Result<Vec<AtlasSource>, Error>;

/// Record readers whose layout depends on the file version.
pub(crate) struct DecoderTable<S> {
    pub read_node: NodeReader<S>,
    pub read_ik_target_order: OrderReader<S>,
    pub read_atlases: AtlasesReader<S>,
    pub read_animation_header: AnimationSection<S>,
    pub read_animation_trailer: AnimationSection<S>,
    pub read_key_frame: KeyFrameReader<S>,
}

impl<S: RecordStream> DecoderTable<S> {
    pub fn for_version(version: u32) -> Self {
        Self {
            read_node: if version >= NODE_COLLAPSE_VERSION {
                read_node_collapsible
            } else {
                read_node_basic
            },
            read_ik_target_order: if version < IK_TARGET_IMPLICIT_ORDER_VERSION {
                read_ik_target_order
            } else {
                implicit_ik_target_order
            },
            read_atlases: if version >= ATLAS_IMAGE_LIST_VERSION {
                read_atlas_image_list
            } else {
                read_split_channel_atlases
            },
            read_animation_header: if version >= ANIMATION_HEADER_VERSION {
                read_animation_header
            } else {
                skip_animation_section
            },
            read_animation_trailer: if version == 1 {
                read_legacy_animation_trailer
            } else {
                skip_animation_section
            },
            read_key_frame: if version >= ANIMATION_HEADER_VERSION {
                read_key_frame
            } else if version == 1 {
                read_legacy_key_frame
            } else {
                read_untyped_key_frame
            },
        }
    }
}

fn read_header<S: RecordStream>(stream: &mut S) -> Result<Header, Error> {
    Ok(Header {
        name: stream.read_string("name")?,
        parent: stream.read_id("parent")?,
    })
}

fn element_count(count: usize, stride: usize, label: &str) -> Result<usize, Error> {
    count
        .checked_mul(stride)
        .ok_or_else(|| Error::invalid(format!("'{label}' declares {count} elements")))
}

fn read_vec2<S: RecordStream>(stream: &mut S, label: &str) -> Result<Vec2, Error> {
    let mut v = [0.0; 2];
    stream.read_f32_array(&mut v, label)?;
    Ok(Vec2::from_array(v))
}

/// Reads a `[a, b, c, d, tx, ty]` 2D affine matrix.
fn read_affine<S: RecordStream>(stream: &mut S, label: &str) -> Result<Affine2, Error> {
    let mut m = [0.0; 6];
    stream.read_f32_array(&mut m, label)?;
    Ok(Affine2::from_cols_array(&m))
}

fn read_node_basic<S: RecordStream>(stream: &mut S) -> Result<(Header, Node), Error> {
    let header = read_header(stream)?;
    let node = Node {
        translation: read_vec2(stream, "translation")?,
        rotation: stream.read_f32("rotation")?,
        scale: read_vec2(stream, "scale")?,
        opacity: stream.read_f32("opacity")?,
        ..Node::default()
    };
    Ok((header, node))
}

fn read_node_collapsible<S: RecordStream>(stream: &mut S) -> Result<(Header, Node), Error> {
    let (header, mut node) = read_node_basic(stream)?;
    node.is_collapsed = stream.read_bool("isCollapsed")?;
    Ok((header, node))
}

fn read_ik_target_order<S: RecordStream>(stream: &mut S) -> Result<u16, Error> {
    stream.read_u16("order")
}

fn implicit_ik_target_order<S: RecordStream>(_stream: &mut S) -> Result<u16, Error> {
    Ok(0)
}

fn read_custom_property<S: RecordStream>(
    stream: &mut S,
    kind: BlockType,
) -> Result<Component, Error> {
    let header = read_header(stream)?;
    let value = match kind {
        BlockType::CustomIntProperty => CustomValue::Integer(stream.read_i32("int")?),
        BlockType::CustomFloatProperty => CustomValue::Float(stream.read_f32("float")?),
        BlockType::CustomStringProperty => CustomValue::String(stream.read_string("string")?),
        _ => CustomValue::Boolean(stream.read_bool("bool")?),
    };
    Ok(header.into_component(ComponentKind::CustomProperty(value)))
}

fn read_collider<S: RecordStream>(
    table: &DecoderTable<S>,
    stream: &mut S,
    kind: BlockType,
) -> Result<Component, Error> {
    let (header, node) = (table.read_node)(stream)?;
    let is_collision_enabled = stream.read_bool("isCollisionEnabled")?;
    let shape = match kind {
        BlockType::ColliderRectangle => ColliderShape::Rectangle {
            width: stream.read_f32("width")?,
            height: stream.read_f32("height")?,
        },
        BlockType::ColliderTriangle => ColliderShape::Triangle {
            width: stream.read_f32("width")?,
            height: stream.read_f32("height")?,
        },
        BlockType::ColliderCircle => ColliderShape::Circle {
            radius: stream.read_f32("radius")?,
        },
        BlockType::ColliderPolygon => {
            let count = stream.read_u32("cc")? as usize;
            let contour = stream.read_f32_vec(element_count(count, 2, "contour")?, "contour")?;
            ColliderShape::Polygon { contour }
        }
        _ => {
            let count = stream.read_u32("lineDataLength")? as usize;
            let vertices = stream.read_f32_vec(element_count(count, 2, "lineData")?, "lineData")?;
            ColliderShape::Line { vertices }
        }
    };
    Ok(header.into_component(ComponentKind::Collider(Collider {
        node,
        is_collision_enabled,
        shape,
    })))
}

fn read_bone<S: RecordStream>(
    table: &DecoderTable<S>,
    stream: &mut S,
) -> Result<(Header, Bone), Error> {
    let (header, node) = (table.read_node)(stream)?;
    let length = stream.read_f32("length")?;
    Ok((
        header,
        Bone {
            node,
            length,
            ..Bone::default()
        },
    ))
}

/// Jelly bones store no transform; the jelly solver drives it.
fn read_jelly_bone<S: RecordStream>(stream: &mut S) -> Result<Component, Error> {
    let header = read_header(stream)?;
    let node = Node {
        opacity: stream.read_f32("opacity")?,
        is_collapsed: stream.read_bool("isCollapsed")?,
        ..Node::default()
    };
    Ok(header.into_component(ComponentKind::JellyBone(Bone {
        node,
        ..Bone::default()
    })))
}

fn read_jelly<S: RecordStream>(stream: &mut S) -> Result<Component, Error> {
    let header = read_header(stream)?;
    let jelly = Jelly {
        ease_in: stream.read_f32("easeIn")?,
        ease_out: stream.read_f32("easeOut")?,
        scale_in: stream.read_f32("scaleIn")?,
        scale_out: stream.read_f32("scaleOut")?,
        in_target_index: stream.read_id("inTarget")?,
        out_target_index: stream.read_id("outTarget")?,
        ..Jelly::default()
    };
    Ok(header.into_component(ComponentKind::Jelly(jelly)))
}

fn read_image<S: RecordStream>(
    table: &DecoderTable<S>,
    stream: &mut S,
) -> Result<(Header, Image), Error> {
    let (header, node) = (table.read_node)(stream)?;
    let mut image = Image {
        node,
        is_visible: stream.read_bool("isVisible")?,
        ..Image::default()
    };
    if !image.is_visible {
        return Ok((header, image));
    }

    image.blend_mode = BlendMode::from_code(stream.read_u8("blendMode")?);
    image.draw_order = stream.read_u16("drawOrder")?;
    image.atlas_index = Some(stream.read_u8("atlas")?);

    stream.open_array("bones")?;
    let bone_count = stream.read_u8_length()?;
    for _ in 0..bone_count {
        stream.open_object("bone")?;
        let component_index = stream.read_id("component")?;
        let bind = read_affine(stream, "bind")?;
        stream.close_object()?;
        image.connected_bones.push(BoneConnection {
            component_index,
            component: None,
            bind,
            inverse_bind: crate::runtime::try_inverse(&bind),
        });
    }
    // The override lives in the image object, after the bone list.
    stream.close_array()?;
    if bone_count > 0 {
        image.world_override = Some(read_affine(stream, "worldTransform")?);
    }

    image.vertex_count = stream.read_u32("numVertices")? as usize;
    image.vertex_stride = if bone_count > 0 { 12 } else { 4 };
    let len = element_count(image.vertex_count, image.vertex_stride, "vertices")?;
    image.vertices = stream.read_f32_vec(len, "vertices")?;

    let triangle_count = stream.read_u32("numTriangles")? as usize;
    let len = element_count(triangle_count, 3, "triangles")?;
    image.triangles = stream.read_u16_vec(len, "triangles")?;

    Ok((header, image))
}

fn read_image_sequence<S: RecordStream>(
    table: &DecoderTable<S>,
    stream: &mut S,
) -> Result<(Header, Image), Error> {
    let (header, mut image) = read_image(table, stream)?;
    let Some(atlas) = image.atlas_index else {
        return Ok((header, image));
    };

    stream.open_array("frames")?;
    let frame_count = stream.read_u16_length()?;
    image.sequence_frames.push(SequenceFrame {
        atlas,
        uv_offset: 0,
    });
    if frame_count == 0 {
        stream.close_array()?;
        return Ok((header, image));
    }

    let uv_stride = image.vertex_count * 2;
    image.sequence_uvs = image
        .vertices
        .chunks_exact(image.vertex_stride)
        .flat_map(|vertex| [vertex[2], vertex[3]])
        .collect();

    // Frame 0 carries no data; the text form still lists it.
    stream.open_object("frame")?;
    stream.close_object()?;
    for i in 1..frame_count {
        stream.open_object("frame")?;
        let atlas = stream.read_u8("atlas")?;
        let uvs = stream.read_f32_vec(uv_stride, "uv")?;
        stream.close_object()?;
        image.sequence_uvs.extend(uvs);
        image.sequence_frames.push(SequenceFrame {
            atlas,
            uv_offset: i * uv_stride,
        });
    }
    stream.close_array()?;
    Ok((header, image))
}

fn read_nested_actor_node<S: RecordStream>(
    table: &DecoderTable<S>,
    stream: &mut S,
) -> Result<Component, Error> {
    let (header, node) = (table.read_node)(stream)?;
    let mut nested = NestedActorNode {
        node,
        is_visible: stream.read_u8("isVisible")? != 0,
        ..NestedActorNode::default()
    };
    if nested.is_visible {
        nested.draw_order = stream.read_u16("drawOrder")?;
        nested.asset_index = stream.read_u16("assetIndex")?;
    }
    Ok(header.into_component(ComponentKind::NestedActorNode(nested)))
}

fn read_id_list<S: RecordStream>(stream: &mut S, label: &str) -> Result<Vec<u16>, Error> {
    stream.open_array(label)?;
    let count = stream.read_u8_length()?;
    let ids = (0..count)
        .map(|_| stream.read_id("bone"))
        .collect::<Result<Vec<_>, _>>()?;
    stream.close_array()?;
    Ok(ids)
}

fn read_ik_target<S: RecordStream>(
    table: &DecoderTable<S>,
    stream: &mut S,
) -> Result<Component, Error> {
    let (header, node) = (table.read_node)(stream)?;
    let target = IkTarget {
        node,
        order: (table.read_ik_target_order)(stream)?,
        strength: stream.read_f32("strength")?,
        invert_direction: stream.read_bool("isInverted")?,
        bone_indices: read_id_list(stream, "bones")?,
        bones: Vec::new(),
    };
    Ok(header.into_component(ComponentKind::IkTarget(target)))
}

fn read_constraint<S: RecordStream>(stream: &mut S) -> Result<(Header, Constraint), Error> {
    let header = read_header(stream)?;
    let constraint = Constraint {
        strength: stream.read_f32("strength")?,
        is_enabled: stream.read_bool("isEnabled")?,
        target_index: stream.read_id("target")?,
        target: None,
    };
    Ok((header, constraint))
}

/// A copy/min/max triple; each value is only present when its flag is set.
fn read_axis_limits<S: RecordStream>(stream: &mut S, axis: &str) -> Result<AxisLimits, Error> {
    let mut limits = AxisLimits::default();
    limits.copy = stream.read_bool(&format!("copy{axis}"))?;
    if limits.copy {
        limits.scale = stream.read_f32(&format!("scale{axis}"))?;
    }
    limits.enable_min = stream.read_bool(&format!("enableMin{axis}"))?;
    if limits.enable_min {
        limits.min = stream.read_f32(&format!("min{axis}"))?;
    }
    limits.enable_max = stream.read_bool(&format!("enableMax{axis}"))?;
    if limits.enable_max {
        limits.max = stream.read_f32(&format!("max{axis}"))?;
    }
    Ok(limits)
}

fn read_spaces<S: RecordStream>(
    stream: &mut S,
) -> Result<(TransformSpace, TransformSpace, TransformSpace), Error> {
    Ok((
        TransformSpace::from_code(stream.read_u8("sourceSpaceId")?),
        TransformSpace::from_code(stream.read_u8("destSpaceId")?),
        TransformSpace::from_code(stream.read_u8("minMaxSpaceId")?),
    ))
}

fn read_constraint_component<S: RecordStream>(
    stream: &mut S,
    kind: BlockType,
) -> Result<Component, Error> {
    let (header, constraint) = read_constraint(stream)?;
    let kind = match kind {
        BlockType::IkConstraint => ComponentKind::IkConstraint(IkConstraint {
            constraint,
            invert_direction: stream.read_bool("isInverted")?,
            bone_indices: read_id_list(stream, "bones")?,
            bones: Vec::new(),
        }),
        BlockType::DistanceConstraint => ComponentKind::DistanceConstraint(DistanceConstraint {
            constraint,
            distance: stream.read_f32("distance")?,
            mode: DistanceMode::from_code(stream.read_u8("modeId")?),
        }),
        BlockType::TransformConstraint => {
            ComponentKind::TransformConstraint(TransformConstraint {
                constraint,
                source_space: TransformSpace::from_code(stream.read_u8("sourceSpaceId")?),
                dest_space: TransformSpace::from_code(stream.read_u8("destSpaceId")?),
            })
        }
        BlockType::RotationConstraint => {
            let limits = read_axis_limits(stream, "")?;
            let offset = stream.read_bool("offset")?;
            let (source_space, dest_space, min_max_space) = read_spaces(stream)?;
            ComponentKind::RotationConstraint(RotationConstraint {
                constraint,
                limits,
                offset,
                source_space,
                dest_space,
                min_max_space,
            })
        }
        _ => {
            let x = read_axis_limits(stream, "X")?;
            let y = read_axis_limits(stream, "Y")?;
            let offset = stream.read_bool("offset")?;
            let (source_space, dest_space, min_max_space) = read_spaces(stream)?;
            let axis = AxisConstraint {
                constraint,
                x,
                y,
                offset,
                source_space,
                dest_space,
                min_max_space,
            };
            if kind == BlockType::ScaleConstraint {
                ComponentKind::ScaleConstraint(axis)
            } else {
                ComponentKind::TranslationConstraint(axis)
            }
        }
    };
    Ok(header.into_component(kind))
}

/// Decodes one component record. Returns `None` for block types that are not
/// components.
pub(crate) fn read_component<S: RecordStream>(
    table: &DecoderTable<S>,
    kind: BlockType,
    stream: &mut S,
) -> Result<Option<Component>, Error> {
    let component = match kind {
        BlockType::CustomIntProperty
        | BlockType::CustomFloatProperty
        | BlockType::CustomStringProperty
        | BlockType::CustomBooleanProperty => read_custom_property(stream, kind)?,
        BlockType::ColliderRectangle
        | BlockType::ColliderTriangle
        | BlockType::ColliderCircle
        | BlockType::ColliderPolygon
        | BlockType::ColliderLine => read_collider(table, stream, kind)?,
        BlockType::Event => read_header(stream)?.into_component(ComponentKind::Event),
        BlockType::Node => {
            let (header, node) = (table.read_node)(stream)?;
            header.into_component(ComponentKind::Node(node))
        }
        BlockType::Bone => {
            let (header, bone) = read_bone(table, stream)?;
            header.into_component(ComponentKind::Bone(bone))
        }
        BlockType::RootBone => {
            let (header, node) = (table.read_node)(stream)?;
            header.into_component(ComponentKind::RootBone(node))
        }
        BlockType::JellyBone => read_jelly_bone(stream)?,
        BlockType::Jelly => read_jelly(stream)?,
        BlockType::SoloNode => {
            let (header, node) = (table.read_node)(stream)?;
            let active_child_index = stream.read_u32("activeChild")?;
            header.into_component(ComponentKind::SoloNode(SoloNode {
                node,
                active_child_index,
            }))
        }
        BlockType::Image => {
            let (header, image) = read_image(table, stream)?;
            header.into_component(ComponentKind::Image(image))
        }
        BlockType::ImageSequence => {
            let (header, image) = read_image_sequence(table, stream)?;
            header.into_component(ComponentKind::ImageSequence(image))
        }
        BlockType::NestedActorNode => read_nested_actor_node(table, stream)?,
        BlockType::IkTarget => read_ik_target(table, stream)?,
        BlockType::IkConstraint
        | BlockType::DistanceConstraint
        | BlockType::TransformConstraint
        | BlockType::TranslationConstraint
        | BlockType::ScaleConstraint
        | BlockType::RotationConstraint => read_constraint_component(stream, kind)?,
        BlockType::Components
        | BlockType::View
        | BlockType::Animation
        | BlockType::Animations
        | BlockType::Atlases
        | BlockType::Atlas
        | BlockType::NestedActorAssets
        | BlockType::NestedActorAsset => return Ok(None),
    };
    Ok(Some(component))
}

fn read_components_block<S: RecordStream>(
    actor: &mut Actor,
    table: &DecoderTable<S>,
    mut stream: S,
) {
    // Keeps the binary cursor aligned; components are read until the payload ends.
    if let Err(e) = stream.read_u16_length() {
        actor.record_error(e);
        return;
    }
    loop {
        let mut block = match read_next_block::<BlockType, S>(&mut stream) {
            Ok(Some(block)) => block,
            Ok(None) => break,
            Err(e) => {
                actor.record_error(e);
                break;
            }
        };
        let component = match block.kind {
            Some(kind) => match read_component(table, kind, &mut block.stream) {
                Ok(Some(component)) => Some(component),
                Ok(None) => {
                    log::debug!("block {} is not a component", block.tag);
                    None
                }
                Err(e) => {
                    actor.record_error(e);
                    None
                }
            },
            None => {
                log::debug!("skipping unknown component block {}", block.tag);
                None
            }
        };
        actor.push_component(component);
    }
    resolve_hierarchy(actor);
}

fn read_atlas_image_list<S: RecordStream>(stream: &mut S) -> Result<Vec<AtlasSource>, Error> {
    let out_of_band = stream.read_bool("isOOB")?;
    stream.open_array("data")?;
    let count = stream.read_u16_length()?;
    let sources = (0..count)
        .map(|_| stream.read_image(out_of_band, "image"))
        .collect::<Result<Vec<_>, _>>()?;
    stream.close_array()?;
    Ok(sources)
}

fn read_split_channel_atlases<S: RecordStream>(stream: &mut S) -> Result<Vec<AtlasSource>, Error> {
    let count = stream.read_u16("count")?;
    let mut sources = Vec::with_capacity(count as usize);
    for _ in 0..count {
        stream.open_object("atlas")?;
        let color = stream.read_bytes("color")?;
        let alpha = stream.read_bytes("alpha")?;
        stream.close_object()?;
        sources.push(AtlasSource::SplitChannels { color, alpha });
    }
    Ok(sources)
}

fn read_nested_actor_asset<S: RecordStream>(stream: &mut S) -> Result<NestedActorAsset, Error> {
    Ok(NestedActorAsset {
        name: stream.read_string("name")?,
        id: stream.read_string("id")?,
        actor: None,
    })
}

fn read_nested_actor_assets<S: RecordStream>(actor: &mut Actor, mut stream: S) {
    if let Err(e) = stream.read_u16_length() {
        actor.record_error(e);
        return;
    }
    loop {
        let mut block = match read_next_block::<BlockType, S>(&mut stream) {
            Ok(Some(block)) => block,
            Ok(None) => break,
            Err(e) => {
                actor.record_error(e);
                break;
            }
        };
        if block.kind != Some(BlockType::NestedActorAsset) {
            log::debug!("skipping block {} inside nested actor assets", block.tag);
            continue;
        }
        match read_nested_actor_asset(&mut block.stream) {
            Ok(asset) => actor.nested_actor_assets.push(asset),
            Err(e) => actor.record_error(e),
        }
    }
}

fn read_view<S: RecordStream>(stream: &mut S) -> Result<ViewBounds, Error> {
    let x = stream.read_f32("x")?;
    let y = stream.read_f32("y")?;
    Ok(ViewBounds {
        center: Vec2::new(x, y),
        width: stream.read_f32("width")?,
        height: stream.read_f32("height")?,
    })
}

/// Decodes a whole actor from a stream positioned just before the version word.
///
/// Only a missing or unreadable header is fatal; everything after it is decoded
/// best-effort with the first malformed-record error kept in [`Actor::error`].
pub(crate) fn read_actor<S: RecordStream>(stream: &mut S) -> Result<Actor, Error> {
    let version = normalize_version(stream.read_u32("version")?);
    if version > LATEST_KNOWN_VERSION {
        log::debug!("actor format version {version} is newer than {LATEST_KNOWN_VERSION}");
    }
    let table = DecoderTable::<S>::for_version(version);
    let mut actor = Actor::new(version);

    stream.open_array("blocks")?;
    loop {
        let mut block = match read_next_block::<BlockType, S>(stream) {
            Ok(Some(block)) => block,
            Ok(None) => break,
            Err(e) => {
                actor.record_error(e);
                break;
            }
        };
        match block.kind {
            Some(BlockType::Components) => read_components_block(&mut actor, &table, block.stream),
            Some(BlockType::View) => match read_view(&mut block.stream) {
                Ok(view) => actor.view = Some(view),
                Err(e) => actor.record_error(e),
            },
            Some(BlockType::Animations) => read_animations_block(&mut actor, &table, block.stream),
            Some(BlockType::Atlases) => match (table.read_atlases)(&mut block.stream) {
                Ok(sources) => actor.atlases.extend(sources.into_iter().map(|source| Atlas {
                    source: Some(source),
                    image: None,
                })),
                Err(e) => actor.record_error(e),
            },
            Some(BlockType::NestedActorAssets) => {
                read_nested_actor_assets(&mut actor, block.stream)
            }
            _ => log::debug!("skipping top-level block {}", block.tag),
        }
    }
    if let Err(e) = stream.close_array() {
        actor.record_error(e);
    }

    link_nested_actors(&mut actor);
    Ok(actor)
}

impl Actor {
    /// Decodes a binary actor file (starting with the `NIMA` magic).
    #[cfg(feature = "binary")]
    pub fn from_binary(bytes: &[u8]) -> Result<Actor, Error> {
        let Some(body) = bytes.strip_prefix(&crate::BINARY_MAGIC) else {
            return Err(Error::BinaryParse {
                message: "missing NIMA magic".to_string(),
            });
        };
        read_actor(&mut crate::binary::BinaryStream::new(body))
    }

    #[cfg(feature = "json")]
    pub fn from_json_value(document: &serde_json::Value) -> Result<Actor, Error> {
        if !document.is_object() {
            return Err(Error::JsonParse {
                message: "actor document must be a JSON object".to_string(),
            });
        }
        read_actor(&mut crate::json::JsonStream::new(document))
    }

    #[cfg(feature = "json")]
    pub fn from_json_str(text: &str) -> Result<Actor, Error> {
        let document: serde_json::Value =
            serde_json::from_str(text).map_err(|e| Error::JsonParse {
                message: e.to_string(),
            })?;
        Self::from_json_value(&document)
    }

    #[cfg(feature = "json")]
    pub fn from_json_slice(bytes: &[u8]) -> Result<Actor, Error> {
        let document: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| Error::JsonParse {
                message: e.to_string(),
            })?;
        Self::from_json_value(&document)
    }

    /// Decodes either encoding: input starting with the binary magic is read as binary,
    /// anything else as a JSON document.
    pub fn from_bytes(bytes: &[u8]) -> Result<Actor, Error> {
        #[cfg(feature = "binary")]
        if bytes.starts_with(&crate::BINARY_MAGIC) {
            return Self::from_binary(bytes);
        }
        #[cfg(feature = "json")]
        {
            Self::from_json_slice(bytes)
        }
        #[cfg(not(feature = "json"))]
        {
            let _ = bytes;
            Err(Error::UnsupportedEncoding)
        }
    }
}
