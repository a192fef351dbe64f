use crate::runtime::JellyCache;
use crate::{Animation, AtlasImage, Error};
use glam::{Affine2, Vec2};

/// Arena slot of the implicit root node every actor starts with.
pub const ROOT_COMPONENT: usize = 0;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub translation: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
    pub opacity: f32,
    pub is_collapsed: bool,

    pub world_transform: Affine2,
    pub transform_dirty: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            translation: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            opacity: 1.0,
            is_collapsed: false,
            world_transform: Affine2::IDENTITY,
            transform_dirty: true,
        }
    }
}

impl Node {
    pub fn local_transform(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.rotation, self.translation)
    }

    pub fn world_translation(&self) -> Vec2 {
        self.world_transform.translation
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bone {
    pub node: Node,
    pub length: f32,
    /// First child that is a regular bone, set by the complete-resolve pass.
    pub first_bone: Option<usize>,
    /// Jelly driver parented to this bone, if any.
    pub jelly: Option<usize>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Additive,
}

impl BlendMode {
    pub(crate) fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Multiply,
            2 => Self::Screen,
            3 => Self::Additive,
            _ => Self::Normal,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoneConnection {
    pub component_index: u16,
    pub component: Option<usize>,
    pub bind: Affine2,
    /// `None` when the bind matrix is singular.
    pub inverse_bind: Option<Affine2>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SequenceFrame {
    pub atlas: u8,
    /// Offset (in floats) of this frame's UVs inside [`Image::sequence_uvs`].
    pub uv_offset: usize,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Image {
    pub node: Node,
    pub is_visible: bool,
    pub blend_mode: BlendMode,
    pub draw_order: u16,
    pub atlas_index: Option<u8>,
    pub connected_bones: Vec<BoneConnection>,
    pub world_override: Option<Affine2>,
    pub vertex_count: usize,
    /// 4 floats per vertex (position, uv) or 12 when skinned (+ weights, bone indices).
    pub vertex_stride: usize,
    pub vertices: Vec<f32>,
    pub triangles: Vec<u16>,
    pub has_vertex_deform_animation: bool,
    pub sequence_frames: Vec<SequenceFrame>,
    pub sequence_uvs: Vec<f32>,
}

impl Image {
    pub fn is_skinned(&self) -> bool {
        !self.connected_bones.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NestedActorNode {
    pub node: Node,
    pub is_visible: bool,
    pub draw_order: u16,
    pub asset_index: u16,
    pub asset: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SoloNode {
    pub node: Node,
    pub active_child_index: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ColliderShape {
    Rectangle { width: f32, height: f32 },
    Triangle { width: f32, height: f32 },
    Circle { radius: f32 },
    Polygon { contour: Vec<f32> },
    Line { vertices: Vec<f32> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Collider {
    pub node: Node,
    pub is_collision_enabled: bool,
    pub shape: ColliderShape,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CustomValue {
    Integer(i32),
    Float(f32),
    String(String),
    Boolean(bool),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IkTarget {
    pub node: Node,
    /// Only stored by files older than the implicit-order revision.
    pub order: u16,
    pub strength: f32,
    pub invert_direction: bool,
    pub bone_indices: Vec<u16>,
    pub bones: Vec<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Constraint {
    pub strength: f32,
    pub is_enabled: bool,
    pub target_index: u16,
    pub target: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IkConstraint {
    pub constraint: Constraint,
    pub invert_direction: bool,
    pub bone_indices: Vec<u16>,
    pub bones: Vec<usize>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum DistanceMode {
    #[default]
    Closer,
    Further,
    Exact,
}

impl DistanceMode {
    pub(crate) fn from_code(code: u8) -> Self {
        match code {
            1 => Self::Further,
            2 => Self::Exact,
            _ => Self::Closer,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DistanceConstraint {
    pub constraint: Constraint,
    pub distance: f32,
    pub mode: DistanceMode,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum TransformSpace {
    #[default]
    World,
    Local,
}

impl TransformSpace {
    pub(crate) fn from_code(code: u8) -> Self {
        if code == 1 { Self::Local } else { Self::World }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformConstraint {
    pub constraint: Constraint,
    pub source_space: TransformSpace,
    pub dest_space: TransformSpace,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisLimits {
    pub copy: bool,
    pub scale: f32,
    pub enable_min: bool,
    pub min: f32,
    pub enable_max: bool,
    pub max: f32,
}

impl Default for AxisLimits {
    fn default() -> Self {
        Self {
            copy: false,
            scale: 1.0,
            enable_min: false,
            min: 0.0,
            enable_max: false,
            max: 0.0,
        }
    }
}

/// Translation and scale constraints: independent settings per axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AxisConstraint {
    pub constraint: Constraint,
    pub x: AxisLimits,
    pub y: AxisLimits,
    pub offset: bool,
    pub source_space: TransformSpace,
    pub dest_space: TransformSpace,
    pub min_max_space: TransformSpace,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RotationConstraint {
    pub constraint: Constraint,
    pub limits: AxisLimits,
    pub offset: bool,
    pub source_space: TransformSpace,
    pub dest_space: TransformSpace,
    pub min_max_space: TransformSpace,
}

/// Jelly driver: defines the curve a bone's jelly-bone children are laid along.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Jelly {
    pub ease_in: f32,
    pub ease_out: f32,
    pub scale_in: f32,
    pub scale_out: f32,
    pub in_target_index: u16,
    pub out_target_index: u16,
    pub in_target: Option<usize>,
    pub out_target: Option<usize>,

    /// Follower chain, in child order of the owning bone.
    pub bones: Vec<usize>,
    pub in_point: Vec2,
    pub in_direction: Vec2,
    pub out_point: Vec2,
    pub out_direction: Vec2,
    pub cache: Option<JellyCache>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ComponentKind {
    Node(Node),
    Bone(Bone),
    RootBone(Node),
    JellyBone(Bone),
    Jelly(Jelly),
    SoloNode(SoloNode),
    Image(Image),
    ImageSequence(Image),
    NestedActorNode(NestedActorNode),
    Collider(Collider),
    Event,
    CustomProperty(CustomValue),
    IkTarget(IkTarget),
    IkConstraint(IkConstraint),
    DistanceConstraint(DistanceConstraint),
    TransformConstraint(TransformConstraint),
    TranslationConstraint(AxisConstraint),
    ScaleConstraint(AxisConstraint),
    RotationConstraint(RotationConstraint),
}

impl ComponentKind {
    pub fn node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) | Self::RootBone(node) => Some(node),
            Self::Bone(bone) | Self::JellyBone(bone) => Some(&bone.node),
            Self::SoloNode(solo) => Some(&solo.node),
            Self::Image(image) | Self::ImageSequence(image) => Some(&image.node),
            Self::NestedActorNode(nested) => Some(&nested.node),
            Self::Collider(collider) => Some(&collider.node),
            Self::IkTarget(target) => Some(&target.node),
            Self::Jelly(_)
            | Self::Event
            | Self::CustomProperty(_)
            | Self::IkConstraint(_)
            | Self::DistanceConstraint(_)
            | Self::TransformConstraint(_)
            | Self::TranslationConstraint(_)
            | Self::ScaleConstraint(_)
            | Self::RotationConstraint(_) => None,
        }
    }

    pub fn node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Self::Node(node) | Self::RootBone(node) => Some(node),
            Self::Bone(bone) | Self::JellyBone(bone) => Some(&mut bone.node),
            Self::SoloNode(solo) => Some(&mut solo.node),
            Self::Image(image) | Self::ImageSequence(image) => Some(&mut image.node),
            Self::NestedActorNode(nested) => Some(&mut nested.node),
            Self::Collider(collider) => Some(&mut collider.node),
            Self::IkTarget(target) => Some(&mut target.node),
            Self::Jelly(_)
            | Self::Event
            | Self::CustomProperty(_)
            | Self::IkConstraint(_)
            | Self::DistanceConstraint(_)
            | Self::TransformConstraint(_)
            | Self::TranslationConstraint(_)
            | Self::ScaleConstraint(_)
            | Self::RotationConstraint(_) => None,
        }
    }

    /// Regular bones and jelly bones.
    pub fn bone(&self) -> Option<&Bone> {
        match self {
            Self::Bone(bone) | Self::JellyBone(bone) => Some(bone),
            _ => None,
        }
    }

    pub fn bone_mut(&mut self) -> Option<&mut Bone> {
        match self {
            Self::Bone(bone) | Self::JellyBone(bone) => Some(bone),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&Image> {
        match self {
            Self::Image(image) | Self::ImageSequence(image) => Some(image),
            _ => None,
        }
    }

    pub fn image_mut(&mut self) -> Option<&mut Image> {
        match self {
            Self::Image(image) | Self::ImageSequence(image) => Some(image),
            _ => None,
        }
    }

    pub fn constraint(&self) -> Option<&Constraint> {
        match self {
            Self::IkConstraint(c) => Some(&c.constraint),
            Self::DistanceConstraint(c) => Some(&c.constraint),
            Self::TransformConstraint(c) => Some(&c.constraint),
            Self::TranslationConstraint(c) | Self::ScaleConstraint(c) => Some(&c.constraint),
            Self::RotationConstraint(c) => Some(&c.constraint),
            _ => None,
        }
    }

    pub(crate) fn constraint_mut(&mut self) -> Option<&mut Constraint> {
        match self {
            Self::IkConstraint(c) => Some(&mut c.constraint),
            Self::DistanceConstraint(c) => Some(&mut c.constraint),
            Self::TransformConstraint(c) => Some(&mut c.constraint),
            Self::TranslationConstraint(c) | Self::ScaleConstraint(c) => Some(&mut c.constraint),
            Self::RotationConstraint(c) => Some(&mut c.constraint),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    pub name: String,
    pub index: usize,
    /// Parent slot as declared in the file.
    pub parent_index: u16,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub kind: ComponentKind,
}

impl Component {
    pub fn new(name: String, parent_index: u16, kind: ComponentKind) -> Self {
        Self {
            name,
            index: 0,
            parent_index,
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    pub fn node(&self) -> Option<&Node> {
        self.kind.node()
    }
}

/// Atlas payload as declared by the file, handed to the atlas resolver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AtlasSource {
    Bytes(Vec<u8>),
    /// Pre-15 files store colour and alpha as two separate JPEG payloads.
    SplitChannels { color: Vec<u8>, alpha: Vec<u8> },
    /// Out-of-band reference or data URI.
    Uri(String),
}

#[derive(Clone, Debug, Default)]
pub struct Atlas {
    /// Taken by the loader when the atlas is handed to a resolver.
    pub source: Option<AtlasSource>,
    pub image: Option<AtlasImage>,
}

#[derive(Clone, Debug)]
pub struct NestedActorAsset {
    pub name: String,
    pub id: String,
    pub actor: Option<Box<Actor>>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ViewBounds {
    pub center: Vec2,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub version: u32,
    /// Slot 0 is the implicit root; `None` marks a component that failed to decode
    /// or whose block type is unknown.
    pub components: Vec<Option<Component>>,
    pub animations: Vec<Animation>,
    pub nested_actor_assets: Vec<NestedActorAsset>,
    pub atlases: Vec<Atlas>,
    pub view: Option<ViewBounds>,
    /// First malformed-stream error met while decoding.
    pub error: Option<Error>,
}

impl Actor {
    pub fn new(version: u32) -> Self {
        let mut actor = Self {
            version,
            components: Vec::new(),
            animations: Vec::new(),
            nested_actor_assets: Vec::new(),
            atlases: Vec::new(),
            view: None,
            error: None,
        };
        let root = Component::new("Root".to_string(), 0, ComponentKind::Node(Node::default()));
        actor.push_component(Some(root));
        actor
    }

    /// The implicit root node, unless a caller has emptied the arena.
    pub fn root(&self) -> Option<&Component> {
        self.component(ROOT_COMPONENT)
    }

    pub fn component(&self, index: usize) -> Option<&Component> {
        self.components.get(index).and_then(Option::as_ref)
    }

    pub fn component_mut(&mut self, index: usize) -> Option<&mut Component> {
        self.components.get_mut(index).and_then(Option::as_mut)
    }

    pub fn live_components(&self) -> impl DoubleEndedIterator<Item = &Component> {
        self.components.iter().flatten()
    }

    pub fn find_component(&self, name: &str) -> Option<&Component> {
        self.live_components().find(|c| c.name == name)
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.name == name)
    }

    pub(crate) fn record_error(&mut self, error: Error) {
        log::warn!("actor decode error: {error}");
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub(crate) fn push_component(&mut self, component: Option<Component>) -> usize {
        let index = self.components.len();
        self.components.push(component.map(|mut c| {
            c.index = index;
            c
        }));
        index
    }
}
