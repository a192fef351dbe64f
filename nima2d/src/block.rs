//! Tag namespaces used by the block framer.

use crate::stream::BlockKind;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BlockType {
    Components,
    Node,
    Bone,
    RootBone,
    Image,
    View,
    Animation,
    Animations,
    Atlases,
    Atlas,
    IkTarget,
    Event,
    CustomIntProperty,
    CustomFloatProperty,
    CustomStringProperty,
    CustomBooleanProperty,
    ColliderRectangle,
    ColliderTriangle,
    ColliderCircle,
    ColliderPolygon,
    ColliderLine,
    ImageSequence,
    SoloNode,
    NestedActorNode,
    NestedActorAssets,
    NestedActorAsset,
    Jelly,
    JellyBone,
    IkConstraint,
    DistanceConstraint,
    TranslationConstraint,
    RotationConstraint,
    ScaleConstraint,
    TransformConstraint,
}

const BLOCK_TYPES: &[(BlockType, u8, &str)] = &[
    (BlockType::Components, 1, "components"),
    (BlockType::Node, 2, "node"),
    (BlockType::Bone, 3, "bone"),
    (BlockType::RootBone, 4, "rootBone"),
    (BlockType::Image, 5, "image"),
    (BlockType::View, 6, "view"),
    (BlockType::Animation, 7, "animation"),
    (BlockType::Animations, 8, "animations"),
    (BlockType::Atlases, 9, "atlases"),
    (BlockType::Atlas, 10, "atlas"),
    (BlockType::IkTarget, 11, "ikTarget"),
    (BlockType::Event, 12, "event"),
    (BlockType::CustomIntProperty, 13, "customInt"),
    (BlockType::CustomFloatProperty, 14, "customFloat"),
    (BlockType::CustomStringProperty, 15, "customString"),
    (BlockType::CustomBooleanProperty, 16, "customBoolean"),
    (BlockType::ColliderRectangle, 17, "colliderRectangle"),
    (BlockType::ColliderTriangle, 18, "colliderTriangle"),
    (BlockType::ColliderCircle, 19, "colliderCircle"),
    (BlockType::ColliderPolygon, 20, "colliderPolygon"),
    (BlockType::ColliderLine, 21, "colliderLine"),
    (BlockType::ImageSequence, 22, "imageSequence"),
    (BlockType::SoloNode, 23, "solo"),
    (BlockType::NestedActorNode, 24, "nestedActor"),
    (BlockType::NestedActorAssets, 25, "nestedActorAssets"),
    (BlockType::NestedActorAsset, 26, "nestedActorAsset"),
    // 27 is the static mesh block, which this runtime does not decode.
    (BlockType::Jelly, 28, "jelly"),
    (BlockType::JellyBone, 29, "jellyBone"),
    (BlockType::IkConstraint, 30, "ikConstraint"),
    (BlockType::DistanceConstraint, 31, "distanceConstraint"),
    (BlockType::TranslationConstraint, 32, "translationConstraint"),
    (BlockType::RotationConstraint, 33, "rotationConstraint"),
    (BlockType::ScaleConstraint, 34, "scaleConstraint"),
    (BlockType::TransformConstraint, 35, "transformConstraint"),
];

impl BlockType {
    pub fn code(self) -> u8 {
        BLOCK_TYPES
            .iter()
            .find(|(ty, _, _)| *ty == self)
            .map(|(_, code, _)| *code)
            .unwrap_or(0)
    }

    pub fn name(self) -> &'static str {
        BLOCK_TYPES
            .iter()
            .find(|(ty, _, _)| *ty == self)
            .map(|(_, _, name)| *name)
            .unwrap_or("")
    }
}

impl BlockKind for BlockType {
    fn from_code(code: u8) -> Option<Self> {
        BLOCK_TYPES
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(ty, _, _)| *ty)
    }

    fn from_name(name: &str) -> Option<Self> {
        BLOCK_TYPES
            .iter()
            .find(|(_, _, n)| *n == name)
            .map(|(ty, _, _)| *ty)
    }
}

/// Animated property block tags.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PropertyType {
    PosX,
    PosY,
    ScaleX,
    ScaleY,
    Rotation,
    Opacity,
    DrawOrder,
    Length,
    VertexDeform,
    ConstraintStrength,
    Trigger,
    IntProperty,
    FloatProperty,
    StringProperty,
    BooleanProperty,
    IsCollisionEnabled,
    Sequence,
    ActiveChildIndex,
}

const PROPERTY_TYPES: &[(PropertyType, u8, &str)] = &[
    (PropertyType::PosX, 1, "posX"),
    (PropertyType::PosY, 2, "posY"),
    (PropertyType::ScaleX, 3, "scaleX"),
    (PropertyType::ScaleY, 4, "scaleY"),
    (PropertyType::Rotation, 5, "rotation"),
    (PropertyType::Opacity, 6, "opacity"),
    (PropertyType::DrawOrder, 7, "drawOrder"),
    (PropertyType::Length, 8, "length"),
    (PropertyType::VertexDeform, 9, "vertexDeform"),
    (PropertyType::ConstraintStrength, 10, "strength"),
    (PropertyType::Trigger, 11, "trigger"),
    (PropertyType::IntProperty, 12, "intProperty"),
    (PropertyType::FloatProperty, 13, "floatProperty"),
    (PropertyType::StringProperty, 14, "stringProperty"),
    (PropertyType::BooleanProperty, 15, "booleanProperty"),
    (PropertyType::IsCollisionEnabled, 16, "isCollisionEnabled"),
    (PropertyType::Sequence, 17, "sequence"),
    (PropertyType::ActiveChildIndex, 18, "activeChild"),
];

impl PropertyType {
    pub fn code(self) -> u8 {
        PROPERTY_TYPES
            .iter()
            .find(|(ty, _, _)| *ty == self)
            .map(|(_, code, _)| *code)
            .unwrap_or(0)
    }

    pub fn name(self) -> &'static str {
        PROPERTY_TYPES
            .iter()
            .find(|(ty, _, _)| *ty == self)
            .map(|(_, _, name)| *name)
            .unwrap_or("")
    }

    /// Frames of these properties store no interpolation type or tangents.
    pub fn is_discrete(self) -> bool {
        matches!(
            self,
            Self::IsCollisionEnabled
                | Self::BooleanProperty
                | Self::StringProperty
                | Self::Trigger
                | Self::DrawOrder
                | Self::ActiveChildIndex
        )
    }
}

impl BlockKind for PropertyType {
    fn from_code(code: u8) -> Option<Self> {
        PROPERTY_TYPES
            .iter()
            .find(|(_, c, _)| *c == code)
            .map(|(ty, _, _)| *ty)
    }

    fn from_name(name: &str) -> Option<Self> {
        PROPERTY_TYPES
            .iter()
            .find(|(_, _, n)| *n == name)
            .map(|(ty, _, _)| *ty)
    }
}
