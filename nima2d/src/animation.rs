//! Animations: keyed components, per-property keyframe timelines and their decoders.

use crate::block::{BlockType, PropertyType};
use crate::decode::DecoderTable;
use crate::stream::{RecordStream, read_next_block};
use crate::{Actor, ComponentKind, Error};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum Interpolation {
    Hold,
    #[default]
    Linear,
    Mirrored,
    Asymmetric,
    Disconnected,
}

impl Interpolation {
    /// Unknown codes fall back to linear.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Hold,
            2 => Self::Mirrored,
            3 => Self::Asymmetric,
            4 => Self::Disconnected,
            _ => Self::Linear,
        }
    }

    /// Mirrored, asymmetric and disconnected frames carry both tangents.
    pub fn is_cubic(self) -> bool {
        matches!(self, Self::Mirrored | Self::Asymmetric | Self::Disconnected)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DrawOrderEntry {
    pub component: u16,
    pub order: u16,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum KeyFrameValue {
    #[default]
    None,
    Float(f32),
    Integer(i32),
    String(String),
    Boolean(bool),
    Vertices(Vec<f32>),
    DrawOrder(Vec<DrawOrderEntry>),
}

impl KeyFrameValue {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(*v as f32),
            Self::Boolean(v) => Some(if *v { 1.0 } else { 0.0 }),
            Self::None | Self::String(_) | Self::Vertices(_) | Self::DrawOrder(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct KeyFrame {
    pub time: f64,
    pub interpolation: Interpolation,
    pub value: KeyFrameValue,
    pub in_factor: f64,
    pub in_value: f32,
    pub out_factor: f64,
    pub out_value: f32,
    /// Position of the successor frame within the owning property; `None` for the last.
    pub next: Option<usize>,
    pub previous: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedProperty {
    pub property: PropertyType,
    pub key_frames: Vec<KeyFrame>,
}

impl AnimatedProperty {
    /// Samples a scalar timeline at `time` (seconds).
    ///
    /// Times before the first frame clamp to the first value and times after the last
    /// frame clamp to the last value. Returns `None` for empty or non-scalar timelines.
    pub fn scalar_at(&self, time: f64) -> Option<f32> {
        let first = self.key_frames.first()?;
        if time <= first.time {
            return first.value.as_scalar();
        }
        let last = self.key_frames.last()?;
        if time >= last.time {
            return last.value.as_scalar();
        }

        let index = self
            .key_frames
            .partition_point(|frame| frame.time <= time)
            .saturating_sub(1);
        let from = &self.key_frames[index];
        let to = &self.key_frames[from.next?];
        let v0 = from.value.as_scalar()?;
        let v1 = to.value.as_scalar()?;
        let span = to.time - from.time;
        if span <= 0.0 {
            return Some(v1);
        }

        match from.interpolation {
            Interpolation::Hold => Some(v0),
            Interpolation::Linear => {
                let mix = ((time - from.time) / span) as f32;
                Some(v0 + (v1 - v0) * mix)
            }
            _ => {
                let x1 = from.time + span * from.out_factor;
                let x2 = to.time - span * to.in_factor;
                let u = solve_cubic_parameter(from.time, x1, x2, to.time, time);
                let y = cubic(
                    v0 as f64,
                    from.out_value as f64,
                    to.in_value as f64,
                    v1 as f64,
                    u,
                );
                Some(y as f32)
            }
        }
    }
}

fn cubic(p0: f64, p1: f64, p2: f64, p3: f64, u: f64) -> f64 {
    let iu = 1.0 - u;
    iu * iu * iu * p0 + 3.0 * iu * iu * u * p1 + 3.0 * iu * u * u * p2 + u * u * u * p3
}

/// Finds the curve parameter whose x coordinate is `x`. Tangent factors lie in
/// `[0, 1]`, which keeps x monotonic over the segment.
fn solve_cubic_parameter(x0: f64, x1: f64, x2: f64, x3: f64, x: f64) -> f64 {
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..48 {
        let mid = 0.5 * (lo + hi);
        if cubic(x0, x1, x2, x3, mid) < x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedComponent {
    pub component_index: usize,
    pub properties: Vec<AnimatedProperty>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Animation {
    pub name: String,
    pub fps: u8,
    pub duration: f32,
    pub is_looping: bool,
    pub components: Vec<AnimatedComponent>,
    /// Keyed event components; only their trigger is ever animated.
    pub trigger_components: Vec<AnimatedComponent>,
}

impl Animation {
    pub fn animated_component(&self, component_index: usize) -> Option<&AnimatedComponent> {
        self.components
            .iter()
            .chain(&self.trigger_components)
            .find(|c| c.component_index == component_index)
    }
}

/// Per-property input the keyframe readers need besides the stream.
#[derive(Copy, Clone, Debug)]
pub(crate) struct FrameShape {
    pub property: PropertyType,
    /// Float count of a vertex-deform value (`vertex_count * 2`).
    pub deform_len: usize,
}

pub(crate) type KeyFrameReader<S> = fn(&mut S, FrameShape) -> Result<KeyFrame, Error>;
pub(crate) type AnimationSection<S> = fn(&mut S, &mut Animation) -> Result<(), Error>;

pub(crate) fn read_animation_header<S: RecordStream>(
    stream: &mut S,
    animation: &mut Animation,
) -> Result<(), Error> {
    animation.name = stream.read_string("name")?;
    animation.fps = stream.read_u8("fps")?;
    animation.duration = stream.read_f32("duration")?;
    animation.is_looping = stream.read_bool("isLooping")?;
    Ok(())
}

/// Version 1 files store the frame rate after the keyed list.
pub(crate) fn read_legacy_animation_trailer<S: RecordStream>(
    stream: &mut S,
    animation: &mut Animation,
) -> Result<(), Error> {
    animation.fps = stream.read_u8("fps")?;
    Ok(())
}

pub(crate) fn skip_animation_section<S: RecordStream>(
    _stream: &mut S,
    _animation: &mut Animation,
) -> Result<(), Error> {
    Ok(())
}

fn read_value<S: RecordStream>(stream: &mut S, shape: FrameShape) -> Result<KeyFrameValue, Error> {
    Ok(match shape.property {
        PropertyType::Trigger => KeyFrameValue::None,
        PropertyType::IntProperty => KeyFrameValue::Integer(stream.read_i32("value")?),
        PropertyType::StringProperty => KeyFrameValue::String(stream.read_string("value")?),
        PropertyType::BooleanProperty | PropertyType::IsCollisionEnabled => {
            KeyFrameValue::Boolean(stream.read_bool("value")?)
        }
        PropertyType::DrawOrder => {
            stream.open_array("drawOrder")?;
            let count = stream.read_u16_length()?;
            let mut entries = Vec::with_capacity(count);
            for _ in 0..count {
                stream.open_object("order")?;
                let component = stream.read_u16("component")?;
                let order = stream.read_u16("order")?;
                stream.close_object()?;
                entries.push(DrawOrderEntry { component, order });
            }
            stream.close_array()?;
            KeyFrameValue::DrawOrder(entries)
        }
        PropertyType::VertexDeform => {
            KeyFrameValue::Vertices(stream.read_f32_vec(shape.deform_len, "value")?)
        }
        _ => KeyFrameValue::Float(stream.read_f32("value")?),
    })
}

fn read_tangents<S: RecordStream>(stream: &mut S, frame: &mut KeyFrame) -> Result<(), Error> {
    let cubic = frame.interpolation.is_cubic();
    if cubic || frame.interpolation == Interpolation::Hold {
        frame.in_factor = stream.read_f64("inFactor")?;
        frame.in_value = stream.read_f32("inValue")?;
    }
    if cubic {
        frame.out_factor = stream.read_f64("outFactor")?;
        frame.out_value = stream.read_f32("outValue")?;
    }
    Ok(())
}

/// Frames without stored tangents use their own value on both sides. Hold frames
/// only store the inbound pair, so their outbound value is the frame value too.
fn apply_default_tangents(frame: &mut KeyFrame) {
    let value = frame.value.as_scalar().unwrap_or(0.0);
    match frame.interpolation {
        i if i.is_cubic() => {}
        Interpolation::Hold => frame.out_value = value,
        _ => {
            frame.in_value = value;
            frame.out_value = value;
        }
    }
}

/// Current layout: time, interpolation type and tangents (for interpolating
/// properties), then the value.
pub(crate) fn read_key_frame<S: RecordStream>(
    stream: &mut S,
    shape: FrameShape,
) -> Result<KeyFrame, Error> {
    let mut frame = KeyFrame {
        time: stream.read_f64("time")?,
        ..KeyFrame::default()
    };
    if !shape.property.is_discrete() {
        frame.interpolation = Interpolation::from_code(stream.read_u8("type")?);
        read_tangents(stream, &mut frame)?;
    }
    frame.value = read_value(stream, shape)?;
    apply_default_tangents(&mut frame);
    Ok(frame)
}

/// Version 1 layout: the value precedes the interpolation type, and every property
/// stores a type regardless of whether it interpolates.
pub(crate) fn read_legacy_key_frame<S: RecordStream>(
    stream: &mut S,
    shape: FrameShape,
) -> Result<KeyFrame, Error> {
    let mut frame = KeyFrame {
        time: stream.read_f64("time")?,
        ..KeyFrame::default()
    };
    frame.value = read_value(stream, shape)?;
    frame.interpolation = Interpolation::from_code(stream.read_u8("type")?);
    read_tangents(stream, &mut frame)?;
    apply_default_tangents(&mut frame);
    Ok(frame)
}

/// Versions 2 through 10 store no interpolation at all.
pub(crate) fn read_untyped_key_frame<S: RecordStream>(
    stream: &mut S,
    shape: FrameShape,
) -> Result<KeyFrame, Error> {
    let mut frame = KeyFrame {
        time: stream.read_f64("time")?,
        ..KeyFrame::default()
    };
    frame.value = read_value(stream, shape)?;
    apply_default_tangents(&mut frame);
    Ok(frame)
}

fn link_key_frames(frames: &mut [KeyFrame]) {
    let count = frames.len();
    for (i, frame) in frames.iter_mut().enumerate() {
        frame.previous = i.checked_sub(1);
        frame.next = (i + 1 < count).then_some(i + 1);
    }
}

fn read_property<S: RecordStream>(
    stream: &mut S,
    table: &DecoderTable<S>,
    shape: FrameShape,
) -> Result<AnimatedProperty, Error> {
    stream.open_array("frames")?;
    let count = stream.read_u16_length()?;
    let mut key_frames = Vec::with_capacity(count);
    for _ in 0..count {
        stream.open_object("frame")?;
        let mut frame = (table.read_key_frame)(stream, shape)?;
        stream.close_object()?;
        match shape.property {
            PropertyType::DrawOrder => frame.interpolation = Interpolation::Hold,
            PropertyType::VertexDeform => frame.interpolation = Interpolation::Linear,
            _ => {}
        }
        key_frames.push(frame);
    }
    stream.close_array()?;
    link_key_frames(&mut key_frames);
    Ok(AnimatedProperty {
        property: shape.property,
        key_frames,
    })
}

fn skip_properties<S: RecordStream>(stream: &mut S, count: usize) -> Result<(), Error> {
    for _ in 0..count {
        match read_next_block::<PropertyType, S>(stream)? {
            Some(block) => log::debug!("skipping property block {} of a dangling key", block.tag),
            None => break,
        }
    }
    Ok(())
}

fn read_keyed_component<S: RecordStream>(
    actor: &mut Actor,
    table: &DecoderTable<S>,
    stream: &mut S,
    animation: &mut Animation,
) -> Result<(), Error> {
    stream.open_object("component")?;
    let component_index = stream.read_id("component")? as usize;
    stream.open_array("properties")?;
    let count = stream.read_u16_length()?;

    let Some(component) = actor.component(component_index) else {
        log::debug!("animation keys missing component {component_index}, skipping its data");
        skip_properties(stream, count)?;
        stream.close_array()?;
        return stream.close_object();
    };
    let is_event = matches!(component.kind, ComponentKind::Event);
    let vertex_count = component.kind.image().map(|image| image.vertex_count);

    let mut animated = AnimatedComponent {
        component_index,
        properties: Vec::new(),
    };
    for _ in 0..count {
        let Some(mut block) = read_next_block::<PropertyType, S>(stream)? else {
            break;
        };
        let Some(property) = block.kind else {
            log::debug!("skipping unknown property block {}", block.tag);
            continue;
        };

        let deform_len = if property == PropertyType::VertexDeform {
            let Some(vertex_count) = vertex_count else {
                actor.record_error(Error::invalid(format!(
                    "vertex deform keyed on component {component_index}, which is not an image"
                )));
                continue;
            };
            if let Some(image) = actor
                .component_mut(component_index)
                .and_then(|c| c.kind.image_mut())
            {
                image.has_vertex_deform_animation = true;
            }
            vertex_count * 2
        } else {
            0
        };

        let shape = FrameShape {
            property,
            deform_len,
        };
        match read_property(&mut block.stream, table, shape) {
            Ok(timeline) => animated.properties.push(timeline),
            Err(e) => actor.record_error(e),
        }
    }
    stream.close_array()?;
    stream.close_object()?;

    if is_event {
        animation.trigger_components.push(animated);
    } else {
        animation.components.push(animated);
    }
    Ok(())
}

fn read_animation<S: RecordStream>(
    actor: &mut Actor,
    table: &DecoderTable<S>,
    stream: &mut S,
    animation: &mut Animation,
) -> Result<(), Error> {
    (table.read_animation_header)(stream, animation)?;

    stream.open_array("keyed")?;
    let keyed = stream.read_u16_length()?;
    for _ in 0..keyed {
        read_keyed_component(actor, table, stream, animation)?;
    }
    stream.close_array()?;

    (table.read_animation_trailer)(stream, animation)
}

/// Decodes one animation block. The animation is kept even when its data is
/// truncated; the error is recorded on the actor.
pub(crate) fn read_animation_block<S: RecordStream>(
    actor: &mut Actor,
    table: &DecoderTable<S>,
    mut stream: S,
) {
    let mut animation = Animation::default();
    if let Err(e) = read_animation(actor, table, &mut stream, &mut animation) {
        actor.record_error(e);
    }
    actor.animations.push(animation);
}

pub(crate) fn read_animations_block<S: RecordStream>(
    actor: &mut Actor,
    table: &DecoderTable<S>,
    mut stream: S,
) {
    // Keeps the binary cursor aligned; the animation blocks themselves are read to the end.
    if let Err(e) = stream.read_u16_length() {
        actor.record_error(e);
        return;
    }
    loop {
        let block = match read_next_block::<BlockType, S>(&mut stream) {
            Ok(Some(block)) => block,
            Ok(None) => break,
            Err(e) => {
                actor.record_error(e);
                break;
            }
        };
        match block.kind {
            Some(BlockType::Animation) => read_animation_block(actor, table, block.stream),
            _ => log::debug!("skipping block {} inside animations", block.tag),
        }
    }
}
