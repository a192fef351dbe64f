//! Jelly bones: a bone's jelly driver lays its jelly-bone children along a cubic bezier
//! running from the bone's origin to its tip, resampled to equal arc lengths.
//!
//! All curve math happens in the owning bone's local space, where the tip sits at
//! `(length, 0)`. The in/out control points are derived from targets or from the
//! neighbouring bones so consecutive jelly chains join smoothly.

use super::transform::{invert_world, world_translation};
use crate::{Actor, ComponentKind, Error, Jelly};
use glam::{Affine2, Vec2};

/// Forward-differencing steps used to sample the bezier before resampling.
pub const JELLY_SAMPLES: usize = 16;

/// Tangent length, relative to bone length, that approximates a circular arc:
/// `4 * (sqrt(2) - 1) / 3 * sqrt(2) / 2`.
pub const CURVE_CONSTANT: f32 = 0.390_524_3;

/// Relative tolerance of the jelly cache comparisons.
pub const JELLY_CACHE_EPSILON: f32 = 0.001;

/// Inputs of the last follower layout; a matching update is skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct JellyCache {
    pub count: usize,
    pub tip: Vec2,
    pub in_point: Vec2,
    pub out_point: Vec2,
    pub scale_in: f32,
    pub scale_out: f32,
}

fn fuzzy_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= JELLY_CACHE_EPSILON * 1.0_f32.max(a.abs()).max(b.abs())
}

fn fuzzy_eq_vec2(a: Vec2, b: Vec2) -> bool {
    fuzzy_eq(a.x, b.x) && fuzzy_eq(a.y, b.y)
}

impl JellyCache {
    pub fn matches(&self, other: &JellyCache) -> bool {
        self.count == other.count
            && fuzzy_eq_vec2(self.tip, other.tip)
            && fuzzy_eq_vec2(self.in_point, other.in_point)
            && fuzzy_eq_vec2(self.out_point, other.out_point)
            && fuzzy_eq(self.scale_in, other.scale_in)
            && fuzzy_eq(self.scale_out, other.scale_out)
    }
}

/// Samples one coordinate of a cubic bezier at `count + 1` evenly spaced parameters.
pub fn forward_diff_bezier(c0: f32, c1: f32, c2: f32, c3: f32, count: usize) -> Vec<f32> {
    let n = count as f32;
    let mut f = n;
    let p1 = 3.0 * (c1 - c0) / f;
    f *= n;
    let p2 = 3.0 * (c0 - 2.0 * c1 + c2) / f;
    f *= n;
    let p3 = (c3 - c0 + 3.0 * (c1 - c2)) / f;

    let mut value = c0;
    let mut d1 = p1 + p2 + p3;
    let mut d2 = 2.0 * p2 + 6.0 * p3;
    let d3 = 6.0 * p3;
    (0..=count)
        .map(|_| {
            let out = value;
            value += d1;
            d1 += d2;
            d2 += d3;
            out
        })
        .collect()
}

pub fn bezier_points(q0: Vec2, q1: Vec2, q2: Vec2, q3: Vec2, count: usize) -> Vec<Vec2> {
    let xs = forward_diff_bezier(q0.x, q1.x, q2.x, q3.x, count);
    let ys = forward_diff_bezier(q0.y, q1.y, q2.y, q3.y, count);
    xs.into_iter().zip(ys).map(|(x, y)| Vec2::new(x, y)).collect()
}

/// Resamples a polyline into `segments` points spaced at equal arc length. The
/// polyline's first point is not part of the output; the last output point is its end.
pub fn normalize_curve(curve: &[Vec2], segments: usize) -> Vec<Vec2> {
    if curve.len() < 2 {
        return vec![curve.first().copied().unwrap_or(Vec2::ZERO); segments];
    }

    let mut distances = Vec::with_capacity(curve.len());
    distances.push(0.0_f32);
    for pair in curve.windows(2) {
        let last = distances[distances.len() - 1];
        distances.push(last + pair[0].distance(pair[1]));
    }
    let total = distances[distances.len() - 1];
    let segment_length = total / segments as f32;

    let last_index = curve.len() - 1;
    let mut point_index = 1;
    (1..=segments)
        .map(|i| {
            let distance = segment_length * i as f32;
            while point_index < last_index && distances[point_index] < distance {
                point_index += 1;
            }
            let d = distances[point_index];
            let span = d - distances[point_index - 1];
            let ratio = if span > 0.0 { (d - distance) / span } else { 0.0 };
            curve[point_index - 1] * ratio + curve[point_index] * (1.0 - ratio)
        })
        .collect()
}

/// Parent bone whose first child bone is the jelly's bone, and the jelly it carries.
struct ParentLink {
    bone: usize,
    world: Affine2,
    length: f32,
    jelly: usize,
}

impl Actor {
    pub fn jelly(&self, index: usize) -> Option<&Jelly> {
        match self.component(index).map(|c| &c.kind) {
            Some(ComponentKind::Jelly(jelly)) => Some(jelly),
            _ => None,
        }
    }

    fn jelly_mut(&mut self, index: usize) -> Option<&mut Jelly> {
        match self.component_mut(index).map(|c| &mut c.kind) {
            Some(ComponentKind::Jelly(jelly)) => Some(jelly),
            _ => None,
        }
    }

    /// Length of the bone a jelly driver is parented to.
    fn jelly_bone_length(&self, index: usize) -> Option<f32> {
        let bone = self.component(index)?.parent?;
        self.component(bone)?.kind.bone().map(|b| b.length)
    }

    fn set_jelly_in(&mut self, index: usize, point: Vec2, direction: Vec2) {
        if let Some(jelly) = self.jelly_mut(index) {
            jelly.in_point = point;
            jelly.in_direction = direction;
        }
    }

    fn set_jelly_out(&mut self, index: usize, point: Vec2, direction: Vec2) {
        if let Some(jelly) = self.jelly_mut(index) {
            jelly.out_point = point;
            jelly.out_direction = direction;
        }
    }

    /// Lays the follower bones of jelly `index` along its curve.
    ///
    /// Returns `false` when nothing was recomputed: the component is not a jelly on a
    /// bone, it has no followers, or its inputs match the cached ones.
    pub fn update_jellies(&mut self, index: usize) -> bool {
        let Some(bone_length) = self.jelly_bone_length(index) else {
            return false;
        };
        let Some(jelly) = self.jelly(index) else {
            return false;
        };
        if jelly.bones.is_empty() {
            return false;
        }

        let key = JellyCache {
            count: jelly.bones.len(),
            tip: Vec2::new(bone_length, 0.0),
            in_point: jelly.in_point,
            out_point: jelly.out_point,
            scale_in: jelly.scale_in,
            scale_out: jelly.scale_out,
        };
        if jelly.cache.as_ref().is_some_and(|cache| cache.matches(&key)) {
            return false;
        }

        let points = bezier_points(
            Vec2::ZERO,
            key.in_point,
            key.out_point,
            key.tip,
            JELLY_SAMPLES,
        );
        let resampled = normalize_curve(&points, key.count);
        let followers = jelly.bones.clone();
        let scale_step = if key.count > 1 {
            (key.scale_out - key.scale_in) / (key.count - 1) as f32
        } else {
            0.0
        };
        let scale_in = key.scale_in;
        if let Some(jelly) = self.jelly_mut(index) {
            jelly.cache = Some(key);
        }

        let mut last = points[0];
        for (i, (&follower, &point)) in followers.iter().zip(&resampled).enumerate() {
            if let Some(bone) = self.component_mut(follower).and_then(|c| c.kind.bone_mut()) {
                let diff = point - last;
                bone.node.translation = last;
                bone.length = diff.length();
                bone.node.scale.y = scale_in + scale_step * i as f32;
                bone.node.rotation = diff.y.atan2(diff.x);
                bone.node.transform_dirty = true;
            }
            last = point;
        }
        true
    }

    /// Points the outbound tangent of jelly `index` along `direction` and re-lays its
    /// followers.
    pub fn set_jelly_out_direction(&mut self, index: usize, direction: Vec2) -> bool {
        let Some(bone_length) = self.jelly_bone_length(index) else {
            return false;
        };
        let Some(ease_out) = self.jelly(index).map(|j| j.ease_out) else {
            return false;
        };
        let length = ease_out * bone_length * CURVE_CONSTANT;
        let direction = direction.normalize_or_zero();
        let tip = Vec2::new(bone_length, 0.0);
        self.set_jelly_out(index, tip + direction * length, direction);
        self.update_jellies(index)
    }

    fn parent_link(&self, bone: usize) -> Option<ParentLink> {
        let parent = self.component(bone)?.parent?;
        let parent_bone = self.component(parent)?.kind.bone()?;
        if parent_bone.first_bone != Some(bone) {
            return None;
        }
        Some(ParentLink {
            bone: parent,
            world: parent_bone.node.world_transform,
            length: parent_bone.length,
            jelly: parent_bone.jelly?,
        })
    }

    /// Derives the inbound (and, for the last bone of a chain, outbound) control points
    /// of jelly `index` from its targets and its neighbours, then re-lays the affected
    /// followers. World transforms must be current.
    ///
    /// A singular bone transform abandons the update with
    /// [`Error::SingularTransform`].
    pub fn update_jelly_in_point(&mut self, index: usize) -> Result<(), Error> {
        let Some(jelly) = self.jelly(index) else {
            return Ok(());
        };
        let (ease_in, in_target, out_target) = (jelly.ease_in, jelly.in_target, jelly.out_target);
        let Some(bone_index) = self.component(index).and_then(|c| c.parent) else {
            return Ok(());
        };
        let Some(bone) = self.component(bone_index).and_then(|c| c.kind.bone()) else {
            return Ok(());
        };
        let bone_world = bone.node.world_transform;
        let first_bone = bone.first_bone;
        let length = ease_in * bone.length * CURVE_CONSTANT;

        let parent = self.parent_link(bone_index);
        let in_target = in_target.and_then(|t| world_translation(self, t));
        let parent_out_target = parent
            .as_ref()
            .and_then(|p| self.jelly(p.jelly))
            .and_then(|j| j.out_target)
            .and_then(|t| world_translation(self, t));

        match (in_target, parent) {
            (Some(target), parent) => {
                let inverse = invert_world(self, bone_index)?;
                let in_point = inverse.transform_point2(target);
                let in_direction = in_point.normalize_or_zero();
                self.set_jelly_in(index, in_point, in_direction);

                if let Some(parent) = parent {
                    let parent_inverse = invert_world(self, parent.bone)?;
                    if let Some(out_target) = parent_out_target {
                        let out_point = parent_inverse.transform_point2(out_target);
                        self.set_jelly_out(parent.jelly, out_point, out_point.normalize_or_zero());
                        self.update_jellies(parent.jelly);
                    } else {
                        let world_out = bone_world.transform_vector2(in_direction);
                        let local_out = parent_inverse.transform_vector2(world_out);
                        self.set_jelly_out_direction(parent.jelly, -local_out);
                    }
                }
            }
            (None, Some(parent)) => {
                if let Some(out_target) = parent_out_target {
                    // Follow the parent's out target so the two chains meet tangentially.
                    let parent_inverse = invert_world(self, parent.bone)?;
                    let out_point = parent_inverse.transform_point2(out_target);
                    let parent_tip = Vec2::new(parent.length, 0.0);
                    let out_direction = (out_point - parent_tip).normalize_or_zero();
                    self.set_jelly_out(parent.jelly, out_point, out_direction);

                    let inverse = invert_world(self, bone_index)?;
                    let world_out = parent.world.transform_vector2(out_direction);
                    let in_direction = (-inverse.transform_vector2(world_out)).normalize_or_zero();
                    self.set_jelly_in(index, in_direction * length, in_direction);
                    self.update_jellies(parent.jelly);
                } else {
                    // Split the angle between the parent bone and this one.
                    let inverse = invert_world(self, bone_index)?;
                    let parent_inverse = invert_world(self, parent.bone)?;
                    let d1 = parent.world.transform_vector2(Vec2::X);
                    let d2 = bone_world.transform_vector2(Vec2::X);
                    let sum = (d1 + d2).normalize_or_zero();

                    let local_in = inverse.transform_vector2(sum);
                    self.set_jelly_in(index, local_in * length, local_in);
                    let local_out = parent_inverse.transform_vector2(sum);
                    self.set_jelly_out_direction(parent.jelly, -local_out);
                }
            }
            (None, None) => self.set_jelly_in(index, Vec2::new(length, 0.0), Vec2::X),
        }

        if first_bone.is_none() {
            match out_target.and_then(|t| world_translation(self, t)) {
                Some(target) => {
                    let inverse = invert_world(self, bone_index)?;
                    let out_point = inverse.transform_point2(target);
                    self.set_jelly_out(index, out_point, out_point.normalize_or_zero());
                    self.update_jellies(index);
                }
                None => {
                    self.set_jelly_out_direction(index, Vec2::new(-1.0, 0.0));
                }
            }
        }
        Ok(())
    }
}
