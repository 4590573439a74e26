/// 3D vector helpers for the shading math.
///
/// Free functions over `Vec3` in `f32`, matching what the equivalent
/// fragment shader evaluates.

use crate::engine::types::Vec3;

// ─── Vector operations ───────────────────────────────────────

#[inline(always)]
pub fn vec3_add(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3 {
        x: a.x + b.x,
        y: a.y + b.y,
        z: a.z + b.z,
    }
}

#[inline(always)]
pub fn vec3_sub(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3 {
        x: a.x - b.x,
        y: a.y - b.y,
        z: a.z - b.z,
    }
}

#[inline(always)]
pub fn vec3_scale(v: &Vec3, s: f32) -> Vec3 {
    Vec3 {
        x: v.x * s,
        y: v.y * s,
        z: v.z * s,
    }
}

#[inline(always)]
pub fn vec3_dot(a: &Vec3, b: &Vec3) -> f32 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

#[inline(always)]
pub fn vec3_length(v: &Vec3) -> f32 {
    (v.x * v.x + v.y * v.y + v.z * v.z).sqrt()
}

/// Normalize in place. Zero-length vectors are left untouched.
#[inline(always)]
pub fn vec3_normalize(v: &mut Vec3) {
    let len = vec3_length(v);
    if len > 1e-30 {
        let inv = 1.0 / len;
        v.x *= inv;
        v.y *= inv;
        v.z *= inv;
    }
}

#[inline(always)]
pub fn vec3_normalized(v: &Vec3) -> Vec3 {
    let mut result = *v;
    vec3_normalize(&mut result);
    result
}

/// Unit direction from `from` towards `to`.
#[inline]
pub fn vec3_direction(from: &Vec3, to: &Vec3) -> Vec3 {
    vec3_normalized(&vec3_sub(to, from))
}
