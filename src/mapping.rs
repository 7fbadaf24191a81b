//! Scalar range helpers shared by every stage of the pipeline.
//!
//! None of these clamp implicitly. A zero-width input range in [`map_range`] divides by
//! zero and yields an infinite or NaN result; callers keep their bounds distinct.

/// Linearly re-maps `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Inverted output ranges are allowed (`out_min > out_max`) and flip the direction.
#[inline]
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    out_min + (out_max - out_min) * ((value - in_min) / (in_max - in_min))
}

/// `max(lo, min(hi, value))`. Unlike `f32::clamp` this never panics on `lo > hi`.
#[inline]
pub fn constrain(value: f32, lo: f32, hi: f32) -> f32 {
    lo.max(hi.min(value))
}

/// Unbounded linear interpolation; `t` outside `[0, 1]` overshoots on purpose.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Maps a continuous position onto an index of a buffer of `len` items.
///
/// Returns `None` for empty buffers; everything else is clamped into range.
pub fn index_for(pos: f32, pos_max: f32, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let raw = map_range(pos, 0.0, pos_max, 0.0, len as f32);
    if !raw.is_finite() {
        return Some(0);
    }
    Some((raw.floor().max(0.0) as usize).min(len - 1))
}
