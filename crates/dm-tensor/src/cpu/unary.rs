//! Element-wise helpers that walk a buffer front to back in lane-sized steps.

use wide::f32x8;

/// Multiply every element of `data` by `factor` in place.
pub fn scale_in_place(data: &mut [f32], factor: f32) {
    let f = f32x8::splat(factor);
    let mut chunks = data.chunks_exact_mut(8);
    for chunk in &mut chunks {
        let mut buf = [0.0f32; 8];
        buf.copy_from_slice(chunk);
        chunk.copy_from_slice(&(f32x8::from(buf) * f).to_array());
    }
    for v in chunks.into_remainder() {
        *v *= factor;
    }
}
