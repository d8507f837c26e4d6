use crate::error::{DedupError, Result};

/// Cosine of the angle between `a` and `b`.
///
/// A zero-magnitude vector scores 0.0. Vectors of different length, or ones
/// holding NaN or infinity, are a data-integrity problem and are rejected
/// instead of scored. Sums are taken in f64 so any finite f32 input stays
/// finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(DedupError::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }

    let (dot, na, nb) = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| (f64::from(x), f64::from(y)))
        .fold((0.0f64, 0.0f64, 0.0f64), |(d, aa, bb), (x, y)| {
            (d + (x * y), aa + (x * x), bb + (y * y))
        });

    if na == 0.0 || nb == 0.0 {
        return Ok(0.0);
    }

    let sim = dot / (na.sqrt() * nb.sqrt());
    if !sim.is_finite() {
        return Err(DedupError::NonFiniteSimilarity);
    }
    Ok(sim.clamp(-1.0, 1.0) as f32)
}
