//! Cosine similarity between embedding vectors.

/// Compute cosine similarity between two vectors.
///
/// Mismatched lengths, empty input and zero-norm vectors all score 0.0
/// instead of failing, so one malformed embedding can't break a whole query.
/// Accumulation happens in f64 to avoid cancellation on long vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b.iter()).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, norm_a, norm_b), (&x, &y)| {
            let (x, y) = (x as f64, y as f64);
            (dot + x * y, norm_a + x * x, norm_b + y * y)
        },
    );

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }

    (dot / denom) as f32
}
