use crate::error::Error;

/// Cosine similarity of two equal-length vectors. Zero-norm input scores 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, Error> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    let (mut dot, mut norm_a, mut norm_b) = (0f32, 0f32, 0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f32::EPSILON {
        return Ok(0.0);
    }
    Ok(dot / denom)
}

/// Index and value of the most similar candidate; ties keep the earliest.
pub fn most_similar<'a, I>(query: &[f32], candidates: I) -> Result<Option<(usize, f32)>, Error>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut best: Option<(usize, f32)> = None;
    for (idx, candidate) in candidates.into_iter().enumerate() {
        let sim = cosine_similarity(query, candidate)?;
        match best {
            Some((_, b)) if sim <= b => {}
            _ => best = Some((idx, sim)),
        }
    }
    Ok(best)
}
