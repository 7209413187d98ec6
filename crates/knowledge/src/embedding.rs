//! Deterministic token-hash embeddings and cosine similarity.
//!
//! Pure Rust, no model files, no network: each token hashes (FNV-1a 64)
//! into one of 256 signed buckets and the vector is L2 normalized. Good
//! enough for ranking short documentation passages, and fully
//! reproducible across runs and machines.

/// Embedding dimensionality.
pub const EMBEDDING_DIM: usize = 256;

fn fnv1a64(s: &str) -> u64 {
    let mut h: u64 = 14695981039346656037;
    for b in s.as_bytes() {
        h ^= *b as u64;
        h = h.wrapping_mul(1099511628211);
    }
    h
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Embed a text into a fixed-size vector. Repeated tokens accumulate;
/// the empty text embeds to the zero vector.
pub fn embed_text(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    for t in tokens(text) {
        let h = fnv1a64(&t);
        let idx = (h % (EMBEDDING_DIM as u64)) as usize;
        let sign = if ((h >> 32) & 1) == 0 { 1.0 } else { -1.0 };
        v[idx] += sign;
    }

    let norm2: f32 = v.iter().map(|x| x * x).sum();
    if norm2 > 0.0 {
        let inv = 1.0 / norm2.sqrt();
        for x in v.iter_mut() {
            *x *= inv;
        }
    }
    v
}

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal.
/// Returns 0.0 if the vectors differ in length, are empty, or either
/// norm is (near) zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_is_deterministic() {
        let a = embed_text("How do I reset my password?");
        let b = embed_text("How do I reset my password?");
        assert_eq!(a, b);
    }

    #[test]
    fn embedding_has_fixed_dimension_and_unit_norm() {
        let v = embed_text("two factor authentication setup guide");
        assert_eq!(v.len(), EMBEDDING_DIM);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_text_embeds_to_zero_vector() {
        let v = embed_text("   ");
        assert_eq!(v.len(), EMBEDDING_DIM);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn tokenization_ignores_case_and_punctuation() {
        let a = embed_text("Reset your PASSWORD!");
        let b = embed_text("reset your password");
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn related_text_scores_above_unrelated() {
        let query = embed_text("reset my password");
        let related = embed_text("To reset a forgotten password, open account settings");
        let unrelated = embed_text("The quarterly shipping carrier report is due Friday");
        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn cosine_identical_vectors() {
        let v = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal_vectors() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_mismatched_lengths() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_zero_vector() {
        let a = vec![0.0, 0.0, 0.0];
        let b = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }
}
