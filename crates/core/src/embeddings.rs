pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 256;

/// Maps text to a fixed-size vector for similarity search. Implementations
/// must be deterministic; the same text always embeds to the same vector.
pub trait Embedder {
    fn dimensions(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Local, dependency-free embedder: hashed character trigram counts,
/// L2-normalized so that the dot product of two embeddings is their cosine
/// similarity. Good enough for passage ranking; swap in a model-backed
/// implementation behind the same trait for production quality.
#[derive(Debug, Clone, Copy)]
pub struct HashedTrigramEmbedder {
    pub dimensions: usize,
}

impl Default for HashedTrigramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

fn fnv1a(token: &str) -> u64 {
    let mut hash = 0xcbf29ce484222325u64;
    for byte in token.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

impl Embedder for HashedTrigramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let buckets = self.dimensions.max(1);
        let mut vector = vec![0f32; buckets];

        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();
        if chars.is_empty() {
            return vector;
        }

        if chars.len() < 3 {
            let bucket = (fnv1a(&lowered) % buckets as u64) as usize;
            vector[bucket] = 1.0;
            return vector;
        }

        for trigram in chars.windows(3) {
            let token: String = trigram.iter().collect();
            let bucket = (fnv1a(&token) % buckets as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        vector
    }
}

#[cfg(test)]
mod tests {
    use super::{Embedder, HashedTrigramEmbedder};

    #[test]
    fn embedding_is_deterministic() {
        let embedder = HashedTrigramEmbedder::default();
        assert_eq!(
            embedder.embed("relief valve cracking pressure"),
            embedder.embed("relief valve cracking pressure")
        );
    }

    #[test]
    fn embedding_has_configured_length_and_unit_norm() {
        let embedder = HashedTrigramEmbedder { dimensions: 64 };
        let vector = embedder.embed("hydraulic accumulator precharge");
        assert_eq!(vector.len(), 64);
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_text_embeds_to_zero_vector() {
        let embedder = HashedTrigramEmbedder::default();
        assert!(embedder.embed("").iter().all(|v| *v == 0.0));
    }

    #[test]
    fn similar_text_scores_higher_than_unrelated_text() {
        let embedder = HashedTrigramEmbedder::default();
        let question = embedder.embed("what is the pump pressure");
        let relevant = embedder.embed("the pump pressure is rated at 40 bar");
        let unrelated = embedder.embed("quarterly marketing review agenda");

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&question, &relevant) > dot(&question, &unrelated));
    }
}
