use std::collections::BTreeSet;

use rand::Rng;

use crate::error::AtlasError;

/// Uniform without-replacement index sampler.
///
/// Draws `k` indices uniformly over `[0, pool_len)` and collects them into
/// a set, so colliding draws collapse and the result may hold fewer than
/// `k` indices. That is contract, not accident: callers asking for "up to
/// k" get up to k.
#[derive(Debug, Clone, Copy)]
pub struct RandomSampler {
    allow_undersample: bool,
}

impl RandomSampler {
    /// Strict sampler: requesting more than the pool holds is an error.
    pub fn new() -> Self {
        Self {
            allow_undersample: false,
        }
    }

    /// Sampler that accepts `k` larger than the pool and simply cannot
    /// return more than `pool_len` distinct indices.
    pub fn allowing_undersample() -> Self {
        Self {
            allow_undersample: true,
        }
    }

    pub fn sample(&self, pool_len: usize, k: usize) -> Result<BTreeSet<usize>, AtlasError> {
        if k == 0 {
            return Ok(BTreeSet::new());
        }
        if pool_len == 0 || (k > pool_len && !self.allow_undersample) {
            return Err(AtlasError::SampleUnderflow {
                requested: k,
                available: pool_len,
            });
        }

        let mut rng = rand::thread_rng();
        let mut indices = BTreeSet::new();
        for _ in 0..k {
            indices.insert(rng.gen_range(0..pool_len));
        }
        Ok(indices)
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}
