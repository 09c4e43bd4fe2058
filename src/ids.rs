use crate::error::GraphError;
use ahash::AHashSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default number of draws before a unique id request gives up.
pub const DEFAULT_MAX_ID_ATTEMPTS: u32 = 32;

/// Generates `{prefix}_{8 hex digits}` ids.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    rng: StdRng,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl IdGenerator {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A fresh id with no uniqueness check.
    pub fn fresh(&mut self, prefix: &str) -> String {
        format!("{}_{:08x}", prefix, self.rng.random::<u32>())
    }

    /// A fresh id for which `taken` returns false, retried up to `attempts` times.
    pub fn unique(
        &mut self,
        prefix: &str,
        attempts: u32,
        taken: impl Fn(&str) -> bool,
    ) -> Result<String, GraphError> {
        for _ in 0..attempts {
            let candidate = self.fresh(prefix);
            if !taken(&candidate) {
                return Ok(candidate);
            }
        }
        Err(GraphError::IdCollision {
            prefix: prefix.to_string(),
            attempts,
        })
    }

    /// Like [`unique`](Self::unique) against a set of ids already handed out
    /// in one container. The new id is added to `taken`.
    pub fn unique_in(
        &mut self,
        prefix: &str,
        taken: &mut AHashSet<String>,
    ) -> Result<String, GraphError> {
        let id = self.unique(prefix, DEFAULT_MAX_ID_ATTEMPTS, |c| taken.contains(c))?;
        taken.insert(id.clone());
        Ok(id)
    }
}
