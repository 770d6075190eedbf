use std::fmt;
use std::str::FromStr;

use dm_tensor::Matrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{BenchError, Result};

/// Synthetic input pattern for benchmark matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fill {
    /// `value[i] = i` over the flattened buffer.
    #[default]
    Indexed,
    Identity,
    /// Uniform values in `[-1, 1)` from a seeded RNG.
    Random { seed: u64 },
}

impl Fill {
    /// Replace the seed of a `Random` fill; other patterns are unchanged.
    pub fn with_seed(self, seed: u64) -> Self {
        match self {
            Fill::Random { .. } => Fill::Random { seed },
            other => other,
        }
    }

    /// Build an `n x n` matrix. `stream` separates the A and B inputs of a
    /// random fill so they are not identical.
    pub fn matrix(&self, n: usize, stream: u64) -> Result<Matrix> {
        let m = match *self {
            Fill::Indexed => Matrix::indexed(n)?,
            Fill::Identity => Matrix::identity(n)?,
            Fill::Random { seed } => {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(stream));
                Matrix::from_fn(n, |_, _| rng.gen_range(-1.0f32..1.0))?
            }
        };
        Ok(m)
    }
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fill::Indexed => write!(f, "indexed"),
            Fill::Identity => write!(f, "identity"),
            Fill::Random { seed } => write!(f, "random(seed={})", seed),
        }
    }
}

impl FromStr for Fill {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "indexed" | "index" => Ok(Fill::Indexed),
            "identity" | "eye" => Ok(Fill::Identity),
            "random" => Ok(Fill::Random { seed: 0 }),
            other => Err(BenchError::UnknownFill(other.to_string())),
        }
    }
}
