use ndarray::{ArrayD, IxDyn};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// How the elements of a fixture are chosen
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fill {
    /// Every element is `0.0`
    Zeros,
    /// Every element is drawn independently and uniformly from the half-open range `[low, high)`
    Uniform {
        low: f32,
        high: f32,
    },
}
impl Fill {
    /// Uniform samples from `[0, 1)`
    pub const fn unit() -> Self {
        Self::Uniform { low: 0.0, high: 1.0 }
    }

    /// Builds an array of the given shape according to this policy
    ///
    /// # Panics
    /// If this is a [`Uniform`](Self::Uniform) fill with `low >= high` or a non-finite bound
    pub fn build(&self, shape: &[usize], rng: &mut impl Rng) -> ArrayD<f32> {
        match *self {
            Self::Zeros => ArrayD::zeros(IxDyn(shape)),
            Self::Uniform { low, high } => {
                assert!(low.is_finite() && high.is_finite() && low < high, "invalid uniform range [{low}, {high})");
                ArrayD::from_shape_simple_fn(IxDyn(shape), || rng.gen_range(low..high))
            },
        }
    }
}

/// A random source seeded from `seed` when one is given, or from system entropy otherwise
pub fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
