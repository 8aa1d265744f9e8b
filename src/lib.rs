//! Generates NumPy `.npy` fixture files for matrix-multiplication tests.
//!
//! The default [`FixtureSet`] is the pair of inputs and the output buffer for a 7×5 by 5×3
//! single-precision matrix product:
//!
//! | file    | shape  | dtype | content              |
//! |---------|--------|-------|----------------------|
//! | `a.npy` | (7, 5) | `<f4` | uniform in `[0, 1)`  |
//! | `b.npy` | (5, 3) | `<f4` | uniform in `[0, 1)`  |
//! | `c.npy` | (7, 3) | `<f4` | zeros                |
//!
//! The files are written through [`npy`], a thin layer over `ndarray-npy`, and can be read by
//! anything that understands the format (`numpy.load`, `cnpy`, ...).
//!
//! ```rust,no_run
//! # use npy_fixtures::{FixtureSet, GenerateOptions};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let written = FixtureSet::default().generate(&GenerateOptions::in_dir("custom_test/npy_data"))?;
//! for file in written {
//!     println!("{}", file.path.display());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! See `tools/gen_npy` for the command-line front end.

use std::path::PathBuf;

pub mod error;

pub mod npy;

pub mod fill;
pub use fill::Fill;

mod fixture;
pub use fixture::{Fixture, FixtureSet, GeneratedFile};

/// Where fixtures are written when no directory is given, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "custom_test/npy_data";

/// Flags to alter the behavior of [`FixtureSet::generate()`]
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    /// Directory the `.npy` files are written to
    pub output_dir: PathBuf,
    /// Seed for the random source. When `None`, the generator is seeded from system entropy
    /// and element values differ on every run
    pub seed: Option<u64>,
    /// Create `output_dir` (and any missing parents) instead of failing when it doesn't exist
    pub create_dirs: bool,
}
impl GenerateOptions {
    pub fn in_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            seed: None,
            create_dirs: false,
        }
    }
}
impl Default for GenerateOptions {
    fn default() -> Self {
        Self::in_dir(DEFAULT_OUTPUT_DIR)
    }
}
