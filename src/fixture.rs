use std::{
    fs,
    path::{Path, PathBuf},
};

use error_stack::{Result, ResultExt, report};
use ndarray::ArrayD;
use rand::Rng;

use crate::{
    error::GenerateError,
    fill::{self, Fill},
    npy,
    GenerateOptions,
};

/// A single array to be written to `<name>.npy`
#[derive(Clone, Debug, PartialEq)]
pub struct Fixture {
    pub name: String,
    pub shape: Vec<usize>,
    pub fill: Fill,
}
impl Fixture {
    pub fn new(name: impl Into<String>, shape: impl Into<Vec<usize>>, fill: Fill) -> Self {
        Self {
            name: name.into(),
            shape: shape.into(),
            fill,
        }
    }

    /// Size of this fixture's element data in bytes,
    /// or `None` if it doesn't fit in a single allocation
    pub fn byte_len(&self) -> Option<usize> {
        let bytes = self.shape.iter()
            .try_fold(1usize, |len, &d| len.checked_mul(d))?
            .checked_mul(std::mem::size_of::<f32>())?;
        (bytes <= isize::MAX as usize).then_some(bytes)
    }

    /// Builds this fixture's array in memory
    pub fn build(&self, rng: &mut impl Rng) -> ArrayD<f32> {
        self.fill.build(&self.shape, rng)
    }

    /// Where this fixture is written, relative to an output directory
    pub fn path_in(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(format!("{}.npy", self.name))
    }
}

/// Describes a fixture file which was successfully written to disk
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedFile {
    pub name: String,
    pub path: PathBuf,
    pub shape: Vec<usize>,
    /// Size of the file, preamble included
    pub bytes: u64,
}

/// An ordered collection of fixtures, generated together with one random source
#[derive(Clone, Debug, PartialEq)]
pub struct FixtureSet {
    fixtures: Vec<Fixture>,
}
impl FixtureSet {
    pub fn new(fixtures: Vec<Fixture>) -> Self {
        Self { fixtures }
    }

    /// Inputs and output buffer for the product of an `m`×`k` and a `k`×`n` matrix:
    /// - `a`: `(m, k)`, uniform in `[0, 1)`
    /// - `b`: `(k, n)`, uniform in `[0, 1)`
    /// - `c`: `(m, n)`, zeros
    pub fn matmul(m: usize, k: usize, n: usize) -> Self {
        Self::new(vec![
            Fixture::new("a", [m, k], Fill::unit()),
            Fixture::new("b", [k, n], Fill::unit()),
            Fixture::new("c", [m, n], Fill::Zeros),
        ])
    }

    pub fn fixtures(&self) -> impl Iterator<Item = &Fixture> {
        self.fixtures.iter()
    }

    /// Returns the fixture with the given name, if there is one
    pub fn get(&self, name: impl AsRef<str>) -> Option<&Fixture> {
        self.fixtures.iter().find(|f| f.name == name.as_ref())
    }

    /// Checks that fixtures `a`, `b`, and `c` are all matrices,
    /// and that `c` has the shape of the product `a·b`
    pub fn check_matmul_shapes(&self) -> Result<(), GenerateError> {
        let shape = |name: &'static str| -> Result<[usize; 2], GenerateError> {
            let fixture = self.get(name)
                .ok_or(report!(GenerateError::IncompatibleShapes))
                .attach_printable_lazy(|| format!("No fixture named {name}"))?;
            match fixture.shape.as_slice() {
                &[rows, cols] => Ok([rows, cols]),
                other => Err(report!(GenerateError::IncompatibleShapes))
                    .attach_printable(format!("Fixture {name} must be 2-dimensional, found shape {other:?}")),
            }
        };
        let [m, k] = shape("a")?;
        let [k2, n] = shape("b")?;
        let c = shape("c")?;

        if k != k2 {
            return Err(report!(GenerateError::IncompatibleShapes))
                .attach_printable(format!("Inner dimensions differ: a is {m}x{k}, b is {k2}x{n}"));
        }
        if c != [m, n] {
            return Err(report!(GenerateError::IncompatibleShapes))
                .attach_printable(format!("c is {}x{}, but a·b is {m}x{n}", c[0], c[1]));
        }
        Ok(())
    }

    /// Builds every fixture in order and writes each one to `<output_dir>/<name>.npy`,
    /// overwriting any existing file
    ///
    /// Files written before a failure are left in place.
    pub fn generate(&self, opts: &GenerateOptions) -> Result<Vec<GeneratedFile>, GenerateError> {
        let dir = opts.output_dir.as_path();
        let dir_str = dir.to_string_lossy().to_string();
        let _span_guard = tracing::debug_span!("generate", dir = dir_str).entered();

        for fixture in &self.fixtures {
            if fixture.byte_len().is_none() {
                return Err(report!(GenerateError::TooLarge))
                    .attach_printable(format!("Fixture {} has shape {:?}", fixture.name, fixture.shape));
            }
        }

        if !dir.is_dir() {
            if opts.create_dirs {
                fs::create_dir_all(dir)
                    .change_context(GenerateError::CreateDir)
                    .attach_printable_lazy(|| format!("Failed to create {dir_str}"))?;
                tracing::info!("Created output directory {}", dir_str);
            } else {
                return Err(report!(GenerateError::MissingOutputDir))
                    .attach_printable(format!("{dir_str} does not exist or is not a directory"));
            }
        }

        let mut rng = fill::rng(opts.seed);
        let mut generated = Vec::with_capacity(self.fixtures.len());
        for fixture in &self.fixtures {
            let path = fixture.path_in(dir);
            if path.exists() {
                tracing::debug!("Overwriting {}", path.display());
            }

            let array = fixture.build(&mut rng);
            npy::save(&path, &array)
                .change_context(GenerateError::Write)
                .attach_printable_lazy(|| format!("Failed to write fixture {}", fixture.name))?;
            let bytes = fs::metadata(&path)
                .change_context(GenerateError::Write)
                .attach_printable_lazy(|| format!("Failed to stat {}", path.display()))?
                .len();
            tracing::info!("Wrote {} {:?} to {} ({bytes} bytes)", fixture.name, fixture.shape, path.display());

            generated.push(GeneratedFile {
                name: fixture.name.clone(),
                path,
                shape: fixture.shape.clone(),
                bytes,
            });
        }
        Ok(generated)
    }
}
impl Default for FixtureSet {
    /// `a`: 7×5, `b`: 5×3, `c`: 7×3
    fn default() -> Self {
        Self::matmul(7, 5, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set() {
        let set = FixtureSet::default();
        let names: Vec<_> = set.fixtures().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(set.get("a").unwrap().shape, [7, 5]);
        assert_eq!(set.get("b").unwrap().shape, [5, 3]);
        assert_eq!(set.get("c").unwrap().shape, [7, 3]);
        assert_eq!(set.get("c").unwrap().fill, Fill::Zeros);
        set.check_matmul_shapes().unwrap();
    }

    #[test]
    fn incompatible_shapes() {
        let kind = |set: FixtureSet| *set.check_matmul_shapes().unwrap_err().current_context();

        let inner = FixtureSet::new(vec![
            Fixture::new("a", [7, 5], Fill::unit()),
            Fixture::new("b", [4, 3], Fill::unit()),
            Fixture::new("c", [7, 3], Fill::Zeros),
        ]);
        assert_eq!(kind(inner), GenerateError::IncompatibleShapes);

        let output = FixtureSet::new(vec![
            Fixture::new("a", [7, 5], Fill::unit()),
            Fixture::new("b", [5, 3], Fill::unit()),
            Fixture::new("c", [3, 7], Fill::Zeros),
        ]);
        assert_eq!(kind(output), GenerateError::IncompatibleShapes);

        let missing = FixtureSet::new(vec![Fixture::new("a", [7, 5], Fill::unit())]);
        assert_eq!(kind(missing), GenerateError::IncompatibleShapes);

        let vector = FixtureSet::new(vec![
            Fixture::new("a", [5], Fill::unit()),
            Fixture::new("b", [5, 3], Fill::unit()),
            Fixture::new("c", [3], Fill::Zeros),
        ]);
        assert_eq!(kind(vector), GenerateError::IncompatibleShapes);
    }

    #[test]
    fn too_large() {
        assert_eq!(Fixture::new("c", [7, 3], Fill::Zeros).byte_len(), Some(7 * 3 * 4));
        assert_eq!(Fixture::new("s", Vec::new(), Fill::Zeros).byte_len(), Some(4));
        assert_eq!(Fixture::new("e", [0, 3], Fill::Zeros).byte_len(), Some(0));
        assert_eq!(Fixture::new("x", [usize::MAX / 2, 2], Fill::Zeros).byte_len(), None);

        let dir = tempfile::tempdir().unwrap();
        let set = FixtureSet::matmul(100_000_000_000, 100_000_000_000, 1);
        let err = set.generate(&GenerateOptions::in_dir(dir.path())).unwrap_err();
        assert_eq!(err.current_context(), &GenerateError::TooLarge);
        // rejected before anything is written
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn paths() {
        let fixture = Fixture::new("weights", [2, 2], Fill::Zeros);
        assert_eq!(fixture.path_in("out/dir"), Path::new("out/dir/weights.npy"));
    }
}
