use std::{
    error::Error,
    fmt::{Display, Formatter},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReadNpyError {
    /// The underlying file could not be read
    IoError,
    /// The preamble is malformed: bad magic string, unsupported version, unparseable dictionary,
    /// or a shape whose size overflows
    InvalidHeader,
    /// The dtype stored in the file is not the one requested by the caller,
    /// or is stored in the other byte order
    DTypeMismatch,
    /// The file ends before the preamble or the element data it declares
    Truncated,
    /// There are bytes after the element data
    ExtraData,
    /// The element data is not valid for the requested type
    InvalidData,
}
impl Display for ReadNpyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::IoError => "Failed to read NPY file: I/O error",
            Self::InvalidHeader => "Failed to read NPY file: invalid header",
            Self::DTypeMismatch => "Failed to read NPY file: unexpected dtype",
            Self::Truncated => "Failed to read NPY file: file is truncated",
            Self::ExtraData => "Failed to read NPY file: unexpected data after the array",
            Self::InvalidData => "Failed to read NPY file: invalid element data",
        })
    }
}
impl Error for ReadNpyError {}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WriteNpyError;
impl Display for WriteNpyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Failed to write NPY file")
    }
}
impl Error for WriteNpyError {}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GenerateError {
    /// A fixture's shape has more elements than can be held in memory
    TooLarge,
    /// The output directory does not exist and was not allowed to be created
    MissingOutputDir,
    /// Creating the output directory failed
    CreateDir,
    /// Serializing a fixture failed
    Write,
    /// The fixture set doesn't describe a valid matrix product
    IncompatibleShapes,
}
impl Display for GenerateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::TooLarge => "Fixture is too large to build",
            Self::MissingOutputDir => "Output directory does not exist",
            Self::CreateDir => "Failed to create output directory",
            Self::Write => "Failed to write fixture",
            Self::IncompatibleShapes => "Fixture shapes are incompatible with a matrix product",
        })
    }
}
impl Error for GenerateError {}
