//! Reading and writing NumPy's `.npy` container format
//!
//! A `.npy` file is a short preamble (magic string, format version, and a Python dictionary literal
//! describing the element type, memory order, and shape) followed by the raw element data.
//! See [the NumPy format description](https://numpy.org/doc/stable/reference/generated/numpy.lib.format.html).
//!
//! Encoding and decoding are done by [`ndarray_npy`]; this module adds path handling,
//! tracing spans, and `error-stack` contexts on top.

use std::{
    fs::{self, File},
    io::{BufWriter, ErrorKind, Write},
    path::Path,
};

use error_stack::{Report, Result, ResultExt};
use ndarray::{ArrayBase, ArrayD, ArrayViewD, Data, Dimension};
use ndarray_npy::{ReadNpyExt, ReadableElement, ViewElement, ViewNpyError, ViewNpyExt, WritableElement, WriteNpyExt};

use crate::error::{ReadNpyError, WriteNpyError};

/// Magic string at the start of every `.npy` file
pub const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Serializes `array` to `writer` as a complete `.npy` file
///
/// Arrays which are contiguous in column-major order are written with `fortran_order: True`
/// to avoid a copy; everything else is written in row-major order.
/// The format version is 1.0 unless the header is too long for it, in which case it's 2.0.
pub fn write_npy<S, D>(writer: impl Write, array: &ArrayBase<S, D>) -> Result<(), WriteNpyError>
where
    S: Data,
    S::Elem: WritableElement,
    D: Dimension,
{
    array.write_npy(writer)
        .change_context(WriteNpyError)
        .attach_printable_lazy(|| format!("Failed to write array of shape {:?}", array.shape()))
}

/// Deserializes a complete `.npy` file held in `bytes`
///
/// The file's dtype must match `T` exactly and be stored in the host's byte order;
/// no numeric conversion is performed.
/// Nothing is allocated for the element data until the header's shape
/// has been checked against the number of bytes actually present.
pub fn read_npy<T>(bytes: &[u8]) -> Result<ArrayD<T>, ReadNpyError>
where
    T: ReadableElement + ViewElement,
{
    // the view checks the header, dtype, and data length without copying;
    // alignment is only checked after the length, so a misaligned buffer has the right size
    match ArrayViewD::<T>::view_npy(bytes) {
        Ok(_) | Err(ViewNpyError::MisalignedData) => {},
        Err(e) => return Err(view_error(e)),
    }
    ArrayD::<T>::read_npy(bytes).map_err(read_error)
}

fn view_error(err: ViewNpyError) -> Report<ReadNpyError> {
    let kind = match &err {
        ViewNpyError::Io(e) if e.kind() == ErrorKind::UnexpectedEof => ReadNpyError::Truncated,
        ViewNpyError::Io(_) => ReadNpyError::IoError,
        ViewNpyError::ParseHeader(_) | ViewNpyError::LengthOverflow | ViewNpyError::WrongNdim(_, _) =>
            ReadNpyError::InvalidHeader,
        ViewNpyError::WrongDescriptor(_) | ViewNpyError::NonNativeEndian => ReadNpyError::DTypeMismatch,
        ViewNpyError::MissingBytes(_) => ReadNpyError::Truncated,
        ViewNpyError::ExtraBytes(_) => ReadNpyError::ExtraData,
        _ => ReadNpyError::InvalidData,
    };
    Report::new(err).change_context(kind)
}

fn read_error(err: ndarray_npy::ReadNpyError) -> Report<ReadNpyError> {
    use ndarray_npy::ReadNpyError as E;
    let kind = match &err {
        E::Io(e) if e.kind() == ErrorKind::UnexpectedEof => ReadNpyError::Truncated,
        E::Io(_) => ReadNpyError::IoError,
        E::ParseHeader(_) | E::LengthOverflow | E::WrongNdim(_, _) => ReadNpyError::InvalidHeader,
        E::WrongDescriptor(_) => ReadNpyError::DTypeMismatch,
        E::MissingData => ReadNpyError::Truncated,
        E::ExtraBytes(_) => ReadNpyError::ExtraData,
        E::ParseData(_) => ReadNpyError::InvalidData,
    };
    Report::new(err).change_context(kind)
}

/// Writes `array` to a new `.npy` file at `path`, replacing the file if it already exists
pub fn save<S, D>(path: impl AsRef<Path>, array: &ArrayBase<S, D>) -> Result<(), WriteNpyError>
where
    S: Data,
    S::Elem: WritableElement,
    D: Dimension,
{
    let path = path.as_ref();
    let path_str = path.to_string_lossy().to_string();
    let _span_guard = tracing::debug_span!("save", path = path_str).entered();

    let file = File::create(path)
        .change_context(WriteNpyError)
        .attach_printable_lazy(|| format!("Failed to open file {path_str} for writing"))?;
    let mut writer = BufWriter::new(file);
    write_npy(&mut writer, array)?;
    writer.flush()
        .change_context(WriteNpyError)
        .attach_printable_lazy(|| format!("Failed to flush {path_str}"))
}

/// Reads the `.npy` file at `path`
pub fn load<T>(path: impl AsRef<Path>) -> Result<ArrayD<T>, ReadNpyError>
where
    T: ReadableElement + ViewElement,
{
    let path = path.as_ref();
    let path_str = path.to_string_lossy().to_string();
    let _span_guard = tracing::debug_span!("load", path = path_str).entered();

    let bytes = fs::read(path)
        .change_context(ReadNpyError::IoError)
        .attach_printable_lazy(|| format!("Failed to read file {path_str}"))?;
    tracing::debug!("Read {} bytes", bytes.len());
    read_npy(&bytes)
        .attach_printable_lazy(|| format!("Failed to decode {path_str}"))
}
