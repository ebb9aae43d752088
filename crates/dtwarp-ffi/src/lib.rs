//! C ABI for the dtwarp kernel.
//!
//! [`dtw_compute_path`] returns a [`DtwPath`] by value. On success its three
//! arrays are owned by the library and must be handed back exactly once
//! through [`dtw_release_path`]. On failure the arrays are null, the length
//! is zero and there is nothing to release; releasing anyway is a no-op.

use std::ffi::{CStr, c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::{mem, ptr, slice};

use dtwarp_core::{Alignment, DtwError};
use tracing::{debug, error};

/// Base name of the shared library produced by this crate.
pub const LIBRARY_NAME: &str = "dtwarp_ffi";

/// Outcome of a C ABI call.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtwStatus {
    /// The path was computed; the arrays are valid.
    Ok = 0,
    /// The two sequences have different feature dimensions.
    DimensionMismatch = 1,
    /// `band_win` is below -1.
    InvalidBand = 2,
    /// The band is too narrow to reach the terminal cell.
    NoPathFound = 3,
    /// A non-finite value appeared during the recurrence.
    NumericError = 4,
    /// Null pointer, non-positive length or dimension, bad weight, or
    /// non-finite input.
    InvalidArgument = 5,
    /// The kernel panicked; the unwind was stopped at the boundary.
    Panic = 6,
}

impl DtwStatus {
    /// Decode a raw status code.
    #[must_use]
    pub fn from_code(code: c_int) -> Option<Self> {
        Some(match code {
            0 => Self::Ok,
            1 => Self::DimensionMismatch,
            2 => Self::InvalidBand,
            3 => Self::NoPathFound,
            4 => Self::NumericError,
            5 => Self::InvalidArgument,
            6 => Self::Panic,
            _ => return None,
        })
    }

    /// Static description of the status.
    #[must_use]
    pub fn message(self) -> &'static CStr {
        match self {
            Self::Ok => c"ok",
            Self::DimensionMismatch => c"feature dimensions differ",
            Self::InvalidBand => c"band window must be -1 or non-negative",
            Self::NoPathFound => c"no alignment path within the band",
            Self::NumericError => c"non-finite value during accumulation",
            Self::InvalidArgument => c"invalid argument",
            Self::Panic => c"internal panic",
        }
    }
}

impl From<&DtwError> for DtwStatus {
    fn from(err: &DtwError) -> Self {
        match err {
            DtwError::DimensionMismatch { .. } => Self::DimensionMismatch,
            DtwError::InvalidBand { .. } => Self::InvalidBand,
            DtwError::NoPathFound { .. } => Self::NoPathFound,
            DtwError::NumericError { .. } => Self::NumericError,
            DtwError::EmptySequence
            | DtwError::ZeroDimension
            | DtwError::BufferLengthMismatch { .. }
            | DtwError::NonFiniteValue { .. }
            | DtwError::InvalidDiagonalWeight { .. } => Self::InvalidArgument,
        }
    }
}

/// Alignment result handed across the C boundary.
///
/// `distances[k]` is the local distance between frame `seq1_indices[k]` of
/// the first sequence and frame `seq2_indices[k]` of the second, for
/// `k < length`.
#[repr(C)]
#[derive(Debug)]
pub struct DtwPath {
    /// Outcome of the call.
    pub status: DtwStatus,
    /// Number of path steps; 0 on error.
    pub length: c_int,
    /// Accumulated cost at the terminal cell; 0 on error.
    pub total_cost: f32,
    /// Local distances along the path, or null.
    pub distances: *mut f32,
    /// First-sequence frame indices, or null.
    pub seq1_indices: *mut c_int,
    /// Second-sequence frame indices, or null.
    pub seq2_indices: *mut c_int,
}

impl DtwPath {
    fn failed(status: DtwStatus) -> Self {
        Self {
            status,
            length: 0,
            total_cost: 0.0,
            distances: ptr::null_mut(),
            seq1_indices: ptr::null_mut(),
            seq2_indices: ptr::null_mut(),
        }
    }

    fn from_alignment(alignment: Alignment) -> Result<Self, DtwStatus> {
        let total_cost = alignment.total_cost();
        let length = c_int::try_from(alignment.len()).map_err(|_| DtwStatus::InvalidArgument)?;
        let (distances, seq1, seq2) = alignment.into_parts();

        // Frame indices are below a length that arrived as a c_int.
        let seq1: Vec<c_int> = seq1.into_iter().map(|i| i as c_int).collect();
        let seq2: Vec<c_int> = seq2.into_iter().map(|j| j as c_int).collect();

        Ok(Self {
            status: DtwStatus::Ok,
            length,
            total_cost,
            distances: into_raw(distances),
            seq1_indices: into_raw(seq1),
            seq2_indices: into_raw(seq2),
        })
    }

    /// Return true if the call succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == DtwStatus::Ok
    }
}

fn into_raw<T>(values: Vec<T>) -> *mut T {
    Box::into_raw(values.into_boxed_slice()).cast::<T>()
}

/// Free one array previously produced by [`into_raw`] and null the handle.
///
/// # Safety
///
/// `*slot` is null or came from [`into_raw`] with exactly `len` elements.
unsafe fn free_array<T>(slot: &mut *mut T, len: usize) {
    if slot.is_null() {
        return;
    }
    drop(unsafe { Box::from_raw(ptr::slice_from_raw_parts_mut(*slot, len)) });
    *slot = ptr::null_mut();
}

fn positive(value: c_int) -> Result<usize, DtwStatus> {
    match usize::try_from(value) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(DtwStatus::InvalidArgument),
    }
}

fn flat_len(frames: usize, dim: usize) -> Result<usize, DtwStatus> {
    frames
        .checked_mul(dim)
        .filter(|&n| n <= isize::MAX as usize / mem::size_of::<f32>())
        .ok_or(DtwStatus::InvalidArgument)
}

/// # Safety
///
/// See [`dtw_compute_path`].
unsafe fn compute(
    seq1: *const f32,
    seq2: *const f32,
    len_seq1: c_int,
    len_seq2: c_int,
    dim: c_int,
    w_diag: f32,
    band_win: c_int,
) -> Result<DtwPath, DtwStatus> {
    if seq1.is_null() || seq2.is_null() {
        return Err(DtwStatus::InvalidArgument);
    }
    let n1 = positive(len_seq1)?;
    let n2 = positive(len_seq2)?;
    let dim = positive(dim)?;

    let a = unsafe { slice::from_raw_parts(seq1, flat_len(n1, dim)?) };
    let b = unsafe { slice::from_raw_parts(seq2, flat_len(n2, dim)?) };

    let alignment = dtwarp_core::compute_path(a, b, n1, n2, dim, w_diag, i64::from(band_win))
        .map_err(|e| {
            debug!(error = %e, "alignment failed");
            DtwStatus::from(&e)
        })?;
    DtwPath::from_alignment(alignment)
}

/// Align two row-major `f32` feature matrices and return the optimal path.
///
/// `seq1` holds `len_seq1 * dim` values, `seq2` holds `len_seq2 * dim`.
/// `band_win == -1` means unconstrained; `w_diag` must be finite and
/// non-negative.
///
/// # Safety
///
/// `seq1` and `seq2` must each be null or point to at least
/// `len * dim` readable `f32` values that stay valid for the call.
/// A successful result must be passed to [`dtw_release_path`] exactly once.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dtw_compute_path(
    seq1: *const f32,
    seq2: *const f32,
    len_seq1: c_int,
    len_seq2: c_int,
    dim: c_int,
    w_diag: f32,
    band_win: c_int,
) -> DtwPath {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| unsafe {
        compute(seq1, seq2, len_seq1, len_seq2, dim, w_diag, band_win)
    }));
    match outcome {
        Ok(Ok(path)) => path,
        Ok(Err(status)) => DtwPath::failed(status),
        Err(_) => {
            error!("panic stopped at the C boundary");
            DtwPath::failed(DtwStatus::Panic)
        }
    }
}

/// Free the arrays of a [`DtwPath`] and null its handles.
///
/// Null `path`, an error result, and a second release are all no-ops.
///
/// # Safety
///
/// `path` must be null or point to a [`DtwPath`] returned by
/// [`dtw_compute_path`] whose fields the caller has not modified.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn dtw_release_path(path: *mut DtwPath) {
    let Some(path) = (unsafe { path.as_mut() }) else {
        return;
    };
    let len = usize::try_from(path.length).unwrap_or(0);
    unsafe {
        free_array(&mut path.distances, len);
        free_array(&mut path.seq1_indices, len);
        free_array(&mut path.seq2_indices, len);
    }
    path.length = 0;
}

/// Static, NUL-terminated description of a status code.
///
/// Unknown codes get a generic message. The pointer is never null and must
/// not be freed.
#[unsafe(no_mangle)]
pub extern "C" fn dtw_status_message(status: c_int) -> *const c_char {
    DtwStatus::from_code(status)
        .map_or(c"unknown status", DtwStatus::message)
        .as_ptr()
}

/// Platform file name of the shared library, e.g. `libdtwarp_ffi.so`,
/// `libdtwarp_ffi.dylib` or `dtwarp_ffi.dll`.
#[must_use]
pub fn library_file_name() -> String {
    format!(
        "{}{LIBRARY_NAME}{}",
        std::env::consts::DLL_PREFIX,
        std::env::consts::DLL_SUFFIX
    )
}
