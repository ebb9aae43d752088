//! Calls through the C ABI exactly as a foreign caller would.

use std::ffi::{CStr, c_int};
use std::{ptr, slice};

use dtwarp_ffi::{DtwPath, DtwStatus, dtw_compute_path, dtw_release_path, dtw_status_message};

fn compute(seq1: &[f32], seq2: &[f32], n1: c_int, n2: c_int, dim: c_int, w: f32, band: c_int) -> DtwPath {
    unsafe { dtw_compute_path(seq1.as_ptr(), seq2.as_ptr(), n1, n2, dim, w, band) }
}

fn assert_empty(path: &DtwPath, status: DtwStatus) {
    assert_eq!(path.status, status);
    assert_eq!(path.length, 0);
    assert!(path.distances.is_null());
    assert!(path.seq1_indices.is_null());
    assert!(path.seq2_indices.is_null());
}

#[test]
fn identity_returns_matching_arrays() {
    let seq = [0.0f32, 1.0, 2.0];
    let mut path = compute(&seq, &seq, 3, 3, 1, 1.0, -1);

    assert!(path.is_ok());
    assert_eq!(path.length, 3);
    assert_eq!(path.total_cost, 0.0);
    let len = path.length as usize;
    unsafe {
        assert_eq!(slice::from_raw_parts(path.distances, len), &[0.0, 0.0, 0.0]);
        assert_eq!(slice::from_raw_parts(path.seq1_indices, len), &[0, 1, 2]);
        assert_eq!(slice::from_raw_parts(path.seq2_indices, len), &[0, 1, 2]);
        dtw_release_path(&mut path);
    }
    assert_empty(&path, DtwStatus::Ok);
}

#[test]
fn unequal_lengths_follow_known_path() {
    let a = [1.0f32, 2.0, 3.0, 4.0];
    let b = [1.0f32, 3.0, 4.0];
    let mut path = compute(&a, &b, 4, 3, 1, 1.0, -1);

    assert!(path.is_ok());
    assert_eq!(path.total_cost, 1.0);
    let len = path.length as usize;
    unsafe {
        assert_eq!(slice::from_raw_parts(path.distances, len), &[0.0, 1.0, 0.0, 0.0]);
        assert_eq!(slice::from_raw_parts(path.seq1_indices, len), &[0, 1, 2, 3]);
        assert_eq!(slice::from_raw_parts(path.seq2_indices, len), &[0, 0, 1, 2]);
        dtw_release_path(&mut path);
    }
}

#[test]
fn multivariate_frames_use_row_major_layout() {
    // Two frames of dimension 2 against one: every cell is a horizontal or vertical walk.
    let a = [0.0f32, 0.0, 3.0, 4.0];
    let b = [0.0f32, 0.0];
    let mut path = compute(&a, &b, 2, 1, 2, 1.0, 0);

    assert!(path.is_ok());
    assert_eq!(path.length, 2);
    assert_eq!(path.total_cost, 5.0);
    unsafe {
        assert_eq!(slice::from_raw_parts(path.distances, 2), &[0.0, 5.0]);
        dtw_release_path(&mut path);
    }
}

#[test]
fn double_release_is_a_noop() {
    let seq = [0.5f32, 1.5];
    let mut path = compute(&seq, &seq, 2, 2, 1, 1.0, -1);
    unsafe {
        dtw_release_path(&mut path);
        dtw_release_path(&mut path);
    }
    assert_empty(&path, DtwStatus::Ok);
}

#[test]
fn releasing_null_is_a_noop() {
    unsafe { dtw_release_path(ptr::null_mut()) };
}

#[test]
fn narrow_band_reports_no_path() {
    let a = [0.0f32, 2.0, 4.0];
    let b = [0.0f32, 1.0, 2.0, 3.0, 4.0];
    let mut path = compute(&a, &b, 3, 5, 1, 1.0, 0);
    assert_empty(&path, DtwStatus::NoPathFound);
    unsafe { dtw_release_path(&mut path) };
    assert_empty(&path, DtwStatus::NoPathFound);
}

#[test]
fn null_input_is_invalid_argument() {
    let seq = [0.0f32];
    let path = unsafe { dtw_compute_path(ptr::null(), seq.as_ptr(), 1, 1, 1, 1.0, -1) };
    assert_empty(&path, DtwStatus::InvalidArgument);
    let path = unsafe { dtw_compute_path(seq.as_ptr(), ptr::null(), 1, 1, 1, 1.0, -1) };
    assert_empty(&path, DtwStatus::InvalidArgument);
}

#[test]
fn non_positive_shapes_are_invalid_argument() {
    let seq = [0.0f32, 1.0];
    assert_empty(&compute(&seq, &seq, 0, 2, 1, 1.0, -1), DtwStatus::InvalidArgument);
    assert_empty(&compute(&seq, &seq, 2, -1, 1, 1.0, -1), DtwStatus::InvalidArgument);
    assert_empty(&compute(&seq, &seq, 2, 2, 0, 1.0, -1), DtwStatus::InvalidArgument);
}

#[test]
fn bad_parameters_are_rejected() {
    let seq = [0.0f32, 1.0];
    assert_empty(&compute(&seq, &seq, 2, 2, 1, -0.5, -1), DtwStatus::InvalidArgument);
    assert_empty(&compute(&seq, &seq, 2, 2, 1, f32::NAN, -1), DtwStatus::InvalidArgument);
    assert_empty(&compute(&seq, &seq, 2, 2, 1, 1.0, -2), DtwStatus::InvalidBand);
}

#[test]
fn non_finite_input_is_invalid_argument() {
    let a = [0.0f32, f32::INFINITY];
    let b = [0.0f32, 1.0];
    assert_empty(&compute(&a, &b, 2, 2, 1, 1.0, -1), DtwStatus::InvalidArgument);
}

#[test]
fn every_status_has_a_message() {
    for code in 0..=6 {
        let message = unsafe { CStr::from_ptr(dtw_status_message(code)) };
        assert!(!message.to_bytes().is_empty(), "status {code}");
    }
    let unknown = unsafe { CStr::from_ptr(dtw_status_message(42)) };
    assert_eq!(unknown.to_str().unwrap(), "unknown status");
}
