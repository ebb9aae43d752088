//! Multivariate feature sequences with validation guarantees.

use crate::error::DtwError;

/// Check the shape and contents of a flat `len * dim` buffer.
fn validate(values: &[f32], dim: usize) -> Result<(), DtwError> {
    if dim == 0 {
        return Err(DtwError::ZeroDimension);
    }
    if values.is_empty() {
        return Err(DtwError::EmptySequence);
    }
    if values.len() % dim != 0 {
        return Err(DtwError::BufferLengthMismatch {
            expected: (values.len() / dim + 1) * dim,
            got: values.len(),
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(DtwError::NonFiniteValue { index });
    }
    Ok(())
}

/// Owned, validated feature sequence stored as a flat row-major `f32` buffer.
///
/// Frame `i` occupies `values[i * dim..(i + 1) * dim]`. Guaranteed non-empty,
/// `dim >= 1` and all values finite.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSequence {
    values: Vec<f32>,
    dim: usize,
}

impl FeatureSequence {
    /// Create a sequence from a flat buffer of frames with `dim` features each.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ZeroDimension`] | `dim` is zero |
    /// | [`DtwError::EmptySequence`] | `values` is empty |
    /// | [`DtwError::BufferLengthMismatch`] | `values.len()` is not a multiple of `dim` |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(values: Vec<f32>, dim: usize) -> Result<Self, DtwError> {
        validate(&values, dim)?;
        Ok(Self { values, dim })
    }

    /// Create a sequence from one vector per frame.
    ///
    /// The dimension is taken from the first frame; every other frame must match it.
    ///
    /// # Errors
    ///
    /// Same as [`FeatureSequence::new`], plus [`DtwError::DimensionMismatch`]
    /// when a frame has a different length than the first.
    pub fn from_frames<F: AsRef<[f32]>>(frames: &[F]) -> Result<Self, DtwError> {
        let dim = frames.first().map_or(0, |f| f.as_ref().len());
        if frames.is_empty() {
            return Err(DtwError::EmptySequence);
        }
        let mut values = Vec::with_capacity(frames.len() * dim);
        for frame in frames {
            let frame = frame.as_ref();
            if frame.len() != dim {
                return Err(DtwError::DimensionMismatch {
                    left: dim,
                    right: frame.len(),
                });
            }
            values.extend_from_slice(frame);
        }
        Self::new(values, dim)
    }

    /// Borrow this sequence as a zero-copy view.
    #[must_use]
    pub fn as_view(&self) -> SequenceView<'_> {
        SequenceView::new_unchecked(&self.values, self.dim)
    }

    /// Return the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() / self.dim
    }

    /// Return true if the sequence has no frames.
    ///
    /// Always `false` for instances built through [`FeatureSequence::new`];
    /// provided for the `len_without_is_empty` convention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the feature dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return frame `index` as a slice of `dim` values.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn frame(&self, index: usize) -> &[f32] {
        &self.values[index * self.dim..(index + 1) * self.dim]
    }

    /// Consume and return the flat buffer.
    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.values
    }
}

impl AsRef<[f32]> for FeatureSequence {
    fn as_ref(&self) -> &[f32] {
        &self.values
    }
}

/// Borrowed, validated view of a flat feature buffer. Zero-copy.
#[derive(Debug, Clone, Copy)]
pub struct SequenceView<'a> {
    values: &'a [f32],
    dim: usize,
}

impl<'a> SequenceView<'a> {
    /// Create a view over `values`, validating it as `values.len() / dim` frames.
    ///
    /// # Errors
    ///
    /// Same conditions as [`FeatureSequence::new`].
    pub fn new(values: &'a [f32], dim: usize) -> Result<Self, DtwError> {
        validate(values, dim)?;
        Ok(Self { values, dim })
    }

    /// Create a view over a buffer whose frame count is stated explicitly.
    ///
    /// This is the shape the C ABI receives: `len` and `dim` are parameters,
    /// not inferred from the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::BufferLengthMismatch`] if `values.len() != len * dim`,
    /// otherwise the same conditions as [`SequenceView::new`].
    pub fn with_shape(values: &'a [f32], len: usize, dim: usize) -> Result<Self, DtwError> {
        if dim == 0 {
            return Err(DtwError::ZeroDimension);
        }
        if len == 0 {
            return Err(DtwError::EmptySequence);
        }
        let expected = len.checked_mul(dim).ok_or(DtwError::BufferLengthMismatch {
            expected: usize::MAX,
            got: values.len(),
        })?;
        if values.len() != expected {
            return Err(DtwError::BufferLengthMismatch {
                expected,
                got: values.len(),
            });
        }
        Self::new(values, dim)
    }

    pub(crate) fn new_unchecked(values: &'a [f32], dim: usize) -> Self {
        Self { values, dim }
    }

    /// Return the underlying flat buffer.
    #[must_use]
    pub fn as_slice(&self) -> &'a [f32] {
        self.values
    }

    /// Return the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len() / self.dim
    }

    /// Return true if the view has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return the feature dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Return frame `index` as a slice of `dim` values.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn frame(&self, index: usize) -> &'a [f32] {
        &self.values[index * self.dim..(index + 1) * self.dim]
    }

    /// Iterate over frames in order.
    pub fn frames(&self) -> std::slice::ChunksExact<'a, f32> {
        self.values.chunks_exact(self.dim)
    }
}

impl AsRef<[f32]> for SequenceView<'_> {
    fn as_ref(&self) -> &[f32] {
        self.values
    }
}
