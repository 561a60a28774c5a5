//! Raw model output and tensor layout inference.

use ndarray::{ArrayView2, ShapeBuilder};

/// Feature width of an 80-class detector: 4 box values plus 80 class scores.
pub const DEFAULT_FEATURE_COUNT: usize = 84;

/// Number of leading box features (cx, cy, w, h) in every prediction.
pub const BOX_FEATURES: usize = 4;

/// Flat output buffer of a detector plus its shape.
///
/// Borrowed from the inference engine for the duration of one decode call.
#[derive(Debug, Clone, Copy)]
pub struct RawOutput<'a> {
    data: &'a [f32],
    shape: &'a [usize],
}

impl<'a> RawOutput<'a> {
    pub fn new(data: &'a [f32], shape: &'a [usize]) -> Self {
        Self { data, shape }
    }

    #[inline]
    pub fn data(&self) -> &'a [f32] {
        self.data
    }

    #[inline]
    pub fn shape(&self) -> &'a [usize] {
        self.shape
    }
}

/// Memory order of the prediction and feature axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// `feature * num_predictions + prediction`
    FeatureMajor,
    /// `prediction * num_features + feature`
    PredictionMajor,
}

/// Resolved interpretation of a detector output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorLayout {
    pub kind: LayoutKind,
    pub num_predictions: usize,
    pub num_features: usize,
    /// Whether the layout was matched on the fixed feature count rather than
    /// guessed from the last axis.
    pub matched: bool,
    /// Unbatched `[N, 84]` output, whose box convention cannot be told from
    /// the shape alone.
    pub direct: bool,
}

impl TensorLayout {
    /// Infer the layout from a shape and buffer length.
    ///
    /// Accepts `[a, b]` and `[batch, a, b]`; only the first image of a batch is
    /// addressed. The axis equal to [`DEFAULT_FEATURE_COUNT`] is the feature
    /// axis. Otherwise the last axis is taken as the prediction axis and the
    /// feature width is `elements / num_predictions`, read prediction-major.
    ///
    /// Returns `None` for shapes that cannot describe a detection tensor.
    pub fn infer(shape: &[usize], len: usize) -> Option<Self> {
        let (a, b, batched) = match *shape {
            [a, b] => (a, b, false),
            [batch, a, b] if batch >= 1 => (a, b, true),
            _ => return None,
        };

        let total: usize = shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))?;
        if total != len || a == 0 || b == 0 {
            return None;
        }

        let layout = if a == DEFAULT_FEATURE_COUNT {
            Self {
                kind: LayoutKind::FeatureMajor,
                num_predictions: b,
                num_features: a,
                matched: true,
                direct: false,
            }
        } else if b == DEFAULT_FEATURE_COUNT {
            Self {
                kind: LayoutKind::PredictionMajor,
                num_predictions: a,
                num_features: b,
                matched: true,
                direct: !batched,
            }
        } else {
            let per_image = a * b;
            Self {
                kind: LayoutKind::PredictionMajor,
                num_predictions: b,
                num_features: per_image / b,
                matched: false,
                direct: false,
            }
        };

        if layout.num_features <= BOX_FEATURES {
            return None;
        }
        Some(layout)
    }

    /// Number of buffer elements one image occupies.
    #[inline]
    pub fn elements(&self) -> usize {
        self.num_predictions * self.num_features
    }

    /// View the first image as a `(num_predictions, num_features)` matrix,
    /// whatever the memory order.
    pub fn view<'a>(&self, data: &'a [f32]) -> Option<ArrayView2<'a, f32>> {
        let data = data.get(..self.elements())?;
        let dims = (self.num_predictions, self.num_features);
        match self.kind {
            LayoutKind::PredictionMajor => ArrayView2::from_shape(dims, data).ok(),
            LayoutKind::FeatureMajor => ArrayView2::from_shape(dims.f(), data).ok(),
        }
    }
}
