//! Normalization of heterogeneous inference outputs into a flat buffer plus
//! shape.

use ndarray::{ArrayBase, Data, Dimension};

use crate::decoder::RawOutput;
use crate::error::{Error, Result};

/// Owned flat `f32` buffer with its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedTensor {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl OwnedTensor {
    /// The product of `shape` must equal `data.len()`.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self> {
        let expected = shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| Error::MalformedTensor(format!("shape {shape:?} overflows")))?;
        if expected != data.len() {
            return Err(Error::MalformedTensor(format!(
                "shape {shape:?} needs {expected} elements, buffer has {}",
                data.len()
            )));
        }
        Ok(Self { data, shape })
    }

    pub fn as_raw(&self) -> RawOutput<'_> {
        RawOutput::new(&self.data, &self.shape)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}

/// Conversion of a model output representation into an [`OwnedTensor`].
///
/// Implement this for your inference backend's output type to feed it to
/// [`DetectionPipeline::process_tensor`](super::DetectionPipeline::process_tensor).
pub trait IntoRawTensor {
    fn into_raw_tensor(self) -> Result<OwnedTensor>;
}

impl IntoRawTensor for OwnedTensor {
    fn into_raw_tensor(self) -> Result<OwnedTensor> {
        Ok(self)
    }
}

impl IntoRawTensor for (Vec<f32>, Vec<usize>) {
    fn into_raw_tensor(self) -> Result<OwnedTensor> {
        OwnedTensor::new(self.0, self.1)
    }
}

impl IntoRawTensor for (&[f32], &[usize]) {
    fn into_raw_tensor(self) -> Result<OwnedTensor> {
        let data = collect_f32(self.0.len(), self.0.iter().copied())?;
        OwnedTensor::new(data, self.1.to_vec())
    }
}

impl IntoRawTensor for (Vec<f64>, Vec<usize>) {
    fn into_raw_tensor(self) -> Result<OwnedTensor> {
        let data = collect_f32(self.0.len(), self.0.iter().map(|&v| v as f32))?;
        OwnedTensor::new(data, self.1)
    }
}

impl<S, D> IntoRawTensor for &ArrayBase<S, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    fn into_raw_tensor(self) -> Result<OwnedTensor> {
        // Logical (row-major) order regardless of the array's strides.
        let data = collect_f32(self.len(), self.iter().copied())?;
        OwnedTensor::new(data, self.shape().to_vec())
    }
}

impl<S, D> IntoRawTensor for ArrayBase<S, D>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    fn into_raw_tensor(self) -> Result<OwnedTensor> {
        (&self).into_raw_tensor()
    }
}

/// Rows of equal length, read as `[rows, cols]`.
impl IntoRawTensor for Vec<Vec<f32>> {
    fn into_raw_tensor(self) -> Result<OwnedTensor> {
        let rows = self.len();
        let cols = uniform_len(self.iter().map(Vec::len))?;
        let data = collect_f32(rows * cols, self.into_iter().flatten())?;
        OwnedTensor::new(data, vec![rows, cols])
    }
}

/// Nested `[batch][rows][cols]` output.
impl IntoRawTensor for Vec<Vec<Vec<f32>>> {
    fn into_raw_tensor(self) -> Result<OwnedTensor> {
        let batch = self.len();
        let rows = uniform_len(self.iter().map(Vec::len))?;
        let cols = uniform_len(self.iter().flat_map(|m| m.iter().map(Vec::len)))?;
        let total = batch * rows * cols;
        let data = collect_f32(total, self.into_iter().flatten().flatten())?;
        OwnedTensor::new(data, vec![batch, rows, cols])
    }
}

/// Common length of every item, or 0 for no items.
fn uniform_len(mut lens: impl Iterator<Item = usize>) -> Result<usize> {
    let Some(first) = lens.next() else {
        return Ok(0);
    };
    match lens.find(|&l| l != first) {
        Some(other) => Err(Error::MalformedTensor(format!(
            "ragged nested output: lengths {first} and {other}"
        ))),
        None => Ok(first),
    }
}

fn collect_f32(len: usize, values: impl Iterator<Item = f32>) -> Result<Vec<f32>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)?;
    data.extend(values);
    Ok(data)
}
