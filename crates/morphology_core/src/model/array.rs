//! Typed n-dimensional numeric buffers decoded from `.npy`/`.npz` payloads.
//!
//! # Responsibility
//! - Hold one decoded array as `shape` + row-major element buffer.
//! - Provide the widening/narrowing conversions used by mesh normalization.
//!
//! # Invariants
//! - `data.len()` always equals the product of `shape` (1 for scalars).
//! - Element order is C (row-major) regardless of the on-disk layout.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Element type of a [`NumericArray`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::Bool | Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// NumPy-style short name (`f8`, `u4`, `b1`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "b1",
            Self::I8 => "i1",
            Self::I16 => "i2",
            Self::I32 => "i4",
            Self::I64 => "i8",
            Self::U8 => "u1",
            Self::U16 => "u2",
            Self::U32 => "u4",
            Self::U64 => "u8",
            Self::F32 => "f4",
            Self::F64 => "f8",
        }
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-major element buffer, one variant per supported element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Bool(Vec<bool>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

macro_rules! impl_array_data_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for ArrayData {
                fn from(value: Vec<$ty>) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_array_data_from!(
    Bool => bool,
    I8 => i8,
    I16 => i16,
    I32 => i32,
    I64 => i64,
    U8 => u8,
    U16 => u16,
    U32 => u32,
    U64 => u64,
    F32 => f32,
    F64 => f64,
);

impl ArrayData {
    pub fn dtype(&self) -> DType {
        match self {
            Self::Bool(_) => DType::Bool,
            Self::I8(_) => DType::I8,
            Self::I16(_) => DType::I16,
            Self::I32(_) => DType::I32,
            Self::I64(_) => DType::I64,
            Self::U8(_) => DType::U8,
            Self::U16(_) => DType::U16,
            Self::U32(_) => DType::U32,
            Self::U64(_) => DType::U64,
            Self::F32(_) => DType::F32,
            Self::F64(_) => DType::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Bool(values) => values.len(),
            Self::I8(values) => values.len(),
            Self::I16(values) => values.len(),
            Self::I32(values) => values.len(),
            Self::I64(values) => values.len(),
            Self::U8(values) => values.len(),
            Self::U16(values) => values.len(),
            Self::U32(values) => values.len(),
            Self::U64(values) => values.len(),
            Self::F32(values) => values.len(),
            Self::F64(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raised when an element buffer does not match the declared shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMismatch {
    pub shape: Vec<usize>,
    pub elements: usize,
}

impl Display for ShapeMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match element_count(&self.shape) {
            Some(needed) => write!(
                f,
                "shape {:?} needs {needed} elements, buffer has {}",
                self.shape, self.elements
            ),
            None => write!(
                f,
                "shape {:?} overflows usize, buffer has {}",
                self.shape, self.elements
            ),
        }
    }
}

impl Error for ShapeMismatch {}

/// Element conversion failures for narrowing casts.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementError {
    /// Source dtype is not an integer type.
    NotInteger(DType),
    /// Value at `index` does not fit the target type.
    OutOfRange { index: usize, value: i128 },
}

impl Display for ElementError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInteger(dtype) => write!(f, "expected an integer dtype, got `{dtype}`"),
            Self::OutOfRange { index, value } => {
                write!(f, "element {index} with value {value} does not fit in u32")
            }
        }
    }
}

impl Error for ElementError {}

/// Decoded numeric array.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    shape: Vec<usize>,
    data: ArrayData,
}

/// Number of elements implied by `shape`; the empty shape is a scalar.
///
/// `None` when the product does not fit in `usize`.
pub fn element_count(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

impl NumericArray {
    /// Builds an array, checking the buffer length against `shape`.
    pub fn new(shape: Vec<usize>, data: impl Into<ArrayData>) -> Result<Self, ShapeMismatch> {
        let data = data.into();
        if element_count(&shape) != Some(data.len()) {
            return Err(ShapeMismatch {
                shape,
                elements: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// One-dimensional array over `data`.
    pub fn from_vec(data: impl Into<ArrayData>) -> Self {
        let data = data.into();
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn into_data(self) -> ArrayData {
        self.data
    }

    /// Widens every element to `f64`. Booleans map to `0.0`/`1.0`.
    ///
    /// 64-bit integers beyond 2^53 lose precision, as `numpy.astype` does.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match &self.data {
            ArrayData::Bool(values) => values.iter().map(|&v| f64::from(u8::from(v))).collect(),
            ArrayData::I8(values) => values.iter().map(|&v| f64::from(v)).collect(),
            ArrayData::I16(values) => values.iter().map(|&v| f64::from(v)).collect(),
            ArrayData::I32(values) => values.iter().map(|&v| f64::from(v)).collect(),
            ArrayData::I64(values) => values.iter().map(|&v| v as f64).collect(),
            ArrayData::U8(values) => values.iter().map(|&v| f64::from(v)).collect(),
            ArrayData::U16(values) => values.iter().map(|&v| f64::from(v)).collect(),
            ArrayData::U32(values) => values.iter().map(|&v| f64::from(v)).collect(),
            ArrayData::U64(values) => values.iter().map(|&v| v as f64).collect(),
            ArrayData::F32(values) => values.iter().map(|&v| f64::from(v)).collect(),
            ArrayData::F64(values) => values.clone(),
        }
    }

    /// Narrows an integer array to `u32`, rejecting negative or oversized values.
    pub fn to_u32_vec(&self) -> Result<Vec<u32>, ElementError> {
        fn narrow<T: Copy + Into<i128>>(values: &[T]) -> Result<Vec<u32>, ElementError> {
            values
                .iter()
                .enumerate()
                .map(|(index, &value)| {
                    let wide: i128 = value.into();
                    u32::try_from(wide).map_err(|_| ElementError::OutOfRange { index, value: wide })
                })
                .collect()
        }

        match &self.data {
            ArrayData::I8(values) => narrow(values),
            ArrayData::I16(values) => narrow(values),
            ArrayData::I32(values) => narrow(values),
            ArrayData::I64(values) => narrow(values),
            ArrayData::U8(values) => narrow(values),
            ArrayData::U16(values) => narrow(values),
            ArrayData::U32(values) => Ok(values.clone()),
            ArrayData::U64(values) => narrow(values),
            other => Err(ElementError::NotInteger(other.dtype())),
        }
    }
}
