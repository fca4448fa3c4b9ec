//! Typed, named, tuple-structured arrays.
//!
//! A [`TypedArray`] is a flat buffer of `tuple_count * component_count`
//! elements of a single [`ElementType`]. Components are grouped per tuple, so
//! the value for component `c` of tuple `t` lives at `t * component_count + c`.

use super::error::{DataError, DataResult};
use crate::types::ElementType;
use std::collections::TryReserveError;
use std::fmt;

/// Storage for a typed array, one variant per element type
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    String(Vec<String>),
}

macro_rules! with_vec {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            ArrayData::Int8($v) => $body,
            ArrayData::UInt8($v) => $body,
            ArrayData::Int16($v) => $body,
            ArrayData::UInt16($v) => $body,
            ArrayData::Int32($v) => $body,
            ArrayData::UInt32($v) => $body,
            ArrayData::Int64($v) => $body,
            ArrayData::UInt64($v) => $body,
            ArrayData::Float32($v) => $body,
            ArrayData::Float64($v) => $body,
            ArrayData::Bool($v) => $body,
            ArrayData::String($v) => $body,
        }
    };
}

macro_rules! numeric_get {
    ($v:expr, $index:expr) => {
        $v.get($index).map(|x| *x as f64)
    };
}

macro_rules! numeric_set {
    ($v:expr, $index:expr, $value:expr, $t:ty) => {
        match $v.get_mut($index) {
            Some(slot) => {
                *slot = $value as $t;
                true
            }
            None => false,
        }
    };
}

fn zeroed_vec<T: Clone + Default>(len: usize) -> Result<Vec<T>, TryReserveError> {
    let mut values = Vec::new();
    values.try_reserve_exact(len)?;
    values.resize(len, T::default());
    Ok(values)
}

/// Product of `dims`, or `None` on overflow
pub(crate) fn checked_product(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, d| acc.checked_mul(*d))
}

impl ArrayData {
    /// Allocate `len` default-valued (zero) elements of the given type.
    ///
    /// Fails instead of aborting when the allocation cannot be satisfied.
    pub fn try_zeroed(element_type: ElementType, len: usize) -> Result<Self, TryReserveError> {
        Ok(match element_type {
            ElementType::Int8 => ArrayData::Int8(zeroed_vec(len)?),
            ElementType::UInt8 => ArrayData::UInt8(zeroed_vec(len)?),
            ElementType::Int16 => ArrayData::Int16(zeroed_vec(len)?),
            ElementType::UInt16 => ArrayData::UInt16(zeroed_vec(len)?),
            ElementType::Int32 => ArrayData::Int32(zeroed_vec(len)?),
            ElementType::UInt32 => ArrayData::UInt32(zeroed_vec(len)?),
            ElementType::Int64 => ArrayData::Int64(zeroed_vec(len)?),
            ElementType::UInt64 => ArrayData::UInt64(zeroed_vec(len)?),
            ElementType::Float32 => ArrayData::Float32(zeroed_vec(len)?),
            ElementType::Float64 => ArrayData::Float64(zeroed_vec(len)?),
            ElementType::Bool => ArrayData::Bool(zeroed_vec(len)?),
            ElementType::String => ArrayData::String(zeroed_vec(len)?),
        })
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ArrayData::Int8(_) => ElementType::Int8,
            ArrayData::UInt8(_) => ElementType::UInt8,
            ArrayData::Int16(_) => ElementType::Int16,
            ArrayData::UInt16(_) => ElementType::UInt16,
            ArrayData::Int32(_) => ElementType::Int32,
            ArrayData::UInt32(_) => ElementType::UInt32,
            ArrayData::Int64(_) => ElementType::Int64,
            ArrayData::UInt64(_) => ElementType::UInt64,
            ArrayData::Float32(_) => ElementType::Float32,
            ArrayData::Float64(_) => ElementType::Float64,
            ArrayData::Bool(_) => ElementType::Bool,
            ArrayData::String(_) => ElementType::String,
        }
    }

    pub fn len(&self) -> usize {
        with_vec!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reserve room for `len` elements in total
    fn try_reserve_len(&mut self, len: usize) -> Result<(), TryReserveError> {
        with_vec!(self, v => v.try_reserve_exact(len.saturating_sub(v.len())))
    }

    fn try_resize(&mut self, len: usize) -> Result<(), TryReserveError> {
        self.try_reserve_len(len)?;
        with_vec!(self, v => v.resize(len, Default::default()));
        Ok(())
    }

    fn reset(&mut self) {
        with_vec!(self, v => v.iter_mut().for_each(|x| *x = Default::default()))
    }

    /// Read element `index` as a float. Booleans read as 0/1, strings as `None`.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            ArrayData::Int8(v) => numeric_get!(v, index),
            ArrayData::UInt8(v) => numeric_get!(v, index),
            ArrayData::Int16(v) => numeric_get!(v, index),
            ArrayData::UInt16(v) => numeric_get!(v, index),
            ArrayData::Int32(v) => numeric_get!(v, index),
            ArrayData::UInt32(v) => numeric_get!(v, index),
            ArrayData::Int64(v) => numeric_get!(v, index),
            ArrayData::UInt64(v) => numeric_get!(v, index),
            ArrayData::Float32(v) => numeric_get!(v, index),
            ArrayData::Float64(v) => numeric_get!(v, index),
            ArrayData::Bool(v) => v.get(index).map(|b| if *b { 1.0 } else { 0.0 }),
            ArrayData::String(_) => None,
        }
    }

    /// Write element `index` from a float, saturating into the element type.
    ///
    /// Returns `false` when the index is out of bounds or the array holds strings.
    pub fn set_f64(&mut self, index: usize, value: f64) -> bool {
        match self {
            ArrayData::Int8(v) => numeric_set!(v, index, value, i8),
            ArrayData::UInt8(v) => numeric_set!(v, index, value, u8),
            ArrayData::Int16(v) => numeric_set!(v, index, value, i16),
            ArrayData::UInt16(v) => numeric_set!(v, index, value, u16),
            ArrayData::Int32(v) => numeric_set!(v, index, value, i32),
            ArrayData::UInt32(v) => numeric_set!(v, index, value, u32),
            ArrayData::Int64(v) => numeric_set!(v, index, value, i64),
            ArrayData::UInt64(v) => numeric_set!(v, index, value, u64),
            ArrayData::Float32(v) => numeric_set!(v, index, value, f32),
            ArrayData::Float64(v) => numeric_set!(v, index, value, f64),
            ArrayData::Bool(v) => match v.get_mut(index) {
                Some(slot) => {
                    *slot = value != 0.0;
                    true
                }
                None => false,
            },
            ArrayData::String(_) => false,
        }
    }
}

/// Rust types that can be stored in a [`TypedArray`]
pub trait Element: Clone + Default + fmt::Debug + 'static {
    const ELEMENT_TYPE: ElementType;

    fn slice(data: &ArrayData) -> Option<&[Self]>;
    fn slice_mut(data: &mut ArrayData) -> Option<&mut [Self]>;
    fn wrap(values: Vec<Self>) -> ArrayData;
}

macro_rules! impl_element {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $t {
                const ELEMENT_TYPE: ElementType = ElementType::$variant;

                fn slice(data: &ArrayData) -> Option<&[Self]> {
                    match data {
                        ArrayData::$variant(v) => Some(v.as_slice()),
                        _ => None,
                    }
                }

                fn slice_mut(data: &mut ArrayData) -> Option<&mut [Self]> {
                    match data {
                        ArrayData::$variant(v) => Some(v.as_mut_slice()),
                        _ => None,
                    }
                }

                fn wrap(values: Vec<Self>) -> ArrayData {
                    ArrayData::$variant(values)
                }
            }
        )*
    };
}

impl_element! {
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float32,
    f64 => Float64,
    bool => Bool,
    String => String,
}

/// Structural description of an array (everything except its values)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayShape {
    pub element_type: ElementType,
    pub component_dims: Vec<usize>,
    pub tuple_count: usize,
}

impl ArrayShape {
    pub fn component_count(&self) -> usize {
        self.component_dims.iter().product()
    }
}

/// A named array of `tuple_count` tuples with `component_dims` components each
#[derive(Debug, Clone, PartialEq)]
pub struct TypedArray {
    name: String,
    data: ArrayData,
    component_dims: Vec<usize>,
    tuple_count: usize,
}

fn validate_component_dims(name: &str, component_dims: &[usize]) -> DataResult<()> {
    if component_dims.is_empty() || component_dims.contains(&0) {
        return Err(DataError::InvalidComponentDims {
            array: name.to_string(),
            dims: component_dims.to_vec(),
        });
    }
    Ok(())
}

impl TypedArray {
    /// Allocate a zero-filled array
    pub fn new(
        name: impl Into<String>,
        element_type: ElementType,
        tuple_count: usize,
        component_dims: &[usize],
    ) -> DataResult<Self> {
        let name = name.into();
        validate_component_dims(&name, component_dims)?;
        let data = match element_count(tuple_count, component_dims) {
            Some(len) => ArrayData::try_zeroed(element_type, len).ok(),
            None => None,
        };
        let Some(data) = data else {
            return Err(too_large(&name, tuple_count, component_dims));
        };
        Ok(Self {
            data,
            name,
            component_dims: component_dims.to_vec(),
            tuple_count,
        })
    }

    /// Build an array from existing values; the tuple count is derived from
    /// the value count.
    pub fn from_vec<T: Element>(
        name: impl Into<String>,
        component_dims: &[usize],
        values: Vec<T>,
    ) -> DataResult<Self> {
        let name = name.into();
        validate_component_dims(&name, component_dims)?;
        let Some(component_count) = checked_product(component_dims) else {
            return Err(too_large(&name, 1, component_dims));
        };
        if values.len() % component_count != 0 {
            return Err(DataError::LengthMismatch {
                array: name,
                len: values.len(),
                component_count,
            });
        }
        Ok(Self {
            tuple_count: values.len() / component_count,
            data: T::wrap(values),
            name,
            component_dims: component_dims.to_vec(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    pub fn component_dims(&self) -> &[usize] {
        &self.component_dims
    }

    pub fn component_count(&self) -> usize {
        self.component_dims.iter().product()
    }

    pub fn tuple_count(&self) -> usize {
        self.tuple_count
    }

    /// Total number of elements (`tuple_count * component_count`)
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Approximate memory footprint of the element storage
    pub fn byte_len(&self) -> usize {
        self.len() * self.element_type().size_bytes()
    }

    pub fn shape(&self) -> ArrayShape {
        ArrayShape {
            element_type: self.element_type(),
            component_dims: self.component_dims.clone(),
            tuple_count: self.tuple_count,
        }
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Borrow the elements as `T`, or `None` if `T` is not the element type
    pub fn as_slice<T: Element>(&self) -> Option<&[T]> {
        T::slice(&self.data)
    }

    pub fn as_mut_slice<T: Element>(&mut self) -> Option<&mut [T]> {
        T::slice_mut(&mut self.data)
    }

    /// Components of tuple `index`
    pub fn tuple<T: Element>(&self, index: usize) -> Option<&[T]> {
        let count = self.component_count();
        let start = index.checked_mul(count)?;
        self.as_slice::<T>()?.get(start..start + count)
    }

    pub fn value_as_f64(&self, index: usize) -> Option<f64> {
        self.data.get_f64(index)
    }

    pub fn set_from_f64(&mut self, index: usize, value: f64) -> bool {
        self.data.set_f64(index, value)
    }

    /// Set every element to `value` (numeric arrays only)
    pub fn fill_f64(&mut self, value: f64) -> bool {
        if !self.element_type().is_numeric() {
            return false;
        }
        for index in 0..self.len() {
            self.data.set_f64(index, value);
        }
        true
    }

    /// Reset every element to its default (zero) value
    pub fn initialize_with_zeros(&mut self) {
        self.data.reset();
    }

    /// Reserve storage for `tuple_count` tuples without changing the array
    pub(crate) fn reserve_tuples(&mut self, tuple_count: usize) -> DataResult<()> {
        let reserved = element_count(tuple_count, &self.component_dims)
            .and_then(|len| self.data.try_reserve_len(len).ok());
        reserved.ok_or_else(|| too_large(&self.name, tuple_count, &self.component_dims))
    }

    /// Change the number of tuples, keeping existing leading values and
    /// zero-filling new ones. Only the owning attribute matrix resizes its
    /// arrays, so the shared tuple count cannot drift.
    pub(crate) fn resize_tuples(&mut self, tuple_count: usize) -> DataResult<()> {
        let resized = element_count(tuple_count, &self.component_dims)
            .and_then(|len| self.data.try_resize(len).ok());
        match resized {
            Some(()) => {
                self.tuple_count = tuple_count;
                Ok(())
            }
            None => Err(too_large(&self.name, tuple_count, &self.component_dims)),
        }
    }
}

fn element_count(tuple_count: usize, component_dims: &[usize]) -> Option<usize> {
    checked_product(component_dims)?.checked_mul(tuple_count)
}

fn too_large(name: &str, tuple_count: usize, component_dims: &[usize]) -> DataError {
    DataError::TooLarge {
        array: name.to_string(),
        tuple_count,
        component_dims: component_dims.to_vec(),
    }
}
