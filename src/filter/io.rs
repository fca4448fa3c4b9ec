//! Reader and writer interfaces filters use to load and save their parameters.
//!
//! A reader is positioned on one filter's group with
//! [`FilterParametersReader::open_filter_group`]; every read takes a key and a
//! default, and returns the default whenever the key is absent, has the wrong
//! JSON type, or holds a number outside the requested type's range.
//!
//! Typed numeric reads go through [`Scalar`]:
//!
//! ```ignore
//! let reader: &dyn FilterParametersReader = &json_reader;
//! let classes: i32 = reader.read_value("NumClasses", 2);
//! let weights: Vec<f32> = reader.read_array("ColorWeights", vec![]);
//! ```

use crate::data::DataArrayPath;
use serde_json::Number;

/// Source of filter parameter values
pub trait FilterParametersReader {
    /// Position the reader on the group for the filter at `index`.
    /// Returns `false` when no such group exists.
    fn open_filter_group(&mut self, index: usize) -> bool;

    fn close_filter_group(&mut self);

    fn read_string(&self, key: &str, default: String) -> String;

    fn read_strings(&self, key: &str, default: Vec<String>) -> Vec<String>;

    fn read_bool(&self, key: &str, default: bool) -> bool;

    /// Raw numeric value stored under `key`
    fn read_number(&self, key: &str) -> Option<Number>;

    /// Numeric elements of the array stored under `key`; non-numeric elements
    /// are dropped. `None` when `key` does not hold an array.
    fn read_numbers(&self, key: &str) -> Option<Vec<Number>>;

    fn read_data_array_path(&self, key: &str, default: DataArrayPath) -> DataArrayPath;

    fn read_data_array_paths(&self, key: &str, default: Vec<DataArrayPath>)
        -> Vec<DataArrayPath>;
}

impl<'a> dyn FilterParametersReader + 'a {
    /// Read a number as `T`, falling back to `default` when it is missing,
    /// not a number, or does not fit in `T`.
    pub fn read_value<T: Scalar>(&self, key: &str, default: T) -> T {
        self.read_number(key)
            .and_then(|n| T::from_number(&n))
            .unwrap_or(default)
    }

    /// Read an array of numbers as `T`. Elements that do not fit in `T` are
    /// skipped; a missing or non-array value yields `default`.
    pub fn read_array<T: Scalar>(&self, key: &str, default: Vec<T>) -> Vec<T> {
        match self.read_numbers(key) {
            Some(numbers) => numbers.iter().filter_map(T::from_number).collect(),
            None => default,
        }
    }
}

/// Sink for filter parameter values
pub trait FilterParametersWriter {
    /// Start the group for the filter at `index`
    fn open_filter_group(&mut self, filter_name: &str, human_label: &str, index: usize);

    fn close_filter_group(&mut self);

    fn write_string(&mut self, key: &str, value: &str);

    fn write_strings(&mut self, key: &str, values: &[String]);

    fn write_bool(&mut self, key: &str, value: bool);

    fn write_number(&mut self, key: &str, value: Number);

    fn write_numbers(&mut self, key: &str, values: Vec<Number>);

    fn write_data_array_path(&mut self, key: &str, value: &DataArrayPath);

    fn write_data_array_paths(&mut self, key: &str, values: &[DataArrayPath]);
}

impl<'a> dyn FilterParametersWriter + 'a {
    /// Write a number; non-finite floats are skipped
    pub fn write_value<T: Scalar>(&mut self, key: &str, value: T) {
        if let Some(number) = value.to_number() {
            self.write_number(key, number);
        }
    }

    pub fn write_array<T: Scalar>(&mut self, key: &str, values: &[T]) {
        let numbers = values.iter().filter_map(|v| v.to_number()).collect();
        self.write_numbers(key, numbers);
    }
}

/// Numeric types with a checked conversion from JSON numbers
pub trait Scalar: Copy {
    fn from_number(number: &Number) -> Option<Self>;
    fn to_number(self) -> Option<Number>;
}

macro_rules! impl_scalar_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl Scalar for $t {
                fn from_number(number: &Number) -> Option<Self> {
                    if let Some(v) = number.as_i64() {
                        <$t>::try_from(v).ok()
                    } else if let Some(v) = number.as_u64() {
                        <$t>::try_from(v).ok()
                    } else {
                        let v = number.as_f64()?;
                        if v.fract() == 0.0 && v >= <$t>::MIN as f64 && v <= <$t>::MAX as f64 {
                            Some(v as $t)
                        } else {
                            None
                        }
                    }
                }

                fn to_number(self) -> Option<Number> {
                    Some(Number::from(self))
                }
            }
        )*
    };
}

impl_scalar_int!(i8, u8, i16, u16, i32, u32, i64, u64, usize);

impl Scalar for f32 {
    fn from_number(number: &Number) -> Option<Self> {
        let v = number.as_f64()?;
        if v.is_finite() && v.abs() <= f32::MAX as f64 {
            Some(v as f32)
        } else {
            None
        }
    }

    fn to_number(self) -> Option<Number> {
        Number::from_f64(self as f64)
    }
}

impl Scalar for f64 {
    fn from_number(number: &Number) -> Option<Self> {
        number.as_f64()
    }

    fn to_number(self) -> Option<Number> {
        Number::from_f64(self)
    }
}
