//! Big-endian, bounds-checked primitive reads for class-file decoding.
//!
//! Class files store every multi-byte quantity in big-endian order. The [`ClassIO`] trait
//! abstracts over the primitive types the format uses so that [`read_be_at`] can perform a
//! single bounds check before touching the buffer.
//!
//! # Supported Types
//! - **Unsigned integers**: `u8`, `u16`, `u32`, `u64`
//! - **Signed integers**: `i8`, `i16`, `i32`, `i64`
//! - **Floating point**: `f32`, `f64`

use crate::Result;

/// Trait for primitive types that can be decoded from big-endian bytes.
pub trait ClassIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_class_io {
    ($($ty:ty),*) => {
        $(
            impl ClassIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }
            }
        )*
    };
}

impl_class_io!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// Safely reads a value of type `T` in big-endian byte order at `offset` and advances it.
///
/// `base` is added to `offset` when reporting errors so that slices cut out of a larger file
/// still report absolute positions.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_be_at<T: ClassIO>(data: &[u8], offset: &mut usize, base: usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let available = data.len().saturating_sub(*offset);
    if type_len > available {
        return Err(out_of_bounds_error!(base + *offset, type_len, available));
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(out_of_bounds_error!(base + *offset, type_len, available));
    };

    *offset += type_len;

    Ok(T::from_be_bytes(read))
}
