//! Conversions from [`Value`](super::Value) to Rust types.

use crate::error::{RelqError, Result};

/// Converts a database value into a Rust type.
///
/// Each method handles one storage class; NULL is an error unless the
/// implementor overrides [`FromValue::from_null`] (as `Option<T>` does).
pub trait FromValue: Sized {
    /// Convert from a 64-bit integer value
    fn from_integer(value: i64) -> Result<Self>;

    /// Convert from a text value
    fn from_text(value: &str) -> Result<Self>;

    /// Convert from a real value
    fn from_real(value: f64) -> Result<Self>;

    /// Convert from a blob value
    fn from_blob(value: &[u8]) -> Result<Self>;

    /// Convert from a NULL value (default returns error)
    fn from_null() -> Result<Self> {
        Err(RelqError::Mapping("unexpected NULL value".into()))
    }
}

fn checked_real_to_int<T: TryFrom<i64>>(value: f64, ty: &str) -> Result<T> {
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(RelqError::Mapping(format!(
            "cannot convert REAL {value} to {ty} without loss"
        )));
    }
    let out_of_range = || RelqError::Mapping(format!("REAL {value} out of range for {ty}"));
    // `as` saturates; i64::MAX as f64 rounds up to 2^63
    if !(i64::MIN as f64..i64::MAX as f64).contains(&value) {
        return Err(out_of_range());
    }
    T::try_from(value as i64).map_err(|_| out_of_range())
}

macro_rules! impl_from_value_int {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_integer(value: i64) -> Result<Self> {
                    <$ty>::try_from(value).map_err(|e| {
                        RelqError::Mapping(format!(
                            "i64 {} out of range for {}: {}",
                            value,
                            stringify!($ty),
                            e
                        ))
                    })
                }

                fn from_text(value: &str) -> Result<Self> {
                    value.parse().map_err(|e| {
                        RelqError::Mapping(format!(
                            "cannot parse '{}' as {}: {}",
                            value,
                            stringify!($ty),
                            e
                        ))
                    })
                }

                fn from_real(value: f64) -> Result<Self> {
                    checked_real_to_int(value, stringify!($ty))
                }

                fn from_blob(_value: &[u8]) -> Result<Self> {
                    Err(RelqError::Mapping(
                        concat!("cannot convert BLOB to ", stringify!($ty)).into(),
                    ))
                }
            }
        )+
    };
}

impl_from_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_integer(value: i64) -> Result<Self> {
        Ok(value as f64)
    }

    fn from_text(value: &str) -> Result<Self> {
        value
            .parse()
            .map_err(|e| RelqError::Mapping(format!("cannot parse '{value}' as f64: {e}")))
    }

    fn from_real(value: f64) -> Result<Self> {
        Ok(value)
    }

    fn from_blob(_value: &[u8]) -> Result<Self> {
        Err(RelqError::Mapping("cannot convert BLOB to f64".into()))
    }
}

impl FromValue for bool {
    fn from_integer(value: i64) -> Result<Self> {
        Ok(value != 0)
    }

    fn from_text(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(RelqError::Mapping(format!("cannot parse '{value}' as bool"))),
        }
    }

    fn from_real(value: f64) -> Result<Self> {
        Ok(value != 0.0)
    }

    fn from_blob(_value: &[u8]) -> Result<Self> {
        Err(RelqError::Mapping("cannot convert BLOB to bool".into()))
    }
}

impl FromValue for String {
    fn from_integer(value: i64) -> Result<Self> {
        Ok(value.to_string())
    }

    fn from_text(value: &str) -> Result<Self> {
        Ok(value.to_owned())
    }

    fn from_real(value: f64) -> Result<Self> {
        Ok(value.to_string())
    }

    fn from_blob(value: &[u8]) -> Result<Self> {
        String::from_utf8(value.to_vec())
            .map_err(|e| RelqError::Mapping(format!("invalid UTF-8 in BLOB: {e}")))
    }
}

impl FromValue for compact_str::CompactString {
    fn from_integer(value: i64) -> Result<Self> {
        Ok(compact_str::format_compact!("{value}"))
    }

    fn from_text(value: &str) -> Result<Self> {
        Ok(compact_str::CompactString::new(value))
    }

    fn from_real(value: f64) -> Result<Self> {
        Ok(compact_str::format_compact!("{value}"))
    }

    fn from_blob(value: &[u8]) -> Result<Self> {
        compact_str::CompactString::from_utf8(value)
            .map_err(|e| RelqError::Mapping(format!("invalid UTF-8 in BLOB: {e}")))
    }
}

impl FromValue for Vec<u8> {
    fn from_integer(_value: i64) -> Result<Self> {
        Err(RelqError::Mapping("cannot convert INTEGER to BLOB".into()))
    }

    fn from_text(value: &str) -> Result<Self> {
        Ok(value.as_bytes().to_vec())
    }

    fn from_real(_value: f64) -> Result<Self> {
        Err(RelqError::Mapping("cannot convert REAL to BLOB".into()))
    }

    fn from_blob(value: &[u8]) -> Result<Self> {
        Ok(value.to_vec())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_integer(value: i64) -> Result<Self> {
        T::from_integer(value).map(Some)
    }

    fn from_text(value: &str) -> Result<Self> {
        T::from_text(value).map(Some)
    }

    fn from_real(value: f64) -> Result<Self> {
        T::from_real(value).map(Some)
    }

    fn from_blob(value: &[u8]) -> Result<Self> {
        T::from_blob(value).map(Some)
    }

    fn from_null() -> Result<Self> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::value::Value;

    #[test]
    fn narrowing_and_null_handling() {
        assert_eq!(Value::Integer(7).convert::<u8>().unwrap(), 7);
        assert!(Value::Integer(300).convert::<u8>().is_err());
        assert!(Value::Null.convert::<i64>().is_err());
        assert_eq!(Value::Null.convert::<Option<i64>>().unwrap(), None);
        assert_eq!(Value::Real(2.0).convert::<i32>().unwrap(), 2);
        assert!(Value::Real(2.5).convert::<i32>().is_err());
        assert_eq!(Value::Text("12".into()).convert::<i64>().unwrap(), 12);
        assert!(Value::Integer(1).convert::<bool>().unwrap());
    }

    #[test]
    fn reals_outside_i64_do_not_saturate() {
        assert!(Value::Real(1e20).convert::<i64>().is_err());
        assert!(Value::Real(-1e20).convert::<i64>().is_err());
        assert!(Value::Real(9_223_372_036_854_775_808.0).convert::<i64>().is_err());
        assert_eq!(
            Value::Real(-9_223_372_036_854_775_808.0).convert::<i64>().unwrap(),
            i64::MIN
        );
        assert_eq!(Value::Real(-3.0).convert::<i64>().unwrap(), -3);
    }
}
