//! Thin helpers over `ciborium::Value`.

use ciborium::value::{Integer, Value};

use scitt_core::CoseError;

pub(crate) fn to_vec(value: &Value) -> Result<Vec<u8>, CoseError> {
    let mut out = Vec::new();
    ciborium::ser::into_writer(value, &mut out).map_err(|e| CoseError::Encode(e.to_string()))?;
    Ok(out)
}

/// Decode exactly one CBOR item. Bytes after the item are an error.
pub(crate) fn from_slice(bytes: &[u8]) -> Result<Value, CoseError> {
    let mut rest = bytes;
    let value: Value =
        ciborium::de::from_reader(&mut rest).map_err(|e| CoseError::Decode(e.to_string()))?;
    if !rest.is_empty() {
        return Err(CoseError::Decode(format!("{} trailing bytes", rest.len())));
    }
    Ok(value)
}

pub(crate) fn int(v: i64) -> Value {
    Value::Integer(Integer::from(v))
}

pub(crate) fn uint(v: u64) -> Value {
    Value::Integer(Integer::from(v))
}

/// Read an integer that fits in `i64`.
pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    value.as_integer().and_then(|i| i64::try_from(i).ok())
}

/// Read a non-negative integer that fits in `u64`.
pub(crate) fn as_u64(value: &Value) -> Option<u64> {
    value.as_integer().and_then(|i| u64::try_from(i).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_helpers() {
        assert_eq!(as_i64(&int(-396)), Some(-396));
        assert_eq!(as_u64(&uint(7)), Some(7));
        assert_eq!(as_u64(&int(-1)), None);
        assert_eq!(as_i64(&Value::Text("1".into())), None);
    }

    #[test]
    fn test_roundtrip_preserves_bytes() {
        let v = Value::Array(vec![Value::Bytes(vec![0, 1, 2]), int(-8), Value::Null]);
        let bytes = to_vec(&v).unwrap();
        assert_eq!(from_slice(&bytes).unwrap(), v);
    }

    #[test]
    fn test_truncated_input_is_decode_error() {
        let bytes = to_vec(&Value::Bytes(vec![9; 40])).unwrap();
        assert!(matches!(
            from_slice(&bytes[..10]),
            Err(CoseError::Decode(_))
        ));
    }

    #[test]
    fn test_trailing_bytes_are_decode_error() {
        let mut bytes = to_vec(&int(7)).unwrap();
        bytes.push(0x00);
        assert!(matches!(from_slice(&bytes), Err(CoseError::Decode(_))));
    }
}
