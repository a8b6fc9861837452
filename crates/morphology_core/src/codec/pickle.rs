//! bzip2-compressed pickle codec (`.pbz2`).
//!
//! Producers write these with `bz2.BZ2File(path, "wb")` + `pickle.dump`.
//! Decoding accepts concatenated bzip2 streams, as `BZ2File` does.

use crate::codec::CodecResult;
use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;
use bzip2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_pickle::{DeOptions, SerOptions, Value};
use std::io::{BufReader, Read, Write};

/// Decompresses and unpickles into a dynamic value.
pub fn decode_value<R: Read>(reader: R) -> CodecResult<Value> {
    let decoder = MultiBzDecoder::new(BufReader::new(reader));
    Ok(serde_pickle::value_from_reader(decoder, DeOptions::new())?)
}

/// Decompresses and unpickles into a typed value.
pub fn decode<R: Read, T: DeserializeOwned>(reader: R) -> CodecResult<T> {
    let decoder = MultiBzDecoder::new(BufReader::new(reader));
    Ok(serde_pickle::from_reader(decoder, DeOptions::new())?)
}

/// Pickles and compresses a dynamic value; returns the inner writer.
pub fn encode_value<W: Write>(writer: W, value: &Value) -> CodecResult<W> {
    let mut encoder = BzEncoder::new(writer, Compression::best());
    serde_pickle::value_to_writer(&mut encoder, value, SerOptions::new())?;
    Ok(encoder.finish()?)
}

/// Pickles and compresses any serializable value; returns the inner writer.
pub fn encode<W: Write, T: Serialize>(writer: W, value: &T) -> CodecResult<W> {
    let mut encoder = BzEncoder::new(writer, Compression::best());
    serde_pickle::to_writer(&mut encoder, value, SerOptions::new())?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::{decode, decode_value, encode, encode_value};
    use crate::codec::CodecError;
    use serde_pickle::{HashableValue, Value};
    use std::collections::BTreeMap;

    #[test]
    fn dynamic_value_survives_compression() {
        let mut dict = BTreeMap::new();
        dict.insert(
            HashableValue::String("segment_id".to_string()),
            Value::I64(864_691_135),
        );
        dict.insert(
            HashableValue::String("limbs".to_string()),
            Value::List(vec![Value::F64(0.5), Value::None]),
        );
        let value = Value::Dict(dict);

        let bytes = encode_value(Vec::new(), &value).unwrap();
        assert_eq!(&bytes[..3], b"BZh");
        assert_eq!(decode_value(bytes.as_slice()).unwrap(), value);
    }

    #[test]
    fn typed_value_survives_compression() {
        let coords = vec![vec![1.0f64, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let bytes = encode(Vec::new(), &coords).unwrap();
        let decoded: Vec<Vec<f64>> = decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, coords);
    }

    #[test]
    fn uncompressed_input_is_rejected() {
        let err = decode_value(&b"plain bytes"[..]).unwrap_err();
        assert!(matches!(err, CodecError::Pickle(_)));
    }
}
