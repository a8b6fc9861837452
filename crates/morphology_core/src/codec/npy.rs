//! NumPy `.npy` array codec.
//!
//! # Responsibility
//! - Parse the `.npy` preamble and Python-literal header.
//! - Decode plain numeric dtypes of either byte order into `NumericArray`.
//! - Encode arrays as version 1.0, little-endian, C-ordered `.npy`.
//!
//! # Invariants
//! - Fortran-ordered payloads are reordered to row-major on decode.
//! - Object (`O`), string and structured dtypes are rejected, never guessed.

use crate::codec::{CodecError, CodecResult};
use crate::model::array::{element_count, ArrayData, DType, NumericArray};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Read, Write};

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const HEADER_ALIGNMENT: usize = 64;

static DESCR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'descr'\s*:\s*'([^']*)'").expect("valid descr regex"));
static FORTRAN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"'fortran_order'\s*:\s*(True|False)").expect("valid fortran_order regex")
});
static SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'shape'\s*:\s*\(([^)]*)\)").expect("valid shape regex"));

#[derive(Debug, PartialEq, Eq)]
struct Header {
    dtype: DType,
    big_endian: bool,
    fortran_order: bool,
    shape: Vec<usize>,
}

macro_rules! decode_elements {
    ($ty:ty, $bytes:expr, $big:expr) => {{
        $bytes
            .chunks_exact(std::mem::size_of::<$ty>())
            .map(|chunk| {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(chunk);
                if $big {
                    <$ty>::from_be_bytes(raw)
                } else {
                    <$ty>::from_le_bytes(raw)
                }
            })
            .collect::<Vec<$ty>>()
    }};
}

/// Reads a whole `.npy` stream and decodes it.
pub fn read_from<R: Read>(mut reader: R) -> CodecResult<NumericArray> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode(&bytes)
}

/// Decodes an in-memory `.npy` payload.
pub fn decode(bytes: &[u8]) -> CodecResult<NumericArray> {
    let (header, payload) = split_header(bytes)?;
    let needed = element_count(&header.shape)
        .and_then(|count| count.checked_mul(header.dtype.size()))
        .ok_or_else(|| {
            CodecError::malformed(format!("array shape {:?} overflows", header.shape))
        })?;
    if payload.len() < needed {
        return Err(CodecError::malformed(format!(
            "array payload truncated: expected {needed} bytes, found {}",
            payload.len()
        )));
    }
    let payload = &payload[..needed];
    let big = header.big_endian;

    let data: ArrayData = match header.dtype {
        DType::Bool => {
            let flags: Vec<bool> = payload.iter().map(|&b| b != 0).collect();
            arrange(flags, &header).into()
        }
        DType::I8 => arrange(decode_elements!(i8, payload, big), &header).into(),
        DType::I16 => arrange(decode_elements!(i16, payload, big), &header).into(),
        DType::I32 => arrange(decode_elements!(i32, payload, big), &header).into(),
        DType::I64 => arrange(decode_elements!(i64, payload, big), &header).into(),
        DType::U8 => arrange(payload.to_vec(), &header).into(),
        DType::U16 => arrange(decode_elements!(u16, payload, big), &header).into(),
        DType::U32 => arrange(decode_elements!(u32, payload, big), &header).into(),
        DType::U64 => arrange(decode_elements!(u64, payload, big), &header).into(),
        DType::F32 => arrange(decode_elements!(f32, payload, big), &header).into(),
        DType::F64 => arrange(decode_elements!(f64, payload, big), &header).into(),
    };

    NumericArray::new(header.shape, data).map_err(|err| CodecError::malformed(err.to_string()))
}

/// Encodes `array` as a version 1.0 `.npy` payload.
pub fn encode(array: &NumericArray) -> Vec<u8> {
    let header = header_text(array);
    let mut out = Vec::with_capacity(12 + header.len() + array.len() * array.dtype().size());
    out.extend_from_slice(MAGIC);
    match u16::try_from(header.len()) {
        Ok(len) => {
            out.extend_from_slice(&[1, 0]);
            out.extend_from_slice(&len.to_le_bytes());
        }
        Err(_) => {
            out.extend_from_slice(&[2, 0]);
            out.extend_from_slice(&(header.len() as u32).to_le_bytes());
        }
    }
    out.extend_from_slice(header.as_bytes());

    match array.data() {
        ArrayData::Bool(values) => out.extend(values.iter().map(|&v| u8::from(v))),
        ArrayData::I8(values) => out.extend(values.iter().flat_map(|v| v.to_le_bytes())),
        ArrayData::I16(values) => out.extend(values.iter().flat_map(|v| v.to_le_bytes())),
        ArrayData::I32(values) => out.extend(values.iter().flat_map(|v| v.to_le_bytes())),
        ArrayData::I64(values) => out.extend(values.iter().flat_map(|v| v.to_le_bytes())),
        ArrayData::U8(values) => out.extend_from_slice(values),
        ArrayData::U16(values) => out.extend(values.iter().flat_map(|v| v.to_le_bytes())),
        ArrayData::U32(values) => out.extend(values.iter().flat_map(|v| v.to_le_bytes())),
        ArrayData::U64(values) => out.extend(values.iter().flat_map(|v| v.to_le_bytes())),
        ArrayData::F32(values) => out.extend(values.iter().flat_map(|v| v.to_le_bytes())),
        ArrayData::F64(values) => out.extend(values.iter().flat_map(|v| v.to_le_bytes())),
    }
    out
}

/// Encodes `array` and writes it to `writer`.
pub fn write_to<W: Write>(mut writer: W, array: &NumericArray) -> CodecResult<()> {
    writer.write_all(&encode(array))?;
    writer.flush()?;
    Ok(())
}

fn split_header(bytes: &[u8]) -> CodecResult<(Header, &[u8])> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err(CodecError::malformed("not an .npy payload (bad magic)"));
    }
    let major = bytes[6];
    let (header_len, preamble) = match major {
        1 => (usize::from(u16::from_le_bytes([bytes[8], bytes[9]])), 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(CodecError::malformed("truncated .npy preamble"));
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            (len as usize, 12)
        }
        other => {
            return Err(CodecError::malformed(format!(
                "unsupported .npy format version {other}"
            )))
        }
    };
    let header_end = preamble + header_len;
    if bytes.len() < header_end {
        return Err(CodecError::malformed("truncated .npy header"));
    }
    let text = std::str::from_utf8(&bytes[preamble..header_end])
        .map_err(|_| CodecError::malformed("header is not valid UTF-8"))?;
    Ok((parse_header(text)?, &bytes[header_end..]))
}

fn parse_header(text: &str) -> CodecResult<Header> {
    let descr = DESCR_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| CodecError::malformed(format!("header has no plain `descr`: {text}")))?
        .as_str();
    let fortran_order = FORTRAN_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str() == "True")
        .ok_or_else(|| CodecError::malformed("header has no `fortran_order`"))?;
    let shape_text = SHAPE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| CodecError::malformed("header has no `shape`"))?
        .as_str();

    let shape = shape_text
        .split(',')
        .map(|dim| dim.trim().trim_end_matches('L'))
        .filter(|dim| !dim.is_empty())
        .map(|dim| {
            dim.parse::<usize>()
                .map_err(|_| CodecError::malformed(format!("invalid shape dimension `{dim}`")))
        })
        .collect::<CodecResult<Vec<_>>>()?;

    let (dtype, big_endian) = parse_descr(descr)?;
    Ok(Header {
        dtype,
        big_endian,
        fortran_order,
        shape,
    })
}

fn parse_descr(descr: &str) -> CodecResult<(DType, bool)> {
    let (order, code) = match descr.chars().next() {
        Some(c @ ('<' | '>' | '|' | '=')) => (c, &descr[1..]),
        _ => ('=', descr),
    };
    let big_endian = match order {
        '>' => true,
        '=' => cfg!(target_endian = "big"),
        _ => false,
    };
    let dtype = match code {
        "b1" | "?" => DType::Bool,
        "i1" => DType::I8,
        "i2" => DType::I16,
        "i4" => DType::I32,
        "i8" => DType::I64,
        "u1" => DType::U8,
        "u2" => DType::U16,
        "u4" => DType::U32,
        "u8" => DType::U64,
        "f4" => DType::F32,
        "f8" => DType::F64,
        "O" => {
            return Err(CodecError::malformed(
                "object arrays (dtype `O`) are not supported",
            ))
        }
        _ => return Err(CodecError::malformed(format!("unsupported dtype `{descr}`"))),
    };
    Ok((dtype, big_endian))
}

fn arrange<T: Copy>(values: Vec<T>, header: &Header) -> Vec<T> {
    if header.fortran_order {
        fortran_to_c(values, &header.shape)
    } else {
        values
    }
}

fn fortran_to_c<T: Copy>(values: Vec<T>, shape: &[usize]) -> Vec<T> {
    if shape.len() < 2 || values.is_empty() {
        return values;
    }
    let mut strides = vec![1usize; shape.len()];
    for axis in 1..shape.len() {
        strides[axis] = strides[axis - 1] * shape[axis - 1];
    }

    let mut index = vec![0usize; shape.len()];
    let mut out = Vec::with_capacity(values.len());
    for _ in 0..values.len() {
        let offset: usize = index.iter().zip(&strides).map(|(i, s)| i * s).sum();
        out.push(values[offset]);
        for axis in (0..shape.len()).rev() {
            index[axis] += 1;
            if index[axis] < shape[axis] {
                break;
            }
            index[axis] = 0;
        }
    }
    out
}

fn header_text(array: &NumericArray) -> String {
    let shape = match array.shape() {
        [] => "()".to_string(),
        [len] => format!("({len},)"),
        dims => format!(
            "({})",
            dims.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };
    let dtype = array.dtype();
    let order = if dtype.size() == 1 { '|' } else { '<' };
    let mut header =
        format!("{{'descr': '{order}{dtype}', 'fortran_order': False, 'shape': {shape}, }}");

    // preamble + header + trailing newline must be 64-byte aligned
    let preamble = if header.len() + HEADER_ALIGNMENT < usize::from(u16::MAX) {
        10
    } else {
        12
    };
    let unpadded = preamble + header.len() + 1;
    let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
    header.extend(std::iter::repeat(' ').take(padding));
    header.push('\n');
    header
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, fortran_to_c, parse_header};
    use crate::codec::CodecError;
    use crate::model::array::{ArrayData, DType, NumericArray};

    fn raw_npy(header: &str, payload: &[u8]) -> Vec<u8> {
        let mut text = header.to_string();
        let unpadded = 10 + text.len() + 1;
        text.push_str(&" ".repeat((64 - unpadded % 64) % 64));
        text.push('\n');

        let mut bytes = b"\x93NUMPY\x01\x00".to_vec();
        bytes.extend_from_slice(&(text.len() as u16).to_le_bytes());
        bytes.extend_from_slice(text.as_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn decodes_numpy_written_float64_matrix() {
        let payload: Vec<u8> = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let bytes = raw_npy(
            "{'descr': '<f8', 'fortran_order': False, 'shape': (2, 3), }",
            &payload,
        );

        let array = decode(&bytes).unwrap();
        assert_eq!(array.shape(), &[2, 3]);
        assert_eq!(array.dtype(), DType::F64);
        assert_eq!(array.to_f64_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn decodes_big_endian_integers() {
        let payload: Vec<u8> = [1i32, -2, 300].iter().flat_map(|v| v.to_be_bytes()).collect();
        let bytes = raw_npy(
            "{'descr': '>i4', 'fortran_order': False, 'shape': (3,), }",
            &payload,
        );

        let array = decode(&bytes).unwrap();
        assert_eq!(array.data(), &ArrayData::I32(vec![1, -2, 300]));
    }

    #[test]
    fn fortran_order_matches_row_major_decode() {
        // column-major layout of [[1, 2, 3], [4, 5, 6]]
        let payload: Vec<u8> = [1u16, 4, 2, 5, 3, 6]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let bytes = raw_npy(
            "{'descr': '<u2', 'fortran_order': True, 'shape': (2, 3), }",
            &payload,
        );

        let array = decode(&bytes).unwrap();
        assert_eq!(array.data(), &ArrayData::U16(vec![1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn fortran_reorder_handles_three_axes() {
        // shape (2, 2, 2); element value encodes its C index
        let column_major = vec![0, 4, 2, 6, 1, 5, 3, 7];
        assert_eq!(
            fortran_to_c(column_major, &[2, 2, 2]),
            vec![0, 1, 2, 3, 4, 5, 6, 7]
        );
    }

    #[test]
    fn encode_output_is_aligned_and_decodable() {
        let array = NumericArray::new(vec![2, 2], vec![1i64, 2, 3, 4]).unwrap();
        let bytes = encode(&array);

        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % 64, 0);
        assert_eq!(decode(&bytes).unwrap(), array);
    }

    #[test]
    fn rejects_object_arrays() {
        let bytes = raw_npy(
            "{'descr': '|O', 'fortran_order': False, 'shape': (1,), }",
            &[0x80, 0x02],
        );
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, CodecError::Malformed(message) if message.contains("object")));
    }

    #[test]
    fn rejects_truncated_payload() {
        let bytes = raw_npy(
            "{'descr': '<f4', 'fortran_order': False, 'shape': (4,), }",
            &[0u8; 8],
        );
        assert!(matches!(decode(&bytes), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn rejects_shape_whose_size_overflows() {
        let bytes = raw_npy(
            "{'descr': '<f8', 'fortran_order': False, 'shape': (4294967296, 4294967296), }",
            &[0u8; 16],
        );
        match decode(&bytes) {
            Err(CodecError::Malformed(message)) => assert!(message.contains("overflows")),
            other => panic!("unexpected result: {other:?}"),
        }

        // element count fits, byte count does not
        let bytes = raw_npy(
            "{'descr': '<f8', 'fortran_order': False, 'shape': (2305843009213693952,), }",
            &[0u8; 16],
        );
        assert!(matches!(decode(&bytes), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn rejects_bad_magic() {
        assert!(matches!(
            decode(b"PK\x03\x04 not numpy"),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn parse_header_accepts_scalar_shape() {
        let header =
            parse_header("{'descr': '<f8', 'fortran_order': False, 'shape': (), }").unwrap();
        assert!(header.shape.is_empty());
    }
}
