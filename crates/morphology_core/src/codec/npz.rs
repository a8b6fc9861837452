//! NumPy `.npz` archive codec.
//!
//! An `.npz` file is a zip archive whose members are `.npy` payloads named
//! `<key>.npy`; `numpy.savez_compressed` deflates them, `numpy.savez` stores
//! them as-is. Both are readable here.

use crate::codec::{npy, CodecError, CodecResult};
use crate::model::array::NumericArray;
use std::io::{Read, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MEMBER_SUFFIX: &str = ".npy";
/// Upper bound on the buffer reserved up front from a member's declared size.
const MAX_MEMBER_PREALLOCATION: u64 = 64 * 1024 * 1024;

/// Reads the array stored under `key`.
pub fn read_entry<R: Read + Seek>(reader: R, key: &str) -> CodecResult<NumericArray> {
    let mut archive = ZipArchive::new(reader)?;
    read_member(&mut archive, key)
}

/// Reads several arrays from one archive open, in the order of `keys`.
///
/// Fails on the first missing key.
pub fn read_entries<R: Read + Seek>(reader: R, keys: &[&str]) -> CodecResult<Vec<NumericArray>> {
    let mut archive = ZipArchive::new(reader)?;
    keys.iter()
        .map(|key| read_member(&mut archive, key))
        .collect()
}

/// Writes `entries` as an `.npz` archive and returns the inner writer.
///
/// `compress` selects deflate (`savez_compressed`) over stored (`savez`).
pub fn write_archive<W: Write + Seek>(
    writer: W,
    entries: &[(&str, &NumericArray)],
    compress: bool,
) -> CodecResult<W> {
    let method = if compress {
        CompressionMethod::Deflated
    } else {
        CompressionMethod::Stored
    };

    let mut zip = ZipWriter::new(writer);
    for (key, array) in entries {
        let options = SimpleFileOptions::default().compression_method(method);
        zip.start_file(format!("{key}{MEMBER_SUFFIX}"), options)?;
        zip.write_all(&npy::encode(array))?;
    }
    Ok(zip.finish()?)
}

fn read_member<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    key: &str,
) -> CodecResult<NumericArray> {
    let member_name = [format!("{key}{MEMBER_SUFFIX}"), key.to_string()]
        .into_iter()
        .find(|candidate| archive.file_names().any(|name| name == candidate.as_str()))
        .ok_or_else(|| CodecError::MissingEntry(key.to_string()))?;

    let mut member = archive.by_name(&member_name)?;
    let mut bytes = Vec::with_capacity(member_capacity(member.size()));
    member.read_to_end(&mut bytes)?;
    npy::decode(&bytes)
}

// The declared size comes from the archive headers and is untrusted.
fn member_capacity(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_MEMBER_PREALLOCATION)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{
        member_capacity, read_entries, read_entry, write_archive, MAX_MEMBER_PREALLOCATION,
    };
    use crate::codec::CodecError;
    use crate::model::array::NumericArray;
    use std::io::Cursor;

    fn archive(compress: bool) -> Cursor<Vec<u8>> {
        let data = NumericArray::new(vec![2, 2], vec![1.5f32, 2.5, 3.5, 4.5]).unwrap();
        let ids = NumericArray::from_vec(vec![7u64, 8, 9]);
        let mut cursor = write_archive(
            Cursor::new(Vec::new()),
            &[("data", &data), ("ids", &ids)],
            compress,
        )
        .unwrap();
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn reads_named_entry_from_stored_and_deflated_archives() {
        for compress in [false, true] {
            let array = read_entry(archive(compress), "data").unwrap();
            assert_eq!(array.shape(), &[2, 2]);
            assert_eq!(array.to_f64_vec(), vec![1.5, 2.5, 3.5, 4.5]);
        }
    }

    #[test]
    fn read_entries_preserves_key_order() {
        let arrays = read_entries(archive(true), &["ids", "data"]).unwrap();
        assert_eq!(arrays[0].len(), 3);
        assert_eq!(arrays[1].len(), 4);
    }

    #[test]
    fn missing_key_is_reported_by_name() {
        let err = read_entry(archive(false), "vertices").unwrap_err();
        assert!(matches!(err, CodecError::MissingEntry(key) if key == "vertices"));
    }

    #[test]
    fn declared_member_size_only_caps_the_reservation() {
        assert_eq!(member_capacity(4096), 4096);
        assert_eq!(member_capacity(u64::MAX), MAX_MEMBER_PREALLOCATION as usize);
    }

    #[test]
    fn non_zip_input_is_an_archive_error() {
        let err = read_entry(Cursor::new(b"not a zip".to_vec()), "data").unwrap_err();
        assert!(matches!(err, CodecError::Archive(_)));
    }
}
