use crate::error::StoreError;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Compresses a task's prior output into a single-entry archive.
pub fn snapshot(entry_name: &str, raw: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    writer.start_file(entry_name, options)?;
    writer
        .write_all(raw)
        .map_err(|e| StoreError::Archive(e.into()))?;
    Ok(writer.finish()?.into_inner())
}

/// Expands a snapshot back to the original bytes. Entries are concatenated in
/// archive order.
pub fn restore(blob: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut archive = ZipArchive::new(Cursor::new(blob))?;
    let mut out = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        entry
            .read_to_end(&mut out)
            .map_err(|e| StoreError::Archive(e.into()))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_returns_the_snapshotted_bytes() {
        let raw = b"Period Number,Value,Date\n1,0.25,2020-03-02\n".repeat(50);
        let blob = snapshot("zipSPY", &raw).unwrap();
        assert!(blob.len() < raw.len());
        assert_eq!(restore(&blob).unwrap(), raw);
    }

    #[test]
    fn entry_is_named_as_requested() {
        let blob = snapshot("zipSPY", b"abc").unwrap();
        let mut archive = ZipArchive::new(Cursor::new(&blob[..])).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.by_index(0).unwrap().name(), "zipSPY");
    }

    #[test]
    fn garbage_is_not_a_snapshot() {
        assert!(matches!(restore(b"not an archive"), Err(StoreError::Archive(_))));
    }
}
