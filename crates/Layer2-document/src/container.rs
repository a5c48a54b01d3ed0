//! Deterministic ZIP packaging for DOCX / PPTX / HWPX
//!
//! 엔트리 순서는 호출 순서 그대로, 타임스탬프는 1980-01-01 고정.

use crate::format::FormatKind;
use bookforge_foundation::{Error, Result};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

pub(crate) struct Package {
    format: FormatKind,
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl Package {
    pub fn new(format: FormatKind) -> Self {
        Self {
            format,
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn options(method: CompressionMethod) -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(method)
            .last_modified_time(DateTime::default())
            .unix_permissions(0o644)
    }

    /// Add an uncompressed entry (HWPX `mimetype`)
    pub fn stored(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.add(name, data, CompressionMethod::Stored)
    }

    /// Add a deflated entry
    pub fn deflated(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.add(name, data, CompressionMethod::Deflated)
    }

    fn add(&mut self, name: &str, data: &[u8], method: CompressionMethod) -> Result<()> {
        let format = self.format;
        self.writer
            .start_file(name, Self::options(method))
            .map_err(|e| Error::encoding(format.extension(), format!("{}: {}", name, e)))?;
        self.writer
            .write_all(data)
            .map_err(|e| Error::encoding(format.extension(), format!("{}: {}", name, e)))?;
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        let format = self.format;
        let cursor = self
            .writer
            .finish()
            .map_err(|e| Error::encoding(format.extension(), e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_entries_in_order() {
        let mut pkg = Package::new(FormatKind::Hwpx);
        pkg.stored("mimetype", b"application/hwp+zip").unwrap();
        pkg.deflated("Contents/section0.xml", b"<x/>").unwrap();
        let bytes = pkg.finish().unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);
        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
        let mut text = String::new();
        first.read_to_string(&mut text).unwrap();
        assert_eq!(text, "application/hwp+zip");
    }

    #[test]
    fn test_reproducible() {
        let build = || {
            let mut pkg = Package::new(FormatKind::Docx);
            pkg.deflated("a.xml", b"<a/>").unwrap();
            pkg.finish().unwrap()
        };
        assert_eq!(build(), build());
    }
}
