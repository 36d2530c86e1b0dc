use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use tokio::io::AsyncReadExt;

use crate::error::IntakeError;

/// Number of leading bytes inspected when sniffing a file.
pub const HEADER_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ImageSignature {
    Jpeg,
    Bmp,
    LegacyTiff,
    Png,
    Gif,
    TiffLittleEndian,
    TiffBigEndian,
    BigTiff,
    Jpeg2000,
}

// Checked in order; the first matching prefix wins.
const SIGNATURES: &[(&[u8], ImageSignature)] = &[
    (&[0xFF, 0xD8, 0xFF], ImageSignature::Jpeg),
    (&[0x42, 0x4D], ImageSignature::Bmp),
    (&[0x49, 0x20, 0x49], ImageSignature::LegacyTiff),
    (&[0x89, 0x50, 0x4E, 0x47], ImageSignature::Png),
    (&[0x47, 0x49, 0x46, 0x38], ImageSignature::Gif),
    (&[0x49, 0x49, 0x2A, 0x00], ImageSignature::TiffLittleEndian),
    (&[0x4D, 0x4D, 0x00, 0x2A], ImageSignature::TiffBigEndian),
    (&[0x4D, 0x4D, 0x00, 0x2B], ImageSignature::BigTiff),
    (&[0x00, 0x00, 0x00, 0x00, 0x6A, 0x50], ImageSignature::Jpeg2000),
];

impl ImageSignature {
    pub fn name(&self) -> &'static str {
        match self {
            ImageSignature::Jpeg => "JPEG",
            ImageSignature::Bmp => "BMP",
            ImageSignature::LegacyTiff => "TIFF (I I)",
            ImageSignature::Png => "PNG",
            ImageSignature::Gif => "GIF",
            ImageSignature::TiffLittleEndian => "TIFF (II)",
            ImageSignature::TiffBigEndian => "TIFF (MM)",
            ImageSignature::BigTiff => "BigTIFF",
            ImageSignature::Jpeg2000 => "JPEG 2000",
        }
    }
}

/// Matches a file header against the known image signatures.
pub fn sniff(header: &[u8]) -> Option<ImageSignature> {
    SIGNATURES
        .iter()
        .find(|(magic, _)| header.starts_with(magic))
        .map(|(_, signature)| *signature)
}

/// Reads exactly `HEADER_LEN` bytes from the start of the file.
/// Returns `Ok(None)` when the file is shorter than that.
pub async fn read_header(path: &Path) -> Result<Option<[u8; HEADER_LEN]>, IntakeError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| IntakeError::ReadError(e, path.to_path_buf()))?;

    let mut header = [0u8; HEADER_LEN];
    match file.read_exact(&mut header).await {
        Ok(_) => Ok(Some(header)),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(IntakeError::ReadError(e, path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn recognises_common_formats() {
        assert_eq!(sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]), Some(ImageSignature::Jpeg));
        assert_eq!(sniff(b"BM6\x00\x00\x00"), Some(ImageSignature::Bmp));
        assert_eq!(sniff(b"\x89PNG\r\n"), Some(ImageSignature::Png));
        assert_eq!(sniff(b"GIF89a"), Some(ImageSignature::Gif));
        assert_eq!(sniff(b"II*\x00\x08\x00"), Some(ImageSignature::TiffLittleEndian));
        assert_eq!(sniff(b"MM\x00*\x00\x00"), Some(ImageSignature::TiffBigEndian));
        assert_eq!(sniff(b"MM\x00+\x00\x08"), Some(ImageSignature::BigTiff));
        assert_eq!(sniff(b"I I\x00\x00\x00"), Some(ImageSignature::LegacyTiff));
        assert_eq!(sniff(&[0, 0, 0, 0, 0x6A, 0x50]), Some(ImageSignature::Jpeg2000));
    }

    #[test]
    fn signatures_have_display_names() {
        assert_eq!(ImageSignature::Jpeg.name(), "JPEG");
        assert_eq!(ImageSignature::BigTiff.name(), "BigTIFF");
    }

    #[test]
    fn rejects_unknown_and_short_headers() {
        assert_eq!(sniff(b"%PDF-1"), None);
        assert_eq!(sniff(b"hello!"), None);
        assert_eq!(sniff(&[0xFF, 0xD8]), None);
        assert_eq!(sniff(&[]), None);
    }

    #[tokio::test]
    async fn read_header_requires_full_header() {
        let mut short = tempfile::NamedTempFile::new().unwrap();
        short.write_all(b"BM").unwrap();
        assert_eq!(read_header(short.path()).await.unwrap(), None);

        let mut full = tempfile::NamedTempFile::new().unwrap();
        full.write_all(b"GIF89a and then some").unwrap();
        assert_eq!(read_header(full.path()).await.unwrap(), Some(*b"GIF89a"));
    }

    #[tokio::test]
    async fn read_header_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_header(&dir.path().join("missing.jpg")).await;
        assert!(matches!(result, Err(IntakeError::ReadError(_, _))));
    }
}
