//! # Coarse Content-Type Classifier
//!
//! Attaches a MIME tag to cards reconstructed from persisted rows. The
//! classifier is deliberately coarse: a fixed magic-prefix table, first
//! match wins, then a printable-text check, then
//! `application/octet-stream`.
//!
//! This is metadata only; nothing in the ingestion pipeline branches on
//! the detected type.

/// MIME tag for printable text content.
pub const TEXT_PLAIN: &str = "text/plain";

/// MIME tag for unclassified binary content.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Magic-byte table: `(offset, prefix, mime)`. First match wins, so the
/// container formats that share a RIFF header are listed before any
/// shorter prefixes that could shadow them.
const MAGIC_TABLE: &[(usize, &[u8], &str)] = &[
    (0, b"\xff\xd8\xff", "image/jpeg"),
    (0, b"\x89PNG\r\n\x1a\n", "image/png"),
    (0, b"GIF87a", "image/gif"),
    (0, b"GIF89a", "image/gif"),
    (8, b"WEBP", "image/webp"),
    (8, b"WAVE", "audio/wav"),
    (0, b"BM", "image/bmp"),
    (0, b"%PDF", "application/pdf"),
    (0, b"ID3", "audio/mpeg"),
    (0, b"\xff\xfb", "audio/mpeg"),
    (4, b"ftyp", "video/mp4"),
    (0, b"\x1a\x45\xdf\xa3", "video/webm"),
    (0, b"PK\x03\x04", "application/zip"),
    (0, b"\x1f\x8b", "application/gzip"),
];

/// Classify `bytes` into a coarse MIME tag.
pub fn detect_content_type(bytes: &[u8]) -> &'static str {
    for &(offset, prefix, mime) in MAGIC_TABLE {
        if bytes.len() >= offset + prefix.len() && &bytes[offset..offset + prefix.len()] == prefix {
            // RIFF-offset entries only apply to RIFF containers.
            if offset == 8 && !bytes.starts_with(b"RIFF") {
                continue;
            }
            return mime;
        }
    }
    if is_printable_text(bytes) {
        TEXT_PLAIN
    } else {
        OCTET_STREAM
    }
}

/// Whether every byte is printable ASCII or common whitespace, with no
/// NUL anywhere.
fn is_printable_text(bytes: &[u8]) -> bool {
    !bytes.is_empty()
        && bytes
            .iter()
            .all(|&b| b.is_ascii_graphic() || matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn png_magic_wins() {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(&[0u8; 16]);
        assert_eq!(detect_content_type(&bytes), "image/png");
    }

    #[test]
    fn jpeg_magic_wins() {
        assert_eq!(detect_content_type(b"\xff\xd8\xff\xe0rest"), "image/jpeg");
    }

    #[test]
    fn gif_both_versions() {
        assert_eq!(detect_content_type(b"GIF87a...."), "image/gif");
        assert_eq!(detect_content_type(b"GIF89a...."), "image/gif");
    }

    #[test]
    fn riff_containers_disambiguate() {
        assert_eq!(detect_content_type(b"RIFF\x00\x00\x00\x00WEBPVP8 "), "image/webp");
        assert_eq!(detect_content_type(b"RIFF\x00\x00\x00\x00WAVEfmt "), "audio/wav");
    }

    #[test]
    fn mp4_ftyp_at_offset_four() {
        assert_eq!(detect_content_type(b"\x00\x00\x00\x18ftypmp42"), "video/mp4");
    }

    #[test]
    fn remaining_magic_rows() {
        assert_eq!(detect_content_type(b"BM\x00\x00"), "image/bmp");
        assert_eq!(detect_content_type(b"%PDF-1.7"), "application/pdf");
        assert_eq!(detect_content_type(b"ID3\x04tag"), "audio/mpeg");
        assert_eq!(detect_content_type(b"\xff\xfb\x90\x00"), "audio/mpeg");
        assert_eq!(detect_content_type(b"\x1a\x45\xdf\xa3webm"), "video/webm");
        assert_eq!(detect_content_type(b"PK\x03\x04zip!"), "application/zip");
        assert_eq!(detect_content_type(b"\x1f\x8b\x08gz"), "application/gzip");
    }

    #[test]
    fn printable_ascii_is_text_plain() {
        assert_eq!(detect_content_type(b"Hello, World!\nline two\r\n\ttabbed"), TEXT_PLAIN);
    }

    #[test]
    fn nul_byte_forces_octet_stream() {
        assert_eq!(detect_content_type(b"hello\x00world"), OCTET_STREAM);
    }

    #[test]
    fn non_ascii_bytes_force_octet_stream() {
        assert_eq!(detect_content_type(&[0x01, 0x02, 0x03]), OCTET_STREAM);
        assert_eq!(detect_content_type("héllo".as_bytes()), OCTET_STREAM);
    }

    #[test]
    fn empty_input_is_octet_stream() {
        assert_eq!(detect_content_type(b""), OCTET_STREAM);
    }
}
