//! Binary detection and text decoding for corpus files.
//!
//! Text decoding handles:
//! - UTF-8 fast path with strict validation
//! - BOM detection (UTF-8, UTF-16 LE/BE)
//! - Fallback charset detection using chardetng
//! - Replacement characters instead of hard failures

use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes sampled from the head of a file for binary classification.
pub const BINARY_SAMPLE_SIZE: usize = 8192;

/// Fraction of non-printable bytes above which a sample counts as binary.
const NON_PRINTABLE_LIMIT: f64 = 0.30;

/// Classify a byte sample.
///
/// A single null byte means binary. Otherwise the sample is binary when more
/// than 30% of its bytes are neither printable ASCII nor tab/LF/CR. Empty
/// samples are text.
pub fn is_binary_sample(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }

    let non_printable = sample
        .iter()
        .filter(|&&b| !((32..=126).contains(&b) || b == 9 || b == 10 || b == 13))
        .count();

    (non_printable as f64 / sample.len() as f64) > NON_PRINTABLE_LIMIT
}

/// Detect if a file is binary by sampling its first `sample_size` bytes.
///
/// Unreadable files are reported as binary so they are excluded rather than
/// emitted half-read.
pub fn is_binary_file(path: &Path, sample_size: usize) -> bool {
    read_sample(path, sample_size).map(|sample| is_binary_sample(&sample)).unwrap_or(true)
}

fn read_sample(path: &Path, sample_size: usize) -> Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(sample_size);
    file.take(sample_size as u64).read_to_end(&mut sample)?;
    Ok(sample)
}

/// Read a whole file as text.
///
/// Strict UTF-8 is tried first; a leading BOM or a chardetng guess picks the
/// decoder otherwise, with malformed sequences replaced.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(decode_bytes(bytes))
}

/// Decode raw bytes into text; never fails.
pub fn decode_bytes(bytes: Vec<u8>) -> String {
    let bytes = match String::from_utf8(bytes) {
        Ok(text) => {
            return match text.strip_prefix('\u{feff}') {
                Some(rest) => rest.to_string(),
                None => text,
            };
        }
        Err(err) => err.into_bytes(),
    };

    let encoding = detect_encoding(&bytes);
    let (decoded, _, _) = encoding.decode(&bytes);
    decoded.into_owned()
}

fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if bytes.starts_with(&[0xef, 0xbb, 0xbf]) {
        return UTF_8;
    }
    if bytes.starts_with(&[0xff, 0xfe]) {
        return UTF_16LE;
    }
    if bytes.starts_with(&[0xfe, 0xff]) {
        return UTF_16BE;
    }

    let sample = &bytes[..bytes.len().min(BINARY_SAMPLE_SIZE)];
    let mut detector = EncodingDetector::new();
    detector.feed(sample, sample.len() == bytes.len());
    detector.guess(None, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn null_byte_is_binary() {
        assert!(is_binary_sample(b"hello\0world"));
    }

    #[test]
    fn plain_text_is_not_binary() {
        assert!(!is_binary_sample(b"fn main() {\n\tprintln!(\"hi\");\r\n}\n"));
        assert!(!is_binary_sample(b""));
    }

    #[test]
    fn non_printable_threshold_is_thirty_percent() {
        // 3 of 10 bytes non-printable: exactly 30%, still text.
        let mut sample = vec![b'a'; 7];
        sample.extend_from_slice(&[0x01, 0x02, 0x03]);
        assert!(!is_binary_sample(&sample));

        // 4 of 10: binary.
        let mut sample = vec![b'a'; 6];
        sample.extend_from_slice(&[0x01, 0x02, 0x03, 0x04]);
        assert!(is_binary_sample(&sample));
    }

    #[test]
    fn only_the_sample_window_is_inspected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&vec![b'a'; 16]).unwrap();
        file.write_all(&[0x00]).unwrap();
        file.flush().unwrap();

        assert!(!is_binary_file(file.path(), 16));
        assert!(is_binary_file(file.path(), 32));
    }

    #[test]
    fn unreadable_file_counts_as_binary() {
        assert!(is_binary_file(Path::new("/definitely/not/here.bin"), BINARY_SAMPLE_SIZE));
    }

    #[test]
    fn read_text_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all("Test content 🚀".as_bytes()).unwrap();
        file.flush().unwrap();

        assert_eq!(read_text(file.path()).unwrap(), "Test content 🚀");
    }

    #[test]
    fn read_text_strips_utf8_bom() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xef, 0xbb, 0xbf]).unwrap();
        file.write_all(b"Hello").unwrap();
        file.flush().unwrap();

        assert_eq!(read_text(file.path()).unwrap(), "Hello");
    }

    #[test]
    fn latin1_bytes_are_decoded_not_rejected() {
        let text = decode_bytes(b"caf\xe9 au lait".to_vec());
        assert!(text.starts_with("caf"));
        assert!(text.ends_with("au lait"));
    }
}
