//! Log archive reader.
//!
//! GitHub serves run logs as a zip with one text file per job step. The
//! largest streams are the most likely to hold the failing step, so the
//! reader ranks entries by uncompressed size and decodes only the top `K`.

use std::io::{Cursor, Read};

use sha2::{Digest, Sha256};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::domain::{ArchiveSummary, Result, TriageError};

/// Number of log entries analysed by default.
pub const DEFAULT_TOP_K: usize = 3;

/// A file entry of the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Position in the zip central directory.
    pub index: usize,
    pub name: String,
    /// Declared uncompressed size in bytes.
    pub size: u64,
}

/// Read-only view over fetched archive bytes.
pub struct LogArchive<'a> {
    bytes: &'a [u8],
    zip: ZipArchive<Cursor<&'a [u8]>>,
    entries: Vec<ArchiveEntry>,
}

/// Decoded text of the top-ranked entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLogs {
    /// Entry texts joined by `\n`, largest entry first.
    pub text: String,
    pub summary: ArchiveSummary,
}

fn corrupt(err: ZipError) -> TriageError {
    TriageError::CorruptArchive(err.to_string())
}

impl<'a> LogArchive<'a> {
    /// Parse archive bytes.
    ///
    /// Fails with `CorruptArchive` when the bytes are not a zip and with
    /// `EmptyArchive` when the zip holds no files.
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let mut zip = ZipArchive::new(Cursor::new(bytes)).map_err(corrupt)?;

        let mut entries = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let file = zip.by_index(index).map_err(corrupt)?;
            if file.is_dir() {
                continue;
            }
            entries.push(ArchiveEntry {
                index,
                name: file.name().to_string(),
                size: file.size(),
            });
        }

        if entries.is_empty() {
            return Err(TriageError::EmptyArchive);
        }

        Ok(Self {
            bytes,
            zip,
            entries,
        })
    }

    /// File entries in archive order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// File entries by declared size, largest first. Ties keep archive order.
    pub fn ranked(&self) -> Vec<ArchiveEntry> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.size.cmp(&a.size));
        ranked
    }

    /// Hex SHA-256 of the raw archive bytes.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.bytes))
    }

    /// Decode the `top_k` largest entries and join them in ranked order.
    ///
    /// Invalid UTF-8 is replaced, never fatal.
    pub fn read_top(&mut self, top_k: usize) -> Result<ExtractedLogs> {
        let selected: Vec<ArchiveEntry> =
            self.ranked().into_iter().take(top_k.max(1)).collect();

        let mut texts = Vec::with_capacity(selected.len());
        for entry in &selected {
            let mut file = self.zip.by_index(entry.index).map_err(corrupt)?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf).map_err(|e| {
                TriageError::CorruptArchive(format!("{}: {}", entry.name, e))
            })?;
            debug!(entry = %entry.name, size = entry.size, "Decoded log entry");
            texts.push(String::from_utf8_lossy(&buf).into_owned());
        }

        Ok(ExtractedLogs {
            text: texts.join("\n"),
            summary: ArchiveSummary {
                entries_total: self.entries.len(),
                entries_analyzed: selected.into_iter().map(|e| e.name).collect(),
                digest: self.digest(),
            },
        })
    }
}

/// Parse `bytes` and decode its `top_k` largest entries.
pub fn extract_log_text(bytes: &[u8], top_k: usize) -> Result<ExtractedLogs> {
    LogArchive::parse(bytes)?.read_top(top_k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn zip_of(files: &[(&str, Vec<u8>)], dirs: &[&str]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for dir in dirs {
            writer.add_directory(*dir, options).unwrap();
        }
        for (name, body) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(body).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn padded(marker: &str, size: usize) -> Vec<u8> {
        let mut body = marker.as_bytes().to_vec();
        body.resize(size, b'.');
        body
    }

    #[test]
    fn test_top_k_selects_largest_entries_in_size_order() {
        let bytes = zip_of(
            &[
                ("ten.txt", padded("TEN", 10)),
                ("five_hundred.txt", padded("FIVE_HUNDRED", 500)),
                ("fifty.txt", padded("FIFTY", 50)),
                ("tiny.txt", padded("tiny!", 5)),
            ],
            &[],
        );

        let logs = extract_log_text(&bytes, 3).unwrap();

        let big = logs.text.find("FIVE_HUNDRED").unwrap();
        let mid = logs.text.find("FIFTY").unwrap();
        let small = logs.text.find("TEN").unwrap();
        assert!(big < mid && mid < small);
        assert!(!logs.text.contains("tiny!"));
        assert_eq!(
            logs.summary.entries_analyzed,
            vec!["five_hundred.txt", "fifty.txt", "ten.txt"]
        );
        assert_eq!(logs.summary.entries_total, 4);
    }

    #[test]
    fn test_entries_are_joined_with_line_break() {
        let bytes = zip_of(
            &[("a.txt", b"alpha alpha".to_vec()), ("b.txt", b"beta".to_vec())],
            &[],
        );
        let logs = extract_log_text(&bytes, 3).unwrap();
        assert_eq!(logs.text, "alpha alpha\nbeta");
    }

    #[test]
    fn test_ties_keep_archive_order() {
        let bytes = zip_of(
            &[("first.txt", b"1111".to_vec()), ("second.txt", b"2222".to_vec())],
            &[],
        );
        let archive = LogArchive::parse(&bytes).unwrap();
        let names: Vec<String> = archive.ranked().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["first.txt", "second.txt"]);
    }

    #[test]
    fn test_directories_are_not_log_entries() {
        let bytes = zip_of(&[("build/1_Set up job.txt", b"setup".to_vec())], &["build/"]);
        let archive = LogArchive::parse(&bytes).unwrap();
        assert_eq!(archive.entries().len(), 1);
        assert_eq!(archive.entries()[0].name, "build/1_Set up job.txt");
    }

    #[test]
    fn test_zip_without_files_is_empty_archive() {
        let bytes = zip_of(&[], &["build/"]);
        assert_eq!(
            LogArchive::parse(&bytes).err(),
            Some(TriageError::EmptyArchive)
        );

        let bytes = zip_of(&[], &[]);
        assert_eq!(
            LogArchive::parse(&bytes).err(),
            Some(TriageError::EmptyArchive)
        );
    }

    #[test]
    fn test_garbage_bytes_are_corrupt_archive() {
        let err = LogArchive::parse(b"this is not a zip file").err().unwrap();
        assert!(matches!(err, TriageError::CorruptArchive(_)));

        let err = LogArchive::parse(&[]).err().unwrap();
        assert!(matches!(err, TriageError::CorruptArchive(_)));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let bytes = zip_of(&[("bin.txt", b"ok \xff\xfe done".to_vec())], &[]);
        let logs = extract_log_text(&bytes, 1).unwrap();
        assert!(logs.text.starts_with("ok "));
        assert!(logs.text.ends_with(" done"));
        assert!(logs.text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_digest_is_sha256_of_bytes() {
        let bytes = zip_of(&[("a.txt", b"alpha".to_vec())], &[]);
        let archive = LogArchive::parse(&bytes).unwrap();
        assert_eq!(archive.digest(), hex::encode(Sha256::digest(&bytes)));
        assert_eq!(archive.digest().len(), 64);
    }
}
