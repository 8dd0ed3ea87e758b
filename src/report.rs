//! Extraction to disk and the per-file JSON summary.
//!
//! None of this is needed to decode a bundle; it is what the `rtfd` binary
//! does with the decoded entries.  Digests are computed concurrently with
//! Rayon when the `parallel` feature is enabled.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::Sha256;
use tracing::info;

use crate::flatten::FlattenedEntry;

// ── Digests ──────────────────────────────────────────────────────────────────

/// Lowercase hex digests of one file body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digests {
    pub md5:    String,
    pub sha1:   String,
    pub sha256: String,
    pub blake3: String,
}

impl Digests {
    pub fn compute(data: &[u8]) -> Self {
        Self {
            md5:    hex::encode(Md5::digest(data)),
            sha1:   hex::encode(Sha1::digest(data)),
            sha256: hex::encode(Sha256::digest(data)),
            blake3: blake3::hash(data).to_hex().to_string(),
        }
    }
}

// ── MIME ─────────────────────────────────────────────────────────────────────

/// Leading bytes of formats commonly found in bundles, for files whose name
/// gives no hint.
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff",      "image/jpeg"),
    (b"GIF87a",            "image/gif"),
    (b"GIF89a",            "image/gif"),
    (b"%PDF-",             "application/pdf"),
    (b"II*\0",             "image/tiff"),
    (b"MM\0*",             "image/tiff"),
    (b"{\\rtf",            "application/rtf"),
    (b"rtfd",              "application/x-rtfd"),
];

/// MIME type from the file name's extension, else from the leading bytes,
/// else `application/octet-stream`.
pub fn sniff_mime(name: &str, data: &[u8]) -> String {
    if let Some(mime) = mime_guess::from_path(name).first() {
        return mime.essence_str().to_string();
    }
    SIGNATURES
        .iter()
        .find(|(magic, _)| data.starts_with(magic))
        .map(|(_, mime)| mime.to_string())
        .unwrap_or_else(|| mime_guess::mime::APPLICATION_OCTET_STREAM.to_string())
}

// ── Paths ────────────────────────────────────────────────────────────────────

/// Relative on-disk path for the `index`-th entry (1-based).
///
/// Segments that would escape the destination (empty, `.`, `..`, roots) are
/// dropped and backslashes become `_`.  An entry left with no segment is
/// named `file_{index}.bin`.
pub fn output_path(entry_path: &str, index: usize) -> PathBuf {
    let mut out = PathBuf::new();
    for segment in entry_path.split('/') {
        let segment = segment.replace('\\', "_");
        if matches!(Path::new(&segment).components().next(), Some(Component::Normal(_)))
            && Path::new(&segment).components().count() == 1
        {
            out.push(segment);
        }
    }
    if out.as_os_str().is_empty() {
        out.push(format!("file_{index}.bin"));
    }
    out
}

/// `path` if no earlier entry took it, else the first free `stem (n).ext`
/// with `n` counting from 2.
fn unique_path(path: PathBuf, used: &mut HashSet<PathBuf>) -> PathBuf {
    if used.insert(path.clone()) {
        return path;
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());
    let mut n = 2usize;
    loop {
        let name = match &ext {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None      => format!("{stem} ({n})"),
        };
        let candidate = path.with_file_name(name);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

// ── Extraction ───────────────────────────────────────────────────────────────

/// One row of the JSON summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFile {
    pub filename:       String,
    pub extracted_path: PathBuf,
    pub size:           u64,
    /// Whether the body was stored behind alignment padding.
    pub padding:        bool,
    #[serde(flatten)]
    pub digests:        Digests,
    pub mime:           String,
}

/// Write every entry below `dest`, creating directories that mirror the
/// flattened paths, and describe what was written.
///
/// Entries sharing a path are written side by side as `name (2).ext`,
/// `name (3).ext` and so on, so every row describes a file still on disk.
pub fn extract_entries(entries: &[FlattenedEntry<'_>], dest: &Path) -> io::Result<Vec<ExtractedFile>> {
    fs::create_dir_all(dest)?;

    let mut used = HashSet::with_capacity(entries.len());
    let mut written = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let out_path = dest.join(unique_path(output_path(&entry.path, i + 1), &mut used));
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&out_path, &entry.data)?;
        info!(path = %out_path.display(), size = entry.data.len(), "extracted");
        written.push(out_path);
    }

    let digests = compute_digests(entries);
    Ok(entries
        .iter()
        .zip(written)
        .zip(digests)
        .map(|((entry, extracted_path), digests)| {
            let filename = extracted_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ExtractedFile {
                mime: sniff_mime(&filename, &entry.data),
                filename,
                extracted_path,
                size: entry.data.len() as u64,
                padding: entry.pad_len > 0,
                digests,
            }
        })
        .collect())
}

fn compute_digests(entries: &[FlattenedEntry<'_>]) -> Vec<Digests> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        entries.par_iter().map(|e| Digests::compute(&e.data)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        entries.iter().map(|e| Digests::compute(&e.data)).collect()
    }
}

pub fn to_json(files: &[ExtractedFile]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(files)
}
