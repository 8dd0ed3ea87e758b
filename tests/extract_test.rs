mod common;

use common::*;
use rtfd::archive::RtfdArchive;
use rtfd::flatten::FlattenedEntry;
use rtfd::report::{extract_entries, to_json, Digests, ExtractedFile};
use tempfile::tempdir;

#[test]
fn test_extract_mirrors_paths_and_hashes() {
    let bytes = bundle(&[
        (PREFERRED, file(b"Doc.rtfd")),
        ("TXT.rtf", file(b"{\\rtf1 hello}")),
        ("Pictures", dir(vec![
            ("shot", dir(vec![
                ("..", Value::Padded(b"\x89PNG\r\n\x1a\nfake".to_vec(), 8)),
                (UTF8_PREFERRED, file(b"shot.png")),
            ])),
        ])),
    ]);
    let entries = RtfdArchive::from_bytes(bytes).parse_entries().unwrap();
    let out = tempdir().unwrap();

    let files = extract_entries(&entries, out.path()).unwrap();
    assert_eq!(files.len(), 2);

    assert_eq!(files[0].filename, "TXT.rtf");
    assert_eq!(files[0].extracted_path, out.path().join("TXT.rtf"));
    assert!(!files[0].padding);
    assert_eq!(std::fs::read(&files[0].extracted_path).unwrap(), b"{\\rtf1 hello}");

    let png = &files[1];
    assert_eq!(png.filename, "shot.png");
    assert_eq!(png.extracted_path, out.path().join("Pictures").join("shot.png"));
    assert!(png.padding);
    assert_eq!(png.mime, "image/png");
    assert_eq!(png.size, 12);
    assert_eq!(png.digests, Digests::compute(b"\x89PNG\r\n\x1a\nfake"));
}

#[test]
fn test_unnamed_entries_get_fallback_names() {
    let entries = vec![
        FlattenedEntry { path: String::new(), data: b"one".to_vec().into(), pad_len: 0 },
        FlattenedEntry { path: "../..".into(), data: b"two".to_vec().into(), pad_len: 0 },
    ];
    let out = tempdir().unwrap();
    let files = extract_entries(&entries, out.path()).unwrap();
    assert_eq!(files[0].extracted_path, out.path().join("file_1.bin"));
    assert_eq!(files[1].extracted_path, out.path().join("file_2.bin"));
    assert_eq!(files[0].filename, "file_1.bin");
    assert_eq!(files[0].mime, "application/octet-stream");
}

#[test]
fn test_json_summary_shape() {
    let entries = vec![FlattenedEntry { path: "a.txt".into(), data: b"abc".to_vec().into(), pad_len: 2 }];
    let out = tempdir().unwrap();
    let files = extract_entries(&entries, out.path()).unwrap();
    let json = to_json(&files).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let row = &value[0];
    assert_eq!(row["filename"], "a.txt");
    assert_eq!(row["size"], 3);
    assert_eq!(row["padding"], true);
    assert_eq!(row["md5"], "900150983cd24fb0d6963f7d28e17f72");
    assert_eq!(row["sha1"], "a9993e364706816aba3e25717850c26c9cd0d89d");
    assert_eq!(row["sha256"], "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
    assert_eq!(row["mime"], "text/plain");

    let back: Vec<ExtractedFile> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, files);
}

#[test]
fn test_marker_entries_extract() {
    let bytes = bundle(&[
        ("img", dir(vec![
            ("..", file(b"GIF89a...")),
            (PREFERRED, file(b"anim")),
            (UTF8_PREFERRED, file(b"")),
            (".", file(b"")),
        ])),
    ]);
    let entries: Vec<FlattenedEntry<'static>> = RtfdArchive::from_bytes(bytes)
        .scan_markers()
        .unwrap()
        .into_iter()
        .map(FlattenedEntry::from)
        .collect();
    let out = tempdir().unwrap();
    let files = extract_entries(&entries, out.path()).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, "anim");
    assert_eq!(files[0].mime, "image/gif");
}

#[test]
fn test_same_named_attachments_both_survive() {
    let bytes = bundle(&[
        ("a", dir(vec![("..", file(b"FIRST")), (PREFERRED, file(b"image.png"))])),
        ("b", dir(vec![("..", file(b"SECOND")), (PREFERRED, file(b"image.png"))])),
    ]);
    let entries = RtfdArchive::from_bytes(bytes).parse_entries().unwrap();
    let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, ["image.png", "image.png"]);

    let out = tempdir().unwrap();
    let files = extract_entries(&entries, out.path()).unwrap();
    assert_eq!(files[0].extracted_path, out.path().join("image.png"));
    assert_eq!(files[1].extracted_path, out.path().join("image (2).png"));
    assert_eq!(files[1].filename, "image (2).png");
    assert_eq!(files[1].mime, "image/png");

    assert_eq!(std::fs::read(&files[0].extracted_path).unwrap(), b"FIRST");
    assert_eq!(std::fs::read(&files[1].extracted_path).unwrap(), b"SECOND");
    assert_eq!(files[0].digests, Digests::compute(b"FIRST"));
    assert_eq!(files[1].digests, Digests::compute(b"SECOND"));
}
