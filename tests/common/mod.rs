//! Test-only bundle builder.  The crate itself never writes bundles.
#![allow(dead_code)]

pub const PREFERRED: &str = "__@PreferredName@__";
pub const UTF8_PREFERRED: &str = "__@UTF8PreferredName@__";

pub enum Value {
    File(Vec<u8>),
    Padded(Vec<u8>, usize),
    Dir(Vec<(&'static str, Value)>),
    /// A record with an arbitrary type tag followed by a string payload.
    Typed(u32, Vec<u8>),
}

pub fn file(data: &[u8]) -> Value {
    Value::File(data.to_vec())
}

pub fn dir(entries: Vec<(&'static str, Value)>) -> Value {
    Value::Dir(entries)
}

pub fn string(body: &[u8]) -> Vec<u8> {
    let mut v = (body.len() as u32).to_le_bytes().to_vec();
    v.extend_from_slice(body);
    v
}

pub fn padded_string(body: &[u8], pad: usize) -> Vec<u8> {
    let mut v = 0x8000_0000u32.to_le_bytes().to_vec();
    v.extend_from_slice(&(body.len() as u32).to_le_bytes());
    v.extend_from_slice(&(pad as u32).to_le_bytes());
    v.extend(std::iter::repeat(0x5Au8).take(pad));
    v.extend_from_slice(body);
    v
}

pub fn header() -> Vec<u8> {
    let mut v = b"rtfd".to_vec();
    v.extend_from_slice(&0u32.to_le_bytes());
    v.extend_from_slice(&3u32.to_le_bytes());
    v
}

pub fn directory(entries: &[(&str, Value)]) -> Vec<u8> {
    let mut v = (entries.len() as u32).to_le_bytes().to_vec();
    for (key, _) in entries {
        v.extend(string(key.as_bytes()));
    }
    for (_, value) in entries {
        let hint = match value {
            Value::File(d) | Value::Padded(d, _) | Value::Typed(_, d) => d.len() as u32,
            Value::Dir(_) => 0,
        };
        v.extend_from_slice(&hint.to_le_bytes());
    }
    for (_, value) in entries {
        match value {
            Value::File(d) => {
                v.extend_from_slice(&1u32.to_le_bytes());
                v.extend(string(d));
            }
            Value::Padded(d, pad) => {
                v.extend_from_slice(&1u32.to_le_bytes());
                v.extend(padded_string(d, *pad));
            }
            Value::Dir(children) => {
                v.extend_from_slice(&3u32.to_le_bytes());
                v.extend(directory(children));
            }
            Value::Typed(tag, d) => {
                v.extend_from_slice(&tag.to_le_bytes());
                v.extend(string(d));
            }
        }
    }
    v
}

pub fn bundle(entries: &[(&str, Value)]) -> Vec<u8> {
    let mut v = header();
    v.extend(directory(entries));
    v
}

/// `Doc.rtfd` holding `TXT.rtf` and an attachment wrapping `image.png`.
pub fn two_level_bundle(b1: &[u8], b2: &[u8]) -> Vec<u8> {
    bundle(&[
        (PREFERRED, file(b"Doc.rtfd")),
        ("TXT.rtf", file(b1)),
        ("Attachment", dir(vec![
            ("..", Value::Padded(b2.to_vec(), 12)),
            (PREFERRED, file(b"image.png")),
            (UTF8_PREFERRED, file(b"image.png")),
        ])),
    ])
}
