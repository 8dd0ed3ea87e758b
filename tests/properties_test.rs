mod common;

use common::*;
use proptest::prelude::*;
use rtfd::archive::RtfdArchive;
use rtfd::string::{read_blob, read_string};
use std::io::Cursor;

proptest! {
    #[test]
    fn direct_strings_decode_exactly(body in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let mut bytes = string(&body);
        bytes.extend_from_slice(b"trailer");
        let mut cur = Cursor::new(bytes);
        prop_assert_eq!(read_string(&mut cur).unwrap(), body.clone());
        prop_assert_eq!(cur.position() as usize, 4 + body.len());
    }

    #[test]
    fn sentinel_strings_drop_padding(
        body in proptest::collection::vec(any::<u8>(), 0..1024),
        pad in 0usize..64,
    ) {
        let blob = read_blob(Cursor::new(padded_string(&body, pad)), None).unwrap();
        prop_assert_eq!(blob.bytes, body);
        prop_assert_eq!(blob.pad_len as usize, pad);
    }

    #[test]
    fn every_truncation_is_a_format_error(
        b1 in proptest::collection::vec(any::<u8>(), 0..64),
        b2 in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let full = two_level_bundle(&b1, &b2);
        for cut in 0..full.len() {
            let err = RtfdArchive::from_bytes(full[..cut].to_vec()).parse(true).unwrap_err();
            prop_assert!(err.is_truncation(), "cut at {}: {:?}", cut, err);
        }
        prop_assert!(RtfdArchive::from_bytes(full).parse(true).is_ok());
    }

    #[test]
    fn parsing_is_deterministic(
        b1 in proptest::collection::vec(any::<u8>(), 0..256),
        b2 in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let bytes = two_level_bundle(&b1, &b2);
        let mut ar = RtfdArchive::from_bytes(bytes.clone());
        let first = ar.parse_entries().unwrap();
        let again = ar.parse_entries().unwrap();
        let other = RtfdArchive::from_bytes(bytes).parse_entries().unwrap();
        prop_assert_eq!(&first, &again);
        prop_assert_eq!(&first, &other);
        prop_assert_eq!(&*first[0].data, &b1[..]);
        prop_assert_eq!(&*first[1].data, &b2[..]);
    }

    #[test]
    fn arbitrary_input_never_panics(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut bytes = header();
        bytes.extend(data);
        let _ = RtfdArchive::from_bytes(bytes).parse(true);
    }
}
