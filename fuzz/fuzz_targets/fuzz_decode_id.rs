#![no_main]

use libfuzzer_sys::fuzz_target;
use pdfmatch::search::{decode_id, encode_id};

fuzz_target!(|id: &str| {
    // Anything that decodes must re-encode to an id decoding to the same pair
    if let Ok((doc, page)) = decode_id(id) {
        assert_eq!(decode_id(&encode_id(doc, page)).ok(), Some((doc, page)));
    }
});
