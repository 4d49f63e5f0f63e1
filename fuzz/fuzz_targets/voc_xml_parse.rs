//! Fuzz target for annotation XML decoding.
//!
//! Feeds arbitrary bytes to the decoder, checking for panics, crashes or
//! hangs. Malformed input must come back as an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rotolabel::ir::io_voc_xml::from_voc_xml_slice;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid excessive memory usage.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_voc_xml_slice(data);
});
