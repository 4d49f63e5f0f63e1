//! Fuzz target for decode followed by encode.
//!
//! Anything the decoder accepts must encode again without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rotolabel::ir::io_voc_xml::fuzz_decode_encode;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let _ = fuzz_decode_encode(data);
});
