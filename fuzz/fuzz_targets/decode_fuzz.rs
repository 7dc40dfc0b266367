#![no_main]
use libfuzzer_sys::fuzz_target;
use oxibr::{StreamDecoder, StreamOptions};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must only ever produce errors, never panics.
    let _ = oxibr::decode_all(data);

    // Same input through tiny regions, chunk size taken from the first byte.
    if let Some((&first, rest)) = data.split_first() {
        let chunk = usize::from(first % 32) + 1;
        let Ok(mut decoder) = StreamDecoder::with_options(StreamOptions {
            input_region_len: chunk,
            output_region_len: 64,
            ..Default::default()
        }) else {
            return;
        };
        let mut sink = std::io::sink();
        for piece in rest.chunks(chunk) {
            if decoder.feed(piece, &mut sink).is_err() {
                return;
            }
        }
        let _ = decoder.finish();
    }
});
