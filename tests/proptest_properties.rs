use std::io::Write;

use oxibr::{DecodeError, StreamDecoder, StreamOptions, decode_all};
use proptest::prelude::*;

fn compress(data: &[u8], quality: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut writer = brotli::CompressorWriter::new(&mut out, 4096, quality, 22);
        writer.write_all(data).unwrap();
    }
    out
}

fn decode_chunked(
    compressed: &[u8],
    chunk: usize,
    input_region_len: usize,
    output_region_len: usize,
) -> Result<Vec<u8>, DecodeError> {
    let mut decoder = StreamDecoder::with_options(StreamOptions {
        input_region_len,
        output_region_len,
        ..Default::default()
    })?;
    let mut out = Vec::new();
    for piece in compressed.chunks(chunk) {
        decoder.feed(piece, &mut out)?;
    }
    decoder.finish()?;
    Ok(out)
}

proptest! {
    #[test]
    fn prop_compress_decode_roundtrip(
        data in proptest::collection::vec(any::<u8>(), 0..8192),
        quality in 0u32..=11u32
    ) {
        let compressed = compress(&data, quality);
        prop_assert_eq!(decode_all(&compressed).unwrap(), data);
    }

    #[test]
    fn prop_chunking_and_region_sizes_are_invisible(
        data in proptest::collection::vec(0u8..8, 0..16384),
        chunk in 1usize..512,
        input_region_len in 1usize..256,
        output_region_len in 1usize..1024
    ) {
        let compressed = compress(&data, 5);
        let decoded = decode_chunked(&compressed, chunk, input_region_len, output_region_len).unwrap();
        prop_assert_eq!(decoded, data);
    }

    #[test]
    fn prop_byte_counters_match_stream(
        data in proptest::collection::vec(any::<u8>(), 1..4096),
        chunk in 1usize..64
    ) {
        let compressed = compress(&data, 3);
        let mut decoder = StreamDecoder::new().unwrap();
        let mut out = Vec::new();
        let mut last_in = 0;
        for piece in compressed.chunks(chunk) {
            decoder.feed(piece, &mut out).unwrap();
            prop_assert!(decoder.bytes_in() >= last_in);
            last_in = decoder.bytes_in();
        }
        prop_assert_eq!(decoder.bytes_in(), compressed.len() as u64);
        prop_assert_eq!(decoder.bytes_out(), data.len() as u64);
        prop_assert_eq!(decoder.finish().unwrap(), data.len() as u64);
    }

    #[test]
    fn prop_arbitrary_input_never_panics(
        junk in proptest::collection::vec(any::<u8>(), 0..2048),
        chunk in 1usize..128
    ) {
        // Any outcome is acceptable as long as it is reported, not a panic.
        let _ = decode_chunked(&junk, chunk, 64, 64);
    }
}

#[test]
#[ignore = "performance properties are workload and machine dependent"]
fn perf_property_decode_not_pathological() {
    use std::time::Instant;
    let data: Vec<u8> = (0..8 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    let compressed = compress(&data, 5);

    let t0 = Instant::now();
    let decoded = decode_all(&compressed).unwrap();
    let dt = t0.elapsed();
    assert_eq!(decoded.len(), data.len());
    assert!(dt.as_secs_f64() < 5.0, "decode took {dt:?}");
}
