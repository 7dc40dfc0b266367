use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use oxibr::{DecodeHost, StepStatus, StreamDecoder, StreamOptions, decode_all};
use std::fs;
use std::io::Write;
use std::path::Path;

fn gen_text(size: usize, seed: u64) -> Vec<u8> {
    let words: &[&[u8]] = &[
        b"region ", b"session ", b"decode ", b"window ", b"stream ", b"output ", b"input\n",
    ];
    let mut s = seed;
    let mut out = Vec::with_capacity(size + 16);
    while out.len() < size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.extend_from_slice(words[(s >> 33) as usize % words.len()]);
        if (s >> 40) % 17 == 0 {
            out.push((s >> 48) as u8);
        }
    }
    out.truncate(size);
    out
}

fn compress(data: &[u8], quality: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut writer = brotli::CompressorWriter::new(&mut out, 4096, quality, 22);
        writer.write_all(data).unwrap();
    }
    out
}

fn write_ratio_snapshot() {
    let data = gen_text(2 * 1024 * 1024, 123);
    let mut csv = String::from("quality,compressed_bytes,plain_bytes,ratio\n");
    for quality in [1u32, 5, 9, 11] {
        let compressed = compress(&data, quality);
        let ratio = compressed.len() as f64 / data.len() as f64;
        csv.push_str(&format!(
            "{quality},{},{},{}\n",
            compressed.len(),
            data.len(),
            ratio
        ));
    }
    let out_dir = Path::new("target/criterion/custom_reports");
    let _ = fs::create_dir_all(out_dir);
    let _ = fs::write(out_dir.join("ratio_snapshot.csv"), csv);
}

fn bench_decode_all(c: &mut Criterion) {
    write_ratio_snapshot();
    let mut g = c.benchmark_group("decode_all_mb_s");
    for size in [64 * 1024usize, 1024 * 1024, 8 * 1024 * 1024] {
        let data = gen_text(size, 1);
        let compressed = compress(&data, 9);
        g.throughput(Throughput::Bytes(size as u64));
        g.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let out = decode_all(black_box(&compressed)).unwrap();
                black_box(out);
            });
        });
    }
    g.finish();
}

fn bench_output_region_len(c: &mut Criterion) {
    let mut g = c.benchmark_group("decode_vs_output_region_len");
    let data = gen_text(4 * 1024 * 1024, 2);
    let compressed = compress(&data, 9);
    g.throughput(Throughput::Bytes(data.len() as u64));
    for out_len in [4 * 1024usize, 64 * 1024, 512 * 1024, 4 * 1024 * 1024] {
        g.bench_with_input(BenchmarkId::from_parameter(out_len), &out_len, |b, out_len| {
            b.iter(|| {
                let mut decoder = StreamDecoder::with_options(StreamOptions {
                    output_region_len: *out_len,
                    ..Default::default()
                })
                .unwrap();
                let mut sink = std::io::sink();
                decoder.feed(black_box(&compressed), &mut sink).unwrap();
                black_box(decoder.finish().unwrap());
            });
        });
    }
    g.finish();
}

fn bench_input_chunking(c: &mut Criterion) {
    let mut g = c.benchmark_group("decode_vs_input_chunk");
    let data = gen_text(2 * 1024 * 1024, 3);
    let compressed = compress(&data, 9);
    g.throughput(Throughput::Bytes(data.len() as u64));
    for chunk in [256usize, 4 * 1024, 128 * 1024] {
        g.bench_with_input(BenchmarkId::from_parameter(chunk), &chunk, |b, chunk| {
            b.iter(|| {
                let mut decoder = StreamDecoder::with_options(StreamOptions {
                    input_region_len: *chunk,
                    ..Default::default()
                })
                .unwrap();
                let mut sink = std::io::sink();
                for piece in compressed.chunks(*chunk) {
                    decoder.feed(piece, &mut sink).unwrap();
                }
                black_box(decoder.finish().unwrap());
            });
        });
    }
    g.finish();
}

fn bench_host_handles(c: &mut Criterion) {
    let mut g = c.benchmark_group("host_session_step");
    let data = gen_text(1024 * 1024, 4);
    let compressed = compress(&data, 5);
    g.throughput(Throughput::Bytes(data.len() as u64));
    g.bench_function("host_decode_1m", |b| {
        b.iter(|| {
            let mut host = DecodeHost::new();
            host.alloc_input(128 * 1024).unwrap();
            host.alloc_output(512 * 1024).unwrap();
            let id = host.create_session();
            let mut total = 0usize;
            'feed: for chunk in compressed.chunks(128 * 1024) {
                let staged = host.stage_input(chunk).unwrap();
                let mut offset = 0;
                loop {
                    let status = host.step(id, offset, staged - offset).unwrap();
                    offset += host.consumed_input(id).unwrap();
                    total += host.drain_output().unwrap().len();
                    match status {
                        StepStatus::HasMoreOutput => continue,
                        StepStatus::NeedsMoreInput if host.has_more_output(id).unwrap() => {
                            continue;
                        }
                        StepStatus::NeedsMoreInput => break,
                        StepStatus::Done | StepStatus::Error => break 'feed,
                    }
                }
            }
            host.destroy(id).unwrap();
            black_box(total);
        });
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_decode_all,
    bench_output_region_len,
    bench_input_chunking,
    bench_host_handles
);
criterion_main!(benches);
