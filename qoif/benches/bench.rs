use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use qoif::{QoiDecodeContext, QoiEncodeContext};

const WIDTH: usize = 512;
const HEIGHT: usize = 512;

/// Smooth horizontal gradient; compresses almost entirely to DIFF/LUMA ops.
fn gradient_rgb() -> Vec<u8> {
    let mut out = Vec::with_capacity(WIDTH * HEIGHT * 3);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            out.extend_from_slice(&[(x / 2) as u8, ((x + y) / 4) as u8, (y / 2) as u8]);
        }
    }
    out
}

/// Deterministic noise (xorshift); mostly RGBA/RGB literals, worst case.
fn noise_rgba() -> Vec<u8> {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    let mut out = Vec::with_capacity(WIDTH * HEIGHT * 4);
    for _ in 0..WIDTH * HEIGHT {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.extend_from_slice(&state.to_le_bytes()[..4]);
    }
    out
}

/// A handful of flat tiles; compresses to runs and index hits.
fn tiles_rgb() -> Vec<u8> {
    let palette = [[10u8, 20, 30], [200, 10, 10], [0, 0, 0], [128, 128, 128]];
    let mut out = Vec::with_capacity(WIDTH * HEIGHT * 3);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            out.extend_from_slice(&palette[(x / 64 + y / 64) % palette.len()]);
        }
    }
    out
}

fn encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    group.throughput(criterion::Throughput::Elements((WIDTH * HEIGHT) as u64));

    for (name, channels, pixels) in [
        ("gradient_rgb", 3u8, gradient_rgb()),
        ("noise_rgba", 4, noise_rgba()),
        ("tiles_rgb", 3, tiles_rgb()),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &pixels, |b, pixels| {
            let mut encoded = Vec::with_capacity(pixels.len());
            b.iter(|| {
                encoded.clear();
                QoiEncodeContext::encode_to_vec(
                    WIDTH as u32,
                    HEIGHT as u32,
                    channels,
                    0,
                    pixels,
                    &mut encoded,
                )
            })
        });
    }
}

fn decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(criterion::Throughput::Elements((WIDTH * HEIGHT) as u64));

    for (name, channels, pixels) in [
        ("gradient_rgb", 3u8, gradient_rgb()),
        ("noise_rgba", 4, noise_rgba()),
        ("tiles_rgb", 3, tiles_rgb()),
    ] {
        let mut encoded = Vec::with_capacity(pixels.len());
        assert!(QoiEncodeContext::encode_to_vec(
            WIDTH as u32,
            HEIGHT as u32,
            channels,
            0,
            &pixels,
            &mut encoded
        ));

        group.bench_with_input(BenchmarkId::new("slice", name), &encoded, |b, input| {
            let mut output = vec![0u8; WIDTH * HEIGHT * usize::from(channels)];
            b.iter(|| QoiDecodeContext::decode_to_slice(input, &mut output))
        });
        group.bench_with_input(BenchmarkId::new("vec", name), &encoded, |b, input| {
            let mut output = Vec::with_capacity(WIDTH * HEIGHT * usize::from(channels));
            b.iter(|| {
                output.clear();
                QoiDecodeContext::decode_to_vec(input, &mut output)
            })
        });
    }
}

criterion_group!(benches, decode, encode);
criterion_main!(benches);
