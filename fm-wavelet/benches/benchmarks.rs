use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use fm_wavelet::index::bwt::{self, InverseStrategy, SENTINEL};
use fm_wavelet::index::{sa, BitVector, FMIndex, WaveletTree};

fn make_reference(len: usize) -> Vec<u8> {
    let bases = [b'A', b'C', b'G', b'T'];
    let mut seq = Vec::with_capacity(len + 1);
    let mut x: u32 = 42;
    for _ in 0..len {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        seq.push(bases[(x >> 16) as usize % 4]);
    }
    seq.push(SENTINEL);
    seq
}

fn bench_bitvec_rank(c: &mut Criterion) {
    let bits: Vec<bool> = (0..100_000).map(|i| (i * 7919) % 3 == 0).collect();
    let mut group = c.benchmark_group("bitvec_rank");
    for bs in [16usize, 64, 512, 4096] {
        let bv = BitVector::from_bits(&bits, bs).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(bs), &bv, |b, bv| {
            b.iter(|| black_box(bv.rank(black_box(77_777))));
        });
    }
    group.finish();
}

fn bench_wavelet_rank(c: &mut Criterion) {
    let text = make_reference(50_000);
    let wt = WaveletTree::from_sequence(&text, 64).unwrap();
    c.bench_function("wavelet_rank_50k", |b| {
        b.iter(|| black_box(wt.rank(black_box(b'G'), black_box(31_337))));
    });
}

fn bench_backward_search(c: &mut Criterion) {
    let text = make_reference(10_000);
    let sa_arr = sa::build_sa(&text);
    let mut group = c.benchmark_group("backward_search_20bp");
    for bs in [8usize, 64, 512] {
        let fm = FMIndex::build(&text, sa_arr.clone(), bs).unwrap();
        let pattern = text[100..120].to_vec();
        group.bench_with_input(BenchmarkId::from_parameter(bs), &fm, |b, fm| {
            b.iter(|| black_box(fm.search(black_box(&pattern))));
        });
    }
    group.finish();
}

fn bench_build_sa(c: &mut Criterion) {
    let text = make_reference(10_000);
    c.bench_function("build_sa_doubling_10k", |b| b.iter(|| black_box(sa::build_sa(black_box(&text)))));
    let small = make_reference(500);
    c.bench_function("build_sa_naive_500", |b| b.iter(|| black_box(sa::build_sa_naive(black_box(&small)))));
}

fn bench_untransform(c: &mut Criterion) {
    let text = make_reference(300);
    let bwt_str = bwt::transform(&text, &sa::build_sa(&text));
    c.bench_function("untransform_naive_300", |b| {
        b.iter(|| black_box(bwt::untransform_with(black_box(&bwt_str), SENTINEL, InverseStrategy::Naive)))
    });
    c.bench_function("untransform_lf_300", |b| {
        b.iter(|| black_box(bwt::untransform_with(black_box(&bwt_str), SENTINEL, InverseStrategy::LfMapping)))
    });
}

criterion_group!(
    benches,
    bench_bitvec_rank,
    bench_wavelet_rank,
    bench_backward_search,
    bench_build_sa,
    bench_untransform
);
criterion_main!(benches);
