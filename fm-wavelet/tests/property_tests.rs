use proptest::prelude::*;

use fm_wavelet::index::bwt::{self, InverseStrategy, SENTINEL};
use fm_wavelet::index::{sa, BitVector, FMIndex, WaveletTree};

fn dna_text() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"ACGT".to_vec()), 1..120).prop_map(|mut v| {
        v.push(SENTINEL);
        v
    })
}

proptest! {
    #[test]
    fn bitvec_rank_steps_by_get(
        bits in prop::collection::vec(any::<bool>(), 1..400),
        block_size in 1usize..80,
    ) {
        let bv = BitVector::from_bits(&bits, block_size).unwrap();
        let mut prev = 0usize;
        for i in 0..bits.len() {
            let step = usize::from(bv.get(i).unwrap());
            prop_assert_eq!(bv.rank(i), prev + step);
            prev = bv.rank(i);
        }
    }

    #[test]
    fn bitvec_select_lands_on_bit(
        bits in prop::collection::vec(any::<bool>(), 1..400),
        block_size in 1usize..80,
    ) {
        let bv = BitVector::from_bits(&bits, block_size).unwrap();
        for bit in [true, false] {
            let total = bits.iter().filter(|&&b| b == bit).count();
            for k in 1..=total {
                let pos = bv.select(bit, k).unwrap();
                prop_assert_eq!(bv.get(pos).unwrap(), bit);
                prop_assert_eq!(bv.rank_bit(bit, pos), k);
            }
            prop_assert_eq!(bv.select(bit, total + 1), None);
        }
    }

    #[test]
    fn wavelet_select_inverts_rank(
        seq in prop::collection::vec(32u8..120, 1..200),
        block_size in 1usize..40,
    ) {
        let wt = WaveletTree::from_sequence(&seq, block_size).unwrap();
        for (i, &c) in seq.iter().enumerate() {
            prop_assert_eq!(wt.access(i), Some(c));
            let r = wt.rank(c, i);
            prop_assert_eq!(r, seq[..=i].iter().filter(|&&x| x == c).count());
            prop_assert_eq!(wt.select(c, r), Some(i));
        }
    }

    #[test]
    fn bwt_round_trip(text in dna_text()) {
        let sa_arr = sa::build_sa(&text);
        let transformed = bwt::transform(&text, &sa_arr);
        let mut sorted_in = text.clone();
        let mut sorted_out = transformed.clone();
        sorted_in.sort_unstable();
        sorted_out.sort_unstable();
        prop_assert_eq!(sorted_in, sorted_out);
        prop_assert_eq!(bwt::untransform_with(&transformed, SENTINEL, InverseStrategy::LfMapping).unwrap(), text.clone());
        if text.len() <= 40 {
            prop_assert_eq!(bwt::untransform(&transformed, SENTINEL).unwrap(), text);
        }
    }

    #[test]
    fn search_equals_brute_force(
        text in dna_text(),
        pattern in prop::collection::vec(prop::sample::select(b"ACGT".to_vec()), 1..6),
        block_size in 1usize..64,
    ) {
        let fm = FMIndex::build(&text, sa::build_sa(&text), block_size).unwrap();
        let expected: Vec<usize> = if pattern.len() > text.len() {
            Vec::new()
        } else {
            (0..=text.len() - pattern.len()).filter(|&i| text[i..i + pattern.len()] == pattern[..]).collect()
        };
        prop_assert_eq!(fm.search(&pattern), expected.clone());
        prop_assert_eq!(fm.count(&pattern), expected.len());
    }
}
