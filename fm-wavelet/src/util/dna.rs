/// 序列字母表：{A, C, G, T, N}
pub const ALPHABET: &[u8] = b"ACGTN";

#[inline]
pub fn is_nucleotide(b: u8) -> bool {
    matches!(b.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T' | b'N')
}

/// 转为大写并丢弃字母表以外的字符（空白、数字、`$` 等），
/// 保证后续追加的哨兵在文本中唯一。
pub fn clean_sequence(seq: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(seq.len());
    for &b in seq {
        if is_nucleotide(b) {
            out.push(b.to_ascii_uppercase());
        }
    }
    out
}

#[inline]
pub fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' | b'U' => b'A',
        _ => b'N',
    }
}

pub fn revcomp(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}
