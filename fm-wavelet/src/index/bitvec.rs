use serde::{Deserialize, Serialize};

use super::error::{IndexError, Result};

const WORD_BITS: usize = 64;

/// 可写阶段的位向量：长度在构造时固定，只能 `set` / `get`。
/// 调用 [`finish`](BitVectorBuilder::finish) 后得到带 rank 缓存的只读 [`BitVector`]，
/// 因此"缓存未建好就查询"在类型层面无法发生。
#[derive(Debug, Clone)]
pub struct BitVectorBuilder {
    words: Vec<u64>,
    len: usize,
    block_size: usize,
}

impl BitVectorBuilder {
    pub fn new(len: usize, block_size: usize) -> Result<Self> {
        if len == 0 {
            return Err(IndexError::InvalidArgument("bit vector size must be positive".into()));
        }
        if block_size == 0 {
            return Err(IndexError::InvalidArgument("block size must be positive".into()));
        }
        if len > u32::MAX as usize {
            return Err(IndexError::InvalidArgument(format!(
                "bit vector size {} exceeds u32 rank cache range",
                len
            )));
        }
        Ok(Self { words: vec![0u64; (len + WORD_BITS - 1) / WORD_BITS], len, block_size })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        if index >= self.len {
            return Err(IndexError::IndexOutOfRange { index, len: self.len });
        }
        let mask = 1u64 << (index % WORD_BITS);
        if value {
            self.words[index / WORD_BITS] |= mask;
        } else {
            self.words[index / WORD_BITS] &= !mask;
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<bool> {
        if index >= self.len {
            return Err(IndexError::IndexOutOfRange { index, len: self.len });
        }
        Ok(bit_at(&self.words, index))
    }

    /// 一次线性扫描建立分块 rank 缓存。
    pub fn finish(self) -> BitVector {
        let bs = self.block_size;
        let num_blocks = (self.len + bs - 1) / bs;
        let mut rank_cache = Vec::with_capacity(num_blocks + 1);
        let mut running = 0u32;
        rank_cache.push(running);
        for bi in 0..num_blocks {
            let start = bi * bs;
            let end = ((bi + 1) * bs).min(self.len);
            running += count_ones_range(&self.words, start, end) as u32;
            rank_cache.push(running);
        }
        BitVector { words: self.words, len: self.len, block_size: bs, rank_cache }
    }
}

/// 只读位向量，支持 rank / select。
///
/// - `rank_cache[k]` = `[0, k * block_size)` 内 1 的个数，长度为 `ceil(len / block_size) + 1`
/// - rank 查询 = 块起点缓存 + 块内至多 `block_size` 位的计数
/// - `block_size` 只影响速度与空间，不影响结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
    block_size: usize,
    rank_cache: Vec<u32>,
}

impl BitVector {
    pub fn from_bits(bits: &[bool], block_size: usize) -> Result<Self> {
        let mut builder = BitVectorBuilder::new(bits.len(), block_size)?;
        for (i, &b) in bits.iter().enumerate() {
            if b {
                builder.set(i, true)?;
            }
        }
        Ok(builder.finish())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn get(&self, index: usize) -> Result<bool> {
        if index >= self.len {
            return Err(IndexError::IndexOutOfRange { index, len: self.len });
        }
        Ok(bit_at(&self.words, index))
    }

    pub fn count_ones(&self) -> usize {
        self.rank_cache.last().copied().unwrap_or(0) as usize
    }

    pub fn count_zeros(&self) -> usize {
        self.len - self.count_ones()
    }

    /// `[0, index]`（含）内 1 的个数；`index >= len` 时饱和为 `rank(len - 1)`。
    #[inline]
    pub fn rank(&self, index: usize) -> usize {
        let index = index.min(self.len - 1);
        let bi = index / self.block_size;
        self.rank_cache[bi] as usize + count_ones_range(&self.words, bi * self.block_size, index + 1)
    }

    /// `[0, index)` 内 1 的个数，即 `rank(index - 1)`，`index == 0` 时为 0。
    #[inline]
    pub fn rank_before(&self, index: usize) -> usize {
        if index == 0 { 0 } else { self.rank(index - 1) }
    }

    /// `[0, index]`（含）内等于 `bit` 的位数。
    #[inline]
    pub fn rank_bit(&self, bit: bool, index: usize) -> usize {
        let ones = self.rank(index);
        if bit { ones } else { index.min(self.len - 1) + 1 - ones }
    }

    /// 第 `occurrence` 个（从 1 计）等于 `bit` 的位置。
    ///
    /// 先用 rank 缓存二分定位所在块，再在块内顺扫；结果与全量线性扫描一致。
    pub fn select(&self, bit: bool, occurrence: usize) -> Option<usize> {
        if occurrence == 0 {
            return None;
        }
        let total = if bit { self.count_ones() } else { self.count_zeros() };
        if occurrence > total {
            return None;
        }

        let bs = self.block_size;
        let before = |b: usize| -> usize {
            let ones = self.rank_cache[b] as usize;
            if bit { ones } else { (b * bs).min(self.len) - ones }
        };

        // before(lo) < occurrence <= before(hi)
        let mut lo = 0usize;
        let mut hi = self.rank_cache.len() - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if before(mid) < occurrence {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        let mut remaining = occurrence - before(lo);
        let end = ((lo + 1) * bs).min(self.len);
        for i in lo * bs..end {
            if bit_at(&self.words, i) == bit {
                remaining -= 1;
                if remaining == 0 {
                    return Some(i);
                }
            }
        }
        None
    }

    /// 重新打开为可写状态；修改后需再次 `finish`。
    pub fn into_builder(self) -> BitVectorBuilder {
        BitVectorBuilder { words: self.words, len: self.len, block_size: self.block_size }
    }

    pub fn size_in_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.words.len() * 8 + self.rank_cache.len() * 4
    }
}

#[inline]
fn bit_at(words: &[u64], index: usize) -> bool {
    (words[index / WORD_BITS] >> (index % WORD_BITS)) & 1 == 1
}

/// `[start, end)` 内 1 的个数
fn count_ones_range(words: &[u64], start: usize, end: usize) -> usize {
    if start >= end {
        return 0;
    }
    let (sw, sb) = (start / WORD_BITS, start % WORD_BITS);
    let (ew, eb) = (end / WORD_BITS, end % WORD_BITS);
    if sw == ew {
        let mask = (!0u64 << sb) & ((1u64 << eb) - 1);
        return (words[sw] & mask).count_ones() as usize;
    }
    let mut total = (words[sw] >> sb).count_ones() as usize;
    for w in &words[sw + 1..ew] {
        total += w.count_ones() as usize;
    }
    if eb > 0 {
        total += (words[ew] & ((1u64 << eb) - 1)).count_ones() as usize;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BitVector {
        let mut b = BitVectorBuilder::new(8, 4).unwrap();
        for i in [1, 3, 4, 6] {
            b.set(i, true).unwrap();
        }
        b.finish()
    }

    fn make_bits(len: usize, seed: u32) -> Vec<bool> {
        let mut x = seed;
        (0..len)
            .map(|_| {
                x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                (x >> 16) % 3 == 0
            })
            .collect()
    }

    #[test]
    fn rank_select_basic() {
        let bv = sample();
        assert_eq!(bv.rank(5), 3);
        assert_eq!(bv.select(true, 3), Some(4));
        assert_eq!(bv.select(true, 5), None);
        assert_eq!(bv.count_ones(), 4);
    }

    #[test]
    fn rejects_zero_size_and_block() {
        assert!(matches!(BitVectorBuilder::new(0, 4), Err(IndexError::InvalidArgument(_))));
        assert!(matches!(BitVectorBuilder::new(8, 0), Err(IndexError::InvalidArgument(_))));
    }

    #[test]
    fn out_of_range_access() {
        let mut b = BitVectorBuilder::new(8, 4).unwrap();
        assert_eq!(b.set(8, true), Err(IndexError::IndexOutOfRange { index: 8, len: 8 }));
        assert!(b.get(100).is_err());
        let bv = b.finish();
        assert!(bv.get(8).is_err());
        assert_eq!(bv.get(7), Ok(false));
    }

    #[test]
    fn rank_saturates_past_end() {
        let bv = sample();
        assert_eq!(bv.rank(7), 4);
        assert_eq!(bv.rank(1_000), 4);
        assert_eq!(bv.rank_before(0), 0);
        assert_eq!(bv.rank_before(2), 1);
    }

    #[test]
    fn select_zero_bits() {
        let bv = sample();
        // 0 位：0, 2, 5, 7
        assert_eq!(bv.select(false, 1), Some(0));
        assert_eq!(bv.select(false, 3), Some(5));
        assert_eq!(bv.select(false, 4), Some(7));
        assert_eq!(bv.select(false, 5), None);
        assert_eq!(bv.select(false, 0), None);
        assert_eq!(bv.rank_bit(false, 5), 3);
    }

    #[test]
    fn rank_matches_naive_for_all_block_sizes() {
        let bits = make_bits(300, 7);
        for bs in [1usize, 2, 3, 7, 63, 64, 65, 128, 299, 300, 1000] {
            let bv = BitVector::from_bits(&bits, bs).unwrap();
            let mut ones = 0;
            for (i, &b) in bits.iter().enumerate() {
                if b {
                    ones += 1;
                }
                assert_eq!(bv.rank(i), ones, "bs={} i={}", bs, i);
            }
        }
    }

    #[test]
    fn select_matches_linear_scan() {
        let bits = make_bits(257, 99);
        let bv = BitVector::from_bits(&bits, 5).unwrap();
        for bit in [true, false] {
            let positions: Vec<usize> =
                bits.iter().enumerate().filter(|(_, &b)| b == bit).map(|(i, _)| i).collect();
            for (k, &p) in positions.iter().enumerate() {
                assert_eq!(bv.select(bit, k + 1), Some(p));
            }
            assert_eq!(bv.select(bit, positions.len() + 1), None);
        }
    }

    #[test]
    fn reopen_and_rebuild() {
        let mut b = sample().into_builder();
        b.set(1, false).unwrap();
        b.set(7, true).unwrap();
        let bv = b.finish();
        assert_eq!(bv.rank(7), 4);
        assert_eq!(bv.rank(2), 0);
        assert_eq!(bv.select(true, 4), Some(7));
    }
}
