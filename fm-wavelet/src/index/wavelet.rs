//! 小波树：按字母表区间递归二分，在任意字节字母表上提供 rank / select / access。
//!
//! 节点覆盖闭区间 `[low, high]`，`mid = (low + high) / 2`。
//! 内部节点的位向量记录每个位置去往哪一半：**1 = 左半 `[low, mid]`，0 = 右半 `[mid + 1, high]`**，
//! 构造、rank、select、access 统一使用该约定。
//! 某一半没有任何符号时不建子树，查询时按"出现 0 次"处理。

use serde::{Deserialize, Serialize};

use super::bitvec::{BitVector, BitVectorBuilder};
use super::error::{IndexError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
enum WaveletNode {
    /// `low == high`，该子序列全部是同一个符号
    Leaf { symbol: u8, len: usize },
    Internal {
        bits: BitVector,
        left: Option<Box<WaveletNode>>,
        right: Option<Box<WaveletNode>>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveletTree {
    root: WaveletNode,
    low: u8,
    high: u8,
    len: usize,
}

#[inline]
fn midpoint(low: u8, high: u8) -> u8 {
    ((low as u16 + high as u16) / 2) as u8
}

impl WaveletTree {
    /// 在 `[low, high]` 字母表区间上为 `sequence` 建树。
    pub fn new(sequence: &[u8], low: u8, high: u8, block_size: usize) -> Result<Self> {
        if sequence.is_empty() {
            return Err(IndexError::InvalidArgument("wavelet tree over an empty sequence".into()));
        }
        if low > high {
            return Err(IndexError::InvalidArgument(format!(
                "alphabet bounds reversed: low={} high={}",
                low, high
            )));
        }
        if block_size == 0 {
            return Err(IndexError::InvalidArgument("block size must be positive".into()));
        }
        if let Some(&c) = sequence.iter().find(|&&c| c < low || c > high) {
            return Err(IndexError::InvalidArgument(format!(
                "symbol {} outside alphabet [{}, {}]",
                c, low, high
            )));
        }
        let root = Self::build(sequence, low, high, block_size)?;
        Ok(Self { root, low, high, len: sequence.len() })
    }

    /// 以序列中实际出现的最小 / 最大符号作为字母表边界。
    pub fn from_sequence(sequence: &[u8], block_size: usize) -> Result<Self> {
        let low = sequence.iter().copied().min();
        let high = sequence.iter().copied().max();
        match (low, high) {
            (Some(low), Some(high)) => Self::new(sequence, low, high, block_size),
            _ => Err(IndexError::InvalidArgument("wavelet tree over an empty sequence".into())),
        }
    }

    fn build(seq: &[u8], low: u8, high: u8, block_size: usize) -> Result<WaveletNode> {
        if low == high {
            return Ok(WaveletNode::Leaf { symbol: low, len: seq.len() });
        }
        let mid = midpoint(low, high);
        let mut bits = BitVectorBuilder::new(seq.len(), block_size)?;
        let mut left_seq = Vec::new();
        let mut right_seq = Vec::new();
        for (i, &c) in seq.iter().enumerate() {
            if c <= mid {
                bits.set(i, true)?;
                left_seq.push(c);
            } else {
                right_seq.push(c);
            }
        }

        let left = if left_seq.is_empty() {
            None
        } else {
            Some(Box::new(Self::build(&left_seq, low, mid, block_size)?))
        };
        let right = if right_seq.is_empty() {
            None
        } else {
            Some(Box::new(Self::build(&right_seq, mid + 1, high, block_size)?))
        };

        Ok(WaveletNode::Internal { bits: bits.finish(), left, right })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn low(&self) -> u8 {
        self.low
    }

    pub fn high(&self) -> u8 {
        self.high
    }

    #[inline]
    pub fn contains_symbol(&self, symbol: u8) -> bool {
        symbol >= self.low && symbol <= self.high
    }

    /// `symbol` 在 `[0, index]`（含）内的出现次数。
    /// 符号不在字母表内返回 0；`index >= len` 时饱和为 `len - 1`。
    pub fn rank(&self, symbol: u8, index: usize) -> usize {
        if !self.contains_symbol(symbol) {
            return 0;
        }
        let mut i = index.min(self.len - 1);
        let (mut lo, mut hi) = (self.low, self.high);
        let mut node = &self.root;
        loop {
            match node {
                WaveletNode::Leaf { .. } => return i + 1,
                WaveletNode::Internal { bits, left, right } => {
                    let mid = midpoint(lo, hi);
                    let go_left = symbol <= mid;
                    // 父序列下标 -> 子序列下标：同侧位的个数
                    let count = bits.rank_bit(go_left, i);
                    let child = if go_left {
                        hi = mid;
                        left
                    } else {
                        lo = mid + 1;
                        right
                    };
                    match child.as_deref() {
                        Some(next) if count > 0 => {
                            i = count - 1;
                            node = next;
                        }
                        _ => return 0,
                    }
                }
            }
        }
    }

    /// `symbol` 在 `[0, index)` 内的出现次数，`index == 0` 时为 0。
    #[inline]
    pub fn rank_before(&self, symbol: u8, index: usize) -> usize {
        if index == 0 { 0 } else { self.rank(symbol, index - 1) }
    }

    pub fn count(&self, symbol: u8) -> usize {
        self.rank(symbol, self.len - 1)
    }

    /// 第 `occurrence` 个（从 1 计）`symbol` 的位置。
    pub fn select(&self, symbol: u8, occurrence: usize) -> Option<usize> {
        if occurrence == 0 || !self.contains_symbol(symbol) {
            return None;
        }
        Self::select_in(&self.root, self.low, self.high, symbol, occurrence)
    }

    fn select_in(node: &WaveletNode, lo: u8, hi: u8, symbol: u8, occurrence: usize) -> Option<usize> {
        match node {
            WaveletNode::Leaf { len, .. } => {
                if occurrence <= *len { Some(occurrence - 1) } else { None }
            }
            WaveletNode::Internal { bits, left, right } => {
                let mid = midpoint(lo, hi);
                if symbol <= mid {
                    let pos = Self::select_in(left.as_deref()?, lo, mid, symbol, occurrence)?;
                    bits.select(true, pos + 1)
                } else {
                    let pos = Self::select_in(right.as_deref()?, mid + 1, hi, symbol, occurrence)?;
                    bits.select(false, pos + 1)
                }
            }
        }
    }

    /// 取回 `index` 处的符号。
    pub fn access(&self, index: usize) -> Option<u8> {
        if index >= self.len {
            return None;
        }
        let mut i = index;
        let mut node = &self.root;
        loop {
            match node {
                WaveletNode::Leaf { symbol, .. } => return Some(*symbol),
                WaveletNode::Internal { bits, left, right } => {
                    let go_left = bits.get(i).ok()?;
                    i = bits.rank_bit(go_left, i) - 1;
                    node = if go_left { left.as_deref()? } else { right.as_deref()? };
                }
            }
        }
    }

    /// 还原整个被表示的序列。
    pub fn to_vec(&self) -> Vec<u8> {
        (0..self.len).filter_map(|i| self.access(i)).collect()
    }

    pub fn size_in_bytes(&self) -> usize {
        fn node_bytes(node: &WaveletNode) -> usize {
            match node {
                WaveletNode::Leaf { .. } => std::mem::size_of::<WaveletNode>(),
                WaveletNode::Internal { bits, left, right } => {
                    std::mem::size_of::<WaveletNode>()
                        + bits.size_in_bytes()
                        + left.as_deref().map_or(0, node_bytes)
                        + right.as_deref().map_or(0, node_bytes)
                }
            }
        }
        std::mem::size_of::<Self>() - std::mem::size_of::<WaveletNode>() + node_bytes(&self.root)
    }
}
