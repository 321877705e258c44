use std::io::{BufReader, BufWriter, Write};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::bwt::{self, InverseStrategy};
use super::error::IndexError;
use super::wavelet::WaveletTree;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub reference_file: Option<String>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
}

/// 基于小波树的 FM 索引：
/// - BWT 不单独保存，由小波树表示（`bwt()` 可取回）
/// - Occ(c, i) 即小波树上的 rank，块大小决定 rank 缓存粒度
/// - 保存完整 SA，区间可直接映射回文本位置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FMIndex {
    /// 完整后缀数组
    sa: Vec<usize>,
    /// BWT 上的小波树
    wavelet: WaveletTree,
    /// c[s - low] = BWT 中严格小于 s 的符号数
    c: Vec<usize>,
    /// 文本末尾的哨兵
    sentinel: u8,
    block_size: usize,
    meta: Option<IndexMeta>,
}

impl FMIndex {
    /// 由以哨兵结尾的文本及其后缀数组建索引，字母表边界取 BWT 中的最小 / 最大符号。
    pub fn build(text: &[u8], sa: Vec<usize>, block_size: usize) -> Result<Self, IndexError> {
        Self::check_input(text, &sa)?;
        let bwt = bwt::transform(text, &sa);
        let wavelet = WaveletTree::from_sequence(&bwt, block_size)?;
        Ok(Self::assemble(&bwt, sa, wavelet, text[text.len() - 1], block_size))
    }

    /// 显式指定字母表边界 `[low, high]`。
    pub fn build_with_alphabet(
        text: &[u8],
        sa: Vec<usize>,
        low: u8,
        high: u8,
        block_size: usize,
    ) -> Result<Self, IndexError> {
        Self::check_input(text, &sa)?;
        let bwt = bwt::transform(text, &sa);
        let wavelet = WaveletTree::new(&bwt, low, high, block_size)?;
        Ok(Self::assemble(&bwt, sa, wavelet, text[text.len() - 1], block_size))
    }

    fn check_input(text: &[u8], sa: &[usize]) -> Result<(), IndexError> {
        if text.is_empty() {
            return Err(IndexError::InvalidArgument("cannot index an empty text".into()));
        }
        if sa.len() != text.len() {
            return Err(IndexError::InvalidArgument(format!(
                "suffix array length {} does not match text length {}",
                sa.len(),
                text.len()
            )));
        }
        Ok(())
    }

    fn assemble(bwt: &[u8], sa: Vec<usize>, wavelet: WaveletTree, sentinel: u8, block_size: usize) -> Self {
        let low = wavelet.low() as usize;
        let sigma = wavelet.high() as usize - low + 1;
        // 计算 C 表
        let mut freq = vec![0usize; sigma];
        for &ch in bwt {
            freq[ch as usize - low] += 1;
        }
        let mut c = vec![0usize; sigma];
        let mut acc = 0usize;
        for (slot, &f) in c.iter_mut().zip(freq.iter()) {
            *slot = acc;
            acc += f;
        }
        Self { sa, wavelet, c, sentinel, block_size, meta: None }
    }

    pub fn len(&self) -> usize {
        self.sa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sa.is_empty()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn sentinel(&self) -> u8 {
        self.sentinel
    }

    pub fn alphabet(&self) -> (u8, u8) {
        (self.wavelet.low(), self.wavelet.high())
    }

    pub fn suffix_array(&self) -> &[usize] {
        &self.sa
    }

    pub fn wavelet(&self) -> &WaveletTree {
        &self.wavelet
    }

    pub fn meta(&self) -> Option<&IndexMeta> {
        self.meta.as_ref()
    }

    pub fn set_meta(&mut self, meta: IndexMeta) {
        self.meta = Some(meta);
    }

    #[inline]
    fn c_of(&self, ch: u8) -> Option<usize> {
        if self.wavelet.contains_symbol(ch) {
            Some(self.c[(ch - self.wavelet.low()) as usize])
        } else {
            None
        }
    }

    /// BWT 上 `symbol` 在 `[0, index]` 内的出现次数
    pub fn rank(&self, symbol: u8, index: usize) -> usize {
        self.wavelet.rank(symbol, index)
    }

    /// BWT 上第 `occurrence` 个 `symbol` 的位置
    pub fn select(&self, symbol: u8, occurrence: usize) -> Option<usize> {
        self.wavelet.select(symbol, occurrence)
    }

    /// 反向搜索，返回 SA 上的闭区间 `[start, end]`；无匹配或空模式返回 None。
    pub fn backward_search(&self, pattern: &[u8]) -> Option<(usize, usize)> {
        if pattern.is_empty() || self.is_empty() {
            return None;
        }
        let mut start = 0usize;
        let mut end = self.len() - 1;
        for &ch in pattern.iter().rev() {
            let base = self.c_of(ch)?;
            let rank_start = self.wavelet.rank_before(ch, start);
            let rank_end = self.wavelet.rank(ch, end);
            if rank_start >= rank_end {
                return None;
            }
            start = base + rank_start;
            end = base + rank_end - 1;
        }
        Some((start, end))
    }

    /// 模式在原文本中的全部起始位置，升序。
    pub fn search(&self, pattern: &[u8]) -> Vec<usize> {
        match self.backward_search(pattern) {
            Some((start, end)) => {
                let mut positions = self.sa[start..=end].to_vec();
                positions.sort_unstable();
                positions
            }
            None => Vec::new(),
        }
    }

    pub fn count(&self, pattern: &[u8]) -> usize {
        self.backward_search(pattern).map_or(0, |(start, end)| end - start + 1)
    }

    /// 从小波树取回 BWT 串
    pub fn bwt(&self) -> Vec<u8> {
        self.wavelet.to_vec()
    }

    /// 由 BWT 逆变换还原原始文本（含哨兵）
    pub fn recover_text(&self, strategy: InverseStrategy) -> Result<Vec<u8>, IndexError> {
        bwt::untransform_with(&self.bwt(), self.sentinel, strategy)
    }

    pub fn size_in_bytes(&self) -> usize {
        std::mem::size_of::<Self>() - std::mem::size_of::<WaveletTree>()
            + self.sa.len() * std::mem::size_of::<usize>()
            + self.c.len() * std::mem::size_of::<usize>()
            + self.wavelet.size_in_bytes()
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let mut w = BufWriter::new(std::fs::File::create(path)?);
        bincode::serialize_into(&mut w, self)?;
        w.flush()?;
        Ok(())
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let f = std::fs::File::open(path)?;
        let idx: Self = bincode::deserialize_from(BufReader::new(f))?;
        Ok(idx)
    }
}
