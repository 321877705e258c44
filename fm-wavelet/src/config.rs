use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::index::bwt::SENTINEL;
use crate::index::sa::SaAlgorithm;

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_BLOCK_SIZE: usize = 64;
pub const DEFAULT_PATTERNS: [&str; 4] = ["ACG", "TGCA", "GATTACA", "TTAGGC"];

/// 分块扫描参数：窗口大小、rank 缓存块大小、查询模式、线程数等。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub chunk_size: usize,
    pub block_size: usize,
    pub patterns: Vec<String>,
    pub threads: usize,
    pub sentinel: u8,
    pub sa_algorithm: SaAlgorithm,
    /// 字母表边界；None 时取每块 BWT 的最小 / 最大符号
    pub alphabet: Option<(u8, u8)>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            threads: 1,
            sentinel: SENTINEL,
            sa_algorithm: SaAlgorithm::default(),
            alphabet: None,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            bail!("chunk size must be positive");
        }
        if self.block_size == 0 {
            bail!("block size must be positive");
        }
        if self.threads == 0 {
            bail!("thread count must be positive");
        }
        if self.patterns.is_empty() {
            bail!("no patterns to search");
        }
        for p in &self.patterns {
            if p.is_empty() {
                bail!("empty pattern");
            }
            if p.as_bytes().contains(&self.sentinel) {
                bail!("pattern '{}' contains the sentinel '{}'", p, self.sentinel as char);
            }
        }
        if let Some((low, high)) = self.alphabet {
            if low > high {
                bail!("alphabet bounds reversed: {} > {}", low as char, high as char);
            }
            if self.sentinel < low || self.sentinel > high {
                bail!("alphabet [{}, {}] does not cover the sentinel", low as char, high as char);
            }
        }
        Ok(())
    }

    pub fn pattern_bytes(&self) -> Vec<Vec<u8>> {
        self.patterns.iter().map(|p| p.as_bytes().to_vec()).collect()
    }
}
