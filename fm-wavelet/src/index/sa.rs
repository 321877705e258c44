use serde::{Deserialize, Serialize};

/// 后缀数组构建算法。索引核心只消费后缀数组，不关心它从哪里来。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaAlgorithm {
    /// 直接按后缀字典序比较排序，O(n² log n)，小块文本足够
    Naive,
    /// 倍增法，O(n log² n)
    #[default]
    Doubling,
}

pub fn build(text: &[u8], algo: SaAlgorithm) -> Vec<usize> {
    match algo {
        SaAlgorithm::Naive => build_sa_naive(text),
        SaAlgorithm::Doubling => build_sa(text),
    }
}

/// 朴素后缀数组：对所有后缀做全比较排序。
/// 文本以唯一且最小的哨兵结尾时，后缀序与循环轮转序一致。
pub fn build_sa_naive(text: &[u8]) -> Vec<usize> {
    let mut sa: Vec<usize> = (0..text.len()).collect();
    sa.sort_unstable_by(|&a, &b| text[a..].cmp(&text[b..]));
    sa
}

/// 基于倍增法构建后缀数组。
/// 比较 (rank[i], rank[i + k])，越界的后半段记为 -1，因此较短的后缀排在前面。
pub fn build_sa(text: &[u8]) -> Vec<usize> {
    let n = text.len();
    if n == 0 {
        return Vec::new();
    }
    let mut sa: Vec<usize> = (0..n).collect();
    let mut rank: Vec<i64> = text.iter().map(|&b| b as i64).collect();
    let mut tmp: Vec<i64> = vec![0; n];

    let key = |rank: &[i64], i: usize, k: usize| -> (i64, i64) {
        (rank[i], if i + k < n { rank[i + k] } else { -1 })
    };

    let mut k = 1usize;
    loop {
        sa.sort_unstable_by(|&i, &j| key(&rank, i, k).cmp(&key(&rank, j, k)));

        tmp[sa[0]] = 0;
        for w in 1..n {
            let (a, b) = (sa[w - 1], sa[w]);
            tmp[b] = tmp[a] + i64::from(key(&rank, a, k) != key(&rank, b, k));
        }
        rank.copy_from_slice(&tmp);

        // 所有名次互不相同即完成
        if rank[sa[n - 1]] as usize == n - 1 || k >= n {
            break;
        }
        k <<= 1;
    }
    sa
}
