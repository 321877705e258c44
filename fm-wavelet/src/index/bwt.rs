use serde::{Deserialize, Serialize};

use super::error::{IndexError, Result};

/// 默认哨兵：ASCII 中 `$` 小于所有字母
pub const SENTINEL: u8 = b'$';

/// 根据后缀数组构建 BWT：`bwt[i] = text[(sa[i] + n - 1) % n]`。
/// 长度不超过 2 的序列原样返回（以哨兵结尾时两者本就相同）。
pub fn transform(text: &[u8], sa: &[usize]) -> Vec<u8> {
    let n = text.len();
    if n <= 2 {
        return text.to_vec();
    }
    debug_assert_eq!(sa.len(), n, "suffix array length must match text length");
    let mut bwt = Vec::with_capacity(n);
    for &p in sa {
        let prev = if p == 0 { text[n - 1] } else { text[p - 1] };
        bwt.push(prev);
    }
    bwt
}

/// BWT 逆变换策略，二者对合法输入的结果完全一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InverseStrategy {
    /// 逐列重建：反复排序并前插 BWT 列，O(n² log n)，仅用于小输入和对照
    #[default]
    Naive,
    /// LF 映射：C 表 + 出现次数回溯，O(n)
    LfMapping,
}

/// 用默认（逐列重建）策略还原原始序列。
pub fn untransform(bwt: &[u8], sentinel: u8) -> Result<Vec<u8>> {
    untransform_with(bwt, sentinel, InverseStrategy::Naive)
}

pub fn untransform_with(bwt: &[u8], sentinel: u8, strategy: InverseStrategy) -> Result<Vec<u8>> {
    match strategy {
        InverseStrategy::Naive => untransform_naive(bwt, sentinel),
        InverseStrategy::LfMapping => untransform_lf(bwt, sentinel),
    }
}

fn untransform_naive(bwt: &[u8], sentinel: u8) -> Result<Vec<u8>> {
    let n = bwt.len();
    let mut rows: Vec<Vec<u8>> = bwt.iter().map(|&c| vec![c]).collect();
    for _ in 1..n {
        rows.sort_unstable();
        for (row, &c) in rows.iter_mut().zip(bwt) {
            row.insert(0, c);
        }
    }
    rows.into_iter()
        .find(|row| row.last() == Some(&sentinel))
        .ok_or_else(|| IndexError::InconsistentData("no rotation ends with the sentinel".into()))
}

fn untransform_lf(bwt: &[u8], sentinel: u8) -> Result<Vec<u8>> {
    let n = bwt.len();
    let sentinels = bwt.iter().filter(|&&c| c == sentinel).count();
    if sentinels != 1 {
        return Err(IndexError::InconsistentData(format!(
            "expected exactly one sentinel, found {}",
            sentinels
        )));
    }

    // C[c] = BWT 中小于 c 的符号数
    let mut freq = [0usize; 256];
    for &c in bwt {
        freq[c as usize] += 1;
    }
    let mut c_table = [0usize; 256];
    let mut acc = 0usize;
    for (slot, &f) in c_table.iter_mut().zip(freq.iter()) {
        *slot = acc;
        acc += f;
    }

    // occ[i] = bwt[0..i) 中 bwt[i] 的出现次数
    let mut seen = [0usize; 256];
    let mut occ = Vec::with_capacity(n);
    for &c in bwt {
        occ.push(seen[c as usize]);
        seen[c as usize] += 1;
    }

    // 以哨兵开头的行就是 "$ + text[..n-1]"，从它沿 LF 逆向回溯
    let mut out = vec![0u8; n];
    out[n - 1] = sentinel;
    let mut row = c_table[sentinel as usize];
    for k in (0..n - 1).rev() {
        let c = bwt[row];
        out[k] = c;
        row = c_table[c as usize] + occ[row];
    }
    if out[..n - 1].contains(&sentinel) {
        return Err(IndexError::InconsistentData("sentinel reached before the text start".into()));
    }
    Ok(out)
}
