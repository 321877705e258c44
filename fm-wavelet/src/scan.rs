//! 分块扫描：把长序列切成定长窗口，每个窗口独立建 FM 索引并查询全部模式。
//!
//! 各窗口互不共享可变状态，在 rayon 线程池上并行处理，
//! 结果按窗口顺序交给 [`ReportSink`]，输出与线程数无关。

use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, warn};
use rayon::prelude::*;

use crate::config::ScanConfig;
use crate::index::error::IndexError;
use crate::index::fm::FMIndex;
use crate::index::sa;
use crate::io::fasta;
use crate::report::{ChunkInfo, QueryReport, ReportSink, ScanSummary};

const PREVIEW_LEN: usize = 50;

/// 一个待索引的窗口
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub offset: usize,
    /// 窗口内容，末尾带唯一哨兵
    pub text: Vec<u8>,
}

/// 按 `chunk_size` 切分序列，每块末尾补哨兵（已以哨兵结尾则不补）。
pub fn chunk_windows(seq: &[u8], chunk_size: usize, sentinel: u8) -> Vec<Window> {
    seq.chunks(chunk_size.max(1))
        .enumerate()
        .map(|(i, chunk)| {
            let mut text = Vec::with_capacity(chunk.len() + 1);
            text.extend_from_slice(chunk);
            if text.last() != Some(&sentinel) {
                text.push(sentinel);
            }
            Window { offset: i * chunk_size, text }
        })
        .collect()
}

/// SA -> BWT -> 小波树
pub fn index_window(text: &[u8], cfg: &ScanConfig) -> Result<FMIndex, IndexError> {
    let sa = sa::build(text, cfg.sa_algorithm);
    match cfg.alphabet {
        Some((low, high)) => FMIndex::build_with_alphabet(text, sa, low, high, cfg.block_size),
        None => FMIndex::build(text, sa, cfg.block_size),
    }
}

struct ChunkOutcome {
    info: ChunkInfo,
    result: Result<Vec<QueryReport>, IndexError>,
}

fn process_window(index: usize, window: &Window, cfg: &ScanConfig, patterns: &[Vec<u8>]) -> ChunkOutcome {
    let body = &window.text[..window.text.len() - 1];
    let mut info = ChunkInfo {
        index,
        offset: window.offset,
        len: body.len(),
        preview: String::from_utf8_lossy(&body[..body.len().min(PREVIEW_LEN)]).into_owned(),
        block_size: cfg.block_size,
        index_bytes: 0,
    };

    let fm = match index_window(&window.text, cfg) {
        Ok(fm) => fm,
        Err(e) => return ChunkOutcome { info, result: Err(e) },
    };
    info.index_bytes = fm.size_in_bytes();

    let reports = patterns
        .iter()
        .map(|pat| {
            let t0 = Instant::now();
            let positions = fm.search(pat);
            let elapsed = t0.elapsed();
            QueryReport {
                chunk: index,
                offset: window.offset,
                pattern: String::from_utf8_lossy(pat).into_owned(),
                positions,
                elapsed,
                block_size: cfg.block_size,
                index_bytes: info.index_bytes,
            }
        })
        .collect();

    ChunkOutcome { info, result: Ok(reports) }
}

/// 扫描一条已清洗的序列。单个窗口建索引失败只记录并跳过，不中断整体扫描。
pub fn scan_sequence(source: &str, seq: &[u8], cfg: &ScanConfig, sink: &mut dyn ReportSink) -> Result<ScanSummary> {
    cfg.validate()?;
    let started = Instant::now();
    let patterns = cfg.pattern_bytes();
    let windows = chunk_windows(seq, cfg.chunk_size, cfg.sentinel);
    if windows.is_empty() {
        warn!("{}: empty sequence, nothing to index", source);
    }
    debug!("{}: {} windows of up to {} bp, {} threads", source, windows.len(), cfg.chunk_size, cfg.threads);

    let pool = rayon::ThreadPoolBuilder::new().num_threads(cfg.threads).build()?;
    let outcomes: Vec<ChunkOutcome> = pool.install(|| {
        windows
            .par_iter()
            .enumerate()
            .map(|(i, w)| process_window(i, w, cfg, &patterns))
            .collect()
    });

    let mut summary = ScanSummary { source: source.to_string(), chunks: outcomes.len(), ..ScanSummary::default() };
    for outcome in &outcomes {
        sink.chunk_start(&outcome.info)?;
        match &outcome.result {
            Ok(reports) => {
                summary.total_index_bytes += outcome.info.index_bytes;
                for r in reports {
                    summary.queries += 1;
                    summary.hits += r.positions.len();
                    sink.query(r)?;
                }
            }
            Err(e) => {
                summary.failed_chunks += 1;
                sink.chunk_failed(&outcome.info, &e.to_string())?;
            }
        }
    }
    summary.elapsed = started.elapsed();
    sink.summary(&summary)?;
    Ok(summary)
}

/// 读取序列文件后扫描；空文件只告警。
pub fn scan_file(path: &str, cfg: &ScanConfig, sink: &mut dyn ReportSink) -> Result<ScanSummary> {
    let seq = fasta::load_sequence(path)?;
    if seq.is_empty() {
        warn!("{} produced an empty sequence", path);
        let summary = ScanSummary { source: path.to_string(), elapsed: Duration::ZERO, ..ScanSummary::default() };
        sink.summary(&summary)?;
        return Ok(summary);
    }
    scan_sequence(path, &seq, cfg, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectSink;

    #[test]
    fn windows_get_sentinels() {
        let w = chunk_windows(b"ACGTACG", 3, b'$');
        assert_eq!(w.len(), 3);
        assert_eq!(w[0], Window { offset: 0, text: b"ACG$".to_vec() });
        assert_eq!(w[2], Window { offset: 6, text: b"G$".to_vec() });
        assert!(chunk_windows(b"", 3, b'$').is_empty());
        assert_eq!(chunk_windows(b"AC$", 10, b'$')[0].text, b"AC$");
    }

    #[test]
    fn scan_reports_every_pattern_per_chunk() {
        let cfg = ScanConfig {
            chunk_size: 6,
            block_size: 2,
            patterns: vec!["ANA".into(), "NAB".into()],
            ..ScanConfig::default()
        };
        let mut sink = CollectSink::default();
        let summary = scan_sequence("mem", b"BANANABANANA", &cfg, &mut sink).unwrap();
        assert_eq!(summary.chunks, 2);
        assert_eq!(summary.queries, 4);
        assert_eq!(sink.reports[0].positions, vec![1, 3]);
        assert!(sink.reports[1].positions.is_empty());
        assert_eq!(sink.chunks[1].offset, 6);
        assert_eq!(sink.reports[2].positions, vec![1, 3]);
        assert_eq!(sink.reports[2].absolute_positions(), vec![7, 9]);
        assert!(sink.summary.is_some());
    }

    #[test]
    fn bad_alphabet_fails_chunk_not_scan() {
        // 字母表上界 'C' 覆盖不了 'G'/'T'：第一块失败，第二块 "CA" 正常
        let cfg = ScanConfig {
            chunk_size: 4,
            patterns: vec!["A".into()],
            alphabet: Some((b'$', b'C')),
            ..ScanConfig::default()
        };
        let mut sink = CollectSink::default();
        let summary = scan_sequence("mem", b"GATTCA", &cfg, &mut sink).unwrap();
        assert_eq!(summary.failed_chunks, 1);
        assert_eq!(sink.failures.len(), 1);
        assert_eq!(sink.failures[0].0, 0);
        assert_eq!(sink.reports.len(), 1);
        assert_eq!(sink.reports[0].positions, vec![1]);
    }
}
