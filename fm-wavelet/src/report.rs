//! 查询结果输出：日志、文本报告、CSV 性能表。
//!
//! 扫描器把每个 `(pattern, positions, timing)` 交给 [`ReportSink`]，
//! 输出格式与索引核心无关。

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use log::{error, info, warn};

pub const CSV_HEADER: &str = "BlockingFactor,MemoryUsage,QueryTime,Pattern";

/// 一个分块的索引概况
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkInfo {
    pub index: usize,
    /// 分块在整条序列中的起始偏移
    pub offset: usize,
    /// 分块长度（不含哨兵）
    pub len: usize,
    /// 分块开头至多 50 个字符
    pub preview: String,
    pub block_size: usize,
    pub index_bytes: usize,
}

/// 一次模式查询的结果；positions 为分块内的相对位置，升序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReport {
    pub chunk: usize,
    pub offset: usize,
    pub pattern: String,
    pub positions: Vec<usize>,
    pub elapsed: Duration,
    pub block_size: usize,
    pub index_bytes: usize,
}

impl QueryReport {
    /// 整条序列上的绝对位置
    pub fn absolute_positions(&self) -> Vec<usize> {
        self.positions.iter().map(|p| p + self.offset).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub source: String,
    pub chunks: usize,
    pub failed_chunks: usize,
    pub queries: usize,
    pub hits: usize,
    pub total_index_bytes: usize,
    pub elapsed: Duration,
}

pub trait ReportSink {
    fn chunk_start(&mut self, _chunk: &ChunkInfo) -> Result<()> {
        Ok(())
    }

    fn query(&mut self, report: &QueryReport) -> Result<()>;

    fn chunk_failed(&mut self, _chunk: &ChunkInfo, _reason: &str) -> Result<()> {
        Ok(())
    }

    fn summary(&mut self, _summary: &ScanSummary) -> Result<()> {
        Ok(())
    }
}

/// 写入 log（Info 级别）
#[derive(Debug, Default)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn chunk_start(&mut self, chunk: &ChunkInfo) -> Result<()> {
        info!("Processing chunk {} @{}: {}...", chunk.index, chunk.offset, chunk.preview);
        Ok(())
    }

    fn query(&mut self, r: &QueryReport) -> Result<()> {
        info!(
            "Pattern '{}' found at positions: {:?} (Query Time: {} ns)",
            r.pattern,
            r.positions,
            r.elapsed.as_nanos()
        );
        Ok(())
    }

    fn chunk_failed(&mut self, chunk: &ChunkInfo, reason: &str) -> Result<()> {
        error!("Error processing chunk {}: {}", chunk.index, reason);
        Ok(())
    }

    fn summary(&mut self, s: &ScanSummary) -> Result<()> {
        info!(
            "{}: {} chunks ({} failed), {} queries, {} hits, index memory {} bytes, {} ms",
            s.source,
            s.chunks,
            s.failed_chunks,
            s.queries,
            s.hits,
            s.total_index_bytes,
            s.elapsed.as_millis()
        );
        if s.failed_chunks > 0 {
            warn!("{}: {} chunk(s) skipped", s.source, s.failed_chunks);
        }
        Ok(())
    }
}

/// 人类可读的逐块文本报告（`<stem>_output.txt`）
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn chunk_start(&mut self, chunk: &ChunkInfo) -> Result<()> {
        writeln!(self.out, "Processing chunk: {}...", chunk.preview)?;
        Ok(())
    }

    fn query(&mut self, r: &QueryReport) -> Result<()> {
        writeln!(
            self.out,
            "Pattern '{}' found at positions: {:?} (Query Time: {} ns)",
            r.pattern,
            r.positions,
            r.elapsed.as_nanos()
        )?;
        Ok(())
    }

    fn chunk_failed(&mut self, _chunk: &ChunkInfo, reason: &str) -> Result<()> {
        writeln!(self.out, "Error processing chunk: {}", reason)?;
        Ok(())
    }

    fn summary(&mut self, s: &ScanSummary) -> Result<()> {
        writeln!(self.out, "File: {}", s.source)?;
        writeln!(self.out, "Chunks: {} ({} failed)", s.chunks, s.failed_chunks)?;
        writeln!(self.out, "Index Memory: {} bytes", s.total_index_bytes)?;
        writeln!(self.out, "Total Time Taken: {} ms", s.elapsed.as_millis())?;
        self.out.flush()?;
        Ok(())
    }
}

/// 性能 CSV（`<stem>_performance.csv`），每次查询一行
pub struct CsvSink<W: Write> {
    out: W,
}

impl<W: Write> CsvSink<W> {
    pub fn new(mut out: W) -> Result<Self> {
        writeln!(out, "{}", CSV_HEADER)?;
        Ok(Self { out })
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for CsvSink<W> {
    fn query(&mut self, r: &QueryReport) -> Result<()> {
        writeln!(self.out, "{},{},{},{}", r.block_size, r.index_bytes, r.elapsed.as_nanos(), r.pattern)?;
        Ok(())
    }

    fn summary(&mut self, _summary: &ScanSummary) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// 把事件广播给多个 sink
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn ReportSink>>,
}

impl MultiSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: Box<dyn ReportSink>) {
        self.sinks.push(sink);
    }
}

impl ReportSink for MultiSink {
    fn chunk_start(&mut self, chunk: &ChunkInfo) -> Result<()> {
        for s in &mut self.sinks {
            s.chunk_start(chunk)?;
        }
        Ok(())
    }

    fn query(&mut self, report: &QueryReport) -> Result<()> {
        for s in &mut self.sinks {
            s.query(report)?;
        }
        Ok(())
    }

    fn chunk_failed(&mut self, chunk: &ChunkInfo, reason: &str) -> Result<()> {
        for s in &mut self.sinks {
            s.chunk_failed(chunk, reason)?;
        }
        Ok(())
    }

    fn summary(&mut self, summary: &ScanSummary) -> Result<()> {
        for s in &mut self.sinks {
            s.summary(summary)?;
        }
        Ok(())
    }
}

/// 在内存中收集全部查询结果
#[derive(Debug, Default)]
pub struct CollectSink {
    pub chunks: Vec<ChunkInfo>,
    pub reports: Vec<QueryReport>,
    pub failures: Vec<(usize, String)>,
    pub summary: Option<ScanSummary>,
}

impl ReportSink for CollectSink {
    fn chunk_start(&mut self, chunk: &ChunkInfo) -> Result<()> {
        self.chunks.push(chunk.clone());
        Ok(())
    }

    fn query(&mut self, report: &QueryReport) -> Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }

    fn chunk_failed(&mut self, chunk: &ChunkInfo, reason: &str) -> Result<()> {
        self.failures.push((chunk.index, reason.to_string()));
        Ok(())
    }

    fn summary(&mut self, summary: &ScanSummary) -> Result<()> {
        self.summary = Some(summary.clone());
        Ok(())
    }
}
