use anyhow::{Context, Result};
use log::{debug, info};
use std::io::BufRead;

use crate::util::dna;

#[derive(Debug, Clone)]
pub struct FastaRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
}

/// FASTA reader. Lines before the first `>` header form an anonymous record
/// (empty id), so plain sequence dumps without headers are accepted too.
pub struct FastaReader<R: BufRead> {
    reader: R,
    buf: String,
    done: bool,
    peek_header: Option<String>,
    lines: usize,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            done: false,
            peek_header: None,
            lines: 0,
        }
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.lines
    }

    fn read_line(&mut self) -> Result<usize> {
        self.buf.clear();
        let n = self.reader.read_line(&mut self.buf)?;
        if n > 0 {
            self.lines += 1;
        }
        Ok(n)
    }

    fn push_seq_line(&self, seq: &mut Vec<u8>) {
        for &b in self.buf.as_bytes() {
            match b {
                b'\n' | b'\r' | b' ' | b'\t' => {}
                _ => seq.push(b.to_ascii_uppercase()),
            }
        }
    }

    pub fn next_record(&mut self) -> Result<Option<FastaRecord>> {
        if self.done {
            return Ok(None);
        }

        let mut seq: Vec<u8> = Vec::new();

        // Find header line, or the first sequence line of a headerless file
        let header = if let Some(h) = self.peek_header.take() {
            h
        } else {
            loop {
                if self.read_line()? == 0 {
                    self.done = true;
                    return Ok(None);
                }
                if self.buf.starts_with('>') {
                    break self.buf[1..].trim().to_string();
                }
                if !self.buf.trim().is_empty() {
                    self.push_seq_line(&mut seq);
                    break String::new();
                }
            }
        };

        let mut parts = header.splitn(2, char::is_whitespace);
        let id = parts.next().unwrap_or("").to_string();
        let desc = parts
            .next()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        // Read sequence lines
        loop {
            if self.read_line()? == 0 {
                self.done = true;
                break;
            }
            if self.buf.starts_with('>') {
                self.peek_header = Some(self.buf[1..].trim().to_string());
                break;
            }
            self.push_seq_line(&mut seq);
        }

        Ok(Some(FastaRecord { id, desc, seq }))
    }
}

/// Read every record of a sequence file, concatenate them and keep only
/// nucleotide symbols.
pub fn load_sequence(path: &str) -> Result<Vec<u8>> {
    let fh = std::fs::File::open(path).with_context(|| format!("cannot open sequence file '{}'", path))?;
    let mut reader = FastaReader::new(std::io::BufReader::new(fh));

    let mut raw = Vec::new();
    let mut records = 0usize;
    while let Some(rec) = reader
        .next_record()
        .with_context(|| format!("cannot read sequence file '{}'", path))?
    {
        debug!("record '{}': {} bp", rec.id, rec.seq.len());
        records += 1;
        raw.extend_from_slice(&rec.seq);
    }

    let seq = dna::clean_sequence(&raw);
    info!(
        "{}: {} lines, {} records, {} symbols ({} dropped)",
        path,
        reader.lines_read(),
        records,
        seq.len(),
        raw.len() - seq.len()
    );
    Ok(seq)
}
