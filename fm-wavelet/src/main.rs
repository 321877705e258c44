use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use fm_wavelet::config::{ScanConfig, DEFAULT_BLOCK_SIZE, DEFAULT_CHUNK_SIZE};
use fm_wavelet::index::bwt::{self, InverseStrategy, SENTINEL};
use fm_wavelet::index::fm::{FMIndex, IndexMeta};
use fm_wavelet::index::sa::{self, SaAlgorithm};
use fm_wavelet::io::fasta;
use fm_wavelet::report::{CsvSink, LogSink, MultiSink, TextSink};
use fm_wavelet::scan;
use fm_wavelet::util::dna;

#[derive(Parser, Debug)]
#[command(name = "fm-wavelet", author, version, about = "FM-index over a wavelet tree for exact sequence search", arg_required_else_help = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Disable logging
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SaArg {
    Naive,
    Doubling,
}

impl From<SaArg> for SaAlgorithm {
    fn from(a: SaArg) -> Self {
        match a {
            SaArg::Naive => SaAlgorithm::Naive,
            SaArg::Doubling => SaAlgorithm::Doubling,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InvertArg {
    Naive,
    Lf,
}

impl From<InvertArg> for InverseStrategy {
    fn from(a: InvertArg) -> Self {
        match a {
            InvertArg::Naive => InverseStrategy::Naive,
            InvertArg::Lf => InverseStrategy::LfMapping,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an FM index over a whole sequence file
    Index {
        /// Sequence file (FASTA or plain)
        reference: String,
        /// Output prefix for the index file
        #[arg(short, long, default_value = "ref")]
        output: String,
        #[arg(long = "block-size", default_value_t = DEFAULT_BLOCK_SIZE)]
        block_size: usize,
        #[arg(long = "sa", value_enum, default_value_t = SaArg::Doubling)]
        sa: SaArg,
    },
    /// Search patterns in a saved index
    Search {
        /// Path to FM index (.fm)
        #[arg(short = 'i', long = "index")]
        index: String,
        #[arg(required = true)]
        patterns: Vec<String>,
        /// Also search the reverse complement of each pattern
        #[arg(long = "both-strands")]
        both_strands: bool,
    },
    /// Chunk sequence files, index every chunk and report pattern hits
    Scan {
        #[arg(required = true)]
        files: Vec<String>,
        #[arg(long = "chunk-size", default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        #[arg(long = "block-size", default_value_t = DEFAULT_BLOCK_SIZE)]
        block_size: usize,
        /// Pattern to search (repeatable); defaults to ACG, TGCA, GATTACA, TTAGGC
        #[arg(short = 'p', long = "pattern")]
        patterns: Vec<String>,
        #[arg(short = 't', long = "threads", default_value_t = 1)]
        threads: usize,
        /// Directory for <stem>_output.txt and <stem>_performance.csv
        #[arg(long = "out-dir")]
        out_dir: Option<String>,
        /// Fixed alphabet bounds as two characters, e.g. '$Z'
        #[arg(long = "alphabet")]
        alphabet: Option<String>,
        #[arg(long = "sa", value_enum, default_value_t = SaArg::Doubling)]
        sa: SaArg,
    },
    /// Print the BWT of a short sequence and check that it inverts
    Bwt {
        input: String,
        #[arg(long = "invert", value_enum, default_value_t = InvertArg::Lf)]
        invert: InvertArg,
        /// Refuse longer inputs (the naive inversion is quadratic)
        #[arg(long = "max-len", default_value_t = 10_000)]
        max_len: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet)?;
    match cli.command {
        Commands::Index { reference, output, block_size, sa } => run_index(&reference, &output, block_size, sa.into()),
        Commands::Search { index, patterns, both_strands } => run_search(&index, &patterns, both_strands),
        Commands::Scan { files, chunk_size, block_size, patterns, threads, out_dir, alphabet, sa } => {
            let mut cfg = ScanConfig { chunk_size, block_size, threads, sa_algorithm: sa.into(), ..ScanConfig::default() };
            if !patterns.is_empty() {
                cfg.patterns = patterns.iter().map(|p| p.to_ascii_uppercase()).collect();
            }
            if let Some(a) = alphabet {
                cfg.alphabet = Some(parse_alphabet(&a)?);
            }
            cfg.validate()?;
            run_scan(&files, &cfg, out_dir.as_deref())
        }
        Commands::Bwt { input, invert, max_len } => run_bwt(&input, invert.into(), max_len),
    }
}

fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        LevelFilter::Off
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    TermLogger::init(level, Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;
    Ok(())
}

fn parse_alphabet(s: &str) -> Result<(u8, u8)> {
    match s.as_bytes() {
        [low, high] => Ok((*low, *high)),
        _ => bail!("alphabet must be exactly two characters (low, high), got '{}'", s),
    }
}

fn load_text(path: &str) -> Result<Vec<u8>> {
    let mut text = fasta::load_sequence(path)?;
    if text.is_empty() {
        bail!("sequence file '{}' contains no indexable symbols", path);
    }
    text.push(SENTINEL);
    Ok(text)
}

fn run_index(reference: &str, output: &str, block_size: usize, algo: SaAlgorithm) -> Result<()> {
    let text = load_text(reference)?;
    println!("reference: {}", reference);
    println!("total_len: {}", text.len() - 1);

    let t0 = Instant::now();
    let sa_arr = sa::build(&text, algo);
    info!("suffix array ({:?}) built in {} ms", algo, t0.elapsed().as_millis());
    let mut fm = FMIndex::build(&text, sa_arr, block_size)?;
    fm.set_meta(IndexMeta {
        reference_file: Some(reference.to_string()),
        build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
        build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
    });
    info!("FM index built in {} ms, {} bytes", t0.elapsed().as_millis(), fm.size_in_bytes());

    let out_path = format!("{}.fm", output);
    fm.save_to_file(&out_path)
        .with_context(|| format!("cannot write index to '{}'", out_path))?;
    println!("FM index saved: {}", out_path);
    Ok(())
}

fn run_search(index_path: &str, patterns: &[String], both_strands: bool) -> Result<()> {
    let fm = FMIndex::load_from_file(index_path)
        .with_context(|| format!("cannot load index '{}'", index_path))?;
    if let Some(meta) = fm.meta() {
        info!(
            "index built from {:?} at {:?}",
            meta.reference_file.as_deref().unwrap_or("?"),
            meta.build_timestamp.as_deref().unwrap_or("?")
        );
    }

    for p in patterns {
        let fwd = p.to_ascii_uppercase().into_bytes();
        let mut queries = vec![("+", fwd.clone())];
        if both_strands {
            queries.push(("-", dna::revcomp(&fwd)));
        }
        for (strand, q) in queries {
            let t0 = Instant::now();
            let positions = fm.search(&q);
            let ns = t0.elapsed().as_nanos();
            println!(
                "{}\t{}\t{}\t{:?}\t{} ns",
                String::from_utf8_lossy(&q),
                strand,
                positions.len(),
                positions,
                ns
            );
        }
    }
    Ok(())
}

fn run_scan(files: &[String], cfg: &ScanConfig, out_dir: Option<&str>) -> Result<()> {
    let mut failed = 0usize;
    for file in files {
        info!("Starting processing for file: {}", file);
        if let Err(e) = scan_one(file, cfg, out_dir) {
            error!("{}: {:#}", file, e);
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{} of {} file(s) failed", failed, files.len());
    }
    Ok(())
}

fn scan_one(file: &str, cfg: &ScanConfig, out_dir: Option<&str>) -> Result<()> {
    let mut sink = MultiSink::new();
    sink.push(Box::new(LogSink));
    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("cannot create output directory '{}'", dir))?;
        let stem = Path::new(file).file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| "scan".into());
        let txt = Path::new(dir).join(format!("{}_output.txt", stem));
        let csv = Path::new(dir).join(format!("{}_performance.csv", stem));
        let txt_f = std::fs::File::create(&txt).with_context(|| format!("cannot create '{}'", txt.display()))?;
        let csv_f = std::fs::File::create(&csv).with_context(|| format!("cannot create '{}'", csv.display()))?;
        sink.push(Box::new(TextSink::new(std::io::BufWriter::new(txt_f))));
        sink.push(Box::new(CsvSink::new(std::io::BufWriter::new(csv_f))?));
    }
    let summary = scan::scan_file(file, cfg, &mut sink)?;
    println!(
        "{}: {} chunks, {} queries, {} hits, {} ms",
        file,
        summary.chunks,
        summary.queries,
        summary.hits,
        summary.elapsed.as_millis()
    );
    Ok(())
}

fn run_bwt(input: &str, strategy: InverseStrategy, max_len: usize) -> Result<()> {
    let text = load_text(input)?;
    if text.len() > max_len {
        bail!("sequence of {} symbols exceeds --max-len {}", text.len(), max_len);
    }
    let sa_arr = sa::build_sa_naive(&text);
    let transformed = bwt::transform(&text, &sa_arr);
    println!("{}", String::from_utf8_lossy(&transformed));

    let restored = bwt::untransform_with(&transformed, SENTINEL, strategy)?;
    if restored != text {
        bail!("BWT round-trip mismatch for '{}'", input);
    }
    info!("round-trip ok ({:?})", strategy);
    Ok(())
}
