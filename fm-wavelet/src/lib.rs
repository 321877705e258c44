//! # fm-wavelet
//!
//! 基于小波树的 FM 索引，用于在（DNA）序列上做精确子串查找。
//!
//! 核心由四部分组成：
//!
//! - **位向量**：分块缓存前缀计数的 rank / select
//! - **小波树**：按字母表区间递归二分，把多字母 rank / select 化为位向量操作
//! - **Burrows-Wheeler 变换**：由后缀数组求 BWT，以及逐列重建 / LF 映射两种逆变换
//! - **反向搜索**：自右向左逐字符收缩后缀数组区间
//!
//! ## 快速示例
//!
//! ```rust
//! use fm_wavelet::index::{bwt, fm, sa};
//!
//! let text = b"BANANA$";
//! let sa_arr = sa::build_sa(text);
//! assert_eq!(bwt::transform(text, &sa_arr), b"ANNB$AA");
//!
//! let fm_idx = fm::FMIndex::build(text, sa_arr, 4).unwrap();
//! assert_eq!(fm_idx.search(b"ANA"), vec![1, 3]);
//! ```
//!
//! ## 模块说明
//!
//! - [`index`] — 位向量、小波树、BWT、后缀数组、FM 索引
//! - [`io`] — 序列文件读取
//! - [`scan`] — 长序列分块建索引与批量查询
//! - [`report`] — 查询结果输出（日志 / 文本 / CSV）
//! - [`config`] — 扫描参数
//! - [`util`] — 序列清洗、反向互补

pub mod config;
pub mod index;
pub mod io;
pub mod report;
pub mod scan;
pub mod util;
