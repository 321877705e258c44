//! 索引层错误类型。
//!
//! "未找到"（select 越界、符号不在字母表内、模式不存在）不是错误，
//! 一律以 `None` / 空结果 / `0` 返回。

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// 构造参数非法：size/block_size 为 0、空序列、字母表边界不合法等
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// 位向量访问越界
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// BWT 逆变换找不到以哨兵结尾的轮转，输入不是合法 BWT
    #[error("inconsistent data: {0}")]
    InconsistentData(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        let e = IndexError::IndexOutOfRange { index: 9, len: 8 };
        assert_eq!(e.to_string(), "index 9 out of range for length 8");
        let e = IndexError::InvalidArgument("block_size must be positive".into());
        assert!(e.to_string().contains("block_size"));
    }

    #[test]
    fn converts_into_anyhow() {
        fn fails() -> anyhow::Result<()> {
            Err(IndexError::InconsistentData("no sentinel".into()))?;
            Ok(())
        }
        let err = fails().unwrap_err();
        assert!(err.to_string().contains("no sentinel"));
    }
}
