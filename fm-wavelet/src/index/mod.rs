pub mod bitvec;
pub mod bwt;
pub mod error;
pub mod fm;
pub mod sa;
pub mod wavelet;

pub use bitvec::{BitVector, BitVectorBuilder};
pub use error::IndexError;
pub use fm::FMIndex;
pub use wavelet::WaveletTree;
