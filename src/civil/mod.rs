//! Civil registry support / 人口登记支持
//!
//! - `codes`: demographic code tables (code <-> label)
//! - `nik`: address derivation from a national ID number
//! - `normalizer`: record decoding for responses and encoding for writes

pub mod codes;
pub mod nik;
pub mod normalizer;

pub use codes::{CodeCategory, CodeTable, LookupError, SENTINEL};
pub use nik::{AddressDeriver, NikAddressParser, NikInfo};
pub use normalizer::RecordNormalizer;
