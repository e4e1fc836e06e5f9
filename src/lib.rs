use std::result;

pub mod error;
pub mod executors;
pub mod fuzzer;
pub mod mutation;
pub mod options;
pub mod rawdex;

pub type Result<T> = result::Result<T, error::FuzzError>;
