//! # Types
//!
//! Small value types shared by the workload and anything that inspects it.

pub mod address;

pub use address::{Address, ParseAddressError};
