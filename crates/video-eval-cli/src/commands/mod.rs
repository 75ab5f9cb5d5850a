//! CLI command implementations.

pub mod aggregate;
pub mod average;
pub mod compare;
pub mod encode_args;
pub mod row;
pub mod xpsnr;
