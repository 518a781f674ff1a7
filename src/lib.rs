//! boxseal - anonymous public-key encryption using NaCl sealed boxes

#![forbid(unsafe_code)]

pub mod armor;
pub mod commands;
pub mod error;
pub mod input;
pub mod keys;
pub mod sealcrypt;
