//! Arbiter error types.

use thiserror::Error;

/// Errors that can occur when configuring or addressing the arbiter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArbiterError {
    #[error("weight out of range: {0} (expected 0..=7)")]
    WeightOutOfRange(u8),

    #[error("requester index out of range: {0} (expected 0..=3)")]
    RequesterOutOfRange(usize),

    #[error("unmapped register address: {0:#x}")]
    UnmappedRegister(u8),

    #[error("register is read-only: {0:#x}")]
    ReadOnlyRegister(u8),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type ArbiterResult<T> = Result<T, ArbiterError>;
