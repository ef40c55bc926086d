// Path: crates/types/src/error.rs
//! Error types for the Aurum kernel.
//!
//! Two families live here. The `thiserror` enums (`StateError`, `CoinError`)
//! are internal plumbing errors. `Code`/`ExecFailure`/`ExecSuccess` form the
//! consensus-visible result of executing a transaction: replicas compare the
//! code and the full log string byte-for-byte, so every constructor and
//! join rule below is part of the deterministic contract.

use std::fmt;
use thiserror::Error;

/// Errors raised by a KV store or the state layer on top of it.
#[derive(Error, Debug)]
pub enum StateError {
    /// An error occurred in the state backend.
    #[error("State backend error: {0}")]
    Backend(String),
    /// A stored value failed to decode.
    #[error("Corrupt state entry: {0}")]
    Corrupt(String),
}

/// Errors raised by coin arithmetic.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoinError {
    /// A sum exceeded the 64-bit amount range.
    #[error("Coin amount overflow")]
    Overflow,
    /// A subtraction would produce a negative amount.
    #[error("Coin amount underflow")]
    Underflow,
}

/// Result codes of the consensus-driver protocol.
///
/// The numeric values are wire-visible and must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Code {
    /// Execution succeeded.
    Ok = 0,
    /// A replica-internal failure (backend propagation, arithmetic bugs).
    InternalError = 1,
    /// Undecodable or oversized driver-level payload.
    EncodingError = 2,
    /// Two inputs or two outputs named the same address.
    BaseDuplicateAddress = 101,
    /// Undecodable transaction payload or unknown variant tag.
    BaseEncodingError = 102,
    /// The balance does not cover the input coins or the fee.
    BaseInsufficientFunds = 103,
    /// A structurally invalid transaction input.
    BaseInvalidInput = 104,
    /// A structurally invalid output, or input/output/fee totals disagree.
    BaseInvalidOutput = 105,
    /// The input sequence does not match the stored account sequence.
    BaseInvalidSequence = 106,
    /// Signature verification failed.
    BaseInvalidSignature = 107,
    /// No account is stored under the named address.
    BaseUnknownAddress = 108,
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Code::Ok => "OK",
            Code::InternalError => "InternalError",
            Code::EncodingError => "EncodingError",
            Code::BaseDuplicateAddress => "BaseDuplicateAddress",
            Code::BaseEncodingError => "BaseEncodingError",
            Code::BaseInsufficientFunds => "BaseInsufficientFunds",
            Code::BaseInvalidInput => "BaseInvalidInput",
            Code::BaseInvalidOutput => "BaseInvalidOutput",
            Code::BaseInvalidSequence => "BaseInvalidSequence",
            Code::BaseInvalidSignature => "BaseInvalidSignature",
            Code::BaseUnknownAddress => "BaseUnknownAddress",
        };
        f.write_str(name)
    }
}

/// The successful half of an [`ExecResult`]: optional payload plus a log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecSuccess {
    /// Handler-specific result bytes, empty for most operations.
    pub data: Vec<u8>,
    /// Human-readable log; not compared by consensus on the OK path.
    pub log: String,
}

impl ExecSuccess {
    /// An empty success with the given log string.
    pub fn with_log(log: impl Into<String>) -> Self {
        Self {
            data: Vec::new(),
            log: log.into(),
        }
    }
}

/// The failed half of an [`ExecResult`]: a [`Code`] and an accumulated log.
///
/// As a failure propagates outward, each stage prepends its name to the
/// log. The resulting string is consensus-visible; do not reword the
/// stage names or the join separators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {log}")]
pub struct ExecFailure {
    /// The result code reported to the consensus driver.
    pub code: Code,
    /// The accumulated, stage-prefixed log.
    pub log: String,
}

impl ExecFailure {
    /// A failure with an explicit code and log.
    pub fn new(code: Code, log: impl Into<String>) -> Self {
        Self {
            code,
            log: log.into(),
        }
    }

    /// `InternalError` with the given log.
    pub fn internal(log: impl Into<String>) -> Self {
        Self::new(Code::InternalError, log)
    }

    /// `EncodingError` with the given log.
    pub fn encoding(log: impl Into<String>) -> Self {
        Self::new(Code::EncodingError, log)
    }

    /// `BaseEncodingError` with the given log.
    pub fn base_encoding(log: impl Into<String>) -> Self {
        Self::new(Code::BaseEncodingError, log)
    }

    /// `BaseInvalidInput` with the given log.
    pub fn invalid_input(log: impl Into<String>) -> Self {
        Self::new(Code::BaseInvalidInput, log)
    }

    /// `BaseInvalidOutput` with the given log.
    pub fn invalid_output(log: impl Into<String>) -> Self {
        Self::new(Code::BaseInvalidOutput, log)
    }

    /// `BaseInvalidSequence` with the given log.
    pub fn invalid_sequence(log: impl Into<String>) -> Self {
        Self::new(Code::BaseInvalidSequence, log)
    }

    /// `BaseInvalidSignature` with the given log.
    pub fn invalid_signature(log: impl Into<String>) -> Self {
        Self::new(Code::BaseInvalidSignature, log)
    }

    /// `BaseInsufficientFunds` with the given log.
    pub fn insufficient_funds(log: impl Into<String>) -> Self {
        Self::new(Code::BaseInsufficientFunds, log)
    }

    /// `BaseUnknownAddress` with the given log.
    pub fn unknown_address(log: impl Into<String>) -> Self {
        Self::new(Code::BaseUnknownAddress, log)
    }

    /// `BaseDuplicateAddress` with the given log.
    pub fn duplicate_address(log: impl Into<String>) -> Self {
        Self::new(Code::BaseDuplicateAddress, log)
    }

    /// Prefixes the log with the name of the stage that observed the
    /// failure. Stages join with `": "`.
    pub fn prepend_log(mut self, stage: &str) -> Self {
        self.log = if self.log.is_empty() {
            stage.to_owned()
        } else {
            format!("{}: {}", stage, self.log)
        };
        self
    }

    /// Appends detail to the log. Details join with `"; "`.
    pub fn append_log(mut self, detail: &str) -> Self {
        self.log = if self.log.is_empty() {
            detail.to_owned()
        } else {
            format!("{}; {}", self.log, detail)
        };
        self
    }
}

impl From<StateError> for ExecFailure {
    fn from(err: StateError) -> Self {
        ExecFailure::internal(err.to_string())
    }
}

impl From<CoinError> for ExecFailure {
    fn from(err: CoinError) -> Self {
        ExecFailure::internal(err.to_string())
    }
}

/// The outcome of executing one driver message or one plugin call.
pub type ExecResult = Result<ExecSuccess, ExecFailure>;
