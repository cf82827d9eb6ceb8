//! # Fee errors
//! Failure reasons of the fee state machine. Blueprint methods turn these into panics,
//! which aborts the whole transaction.

use scrypto::prelude::*;
use thiserror::Error;

/// Result type for fee operations.
pub type FeeResult<T> = Result<T, FeeError>;

/// Errors raised while syncing, charging or configuring application fees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeError {
    /// The attached payment does not cover the chargeable fee.
    #[error("Insufficient funds: required {required}, provided {provided}")]
    InsufficientFunds {
        /// Fee that had to be paid.
        required: Decimal,
        /// Amount that was attached.
        provided: Decimal,
    },

    /// The attached payment is not denominated in the fee resource.
    #[error("Wrong fee resource: expected {expected:?}, provided {provided:?}")]
    WrongFeeResource {
        expected: ResourceAddress,
        provided: ResourceAddress,
    },

    /// A mandatory value transfer could not be completed.
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// Setup-time misuse.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The fee source did not move its reset time forward after being refreshed.
    #[error("Fee oracle deadline stalled at {deadline} after {attempts} refresh attempts")]
    OracleDeadlineStalled {
        /// Deadline (seconds since unix epoch) the source kept reporting.
        deadline: i64,
        /// Number of refreshes that were requested.
        attempts: u32,
    },

    /// The residual slot was not cleared by a previous call.
    #[error("Residual value of {0} leaked from a previous call")]
    ResidualLeaked(Decimal),

    /// The price oracle returned a price the fee cannot be derived from.
    #[error("Invalid oracle price: {0}")]
    InvalidOraclePrice(Decimal),
}
