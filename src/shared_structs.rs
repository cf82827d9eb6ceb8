//! # Shared structs
//! Structs used by both the FeeContract and the protected application blueprints.

use scrypto::prelude::*;

/// A recipient of collected fees and its relative share.
#[derive(ScryptoSbor, Clone, Debug, PartialEq)]
pub struct FeeChannel {
    /// Account receiving this channel's share.
    pub recipient: ComponentAddress,
    /// Weight of this channel relative to the sum of all weights.
    pub weight: Decimal,
}

/// A summarized view of the fee contract's state, returned by its getter.
#[derive(ScryptoSbor, Clone, Debug)]
pub struct FeeContractInfo {
    /// The resource fees are paid in.
    pub fee_resource: ResourceAddress,
    /// Decimal places of the fee resource.
    pub fee_divisibility: u8,
    /// The fee currently charged per application call.
    pub fee: Decimal,
    /// The fee charged before the last update.
    pub fee_prior: Decimal,
    /// When the fee may be recomputed next.
    pub next_reset: Instant,
    /// Fee in USD that the native fee is derived from.
    pub application_fee_usd: Decimal,
    /// Lower bound of the native fee.
    pub min_fee: Decimal,
    /// Upper bound of the native fee.
    pub max_fee: Decimal,
    /// Seconds between fee updates.
    pub epoch_length: i64,
    /// Fees currently held, waiting for distribution.
    pub balance: Decimal,
    /// Fees received over the lifetime of the contract.
    pub total_collected: Decimal,
    /// Fees paid out to channels over the lifetime of the contract.
    pub total_distributed: Decimal,
    /// The current distribution channels.
    pub channels: Vec<FeeChannel>,
}

/// One step of a batched call to a protected application. Every step pays its own fee.
#[derive(ScryptoSbor, Clone, Debug, PartialEq)]
pub enum ApplicationAction {
    /// Non-payable: bump the counter, the remainder stays in the batch payment.
    Increment,
    /// Payable: deposit this amount out of the residual, the rest stays in the batch payment.
    Deposit(Decimal),
}
