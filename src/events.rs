//! Defines events emitted by the application fee components.

use scrypto::prelude::*;

/// Event emitted by a protected application when its cached fee was refreshed from the fee contract.
#[derive(ScryptoSbor, ScryptoEvent, Clone)]
pub struct FeeResyncEvent {
    /// The fee in effect before the resync.
    pub fee_prior: Decimal,
    /// The fee pulled from the fee contract.
    pub fee: Decimal,
    /// When the next resync is due.
    pub reset_deadline: Instant,
    /// Last epoch in which the lower of both fees is accepted.
    pub grace_epoch_boundary: u64,
}

/// Event emitted for every gated call that paid its fee.
#[derive(ScryptoSbor, ScryptoEvent, Clone)]
pub struct FeeChargeEvent {
    /// The fee forwarded to the fee contract.
    pub chargeable: Decimal,
    /// What was left of the attached payment.
    pub residual: Decimal,
    /// True if the residual went back to the caller, false if it went to the method body.
    pub refunded: bool,
}

/// Event emitted when the residual of a payable call is deposited into the application.
#[derive(ScryptoSbor, ScryptoEvent, Clone)]
pub struct ApplicationDepositEvent {
    pub amount: Decimal,
    pub total_deposited: Decimal,
}

/// Event emitted when the fee contract recomputes its fee.
#[derive(ScryptoSbor, ScryptoEvent, Clone)]
pub struct FeeUpdateEvent {
    /// The fee before the update.
    pub fee_prior: Decimal,
    /// The newly computed fee.
    pub fee: Decimal,
    /// The oracle price the fee was derived from.
    pub price: Decimal,
    /// When the fee may be recomputed next.
    pub next_reset: Instant,
}

/// Event emitted when a fee payment is deposited into the fee contract.
#[derive(ScryptoSbor, ScryptoEvent, Clone)]
pub struct FeeDepositEvent {
    pub amount: Decimal,
}

/// Event emitted when collected fees are paid out to the fee channels.
#[derive(ScryptoSbor, ScryptoEvent, Clone)]
pub struct FeeDistributionEvent {
    /// Total amount paid out.
    pub amount: Decimal,
    /// Amount sent to each channel, in channel order.
    pub payouts: Vec<(ComponentAddress, Decimal)>,
}
