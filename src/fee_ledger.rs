//! # Fee Ledger
//!
//! The per-application memory of the fee state machine. Each protected component keeps one
//! `FeeLedger` in its state. Fees are only ever written by the resync step (`fee_sync`), the
//! residual slot only by the gate (`fee_gate`).

use crate::constants::*;
use crate::errors::*;
use scrypto::prelude::*;

/// Read side of the component the fee is pulled from.
pub trait FeeOracleSource {
    /// The fee currently in effect at the source. May be stale until refreshed.
    fn current_fee(&self) -> Decimal;
    /// Time at or after which the source expects to be refreshed.
    fn next_reset(&self) -> Instant;
    /// Asks the source to recompute its fee. A no-op if its own deadline has not passed.
    fn refresh(&mut self);
}

/// Cached fee state of a single protected component.
#[derive(ScryptoSbor, Clone, Debug, PartialEq)]
pub struct FeeLedger {
    /// Latest fee pulled from the source.
    pub fee: Decimal,
    /// Fee in effect before the last resync.
    pub fee_prior: Decimal,
    /// Time at or after which the next resync is due.
    pub reset_deadline: Instant,
    /// Last epoch in which the prior fee may still be charged.
    pub grace_epoch_boundary: u64,
    /// Length of the grace window opened by a resync, in epochs.
    pub grace_epochs: u64,
    /// Value left over after the fee of the running call, for a payable body to use.
    pub pending_residual: Decimal,
    /// Resource the fee is paid in.
    pub fee_resource: ResourceAddress,
}

impl FeeLedger {
    /// Creates a ledger from the source's current state. The prior fee equals the current one and
    /// the grace window starts out expired.
    pub fn new<S: FeeOracleSource>(
        source: &S,
        fee_resource: ResourceAddress,
        now_epoch: u64,
        grace_epochs: u64,
    ) -> FeeResult<Self> {
        if grace_epochs > MAX_GRACE_EPOCHS {
            return Err(FeeError::InvalidConfiguration(format!(
                "grace window of {} epochs exceeds the maximum of {}",
                grace_epochs, MAX_GRACE_EPOCHS
            )));
        }

        let fee = source.current_fee();

        Ok(Self {
            fee,
            fee_prior: fee,
            reset_deadline: source.next_reset(),
            // at epoch 0 this still reads as active, which is harmless while fee == fee_prior
            grace_epoch_boundary: now_epoch.saturating_sub(1),
            grace_epochs,
            pending_residual: Decimal::ZERO,
            fee_resource,
        })
    }

    pub fn grace_active(&self, now_epoch: u64) -> bool {
        now_epoch <= self.grace_epoch_boundary
    }

    /// The fee a call landing in `now_epoch` has to pay: the lower of the prior and current fee
    /// while a grace window is open, the current fee otherwise.
    pub fn chargeable(&self, now_epoch: u64) -> Decimal {
        if self.grace_active(now_epoch) {
            self.fee.min(self.fee_prior)
        } else {
            self.fee
        }
    }

    pub fn pending_residual(&self) -> Decimal {
        self.pending_residual
    }

    pub(crate) fn set_pending_residual(&mut self, residual: Decimal) -> FeeResult<()> {
        if !self.pending_residual.is_zero() {
            return Err(FeeError::ResidualLeaked(self.pending_residual));
        }
        self.pending_residual = residual;
        Ok(())
    }

    pub(crate) fn clear_pending_residual(&mut self) {
        self.pending_residual = Decimal::ZERO;
    }
}
