//! # Application Fee Gate
//!
//! Wraps a state-changing method of a protected component:
//!
//! 1. resync the ledger with the fee source when its deadline has passed,
//! 2. charge the fee from the attached payment and forward it to the collector,
//! 3. run the method body,
//! 4. clear the residual slot.
//!
//! A failure at any step panics, which aborts the transaction and rolls back every write made
//! during it, including the residual slot.

use crate::errors::*;
use crate::events::*;
use crate::fee_ledger::*;
use crate::fee_router::*;
use scrypto::prelude::*;

/// How a gated method treats the value left after the fee.
#[derive(ScryptoSbor, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeGate {
    /// Non-payable method: the remainder goes straight back to the caller.
    Refunding,
    /// Payable method: the remainder is handed to the body to spend.
    Payable,
}

impl FeeGate {
    pub fn routes_residual(&self) -> bool {
        matches!(self, FeeGate::Payable)
    }
}

impl FeeLedger {
    /// Acquire half of the gate: check the payment resource, resync, then charge. Must be paired
    /// with `exit`.
    ///
    /// # Returns
    /// * `FungibleBucket`: The remainder of the payment. The refund for `FeeGate::Refunding`, the
    ///   body's budget for `FeeGate::Payable`.
    pub fn enter<S: FeeOracleSource + FeeCollector>(
        &mut self,
        source: &mut S,
        payment: Bucket,
        gate: FeeGate,
    ) -> FeeResult<FungibleBucket> {
        let payment = self.fungible_payment(payment)?;
        let now = Clock::current_time_rounded_to_seconds();
        let now_epoch = Runtime::current_epoch().number();

        if self.maybe_resync(source, now, now_epoch)? {
            info!(
                "Application fee resynced: {} -> {}, grace until epoch {}",
                self.fee_prior, self.fee, self.grace_epoch_boundary
            );
            Runtime::emit_event(FeeResyncEvent {
                fee_prior: self.fee_prior,
                fee: self.fee,
                reset_deadline: self.reset_deadline,
                grace_epoch_boundary: self.grace_epoch_boundary,
            });
        }

        let (split, residual) = self.charge_and_route(source, payment, now_epoch, gate)?;
        debug!(
            "Application fee charged: {} (residual {}, grace active: {})",
            split.chargeable,
            split.residual,
            self.grace_active(now_epoch)
        );
        Runtime::emit_event(FeeChargeEvent {
            chargeable: split.chargeable,
            residual: split.residual,
            refunded: !gate.routes_residual(),
        });

        Ok(residual)
    }

    /// Release half of the gate.
    pub fn exit(&mut self) {
        self.clear_pending_residual();
    }

    /// Runs a non-payable `body` behind the fee gate and returns its result together with the
    /// refund of everything attached beyond the fee.
    ///
    /// # Panics
    /// * On any `FeeError` raised while syncing or charging.
    pub fn refunding_application_fee<S, T, F>(
        &mut self,
        source: &mut S,
        payment: Bucket,
        body: F,
    ) -> (T, Bucket)
    where
        S: FeeOracleSource + FeeCollector,
        F: FnOnce() -> T,
    {
        let refund = self
            .enter(source, payment, FeeGate::Refunding)
            .unwrap_or_else(|e| panic!("{}", e));

        let result = body();
        self.exit();

        (result, refund.into())
    }

    /// Runs a payable `body` behind the fee gate. The body receives the residual value and the
    /// bucket holding it, and must consume the bucket. The residual slot is zero again once this
    /// returns.
    ///
    /// # Panics
    /// * On any `FeeError` raised while syncing or charging.
    pub fn payable_application_fee<S, T, F>(&mut self, source: &mut S, payment: Bucket, body: F) -> T
    where
        S: FeeOracleSource + FeeCollector,
        F: FnOnce(Decimal, FungibleBucket) -> T,
    {
        let budget = self
            .enter(source, payment, FeeGate::Payable)
            .unwrap_or_else(|e| panic!("{}", e));

        let result = body(self.pending_residual(), budget);
        self.exit();

        result
    }
}
