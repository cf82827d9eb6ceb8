//! # Fee Router
//!
//! Works out the exact fee a call owes, checks the attached payment covers it, forwards the fee to
//! the collector and hands back whatever is left, either as a refund or as the residual a payable
//! body may spend.

use crate::errors::*;
use crate::fee_gate::FeeGate;
use crate::fee_ledger::*;
use scrypto::prelude::*;

/// Receiving side of the fee transfer.
pub trait FeeCollector {
    /// Takes ownership of an exact fee payment. Must abort rather than return if it rejects it.
    fn collect(&mut self, fee: FungibleBucket);
}

/// How an attached amount divides between fee and residual. `chargeable + residual` always equals
/// the attached amount.
#[derive(ScryptoSbor, Clone, Copy, Debug, PartialEq)]
pub struct FeeSplit {
    pub chargeable: Decimal,
    pub residual: Decimal,
}

impl FeeLedger {
    /// Splits `attached` into the fee owed in `now_epoch` and the rest.
    ///
    /// # Errors
    /// * `InsufficientFunds` if `attached` is below the chargeable fee.
    pub fn split(&self, attached: Decimal, now_epoch: u64) -> FeeResult<FeeSplit> {
        let chargeable = self.chargeable(now_epoch);

        if attached < chargeable {
            return Err(FeeError::InsufficientFunds {
                required: chargeable,
                provided: attached,
            });
        }

        Ok(FeeSplit {
            chargeable,
            residual: attached - chargeable,
        })
    }

    /// Validates a payment of `attached` units of `provided` against the ledger and, for
    /// `FeeGate::Payable`, records the residual for the body to read. Moves no value.
    ///
    /// # Errors
    /// * `WrongFeeResource` if `provided` is not the fee resource.
    /// * `InsufficientFunds` if `attached` is below the chargeable fee.
    /// * `ResidualLeaked` if a previous call left the residual slot set.
    ///
    /// The ledger is unchanged on every error.
    pub fn reserve(
        &mut self,
        provided: ResourceAddress,
        attached: Decimal,
        now_epoch: u64,
        gate: FeeGate,
    ) -> FeeResult<FeeSplit> {
        if provided != self.fee_resource {
            return Err(FeeError::WrongFeeResource {
                expected: self.fee_resource,
                provided,
            });
        }

        let split = self.split(attached, now_epoch)?;

        if gate.routes_residual() {
            self.set_pending_residual(split.residual)?;
        }

        Ok(split)
    }

    /// Checks that `payment` holds the fee resource before treating it as fungible.
    pub fn fungible_payment(&self, payment: Bucket) -> FeeResult<FungibleBucket> {
        let provided = payment.resource_address();
        if provided != self.fee_resource {
            return Err(FeeError::WrongFeeResource {
                expected: self.fee_resource,
                provided,
            });
        }

        Ok(payment.as_fungible())
    }

    /// Charges the fee from `payment` and forwards it to `collector`.
    ///
    /// All checks happen in `reserve` before any value moves, so a failing call transfers
    /// nothing. Returns what remained of the payment: a refund for `FeeGate::Refunding`, the
    /// body's budget for `FeeGate::Payable`.
    pub fn charge_and_route<C: FeeCollector>(
        &mut self,
        collector: &mut C,
        mut payment: FungibleBucket,
        now_epoch: u64,
        gate: FeeGate,
    ) -> FeeResult<(FeeSplit, FungibleBucket)> {
        let split = self.reserve(payment.resource_address(), payment.amount(), now_epoch, gate)?;

        collector.collect(payment.take(split.chargeable));

        Ok((split, payment))
    }
}
