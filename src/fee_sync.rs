//! # Fee Sync
//!
//! Decides on every gated call whether the cached fee is due for a refresh, pulls the new fee
//! from the source and opens the grace window during which the lower of the old and new fee is
//! still accepted.

use crate::constants::*;
use crate::errors::*;
use crate::fee_ledger::*;
use scrypto::prelude::*;

impl FeeLedger {
    /// Resyncs the ledger with `source` if `now` has reached the reset deadline.
    ///
    /// # Returns
    /// * `true` if a resync happened and a grace window was opened, `false` if the cached fee is
    ///   still authoritative.
    ///
    /// # Errors
    /// * `OracleDeadlineStalled` if the source keeps reporting a reset time at or before the old
    ///   deadline after `MAX_REFRESH_ATTEMPTS` refreshes. Nothing is written in that case.
    pub fn maybe_resync<S: FeeOracleSource>(
        &mut self,
        source: &mut S,
        now: Instant,
        now_epoch: u64,
    ) -> FeeResult<bool> {
        if now.seconds_since_unix_epoch < self.reset_deadline.seconds_since_unix_epoch {
            return Ok(false);
        }

        let old_deadline = self.reset_deadline.seconds_since_unix_epoch;
        let mut attempts: u32 = 0;

        // the source may hold a new fee without having rolled its own deadline yet
        if source.next_reset().seconds_since_unix_epoch == old_deadline {
            source.refresh();
            attempts += 1;
        }

        let mut next_reset = source.next_reset();
        while next_reset.seconds_since_unix_epoch <= old_deadline {
            if attempts >= MAX_REFRESH_ATTEMPTS {
                return Err(FeeError::OracleDeadlineStalled {
                    deadline: next_reset.seconds_since_unix_epoch,
                    attempts,
                });
            }
            source.refresh();
            attempts += 1;
            next_reset = source.next_reset();
        }

        self.fee_prior = self.fee;
        self.fee = source.current_fee();
        self.reset_deadline = next_reset;
        self.grace_epoch_boundary = now_epoch.saturating_add(self.grace_epochs);

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fee_ledger::tests::MockFeeSource;

    fn ledger_at(source: &MockFeeSource, epoch: u64, grace_epochs: u64) -> FeeLedger {
        FeeLedger::new(source, XRD, epoch, grace_epochs).unwrap()
    }

    #[test]
    fn test_no_resync_before_deadline() {
        let mut source = MockFeeSource::new(dec!(100), 1_000, 3_600);
        let mut ledger = ledger_at(&source, 5, 1);
        let before = ledger.clone();

        source.next_fee = dec!(60);
        source.advance_to(4_599);

        assert!(!ledger.maybe_resync(&mut source, Instant::new(4_599), 5).unwrap());
        assert_eq!(ledger, before);
        assert_eq!(source.refreshes, 0);
    }

    #[test]
    fn test_resync_refreshes_lazy_source_and_opens_grace() {
        let mut source = MockFeeSource::new(dec!(100), 1_000, 3_600);
        let mut ledger = ledger_at(&source, 5, 1);

        source.next_fee = dec!(60);
        source.advance_to(4_600);

        assert!(ledger.maybe_resync(&mut source, Instant::new(4_600), 8).unwrap());
        assert_eq!(source.refreshes, 1);
        assert_eq!(ledger.fee_prior, dec!(100));
        assert_eq!(ledger.fee, dec!(60));
        assert_eq!(ledger.reset_deadline, Instant::new(8_200));
        assert_eq!(ledger.grace_epoch_boundary, 9);
        assert!(ledger.grace_active(9));
        assert!(!ledger.grace_active(10));
    }

    #[test]
    fn test_resync_skips_refresh_when_source_already_rolled() {
        let mut source = MockFeeSource::new(dec!(100), 1_000, 3_600);
        let mut ledger = ledger_at(&source, 5, 0);

        source.next_fee = dec!(120);
        source.advance_to(5_000);
        source.roll();

        assert!(ledger.maybe_resync(&mut source, Instant::new(5_000), 7).unwrap());
        assert_eq!(source.refreshes, 0);
        assert_eq!(ledger.fee, dec!(120));
        assert_eq!(ledger.fee_prior, dec!(100));
        assert_eq!(ledger.grace_epoch_boundary, 7);
    }

    #[test]
    fn test_deadline_strictly_increases_over_resyncs() {
        let mut source = MockFeeSource::new(dec!(100), 1_000, 3_600);
        let mut ledger = ledger_at(&source, 1, 1);
        let mut now = 1_000;

        for epoch in 2..6u64 {
            now += 3_600;
            source.advance_to(now);
            let before = ledger.reset_deadline.seconds_since_unix_epoch;

            assert!(ledger.maybe_resync(&mut source, Instant::new(now), epoch).unwrap());
            assert!(ledger.reset_deadline.seconds_since_unix_epoch > before);
            // a second call in the same instant must not reopen the window
            assert!(!ledger.maybe_resync(&mut source, Instant::new(now), epoch).unwrap());
        }
    }

    #[test]
    fn test_stalled_source_fails_without_touching_ledger() {
        let mut source = MockFeeSource::new(dec!(100), 1_000, 3_600);
        let mut ledger = ledger_at(&source, 5, 1);
        let before = ledger.clone();

        source.stalled = true;
        source.next_fee = dec!(60);
        source.advance_to(4_600);

        let result = ledger.maybe_resync(&mut source, Instant::new(4_600), 6);

        assert_eq!(
            result,
            Err(FeeError::OracleDeadlineStalled {
                deadline: 4_600,
                attempts: MAX_REFRESH_ATTEMPTS,
            })
        );
        assert_eq!(source.refreshes, MAX_REFRESH_ATTEMPTS);
        assert_eq!(ledger, before);
    }
}
