//! # Fee Contract Blueprint
//!
//! The shared fee source and collector for every protected application.
//!
//! ## Responsibilities
//! - **Fee source:** Derives the per-call fee in the native resource from a USD amount and the
//!   oracle price of the native resource, bounded by a minimum and maximum. The fee is recomputed at
//!   most once per epoch (`epoch_length` seconds); between updates the fee is fixed.
//! - **Collector:** Receives the fees forwarded by application gates.
//! - **Distribution:** Pays collected fees out to a weighted set of channels.
//!
//! Applications read the fee through the `FeeOracleSource` implementation at the bottom of this
//! file and pay through its `FeeCollector` implementation.

use crate::constants::*;
use crate::errors::*;
use crate::events::*;
use crate::fee_ledger::FeeOracleSource;
use crate::fee_router::FeeCollector;
use crate::shared_structs::*;
use scrypto::prelude::*;

#[blueprint]
#[events(FeeUpdateEvent, FeeDepositEvent, FeeDistributionEvent)]
mod fee_contract {
    enable_method_auth! {
        methods {
            // Public methods
            get_fee => PUBLIC;
            get_fee_prior => PUBLIC;
            next_reset_time => PUBLIC;
            get_fee_resource => PUBLIC;
            get_info => PUBLIC;
            update_fee => PUBLIC;
            deposit_fee => PUBLIC;
            distribute_fees => PUBLIC;
            // Restricted methods
            set_channels => restrict_to: [OWNER];
            set_fee_parameters => restrict_to: [OWNER];
            set_oracle => restrict_to: [OWNER];
            withdraw_fees => restrict_to: [OWNER];
        }
    }

    /// Holds the current application fee and the fees collected so far.
    struct FeeContract {
        /// Vault holding collected fees until they are distributed.
        fee_vault: FungibleVault,
        /// Global reference to the price oracle component.
        oracle: Global<AnyComponent>,
        /// The method called on the oracle to get the USD price of the fee resource.
        oracle_method_name: String,
        /// The fee per application call, in USD.
        application_fee_usd: Decimal,
        /// Lower bound of the fee in the fee resource.
        min_fee: Decimal,
        /// Upper bound of the fee in the fee resource.
        max_fee: Decimal,
        /// Seconds between two fee updates.
        epoch_length: i64,
        /// Decimal places of the fee resource. Fees are rounded up to it.
        fee_divisibility: u8,
        /// The fee currently charged.
        fee: Decimal,
        /// The fee charged before the last update.
        fee_prior: Decimal,
        /// The fee may be recomputed at or after this time.
        required_reset: Instant,
        /// Recipients of distributed fees.
        channels: Vec<FeeChannel>,
        /// Fees received over the lifetime of the component.
        total_collected: Decimal,
        /// Fees paid out over the lifetime of the component.
        total_distributed: Decimal,
    }

    impl FeeContract {
        /// Instantiates the FeeContract.
        ///
        /// # Arguments
        /// * `owner_badge_address`: The resource required for OWNER actions.
        /// * `fee_resource`: The fungible resource fees are paid in (XRD on a live network).
        /// * `oracle_address`: The `ComponentAddress` of the price oracle.
        /// * `application_fee_usd`: The fee per application call, in USD.
        /// * `min_fee`: Lower bound of the fee in the fee resource.
        /// * `max_fee`: Upper bound of the fee in the fee resource.
        /// * `epoch_length`: Seconds between two fee updates.
        ///
        /// # Returns
        /// * `Global<FeeContract>`: A global reference to the new component.
        ///
        /// # Panics
        /// * If the parameters are inconsistent or the oracle price cannot be used.
        pub fn instantiate(
            owner_badge_address: ResourceAddress,
            fee_resource: ResourceAddress,
            oracle_address: ComponentAddress,
            application_fee_usd: Decimal,
            min_fee: Decimal,
            max_fee: Decimal,
            epoch_length: i64,
        ) -> Global<FeeContract> {
            let fee_divisibility = match ResourceManager::from(fee_resource).resource_type() {
                ResourceType::Fungible { divisibility } => divisibility,
                ResourceType::NonFungible { .. } => panic!(
                    "{}",
                    FeeError::InvalidConfiguration("fee resource must be fungible".to_string())
                ),
            };
            validate_fee_parameters(
                application_fee_usd,
                min_fee,
                max_fee,
                epoch_length,
                fee_divisibility,
            )
            .unwrap_or_else(|e| panic!("{}", e));

            let oracle: Global<AnyComponent> = Global::from(oracle_address);
            let oracle_method_name = DEFAULT_ORACLE_METHOD.to_string();
            let price: Decimal =
                oracle.call_raw(&oracle_method_name, scrypto_args!(fee_resource));
            let fee = compute_fee(application_fee_usd, price, min_fee, max_fee, fee_divisibility)
                .unwrap_or_else(|e| panic!("{}", e));

            let now = Clock::current_time_rounded_to_seconds();

            Self {
                fee_vault: FungibleVault::new(fee_resource),
                oracle,
                oracle_method_name,
                application_fee_usd,
                min_fee,
                max_fee,
                epoch_length,
                fee_divisibility,
                fee,
                fee_prior: fee,
                required_reset: Instant::new(now.seconds_since_unix_epoch + epoch_length),
                channels: vec![],
                total_collected: Decimal::ZERO,
                total_distributed: Decimal::ZERO,
            }
            .instantiate()
            .prepare_to_globalize(OwnerRole::Fixed(rule!(require(owner_badge_address))))
            .metadata(metadata! {
                init {
                    "name" => "Application Fee Contract".to_string(), updatable;
                    "description" => "Collects and distributes native application fees.".to_string(), updatable;
                }
            })
            .globalize()
        }

        pub fn get_fee(&self) -> Decimal {
            self.fee
        }

        pub fn get_fee_prior(&self) -> Decimal {
            self.fee_prior
        }

        pub fn next_reset_time(&self) -> Instant {
            self.required_reset
        }

        pub fn get_fee_resource(&self) -> ResourceAddress {
            self.fee_vault.resource_address()
        }

        pub fn get_info(&self) -> FeeContractInfo {
            FeeContractInfo {
                fee_resource: self.fee_vault.resource_address(),
                fee_divisibility: self.fee_divisibility,
                fee: self.fee,
                fee_prior: self.fee_prior,
                next_reset: self.required_reset,
                application_fee_usd: self.application_fee_usd,
                min_fee: self.min_fee,
                max_fee: self.max_fee,
                epoch_length: self.epoch_length,
                balance: self.fee_vault.amount(),
                total_collected: self.total_collected,
                total_distributed: self.total_distributed,
                channels: self.channels.clone(),
            }
        }

        /// Recomputes the fee from the oracle if the reset time has been reached.
        ///
        /// Calling it again before the new reset time is a no-op, so the fee can never advance
        /// twice within one epoch.
        ///
        /// # Returns
        /// * `bool`: Whether the fee was recomputed.
        pub fn update_fee(&mut self) -> bool {
            let now = Clock::current_time_rounded_to_seconds();
            if now.seconds_since_unix_epoch < self.required_reset.seconds_since_unix_epoch {
                return false;
            }

            let price: Decimal = self.oracle.call_raw(
                &self.oracle_method_name,
                scrypto_args!(self.fee_vault.resource_address()),
            );

            self.fee_prior = self.fee;
            self.fee = compute_fee(
                self.application_fee_usd,
                price,
                self.min_fee,
                self.max_fee,
                self.fee_divisibility,
            )
                .unwrap_or_else(|e| panic!("{}", e));
            self.required_reset = Instant::new(now.seconds_since_unix_epoch + self.epoch_length);

            info!("Fee updated: {} -> {} at price {}", self.fee_prior, self.fee, price);

            Runtime::emit_event(FeeUpdateEvent {
                fee_prior: self.fee_prior,
                fee: self.fee,
                price,
                next_reset: self.required_reset,
            });

            true
        }

        /// Receives a fee payment.
        ///
        /// # Panics
        /// * If the bucket does not hold the fee resource.
        pub fn deposit_fee(&mut self, fee: Bucket) {
            assert!(
                fee.resource_address() == self.fee_vault.resource_address(),
                "{}",
                FeeError::TransferFailed("fee paid in the wrong resource".to_string())
            );

            let amount = fee.amount();
            self.total_collected += amount;
            self.fee_vault.put(fee.as_fungible());

            Runtime::emit_event(FeeDepositEvent { amount });
        }

        /// Pays all collected fees out to the channels, pro rata to their weights. The last channel
        /// receives whatever rounding left behind, so the vault is always emptied.
        ///
        /// # Returns
        /// * `Decimal`: The amount distributed.
        ///
        /// # Panics
        /// * If no channels are configured.
        pub fn distribute_fees(&mut self) -> Decimal {
            assert!(!self.channels.is_empty(), "No fee channels configured");

            let amount = self.fee_vault.amount();
            if amount.is_zero() {
                return Decimal::ZERO;
            }

            let total_weight = self
                .channels
                .iter()
                .fold(Decimal::ZERO, |total, channel| total + channel.weight);
            let last = self.channels.len() - 1;
            let mut payouts: Vec<(ComponentAddress, Decimal)> = vec![];

            for (index, channel) in self.channels.iter().enumerate() {
                let share: FungibleBucket = if index == last {
                    self.fee_vault.take_all()
                } else {
                    self.fee_vault.take_advanced(
                        amount * channel.weight / total_weight,
                        WithdrawStrategy::Rounded(RoundingMode::ToZero),
                    )
                };

                payouts.push((channel.recipient, share.amount()));
                let mut recipient: Global<Account> = Global::from(channel.recipient);
                recipient.try_deposit_or_abort(share.into(), None);
            }

            self.total_distributed += amount;

            Runtime::emit_event(FeeDistributionEvent { amount, payouts });

            amount
        }

        /// Replaces the distribution channels.
        ///
        /// # Arguments
        /// * `channels`: Pairs of recipient account and weight. An empty list disables distribution.
        ///
        /// # Panics
        /// * If any weight is not positive.
        pub fn set_channels(&mut self, channels: Vec<(ComponentAddress, Decimal)>) {
            self.channels = channels
                .into_iter()
                .map(|(recipient, weight)| {
                    assert!(
                        weight > Decimal::ZERO,
                        "{}",
                        FeeError::InvalidConfiguration("channel weight must be positive".to_string())
                    );
                    FeeChannel { recipient, weight }
                })
                .collect();
        }

        /// Changes how the fee is derived. Takes effect at the next fee update.
        pub fn set_fee_parameters(
            &mut self,
            application_fee_usd: Decimal,
            min_fee: Decimal,
            max_fee: Decimal,
            epoch_length: i64,
        ) {
            validate_fee_parameters(
                application_fee_usd,
                min_fee,
                max_fee,
                epoch_length,
                self.fee_divisibility,
            )
            .unwrap_or_else(|e| panic!("{}", e));

            self.application_fee_usd = application_fee_usd;
            self.min_fee = min_fee;
            self.max_fee = max_fee;
            self.epoch_length = epoch_length;
        }

        /// Points the fee contract at another price oracle.
        pub fn set_oracle(&mut self, oracle_address: ComponentAddress, method_name: String) {
            self.oracle = Global::from(oracle_address);
            self.oracle_method_name = method_name;
        }

        /// Takes collected fees out without going through the channels.
        pub fn withdraw_fees(&mut self, amount: Decimal) -> Bucket {
            self.fee_vault.take(amount).into()
        }
    }
}

use fee_contract::FeeContract;

/// Checks a fee configuration for consistency. Both bounds must be amounts of a resource with
/// `divisibility` decimal places.
pub fn validate_fee_parameters(
    application_fee_usd: Decimal,
    min_fee: Decimal,
    max_fee: Decimal,
    epoch_length: i64,
    divisibility: u8,
) -> FeeResult<()> {
    if application_fee_usd <= Decimal::ZERO {
        return Err(FeeError::InvalidConfiguration(
            "application fee must be positive".to_string(),
        ));
    }
    if min_fee.is_negative() || min_fee > max_fee {
        return Err(FeeError::InvalidConfiguration(format!(
            "fee bounds [{}, {}] are invalid",
            min_fee, max_fee
        )));
    }
    for bound in [min_fee, max_fee] {
        if bound.checked_round(divisibility, RoundingMode::ToZero) != Some(bound) {
            return Err(FeeError::InvalidConfiguration(format!(
                "fee bound {} has more than {} decimal places",
                bound, divisibility
            )));
        }
    }
    if epoch_length <= 0 {
        return Err(FeeError::InvalidConfiguration(
            "epoch length must be positive".to_string(),
        ));
    }
    Ok(())
}

/// The fee in the native resource for a USD fee at `price` USD per unit, clamped to the bounds
/// and rounded up to `divisibility` decimal places.
pub fn compute_fee(
    application_fee_usd: Decimal,
    price: Decimal,
    min_fee: Decimal,
    max_fee: Decimal,
    divisibility: u8,
) -> FeeResult<Decimal> {
    if price <= Decimal::ZERO {
        return Err(FeeError::InvalidOraclePrice(price));
    }

    let fee = application_fee_usd
        .checked_div(price)
        .ok_or(FeeError::InvalidOraclePrice(price))?;

    fee.max(min_fee)
        .min(max_fee)
        .checked_round(divisibility, RoundingMode::ToPositiveInfinity)
        .ok_or(FeeError::InvalidOraclePrice(price))
}

impl FeeOracleSource for Global<FeeContract> {
    fn current_fee(&self) -> Decimal {
        self.get_fee()
    }

    fn next_reset(&self) -> Instant {
        self.next_reset_time()
    }

    fn refresh(&mut self) {
        self.update_fee();
    }
}

impl FeeCollector for Global<FeeContract> {
    fn collect(&mut self, fee: FungibleBucket) {
        self.deposit_fee(fee.into());
    }
}
