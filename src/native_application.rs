//! # Native Application Blueprint
//!
//! A protected application that charges the native application fee on every state-changing call.
//! It shows both gate variants and batching:
//!
//! - `increment_count` is non-payable: the fee is taken and the rest of the payment is refunded.
//! - `deposit` is payable: the fee is taken and the rest is deposited into the application.
//! - `batch` runs several actions in one call, each paying its own fee out of one shared payment.

use crate::constants::*;
use crate::errors::*;
use crate::events::*;
use crate::fee_contract::fee_contract::*;
use crate::fee_gate::FeeGate;
use crate::fee_ledger::FeeLedger;
use crate::shared_structs::*;
use scrypto::prelude::*;

#[blueprint]
#[events(FeeResyncEvent, FeeChargeEvent, ApplicationDepositEvent)]
mod native_application {
    enable_method_auth! {
        methods {
            // Public user actions (fee gated)
            increment_count => PUBLIC;
            deposit => PUBLIC;
            batch => PUBLIC;
            // Getters
            get_count => PUBLIC;
            get_total_deposited => PUBLIC;
            get_fee_ledger => PUBLIC;
            get_chargeable_fee => PUBLIC;
            get_pending_residual => PUBLIC;
            get_last_residual => PUBLIC;
            // Owner
            withdraw_deposits => restrict_to: [OWNER];
        }
    }

    struct NativeApplication {
        /// The shared fee contract: fee source and collector.
        fee_contract: Global<FeeContract>,
        /// Cached fee state of this application.
        fee_ledger: FeeLedger,
        /// Vault holding residual value deposited through payable calls.
        deposits: FungibleVault,
        /// Number of `increment_count` calls, batched or not.
        count: u64,
        /// Total value deposited over the lifetime of the component.
        total_deposited: Decimal,
        /// Residual value the last payable body read from the ledger.
        last_residual: Decimal,
    }

    impl NativeApplication {
        /// Instantiates the application and syncs its fee ledger with the fee contract.
        ///
        /// # Arguments
        /// * `fee_contract_address`: The `ComponentAddress` of the shared `FeeContract`.
        /// * `owner_badge_address`: The resource required for OWNER actions.
        /// * `grace_epochs`: Epochs after a resync during which the lower of the old and new fee is
        ///   charged. 0 limits the grace window to the epoch of the resync.
        ///
        /// # Panics
        /// * If `grace_epochs` exceeds `MAX_GRACE_EPOCHS`.
        pub fn instantiate(
            fee_contract_address: ComponentAddress,
            owner_badge_address: ResourceAddress,
            grace_epochs: u64,
        ) -> Global<NativeApplication> {
            let fee_contract: Global<FeeContract> = Global::from(fee_contract_address);
            let fee_resource = fee_contract.get_fee_resource();

            let fee_ledger = FeeLedger::new(
                &fee_contract,
                fee_resource,
                Runtime::current_epoch().number(),
                grace_epochs,
            )
            .unwrap_or_else(|e| panic!("{}", e));

            Self {
                fee_contract,
                fee_ledger,
                deposits: FungibleVault::new(fee_resource),
                count: 0,
                total_deposited: Decimal::ZERO,
                last_residual: Decimal::ZERO,
            }
            .instantiate()
            .prepare_to_globalize(OwnerRole::Fixed(rule!(require(owner_badge_address))))
            .metadata(metadata! {
                init {
                    "name" => "Native Application".to_string(), updatable;
                    "description" => "An application charging the native application fee.".to_string(), updatable;
                }
            })
            .globalize()
        }

        /// Instantiates the application with the default grace window, which honours the prior
        /// fee only in the epoch of a resync.
        pub fn instantiate_default(
            fee_contract_address: ComponentAddress,
            owner_badge_address: ResourceAddress,
        ) -> Global<NativeApplication> {
            Self::instantiate(fee_contract_address, owner_badge_address, DEFAULT_GRACE_EPOCHS)
        }

        /// Increments the counter. Non-payable: anything attached beyond the fee is refunded.
        ///
        /// # Arguments
        /// * `payment`: A bucket of the fee resource covering at least the chargeable fee.
        ///
        /// # Returns
        /// * `Bucket`: The refund.
        pub fn increment_count(&mut self, payment: Bucket) -> Bucket {
            let mut fee_contract = self.fee_contract;

            let ((), refund) =
                self.fee_ledger
                    .refunding_application_fee(&mut fee_contract, payment, || {
                        self.count += 1;
                    });

            refund
        }

        /// Deposits everything attached beyond the fee into the application.
        ///
        /// # Arguments
        /// * `payment`: A bucket of the fee resource covering at least the chargeable fee.
        pub fn deposit(&mut self, payment: Bucket) {
            let mut fee_contract = self.fee_contract;

            self.fee_ledger
                .payable_application_fee(&mut fee_contract, payment, |residual, budget| {
                    self.last_residual = residual;
                    self.total_deposited += residual;
                    self.deposits.put(budget);

                    Runtime::emit_event(ApplicationDepositEvent {
                        amount: residual,
                        total_deposited: self.total_deposited,
                    });
                });
        }

        /// Runs several actions in one call. Each action passes through its own fee gate and pays
        /// out of what is left of `payment`, so an underfunded step aborts the whole batch.
        ///
        /// # Arguments
        /// * `actions`: The actions to run, in order.
        /// * `payment`: A bucket of the fee resource funding every fee and deposit.
        ///
        /// # Returns
        /// * `Bucket`: What is left of `payment`.
        pub fn batch(&mut self, actions: Vec<ApplicationAction>, payment: Bucket) -> Bucket {
            let mut fee_contract = self.fee_contract;
            let mut remaining = payment;

            for action in actions {
                remaining = match action {
                    ApplicationAction::Increment => {
                        let refund = self
                            .fee_ledger
                            .enter(&mut fee_contract, remaining, FeeGate::Refunding)
                            .unwrap_or_else(|e| panic!("{}", e));
                        self.count += 1;
                        self.fee_ledger.exit();
                        refund.into()
                    }
                    ApplicationAction::Deposit(amount) => {
                        let mut budget = self
                            .fee_ledger
                            .enter(&mut fee_contract, remaining, FeeGate::Payable)
                            .unwrap_or_else(|e| panic!("{}", e));
                        let residual = self.fee_ledger.pending_residual();
                        assert!(
                            residual >= amount,
                            "{}",
                            FeeError::InsufficientFunds {
                                required: amount,
                                provided: residual,
                            }
                        );

                        self.last_residual = residual;
                        self.total_deposited += amount;
                        self.deposits.put(budget.take(amount));
                        Runtime::emit_event(ApplicationDepositEvent {
                            amount,
                            total_deposited: self.total_deposited,
                        });

                        self.fee_ledger.exit();
                        budget.into()
                    }
                };
            }

            remaining
        }

        pub fn get_count(&self) -> u64 {
            self.count
        }

        pub fn get_total_deposited(&self) -> Decimal {
            self.total_deposited
        }

        pub fn get_fee_ledger(&self) -> FeeLedger {
            self.fee_ledger.clone()
        }

        /// The fee a call would pay in the current epoch with the cached fee state. A resync that
        /// is already due is not taken into account.
        pub fn get_chargeable_fee(&self) -> Decimal {
            self.fee_ledger.chargeable(Runtime::current_epoch().number())
        }

        pub fn get_pending_residual(&self) -> Decimal {
            self.fee_ledger.pending_residual()
        }

        pub fn get_last_residual(&self) -> Decimal {
            self.last_residual
        }

        /// Takes deposited value out of the application.
        pub fn withdraw_deposits(&mut self, amount: Decimal) -> Bucket {
            self.deposits.take(amount).into()
        }
    }
}
