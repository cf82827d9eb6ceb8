//! # Application Fee Crate
//!
//! This crate contains the Scrypto blueprints and supporting logic for charging a native application
//! fee on every state-changing call of a protected application. The fee is pulled from a shared
//! `FeeContract`, which derives it from an oracle price and refreshes it once per fee epoch. Around a
//! refresh, a short grace window keeps the lower of the old and new fee valid so that calls priced
//! just before the refresh are not rejected.
//!
//! ## Modules
//!
//! - `fee_ledger`: The `FeeLedger` each protected application keeps in its state, and the
//!   `FeeOracleSource` trait it is synced from.
//! - `fee_sync`: The resync step: detects a due refresh, pulls the new fee and opens the grace window.
//! - `fee_router`: Computes the chargeable fee, checks the payment covers it, forwards the fee and
//!   returns the residual.
//! - `fee_gate`: The gate wrapping a protected method, in a refunding (non-payable) and a payable variant.
//! - `fee_contract`: The `FeeContract` blueprint: oracle-backed fee source, collector and distributor.
//! - `native_application`: A protected application blueprint using both gate variants and batching.
//! - `events`: Events emitted by the components.
//! - `errors`: The `FeeError` taxonomy.
//! - `constants`: Protocol constants.
//! - `shared_structs`: Data structures shared across blueprints.

pub mod constants;
pub mod errors;
pub mod events;
pub mod fee_contract;
pub mod fee_gate;
pub mod fee_ledger;
pub mod fee_router;
pub mod fee_sync;
pub mod native_application;
pub mod shared_structs;
