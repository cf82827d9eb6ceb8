//! Protocol constants for the application fee gate.

/// Grace window used when an application does not pick one: the prior fee is only
/// honoured in the epoch of the resync itself.
pub const DEFAULT_GRACE_EPOCHS: u64 = 0;

/// Upper bound on the grace window an application may configure.
pub const MAX_GRACE_EPOCHS: u64 = 10;

/// Refreshes requested from the fee source during one resync before giving up.
pub const MAX_REFRESH_ATTEMPTS: u32 = 2;

/// Method the fee contract calls on its price oracle when none is configured explicitly.
pub const DEFAULT_ORACLE_METHOD: &str = "get_price";
