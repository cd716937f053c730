// crates/metapool-core/src/lib.rs
//
// metapool-core: Core types, traits, and fixed-point amounts for the
// Meta Pool liquid-staking engine.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the contract/account snapshots, epoch boundaries, the error
// type, and the read-only collaborator interfaces the engine consumes.

pub mod amount;
pub mod epoch;
pub mod error;
pub mod state;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use metapool_core::Yocto;`

// Amounts
pub use amount::{mul_div_floor, Yocto, BASIS_POINTS_DENOMINATOR, NEAR_DECIMALS, YOCTO_PER_NEAR};

// Epoch types
pub use epoch::{EpochInfo, TimingEstimate, DEFAULT_EPOCH_DURATION_MS, MS_PER_HOUR};

// Snapshots
pub use state::{AccountInfo, ContractState};

// Error type
pub use error::MetaPoolError;

// Traits
pub use traits::{AccountBalanceReader, ContractStateReader, EpochSource, UnstakingDelayOracle};
