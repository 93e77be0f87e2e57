//! Account-to-account transfers
//!
//! # Flow
//!
//! ```text
//! TransferService::transfer(source, destination, "100.12345")
//!   ├─ parse amount (exact, 5 fractional digits max)
//!   ├─ read source + destination (no locks, versions remembered)
//!   ├─ validate balance and floors
//!   └─ begin ─ append record ─ debit (CAS) ─ credit (CAS) ─ commit
//! ```
//!
//! # Safety Invariants
//!
//! 1. **All-or-nothing**: the record and both balance writes commit together or not at all
//! 2. **Optimistic versions**: every balance write is conditioned on the version read earlier
//! 3. **Conservation**: a committed transfer leaves the sum of balances unchanged
//! 4. **No auto-retry**: a version conflict is returned to the caller as retryable

pub mod error;
pub mod limits;
pub mod service;

pub use error::TransferError;
pub use limits::TransferLimits;
pub use service::TransferService;
