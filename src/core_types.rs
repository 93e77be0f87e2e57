//! Core types used throughout the ledger
//!
//! Type aliases that give the raw integer columns of the persisted schema a
//! semantic name. Both ids are BIGINT on the PostgreSQL side.

/// Account ID - externally assigned, unique, immutable after creation.
///
/// # Usage:
/// - Primary key of the `accounts` table
/// - Key of the in-memory store's account map
pub type AccountId = i64;

/// Transfer record ID - generated by the store on append.
pub type RecordId = i64;

/// Optimistic-lock version of an account row.
///
/// Starts at 1 on creation and increments by exactly 1 on every successful
/// balance mutation.
pub type Version = i64;

/// Version assigned to a freshly created account
pub const INITIAL_VERSION: Version = 1;
