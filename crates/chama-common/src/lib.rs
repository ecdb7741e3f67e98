//! Shared domain types for the chama ledger: wallets, members, chamas,
//! and process-wide id generation.

pub mod id;
pub mod types;
