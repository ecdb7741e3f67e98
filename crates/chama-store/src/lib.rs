//! Wallet and membership lookups consumed by the rule engine.
//!
//! The engine only ever reads through [`WalletStore`] and [`ChamaStore`];
//! the in-memory implementations in [`memory`] back development setups and
//! tests. A document-database backend would implement the same traits.

pub mod error;
pub mod memory;


pub use error::{Result, StorageError};
pub use memory::{InMemoryChamaStore, InMemoryWalletStore};

use async_trait::async_trait;
use chama_common::types::{Member, Wallet};

/// Read access to wallets.
///
/// Implementations must be safe to share across threads because scheduled
/// rules look wallets up from independent Tokio tasks.
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Returns the wallet with the given id, or `None` if it does not exist.
    /// Must not mutate the wallet.
    async fn get_wallet(&self, wallet_id: &str) -> Result<Option<Wallet>>;
}

/// Read access to chama membership.
#[async_trait]
pub trait ChamaStore: Send + Sync {
    /// Returns the roster of the chama linked to `wallet_id`, in join order.
    /// An unknown wallet yields an empty roster, not an error.
    async fn members_of_wallet(&self, wallet_id: &str) -> Result<Vec<Member>>;
}
