use crate::error::{Result, StorageError};
use crate::{ChamaStore, WalletStore};
use async_trait::async_trait;
use chama_common::types::{Chama, Member, OwnerType, Wallet};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

pub const DEFAULT_CURRENCY: &str = "KES";

/// Wallets kept in a process-local map.
#[derive(Default)]
pub struct InMemoryWalletStore {
    wallets: RwLock<HashMap<String, Wallet>>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty wallet with a fresh id.
    pub fn create_wallet(&self, owner_id: &str, owner_type: OwnerType, currency: &str) -> Wallet {
        let now = Utc::now();
        let wallet = Wallet {
            id: chama_common::id::next_id(),
            balance: 0.0,
            currency: currency.to_string(),
            owner_id: owner_id.to_string(),
            owner_type,
            transactions: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.write().insert(wallet.id.clone(), wallet.clone());
        tracing::debug!(wallet_id = %wallet.id, owner_id, "Wallet created");
        wallet
    }

    /// Adds `amount` (negative to debit) to the balance.
    pub fn update_balance(&self, wallet_id: &str, amount: f64) -> Result<Wallet> {
        let mut wallets = self.write();
        let wallet = wallets.get_mut(wallet_id).ok_or_else(|| StorageError::NotFound {
            entity: "wallet",
            id: wallet_id.to_string(),
        })?;
        wallet.balance += amount;
        wallet.updated_at = Utc::now();
        Ok(wallet.clone())
    }

    /// Inserts or replaces a wallet as-is.
    pub fn seed_wallet(&self, wallet: Wallet) {
        self.write().insert(wallet.id.clone(), wallet);
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Wallet>> {
        self.wallets
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Wallet>> {
        self.wallets
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn get_wallet(&self, wallet_id: &str) -> Result<Option<Wallet>> {
        Ok(self.read().get(wallet_id).cloned())
    }
}

/// Chamas kept in a process-local map, keyed by chama id.
#[derive(Default)]
pub struct InMemoryChamaStore {
    chamas: RwLock<HashMap<String, Chama>>,
}

impl InMemoryChamaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chama whose only member is `creator`.
    pub fn create_chama(
        &self,
        name: &str,
        creator: Member,
        wallet_id: &str,
        description: Option<String>,
    ) -> Chama {
        let now = Utc::now();
        let chama = Chama {
            id: chama_common::id::next_id(),
            name: name.to_string(),
            description,
            members: vec![creator],
            wallet_id: wallet_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.write().insert(chama.id.clone(), chama.clone());
        tracing::debug!(chama_id = %chama.id, wallet_id, "Chama created");
        chama
    }

    /// Appends a member to the roster. Returns false if the chama is unknown.
    pub fn add_member(&self, chama_id: &str, member: Member) -> bool {
        let mut chamas = self.write();
        let Some(chama) = chamas.get_mut(chama_id) else {
            return false;
        };
        chama.members.push(member);
        chama.updated_at = Utc::now();
        true
    }

    /// Inserts or replaces a chama as-is.
    pub fn seed_chama(&self, chama: Chama) {
        self.write().insert(chama.id.clone(), chama);
    }

    pub fn get_chama(&self, chama_id: &str) -> Option<Chama> {
        self.read().get(chama_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Chama>> {
        self.chamas
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Chama>> {
        self.chamas
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ChamaStore for InMemoryChamaStore {
    async fn members_of_wallet(&self, wallet_id: &str) -> Result<Vec<Member>> {
        // A shared wallet resolves to its oldest chama, ties broken by id.
        Ok(self
            .read()
            .values()
            .filter(|c| c.wallet_id == wallet_id)
            .min_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)))
            .map(|c| c.members.clone())
            .unwrap_or_default())
    }
}
