use anyhow::Context;
use chama_common::types::{Chama, Wallet};
use chama_store::{InMemoryChamaStore, InMemoryWalletStore};
use serde::{Deserialize, Serialize};

/// Wallets and chamas loaded into the in-memory stores at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub wallets: Vec<Wallet>,
    #[serde(default)]
    pub chamas: Vec<Chama>,
}

pub fn load_seed_file(path: &str) -> anyhow::Result<SeedFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file '{path}'"))?;
    let seed: SeedFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse seed file '{path}'"))?;
    Ok(seed)
}

/// Insert every seeded record, replacing records with the same id.
/// Returns `(wallets, chamas)` inserted.
pub fn apply_seed(
    seed: SeedFile,
    wallets: &InMemoryWalletStore,
    chamas: &InMemoryChamaStore,
) -> (usize, usize) {
    let wallet_count = seed.wallets.len();
    let chama_count = seed.chamas.len();

    for wallet in seed.wallets {
        tracing::debug!(wallet_id = %wallet.id, currency = %wallet.currency, "Seeding wallet");
        wallets.seed_wallet(wallet);
    }
    for chama in seed.chamas {
        if chama.members.is_empty() {
            tracing::warn!(chama_id = %chama.id, "Seeded chama has no members");
        }
        chamas.seed_chama(chama);
    }

    tracing::info!(
        wallets = wallet_count,
        chamas = chama_count,
        "Seed data loaded"
    );
    (wallet_count, chama_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chama_store::{ChamaStore, WalletStore};

    const SEED: &str = r#"{
        "wallets": [{
            "id": "W1",
            "balance": 150000,
            "currency": "KES",
            "owner_id": "C1",
            "owner_type": "CHAMA",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }],
        "chamas": [{
            "id": "C1",
            "name": "Umoja Savings",
            "wallet_id": "W1",
            "members": [
                { "id": "m1", "name": "Achieng", "phone": "+254700000001", "role": "ADMIN",
                  "joined_at": "2024-01-01T00:00:00Z", "verified": true },
                { "id": "m2", "name": "Baraka", "joined_at": "2024-01-02T00:00:00Z" }
            ],
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }]
    }"#;

    #[tokio::test]
    async fn seed_populates_stores() {
        let seed: SeedFile = serde_json::from_str(SEED).unwrap();
        let wallets = InMemoryWalletStore::new();
        let chamas = InMemoryChamaStore::new();

        assert_eq!(apply_seed(seed, &wallets, &chamas), (1, 1));

        let wallet = wallets.get_wallet("W1").await.unwrap().unwrap();
        assert_eq!(wallet.balance, 150000.0);
        assert!(wallet.transactions.is_empty());

        let members = chamas.members_of_wallet("W1").await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].contact(), Some("+254700000001"));
        assert!(!members[1].verified);
    }

    #[test]
    fn empty_seed_is_valid() {
        let seed: SeedFile = serde_json::from_str("{}").unwrap();
        assert!(seed.wallets.is_empty());
        assert!(seed.chamas.is_empty());
    }
}
