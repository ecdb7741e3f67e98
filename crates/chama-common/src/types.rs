use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who owns a wallet.
///
/// # Examples
///
/// ```
/// use chama_common::types::OwnerType;
///
/// let owner: OwnerType = "chama".parse().unwrap();
/// assert_eq!(owner, OwnerType::Chama);
/// assert_eq!(owner.to_string(), "CHAMA");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerType {
    Chama,
    Member,
}

impl std::fmt::Display for OwnerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerType::Chama => write!(f, "CHAMA"),
            OwnerType::Member => write!(f, "MEMBER"),
        }
    }
}

impl std::str::FromStr for OwnerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "CHAMA" => Ok(OwnerType::Chama),
            "MEMBER" => Ok(OwnerType::Member),
            _ => Err(format!("unknown owner type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Transfer,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Deposit => write!(f, "DEPOSIT"),
            TransactionType::Withdrawal => write!(f, "WITHDRAWAL"),
            TransactionType::Transfer => write!(f, "TRANSFER"),
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEPOSIT" => Ok(TransactionType::Deposit),
            "WITHDRAWAL" => Ok(TransactionType::Withdrawal),
            "TRANSFER" => Ok(TransactionType::Transfer),
            _ => Err(format!("unknown transaction type: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Pending => write!(f, "PENDING"),
            TransactionStatus::Completed => write!(f, "COMPLETED"),
            TransactionStatus::Failed => write!(f, "FAILED"),
        }
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(TransactionStatus::Pending),
            "COMPLETED" => Ok(TransactionStatus::Completed),
            "FAILED" => Ok(TransactionStatus::Failed),
            _ => Err(format!("unknown transaction status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TransactionStatus,
}

/// A balance-holding account owned by a chama or a single member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub balance: f64,
    /// ISO currency code, e.g. "KES"
    pub currency: String,
    pub owner_id: String,
    pub owner_type: OwnerType,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Admin,
    Member,
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberRole::Admin => write!(f, "ADMIN"),
            MemberRole::Member => write!(f, "MEMBER"),
        }
    }
}

impl std::str::FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(MemberRole::Admin),
            "MEMBER" => Ok(MemberRole::Member),
            _ => Err(format!("unknown member role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    /// Phone number in E.164 form, used by SMS delivery
    #[serde(default)]
    pub phone: Option<String>,
    /// Nostr public key
    #[serde(default)]
    pub npub: Option<String>,
    #[serde(default)]
    pub role: Option<MemberRole>,
    pub joined_at: DateTime<Utc>,
    #[serde(default)]
    pub verified: bool,
}

impl Member {
    /// The first reachable contact channel: phone, then npub.
    ///
    /// # Examples
    ///
    /// ```
    /// use chama_common::types::Member;
    ///
    /// let mut member = Member::new("m1", "Wanjiku");
    /// assert_eq!(member.contact(), None);
    /// member.npub = Some("npub1xyz".into());
    /// assert_eq!(member.contact(), Some("npub1xyz"));
    /// member.phone = Some("+254700000001".into());
    /// assert_eq!(member.contact(), Some("+254700000001"));
    /// ```
    pub fn contact(&self) -> Option<&str> {
        self.phone.as_deref().or(self.npub.as_deref())
    }

    /// A bare unverified member with no contact details.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: None,
            npub: None,
            role: None,
            joined_at: Utc::now(),
            verified: false,
        }
    }
}

/// A member-owned savings group with one linked wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chama {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<Member>,
    pub wallet_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_round_trip_through_serde() {
        let json = serde_json::to_string(&TransactionType::Withdrawal).unwrap();
        assert_eq!(json, "\"WITHDRAWAL\"");
        let parsed: MemberRole = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(parsed, MemberRole::Admin);
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("pending".parse::<TransactionStatus>(), Ok(TransactionStatus::Pending));
        assert_eq!("Member".parse::<OwnerType>(), Ok(OwnerType::Member));
        assert!("savings".parse::<OwnerType>().is_err());
    }

    #[test]
    fn member_defaults_fill_optional_fields() {
        let member: Member = serde_json::from_str(
            r#"{"id":"m1","name":"Akinyi","joined_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(member.phone.is_none());
        assert!(!member.verified);
        assert_eq!(member.contact(), None);
    }
}
