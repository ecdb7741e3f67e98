pub mod wallet_balance;

pub use wallet_balance::WalletBalanceNotification;
