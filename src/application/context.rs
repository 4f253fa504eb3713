//! Application context - notifications, loading flags, transaction history
//! and user preferences.
//!
//! Created once at startup and handed to command handlers. The pool analyzer
//! and eligibility checks never see it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::config::StakingPreferences;
use crate::shared::utils::{generate_id, unix_now_millis};

pub const DEFAULT_NOTIFICATION_MS: u64 = 5_000;
pub const ERROR_TTL_MS: u64 = 10_000;
pub const MAX_TRANSACTIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Zero keeps the notification until removed
    pub duration_ms: u64,
    pub timestamp_ms: u64,
}

impl Notification {
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        self.duration_ms != 0 && now_ms >= self.timestamp_ms.saturating_add(self.duration_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Stake,
    Unstake,
    Claim,
    Approve,
    AddPool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub hash: String,
    pub kind: TxKind,
    pub pool_id: Option<u64>,
    /// Human units as entered
    pub amount: String,
    pub status: TxStatus,
    pub timestamp_ms: u64,
    pub block_number: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadingKey {
    Global,
    Staking,
    Claiming,
    Connecting,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingFlags {
    pub global: bool,
    pub staking: bool,
    pub claiming: bool,
    pub connecting: bool,
}

#[derive(Debug, Clone)]
struct ErrorEntry {
    message: String,
    set_at_ms: u64,
}

pub struct AppContext {
    notifications: Vec<Notification>,
    error: Option<ErrorEntry>,
    loading: LoadingFlags,
    transactions: Vec<TransactionRecord>,
    recent_activity: HashMap<TxKind, TransactionRecord>,
    preferences: StakingPreferences,
    initial_preferences: StakingPreferences,
    stake_amount: String,
    best_pool_id: Option<u64>,
    quick_stake_amounts: Vec<u64>,
}

impl AppContext {
    pub fn new(preferences: StakingPreferences) -> Self {
        Self {
            notifications: Vec::new(),
            error: None,
            loading: LoadingFlags::default(),
            transactions: Vec::new(),
            recent_activity: HashMap::new(),
            initial_preferences: preferences.clone(),
            preferences,
            stake_amount: String::new(),
            best_pool_id: None,
            quick_stake_amounts: vec![100, 500, 1000, 5000],
        }
    }

    // notifications

    pub fn add_notification(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        duration_ms: Option<u64>,
    ) -> String {
        let id = generate_id();
        self.notifications.push(Notification {
            id: id.clone(),
            kind,
            title: title.into(),
            message: message.into(),
            duration_ms: duration_ms.unwrap_or(DEFAULT_NOTIFICATION_MS),
            timestamp_ms: unix_now_millis(),
        });
        id
    }

    pub fn notify(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> String {
        self.add_notification(kind, title, message, None)
    }

    pub fn remove_notification(&mut self, id: &str) {
        self.notifications.retain(|n| n.id != id);
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }

    pub fn prune_expired_at(&mut self, now_ms: u64) {
        self.notifications.retain(|n| !n.is_expired_at(now_ms));
        if let Some(entry) = &self.error {
            if now_ms >= entry.set_at_ms.saturating_add(ERROR_TTL_MS) {
                self.error = None;
            }
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Hand all pending notifications to the caller
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // error

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(ErrorEntry {
            message: message.into(),
            set_at_ms: unix_now_millis(),
        });
    }

    /// Current error, `None` once its TTL has passed even before a prune
    pub fn error(&self) -> Option<&str> {
        self.error_at(unix_now_millis())
    }

    pub fn error_at(&self, now_ms: u64) -> Option<&str> {
        self.error
            .as_ref()
            .filter(|e| now_ms < e.set_at_ms.saturating_add(ERROR_TTL_MS))
            .map(|e| e.message.as_str())
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // loading

    pub fn set_loading(&mut self, key: LoadingKey, value: bool) {
        match key {
            LoadingKey::Global => self.loading.global = value,
            LoadingKey::Staking => self.loading.staking = value,
            LoadingKey::Claiming => self.loading.claiming = value,
            LoadingKey::Connecting => self.loading.connecting = value,
        }
    }

    pub fn loading(&self) -> &LoadingFlags {
        &self.loading
    }

    // transactions

    /// Newest first, capped at `MAX_TRANSACTIONS`
    pub fn add_transaction(&mut self, record: TransactionRecord) {
        self.recent_activity.insert(record.kind, record.clone());
        self.transactions.insert(0, record);
        self.transactions.truncate(MAX_TRANSACTIONS);
    }

    pub fn update_transaction(
        &mut self,
        hash: &str,
        status: TxStatus,
        block_number: Option<u64>,
    ) -> bool {
        match self.transactions.iter_mut().find(|tx| tx.hash == hash) {
            Some(tx) => {
                tx.status = status;
                if block_number.is_some() {
                    tx.block_number = block_number;
                }
                true
            }
            None => false,
        }
    }

    pub fn remove_transaction(&mut self, hash: &str) {
        self.transactions.retain(|tx| tx.hash != hash);
    }

    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
    }

    pub fn transactions(&self) -> &[TransactionRecord] {
        &self.transactions
    }

    pub fn recent_activity(&self, kind: TxKind) -> Option<&TransactionRecord> {
        self.recent_activity.get(&kind)
    }

    // preferences

    pub fn preferences(&self) -> &StakingPreferences {
        &self.preferences
    }

    pub fn update_preferences(&mut self, update: impl FnOnce(&mut StakingPreferences)) {
        update(&mut self.preferences);
    }

    pub fn reset_preferences(&mut self) {
        self.preferences = self.initial_preferences.clone();
    }

    // form state

    pub fn set_stake_amount(&mut self, amount: impl Into<String>) {
        self.stake_amount = amount.into();
    }

    pub fn stake_amount(&self) -> &str {
        &self.stake_amount
    }

    pub fn clear_stake_amount(&mut self) {
        self.stake_amount.clear();
    }

    pub fn set_best_pool_id(&mut self, pool_id: Option<u64>) {
        self.best_pool_id = pool_id;
    }

    pub fn best_pool_id(&self) -> Option<u64> {
        self.best_pool_id
    }

    pub fn quick_stake_amounts(&self) -> &[u64] {
        &self.quick_stake_amounts
    }

    pub fn add_quick_stake_amount(&mut self, amount: u64) {
        self.quick_stake_amounts.push(amount);
        self.quick_stake_amounts.sort_unstable();
    }

    pub fn remove_quick_stake_amount(&mut self, amount: u64) {
        self.quick_stake_amounts.retain(|a| *a != amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hash: &str, kind: TxKind) -> TransactionRecord {
        TransactionRecord {
            hash: hash.to_string(),
            kind,
            pool_id: Some(0),
            amount: "1".to_string(),
            status: TxStatus::Pending,
            timestamp_ms: 0,
            block_number: None,
        }
    }

    #[test]
    fn test_notification_expiry() {
        let mut ctx = AppContext::new(StakingPreferences::default());
        ctx.add_notification(NotificationKind::Info, "short", "", Some(1_000));
        ctx.add_notification(NotificationKind::Error, "sticky", "", Some(0));
        let id = ctx.notify(NotificationKind::Success, "default", "");
        assert_eq!(ctx.notifications().len(), 3);

        let added = ctx.notifications()[0].timestamp_ms;
        ctx.prune_expired_at(added + 1_000);
        let titles: Vec<&str> = ctx.notifications().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["sticky", "default"]);

        ctx.remove_notification(&id);
        assert_eq!(ctx.notifications().len(), 1);
        ctx.prune_expired_at(u64::MAX);
        assert_eq!(ctx.notifications().len(), 1);
    }

    #[test]
    fn test_error_auto_clears() {
        let mut ctx = AppContext::new(StakingPreferences::default());
        ctx.set_error("rpc down");
        assert_eq!(ctx.error(), Some("rpc down"));
        let now = unix_now_millis();
        ctx.prune_expired_at(now + ERROR_TTL_MS + 1);
        assert!(ctx.error().is_none());
    }

    #[test]
    fn test_expired_error_is_hidden_without_prune() {
        let mut ctx = AppContext::new(StakingPreferences::default());
        let now = unix_now_millis();
        ctx.set_error("rpc down");
        assert_eq!(ctx.error_at(now), Some("rpc down"));
        assert!(ctx.error_at(now + 2 * ERROR_TTL_MS).is_none());
    }

    #[test]
    fn test_transaction_history_is_capped_newest_first() {
        let mut ctx = AppContext::new(StakingPreferences::default());
        for i in 0..(MAX_TRANSACTIONS + 5) {
            ctx.add_transaction(record(&format!("0x{:x}", i), TxKind::Stake));
        }
        assert_eq!(ctx.transactions().len(), MAX_TRANSACTIONS);
        assert_eq!(ctx.transactions()[0].hash, format!("0x{:x}", MAX_TRANSACTIONS + 4));
        assert_eq!(
            ctx.recent_activity(TxKind::Stake).map(|t| t.hash.clone()),
            Some(format!("0x{:x}", MAX_TRANSACTIONS + 4))
        );
        assert!(ctx.recent_activity(TxKind::Claim).is_none());
    }

    #[test]
    fn test_update_transaction() {
        let mut ctx = AppContext::new(StakingPreferences::default());
        ctx.add_transaction(record("0x1", TxKind::Claim));
        assert!(ctx.update_transaction("0x1", TxStatus::Success, Some(42)));
        assert!(!ctx.update_transaction("0x2", TxStatus::Failed, None));
        assert_eq!(ctx.transactions()[0].status, TxStatus::Success);
        assert_eq!(ctx.transactions()[0].block_number, Some(42));
        ctx.remove_transaction("0x1");
        assert!(ctx.transactions().is_empty());
    }

    #[test]
    fn test_preferences_and_quick_amounts() {
        let mut ctx = AppContext::new(StakingPreferences::default());
        ctx.update_preferences(|p| p.auto_approve = true);
        assert!(ctx.preferences().auto_approve);
        ctx.reset_preferences();
        assert!(!ctx.preferences().auto_approve);

        ctx.add_quick_stake_amount(250);
        assert_eq!(ctx.quick_stake_amounts(), &[100, 250, 500, 1000, 5000]);
        ctx.remove_quick_stake_amount(100);
        assert_eq!(ctx.quick_stake_amounts(), &[250, 500, 1000, 5000]);
    }

    #[test]
    fn test_loading_flags() {
        let mut ctx = AppContext::new(StakingPreferences::default());
        ctx.set_loading(LoadingKey::Claiming, true);
        assert!(ctx.loading().claiming);
        assert!(!ctx.loading().staking);
        ctx.set_loading(LoadingKey::Claiming, false);
        assert_eq!(ctx.loading(), &LoadingFlags::default());
    }
}
