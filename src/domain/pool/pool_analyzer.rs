//! Pool aggregation and yield estimation

use alloy_primitives::U256;

use super::{ActiveTotals, AnnualYield, PoolSetView, PoolSnapshot, PoolView};
use crate::shared::types::{format_units, to_human_f64, Decimals};
use crate::shared::utils::{format_utc_date_time, to_fixed2, NOT_AVAILABLE};

pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 3600;

/// Derives display fields and active-pool totals from snapshots.
///
/// Pure: the caller supplies `now`, nothing is fetched or cached.
pub struct PoolAnalyzer;

impl PoolAnalyzer {
    /// Analyze a full batch of snapshots.
    ///
    /// Returns `None` while decimals are still pending.
    pub fn analyze(
        snapshots: &[PoolSnapshot],
        decimals: Decimals,
        now: u64,
    ) -> Option<PoolSetView> {
        let d = decimals.value()?;

        let pools = snapshots
            .iter()
            .map(|snapshot| Self::analyze_pool(snapshot, d, now))
            .collect();

        Some(PoolSetView {
            pools,
            totals: Self::active_totals(snapshots, d, now),
            decimals: d,
            approximate: decimals.is_approximate(),
            evaluated_at: now,
        })
    }

    pub fn analyze_pool(snapshot: &PoolSnapshot, decimals: u8, now: u64) -> PoolView {
        let pool = &snapshot.pool;
        let min_stake = format_units(pool.min_stake, decimals);
        let (end_date, end_time) = format_utc_date_time(pool.end_timestamp);

        PoolView {
            pool_id: snapshot.pool_id,
            annualized_yield: Self::annualized_yield(
                pool.reward_per_second,
                pool.total_staked,
                decimals,
            ),
            total_value_locked: format_units(pool.total_staked, decimals),
            min_max: format!("{}/∞", min_stake),
            min_stake,
            reward_per_second: format_units(pool.reward_per_second, decimals),
            is_active: snapshot.is_active_at(now),
            exists: pool.exists,
            end_date,
            end_time,
            user_staked: snapshot.user_staked.map(|amount| format_units(amount, decimals)),
        }
    }

    /// `rewardPerSecond * SECONDS_PER_YEAR / totalStaked * 100`, both sides in
    /// human units
    pub fn annualized_yield(
        reward_per_second: U256,
        total_staked: U256,
        decimals: u8,
    ) -> AnnualYield {
        if total_staked.is_zero() {
            return AnnualYield::Unbounded;
        }
        let annual_rewards = reward_per_second.saturating_mul(U256::from(SECONDS_PER_YEAR));
        let annual = to_human_f64(annual_rewards, decimals);
        let staked = to_human_f64(total_staked, decimals);
        if staked <= 0.0 {
            // below f64 resolution, treat like an empty pool
            return AnnualYield::Unbounded;
        }
        AnnualYield::Percent(annual / staked * 100.0)
    }

    pub fn active_totals(snapshots: &[PoolSnapshot], decimals: u8, now: u64) -> ActiveTotals {
        let (count, staked, rate) = snapshots
            .iter()
            .filter(|s| s.is_active_at(now))
            .fold((0usize, U256::ZERO, U256::ZERO), |(count, staked, rate), s| {
                (
                    count + 1,
                    staked.saturating_add(s.pool.total_staked),
                    rate.saturating_add(s.pool.reward_per_second),
                )
            });

        ActiveTotals {
            active_pool_count: count,
            active_total_staked: to_fixed2(&format_units(staked, decimals)),
            active_total_reward_rate: format_units(rate, decimals),
        }
    }

    /// User stake for display, `"N/A"` without a connected account
    pub fn user_staked_label(view: &PoolView) -> &str {
        view.user_staked.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::RawPool;

    const NOW: u64 = 1_700_000_000;

    fn units(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    fn pool(reward_per_second: U256, total_staked: U256, end_timestamp: u64) -> RawPool {
        RawPool {
            reward_per_second,
            min_stake: units(100),
            end_timestamp,
            total_staked,
            acc_reward_per_share: U256::from(7u64),
            last_reward_time: U256::from(NOW - 10),
            exists: true,
        }
    }

    #[test]
    fn test_yield_matches_formula() {
        let rps = units(1) / U256::from(100u64); // 0.01 per second
        let staked = units(1_000_000);
        let expected = 0.01 * SECONDS_PER_YEAR as f64 / 1_000_000.0 * 100.0;

        match PoolAnalyzer::annualized_yield(rps, staked, 18) {
            AnnualYield::Percent(p) => assert!((p - expected).abs() < 1e-9, "got {}", p),
            other => panic!("expected percent, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_stake_is_unbounded() {
        let y = PoolAnalyzer::annualized_yield(U256::from(1000u64), U256::ZERO, 18);
        assert!(y.is_unbounded());
        assert_eq!(y.to_string(), "∞");

        let y = PoolAnalyzer::annualized_yield(U256::ZERO, U256::ZERO, 0);
        assert!(y.is_unbounded());
    }

    #[test]
    fn test_empty_future_pool_scenario() {
        let raw = RawPool {
            reward_per_second: U256::from(1000u64),
            min_stake: U256::from(100u64),
            end_timestamp: NOW + 86_400,
            total_staked: U256::ZERO,
            acc_reward_per_share: U256::ZERO,
            last_reward_time: U256::ZERO,
            exists: true,
        };
        let view = PoolAnalyzer::analyze_pool(&PoolSnapshot::new(0, raw), 18, NOW);

        assert!(view.annualized_yield.is_unbounded());
        assert!(view.is_active);
        assert_eq!(view.min_max, "0.0000000000000001/∞");
    }

    #[test]
    fn test_active_totals_exclude_expired_pools() {
        let snapshots = vec![
            PoolSnapshot::new(0, pool(units(1), units(500), NOW - 1)),
            PoolSnapshot::new(1, pool(units(2), units(500), NOW + 3600)),
        ];

        let view = PoolAnalyzer::analyze(&snapshots, Decimals::Known(18), NOW).unwrap();
        assert_eq!(view.totals.active_pool_count, 1);
        assert_eq!(view.totals.active_total_staked, "500.00");
        assert_eq!(view.totals.active_total_reward_rate, "2");
        assert!(!view.pools[0].is_active);
        assert!(view.pools[1].is_active);
    }

    #[test]
    fn test_pool_ending_now_is_inactive() {
        let snapshot = PoolSnapshot::new(3, pool(units(1), units(10), NOW));
        assert!(!PoolAnalyzer::analyze_pool(&snapshot, 18, NOW).is_active);
        assert!(PoolAnalyzer::analyze_pool(&snapshot, 18, NOW - 1).is_active);
    }

    #[test]
    fn test_mixed_set_totals() {
        let snapshots = vec![
            PoolSnapshot::new(0, pool(units(1), units(250), NOW + 10)),
            PoolSnapshot::new(1, pool(units(1), units(1000), 0)),
            PoolSnapshot::new(2, pool(units(3), units(125), NOW + 20)),
            PoolSnapshot::new(3, pool(units(5), units(9), NOW - 20)),
        ];
        let totals = PoolAnalyzer::active_totals(&snapshots, 18, NOW);
        assert_eq!(totals.active_pool_count, 2);
        assert_eq!(totals.active_total_staked, "375.00");
        assert_eq!(totals.active_total_reward_rate, "4");
    }

    #[test]
    fn test_pending_decimals_defer_analysis() {
        let snapshots = vec![PoolSnapshot::new(0, pool(units(1), units(1), NOW + 1))];
        assert!(PoolAnalyzer::analyze(&snapshots, Decimals::Pending, NOW).is_none());
    }

    #[test]
    fn test_fallback_decimals_flagged_approximate() {
        let snapshots = vec![PoolSnapshot::new(0, pool(units(1), units(40), NOW + 1))];
        let view = PoolAnalyzer::analyze(&snapshots, Decimals::Fallback, NOW).unwrap();
        assert!(view.approximate);
        assert_eq!(view.decimals, 18);
        assert_eq!(view.pools[0].total_value_locked, "40");
    }

    #[test]
    fn test_dates_and_user_stake() {
        let snapshot = PoolSnapshot::new(0, pool(units(1), units(1), 1_709_622_489))
            .with_user_stake(units(3) / U256::from(2u64));
        let view = PoolAnalyzer::analyze_pool(&snapshot, 18, NOW);
        assert_eq!(view.end_date, "03/05/2024");
        assert_eq!(view.end_time, "07:08:09");
        assert_eq!(view.user_staked.as_deref(), Some("1.5"));

        let no_account = PoolSnapshot::new(1, pool(units(1), units(1), 0));
        let view = PoolAnalyzer::analyze_pool(&no_account, 18, NOW);
        assert_eq!(view.end_date, "N/A");
        assert_eq!(view.end_time, "N/A");
        assert_eq!(PoolAnalyzer::user_staked_label(&view), "N/A");
    }
}
