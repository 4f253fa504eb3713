//! CLI commands and handlers
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::application::context::{AppContext, NotificationKind};
use crate::application::services::{DashboardService, Eligibility, WriteOutcome};
use crate::domain::pool::{PoolAnalyzer, PoolSetView};
use crate::domain::staking::{StakingContract, TokenContract};
use crate::infrastructure::blockchain::{EvmStakingContract, EvmTokenContract, JsonRpcClient};
use crate::report::DashboardReport;
use crate::shared::config::{parse_address, Config, ConfigLoader};
use crate::shared::errors::AppError;
use crate::shared::types::format_units;
use crate::shared::utils::{format_utc_date_time, short_hex, unix_now_millis, NOT_AVAILABLE};

#[derive(Parser)]
#[command(name = "stakeboard")]
#[command(version, about = "Staking pool dashboard for an EVM staking contract")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint (overrides config)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Staking contract address (overrides config)
    #[arg(long, global = true)]
    pub staking: Option<String>,

    /// Staked token address (overrides config)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Connected account; writes are signed by the RPC endpoint for it
    #[arg(long, global = true)]
    pub account: Option<String>,

    /// Read at most this many pools
    #[arg(long, global = true)]
    pub max_pools: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all pools with yield, TVL and active totals
    Pools {
        /// Print a JSON report instead of a table
        #[arg(long)]
        json: bool,

        /// Keep refreshing until interrupted
        #[arg(short, long)]
        watch: bool,

        /// Refresh interval in seconds (defaults to config)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Show a single pool with the account's stake record
    Pool { id: u64 },

    /// Check whether an amount can be staked in a pool
    CheckStake { pool: u64, amount: String },

    /// Check whether an amount can be unstaked from a pool
    CheckUnstake { pool: u64, amount: String },

    /// Approve and stake an amount in a pool
    Stake { pool: u64, amount: String },

    /// Unstake an amount from a pool
    Unstake { pool: u64, amount: String },

    /// Claim pending rewards from a pool
    Claim { pool: u64 },

    /// Ask the contract which pool pays most for an amount
    BestPool { amount: String },

    /// Create a new pool
    AddPool {
        /// Reward per second, token units
        #[arg(long)]
        reward_per_second: String,

        /// Minimum stake, token units
        #[arg(long)]
        min_stake: String,

        /// End time, unix seconds
        #[arg(long)]
        end_time: u64,
    },

    /// Show endpoint, contracts and token metadata
    Info,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied
    pub fn resolve_config(&self) -> Result<Config, AppError> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load_config(path)?,
            None => Config::default(),
        };

        if let Some(url) = &self.rpc_url {
            config.rpc.url = url.clone();
        }
        if let Some(staking) = &self.staking {
            config.contracts.staking = staking.clone();
        }
        if let Some(token) = &self.token {
            config.contracts.token = token.clone();
        }
        if let Some(account) = &self.account {
            config.wallet.account = Some(account.clone());
        }
        if self.max_pools.is_some() {
            config.dashboard.max_pools = self.max_pools;
        }

        config.validate()?;
        Ok(config)
    }
}

pub struct CommandExecutor {
    service: DashboardService,
    ctx: AppContext,
    rpc: Arc<JsonRpcClient>,
    config: Config,
}

impl CommandExecutor {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let timeout = Duration::from_millis(config.rpc.timeout_ms);
        let rpc = JsonRpcClient::new(config.rpc.url.clone(), timeout)
            .map_err(|e| AppError::ConfigError(format!("Failed to build RPC client: {}", e)))?;
        let rpc = Arc::new(rpc);

        let staking_address = parse_address("contracts.staking", &config.contracts.staking)?;
        let token_address = parse_address("contracts.token", &config.contracts.token)?;
        let account = config
            .wallet
            .account
            .as_deref()
            .map(|a| parse_address("wallet.account", a))
            .transpose()?;

        let staking: Arc<dyn StakingContract> =
            Arc::new(EvmStakingContract::new(Arc::clone(&rpc), staking_address));
        let token: Arc<dyn TokenContract> =
            Arc::new(EvmTokenContract::new(Arc::clone(&rpc), token_address));

        Ok(Self {
            service: DashboardService::new(staking, token, account, config.dashboard.max_pools),
            ctx: AppContext::new(config.preferences.clone()),
            rpc,
            config,
        })
    }

    /// Execute the selected command
    pub async fn execute(&mut self, command: Commands) -> Result<(), AppError> {
        let result = self.run(command).await;
        self.flush_notifications();
        result
    }

    async fn run(&mut self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Pools {
                json,
                watch,
                interval,
            } => self.execute_pools_command(json, watch, interval).await,
            Commands::Pool { id } => self.execute_pool_command(id).await,
            Commands::CheckStake { pool, amount } => {
                self.execute_check_command(pool, &amount, true).await
            }
            Commands::CheckUnstake { pool, amount } => {
                self.execute_check_command(pool, &amount, false).await
            }
            Commands::Stake { pool, amount } => {
                self.service.refresh(&mut self.ctx).await?;
                let outcome = self.service.stake(&mut self.ctx, pool, &amount).await?;
                Self::print_outcome("stake", &outcome);
                Ok(())
            }
            Commands::Unstake { pool, amount } => {
                self.service.refresh(&mut self.ctx).await?;
                let outcome = self.service.unstake(&mut self.ctx, pool, &amount).await?;
                Self::print_outcome("unstake", &outcome);
                Ok(())
            }
            Commands::Claim { pool } => {
                let outcome = self.service.claim(&mut self.ctx, pool).await?;
                Self::print_outcome("claim", &outcome);
                Ok(())
            }
            Commands::BestPool { amount } => self.execute_best_pool_command(&amount).await,
            Commands::AddPool {
                reward_per_second,
                min_stake,
                end_time,
            } => {
                self.service.refresh(&mut self.ctx).await?;
                let outcome = self
                    .service
                    .add_pool(&mut self.ctx, &reward_per_second, &min_stake, end_time)
                    .await?;
                Self::print_outcome("addPool", &outcome);
                Ok(())
            }
            Commands::Info => self.execute_info_command().await,
        }
    }

    /// Execute pools command
    async fn execute_pools_command(
        &mut self,
        json: bool,
        watch: bool,
        interval: Option<u64>,
    ) -> Result<(), AppError> {
        if !watch {
            self.service.refresh(&mut self.ctx).await?;
            return self.print_pools(json);
        }

        let secs = interval.unwrap_or(self.config.dashboard.refresh_interval_secs).max(1);
        info!("👀 Watching pools every {}s, Ctrl+C to stop", secs);
        let mut ticker = tokio::time::interval(Duration::from_secs(secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // a failed refresh keeps the previous set on screen
                    if let Err(e) = self.service.refresh(&mut self.ctx).await {
                        warn!("Refresh failed, showing previous snapshot: {}", e);
                    }
                    if self.service.snapshot().is_ok() {
                        self.print_pools(json)?;
                    }
                    self.ctx.prune_expired_at(unix_now_millis());
                    self.flush_notifications();
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("🛑 Stopped watching");
                    return Ok(());
                }
            }
        }
    }

    fn print_pools(&self, json: bool) -> Result<(), AppError> {
        let set = self.service.snapshot()?;
        let view = self.service.view()?;

        if json {
            let report = DashboardReport::new(&set, view);
            let out = report
                .to_json()
                .map_err(|e| AppError::ConfigError(format!("Failed to serialize report: {}", e)))?;
            println!("{}", out);
            return Ok(());
        }

        let symbol = &set.token.symbol;
        if view.approximate {
            warn!("⚠️ Token decimals unknown, amounts assume {} decimals", view.decimals);
        }
        if let Some(balance) = set.balance {
            info!("💰 Balance: {} {}", format_units(balance, view.decimals), symbol);
        }
        Self::print_table(&view, symbol);
        Ok(())
    }

    fn print_table(view: &PoolSetView, symbol: &str) {
        info!(
            "{:>4}  {:>12}  {:>16}  {:>14}  {:>10}  {:>8}  {:>21}  {:>12}",
            "ID", "APY", "TVL", "MIN/MAX", "REWARD/S", "STATUS", "ENDS (UTC)", "YOUR STAKE"
        );
        for pool in view.pools.iter().filter(|p| p.exists) {
            info!(
                "{:>4}  {:>12}  {:>16}  {:>14}  {:>10}  {:>8}  {:>21}  {:>12}",
                pool.pool_id,
                pool.annualized_yield.to_string(),
                pool.total_value_locked,
                pool.min_max,
                pool.reward_per_second,
                if pool.is_active { "active" } else { "ended" },
                format!("{} {}", pool.end_date, pool.end_time),
                PoolAnalyzer::user_staked_label(pool),
            );
        }
        info!(
            "📊 Active pools: {} | Total staked: {} {} | Reward rate: {} {}/s",
            view.totals.active_pool_count,
            view.totals.active_total_staked,
            symbol,
            view.totals.active_total_reward_rate,
            symbol
        );
    }

    /// Execute pool command
    async fn execute_pool_command(&mut self, id: u64) -> Result<(), AppError> {
        self.service.refresh(&mut self.ctx).await?;
        let detail = self.service.pool_detail(id).await?;
        let view = &detail.view;

        info!("🏊 Pool #{}", view.pool_id);
        info!("   APY:           {}", view.annualized_yield);
        info!("   TVL:           {}", view.total_value_locked);
        info!("   Min/Max:       {}", view.min_max);
        info!("   Reward/s:      {}", view.reward_per_second);
        info!("   Status:        {}", if view.is_active { "active" } else { "ended" });
        info!("   Ends:          {} {} UTC", view.end_date, view.end_time);
        info!("   Your stake:    {}", PoolAnalyzer::user_staked_label(view));
        match detail.unlock_time {
            Some(ts) if ts > 0 => {
                let (date, time) = format_utc_date_time(ts);
                info!("   Unlocks:       {} {} UTC", date, time);
            }
            _ => info!("   Unlocks:       {}", NOT_AVAILABLE),
        }
        Ok(())
    }

    async fn execute_check_command(
        &mut self,
        pool: u64,
        amount: &str,
        stake: bool,
    ) -> Result<(), AppError> {
        self.service.refresh(&mut self.ctx).await?;
        let eligibility: Eligibility = if stake {
            self.service.check_stake(pool, amount)?
        } else {
            self.service.check_unstake(pool, amount)?
        };
        let action = if stake { "stake" } else { "unstake" };
        match eligibility {
            Ok(units) => {
                let decimals = self.service.snapshot()?.token.decimals;
                let value = decimals.value().map_or_else(
                    || units.to_string(),
                    |d| format_units(units, d),
                );
                info!("✅ Can {} {} in pool {}", action, value, pool)
            }
            Err(reason) => info!("❌ Cannot {} {} in pool {}: {}", action, amount, pool, reason),
        }
        Ok(())
    }

    async fn execute_best_pool_command(&mut self, amount: &str) -> Result<(), AppError> {
        self.service.refresh(&mut self.ctx).await?;
        let decimals = self.service.view()?.decimals;
        match self.service.best_pool(&mut self.ctx, amount).await? {
            Some(best) => info!(
                "🏆 Best pool for {}: #{} (max reward {})",
                amount,
                best.pool_id,
                format_units(best.max_reward, decimals)
            ),
            None => info!("Enter an amount greater than zero"),
        }
        Ok(())
    }

    async fn execute_info_command(&mut self) -> Result<(), AppError> {
        info!("🌐 RPC:      {}", self.rpc.url());
        match self.rpc.chain_id().await {
            Ok(id) => info!("   Chain ID: {}", id),
            Err(e) => error!("   ❌ Chain ID unavailable: {}", e),
        }
        info!("📜 Staking:  {}", self.config.contracts.staking);
        info!("🪙 Token:    {}", self.config.contracts.token);
        match self.service.account() {
            Some(account) => info!("👛 Account:  {}", short_hex(&account.to_string())),
            None => info!("👛 Account:  {}", NOT_AVAILABLE),
        }

        self.service.refresh(&mut self.ctx).await?;
        let set = self.service.snapshot()?;
        info!(
            "   Symbol: {} | Decimals: {}{} | Pools: {}",
            set.token.symbol,
            set.token
                .decimals
                .value()
                .map_or_else(|| NOT_AVAILABLE.to_string(), |d| d.to_string()),
            if set.token.decimals.is_approximate() { " (fallback)" } else { "" },
            set.pools.len()
        );
        Ok(())
    }

    fn print_outcome(action: &str, outcome: &WriteOutcome) {
        match outcome {
            WriteOutcome::Submitted(hashes) => {
                for hash in hashes {
                    info!("📤 {} transaction: {}", action, hash);
                }
                info!("⏳ Submitted, not yet confirmed");
            }
            WriteOutcome::Rejected(reason) => warn!("❌ {} not submitted: {}", action, reason),
        }
    }

    fn flush_notifications(&mut self) {
        for n in self.ctx.drain_notifications() {
            match n.kind {
                NotificationKind::Error => error!("🔔 {}: {}", n.title, n.message),
                NotificationKind::Warning => warn!("🔔 {}: {}", n.title, n.message),
                NotificationKind::Success | NotificationKind::Info => {
                    info!("🔔 {}: {}", n.title, n.message)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::DEFAULT_STAKING_CONTRACT;

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = Cli::parse_from([
            "stakeboard",
            "--rpc-url",
            "http://localhost:8545",
            "--account",
            "0x00000000000000000000000000000000000000aa",
            "pools",
            "--json",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.rpc.url, "http://localhost:8545");
        assert_eq!(config.contracts.staking, DEFAULT_STAKING_CONTRACT);
        assert!(config.wallet.account.is_some());
        assert!(matches!(cli.command, Commands::Pools { json: true, watch: false, .. }));
    }

    #[test]
    fn test_cli_rejects_bad_address() {
        let cli = Cli::parse_from(["stakeboard", "--staking", "0x1234", "info"]);
        assert!(matches!(cli.resolve_config(), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from(["stakeboard", "stake", "2", "150", "--max-pools", "5"]);
        assert_eq!(cli.max_pools, Some(5));
        match cli.command {
            Commands::Stake { pool, amount } => {
                assert_eq!(pool, 2);
                assert_eq!(amount, "150");
            }
            _ => panic!("expected stake"),
        }
    }
}
