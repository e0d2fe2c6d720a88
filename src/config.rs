use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, fs, path::Path};

use crate::strategy::sizing::MIN_ORDER_QTY;

/// Strategy constants supplied at construction. Immutable for the life of a
/// run; every engine component copies or borrows what it needs from here.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    #[serde(default = "default_kappa")]
    pub kappa: f64,
    #[serde(default = "default_stop_loss_limit")]
    pub stop_loss_limit: f64,
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,
    #[serde(default = "default_slippage_rate")]
    pub slippage_rate: f64,
    #[serde(default = "default_max_inventory")]
    pub max_inventory: f64,
    #[serde(default = "default_kelly_fraction")]
    pub kelly_fraction: f64,
    #[serde(default = "default_win_rate")]
    pub win_rate: f64,
    #[serde(default = "default_profit_factor")]
    pub profit_factor: f64,
    #[serde(default = "default_profit_lock_threshold")]
    pub profit_lock_threshold: f64,
    #[serde(default = "default_drawdown_limit")]
    pub drawdown_limit: f64,
    #[serde(default = "default_momentum_threshold")]
    pub momentum_threshold: f64,
    #[serde(default = "default_alpha_weight")]
    pub alpha_weight: f64,
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,
}

fn default_gamma() -> f64 {
    0.1
}

fn default_sigma() -> f64 {
    0.002
}

fn default_kappa() -> f64 {
    1.5
}

fn default_stop_loss_limit() -> f64 {
    -50.0
}

fn default_commission_rate() -> f64 {
    0.0005
}

fn default_slippage_rate() -> f64 {
    0.0001
}

fn default_max_inventory() -> f64 {
    0.03
}

fn default_kelly_fraction() -> f64 {
    0.20
}

fn default_win_rate() -> f64 {
    0.4631
}

fn default_profit_factor() -> f64 {
    1.25
}

fn default_profit_lock_threshold() -> f64 {
    10.0
}

fn default_drawdown_limit() -> f64 {
    0.20
}

fn default_momentum_threshold() -> f64 {
    0.0015
}

fn default_alpha_weight() -> f64 {
    0.8
}

fn default_initial_balance() -> f64 {
    10_000.0
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            gamma: default_gamma(),
            sigma: default_sigma(),
            kappa: default_kappa(),
            stop_loss_limit: default_stop_loss_limit(),
            commission_rate: default_commission_rate(),
            slippage_rate: default_slippage_rate(),
            max_inventory: default_max_inventory(),
            kelly_fraction: default_kelly_fraction(),
            win_rate: default_win_rate(),
            profit_factor: default_profit_factor(),
            profit_lock_threshold: default_profit_lock_threshold(),
            drawdown_limit: default_drawdown_limit(),
            momentum_threshold: default_momentum_threshold(),
            alpha_weight: default_alpha_weight(),
            initial_balance: default_initial_balance(),
        }
    }
}

impl StrategyConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data =
            fs::read_to_string(path.as_ref()).with_context(|| "Failed to read config file")?;
        let raw: toml::Value =
            toml::from_str(&data).with_context(|| "Failed to parse TOML config")?;
        // Support a nested [strategy] table or top-level entries.
        let table = match raw.get("strategy").and_then(|v| v.as_table()).cloned() {
            Some(table) => table,
            None => raw
                .try_into()
                .map_err(|_| anyhow::anyhow!("Invalid strategy config structure"))?,
        };
        let mut cfg: StrategyConfig = toml::from_str(&toml::to_string(&table)?)?;
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        // Each field can be overridden by `MM_*` env vars.
        override_f64("MM_GAMMA", &mut self.gamma);
        override_f64("MM_SIGMA", &mut self.sigma);
        override_f64("MM_KAPPA", &mut self.kappa);
        override_f64("MM_STOP_LOSS_LIMIT", &mut self.stop_loss_limit);
        override_f64("MM_COMMISSION_RATE", &mut self.commission_rate);
        override_f64("MM_SLIPPAGE_RATE", &mut self.slippage_rate);
        override_f64("MM_MAX_INVENTORY", &mut self.max_inventory);
        override_f64("MM_KELLY_FRACTION", &mut self.kelly_fraction);
        override_f64("MM_WIN_RATE", &mut self.win_rate);
        override_f64("MM_PROFIT_FACTOR", &mut self.profit_factor);
        override_f64("MM_PROFIT_LOCK_THRESHOLD", &mut self.profit_lock_threshold);
        override_f64("MM_DRAWDOWN_LIMIT", &mut self.drawdown_limit);
        override_f64("MM_MOMENTUM_THRESHOLD", &mut self.momentum_threshold);
        override_f64("MM_ALPHA_WEIGHT", &mut self.alpha_weight);
        override_f64("MM_INITIAL_BALANCE", &mut self.initial_balance);
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.gamma > 0.0 && self.gamma.is_finite(),
            "gamma must be positive"
        );
        anyhow::ensure!(
            self.sigma > 0.0 && self.sigma.is_finite(),
            "sigma must be positive"
        );
        anyhow::ensure!(
            self.kappa > 0.0 && self.kappa.is_finite(),
            "kappa must be positive"
        );
        anyhow::ensure!(
            self.commission_rate >= 0.0,
            "commission_rate must be non-negative"
        );
        anyhow::ensure!(
            self.slippage_rate >= 0.0,
            "slippage_rate must be non-negative"
        );
        anyhow::ensure!(
            self.max_inventory >= MIN_ORDER_QTY,
            "max_inventory must be at least the minimum order quantity"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.kelly_fraction) && self.kelly_fraction > 0.0,
            "kelly_fraction must be within (0, 1]"
        );
        anyhow::ensure!(
            self.win_rate > 0.0 && self.win_rate < 1.0,
            "win_rate must be within (0, 1)"
        );
        anyhow::ensure!(
            self.profit_factor > 0.0,
            "profit_factor must be greater than zero"
        );
        anyhow::ensure!(
            self.drawdown_limit > 0.0 && self.drawdown_limit < 1.0,
            "drawdown_limit must be within (0, 1)"
        );
        anyhow::ensure!(
            self.momentum_threshold > 0.0,
            "momentum_threshold must be positive"
        );
        anyhow::ensure!(
            self.alpha_weight >= 0.0,
            "alpha_weight must be non-negative"
        );
        anyhow::ensure!(
            self.initial_balance > 0.0,
            "initial_balance must be positive"
        );
        Ok(())
    }
}

fn override_f64(key: &str, field: &mut f64) {
    if let Ok(value) = env::var(key) {
        if let Ok(parsed) = value.parse::<f64>() {
            *field = parsed;
        }
    }
}
