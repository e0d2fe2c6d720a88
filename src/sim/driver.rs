use super::execution::{liquidation_trade, ExecutionSimulator, FLAT_TOLERANCE};
use super::metrics::MetricsAccumulator;
use crate::config::StrategyConfig;
use crate::errors::Result;
use crate::strategy::quoting::QuoteEngine;
use crate::strategy::risk::RiskStateMachine;
use crate::strategy::signal::AlphaSignal;
use crate::strategy::state::StrategyState;
use crate::strategy::types::{MarketObservation, PerformanceReport, StepRecord};

/// Terminal output of a run: the per-step record stream, the final
/// scorecard (absent for runs shorter than two steps) and how it ended.
#[derive(Clone, Debug)]
pub struct BacktestReport {
    pub records: Vec<StepRecord>,
    pub report: Option<PerformanceReport>,
    pub stopped: bool,
    pub steps: usize,
}

/// Sequential per-step orchestrator: risk check, quote, execution, metrics,
/// termination. Owns all mutable run state; one driver per run.
pub struct SimulationDriver {
    engine: QuoteEngine,
    risk: RiskStateMachine,
    execution: ExecutionSimulator,
    state: StrategyState,
    metrics: MetricsAccumulator,
}

impl SimulationDriver {
    pub fn new(cfg: StrategyConfig, alpha: AlphaSignal, execution: ExecutionSimulator) -> Self {
        let risk = RiskStateMachine::new(&cfg);
        let state = StrategyState::new(&cfg);
        Self {
            engine: QuoteEngine::new(cfg, alpha),
            risk,
            execution,
            state,
            metrics: MetricsAccumulator::new(),
        }
    }

    pub fn state(&self) -> &StrategyState {
        &self.state
    }

    /// Consumes observations in order until they run out or the risk stop
    /// has triggered and the position is flat.
    pub fn run<I>(mut self, observations: I) -> Result<BacktestReport>
    where
        I: IntoIterator<Item = MarketObservation>,
    {
        let mut records = Vec::new();
        tracing::info!("simulation run starting");

        for (step, obs) in observations.into_iter().enumerate() {
            self.risk.evaluate(&mut self.state, obs.mid);
            let quote = self.engine.quotes(&mut self.state, &obs)?;

            if !self.state.is_stopped() {
                if let Some(event) = self.execution.match_quote(&quote, &obs) {
                    self.state.on_trade(&event);
                }
            }

            let mut pnl = self.state.net_pnl(obs.mid);
            if self.state.is_stopped() {
                if let Some(event) = liquidation_trade(self.state.inventory, obs.mid) {
                    self.state.on_trade(&event);
                    self.state.flatten();
                    pnl = self.state.net_pnl(obs.mid);
                    tracing::info!(step, pnl, "forced liquidation flattened inventory");
                }
            }

            self.metrics.observe(pnl);
            records.push(StepRecord {
                step,
                mid: obs.mid,
                bid: quote.bid,
                ask: quote.ask,
                inventory: self.state.inventory,
                pnl,
            });

            if self.state.is_stopped() && self.state.inventory.abs() <= FLAT_TOLERANCE {
                tracing::info!(step, "run terminated by risk stop");
                break;
            }
        }

        let steps = records.len();
        let stopped = self.state.is_stopped();
        let report = self.metrics.report();
        tracing::info!(steps, stopped, "simulation run finished");
        Ok(BacktestReport {
            records,
            report,
            stopped,
            steps,
        })
    }
}
