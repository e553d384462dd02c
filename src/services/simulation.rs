//! Offline version of the "turn $10 into $1000" run. No exchange involved.

use rand::Rng;
use serde::Serialize;
use std::collections::VecDeque;

const SUCCESS_PROBABILITY: f64 = 0.6;
const WIN_FACTOR: f64 = 1.5;
const LOSS_FACTOR: f64 = 0.7;
const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulatedTrade {
    pub success: bool,
    pub new_amount: f64,
    pub growth_factor: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationEntry {
    pub id: u64,
    pub amount: f64,
    pub success: bool,
    pub growth_factor: f64,
}

pub fn simulate_trade<R: Rng>(amount: f64, rng: &mut R) -> SimulatedTrade {
    let success = rng.gen::<f64>() < SUCCESS_PROBABILITY;
    let growth_factor = if success { WIN_FACTOR } else { LOSS_FACTOR };
    SimulatedTrade {
        success,
        new_amount: amount * growth_factor,
        growth_factor,
    }
}

#[derive(Debug, Clone)]
pub struct Simulation {
    pub initial: f64,
    pub target: f64,
    pub current: f64,
    pub running: bool,
    pub complete: bool,
    pub history: VecDeque<SimulationEntry>,
    pub trade_count: u64,
}

impl Simulation {
    pub fn new(initial: f64, target: f64) -> Self {
        Self {
            initial,
            target,
            current: initial,
            running: false,
            complete: false,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            trade_count: 0,
        }
    }

    /// Starts from the initial amount. Does nothing while already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.history.clear();
        self.trade_count = 0;
        self.current = self.initial;
        self.complete = false;
    }

    pub fn run_trade<R: Rng>(&mut self, rng: &mut R) -> Option<SimulatedTrade> {
        if !self.running || self.complete {
            return None;
        }

        let result = simulate_trade(self.current, rng);
        self.current = result.new_amount;
        self.trade_count += 1;
        self.history.push_front(SimulationEntry {
            id: self.trade_count,
            amount: result.new_amount,
            success: result.success,
            growth_factor: result.growth_factor,
        });
        self.history.truncate(HISTORY_LIMIT);

        if result.new_amount >= self.target {
            self.complete = true;
            self.running = false;
        }
        Some(result)
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.history.clear();
        self.trade_count = 0;
        self.current = self.initial;
        self.complete = false;
    }

    /// Starts and trades until the target is hit or `max_trades` were made.
    /// Returns whether the target was reached.
    pub fn run_to_completion<R: Rng>(&mut self, max_trades: u64, rng: &mut R) -> bool {
        self.start();
        while self.trade_count < max_trades && self.run_trade(rng).is_some() {}
        self.complete
    }

    pub fn progress(&self) -> f64 {
        if self.target <= 0.0 {
            return 100.0;
        }
        (self.current / self.target * 100.0).min(100.0)
    }
}
