// Data-driven simulation configuration.
//
// All tunable market parameters live in `SimConfig`, loadable from JSON.
// The engine reads every economic constant from here: starting resources
// per unit kind, the move price, the sale fee, how far a company will route
// a product toward a past sale point, and the client replenishment cadence
// used by `Simulation::step`.
//
// Missing JSON fields fall back to the defaults, so a config file only needs
// the values it changes.
//
// See also: `sim.rs` which owns the `SimConfig`, `agents.rs` which spends
// and earns resource according to it.
//
// **Critical constraint: determinism.** Two simulations only evolve
// identically when their configs and seeds match.

use crate::error::ConfigError;
use crate::grid::PRICE_PER_MOVE;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable parameters of one simulation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Resource a company starts with.
    pub company_start_resource: i64,
    /// Resource a freshly spawned product starts with.
    pub product_start_resource: i64,
    /// Resource a client starts with.
    pub client_start_resource: i64,
    /// Cost of entering a cell, paid by the mover (and by a company for
    /// each product it places).
    pub price_per_move: i64,
    /// Amount moved from client to company on each purchase.
    pub sale_fee: i64,
    /// Resource budget of the route a company plans toward a sale point.
    pub company_path_budget: i64,
    /// Whether `step` seeds new clients periodically.
    pub replenish_enabled: bool,
    /// Seed clients every this many completed ticks.
    pub replenish_interval: u64,
    /// Inclusive range of the free-cell percent drawn for each replenishment.
    pub replenish_percent_range: (u32, u32),
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            company_start_resource: 50,
            product_start_resource: 20,
            client_start_resource: 25,
            price_per_move: PRICE_PER_MOVE,
            sale_fee: 7,
            company_path_budget: 20,
            replenish_enabled: true,
            replenish_interval: 40,
            replenish_percent_range: (3, 10),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
