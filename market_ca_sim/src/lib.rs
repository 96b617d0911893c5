// market_ca_sim: market cellular-automaton engine.
//
// This crate contains all simulation logic for the market: the cell grid,
// the unit registry, neighborhood queries, resource-limited A* routing, the
// three agent behaviors, and the tick loop. It has no I/O or presentation
// dependencies and can be tested, benchmarked, and driven headless (see the
// `market_ca_runner` binary).
//
// Module overview:
// - `sim.rs`:         Simulation, tick orchestration, driver step, resets.
// - `agents.rs`:      Company / Product / Client behavior on their turn.
// - `world.rs`:       World, the registry of live units, by kind, in insertion order.
// - `grid.rs`:        Grid of cells holding at most one UnitRef; PRICE_PER_MOVE.
// - `units.rs`:       Company, Product and Client records.
// - `visibility.rs`:  8-neighborhood and passable-position queries.
// - `pathfinding.rs`: Budgeted A* search, path reconstruction and packaging.
// - `queue.rs`:       PathQueue (FIFO) and PriorityQueue (A* frontier).
// - `event.rs`:       Narrative SimEvents reported by each tick.
// - `config.rs`:      SimConfig: all tunable parameters, JSON-loadable.
// - `error.rs`:       SimError and ConfigError.
// - `types.rs`:       Position, unit handles, UnitRef, UnitKind, CellTag.
// - `prng`:           Re-exported from `market_ca_prng`: xoshiro256++ with SplitMix64 seeding.
//
// **Critical constraint: determinism.** A simulation is a pure function of
// its dimensions, config, seed and the calls made on it. All randomness
// comes from the per-simulation PRNG. No `HashMap`, no system time, no OS
// entropy. Use `BTreeMap` for ordered collections.

pub mod agents;
pub mod config;
pub mod error;
pub mod event;
pub mod grid;
pub mod pathfinding;
pub use market_ca_prng as prng;
pub mod queue;
pub mod sim;
pub mod types;
pub mod units;
pub mod visibility;
pub mod world;
