// Top-level simulation state and tick orchestration.
//
// `Simulation` owns everything one market run needs: the `Grid`, the
// `World` registry, the `SimConfig`, the `SimRng`, and the tick counter.
// Nothing is process-global, so any number of simulations can run side by
// side (including across threads).
//
// A tick (`run_tick`) runs three phases, each over a snapshot of handles
// taken when the phase starts:
// 1. Clients buy a visible product.
// 2. Companies place a product.
// 3. Products move.
// A unit whose resource is at or below zero when its turn arrives is dropped
// instead of acting (each turn method checks this on entry), and a unit
// removed earlier in the same phase is skipped. Products placed in phase 2 already move in phase 3.
//
// `step` wraps one tick the way an interactive driver runs the market:
// check for bankruptcy first, tick, then every `replenish_interval` ticks
// seed a random percent of clients into free cells.
//
// Agent behavior itself lives in `agents.rs` as further `impl Simulation`
// blocks.
//
// See also: `world.rs` (registry), `grid.rs` (cells), `event.rs`
// (`SimEvent`s collected into each `TickReport`), `config.rs`.
//
// **Critical constraint: determinism.** Given the same dimensions, seed,
// config and sequence of calls, two simulations produce identical grids,
// registries and reports. All randomness goes through `self.rng`.

use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::event::{DropCause, SimEvent, SimEventKind};
use crate::grid::Grid;
use crate::types::{CellTag, CompanyId, Position, ProductId, UnitKind, UnitRef};
use crate::world::World;
use market_ca_prng::SimRng;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// The message `check_status` reports once no company is left.
pub const ALL_COMPANIES_BANKRUPT: &str = "All companies have gone bankrupt";

/// Why the simulation cannot continue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TerminalMessage(pub &'static str);

impl fmt::Display for TerminalMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// What one `run_tick` did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// The tick number this report belongs to, starting at 1.
    pub tick: u64,
    /// Narrative events in the order they happened.
    pub events: Vec<SimEvent>,
}

impl TickReport {
    pub fn sales(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, SimEventKind::ProductSold { .. }))
            .count()
    }

    pub fn spawns(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, SimEventKind::ProductSpawned { .. }))
            .count()
    }

    pub fn drops(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, SimEventKind::UnitDropped { .. }))
            .count()
    }
}

/// Result of one driver `step`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// A tick ran. `replenished` counts clients seeded afterwards.
    Ticked {
        report: TickReport,
        replenished: usize,
    },
    /// The market is over; no tick ran.
    Finished(TerminalMessage),
}

/// One market simulation: grid, registry, config and generator.
#[derive(Clone, Debug)]
pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) rng: SimRng,
    pub(crate) grid: Grid,
    pub(crate) world: World,
    tick: u64,
}

impl Simulation {
    /// Create an empty `rows x cols` market with default config.
    pub fn new(rows: u32, cols: u32, seed: u64) -> Self {
        Self::with_config(rows, cols, seed, SimConfig::default())
    }

    pub fn with_config(rows: u32, cols: u32, seed: u64, config: SimConfig) -> Self {
        Self {
            config,
            rng: SimRng::new(seed),
            grid: Grid::new(rows, cols),
            world: World::new(),
            tick: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Number of ticks run since creation or the last `restart`.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Live units of every kind.
    pub fn unit_count(&self) -> usize {
        self.world.len()
    }

    pub fn unit_count_of(&self, kind: UnitKind) -> usize {
        self.world.count_of(kind)
    }

    pub fn cell_tag(&self, pos: Position) -> Result<CellTag> {
        self.grid.cell_tag(pos)
    }

    // -----------------------------------------------------------------------
    // Unit creation
    // -----------------------------------------------------------------------

    /// Create a company or client on an empty cell.
    ///
    /// Products cannot be made here; they need an owner (see
    /// `spawn_product`).
    pub fn create_unit(&mut self, kind: UnitKind, pos: Position) -> Result<UnitRef> {
        if kind == UnitKind::Product {
            return Err(SimError::ProductWithoutCompany);
        }
        if self.grid.get(pos)?.is_some() {
            return Err(SimError::CellOccupied { pos });
        }
        let unit = match kind {
            UnitKind::Company => UnitRef::Company(
                self.world
                    .register_company(pos, self.config.company_start_resource),
            ),
            UnitKind::Client => UnitRef::Client(
                self.world
                    .register_client(pos, self.config.client_start_resource),
            ),
            UnitKind::Product => return Err(SimError::ProductWithoutCompany),
        };
        self.grid.set(pos, Some(unit), &self.world)?;
        debug!(%unit, %pos, "unit created");
        Ok(unit)
    }

    /// Create a unit from its numeric kind code (0 company, 1 product,
    /// 2 client).
    pub fn create_unit_by_code(&mut self, code: u8, pos: Position) -> Result<UnitRef> {
        let kind = UnitKind::try_from(code)?;
        self.create_unit(kind, pos)
    }

    /// Seed `percent` of the currently free cells with new units of `kind`.
    ///
    /// Cells are drawn uniformly without replacement from the free-cell
    /// list, so the work is bounded by the number of free cells. Returns how
    /// many units were created.
    pub fn generate_units(&mut self, kind: UnitKind, percent: u32) -> Result<usize> {
        if kind == UnitKind::Product {
            return Err(SimError::ProductWithoutCompany);
        }
        let mut free = self.grid.free_positions();
        let target = free.len() * percent as usize / 100;
        let mut created = 0;
        while created < target && !free.is_empty() {
            let index = self.rng.range_usize(0, free.len());
            let pos = free.swap_remove(index);
            self.create_unit(kind, pos)?;
            created += 1;
        }
        debug!(?kind, percent, created, "units seeded");
        Ok(created)
    }

    // -----------------------------------------------------------------------
    // Status and resets
    // -----------------------------------------------------------------------

    /// `Some` once every company is gone.
    pub fn check_status(&self) -> Option<TerminalMessage> {
        if self.world.count_of(UnitKind::Company) == 0 {
            Some(TerminalMessage(ALL_COMPANIES_BANKRUPT))
        } else {
            None
        }
    }

    /// Remove every unit, keeping the grid size and tick counter.
    pub fn reset_world(&mut self) {
        let removed = self.world.len();
        self.world.clear();
        self.grid = Grid::new(self.grid.rows(), self.grid.cols());
        info!(removed, "world reset");
    }

    /// Start over on a fresh `rows x cols` grid at tick 0. The generator
    /// keeps its stream position.
    pub fn restart(&mut self, rows: u32, cols: u32) {
        self.reset_world();
        self.grid = Grid::new(rows, cols);
        self.tick = 0;
    }

    // -----------------------------------------------------------------------
    // Tick orchestration
    // -----------------------------------------------------------------------

    /// Run one tick: clients buy, companies produce, products move.
    pub fn run_tick(&mut self) -> TickReport {
        self.tick += 1;
        let mut events = Vec::new();

        for id in self.world.client_ids() {
            self.client_buy(id, &mut events);
        }
        for id in self.world.company_ids() {
            self.company_act(id, &mut events);
        }
        for id in self.world.product_ids() {
            self.product_act(id, &mut events);
        }

        TickReport {
            tick: self.tick,
            events,
        }
    }

    /// One driver iteration: status check, tick, periodic client
    /// replenishment.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(message) = self.check_status() {
            return StepOutcome::Finished(message);
        }
        let report = self.run_tick();

        let interval = self.config.replenish_interval;
        let mut replenished = 0;
        if self.config.replenish_enabled && interval > 0 && self.tick % interval == 0 {
            let (a, b) = self.config.replenish_percent_range;
            let percent = self.rng.range_u32_inclusive(a.min(b), a.max(b));
            match self.generate_units(UnitKind::Client, percent) {
                Ok(count) => replenished = count,
                Err(err) => warn!(%err, "client replenishment failed"),
            }
        }

        StepOutcome::Ticked {
            report,
            replenished,
        }
    }

    /// True when `unit` is alive with positive resource. A live unit at or
    /// below zero is dropped here.
    pub(crate) fn ready_to_act(&mut self, unit: UnitRef, events: &mut Vec<SimEvent>) -> bool {
        match self.world.resource_of(unit) {
            None => false,
            Some(resource) if resource <= 0 => {
                self.drop_unit(unit, DropCause::Depleted, events);
                false
            }
            Some(_) => true,
        }
    }

    pub(crate) fn push_event(&self, events: &mut Vec<SimEvent>, kind: SimEventKind) {
        events.push(SimEvent {
            tick: self.tick,
            kind,
        });
    }

    /// Clear the unit's cell and unregister it. Dropping a company drops
    /// all of its products.
    pub(crate) fn drop_unit(&mut self, unit: UnitRef, cause: DropCause, events: &mut Vec<SimEvent>) {
        let removed: Vec<(UnitRef, Position, DropCause)> = match unit {
            UnitRef::Company(id) => match self.world.unregister_company(id) {
                Some((company, products)) => std::iter::once((unit, company.position, cause))
                    .chain(products.into_iter().map(|p| {
                        (UnitRef::Product(p.id), p.position, DropCause::OwnerDropped)
                    }))
                    .collect(),
                None => Vec::new(),
            },
            UnitRef::Product(id) => self
                .world
                .unregister_product(id)
                .map(|p| vec![(unit, p.position, cause)])
                .unwrap_or_default(),
            UnitRef::Client(id) => self
                .world
                .unregister_client(id)
                .map(|c| vec![(unit, c.position, cause)])
                .unwrap_or_default(),
        };

        for (dropped, at, why) in removed {
            self.grid.vacate(at);
            debug!(unit = %dropped, %at, ?why, "unit dropped");
            self.push_event(
                events,
                SimEventKind::UnitDropped {
                    unit: dropped,
                    at,
                    cause: why,
                },
            );
        }

        if matches!(unit, UnitRef::Company(_)) && self.world.count_of(UnitKind::Company) == 0 {
            info!(tick = self.tick, "last company dropped");
        }
    }

    /// Products currently owned by `company`, oldest first. Empty for an
    /// unknown company.
    pub fn products_of(&self, company: CompanyId) -> &[ProductId] {
        self.world
            .company(company)
            .map(|c| c.products.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: u32, col: u32) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn new_simulation_is_empty() {
        let sim = Simulation::new(6, 7, 1);
        assert_eq!(sim.grid().rows(), 6);
        assert_eq!(sim.grid().cols(), 7);
        assert_eq!(sim.unit_count(), 0);
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.cell_tag(p(0, 0)), Ok(CellTag::Empty));
    }

    #[test]
    fn create_unit_registers_and_places() {
        let mut sim = Simulation::new(5, 5, 1);
        let unit = sim.create_unit(UnitKind::Company, p(2, 2)).unwrap();
        assert!(matches!(unit, UnitRef::Company(_)));
        assert_eq!(sim.cell_tag(p(2, 2)), Ok(CellTag::Company));
        assert_eq!(sim.world().resource_of(unit), Some(50));

        let client = sim.create_unit(UnitKind::Client, p(0, 0)).unwrap();
        assert_eq!(sim.world().resource_of(client), Some(25));
        assert_eq!(sim.unit_count(), 2);
    }

    #[test]
    fn create_unit_rejects_bad_requests() {
        let mut sim = Simulation::new(5, 5, 1);
        sim.create_unit(UnitKind::Client, p(1, 1)).unwrap();
        assert_eq!(
            sim.create_unit(UnitKind::Company, p(1, 1)),
            Err(SimError::CellOccupied { pos: p(1, 1) })
        );
        assert!(matches!(
            sim.create_unit(UnitKind::Client, p(5, 0)),
            Err(SimError::OutOfBounds { .. })
        ));
        assert_eq!(
            sim.create_unit(UnitKind::Product, p(3, 3)),
            Err(SimError::ProductWithoutCompany)
        );
        assert_eq!(
            sim.create_unit_by_code(7, p(3, 3)),
            Err(SimError::UnknownUnitKind(7))
        );
        assert_eq!(sim.unit_count(), 1);
    }

    #[test]
    fn create_unit_by_code_follows_kind_codes() {
        let mut sim = Simulation::new(3, 3, 1);
        let company = sim.create_unit_by_code(0, p(0, 0)).unwrap();
        let client = sim.create_unit_by_code(2, p(2, 2)).unwrap();
        assert_eq!(company.kind(), UnitKind::Company);
        assert_eq!(client.kind(), UnitKind::Client);
        assert_eq!(
            sim.create_unit_by_code(1, p(1, 1)),
            Err(SimError::ProductWithoutCompany)
        );
    }

    #[test]
    fn generate_units_takes_a_percent_of_free_cells() {
        let mut sim = Simulation::new(10, 10, 42);
        assert_eq!(sim.generate_units(UnitKind::Company, 10), Ok(10));
        // 90 free cells left, 50% of them.
        assert_eq!(sim.generate_units(UnitKind::Client, 50), Ok(45));
        assert_eq!(sim.unit_count_of(UnitKind::Company), 10);
        assert_eq!(sim.unit_count_of(UnitKind::Client), 45);
        assert_eq!(sim.grid().occupied_count(), 55);
    }

    #[test]
    fn generate_units_is_bounded_by_free_cells() {
        let mut sim = Simulation::new(4, 4, 5);
        assert_eq!(sim.generate_units(UnitKind::Client, 300), Ok(16));
        assert!(sim.grid().free_positions().is_empty());
        assert_eq!(sim.generate_units(UnitKind::Client, 100), Ok(0));
        assert_eq!(
            sim.generate_units(UnitKind::Product, 10),
            Err(SimError::ProductWithoutCompany)
        );
    }

    #[test]
    fn check_status_tracks_companies() {
        let mut sim = Simulation::new(3, 3, 1);
        let message = sim.check_status().unwrap();
        assert_eq!(message.to_string(), ALL_COMPANIES_BANKRUPT);
        sim.create_unit(UnitKind::Company, p(1, 1)).unwrap();
        assert_eq!(sim.check_status(), None);
    }

    #[test]
    fn step_does_not_tick_a_finished_market() {
        let mut sim = Simulation::new(3, 3, 1);
        sim.create_unit(UnitKind::Client, p(0, 0)).unwrap();
        assert_eq!(
            sim.step(),
            StepOutcome::Finished(TerminalMessage(ALL_COMPANIES_BANKRUPT))
        );
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn reset_world_clears_units_and_cells() {
        let mut sim = Simulation::new(6, 6, 9);
        sim.generate_units(UnitKind::Company, 20).unwrap();
        sim.generate_units(UnitKind::Client, 20).unwrap();
        sim.run_tick();
        sim.reset_world();
        assert_eq!(sim.unit_count(), 0);
        assert_eq!(sim.grid().occupied_count(), 0);
        assert_eq!(sim.tick(), 1);
    }

    #[test]
    fn restart_resizes_and_rewinds() {
        let mut sim = Simulation::new(6, 6, 9);
        sim.generate_units(UnitKind::Company, 20).unwrap();
        sim.run_tick();
        sim.restart(3, 8);
        assert_eq!(sim.grid().rows(), 3);
        assert_eq!(sim.grid().cols(), 8);
        assert_eq!(sim.grid().size(), 24);
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.unit_count(), 0);
    }

    #[test]
    fn depleted_units_are_dropped_at_their_turn() {
        let mut sim = Simulation::new(5, 5, 3);
        let client = sim.create_unit(UnitKind::Client, p(0, 0)).unwrap();
        if let UnitRef::Client(id) = client {
            sim.world.client_mut(id).unwrap().resource = 0;
        }
        let report = sim.run_tick();
        assert!(!sim.world().contains(client));
        assert_eq!(sim.cell_tag(p(0, 0)), Ok(CellTag::Empty));
        assert_eq!(
            report.events,
            vec![SimEvent {
                tick: 1,
                kind: SimEventKind::UnitDropped {
                    unit: client,
                    at: p(0, 0),
                    cause: DropCause::Depleted,
                },
            }]
        );
    }

    #[test]
    fn simulation_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Simulation>();
    }
}
