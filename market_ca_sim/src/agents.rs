// Agent behavior: what companies, products and clients do on their turn.
//
// Each behavior is an `impl Simulation` method that reads and mutates the
// grid and registry directly. `run_tick` in `sim.rs` decides *when* each one
// runs; this file decides *what* happens.
//
// - Company: place one product per turn into a free neighbor. If a past
//   sale point is pending, try to route a product toward it within the
//   company's path budget; otherwise place at a random free neighbor.
// - Product: follow the cached route toward its goal, replanning once when
//   the next cell has been taken since planning. Wander randomly when there
//   is no goal or no route. Every step costs the move price.
// - Client: buy one random product from the visible neighborhood.
//
// See also: `pathfinding.rs` for routing, `visibility.rs` for neighborhood
// queries, `event.rs` for the events emitted here.
//
// **Critical constraint: determinism.** Random choices draw from
// `self.rng` over row-major candidate lists only.

use crate::error::{Result, SimError};
use crate::event::{SimEvent, SimEventKind};
use crate::pathfinding::{MoveBudget, find_path};
use crate::queue::PathQueue;
use crate::sim::Simulation;
use crate::types::{ClientId, CompanyId, Position, ProductId, UnitRef};
use crate::visibility::{passable_positions, visible_positions};
use smallvec::SmallVec;
use tracing::{debug, warn};

impl Simulation {
    /// Place a new product owned by `company` on `pos`.
    ///
    /// The cell must be empty. The product starts with the configured
    /// product resource and is appended to the company's product list; the
    /// company pays one move price for it. `path` is the remaining route
    /// toward `goal`, excluding `pos`.
    pub fn spawn_product(
        &mut self,
        company: CompanyId,
        pos: Position,
        goal: Option<Position>,
        path: PathQueue,
    ) -> Result<ProductId> {
        if self.grid.get(pos)?.is_some() {
            return Err(SimError::CellOccupied { pos });
        }
        let id = self.world.register_product(
            company,
            pos,
            self.config.product_start_resource,
            goal,
            path,
        )?;
        self.grid.set(pos, Some(UnitRef::Product(id)), &self.world)?;
        let price = self.config.price_per_move;
        if let Some(owner) = self.world.company_mut(company) {
            owner.resource -= price;
        }
        Ok(id)
    }

    /// One company turn: place at most one product next to the company.
    ///
    /// Does nothing when every neighbor is taken. A company at or below
    /// zero resource is dropped instead, along with its products.
    pub fn company_act(&mut self, id: CompanyId, events: &mut Vec<SimEvent>) {
        if !self.ready_to_act(UnitRef::Company(id), events) {
            return;
        }
        let Some(company) = self.world.company(id) else {
            return;
        };
        let here = company.position;
        let options = passable_positions(&self.grid, here);
        if options.is_empty() {
            return;
        }

        let mut routed = None;
        let sale_point = self.world.company_mut(id).and_then(|c| c.sale_points.get());
        if let Some(target) = sale_point {
            let budget = MoveBudget {
                resource: self.config.company_path_budget,
                price_per_move: self.config.price_per_move,
            };
            let mut path = find_path(&self.grid, here, target, Some(budget));
            if let Some(first) = path.get() {
                routed = Some((first, Some(target), path));
            }
        }

        let (at, goal, path) = match routed {
            Some(spawn) => spawn,
            None => match self.rng.choose(&options) {
                Some(&at) => (at, None, PathQueue::new()),
                None => return,
            },
        };

        match self.spawn_product(id, at, goal, path) {
            Ok(product) => {
                debug!(company = %id, %product, %at, ?goal, "product spawned");
                self.push_event(
                    events,
                    SimEventKind::ProductSpawned {
                        company: id,
                        product,
                        at,
                        goal,
                    },
                );
            }
            Err(err) => warn!(%err, company = %id, "product spawn rejected"),
        }
    }

    /// One product turn: take the next step toward the goal, or a random
    /// step, or stay put when boxed in. A depleted product is dropped
    /// instead.
    pub fn product_act(&mut self, id: ProductId, events: &mut Vec<SimEvent>) {
        if !self.ready_to_act(UnitRef::Product(id), events) {
            return;
        }
        let price = self.config.price_per_move;
        let Some(product) = self.world.product_mut(id) else {
            return;
        };
        let here = product.position;

        let mut next = None;
        match product.goal {
            Some(goal) if goal == here => product.goal = None,
            Some(goal) => {
                let budget = Some(MoveBudget {
                    resource: product.resource,
                    price_per_move: price,
                });
                if product.path.is_empty() {
                    product.path.extend(find_path(&self.grid, here, goal, budget));
                }
                if product.path.peek().is_some_and(|step| !self.grid.is_vacant(step)) {
                    // Someone took the cell since the route was planned.
                    product.path.reset();
                    product.path.extend(find_path(&self.grid, here, goal, budget));
                }
                next = product.path.get();
            }
            None => {}
        }

        let directed = next.is_some();
        let destination = match next {
            Some(step) => Some(step),
            None => {
                let options = passable_positions(&self.grid, here);
                self.rng.choose(&options).copied()
            }
        };
        let Some(to) = destination else {
            return;
        };

        match self.move_product(id, here, to) {
            Ok(()) => self.push_event(
                events,
                SimEventKind::ProductMoved {
                    product: id,
                    from: here,
                    to,
                    directed,
                },
            ),
            Err(err) => warn!(%err, product = %id, "product move rejected"),
        }
    }

    /// Step a product from `from` into the empty cell `to`, charging the
    /// move price.
    fn move_product(&mut self, id: ProductId, from: Position, to: Position) -> Result<()> {
        if !self.grid.is_vacant(to) {
            return Err(SimError::CellOccupied { pos: to });
        }
        let price = self.config.price_per_move;
        if let Some(product) = self.world.product_mut(id) {
            product.position = to;
            product.resource -= price;
        }
        self.grid.vacate(from);
        self.grid.set(to, Some(UnitRef::Product(id)), &self.world)
    }

    /// One client turn: buy a random product from the neighborhood, if any.
    /// A depleted client is dropped instead.
    pub fn client_buy(&mut self, id: ClientId, events: &mut Vec<SimEvent>) {
        if !self.ready_to_act(UnitRef::Client(id), events) {
            return;
        }
        let Some(client) = self.world.client(id) else {
            return;
        };
        let visible = visible_positions(self.grid.rows(), self.grid.cols(), client.position);
        let offered: SmallVec<[ProductId; 8]> = visible
            .into_iter()
            .filter_map(|pos| match self.grid.get(pos) {
                Ok(Some(UnitRef::Product(product))) => Some(product),
                _ => None,
            })
            .collect();
        let Some(&product_id) = self.rng.choose(&offered) else {
            return;
        };
        let Some(product) = self.world.unregister_product(product_id) else {
            return;
        };
        self.grid.vacate(product.position);

        let fee = self.config.sale_fee;
        if let Some(company) = self.world.company_mut(product.company) {
            company.resource += fee;
            company.sale_points.put(product.position);
        }
        if let Some(client) = self.world.client_mut(id) {
            client.resource -= fee;
        }

        debug!(client = %id, product = %product_id, at = %product.position, "product sold");
        self.push_event(
            events,
            SimEventKind::ProductSold {
                product: product_id,
                company: product.company,
                client: id,
                at: product.position,
            },
        );
    }
}
