// Narrative events emitted while a tick runs.
//
// Every lifecycle transition the engine performs during `run_tick` (a
// product placed, a product stepping, a purchase, a unit removed) is
// reported as a `SimEvent` in the returned `TickReport`. Drivers use them
// for logs and summaries; tests use them to observe what happened without
// diffing the whole world.
//
// Events are output only. The engine never reads them back.
//
// See also: `sim.rs` for `TickReport` and the tick loop, `agents.rs` where
// most events originate.

use crate::types::{ClientId, CompanyId, Position, ProductId, UnitRef};
use serde::{Deserialize, Serialize};

/// A narrative event stamped with the tick that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimEvent {
    pub tick: u64,
    pub kind: SimEventKind,
}

/// Why a unit left the grid other than by being sold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropCause {
    /// Its resource reached zero or below.
    Depleted,
    /// Its owning company was removed.
    OwnerDropped,
}

/// Types of narrative events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimEventKind {
    /// A company placed a new product next to itself.
    ProductSpawned {
        company: CompanyId,
        product: ProductId,
        at: Position,
        goal: Option<Position>,
    },
    /// A product stepped to a neighboring cell. `directed` is true when the
    /// step came from its planned route rather than a random pick.
    ProductMoved {
        product: ProductId,
        from: Position,
        to: Position,
        directed: bool,
    },
    /// A client bought a product.
    ProductSold {
        product: ProductId,
        company: CompanyId,
        client: ClientId,
        at: Position,
    },
    /// A unit was removed from the grid and the registry.
    UnitDropped {
        unit: UnitRef,
        at: Position,
        cause: DropCause,
    },
}
