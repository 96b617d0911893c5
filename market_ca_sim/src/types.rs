// Core types shared across the simulation.
//
// Defines grid positions (`Position`), the compact unit handles
// (`CompanyId`, `ProductId`, `ClientId`), the closed `UnitRef` variant stored
// in grid cells, the `UnitKind` factory code, and the `CellTag` the renderer
// reads. Handles are plain integers allocated by the `World` from a single
// monotonic counter, so ascending handle order is insertion order.
//
// See also: `world.rs` which allocates handles, `grid.rs` which stores
// `UnitRef`s, `error.rs` for `SimError::UnknownUnitKind`.

use crate::error::SimError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell position on the grid: 0-indexed row and column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Straight-line distance, used as the A* heuristic.
    pub fn euclidean_distance(self, other: Self) -> f64 {
        let dr = f64::from(self.row.abs_diff(other.row));
        let dc = f64::from(self.col.abs_diff(other.col));
        (dr * dr + dc * dc).sqrt()
    }

    /// Number of king moves between two positions on an open grid.
    pub fn chebyshev_distance(self, other: Self) -> u32 {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Unit handles
// ---------------------------------------------------------------------------

macro_rules! unit_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

unit_id!(/// Handle of a registered company.
CompanyId);
unit_id!(/// Handle of a registered product.
ProductId);
unit_id!(/// Handle of a registered client.
ClientId);

/// Reference to a live unit, as stored in a grid cell.
///
/// A closed variant: only these three kinds may ever occupy a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitRef {
    Company(CompanyId),
    Product(ProductId),
    Client(ClientId),
}

impl UnitRef {
    pub fn kind(self) -> UnitKind {
        match self {
            Self::Company(_) => UnitKind::Company,
            Self::Product(_) => UnitKind::Product,
            Self::Client(_) => UnitKind::Client,
        }
    }
}

impl fmt::Display for UnitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Company(id) => write!(f, "{id}"),
            Self::Product(id) => write!(f, "{id}"),
            Self::Client(id) => write!(f, "{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Kinds and presentation tags
// ---------------------------------------------------------------------------

/// The three unit kinds. Numeric codes match the factory codes drivers use:
/// 0 = Company, 1 = Product, 2 = Client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    Company,
    Product,
    Client,
}

impl UnitKind {
    pub const ALL: [UnitKind; 3] = [UnitKind::Company, UnitKind::Product, UnitKind::Client];

    pub fn code(self) -> u8 {
        match self {
            Self::Company => 0,
            Self::Product => 1,
            Self::Client => 2,
        }
    }
}

impl TryFrom<u8> for UnitKind {
    type Error = SimError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Company),
            1 => Ok(Self::Product),
            2 => Ok(Self::Client),
            other => Err(SimError::UnknownUnitKind(other)),
        }
    }
}

/// What occupies a cell, for an external renderer to map onto its own colors
/// or symbols. The engine never decides presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellTag {
    Empty,
    Company,
    Product,
    Client,
}

impl From<Option<UnitRef>> for CellTag {
    fn from(occupant: Option<UnitRef>) -> Self {
        match occupant {
            None => Self::Empty,
            Some(UnitRef::Company(_)) => Self::Company,
            Some(UnitRef::Product(_)) => Self::Product,
            Some(UnitRef::Client(_)) => Self::Client,
        }
    }
}
