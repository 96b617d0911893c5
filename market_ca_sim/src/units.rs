// Unit data: the three agent kinds that live on the grid.
//
// These are plain records. Behavior lives in `agents.rs` and registration
// in `world.rs`; external code only ever sees shared references, so the
// fields are public for reading while every mutation goes through the
// engine.
//
// Every unit carries a `position` and an integer `resource`. A unit whose
// resource is at or below zero when its turn comes is removed instead of
// acting.

use crate::queue::PathQueue;
use crate::types::{ClientId, CompanyId, Position, ProductId};

/// A stationary producer. Spawns one product per tick into a free neighbor
/// and earns the sale fee whenever one of its products is bought.
#[derive(Clone, Debug, PartialEq)]
pub struct Company {
    pub id: CompanyId,
    pub position: Position,
    pub resource: i64,
    /// Live products, oldest first. Kept in agreement with each
    /// `Product::company` by the `World`.
    pub products: Vec<ProductId>,
    /// Positions where products were bought, oldest first. Each one becomes
    /// the goal of a later product.
    pub sale_points: PathQueue,
}

impl Company {
    pub fn new(id: CompanyId, position: Position, resource: i64) -> Self {
        Self {
            id,
            position,
            resource,
            products: Vec::new(),
            sale_points: PathQueue::new(),
        }
    }
}

/// A mobile good. Walks its cached path toward `goal` when it has one and
/// wanders otherwise, paying the move price each step.
#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub position: Position,
    pub resource: i64,
    pub company: CompanyId,
    pub goal: Option<Position>,
    /// Remaining route toward `goal`, excluding the current position.
    pub path: PathQueue,
}

/// A buyer. Never moves; purchases one visible product per tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Client {
    pub id: ClientId,
    pub position: Position,
    pub resource: i64,
}
