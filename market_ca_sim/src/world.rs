// The unit registry: the single place that knows which units are alive.
//
// Three `BTreeMap`s keyed by handle, one per kind. Handles come from one
// monotonic counter shared by all kinds and are never reused, so ascending
// key order is insertion order and iteration is deterministic.
//
// The registry also maintains the company/product ownership link in both
// directions: registering a product appends it to its company's list,
// unregistering removes it, and unregistering a company takes its products
// with it. Grid placement is not handled here; `sim.rs` pairs every
// registry change with the matching cell update.
//
// **Critical constraint: determinism.** No hash-ordered collections.

use crate::error::{Result, SimError};
use crate::queue::PathQueue;
use crate::types::{ClientId, CompanyId, Position, ProductId, UnitKind, UnitRef};
use crate::units::{Client, Company, Product};
use std::collections::BTreeMap;

/// Registry of live units, partitioned by kind.
#[derive(Clone, Debug, Default)]
pub struct World {
    next_id: u32,
    companies: BTreeMap<CompanyId, Company>,
    products: BTreeMap<ProductId, Product>,
    clients: BTreeMap<ClientId, Client>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    pub fn register_company(&mut self, position: Position, resource: i64) -> CompanyId {
        let id = CompanyId(self.allocate());
        self.companies.insert(id, Company::new(id, position, resource));
        id
    }

    /// Register a product owned by `company` and append it to the company's
    /// product list.
    pub fn register_product(
        &mut self,
        company: CompanyId,
        position: Position,
        resource: i64,
        goal: Option<Position>,
        path: PathQueue,
    ) -> Result<ProductId> {
        if !self.companies.contains_key(&company) {
            return Err(SimError::UnknownCompany(company));
        }
        let id = ProductId(self.allocate());
        self.products.insert(
            id,
            Product {
                id,
                position,
                resource,
                company,
                goal,
                path,
            },
        );
        if let Some(owner) = self.companies.get_mut(&company) {
            owner.products.push(id);
        }
        Ok(id)
    }

    pub fn register_client(&mut self, position: Position, resource: i64) -> ClientId {
        let id = ClientId(self.allocate());
        self.clients.insert(
            id,
            Client {
                id,
                position,
                resource,
            },
        );
        id
    }

    /// Remove a company together with every product it owns. The products
    /// are returned in the company's list order.
    pub fn unregister_company(&mut self, id: CompanyId) -> Option<(Company, Vec<Product>)> {
        let company = self.companies.remove(&id)?;
        let products = company
            .products
            .iter()
            .filter_map(|pid| self.products.remove(pid))
            .collect();
        Some((company, products))
    }

    /// Remove a product and detach it from its owner.
    pub fn unregister_product(&mut self, id: ProductId) -> Option<Product> {
        let product = self.products.remove(&id)?;
        if let Some(owner) = self.companies.get_mut(&product.company) {
            owner.products.retain(|&pid| pid != id);
        }
        Some(product)
    }

    pub fn unregister_client(&mut self, id: ClientId) -> Option<Client> {
        self.clients.remove(&id)
    }

    /// Forget every unit. The handle counter keeps running.
    pub(crate) fn clear(&mut self) {
        self.companies.clear();
        self.products.clear();
        self.clients.clear();
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn company(&self, id: CompanyId) -> Option<&Company> {
        self.companies.get(&id)
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub(crate) fn company_mut(&mut self, id: CompanyId) -> Option<&mut Company> {
        self.companies.get_mut(&id)
    }

    pub(crate) fn product_mut(&mut self, id: ProductId) -> Option<&mut Product> {
        self.products.get_mut(&id)
    }

    pub(crate) fn client_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    pub fn companies(&self) -> impl Iterator<Item = &Company> {
        self.companies.values()
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    /// Snapshot of live company handles in insertion order.
    pub fn company_ids(&self) -> Vec<CompanyId> {
        self.companies.keys().copied().collect()
    }

    pub fn product_ids(&self) -> Vec<ProductId> {
        self.products.keys().copied().collect()
    }

    pub fn client_ids(&self) -> Vec<ClientId> {
        self.clients.keys().copied().collect()
    }

    pub fn contains(&self, unit: UnitRef) -> bool {
        self.position_of(unit).is_some()
    }

    /// Recorded position of a live unit, `None` for a dangling handle.
    pub fn position_of(&self, unit: UnitRef) -> Option<Position> {
        match unit {
            UnitRef::Company(id) => self.companies.get(&id).map(|c| c.position),
            UnitRef::Product(id) => self.products.get(&id).map(|p| p.position),
            UnitRef::Client(id) => self.clients.get(&id).map(|c| c.position),
        }
    }

    pub fn resource_of(&self, unit: UnitRef) -> Option<i64> {
        match unit {
            UnitRef::Company(id) => self.companies.get(&id).map(|c| c.resource),
            UnitRef::Product(id) => self.products.get(&id).map(|p| p.resource),
            UnitRef::Client(id) => self.clients.get(&id).map(|c| c.resource),
        }
    }

    pub fn count_of(&self, kind: UnitKind) -> usize {
        match kind {
            UnitKind::Company => self.companies.len(),
            UnitKind::Product => self.products.len(),
            UnitKind::Client => self.clients.len(),
        }
    }

    /// Total live units of every kind.
    pub fn len(&self) -> usize {
        self.companies.len() + self.products.len() + self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
