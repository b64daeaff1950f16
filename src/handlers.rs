pub mod auth;
pub mod checks;
pub mod documents;
pub mod expenses;
pub mod inventory;
pub mod leases;
pub mod payments;
pub mod stalls;
pub mod tenants;
