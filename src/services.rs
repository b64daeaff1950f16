pub mod auth;
pub mod check_service;
pub mod document_service;
pub mod expense_service;
pub mod inventory_service;
pub mod lease_service;
pub mod payment_service;
pub mod stall_service;
pub mod tenant_service;
