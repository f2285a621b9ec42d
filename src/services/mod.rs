pub mod seed;

pub mod escrow_service;
pub mod fraud_guard;
pub mod inventory_service;
pub mod order_service;
