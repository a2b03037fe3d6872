pub mod compliance_document;
pub mod credit_note;
pub mod customer;
pub mod depot;
pub mod depot_stock;
pub mod driver;
pub mod driver_transaction;
pub mod expense;
pub mod fleet_reservation;
pub mod order;
pub mod payment;
pub mod purchase;
pub mod shortage;
pub mod supplier;
pub mod truck;
