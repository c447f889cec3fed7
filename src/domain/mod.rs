//! Shop records and the rules that compute them. Nothing here touches the
//! filesystem.

pub mod amount;
pub mod customer;
pub mod invoice;
pub mod loan;
pub mod ports;
pub mod records;
pub mod sheet;
