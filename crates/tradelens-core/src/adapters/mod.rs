//! Shipment source implementations.

mod fixture;
mod gateway;

pub use fixture::StaticShipmentSource;
pub use gateway::GatewaySource;
