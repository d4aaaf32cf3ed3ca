pub mod integration_routes;
pub mod shield_routes;
