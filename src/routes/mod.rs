pub mod auth_routes;
pub mod user_routes;
pub mod vehicle_routes;
pub mod booking_routes;
