pub mod auth_controller;
pub mod user_controller;
pub mod vehicle_controller;
pub mod booking_controller;
