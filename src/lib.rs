//! Location search for the journey planner: geocoding suggestions for the
//! start and finish fields, and marker placement when one is picked.

pub mod binding;
pub mod config;
pub mod debounce;
pub mod geocoder;
pub mod map;
pub mod models;
pub mod planner;
pub mod projection;
