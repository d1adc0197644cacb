//! All Ten Nutrition API: estimates a nutrition breakdown for a food photo.

pub mod config;
pub mod error;
pub mod estimator;
pub mod logging;
pub mod oracle;
pub mod routes;

pub use routes::{app, AppState};
