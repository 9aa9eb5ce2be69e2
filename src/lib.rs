//! Workshop Agenda
//!
//! Appointment scheduling core of the service-shop front-end: builds day,
//! week and month agendas from the booking backend's reservations and routes
//! slot taps to the active booking workflow (create, reschedule, continue).

pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod presenter;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
