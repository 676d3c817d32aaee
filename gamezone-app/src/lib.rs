//! GameZone application shell: routes, view models and the app context.

pub mod app;
pub mod cli;
pub mod error;
pub mod logging;
pub mod nav;
pub mod notifications;
pub mod scope;
pub mod views;

pub use app::App;
pub use error::{AppError, AppResult};
pub use nav::{AdminSection, Route};
