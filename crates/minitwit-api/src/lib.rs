pub mod error;
pub mod follows;
pub mod latest;
pub mod messages;
pub mod register;
pub mod routes;
pub mod state;
pub mod timeline;

pub use routes::router;
pub use state::{AppState, AppStateInner};
