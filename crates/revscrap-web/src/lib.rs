pub mod app;
pub mod page;
pub mod routes;
pub mod state;

pub use app::{build_app, AppState};
pub use state::{FormEvent, FormState, Submission};
