pub mod rating;
pub mod review;
pub mod store;

pub use rating::{Rating, RatingError};
pub use review::ReviewRecord;
pub use store::{AppRef, Store, StoreTarget};
