pub mod traits;
pub mod factory;
pub mod error;
pub mod http;
pub mod raw;
pub mod google_play;
pub mod app_store;

pub use traits::{AppInfo, ReviewSource};
pub use factory::SourceRegistry;
pub use error::FetchError;
pub use raw::{AppStoreReview, DeveloperResponse, PlayReview, RawReview};
pub use google_play::GooglePlayClient;
pub use app_store::AppStoreClient;
