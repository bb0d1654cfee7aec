pub mod health;
pub mod models;
pub mod recommend;
pub mod search;

pub use health::health_check;
pub use models::list_models;
pub use recommend::recommend_config;
pub use search::search_config;
