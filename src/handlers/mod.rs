pub mod health;
pub mod search;
pub mod submit;

pub use health::health_handler;
pub use search::search_handler;
pub use submit::submit_handler;
