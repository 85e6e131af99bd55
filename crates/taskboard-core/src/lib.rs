pub mod config;
pub mod error;
pub mod logging;
pub mod pagination;
pub mod result;

pub use config::AppConfig;
pub use error::BoardError;
pub use pagination::{PageCursor, PaginationMeta};
pub use result::BoardResult;
