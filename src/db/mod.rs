pub mod dialects;
pub mod dsn;
pub mod format;
pub mod manager;
pub mod probe;
pub mod query;
pub mod result;
pub mod session;

pub use dialects::{DialectKind, DialectSet};
pub use format::format_result_set;
pub use manager::SessionManager;
