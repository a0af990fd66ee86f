//! Database layer: pool and the user credential store.

mod memory;
mod pool;
mod users;

pub use memory::MemoryUserStore;
pub use pool::{create_pool, run_migrations, DbPool};
pub use users::{is_unique_violation, PgUserStore, UserRow, UserStore};
