pub mod users;

pub use users::{PgUserStore, UserStore};

#[cfg(test)]
pub use users::MockUserStore;
