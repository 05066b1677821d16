mod transaction;

pub use self::transaction::{PgOrderTransaction, PgUnitOfWork};
