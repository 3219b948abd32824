pub mod initdb;
pub mod migrate_and_serve;
pub mod next_payment;
pub mod recompute;
pub mod serve;

pub use initdb::init_database;
pub use migrate_and_serve::migrate_and_serve;
pub use next_payment::next_payment;
pub use recompute::recompute;
pub use serve::serve;
