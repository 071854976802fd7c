pub mod store;
pub mod transaction;

pub use store::ContentStore;
pub use transaction::StoreTransaction;
