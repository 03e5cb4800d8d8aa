pub mod error;
pub mod filter;
pub mod store;

pub use error::StoreError;
pub use filter::{ImageFilter, PolicyFilter, WireFilter};
pub use store::{ImageStore, PolicyStore, WireStore};
