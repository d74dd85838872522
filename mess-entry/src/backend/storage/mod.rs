pub mod csv;
pub mod error;
pub mod mirror;
pub mod sheet;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use traits::{MirrorService, TabularStore};
