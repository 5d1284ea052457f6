//! Data loading and validation for the role catalog, plus session storage.

pub mod load;
pub mod schema;
pub mod session;

pub use load::*;
pub use schema::*;
pub use session::*;
