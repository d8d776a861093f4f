pub mod blob;
pub mod errors;
pub mod models;
pub mod repo;
pub mod schema;
pub mod token;

pub use blob::*;
pub use errors::*;
pub use models::*;
pub use repo::*;
pub use schema::*;
pub use token::*;
