pub mod dto;
pub mod error;
pub mod form;
pub mod routes;
pub mod server;
