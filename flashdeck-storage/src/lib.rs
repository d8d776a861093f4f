pub mod local;
pub mod s3;

pub use local::LocalDisk;
pub use s3::{S3Credentials, S3Store};
