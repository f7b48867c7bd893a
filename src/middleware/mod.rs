pub mod response;

pub use response::{data_envelope, ApiResponse, ApiResult};
