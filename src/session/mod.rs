pub mod api_session;
pub mod error;
pub mod request;
pub mod urls;

pub use api_session::ApiSession;
pub use error::ApiError;
pub use request::{ApiRequest, Backend, HttpMethod, RequestBody};
pub use urls::*;
