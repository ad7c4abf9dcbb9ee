mod access_control;
mod requests_logging;

pub use access_control::access_control;
pub use requests_logging::{log_requests, RequestsLoggingLevel};
