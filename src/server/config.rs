use super::RequestsLoggingLevel;

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub port: u16,
    pub requests_logging_level: RequestsLoggingLevel,
}
