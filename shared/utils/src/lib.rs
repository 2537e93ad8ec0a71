pub mod config;
pub mod logging;
pub mod error;
pub mod validation;
pub mod progress;
pub mod tender;

pub use config::*;
pub use logging::*;
pub use error::*;
pub use validation::*;
pub use progress::*;
pub use tender::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.parser.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.parser.max_file_size_mb(), 10);
        assert_eq!(config.parser.allowed_extensions, vec!["xlsx", "xls"]);
        assert_eq!(config.parser.cache_capacity, 20);
    }

    #[test]
    fn test_error_handling() {
        let error = TenderError::validation("percentile", "test message");
        assert_eq!(error.error_code(), "VALIDATION_ERROR");
        assert_eq!(error.http_status_code(), 400);
    }
}
