use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use crate::error::{AppError, Result};

pub const DEFAULT_MODEL_PATH: &str = "salamodel/TA-bartindo";
pub const DEFAULT_INFERENCE_URL: &str = "http://127.0.0.1:8080";
pub const DEFAULT_SEARCH_URL: &str = "https://www.detik.com/search/searchall";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub model_path: String,
    pub inference_url: String,
    pub inference_api_token: Option<String>,
    pub search_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let server_addr = parse_server_addr(&host, &port)?;

        let model_path = env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string());
        let inference_url = env::var("INFERENCE_URL").unwrap_or_else(|_| DEFAULT_INFERENCE_URL.to_string());
        let inference_api_token = env::var("INFERENCE_API_TOKEN").ok().filter(|t| !t.is_empty());
        let search_url = env::var("SEARCH_URL").unwrap_or_else(|_| DEFAULT_SEARCH_URL.to_string());

        Ok(Config {
            server_addr,
            model_path,
            inference_url,
            inference_api_token,
            search_url,
        })
    }
}

fn parse_server_addr(host: &str, port: &str) -> Result<SocketAddr> {
    let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
    let ip = IpAddr::from_str(host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;
    Ok(SocketAddr::new(ip, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        let addr = parse_server_addr("0.0.0.0", "8000").unwrap();
        assert_eq!(addr, "0.0.0.0:8000".parse().unwrap());
    }

    #[test]
    fn rejects_bad_port() {
        let err = parse_server_addr("127.0.0.1", "eighty").unwrap_err();
        assert!(matches!(err, AppError::ConfigError(msg) if msg.starts_with("Invalid port")));
    }

    #[test]
    fn rejects_hostname() {
        assert!(matches!(
            parse_server_addr("localhost", "3000"),
            Err(AppError::ConfigError(_))
        ));
    }
}
