use std::net::SocketAddr;

use anyhow::Context;

/// Relay settings, read once at startup. A `.env` file is honored if present.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub frontend_origin: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = dotenv::var("RELAY_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());
        let bind_addr = bind_addr
            .parse()
            .with_context(|| format!("RELAY_ADDR is not a socket address: {bind_addr}"))?;

        let frontend_origin =
            dotenv::var("FRONTEND_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        Ok(Self {
            bind_addr,
            frontend_origin,
        })
    }
}
