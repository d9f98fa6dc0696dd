use anyhow::Context;
use base64::{engine::general_purpose, Engine as _};

pub struct AppConfig {
    pub bind_addr: String,
    pub backend: StoreBackend,
    pub session_key: Vec<u8>,
}

pub enum StoreBackend {
    Postgres { database_url: String },
    Memory,
}

impl AppConfig {
    /// Reads configuration from the environment. The storage backend comes
    /// from MINDCARE_STORE ("postgres" or "memory"); when unset it is
    /// inferred from the presence of DATABASE_URL.
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| {
            let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
            format!("0.0.0.0:{port}")
        });

        let backend = match std::env::var("MINDCARE_STORE").ok().as_deref() {
            Some("postgres") => StoreBackend::Postgres {
                database_url: std::env::var("DATABASE_URL")
                    .context("DATABASE_URL missing with MINDCARE_STORE=postgres")?,
            },
            Some("memory") => StoreBackend::Memory,
            Some(other) => anyhow::bail!("unknown MINDCARE_STORE value: {other}"),
            None => match std::env::var("DATABASE_URL") {
                Ok(database_url) => StoreBackend::Postgres { database_url },
                Err(_) => StoreBackend::Memory,
            },
        };

        let session_key = match std::env::var("SESSION_KEY") {
            Ok(raw) => general_purpose::STANDARD
                .decode(raw)
                .context("SESSION_KEY must be base64")?,
            Err(_) => {
                tracing::warn!("SESSION_KEY not set, using an insecure development key");
                b"mindcare-dev-session-key".to_vec()
            }
        };

        Ok(Self {
            bind_addr,
            backend,
            session_key,
        })
    }
}
