use serde::{Deserialize, Serialize};
use std::env;

/// Members fetched per keyset window.
pub const DEFAULT_MEMBER_WINDOW: u64 = 1000;
/// Member ids per `IN (...)` predicate when loading biometric records.
pub const DEFAULT_RECORD_ID_CHUNK: usize = 500;
/// Biometric rows fetched per keyset window inside one id chunk.
pub const DEFAULT_RECORD_WINDOW: u64 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub enrollment: EnrollmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty means any origin is accepted.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default)]
    pub audience: Option<String>,
}

/// Window sizes for the chunked fetches against the backend row cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentConfig {
    #[serde(default = "default_member_window")]
    pub member_window: u64,
    #[serde(default = "default_record_id_chunk")]
    pub record_id_chunk: usize,
    #[serde(default = "default_record_window")]
    pub record_window: u64,
}

fn default_member_window() -> u64 {
    DEFAULT_MEMBER_WINDOW
}

fn default_record_id_chunk() -> usize {
    DEFAULT_RECORD_ID_CHUNK
}

fn default_record_window() -> u64 {
    DEFAULT_RECORD_WINDOW
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            member_window: DEFAULT_MEMBER_WINDOW,
            record_id_chunk: DEFAULT_RECORD_ID_CHUNK,
            record_window: DEFAULT_RECORD_WINDOW,
        }
    }
}

impl EnrollmentConfig {
    /// Zero sizes would never make progress; replace them with the defaults.
    pub fn sanitized(self) -> Self {
        Self {
            member_window: if self.member_window == 0 {
                DEFAULT_MEMBER_WINDOW
            } else {
                self.member_window
            },
            record_id_chunk: if self.record_id_chunk == 0 {
                DEFAULT_RECORD_ID_CHUNK
            } else {
                self.record_id_chunk
            },
            record_window: if self.record_window == 0 {
                DEFAULT_RECORD_WINDOW
            } else {
                self.record_window
            },
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    /// Config built only from variables, for deployments without a file.
    /// The database URL and the JWT secret have no defaults.
    pub fn from_lookup(
        get_env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let get_env_parse = |name: &str, default| {
            get_env(name)
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(default)
        };

        let database_url =
            get_env("DATABASE_URL").ok_or("DATABASE_URL is not set and no config.toml was found")?;
        let secret = get_env("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or("JWT_SECRET is not set and no config.toml was found")?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env("SERVER_PORT")
                    .and_then(|v| v.parse::<u16>().ok())
                    .unwrap_or(8080),
                allowed_origins: get_env("CORS_ALLOWED_ORIGINS")
                    .map(|v| parse_origins(&v))
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10),
            },
            jwt: JwtConfig {
                secret,
                audience: get_env("JWT_AUDIENCE"),
            },
            enrollment: EnrollmentConfig::default(),
        })
    }

    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => toml::from_str(&config_str)
                .map_err(|e| format!("failed to parse config file {config_path}: {e}"))?,
            // no file: build from environment and defaults
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_lookup(|name| env::var(name).ok())?,
            Err(e) => {
                return Err(format!("cannot read config file {config_path}: {e}").into());
            }
        };

        // environment always wins over the file
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            config.server.allowed_origins = parse_origins(&v);
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            config.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_AUDIENCE") {
            config.jwt.audience = Some(v);
        }
        if let Ok(v) = env::var("ENROLLMENT_MEMBER_WINDOW")
            && let Ok(n) = v.parse()
        {
            config.enrollment.member_window = n;
        }
        if let Ok(v) = env::var("ENROLLMENT_RECORD_ID_CHUNK")
            && let Ok(n) = v.parse()
        {
            config.enrollment.record_id_chunk = n;
        }
        if let Ok(v) = env::var("ENROLLMENT_RECORD_WINDOW")
            && let Ok(n) = v.parse()
        {
            config.enrollment.record_window = n;
        }

        if config.jwt.secret.trim().is_empty() {
            return Err("jwt.secret must not be empty".into());
        }
        config.enrollment = config.enrollment.sanitized();
        Ok(config)
    }
}
