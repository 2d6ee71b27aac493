use envconfig::Envconfig;
use log::debug;
use serde::Serialize;
use std::time::Duration;

#[derive(Envconfig, Clone)]
pub struct ApiConfig {
    #[envconfig(from = "CUBEJS_API_URL", default = "http://localhost:4000/cubejs-api/v1")]
    pub api_url: String,

    #[envconfig(from = "CUBEJS_API_SECRET", default = "secret")]
    pub api_secret: String,

    /// How many times a `Continue wait` answer from `/load` is re-requested.
    #[envconfig(from = "CUBEJS_CONTINUE_WAIT_RETRIES", default = "10")]
    pub continue_wait_retries: u32,

    #[envconfig(from = "CUBEJS_CONTINUE_WAIT_INTERVAL_MS", default = "500")]
    pub continue_wait_interval_ms: u64,
}

impl ApiConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "ApiConfig loaded: api_url={}, continue_wait_retries={}, continue_wait_interval_ms={}",
            config.api_url, config.continue_wait_retries, config.continue_wait_interval_ms
        );
        Ok(config)
    }

    pub fn continue_wait_interval(&self) -> Duration {
        Duration::from_millis(self.continue_wait_interval_ms)
    }
}

#[derive(Envconfig, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionConfig {
    /// Selecting a cube also selects every dimension of that cube.
    #[envconfig(from = "AUTO_INCLUDE_DIMENSIONS", default = "true")]
    pub auto_include_dimensions_on_cube_select: bool,
}

impl SelectionConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "SelectionConfig loaded: auto_include_dimensions_on_cube_select={}",
            config.auto_include_dimensions_on_cube_select
        );
        Ok(config)
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            auto_include_dimensions_on_cube_select: true,
        }
    }
}

/// Settings the Cube backend is started with.
#[derive(Envconfig, Clone)]
pub struct BackendConfig {
    #[envconfig(from = "CUBEJS_API_SECRET", default = "secret")]
    pub api_secret: String,

    #[envconfig(
        from = "CUBEJS_CORS_ORIGINS",
        default = "http://localhost:5173,http://localhost:5174,http://localhost:3000"
    )]
    pub cors_origins: String,

    #[envconfig(from = "CUBEJS_DB_TYPE", default = "sqlite")]
    pub db_type: String,

    #[envconfig(from = "CUBEJS_DB_NAME", default = ":memory:")]
    pub db_name: String,

    #[envconfig(from = "CUBEJS_DEV_MODE", default = "true")]
    pub dev_server: bool,

    #[envconfig(from = "CUBEJS_SCHEDULED_REFRESH_TIMER", default = "false")]
    pub scheduled_refresh_timer: bool,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CorsOptions {
    pub origin: Vec<String>,
    pub credentials: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct HttpOptions {
    pub cors: CorsOptions,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DriverOptions {
    #[serde(rename = "type")]
    pub driver_type: String,
    pub database: String,
}

/// JSON rendering of the backend's create options.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOptions {
    pub http: HttpOptions,
    pub api_secret: String,
    pub driver: DriverOptions,
    pub dev_server: bool,
    pub scheduled_refresh_timer: bool,
}

impl BackendConfig {
    pub fn new() -> Result<Self, envconfig::Error> {
        let config = Self::init_from_env()?;
        debug!(
            "BackendConfig loaded: cors_origins={}, db_type={}, db_name={}, dev_server={}, scheduled_refresh_timer={}",
            config.cors_origins,
            config.db_type,
            config.db_name,
            config.dev_server,
            config.scheduled_refresh_timer
        );
        Ok(config)
    }

    pub fn origins(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.origins().iter().any(|o| o == origin)
    }

    pub fn create_options(&self) -> CreateOptions {
        CreateOptions {
            http: HttpOptions {
                cors: CorsOptions {
                    origin: self.origins(),
                    credentials: true,
                },
            },
            api_secret: self.api_secret.clone(),
            driver: DriverOptions {
                driver_type: self.db_type.clone(),
                database: self.db_name.clone(),
            },
            dev_server: self.dev_server,
            scheduled_refresh_timer: self.scheduled_refresh_timer,
        }
    }
}
