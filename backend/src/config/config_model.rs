#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub billing: Billing,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    /// Megabytes.
    pub body_limit: u64,
    /// Seconds.
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct Billing {
    pub trial_days: i64,
}

#[derive(Debug, Clone)]
pub struct JwtSecret {
    pub secret: String,
}
