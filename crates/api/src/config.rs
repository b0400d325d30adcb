use vectorflow_core::pipeline::AnchorPolicy;
use vectorflow_core::sink::KnownDomain;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Which processor must survive removals (default: `require_ml_inference`).
    pub anchor_policy: AnchorPolicy,
    /// Broadcast channel capacity (default: `1024`).
    pub event_bus_capacity: usize,
    /// Number of recent events kept in memory (default: `200`).
    pub event_history_limit: usize,
    /// Name given to the pipeline of a fresh session.
    pub pipeline_name: String,
    /// OpenSearch domains a sink may reference by name instead of endpoint.
    pub known_domains: Vec<KnownDomain>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `ANCHOR_POLICY`        | `require_ml_inference`     |
    /// | `EVENT_BUS_CAPACITY`   | `1024`                     |
    /// | `EVENT_HISTORY_LIMIT`  | `200`                      |
    /// | `PIPELINE_NAME`        | `ml-inference-pipeline`    |
    /// | `OPENSEARCH_DOMAINS`   | empty (`name=url,...`)     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let anchor_policy = std::env::var("ANCHOR_POLICY")
            .ok()
            .map(|raw| {
                AnchorPolicy::from_str(raw.trim())
                    .unwrap_or_else(|e| panic!("ANCHOR_POLICY is invalid: {e}"))
            })
            .unwrap_or_default();

        let event_bus_capacity: usize = std::env::var("EVENT_BUS_CAPACITY")
            .unwrap_or_else(|_| "1024".into())
            .parse()
            .expect("EVENT_BUS_CAPACITY must be a valid usize");

        let event_history_limit: usize = std::env::var("EVENT_HISTORY_LIMIT")
            .unwrap_or_else(|_| "200".into())
            .parse()
            .expect("EVENT_HISTORY_LIMIT must be a valid usize");

        let pipeline_name =
            std::env::var("PIPELINE_NAME").unwrap_or_else(|_| "ml-inference-pipeline".into());

        let known_domains = parse_known_domains(
            &std::env::var("OPENSEARCH_DOMAINS").unwrap_or_default(),
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            anchor_policy,
            event_bus_capacity,
            event_history_limit,
            pipeline_name,
            known_domains,
        }
    }
}

/// Parse `name=https://endpoint,other=https://...` pairs. Malformed pairs
/// are skipped with a warning.
pub fn parse_known_domains(raw: &str) -> Vec<KnownDomain> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| match pair.split_once('=') {
            Some((name, endpoint)) if !name.trim().is_empty() && !endpoint.trim().is_empty() => {
                Some(KnownDomain::new(name.trim(), endpoint.trim()))
            }
            _ => {
                tracing::warn!(pair, "Ignoring malformed OPENSEARCH_DOMAINS entry");
                None
            }
        })
        .collect()
}
