use serde::Deserialize;

use crate::dashboards::d402_ecommerce_sales::aggregate::LeastSoldBasis;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where the two source tables are fetched from
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SourcesConfig {
    pub orders_url: String,
    pub geolocation_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    pub caption: String,
    pub top_n: usize,
    pub view_n: usize,
    pub least_sold_basis: LeastSoldBasis,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            orders_url: "https://raw.githubusercontent.com/rafliandi13/Submmission/refs/heads/master/dashboard/all_data.csv".to_string(),
            geolocation_url: "https://raw.githubusercontent.com/rafliandi13/Submmission/refs/heads/master/dashboard/geolocation.csv".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "E-Commerce Data Visualization".to_string(),
            caption: "Copyright © 2024".to_string(),
            top_n: 10,
            view_n: 5,
            least_sold_basis: LeastSoldBasis::TopSlice,
        }
    }
}

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to built-in defaults
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default configuration");
    Ok(Config::default())
}

/// Parse and validate a config.toml document
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;

    if config.dashboard.top_n == 0 || config.dashboard.view_n == 0 {
        anyhow::bail!("dashboard.top_n and dashboard.view_n must be positive");
    }
    if config.sources.orders_url.trim().is_empty()
        || config.sources.geolocation_url.trim().is_empty()
    {
        anyhow::bail!("sources.orders_url and sources.geolocation_url are required");
    }

    Ok(config)
}
