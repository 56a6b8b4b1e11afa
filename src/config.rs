use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{PillCheckError, PillCheckResult};
use crate::timeline::DEFAULT_TOLERANCE_MINUTES;

const CONFIG_FILE: &str = "config.toml";
const SERVER_URL_ENV: &str = "PILLCHECK_SERVER_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub driver: DriverConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// WebDriver/Appium endpoint, e.g. `http://localhost:4723/wd/hub`.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Resource id of the element spanning the 24h timeline.
    #[serde(default = "default_graph_element_id")]
    pub graph_element_id: String,
    #[serde(default = "default_pill_element_id")]
    pub pill_element_id: String,
    /// Sent verbatim as the W3C `alwaysMatch` capability set.
    #[serde(default = "default_capabilities")]
    pub capabilities: serde_json::Map<String, serde_json::Value>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            graph_element_id: default_graph_element_id(),
            pill_element_id: default_pill_element_id(),
            capabilities: default_capabilities(),
        }
    }
}

fn default_server_url() -> String {
    "http://localhost:4723/wd/hub".to_string()
}

fn default_graph_element_id() -> String {
    "graph_container_id".to_string()
}

fn default_pill_element_id() -> String {
    "pill_icon_id".to_string()
}

fn default_capabilities() -> serde_json::Map<String, serde_json::Value> {
    let caps = serde_json::json!({
        "platformName": "Android",
        "appium:automationName": "UiAutomator2",
        "appium:deviceName": "Your Device Name",
        "appium:appPackage": "your.app.package",
        "appium:appActivity": "your.app.MainActivity",
    });
    match caps {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance_minutes: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            tolerance_minutes: default_tolerance(),
        }
    }
}

fn default_tolerance() -> u32 {
    DEFAULT_TOLERANCE_MINUTES
}

/// Where tensor work runs. Only `cpu` is backed today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Device {
    #[default]
    Cpu,
    GpuIfAvailable,
}

/// The backend a [`Device`] preference resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputeBackend {
    Cpu,
}

impl Device {
    pub fn resolve(self) -> ComputeBackend {
        match self {
            Device::Cpu => ComputeBackend::Cpu,
            Device::GpuIfAvailable => {
                tracing::warn!("no GPU tensor backend compiled in; using CPU");
                ComputeBackend::Cpu
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default)]
    pub device: Device,
    /// A pixel is "red" iff R > red_min, G < green_max and B < blue_max (all 0..1).
    #[serde(default = "default_red_min")]
    pub red_min: f32,
    #[serde(default = "default_green_blue_max")]
    pub green_max: f32,
    #[serde(default = "default_green_blue_max")]
    pub blue_max: f32,
    /// Per-channel normalization applied when building the input tensor.
    #[serde(default = "default_mean")]
    pub mean: [f32; 3],
    #[serde(default = "default_std")]
    pub std: [f32; 3],
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            device: Device::default(),
            red_min: default_red_min(),
            green_max: default_green_blue_max(),
            blue_max: default_green_blue_max(),
            mean: default_mean(),
            std: default_std(),
        }
    }
}

fn default_red_min() -> f32 {
    0.6
}

fn default_green_blue_max() -> f32 {
    0.4
}

fn default_mean() -> [f32; 3] {
    [0.485, 0.456, 0.406]
}

fn default_std() -> [f32; 3] {
    [0.229, 0.224, 0.225]
}

/// Search order: next to the executable, working directory, user config dir.
fn discover_config_path() -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join(CONFIG_FILE);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Some(candidate);
            }
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        let candidate = cwd.join(CONFIG_FILE);
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found in working directory");
            return Some(candidate);
        }
    }

    let candidate = user_config_path()?;
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in user config dir");
        return Some(candidate);
    }
    None
}

/// `<config dir>/pillcheck/config.toml`, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pillcheck").join(CONFIG_FILE))
}

pub fn load_config_from(path: &Path) -> PillCheckResult<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), server = %config.driver.server_url, "config loaded");
    Ok(config)
}

/// Load the explicit `path` (which must exist) or the first discovered config
/// file, falling back to defaults. Environment overrides are applied last.
pub fn load_config(path: Option<&Path>) -> PillCheckResult<AppConfig> {
    let mut config = match path {
        Some(p) if !p.exists() => {
            return Err(PillCheckError::Config(format!(
                "config file {} does not exist",
                p.display()
            )))
        }
        Some(p) => load_config_from(p)?,
        None => match discover_config_path() {
            Some(p) => load_config_from(&p)?,
            None => {
                tracing::info!("no config.toml found; using built-in defaults");
                AppConfig::default()
            }
        },
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(url) = std::env::var(SERVER_URL_ENV) {
        if !url.trim().is_empty() {
            tracing::debug!(url = %url, "server url overridden from {}", SERVER_URL_ENV);
            config.driver.server_url = url;
        }
    }
}

pub fn save_config(config: &AppConfig, path: &Path) -> PillCheckResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
