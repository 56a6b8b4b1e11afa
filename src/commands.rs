use std::path::{Path, PathBuf};

use futures_util::FutureExt;

use crate::config::{self, AppConfig};
use crate::errors::{PillCheckError, PillCheckResult};
use crate::geometry::WebDriverSession;
use crate::timeline::ValidationResult;
use crate::validator::{validate_graph_image, AppPillValidator, ImagePillValidator};

/// Options for validating a live app through a WebDriver server.
#[derive(Debug, Clone, Default)]
pub struct AppArgs {
    pub expected: String,
    pub graph_id: Option<String>,
    pub pill_id: Option<String>,
    pub tolerance: Option<u32>,
    pub server_url: Option<String>,
    /// Save the device screen here before measuring.
    pub screenshot: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct ImageArgs {
    pub paths: Vec<PathBuf>,
    pub expected: String,
    pub tolerance: Option<u32>,
    pub annotate_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum Command {
    App(AppArgs),
    Image(ImageArgs),
    InitConfig { path: Option<PathBuf>, force: bool },
}

/// Run `command`. `Ok(false)` means a validation ran and failed.
pub async fn execute(command: Command, config_path: Option<&Path>) -> PillCheckResult<bool> {
    match command {
        Command::InitConfig { path, force } => {
            let written = init_config(path, force)?;
            println!("Wrote default configuration to {}", written.display());
            Ok(true)
        }
        Command::App(args) => {
            let cfg = config::load_config(config_path)?;
            let result = validate_app(&cfg, args).await?;
            print_result(&result);
            Ok(result.is_valid)
        }
        Command::Image(args) => {
            let cfg = config::load_config(config_path)?;
            validate_images(&cfg, &args)
        }
    }
}

fn print_result(result: &ValidationResult) {
    println!("Validation result: {}", result.verdict());
    println!("{}", result.message);
}

pub async fn validate_app(cfg: &AppConfig, args: AppArgs) -> PillCheckResult<ValidationResult> {
    let mut driver = cfg.driver.clone();
    if let Some(url) = args.server_url {
        driver.server_url = url;
    }
    let graph_id = args.graph_id.unwrap_or_else(|| driver.graph_element_id.clone());
    let pill_id = args.pill_id.unwrap_or_else(|| driver.pill_element_id.clone());
    let tolerance = args.tolerance.unwrap_or(cfg.validation.tolerance_minutes);
    let expected = args.expected;
    let screenshot = args.screenshot;

    tracing::info!(server = %driver.server_url, graph = %graph_id, pill = %pill_id, "validating app pill");

    WebDriverSession::scoped(&driver, move |session| {
        async move {
            if let Some(path) = screenshot {
                let png = session.screenshot().await?;
                tokio::fs::write(&path, png).await?;
                tracing::info!(path = %path.display(), "device screenshot saved");
            }

            let mut validator = AppPillValidator::new(session);
            validator.load_graph_bounds(&graph_id).await?;
            validator.validate_pill_position(&pill_id, &expected, tolerance).await
        }
        .boxed()
    })
    .await
}

/// Validate each image in turn. Per-image failures are reported and counted
/// as invalid; the batch keeps going.
pub fn validate_images(cfg: &AppConfig, args: &ImageArgs) -> PillCheckResult<bool> {
    if args.paths.is_empty() {
        return Err(PillCheckError::Config("no images given".into()));
    }
    let validator = ImagePillValidator::new(&cfg.detection)?;
    let tolerance = args.tolerance.unwrap_or(cfg.validation.tolerance_minutes);

    let mut all_valid = true;
    for path in &args.paths {
        println!("\nValidating {}...", path.display());
        let annotate_to = args.annotate_dir.as_deref().map(|dir| annotated_path(dir, path));

        match validate_graph_image(&validator, path, &args.expected, tolerance, annotate_to.as_deref()) {
            Ok(result) => {
                print_result(&result);
                all_valid &= result.is_valid;
            }
            Err(e @ PillCheckError::Format(_)) => return Err(e),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "image validation failed");
                println!("Validation result: Invalid");
                println!("{e}");
                all_valid = false;
            }
        }
    }
    Ok(all_valid)
}

/// `<dir>/<stem>_annotated.png`
fn annotated_path(dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    dir.join(format!("{stem}_annotated.png"))
}

/// Write a default config to `path` (or the user config location).
pub fn init_config(path: Option<PathBuf>, force: bool) -> PillCheckResult<PathBuf> {
    let path = match path {
        Some(p) => p,
        None => config::user_config_path()
            .ok_or_else(|| PillCheckError::Config("no user config directory on this platform".into()))?,
    };
    if path.exists() && !force {
        return Err(PillCheckError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    config::save_config(&AppConfig::default(), &path)?;
    Ok(path)
}
