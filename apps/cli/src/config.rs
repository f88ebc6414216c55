use std::env;
use std::path::PathBuf;

use color_eyre::eyre::{eyre, Result};
use dotenv::dotenv;

pub const DEFAULT_WIDTH: f64 = 960.0;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub chart_width: f64,
    pub debug: bool,
}

/// Reads `.env` and the environment. CLI flags have already been written
/// into the environment by [`crate::cli::CliArgs::apply_env_overrides`].
pub fn init_app_config() -> Result<AppConfig> {
    dotenv().ok();
    from_env()
}

fn from_env() -> Result<AppConfig> {
    let base_dir = env::current_dir()?;
    let data_dir = env::var("DATA_DIR").map_or_else(|_| base_dir.join("data"), PathBuf::from);
    let output_dir =
        env::var("OUTPUT_DIR").map_or_else(|_| base_dir.join("snapshots"), PathBuf::from);

    let chart_width = match env::var("CHART_WIDTH") {
        Ok(raw) => parse_width(&raw)?,
        Err(_) => DEFAULT_WIDTH,
    };
    let debug = env::var("DEBUG").is_ok_and(|value| !value.is_empty() && value != "0");

    Ok(AppConfig {
        data_dir,
        output_dir,
        chart_width,
        debug,
    })
}

fn parse_width(raw: &str) -> Result<f64> {
    let width: f64 = raw
        .trim()
        .parse()
        .map_err(|_| eyre!("CHART_WIDTH must be a number, got {raw:?}"))?;
    if width < 200.0 {
        return Err(eyre!("CHART_WIDTH must be at least 200, got {width}"));
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_is_validated() {
        assert!((parse_width(" 640 ").unwrap() - 640.0).abs() < f64::EPSILON);
        assert!(parse_width("wide").is_err());
        assert!(parse_width("50").is_err());
    }
}
