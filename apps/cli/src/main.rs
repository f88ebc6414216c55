mod cli;
mod config;
mod load;
mod render;
mod summary;

use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = config::init_app_config()?;

    let level = if config.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if !config.data_dir.is_dir() {
        eprintln!("{}", CliArgs::help_text());
        return Err(eyre!("data directory {} not found", config.data_dir.display()));
    }

    let datasets = load::load_datasets(&config.data_dir).await?;
    log::info!("loaded datasets from {}", config.data_dir.display());

    let summary = summary::build_summary(&datasets);
    if args.json {
        println!("{}", summary::render_json(&summary)?);
    } else {
        println!("{}", summary::render_text(&summary));
    }

    if args.render {
        let written =
            render::write_snapshots(&datasets, config.chart_width, &config.output_dir).await?;
        log::info!(
            "wrote {} snapshots to {}",
            written.len(),
            config.output_dir.display()
        );
    }

    Ok(())
}
