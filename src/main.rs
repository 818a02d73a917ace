use std::io;

use anyhow::{Context, Result};

use cf4_explorer::config::Config;
use cf4_explorer::data::loader;
use cf4_explorer::menu::{self, Settings};
use cf4_explorer::ui::WindowRenderer;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env().context("reading configuration")?;

    println!(
        "Loading the catalog ... please wait\n\tPath: {}",
        config.catalog_path.display()
    );
    let catalog = loader::load_catalog(&config.catalog_path)
        .with_context(|| format!("loading {}", config.catalog_path.display()))?;

    log::info!(
        "Loaded {} galaxies from {}",
        catalog.len(),
        config.catalog_path.display()
    );
    for summary in catalog.summary() {
        log::info!("  {summary}");
    }

    let settings = Settings {
        point_alpha: config.point_alpha,
    };
    let mut renderer = WindowRenderer {
        window_size: config.window_size,
    };

    let stdin = io::stdin();
    menu::run(&catalog, &settings, stdin.lock(), io::stdout(), &mut renderer)
}
