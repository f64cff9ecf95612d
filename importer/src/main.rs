#[macro_use]
extern crate log;

use std::path::Path;

use structopt::StructOpt;

use importer::{Configuration, StageError};

#[derive(StructOpt)]
#[structopt(
    name = "importer",
    about = "Imports Bird Avoidance Model rasters from the Avian Hazard Advisory System"
)]
struct Flags {
    /// Override the URL of the zipped overlay descriptors
    #[structopt(long)]
    url: Option<String>,
    /// Override the directory all artifacts are written under
    #[structopt(long)]
    working_dir: Option<String>,
}

#[tokio::main]
async fn main() {
    // Intercept messages using the `log` crate and print them to STDOUT
    {
        use env_logger::{Builder, Env};
        Builder::from_env(Env::default().default_filter_or("info")).init();
    }

    let flags = Flags::from_args();
    let mut config = importer::load_configuration();
    if let Some(dir) = flags.working_dir {
        config = Configuration::new(config.archive_url.clone(), Path::new(&dir));
    }
    if let Some(url) = flags.url {
        config.archive_url = url;
    }

    if let Err(err) = import(&config).await {
        error!("{}", err);
        std::process::exit(1);
    }
    info!("All overlays imported to {}", config.workspace_dir.display());
}

#[cfg(feature = "gdal-backend")]
async fn import(config: &Configuration) -> Result<(), StageError> {
    let engine =
        georef::GdalEngine::new(&config.workspace_dir).map_err(StageError::Georeference)?;
    importer::run(config, &engine).await
}

#[cfg(not(feature = "gdal-backend"))]
async fn import(_: &Configuration) -> Result<(), StageError> {
    panic!("Can't georeference without the gdal-backend feature compiled in");
}
