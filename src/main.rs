use galaxy::{AppError, GalaxyParams, Viewer};

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::var("GALAXY_SEED").ok().and_then(|s| s.parse().ok());

    let mut viewer = Viewer::new().with_params(GalaxyParams::default());
    if let Some(seed) = seed {
        log::info!("using seed {}", seed);
        viewer = viewer.with_seed(seed);
    }
    viewer.run()
}
