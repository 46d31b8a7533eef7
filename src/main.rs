//! Prism viewer binary.
//!
//! ```text
//! prism [config.json]
//! ```
//!
//! Without an argument the builtin procedural assets are used.

use prism::{App, ViewerConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("prism=info,wgpu=warn"),
    )
    .init();

    let config = match std::env::args_os().nth(1) {
        Some(path) => ViewerConfig::load(path)?,
        None => {
            log::info!("No configuration given, using builtin assets");
            ViewerConfig::default()
        }
    };

    App::new(config).run()?;
    Ok(())
}
