use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = ascii_reactor::config::Config::parse();
    if cfg.list_devices {
        ascii_reactor::audio::list_input_devices()?;
        return Ok(());
    }

    ascii_reactor::logging::init(cfg.log_file.as_deref())?;
    ascii_reactor::app::run(cfg)
}
