//====================================================================

use clap::Parser;
use cli::Cli;

mod cli;

//====================================================================

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::debug!("{:?}", cli);

    game::run(cli.config(), cli.seed)
}

//====================================================================
