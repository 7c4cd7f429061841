pub mod args;
pub mod article;
pub mod config;
pub mod error;
pub mod fs;
pub mod markdown;
pub mod metadata;
pub mod minify;
pub mod pages;
pub mod renderer;
pub mod search;
pub mod site;
pub mod store;
pub mod templating;

use std::process::ExitCode;

use args::{Args, Commands, Usage};
use clap::Parser;
use config::Config;
use error::KijiErr;
use metadata::now_in;
use store::ArticleStore;
use tracing::error;
use tracing_log::AsTrace;

async fn run(args: Args) -> Result<(), KijiErr> {
    let config = Config::try_from(args.path)?;
    let store = ArticleStore::new(config.articles_dir());
    match args.command {
        Commands::Create => {
            let record = store.create(now_in(config.offset()?)).await?;
            println!("{}", store.article_dir(&record.id).display());
        }
        Commands::Reset(reset) => {
            let record = store.reset(&reset.id, now_in(config.offset()?)).await?;
            println!("{}", store.article_dir(&record.id).display());
        }
        Commands::Build(build) => {
            let report = site::build(&config, build.clean).await?;
            println!("{}", report.dist_path.display());
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let usage = Usage::from(e);
            print!("{}", usage.text);
            return ExitCode::from(usage.code);
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(args.verbose.log_level_filter().as_trace())
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
