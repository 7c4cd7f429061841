use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

use crate::article::ArticleId;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
    /// Path to the project directory.
    #[clap(short, long, global = true, default_value = ".")]
    pub path: PathBuf,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        name = "create",
        visible_alias = "new",
        about = "Create a new article stamped with the current time."
    )]
    Create,
    #[command(
        name = "reset",
        about = "Re-date an article to now, renaming its directory."
    )]
    Reset(ResetArgs),
    #[command(name = "build", about = "Build the site into the output directory.")]
    Build(BuildArgs),
}

#[derive(Parser, Debug)]
pub struct ResetArgs {
    /// Id (directory name) of the article to reset.
    pub id: ArticleId,
}

#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Remove the whole output directory before building.
    #[clap(long, action)]
    pub clean: bool,
}

/// What to print, and the exit status, when the command line is not a runnable command.
/// Help and version requests end up here as well, with status 0.
#[derive(Debug)]
pub struct Usage {
    pub text: String,
    pub code: u8,
}

impl From<clap::Error> for Usage {
    fn from(e: clap::Error) -> Self {
        Self {
            text: e.render().to_string(),
            code: u8::try_from(e.exit_code()).unwrap_or(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn parses_commands() {
        let args = Args::try_parse_from(["kiji", "new"]).unwrap();
        assert!(matches!(args.command, Commands::Create));

        let args = Args::try_parse_from(["kiji", "reset", "20240101000000"]).unwrap();
        assert!(matches!(args.command, Commands::Reset(r) if r.id.as_str() == "20240101000000"));

        let args = Args::try_parse_from(["kiji", "build", "--clean", "-p", "blog"]).unwrap();
        assert!(matches!(args.command, Commands::Build(BuildArgs { clean: true })));
        assert_eq!(args.path, PathBuf::from("blog"));
    }

    #[test]
    fn rejects_missing_or_malformed_id() {
        let err = Args::try_parse_from(["kiji", "reset"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        let err = Args::try_parse_from(["kiji", "reset", "yesterday"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn requires_a_command() {
        assert!(Args::try_parse_from(["kiji"]).is_err());
        assert!(Args::try_parse_from(["kiji", "publish"]).is_err());
    }

    #[test]
    fn usage_carries_text_and_status() {
        let usage = Usage::from(Args::try_parse_from(["kiji", "publish"]).unwrap_err());
        assert_eq!(usage.code, 2);
        assert!(usage.text.contains("publish"), "{}", usage.text);
        assert!(usage.text.contains("Usage"), "{}", usage.text);

        let usage = Usage::from(Args::try_parse_from(["kiji", "--help"]).unwrap_err());
        assert_eq!(usage.code, 0);
        assert!(usage.text.contains("build"), "{}", usage.text);
    }
}
