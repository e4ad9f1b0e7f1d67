//! Reposite CLI
//!
//! Turns AI-drafted project content into a deployable static site.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use reposite::cmd::build::BuildArgs;

/// Command-line interface for Reposite.
#[derive(Parser)]
#[command(
    name = "reposite",
    version,
    about = "Generate a static project site from AI-drafted content"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "reposite.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Render and bundle a site
    Build(BuildArgs),
    /// Validate configuration, template key and content without writing
    Check {
        /// Content file to normalize
        #[arg(long)]
        content: Option<std::path::PathBuf>,
        /// Template key to resolve
        #[arg(short, long)]
        template: Option<String>,
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    reposite::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build(args) => {
            reposite::cmd::build::run(&cli.config, &args)?;
        }
        Commands::Check {
            content,
            template,
            strict,
        } => {
            reposite::cmd::check::run(&cli.config, content.as_deref(), template.as_deref(), strict)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_build_command_parsing() {
        let args = ["reposite", "build", "content.md", "--output", "dist"];
        let cli = Cli::parse_from(args);

        assert_eq!(cli.config, std::path::PathBuf::from("reposite.toml"));
        assert_eq!(cli.verbose, 0);

        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.content, std::path::PathBuf::from("content.md"));
                assert_eq!(args.output, std::path::PathBuf::from("dist"));
                assert!(args.request.is_none());
                assert!(args.template.is_none());
                assert!(!args.demo);
                assert!(!args.no_minify);
            }
            Commands::Check { .. } => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_build_defaults_output() {
        let cli = Cli::parse_from(["reposite", "build", "content.md"]);

        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.output, std::path::PathBuf::from("public"));
            }
            Commands::Check { .. } => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_build_flags() {
        let args = [
            "reposite",
            "build",
            "content.json",
            "--request",
            "request.json",
            "--site-id",
            "s1",
            "--name",
            "Acme",
            "-t",
            "developer-library",
            "--demo",
            "--video",
            "--slideshow",
            "--no-minify",
            "--no-images",
        ];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.request, Some(std::path::PathBuf::from("request.json")));
                assert_eq!(args.site_id.as_deref(), Some("s1"));
                assert_eq!(args.name.as_deref(), Some("Acme"));
                assert_eq!(args.template.as_deref(), Some("developer-library"));
                assert!(args.demo && args.video && args.slideshow);
                assert!(args.no_minify && args.no_images);
            }
            Commands::Check { .. } => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_check_command_parsing() {
        let args = ["reposite", "check", "--content", "c.md", "--template", "x", "--strict"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Check {
                content,
                template,
                strict,
            } => {
                assert_eq!(content, Some(std::path::PathBuf::from("c.md")));
                assert_eq!(template.as_deref(), Some("x"));
                assert!(strict);
            }
            Commands::Build(_) => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_verbosity_flags() {
        let cli = Cli::parse_from(["reposite", "-vvv", "check"]);
        assert_eq!(cli.verbose, 3);

        let cli = Cli::parse_from(["reposite", "check", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_custom_config_path() {
        let cli = Cli::parse_from(["reposite", "--config", "site.toml", "check"]);
        assert_eq!(cli.config, std::path::PathBuf::from("site.toml"));
    }
}
