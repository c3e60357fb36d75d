use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use terraform_moved_remover::config::{Config, Overrides};

#[derive(Parser)]
#[command(
    name = "terraform-moved-remover",
    version,
    about = "Recursively removes moved blocks from Terraform files and normalizes their layout",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(help = "Directory to scan for Terraform files")]
    directory: Option<PathBuf>,

    #[arg(long, help = "Run without modifying files")]
    dry_run: bool,

    #[arg(long, help = "Block kind to remove (default: moved)")]
    block_kind: Option<String>,

    #[arg(long, help = "Keep runs of blank lines left behind by removed blocks")]
    no_normalize: bool,

    #[arg(long, help = "Skip canonical layout of rendered files")]
    no_format: bool,

    #[arg(long, global = true, help = "Config file path")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Profile name")]
    profile: Option<String>,

    #[arg(long, help = "Print the summary as JSON")]
    json: bool,

    #[arg(long, help = "Pretty-print JSON output")]
    pretty: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Verbose logging")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    Config(ConfigCommand),
}

#[derive(Parser)]
struct ConfigCommand {
    #[command(subcommand)]
    subcommand: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    Init {
        #[arg(long)]
        global: bool,
    },
    Show,
    Path {
        #[arg(long)]
        global: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let overrides = Overrides {
        dry_run: cli.dry_run,
        block_kind: cli.block_kind,
        no_normalize: cli.no_normalize,
        no_format: cli.no_format,
    };

    match cli.command {
        Some(Command::Config(cmd)) => {
            handle_config(cmd, cli.config.as_ref(), cli.profile.as_ref(), overrides)
        }
        None => {
            let Some(directory) = cli.directory else {
                anyhow::bail!("No directory specified. Run with --help for usage.");
            };

            let config = Config::load(cli.config.as_ref(), cli.profile.as_ref(), overrides)?;
            handle_run(directory, &config, cli.json, cli.pretty)
        }
    }
}

fn handle_run(directory: PathBuf, config: &Config, json: bool, pretty: bool) -> Result<()> {
    if !json {
        println!("Scanning directory: {}", directory.display());
    }

    let summary = terraform_moved_remover::run(&directory, config)?;

    if json {
        println!(
            "{}",
            terraform_moved_remover::report::render_json(&summary, pretty)?
        );
    } else {
        println!("Found {} Terraform files", summary.files_found);
        print!("{}", terraform_moved_remover::report::render_text(&summary)?);
    }

    Ok(())
}

fn handle_config(
    cmd: ConfigCommand,
    config_path: Option<&PathBuf>,
    profile: Option<&String>,
    overrides: Overrides,
) -> Result<()> {
    match cmd.subcommand {
        ConfigSubcommand::Init { global } => {
            let path = Config::init_config(global)?;
            println!("Created config file: {:?}", path);
            Ok(())
        }
        ConfigSubcommand::Show => {
            let config = Config::load(config_path, profile, overrides)?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigSubcommand::Path { global } => {
            let path = if global {
                Config::global_config_path()
            } else {
                // Try project config first, fall back to global
                Config::project_config_path().or_else(Config::global_config_path)
            };

            if let Some(p) = path {
                println!("{}", p.display());
            } else {
                anyhow::bail!("Config file not found");
            }
            Ok(())
        }
    }
}
