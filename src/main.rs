use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pillcheck_lib::commands::{AppArgs, Command, ImageArgs};

#[derive(Debug, Parser)]
#[command(
    name = "pillcheck",
    about = "Validate the position of a timeline pill against an expected time",
    version,
    long_about = "Validate the position of a timeline pill against an expected time.\n\nExamples:\n  pillcheck app --expected \"8:00 PM\"                 # Measure the pill through an Appium server\n  pillcheck image shot.png --expected \"8:00 PM\"      # Detect the red pill in a screenshot\n  pillcheck image *.png -e \"4:00 PM\" --annotate-dir out\n  pillcheck init-config                              # Write a default config.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config.toml (defaults to discovery next to the binary, cwd, then user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate a running app through a WebDriver (Appium) server
    App {
        /// Expected time, e.g. "8:00 PM"
        #[arg(short, long)]
        expected: String,

        /// Resource id of the graph container
        #[arg(long)]
        graph_id: Option<String>,

        /// Resource id of the pill icon
        #[arg(long)]
        pill_id: Option<String>,

        /// Accepted deviation in minutes
        #[arg(short, long)]
        tolerance: Option<u32>,

        /// WebDriver server URL
        #[arg(long)]
        server: Option<String>,

        /// Save a device screenshot to this path
        #[arg(long)]
        screenshot: Option<PathBuf>,
    },

    /// Validate graph screenshots by detecting the red pill
    Image {
        /// Image files to validate
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Expected time, e.g. "8:00 PM"
        #[arg(short, long)]
        expected: String,

        /// Accepted deviation in minutes
        #[arg(short, long)]
        tolerance: Option<u32>,

        /// Write annotated copies of each image into this directory
        #[arg(long)]
        annotate_dir: Option<PathBuf>,
    },

    /// Write a default configuration file
    InitConfig {
        /// Destination (defaults to the user config directory)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl From<Commands> for Command {
    fn from(cmd: Commands) -> Self {
        match cmd {
            Commands::App {
                expected,
                graph_id,
                pill_id,
                tolerance,
                server,
                screenshot,
            } => Command::App(AppArgs {
                expected,
                graph_id,
                pill_id,
                tolerance,
                server_url: server,
                screenshot,
            }),
            Commands::Image {
                paths,
                expected,
                tolerance,
                annotate_dir,
            } => Command::Image(ImageArgs {
                paths,
                expected,
                tolerance,
                annotate_dir,
            }),
            Commands::InitConfig { path, force } => Command::InitConfig { path, force },
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let code = pillcheck_lib::run(cli.command.into(), cli.config, cli.verbose).await;
    std::process::exit(code);
}
