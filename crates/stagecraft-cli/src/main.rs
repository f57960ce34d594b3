use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "stagecraft", version, about = "Stagecraft pipeline macro")]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Namespace of the custom resource types (overrides the config file)
    #[arg(long, global = true, env = "MACRO_NAME")]
    namespace: Option<String>,

    /// Path to a YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a macro request and write the response.
    Process {
        /// Request file (JSON or YAML). Reads stdin when omitted or "-".
        input: Option<PathBuf>,

        /// Write the response here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Validate the custom resources of a template and report every violation.
    Check {
        /// Template file (JSON or YAML)
        template: PathBuf,
    },

    /// Print a template with its custom resources expanded.
    Render {
        /// Template file (JSON or YAML)
        template: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Print the declarative schema used for validation.
    Schema {
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_config(cli.namespace.as_deref(), cli.config.as_deref())?;
    let processor = commands::build_processor(config)?;

    match cli.cmd {
        Command::Process {
            input,
            output,
            format,
        } => commands::process::run(&processor, input.as_deref(), output.as_deref(), format)?,

        Command::Check { template } => commands::check::run(&processor, &template)?,

        Command::Render { template, format } => {
            commands::render::run(&processor, &template, format)?
        }

        Command::Schema { format } => commands::schema::run(&processor, format)?,
    }

    Ok(())
}
