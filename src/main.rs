// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, build the client
//   and hand it to the interactive menu or the headless sender.
// - Exit code 1 only for headless failures; the interactive flow reports
//   its own errors and returns normally.

use clap::{Parser, Subcommand};
use scratch_cli::{headless, ui, ScratchClient};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "scratch-cli", version, about = "Sign in to Scratch, read messages and post comments")]
struct Cli {
    /// Log request traffic at debug level (RUST_LOG overrides this).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive menu (default).
    Interactive,
    /// Sign in and post a single comment without prompting.
    Send(headless::SendArgs),
}

fn main() -> anyhow::Result<()> {
    // Variables in `.env` feed the clap env fallbacks below.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Base URLs come from `SCRATCH_SITE_URL` / `SCRATCH_API_URL` or
    // default to the public platform. See `config::ScratchConfig`.
    let client = ScratchClient::from_env()?;

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Interactive => ui::run(client),
        Command::Send(args) => match headless::run(client, &args) {
            Ok(outcome) if outcome.is_posted() => Ok(()),
            Ok(_) => std::process::exit(1),
            Err(e) => {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
        },
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,scratch_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
