mod cli;

use clap::{Parser, Subcommand};
use wraith_client::{ClientOptions, Level};

#[derive(Parser)]
#[command(
    name = "wraith-emit",
    version,
    about = "Emit InfraIQ telemetry events to the local Wraith collector"
)]
struct App {
    /// Never start the collector, even if it is not running
    #[arg(long, global = true)]
    no_spawn: bool,
    /// Do not print "sent" / "dropped"
    #[arg(long, short, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// A tool command started
    Invoked {
        #[arg(long)]
        tool: String,
        #[arg(long)]
        command: String,
        #[arg(long)]
        level: Option<Level>,
    },
    /// A tool command completed successfully
    Succeeded {
        #[arg(long)]
        tool: String,
        #[arg(long)]
        command: String,
        #[arg(long)]
        duration_ms: u64,
        #[arg(long)]
        level: Option<Level>,
    },
    /// A tool command failed
    Failed {
        #[arg(long)]
        tool: String,
        #[arg(long)]
        command: String,
        /// Error type tag (class or variant name, not the message)
        #[arg(long)]
        error_type: String,
        #[arg(long)]
        duration_ms: u64,
        #[arg(long)]
        level: Option<Level>,
    },
    /// An unhandled exception escaped the tool
    Exception {
        #[arg(long)]
        tool: String,
        #[arg(long)]
        exception_type: String,
        /// Sanitized traceback
        #[arg(long)]
        traceback: Option<String>,
        #[arg(long)]
        level: Option<Level>,
    },
    /// Generated output failed validation
    Validation {
        #[arg(long)]
        tool: String,
        #[arg(long)]
        validation_type: String,
        #[arg(long)]
        details: Option<String>,
        #[arg(long)]
        level: Option<Level>,
    },
    /// Show consent, identity and collector discovery state
    Status,
    /// Run a program, recording invoked / succeeded / failed around it
    Run {
        #[arg(long)]
        tool: String,
        #[arg(long)]
        command: String,
        /// Program and arguments (after `--`)
        #[arg(last = true, required = true)]
        argv: Vec<String>,
    },
}

fn main() {
    wraith_client::tracing_init::init_cli_tracing();
    let app = App::parse();

    let client = wraith_client::init_client(ClientOptions::default().auto_spawn(!app.no_spawn));

    // Emit commands: ALWAYS exit 0
    let code = match app.command {
        Commands::Invoked {
            tool,
            command,
            level,
        } => cli::emit::invoked(client, &tool, &command, level, app.quiet),
        Commands::Succeeded {
            tool,
            command,
            duration_ms,
            level,
        } => cli::emit::succeeded(client, &tool, &command, duration_ms, level, app.quiet),
        Commands::Failed {
            tool,
            command,
            error_type,
            duration_ms,
            level,
        } => cli::emit::failed(
            client,
            &tool,
            &command,
            &error_type,
            duration_ms,
            level,
            app.quiet,
        ),
        Commands::Exception {
            tool,
            exception_type,
            traceback,
            level,
        } => cli::emit::exception(
            client,
            &tool,
            &exception_type,
            traceback.as_deref(),
            level,
            app.quiet,
        ),
        Commands::Validation {
            tool,
            validation_type,
            details,
            level,
        } => cli::emit::validation(
            client,
            &tool,
            &validation_type,
            details.as_deref(),
            level,
            app.quiet,
        ),
        Commands::Status => cli::exit_code(cli::status::show(client)),
        Commands::Run {
            tool,
            command,
            argv,
        } => cli::run::run_exit_code(client, &tool, &command, &argv),
    };

    client.shutdown();
    std::process::exit(code);
}
