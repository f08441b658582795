use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use wb_core::RequestContext;
use wb_core::types::ids::ClassId;
use wb_events::types::EventSource;
use wb_serve::AppState;
use wb_serve::config::ServeConfig;

#[derive(Parser)]
#[command(name = "wb", about = "Live class sessions and leaderboards")]
struct Cli {
    /// TOML config file; `WODBOARD_*` variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Create or update the database schema.
    Migrate,
    /// Import workouts, classes and bookings from a TOML fixture file.
    Seed { file: PathBuf },
    /// Retry finalization for an ended class.
    Finalize { class_id: ClassId },
    /// Print the OpenAPI document.
    Openapi,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Command::Openapi = cli.command {
        println!("{}", wb_serve::openapi::generate_spec());
        return ExitCode::SUCCESS;
    }

    let config = match ServeConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_json);

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!(error = %message, "wb failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: ServeConfig) -> Result<(), String> {
    wb_serve::prepare_db(&config).map_err(|err| err.to_string())?;
    let state = AppState::new(config);
    let ctx = RequestContext::new(EventSource::Cli, None);
    match command {
        Command::Serve => wb_serve::serve(state)
            .await
            .map_err(|err| format!("serve error: {err}")),
        Command::Migrate => {
            tracing::info!(db_path = %state.config.db_path, "schema up to date");
            Ok(())
        }
        Command::Seed { file } => {
            let seed = wb_db::fixtures::load(&file).map_err(|err| err.to_string())?;
            let live = wb_serve::build_live(&state).map_err(|err| err.to_string())?;
            let summary = live
                .workouts()
                .import(&ctx, seed.workouts, seed.classes)
                .map_err(|err| format!("{}: {err}", err.code()))?;
            print_json(&summary)
        }
        Command::Finalize { class_id } => {
            let live = wb_serve::build_live(&state).map_err(|err| err.to_string())?;
            let report = live
                .finalization()
                .finalize(&ctx, class_id)
                .map_err(|err| format!("{}: {err}", err.code()))?;
            print_json(&report)
        }
        Command::Openapi => Ok(()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{json}");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
