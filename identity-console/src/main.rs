use clap::Parser;
use identity_console::{
    output, state::build_service, Cli, Config, ConsoleResult, Menu, StdTerminal,
};
use identity_domain::LogFormat;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(config: &Config) {
    let registry = tracing_subscriber::registry().with(
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
    );

    // Source locations only while developing
    let located = config.development;
    match config.log_format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(located)
                    .with_line_number(located)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(located)
                    .with_line_number(located)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_file(located)
                    .with_line_number(located)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

async fn run(cli: Cli, config: Config) -> ConsoleResult<()> {
    let service = build_service(&config).await?;

    if cli.is_script_mode() {
        info!(commands = ?cli.script, "Script mode requested");
        println!("{}", output::info("Script mode not yet implemented"));
        return Ok(());
    }

    Menu::new(&service, StdTerminal).run().await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", output::error(&format!("Failed to load configuration: {e}")));
            std::process::exit(e.exit_code());
        }
    };

    init_tracing(&config);
    info!(
        store = %config.store.connection_string,
        level = %config.log_level,
        development = config.development,
        "Starting identity console"
    );

    if let Err(e) = run(cli, config).await {
        eprintln!("{}", output::error(&e.to_string()));
        std::process::exit(e.exit_code());
    }
}
