use clap::Parser as ClapParser;
use std::path::PathBuf;
use steady_engine::cli::{self, FileErrorMode, FileOptions, OutputHandlers, ReplOptions};
use steady_engine::config::ConfigLoader;
use steady_engine::executor::CommandExecutor;
use steady_engine::session::Session;
use steady_wd::driver::WebDriverDriver;
use tracing::{error, info};

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL of the WebDriver server. Overrides `webdriver.url` from the config file.
    #[arg(short, long)]
    webdriver_url: Option<String>,

    /// Config file (defaults to ./steady.yaml, then ~/.steady/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Script file to execute
    #[arg(short, long)]
    file: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(path).await?,
        None => ConfigLoader::load_default().await?,
    };
    if let Some(url) = args.webdriver_url {
        config.webdriver.url = url;
    }

    let driver = WebDriverDriver::new(config.webdriver.clone());
    let mut executor = CommandExecutor::with_screenshots(config.screenshots.clone());
    let mut session = Session::new(driver, config);

    match session.launch().await {
        Ok(_) => info!("WebDriver session ready."),
        Err(e) => {
            error!("Failed to launch: {}", e);
            std::process::exit(1);
        }
    }

    let output = OutputHandlers {
        out: |msg| println!("{}", msg),
        err: |msg| error!("{}", msg),
    };

    let result = if let Some(file_path) = args.file {
        cli::run_file(
            &session,
            &mut executor,
            output,
            &file_path,
            FileOptions {
                stop_on_error: true,
                error_mode: FileErrorMode::Plain,
            },
        )
        .await
        .map(|report| info!(executed = report.executed, "script finished"))
    } else {
        let repl_options = ReplOptions {
            banner_lines: &[
                "Session ready. Enter commands (e.g., 'goto example.com', 'click #submit'). Type 'exit' to quit or Ctrl+C to shutdown.",
            ],
            prompt: "> ",
            exit_commands: &["exit", "quit"],
            handle_ctrl_c: true,
            ctrl_c_message: Some("\nShutdown signal received."),
        };
        cli::run_repl(&session, &mut executor, output, repl_options).await
    };

    session.close().await?;
    result
}
