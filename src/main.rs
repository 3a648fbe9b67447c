//! DayMate terminal client

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use daymate_app::{render, render_notices, run_line, AppModel, AppServices, Outcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "daymate")]
#[command(about = "Weather, news and an AI daily plan for your locations")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding config and DAYMATE_API_BASE
    #[arg(long)]
    api_base: Option<String>,

    /// Ignore a persisted token for this run
    #[arg(long)]
    guest: bool,

    /// Read commands from a file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    daymate_core::init()?;

    let mut app = daymate_core::App::new(cli.config.as_deref())?;
    if let Some(base) = &cli.api_base {
        app.override_api_base(base).context("Invalid --api-base")?;
    }
    for warning in app.warnings() {
        tracing::warn!("Config {}: {}", warning.field, warning.message);
    }

    let services =
        AppServices::from_config(app.config()).context("Failed to set up services")?;
    let mut model = services.start_model(cli.guest).await;
    model.settle().await;
    print_screen(&mut model)?;

    match &cli.script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            run_loop(&mut model, BufReader::new(file), false).await?;
        }
        None => run_loop(&mut model, BufReader::new(tokio::io::stdin()), true).await?,
    }

    tracing::info!("Shutting down DayMate");
    Ok(())
}

async fn run_loop<R>(model: &mut AppModel, reader: R, interactive: bool) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        if interactive {
            prompt()?;
        }
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if !interactive && !line.trim().is_empty() {
            println!("> {}", line.trim());
        }

        match run_line(model, &line).await {
            Outcome::Quit => break,
            Outcome::Print(text) => {
                model.settle().await;
                if !text.is_empty() {
                    println!("{}", text.trim_end());
                }
                print_notices(model);
            }
            Outcome::Render => {
                model.settle().await;
                print_screen(model)?;
            }
        }
    }
    Ok(())
}

fn prompt() -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(b"daymate> ")?;
    stdout.flush()?;
    Ok(())
}

fn print_notices(model: &mut AppModel) {
    let notices = model.take_notices();
    if !notices.is_empty() {
        print!("{}", render_notices(&notices));
    }
}

fn print_screen(model: &mut AppModel) -> Result<()> {
    print_notices(model);
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(render(model).as_bytes())?;
    stdout.flush()?;
    Ok(())
}
