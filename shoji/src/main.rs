mod config;
mod core;
mod host;
mod window;

use anyhow::{Context, Result};
use argh::FromArgs;
use host::{DisplayProvider, HostProcess};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use window::Window;

#[derive(FromArgs)]
/// Open a web-content window placed on a chosen display.
struct Args {
    /// host backend, runs `shoji-host-<name>` (default: headless)
    #[argh(option, default = "String::from(\"headless\")")]
    host: String,

    #[argh(subcommand)]
    command: SubCommand,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum SubCommand {
    Open(OpenArgs),
    Resolve(ResolveArgs),
    Displays(DisplaysArgs),
}

#[derive(FromArgs)]
/// Create the window and wait until it is closed.
#[argh(subcommand, name = "open")]
struct OpenArgs {
    /// path to the window configuration (JSON)
    #[argh(option)]
    config: Option<PathBuf>,

    /// JSON payload sent to the window as a `data` event after creation
    #[argh(option)]
    data: Option<String>,
}

#[derive(FromArgs)]
/// Print the geometry the window would be created with.
#[argh(subcommand, name = "resolve")]
struct ResolveArgs {
    /// path to the window configuration (JSON)
    #[argh(option)]
    config: Option<PathBuf>,
}

#[derive(FromArgs)]
/// List displays with the selector that targets each.
#[argh(subcommand, name = "displays")]
struct DisplaysArgs {}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();
    tracing::info!("shoji starting with host '{}'", args.host);

    let mut host = HostProcess::spawn(&args.host)?;
    let result = match args.command {
        SubCommand::Open(open) => run_open(open, &mut host),
        SubCommand::Resolve(resolve) => run_resolve(resolve, &mut host),
        SubCommand::Displays(_) => run_displays(&mut host),
    };
    // the host is reaped on failure too
    let shutdown = host.shutdown();
    result?;
    shutdown
}

fn run_open(args: OpenArgs, host: &mut HostProcess) -> Result<()> {
    let config = config::load(args.config.as_deref())?;
    let payload = args
        .data
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("Invalid --data payload")?;

    let displays = host.displays()?;
    let mut window = Window::create(&config, &displays, host)?;
    window.on_closed(|| tracing::info!("Main window closed"));

    window.focus()?;
    if let Some(payload) = payload {
        window.send("data", payload)?;
    }

    tracing::info!("Waiting for window {} to close", window.handle());
    window.wait_closed()
}

fn run_resolve(args: ResolveArgs, host: &mut HostProcess) -> Result<()> {
    let config = config::load(args.config.as_deref())?;
    let displays = host.displays()?;
    let geometry = core::resolve(&config, &displays)?;
    println!("{}", serde_json::to_string(&geometry)?);
    Ok(())
}

fn run_displays(host: &mut HostProcess) -> Result<()> {
    let displays = host.displays()?;
    let describe = |selector: String, display: &core::Display| {
        let b = display.bounds;
        let w = display.work_area;
        println!(
            "{:<8} id={} bounds={},{} {}x{} work_area={},{} {}x{}",
            selector, display.id, b.x, b.y, b.width, b.height, w.x, w.y, w.width, w.height
        );
    };

    describe("primary".to_string(), displays.primary());
    for (index, display) in displays.secondary().iter().enumerate() {
        describe(index.to_string(), display);
    }
    Ok(())
}
