use clap::Parser;
use floorplan3d::app::{FloorplanApp, RunOptions};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "floorplan3d")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Headless entity-light floorplan driver", long_about = None)]
struct Args {
    /// Card configuration (JSON)
    #[arg(short, long)]
    config: PathBuf,

    /// Model manifest; defaults to obj_path next to the config
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Timeline of state changes and clicks
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Number of frames to run
    #[arg(long, default_value = "600")]
    frames: u64,

    /// Target frame rate
    #[arg(long, default_value = "60")]
    fps: f32,

    /// Pace frames in real time
    #[arg(long)]
    realtime: bool,

    /// Print the final light state as JSON
    #[arg(long)]
    report: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let options = RunOptions {
        fps: args.fps,
        realtime: args.realtime,
    };

    let mut app = match FloorplanApp::from_files(
        &args.config,
        args.model.as_deref(),
        args.script.as_deref(),
        options,
    ) {
        Ok(app) => app,
        Err(err) => {
            log::error!("Startup failed: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let report = app.run(args.frames);
    if args.report {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                log::error!("Failed to serialize report: {}", err);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
