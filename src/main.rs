use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use streambalance::config::{Calibration, Layout, Params};
use streambalance::error::Result;
use streambalance::render;

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let params = Params::from_args(args.get(1..).unwrap_or_default())?;
    let out_dir: PathBuf = args
        .get(5)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("artifacts"));

    let cal = match std::env::var_os("STREAMBALANCE_CALIBRATION") {
        Some(path) => Calibration::load(&PathBuf::from(path))?,
        None => Calibration::default(),
    };
    let layout = Layout::default();

    tracing::info!(
        qs = params.qs(),
        d50 = params.d50(),
        qw = params.qw(),
        s = params.s(),
        "evaluating"
    );

    let (eval, timings) = streambalance::recompute(&params, &cal, &layout)?;
    for t in &timings {
        tracing::info!(stage = t.name, ms = t.ms, "timing");
    }

    println!("{}", eval.balance);
    println!("Pattern:       {}", eval.pattern);
    println!("Seed:          {}", eval.seed.value());
    println!("Primitives:    {}", eval.frame.len());

    std::fs::create_dir_all(&out_dir)?;

    let json_path = out_dir.join("frame.json");
    std::fs::write(&json_path, serde_json::to_string_pretty(&eval)?)?;
    tracing::info!(path = %json_path.display(), "saved");

    let rgba = render::render_frame(&eval.frame, &eval.balance, &layout);
    let png_path = out_dir.join("frame.png");
    image::save_buffer(
        &png_path,
        &rgba,
        layout.width as u32,
        layout.height as u32,
        image::ColorType::Rgba8,
    )?;
    tracing::info!(path = %png_path.display(), "saved");

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("streambalance=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "failed");
            ExitCode::FAILURE
        }
    }
}
