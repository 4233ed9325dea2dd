//! Render a circular, bordered profile picture from an image on disk.
//!
//! Runs the same upload validation, session checks and compositing as
//! the web app, then writes `<username>-octrafied-pfp.png` to the
//! output directory.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};

use clap::Parser;
use octrafy_compositor::{PfpConfig, Rgb, Session, export_circular_pfp};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Render a circular, bordered profile picture from an image file.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Input image path.
    image: PathBuf,

    /// Username the picture is named after.
    #[arg(short, long)]
    username: String,

    /// Directory the PNG is written to.
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Border color as `#rgb` or `#rrggbb`.
    #[arg(long, value_parser = Rgb::parse_hex)]
    border_color: Option<Rgb>,

    /// Border width in pixels (0 disables the border).
    #[arg(long)]
    border_width: Option<f32>,

    /// Full compositing config as a JSON string.
    ///
    /// When provided, the individual config flags are ignored. Missing
    /// fields take their default values.
    #[arg(long)]
    config_json: Option<String>,

    /// Log each step.
    #[arg(short, long)]
    verbose: bool,
}

/// Build the compositing config from `--config-json` or the individual
/// flags.
fn config_from_cli(cli: &Cli) -> Result<PfpConfig, String> {
    let config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        let defaults = PfpConfig::default();
        PfpConfig {
            border_color: cli.border_color.unwrap_or(defaults.border_color),
            border_width: cli.border_width.unwrap_or(defaults.border_width),
            ..defaults
        }
    };
    config.validate().map_err(|e| format!("Invalid config: {e}"))?;
    Ok(config)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map_or_else(String::new, |name| name.to_string_lossy().into_owned())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = config_from_cli(&cli)?;
    debug!(?config, "resolved config");

    eprintln!("Reading image from {}", cli.image.display());
    let bytes = std::fs::read(&cli.image)?;

    let mut session = Session::new(&config);
    session.set_username(&cli.username);
    session.upload_image(&file_name_of(&cli.image), None, &bytes)?;
    if !session.submit() {
        return Err("username must not be blank".into());
    }

    let started = web_time::Instant::now();
    let request = session.begin_export()?;
    let outcome = export_circular_pfp(&request.image, &request.username, &config);
    session.finish_export();
    let export = outcome?;
    info!(
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "composited"
    );

    std::fs::create_dir_all(&cli.out_dir)?;
    let out_path = cli.out_dir.join(&export.file_name);
    std::fs::write(&out_path, &export.png)?;

    eprintln!(
        "Wrote {} ({}x{}, {} bytes)",
        out_path.display(),
        config.canvas_size,
        config.canvas_size,
        export.png.len()
    );
    println!("{}", out_path.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("octrafy-render").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults_match_web_app() {
        let cli = parse(&["me.png", "--username", "alice"]);
        assert_eq!(config_from_cli(&cli).unwrap(), PfpConfig::default());
        assert_eq!(cli.out_dir, PathBuf::from("."));
    }

    #[test]
    fn individual_flags_override_defaults() {
        let cli = parse(&[
            "me.png",
            "-u",
            "alice",
            "--border-color",
            "#fff",
            "--border-width",
            "2",
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.border_color, Rgb([255, 255, 255]));
        assert!((config.border_width - 2.0).abs() < f32::EPSILON);
        assert_eq!(config.canvas_size, PfpConfig::DEFAULT_CANVAS_SIZE);
    }

    #[test]
    fn bad_color_is_rejected_by_parser() {
        let result = Cli::try_parse_from([
            "octrafy-render",
            "me.png",
            "-u",
            "alice",
            "--border-color",
            "blue",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn config_json_wins_over_flags() {
        let cli = parse(&[
            "me.png",
            "-u",
            "alice",
            "--border-width",
            "2",
            "--config-json",
            r#"{"canvas_size": 400, "radius": 180}"#,
        ]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.canvas_size, 400);
        assert!((config.border_width - PfpConfig::DEFAULT_BORDER_WIDTH).abs() < f32::EPSILON);
    }

    #[test]
    fn config_json_that_does_not_fit_is_rejected() {
        let cli = parse(&[
            "me.png",
            "-u",
            "alice",
            "--config-json",
            r#"{"canvas_size": 50}"#,
        ]);
        let err = config_from_cli(&cli).unwrap_err();
        assert!(err.starts_with("Invalid config"), "{err}");
    }

    #[test]
    fn zero_username_limit_is_a_config_error() {
        let cli = parse(&[
            "me.png",
            "-u",
            "alice",
            "--config-json",
            r#"{"max_username_len": 0}"#,
        ]);
        let err = config_from_cli(&cli).unwrap_err();
        assert!(err.contains("username length"), "{err}");
    }

    #[test]
    fn file_name_drops_directories() {
        assert_eq!(file_name_of(Path::new("/tmp/pics/cat.JPG")), "cat.JPG");
        assert_eq!(file_name_of(Path::new("/")), "");
    }
}
