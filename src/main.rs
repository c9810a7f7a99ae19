mod logging;

use clap::{Parser, Subcommand};
use geomap_tool::config::MapConfig;
use geomap_tool::overlay::{Bounds, ImageOverlay};
use geomap_tool::serve;
use geomap_tool::site::{self, DataMode, GenerateOptions};
use geomap_tool::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[clap(
  name = "geomap_tool",
  about = "A tool for publishing GeoJSON as a static web map",
  version
)]
struct Cli {
  /// Log at debug level (RUST_LOG takes precedence)
  #[clap(short, long, global = true)]
  verbose: bool,

  #[clap(subcommand)]
  command: Commands,
}

#[derive(Debug, clap::Args)]
struct ServeArgs {
  /// Address to listen on
  #[clap(long, default_value = "127.0.0.1")]
  host: String,

  /// Port to listen on
  #[clap(short, long, default_value_t = 8000)]
  port: u16,

  /// Do not open a browser tab
  #[clap(long)]
  no_open: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
  #[clap(
    name = "build",
    about = "Generate index.html and vercel.json from a GeoJSON file"
  )]
  Build {
    /// GeoJSON input
    #[clap(value_parser)]
    input: PathBuf,

    /// Output directory
    #[clap(short, long, value_parser, default_value = ".")]
    out_dir: PathBuf,

    /// Map configuration file (JSON)
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Page title
    #[clap(long)]
    title: Option<String>,

    /// Write the GeoJSON next to the page instead of embedding it
    #[clap(long)]
    reference: bool,

    /// Raster image to overlay on the map
    #[clap(long, value_parser, requires = "image_bounds")]
    image: Option<PathBuf>,

    /// Image bounds as south,west,north,east in degrees
    #[clap(long, requires = "image", allow_hyphen_values = true)]
    image_bounds: Option<String>,

    /// Image opacity between 0 and 1
    #[clap(long, requires = "image")]
    image_opacity: Option<f64>,

    /// Serve the output directory after generating
    #[clap(long)]
    serve: bool,

    #[clap(flatten)]
    server: ServeArgs,
  },

  #[clap(name = "serve", about = "Serve a generated map locally")]
  Serve {
    /// Directory to serve
    #[clap(value_parser, default_value = ".")]
    dir: PathBuf,

    #[clap(flatten)]
    server: ServeArgs,
  },

  #[clap(
    name = "check",
    about = "Check whether GeoJSON coordinates look like longitude/latitude"
  )]
  Check {
    /// GeoJSON input
    #[clap(value_parser)]
    input: PathBuf,
  },
}

fn serve_dir(dir: &Path, args: &ServeArgs) -> Result<()> {
  let server = serve::spawn_preview_server(dir, (args.host.as_str(), args.port))?;
  let url = server.url();
  println!("Serving {} at {} (Ctrl-C to stop)", dir.display(), url);
  if !args.no_open {
    info!("Opening {} ...", url);
    if let Err(err) = serve::open_browser(&url) {
      warn!(error = %err, "could not open a browser");
    }
  }
  server.wait()
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Build {
      input,
      out_dir,
      config,
      title,
      reference,
      image,
      image_bounds,
      image_opacity,
      serve,
      server,
    } => {
      let mut map_config = match config {
        Some(path) => MapConfig::from_file(&path)?,
        None => MapConfig::default(),
      };
      if title.is_some() {
        map_config.title = title;
      }

      let overlay = match (image, image_bounds) {
        (Some(image), Some(bounds)) => Some(ImageOverlay::new(
          image,
          bounds.parse::<Bounds>()?,
          image_opacity,
        )?),
        (None, None) => None,
        _ => {
          return Err(Error::Config(
            "--image and --image-bounds must be given together".to_string(),
          ))
        }
      };

      let options = GenerateOptions {
        input,
        out_dir,
        config: map_config,
        data_mode: if reference {
          DataMode::Reference
        } else {
          DataMode::Embed
        },
        overlay,
      };
      let report = site::generate(&options)?;
      println!(
        "[SUCCESS] {} generated with {} feature(s).",
        report.index.display(),
        report.feature_count
      );

      if serve {
        serve_dir(&options.out_dir, &server)?;
      }
      Ok(())
    }
    Commands::Serve { dir, server } => serve_dir(&dir, &server),
    Commands::Check { input } => {
      println!("{}", site::check_file(&input)?);
      Ok(())
    }
  }
}

fn main() {
  let cli = Cli::parse();
  logging::init_logging(cli.verbose);

  if let Err(err) = run(cli) {
    error!("{}", err);
    std::process::exit(1);
  }
}
