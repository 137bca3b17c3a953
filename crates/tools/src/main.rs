use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foundation::geo::GeoPoint;
use foundation::screen::ScreenRect;
use tools::{PlaceRequest, ToolError, check_click, load_config, load_feed, marker_report, place};
use tracing::info;
use tracing_subscriber::EnvFilter;
use viewport::popup::PopupSize;

#[derive(Parser, Debug)]
#[command(author, version, about = "Story map boundary, marker and placement checks")]
struct Args {
    /// Map config JSON (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a click would be accepted
    CheckClick {
        /// Country boundary GeoJSON
        #[arg(long)]
        boundary: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        lon: f64,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
    },

    /// Print marker colors and labels for a story feed
    Colors {
        /// Story feed JSON (array of posts)
        #[arg(long)]
        feed: PathBuf,

        /// Only stories carrying one of these tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Compute where the camera settles when a story's popup opens
    Place {
        #[arg(long)]
        feed: PathBuf,

        /// Story id
        #[arg(long)]
        id: String,

        #[arg(long, default_value_t = 1280.0)]
        width: f64,

        #[arg(long, default_value_t = 720.0)]
        height: f64,

        /// Container offset from the window's left edge (side panel width)
        #[arg(long, default_value_t = 0.0)]
        container_left: f64,

        #[arg(long, default_value_t = 350.0)]
        popup_width: f64,

        #[arg(long, default_value_t = 400.0)]
        popup_height: f64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), ToolError> {
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::CheckClick { boundary, lon, lat } => {
            let report = check_click(&boundary, GeoPoint::new(lon, lat), &config)?;
            print_json(&report);
        }
        Command::Colors { feed, tags } => {
            let stories = load_feed(&feed)?;
            info!(stories = stories.len(), "feed loaded");
            for marker in marker_report(&stories, &tags) {
                print_json(&marker);
            }
        }
        Command::Place {
            feed,
            id,
            width,
            height,
            container_left,
            popup_width,
            popup_height,
        } => {
            let stories = load_feed(&feed)?;
            let request = PlaceRequest {
                container: ScreenRect::new(container_left, 0.0, width - container_left, height),
                window_width: width,
                window_height: height,
                popup: PopupSize::new(popup_width, popup_height),
            };
            let report = place(&stories, &id, request, &config)?;
            print_json(&report);
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("error: failed to encode output: {e}"),
    }
}
