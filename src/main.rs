// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use quickshot::app::{AppModel, Flags};
use quickshot::capture_view::{CompletionCallback, PhotoDescriptor};
use quickshot::i18n;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;

#[derive(Parser)]
#[command(name = "quickshot")]
#[command(about = "Quick photo capture for the COSMIC desktop")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Print accepted photos as JSON lines on stdout
    #[arg(long)]
    print_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,

    /// Check whether the camera can be used
    Permission,

    /// Take a photo
    Photo {
        /// Camera index to use (from 'quickshot list')
        #[arg(short, long, default_value = "0")]
        camera: usize,

        /// Light the flash LEDs for the shot
        #[arg(short, long)]
        flash: bool,

        /// Output file path (default: cache directory, photo_TIMESTAMP.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=quickshot=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Permission) => cli::check_permission(),
        Some(Commands::Photo {
            camera,
            flash,
            output,
        }) => cli::take_photo(camera, flash, output),
        None => run_gui(cli.print_json),
    }
}

/// Host side of the completion callback
fn completion_callback(print_json: bool) -> CompletionCallback {
    Arc::new(move |photos: Vec<PhotoDescriptor>| {
        for photo in &photos {
            if print_json {
                match serde_json::to_string(photo) {
                    Ok(line) => println!("{}", line),
                    Err(e) => tracing::error!(error = %e, "Failed to serialize photo"),
                }
            } else {
                tracing::info!(uri = %photo.uri, width = photo.width, height = photo.height, "Photo accepted");
            }
        }
    })
}

fn run_gui(print_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();

    // Enable localizations to be applied.
    i18n::init(&requested_languages);

    // Settings for configuring the application window and iced runtime.
    let settings = cosmic::app::Settings::default().size_limits(
        cosmic::iced::Limits::NONE
            .min_width(360.0)
            .min_height(480.0),
    );

    let flags = Flags {
        on_complete: completion_callback(print_json),
    };

    cosmic::app::run::<AppModel>(settings, flags)?;

    Ok(())
}
