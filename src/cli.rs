use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a KDL options file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Viewport width in logical pixels.
    #[arg(long, global = true, default_value_t = 1280.)]
    pub width: f64,

    /// Viewport height in logical pixels.
    #[arg(long, global = true, default_value_t = 720.)]
    pub height: f64,

    #[command(subcommand)]
    pub subcommand: Sub,
}

#[derive(Subcommand, Debug)]
pub enum Sub {
    /// Load a layout and print it normalized.
    Show {
        /// Layout description in JSON.
        layout: PathBuf,

        /// Print an indented text dump instead of JSON.
        #[arg(long)]
        tree: bool,

        /// Print absolute pane rectangles instead of the tree.
        #[arg(long, conflicts_with = "tree")]
        rects: bool,
    },
    /// Replay a JSON array of actions against a layout and print the result.
    Apply {
        /// Layout description in JSON.
        layout: PathBuf,

        /// Actions in JSON.
        actions: PathBuf,

        /// Print absolute pane rectangles instead of the tree.
        #[arg(long)]
        rects: bool,
    },
}
