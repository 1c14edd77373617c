#[macro_use]
extern crate tracing;

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context as _};
use clap::Parser;
use quilt::cli::{Cli, Sub};
use quilt::layout::{LayoutTree, Options};
use quilt_config::Config;
use quilt_ipc::{Action, LayoutDescription, Size};
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let directives = env::var("RUST_LOG").unwrap_or_else(|_| "quilt=debug".to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path).map_err(|err| anyhow!("{err:?}"))?,
        None => Config::default(),
    };
    let options = Options::from_config(&config);
    let view_size = Size::new(cli.width, cli.height);

    match cli.subcommand {
        Sub::Show {
            layout,
            tree: as_tree,
            rects,
        } => {
            let tree = load_layout(&layout, view_size, options)?;
            if as_tree {
                print!("{}", tree.debug_tree());
            } else {
                print_tree(&tree, rects)?;
            }
        }
        Sub::Apply {
            layout,
            actions,
            rects,
        } => {
            let mut tree = load_layout(&layout, view_size, options)?;
            let actions: Vec<Action> = read_json(&actions)?;
            for (idx, action) in actions.iter().enumerate() {
                let result = tree.apply(action);
                if result.is_effective() {
                    debug!("action {idx}: {result:?}");
                } else {
                    warn!("action {idx} had no effect: {action:?}");
                }
            }
            print_tree(&tree, rects)?;
        }
    }

    Ok(())
}

fn load_layout(path: &Path, view_size: Size, options: Options) -> anyhow::Result<LayoutTree> {
    let desc: LayoutDescription = read_json(path)?;
    LayoutTree::from_description(&desc, view_size, options)
        .with_context(|| format!("error loading layout from {path:?}"))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents = fs::read_to_string(path).with_context(|| format!("error reading {path:?}"))?;
    serde_json::from_str(&contents).with_context(|| format!("error parsing {path:?}"))
}

fn print_tree(tree: &LayoutTree, rects: bool) -> anyhow::Result<()> {
    let json = if rects {
        serde_json::to_string_pretty(&tree.leaf_rects())?
    } else {
        serde_json::to_string_pretty(&tree.snapshot())?
    };
    println!("{json}");
    Ok(())
}
