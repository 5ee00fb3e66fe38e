//! CLI Module
//!
//! Command-line interface for inspecting GeoJSON and layer definitions.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Maplayers - filter GeoJSON, infer fields and render layer trees
#[derive(Parser, Debug)]
#[command(name = "maplayers")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a filter tree to a GeoJSON file
    #[command(name = "filter")]
    Filter {
        /// GeoJSON input file
        input: PathBuf,

        /// JSON file holding the filter tree
        #[arg(short, long)]
        filter: PathBuf,
    },

    /// Infer property types of a GeoJSON file
    #[command(name = "fields")]
    Fields {
        /// GeoJSON input file
        input: PathBuf,
    },

    /// Build renderable layers from a definitions file
    #[command(name = "render")]
    Render {
        /// JSON array of layer definitions
        definitions: PathBuf,

        /// Layers to render; defaults to every top-level layer
        #[arg(long = "id")]
        ids: Vec<String>,

        /// Print the full renderable as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the legend of one layer
    #[command(name = "legend")]
    Legend {
        /// JSON array of layer definitions
        definitions: PathBuf,

        /// Layer id
        #[arg(long)]
        id: String,
    },
}
