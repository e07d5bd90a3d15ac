use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tbtools")]
#[command(author, version, about = "Batch tools for a Toon Boom Harmony animation pipeline")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a master video into numbered scene clips
    Split(SplitArgs),

    /// Create scene folders from a manifest and run the Harmony setup script
    Setup(SetupArgs),

    /// Import animatics into scenes with the Harmony import script
    ImportAnimatic(ImportArgs),

    /// List the available tools and their inputs
    Tools {
        /// Only describe this tool (name or subcommand)
        name: Option<String>,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Show or change the saved configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Display version information
    Version,
}

#[derive(Args)]
#[command(group = clap::ArgGroup::new("boundaries").required(true).multiple(false))]
pub struct SplitArgs {
    /// Master video file
    pub master: PathBuf,

    /// Directory receiving the clips
    #[arg(short, long)]
    pub output_dir: PathBuf,

    /// Number of the first clip
    #[arg(long, default_value_t = 1)]
    pub start_index: u32,

    /// Frame count of each scene, in order
    #[arg(long, num_args = 1.., group = "boundaries", allow_negative_numbers = true)]
    pub frames: Vec<String>,

    /// File with one frame count per line
    #[arg(long, group = "boundaries")]
    pub frames_file: Option<PathBuf>,

    /// MM:SS cut points, at least two
    #[arg(long, num_args = 1.., group = "boundaries")]
    pub timestamps: Vec<String>,

    /// File with one MM:SS cut point per line
    #[arg(long, group = "boundaries")]
    pub timestamps_file: Option<PathBuf>,

    /// Frame rate to use instead of detecting it
    #[arg(long)]
    pub fps: Option<String>,

    /// ffmpeg executable
    #[arg(long)]
    pub ffmpeg: Option<String>,

    /// ffprobe executable
    #[arg(long)]
    pub ffprobe: Option<String>,

    /// Save the executable overrides to the config
    #[arg(long)]
    pub remember: bool,

    /// Show the ffmpeg commands without running them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct HarmonyArgs {
    /// Harmony executable
    #[arg(long)]
    pub harmony_exe: Option<String>,

    /// Batch script run inside Harmony
    #[arg(long)]
    pub script: Option<String>,

    /// Write a log file per Harmony invocation into this directory
    #[arg(long)]
    pub log_dir: Option<String>,

    /// Save the overrides to the config
    #[arg(long)]
    pub remember: bool,

    /// Prepare folders and job files without launching Harmony
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct SetupArgs {
    /// JSON scene manifest
    pub manifest: PathBuf,

    /// Only process these scene ids (repeatable)
    #[arg(short, long = "scene")]
    pub scenes: Vec<String>,

    #[command(flatten)]
    pub harmony: HarmonyArgs,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Scene ids to process
    pub scenes: Vec<String>,

    /// File with one scene id per line
    #[arg(long)]
    pub scenes_file: Option<PathBuf>,

    /// Take scenes and animatic paths from a manifest instead of the scenes root
    #[arg(short, long)]
    pub manifest: Option<PathBuf>,

    /// Directory holding one folder per scene
    #[arg(long)]
    pub scenes_root: Option<String>,

    /// Directory holding <scene>.mp4 animatics
    #[arg(long)]
    pub animatics_root: Option<String>,

    #[command(flatten)]
    pub harmony: HarmonyArgs,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Set a configuration key and save it
    Set {
        /// Key to change
        key: String,

        /// New value
        value: String,
    },

    /// Print where the configuration is saved
    Path,
}
