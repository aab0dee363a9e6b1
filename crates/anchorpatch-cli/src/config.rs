use anchorpatch_core::MatchConfig;
use anyhow::{bail, Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Apply context-anchored patches to a file tree",
    long_about = None
)]
#[command(after_help = r#"EXAMPLES:
    # Apply a patch file in the current directory
    anchorpatch changes.patch

    # Pipe a patch in and apply it below ./project
    cat changes.patch | anchorpatch -C project

    # Check that every hunk resolves without touching anything
    anchorpatch --dry-run changes.patch

PATCH FORMAT:
    *** Begin Patch
    *** Update File: vehicles.py
    @@ class Car:
         def start(self) -> bool:
    -        return True
    +        return self.fuel_level > 0
    *** End Patch

CONFIG:
    Default config location: ~/.config/anchorpatch/config.toml
    Use --ignore-config to use built-in defaults instead."#)]
pub struct Args {
    #[arg(help = "Patch file to apply [default: read from stdin]")]
    pub patch_file: Option<PathBuf>,

    #[arg(long, conflicts_with = "patch_file", help = "Patch text given inline")]
    pub patch: Option<String>,

    #[arg(short = 'C', long, default_value = ".", help = "Directory patch paths are relative to")]
    pub root: PathBuf,

    #[arg(long, help = "Resolve every operation but write nothing")]
    pub dry_run: bool,

    #[arg(
        short,
        long,
        help = "Path to config file [default: ~/.config/anchorpatch/config.toml]"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Use built-in defaults, ignore config file")]
    pub ignore_config: bool,

    #[arg(long, help = "Minimum fraction of matching lines for a fuzzy match [default: 0.8]")]
    pub threshold: Option<f64>,

    #[arg(long, help = "Lines of surrounding context compared when breaking ties [default: 3]")]
    pub context_window: Option<usize>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "More logging (-v, -vv)")]
    pub verbose: u8,
}

/// Config file (if any), then command-line overrides.
pub fn load_config(args: &Args) -> Result<MatchConfig> {
    let mut config = if args.ignore_config {
        MatchConfig::default()
    } else {
        match &args.config {
            Some(path) => read_config(path)?,
            None => {
                let path = get_default_config_path();
                if path.exists() {
                    read_config(&path)?
                } else {
                    MatchConfig::default()
                }
            }
        }
    };

    if let Some(threshold) = args.threshold {
        config.acceptance_threshold = threshold;
    }
    if let Some(window) = args.context_window {
        config.context_window = window;
    }

    if let Err(reason) = config.validate() {
        bail!("Invalid matching configuration: {reason}");
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<MatchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {:?}", path))?;
    parse_config(&content).with_context(|| format!("Failed to parse config file at {:?}", path))
}

fn parse_config(content: &str) -> Result<MatchConfig> {
    Ok(toml::from_str(content)?)
}

fn get_default_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "anchorpatch") {
        proj_dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config.toml")
    }
}
