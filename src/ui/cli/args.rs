// Wed Jan 15 2026 - Alex

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "emu-pointer-finder")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Pointer path finder for emulated console memory", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true)]
    pub no_color: bool,

    /// JSON file with tool defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List running processes and which emulator adapter matches each.
    List(ListArgs),
    /// Search for pointer paths to a target address.
    Scan(ScanArgs),
    /// Keep re-checking saved paths until stopped.
    Filter(FilterArgs),
    /// Scan again and keep only paths found both times.
    Refine(RefineArgs),
    /// Print where saved paths lead right now.
    Resolve(ResolveArgs),
    /// Capture several states interactively, then scan across all of them.
    States(StatesArgs),
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Include processes no adapter supports.
    #[arg(long)]
    pub all: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TargetArgs {
    #[arg(short, long)]
    pub pid: Option<u32>,

    #[arg(long)]
    pub process: Option<String>,

    /// Force an adapter instead of detecting it from the process name.
    #[arg(short, long)]
    pub emulator: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SearchArgs {
    /// Start of the static base range, in the emulator's address format.
    /// Usually the game's data section.
    #[arg(long)]
    pub static_start: String,

    /// Inclusive end of the static base range.
    #[arg(long)]
    pub static_end: String,

    #[arg(long)]
    pub max_level: Option<usize>,

    #[arg(long, value_parser = parse_number)]
    pub max_offset: Option<u32>,

    #[arg(long, value_parser = parse_number)]
    pub max_negative_offset: Option<u32>,

    #[arg(long)]
    pub max_results: Option<usize>,

    #[arg(long)]
    pub max_candidates: Option<usize>,

    #[arg(long)]
    pub candidates_per_level: Option<usize>,

    #[arg(long)]
    pub align16: bool,

    #[arg(long)]
    pub structures: bool,

    #[arg(long)]
    pub structure_base: bool,

    #[arg(long)]
    pub stop_on_first: bool,

    /// Keep searching deeper levels after paths are found.
    #[arg(long)]
    pub all_levels: bool,
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Address to find paths to, in the emulator's address format.
    #[arg(short, long)]
    pub address: String,

    #[command(flatten)]
    pub search: SearchArgs,

    #[arg(short, long, default_value = "paths.json")]
    pub output: PathBuf,

    /// How many paths to print.
    #[arg(long, default_value = "50")]
    pub show: usize,
}

#[derive(Parser, Debug)]
pub struct FilterArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(short, long)]
    pub input: PathBuf,

    /// Overwrites the input when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Stop after this many passes; otherwise runs until Enter is pressed.
    #[arg(long)]
    pub passes: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct RefineArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(short, long)]
    pub input: PathBuf,

    /// Where the target address lives now.
    #[arg(short, long)]
    pub address: String,

    #[command(flatten)]
    pub search: SearchArgs,

    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    #[arg(short, long)]
    pub input: PathBuf,
}

#[derive(Parser, Debug)]
pub struct StatesArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Number of states to capture.
    #[arg(short, long, default_value = "2")]
    pub count: usize,

    /// Also require paths to reach this address in live memory.
    #[arg(long)]
    pub live_address: Option<String>,

    #[command(flatten)]
    pub search: SearchArgs,

    #[arg(short, long, default_value = "paths.json")]
    pub output: PathBuf,
}

impl TargetArgs {
    pub fn validate(&self) -> Result<(), String> {
        if self.pid.is_none() && self.process.is_none() {
            return Err("Either --pid or --process must be specified".to_string());
        }
        if self.pid.is_some() && self.process.is_some() {
            return Err("Cannot specify both --pid and --process".to_string());
        }
        Ok(())
    }
}

impl FilterArgs {
    pub fn validate(&self) -> Result<(), String> {
        self.target.validate()?;
        if !self.input.exists() {
            return Err(format!("Input file does not exist: {:?}", self.input));
        }
        if self.passes == Some(0) {
            return Err("--passes must be at least 1".to_string());
        }
        Ok(())
    }
}

impl RefineArgs {
    pub fn validate(&self) -> Result<(), String> {
        self.target.validate()?;
        if !self.input.exists() {
            return Err(format!("Input file does not exist: {:?}", self.input));
        }
        Ok(())
    }
}

impl ResolveArgs {
    pub fn validate(&self) -> Result<(), String> {
        self.target.validate()?;
        if !self.input.exists() {
            return Err(format!("Input file does not exist: {:?}", self.input));
        }
        Ok(())
    }
}

/// Decimal or `0x` hex.
pub fn parse_number(text: &str) -> Result<u32, String> {
    let text = text.trim();
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", text, e))
}
