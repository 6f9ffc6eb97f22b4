use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Hand gesture control for the desktop", long_about = None)]
pub struct Args {
    /// Configuration file (default: ./gestiq.json, then the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Camera index, overrides the configuration
    #[arg(long)]
    pub camera: Option<u32>,

    /// List available cameras and exit
    #[arg(long)]
    pub list_cameras: bool,
}
