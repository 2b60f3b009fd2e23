use clap::{Parser, Subcommand};
use floorsight_core::models::DEFAULT_SENTINEL;
use std::path::PathBuf;

/// Floorsight - Apartment floorplan and site-map analysis
#[derive(Parser, Debug)]
#[command(name = "floorsight")]
#[command(about = "Apartment floorplan and site-map analysis", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to $FLOORSIGHT_CONFIG, then ./floorsight.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Data directory holding the site map and the design tree
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List buildings, floor ranges, and apartments of the asset tree
    Inspect(InspectArgs),

    /// Write an apartment or building crop as JPEG
    Crop(CropArgs),

    /// Send an analysis request to a running service
    Ask(AskArgs),

    /// Report configuration and check the asset tree
    Doctor(DoctorArgs),
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Only show this building (dots are ignored)
    #[arg(long)]
    pub building: Option<String>,
}

#[derive(Parser, Debug)]
pub struct CropArgs {
    /// Building code, e.g. S6.06
    #[arg(long)]
    pub building: String,

    /// Apartment number (rendered as CHnn)
    #[arg(long, required_unless_present = "site_map", requires = "floor")]
    pub apartment: Option<u32>,

    /// Floor number selecting the floor-range design sheet
    #[arg(long, requires = "apartment", allow_hyphen_values = true)]
    pub floor: Option<i32>,

    /// Crop the building from the site map instead
    #[arg(long, conflicts_with_all = ["apartment", "floor"])]
    pub site_map: bool,

    /// Output JPEG path
    #[arg(long, short = 'o')]
    pub out: PathBuf,

    /// Downsample so neither edge exceeds this many pixels
    #[arg(long)]
    pub max_dimension: Option<u32>,
}

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// Analysis endpoint
    #[arg(long, default_value = "http://localhost:8000/")]
    pub url: String,

    /// Building code, e.g. S6.06
    #[arg(long)]
    pub building: String,

    /// Apartment number
    #[arg(long)]
    pub apartment: u32,

    /// Floor number
    #[arg(long, allow_hyphen_values = true)]
    pub floor: i32,

    /// Question about the apartment
    #[arg(long)]
    pub query: String,

    /// Stage-1 template override
    #[arg(long, default_value = DEFAULT_SENTINEL)]
    pub prompt_1: String,

    /// Stage-2 template override
    #[arg(long, default_value = DEFAULT_SENTINEL)]
    pub prompt_2: String,

    /// Decode the returned images into this directory
    #[arg(long, value_name = "DIR")]
    pub save_images: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct DoctorArgs {
    /// Show every configuration value with its source
    #[arg(long, short)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apartment_crop() {
        let cli = Cli::try_parse_from([
            "floorsight", "crop", "--building", "S6.06", "--apartment", "7", "--floor", "20", "--out",
            "ch07.jpg",
        ])
        .unwrap();

        match cli.command {
            Commands::Crop(args) => {
                assert_eq!(args.apartment, Some(7));
                assert_eq!(args.floor, Some(20));
                assert!(!args.site_map);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_crop_requires_target() {
        let result =
            Cli::try_parse_from(["floorsight", "crop", "--building", "S6.06", "--out", "x.jpg"]);
        assert!(result.is_err());

        // Apartment without floor
        let result = Cli::try_parse_from([
            "floorsight", "crop", "--building", "S6.06", "--apartment", "7", "--out", "x.jpg",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "floorsight", "crop", "--building", "S6.06", "--site-map", "--floor", "3", "--out",
            "x.jpg",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ask_defaults_to_sentinel_prompts() {
        let cli = Cli::try_parse_from([
            "floorsight", "--json", "ask", "--building", "S6.06", "--apartment", "7", "--floor", "20",
            "--query", "Hướng nào?",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Ask(args) => {
                assert_eq!(args.prompt_1, "default");
                assert_eq!(args.prompt_2, "default");
                assert_eq!(args.url, "http://localhost:8000/");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["floorsight", "doctor", "--data-dir", "fixtures", "--json"])
            .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("fixtures")));
        assert!(cli.json);
    }
}
