//! Doctor command implementation

use crate::cli::DoctorArgs;
use crate::output::OutputWriter;
use crate::output_types::{CheckResult, ConfigEntry, DoctorOutput};
use anyhow::Result;
use console::style;
use floorsight_core::config::LayeredConfig;
use floorsight_core::loader::load_assets;
use std::collections::BTreeMap;
use tabled::Tabled;

pub fn execute(args: DoctorArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let config_entries: BTreeMap<String, ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| {
            (
                key,
                ConfigEntry {
                    value,
                    source: format!("{:?}", source),
                },
            )
        })
        .collect();

    let checks = run_checks(config);
    let passed = checks.iter().filter(|c| c.passed).count();
    let total = checks.len();

    if output.is_json() {
        return output.result(DoctorOutput {
            config: config_entries,
            checks,
            passed,
            total,
        });
    }

    println!("\n{}", style("Floorsight Health Check").bold().underlined());
    println!("{}", style("═".repeat(60)).dim());

    if args.verbose {
        output.section("Configuration");

        #[derive(Tabled)]
        struct ConfigRow {
            #[tabled(rename = "Key")]
            key: String,
            #[tabled(rename = "Value")]
            value: String,
            #[tabled(rename = "Source")]
            source: String,
        }

        let rows: Vec<ConfigRow> = config_entries
            .into_iter()
            .map(|(key, entry)| ConfigRow {
                key,
                value: entry.value,
                source: entry.source,
            })
            .collect();
        output.table(rows);
    }

    println!();
    for check in &checks {
        let mark = if check.passed {
            style("✓").green()
        } else {
            style("✗").red()
        };
        println!("{} {}: {}", mark, check.name, check.detail);
    }

    println!();
    if passed == total {
        output.success(format!("All {} checks passed", total));
    } else {
        output.warning(format!("{}/{} checks passed", passed, total));
    }

    Ok(())
}

fn run_checks(config: &LayeredConfig) -> Vec<CheckResult> {
    let layout = config.data_layout();
    let mut checks = Vec::new();

    checks.push(match config.require_api_key() {
        Ok(_) => check("API key", true, format!("set ({:?})", config.api_key.source)),
        Err(_) => check("API key", false, "not set; export FLOORSIGHT_API_KEY or GEMINI_API_KEY"),
    });

    for (name, path) in [
        ("Site map mapping", layout.site_map_mapping_path()),
        ("Site map metadata", layout.site_map_metadata_path()),
        ("Site map image", layout.site_map_image_path()),
    ] {
        let present = path.is_file();
        let detail = if present { "found" } else { "missing" };
        checks.push(check(name, present, format!("{} ({})", detail, path.display())));
    }

    let design_dir = layout.design_dir();
    checks.push(check(
        "Design directory",
        design_dir.is_dir(),
        design_dir.display().to_string(),
    ));

    checks.push(match load_assets(&layout) {
        Ok(assets) => {
            let floor_ranges: usize = assets.catalog.buildings().map(|(_, floors)| floors.len()).sum();
            let incomplete = assets
                .catalog
                .buildings()
                .flat_map(|(_, floors)| floors.values())
                .filter(|dataset| !dataset.has_raster() || dataset.index().is_empty())
                .count();
            check(
                "Assets",
                true,
                format!(
                    "{} buildings, {} floor ranges ({} incomplete)",
                    assets.catalog.len(),
                    floor_ranges,
                    incomplete
                ),
            )
        }
        Err(e) => check("Assets", false, e.to_string()),
    });

    checks
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> CheckResult {
    CheckResult {
        name: name.to_string(),
        passed,
        detail: detail.into(),
    }
}
