//! Traffic recording to scene-graph converter
//!
//! - `convert`: run the pipeline over a recording and report every scenario
//! - `inspect`: summarize a recording without converting it

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use trafficgraph_graph::Ontology;
use trafficgraph_pipeline::{convert, PipelineConfig, ScenarioSummary};
use trafficgraph_recording::Recording;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "trafficgraph")]
#[command(author, version, about = "Convert traffic recordings into scene knowledge graphs")]
struct Cli {
    /// Log pipeline progress at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a recording and print a summary per scenario.
    Convert {
        /// Recording JSON file
        recording: PathBuf,
        #[command(flatten)]
        options: ConvertOptions,
        /// Print the summaries as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print entity counts, timing and snippet boundaries of a recording.
    Inspect {
        /// Recording JSON file
        recording: PathBuf,
    },
}

/// Pipeline options; flags override values from `--config`.
#[derive(Args, Debug, Default)]
struct ConvertOptions {
    /// Pipeline config JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Output sampling rate in Hz
    #[arg(long)]
    hertz: Option<u32>,
    /// Seconds to trim from the start of every snippet
    #[arg(long)]
    start_offset: Option<f64>,
    /// Seconds to trim from the end of every snippet
    #[arg(long)]
    end_offset: Option<f64>,
    /// Only convert these snippets (repeatable)
    #[arg(long = "snippet")]
    snippets: Vec<u32>,
    /// Skip snippets longer than this many seconds
    #[arg(long)]
    max_duration: Option<f64>,
    /// Load the criticality vocabularies
    #[arg(long)]
    criticality: bool,
}

impl ConvertOptions {
    fn to_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)
                .with_context(|| format!("loading pipeline config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(hertz) = self.hertz {
            config.hertz = Some(hertz);
        }
        if let Some(offset) = self.start_offset {
            config.start_offset = offset;
        }
        if let Some(offset) = self.end_offset {
            config.end_offset = offset;
        }
        if !self.snippets.is_empty() {
            config.snippet_ids = Some(self.snippets.clone());
        }
        if let Some(max) = self.max_duration {
            config.max_scenario_duration = Some(max);
        }
        config.load_criticality_vocabularies |= self.criticality;
        Ok(config.normalized())
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(path: &Path) -> Result<Recording> {
    Recording::from_json_file(path).with_context(|| format!("loading recording {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert {
            recording,
            options,
            json,
        } => cmd_convert(&recording, &options, json),
        Commands::Inspect { recording } => cmd_inspect(&recording),
    }
}

// ============================================================================
// convert
// ============================================================================

fn cmd_convert(path: &Path, options: &ConvertOptions, json: bool) -> Result<()> {
    let config = options.to_config()?;
    tracing::debug!(?config, "pipeline configuration");
    let recording = load(path)?;
    eprintln!("{} {}", "Converting".green().bold(), path.display());
    if config.load_criticality_vocabularies {
        eprintln!(
            "  {} {}, {}",
            "vocabularies:".cyan(),
            Ontology::Criticality,
            Ontology::CriticalityFormalization
        );
    }

    let scenarios = convert(&recording, &config)
        .with_context(|| format!("converting {}", path.display()))?;
    let summaries: Vec<ScenarioSummary> = scenarios.iter().map(|s| s.summary()).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for summary in &summaries {
            print_summary(summary);
        }
    }
    eprintln!("{} {} scenario(s)", "ok".green().bold(), summaries.len());
    Ok(())
}

fn print_summary(summary: &ScenarioSummary) {
    let title = match summary.snippet_id {
        Some(id) => format!("Snippet {id}"),
        None => "Whole recording".to_string(),
    };
    println!("{}", title.bold());
    let span = match (summary.start, summary.end) {
        (Some(start), Some(end)) => format!("{start:.2}s .. {end:.2}s"),
        _ => "-".to_string(),
    };
    println!("  {:<16} {}", "scenes".cyan(), summary.scenes);
    println!("  {:<16} {}", "time span".cyan(), span);
    println!("  {:<16} {}", "speed limit".cyan(), summary.speed_limit);
    println!("  {:<16} {}", "scenery nodes".cyan(), summary.scenery_nodes);
    let (min, max) = summary
        .scene_nodes
        .iter()
        .fold((usize::MAX, 0), |(lo, hi), n| (lo.min(*n), hi.max(*n)));
    if !summary.scene_nodes.is_empty() {
        println!("  {:<16} {min}..{max}", "scene nodes".cyan());
    }
    println!("  {:<16} {}", "relations".cyan(), summary.relations);
    println!("  {:<16} {}", "identity links".cyan(), summary.identity_links);
    if summary.dropped_relations > 0 {
        println!("  {:<16} {}", "dropped".yellow(), summary.dropped_relations);
    }
}

// ============================================================================
// inspect
// ============================================================================

fn cmd_inspect(path: &Path) -> Result<()> {
    let recording = load(path)?;
    let rate = recording.native_rate()?;

    println!("{} {}", "Recording".green().bold(), path.display());
    if let Some(name) = &recording.meta_data.recording_name {
        println!("  {:<16} {}", "name".cyan(), name);
    }
    println!("  {:<16} {}", "frames".cyan(), recording.frame_count());
    println!("  {:<16} {:.2}s", "duration".cyan(), recording.duration());
    println!("  {:<16} {rate} Hz", "native rate".cyan());
    println!(
        "  {:<16} {}{}",
        "road users".cyan(),
        recording.road_users.len(),
        if recording.ego_vehicle.is_some() { " + ego" } else { "" }
    );
    println!("  {:<16} {}", "misc objects".cyan(), recording.misc_objects.len());
    println!("  {:<16} {}", "roads".cyan(), recording.roads.len());
    let lanes: usize = recording.roads.values().map(|r| r.lanes.len()).sum();
    let signs: usize = recording.roads.values().map(|r| r.signs.len()).sum();
    println!("  {:<16} {}", "lanes".cyan(), lanes);
    println!("  {:<16} {}", "signs".cyan(), signs);
    println!("  {:<16} {}", "signal states".cyan(), recording.states.len());
    println!(
        "  {:<16} {}",
        "weather".cyan(),
        if recording.weather.is_some() { "yes" } else { "no" }
    );

    if recording.snippets.is_empty() {
        println!("  {:<16} none", "snippets".cyan());
    } else {
        println!("  {}", "snippets".cyan());
        for bounds in &recording.snippets {
            let duration = recording
                .snippet_duration(bounds)
                .map_or_else(|| "out of range".to_string(), |d| format!("{d:.2}s"));
            println!(
                "    {:>4}  frames {}..={}  {}",
                bounds.id, bounds.start_frame, bounds.end_frame, duration
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_override_the_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"hertz": 10, "start_offset": 1.0, "snippet_ids": [4]}}"#).unwrap();

        let options = ConvertOptions {
            config: Some(file.path().to_path_buf()),
            hertz: Some(2),
            end_offset: Some(-3.0),
            ..Default::default()
        };
        let config = options.to_config().unwrap();
        assert_eq!(config.hertz, Some(2));
        assert_eq!(config.start_offset, 1.0);
        assert_eq!(config.end_offset, 0.0);
        assert_eq!(config.snippet_ids, Some(vec![4]));
    }

    #[test]
    fn parses_repeated_snippet_flags() {
        let cli = Cli::try_parse_from([
            "trafficgraph",
            "convert",
            "rec.json",
            "--snippet",
            "1",
            "--snippet",
            "3",
            "--criticality",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Convert { options, .. } = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(options.snippets, vec![1, 3]);
        assert!(options.to_config().unwrap().load_criticality_vocabularies);
    }
}
