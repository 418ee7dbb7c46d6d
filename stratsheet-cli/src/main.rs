//! StratSheet CLI: fetch strategy details and write the sheet.
//!
//! Commands:
//! - `run`: fetch every configured strategy, render, write and/or commit
//! - `strategies`: list the strategy catalog (name → code)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stratsheet_core::{catalog, OutputFormat, Section};
use stratsheet_runner::{run, CommitConfig, NapbotsClient, RunConfig};

/// Contents endpoint the `--commit` flag writes JSON output to.
const COMMIT_URL: &str = "https://api.github.com/repos/mapbots/data/contents/strats.json";

/// Cutoff applied by `--limit`.
const LIMIT_FROM_DAY: &str = "180101";

#[derive(Parser)]
#[command(
    name = "stratsheet",
    version,
    about = "StratSheet CLI: strategy performance sheets as TSV, JSON5 or JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all strategies and write the sheet.
    Run(RunArgs),
    /// List the strategy catalog.
    Strategies,
}

/// Named flag bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// tsv + trades + quotes + datetime prefix.
    TsvFull,
    /// tsv + limit + datetime prefix.
    TsvSlim,
    /// json + trades + datetime prefix.
    JsonDt,
    /// json + trades + proxy + commit + transpose.
    JsonGit,
}

#[derive(Debug, Clone, Default, Args)]
struct RunArgs {
    /// Flag bundle applied before the individual flags.
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    /// Output format: tsv, json5 or json. Defaults to json.
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Include daily quotes.
    #[arg(long, default_value_t = false)]
    quotes: bool,

    /// Include trade events.
    #[arg(long, default_value_t = false)]
    trades: bool,

    /// Leave out quote days up to and including 2018-01-01.
    #[arg(long, default_value_t = false)]
    limit: bool,

    /// Key quotes/factors by day instead of by strategy.
    #[arg(long, default_value_t = false)]
    transpose: bool,

    /// Prefix the output file with the UTC date.
    #[arg(long, default_value_t = false)]
    date: bool,

    /// Prefix the output file with the UTC date and time.
    #[arg(long, default_value_t = false)]
    datetime: bool,

    /// Use the alternative strategy order.
    #[arg(long, default_value_t = false)]
    order2: bool,

    /// Fetch through the translation proxy.
    #[arg(long, default_value_t = false)]
    proxy: bool,

    /// Commit JSON output to the data repository instead of writing a file.
    #[arg(long, default_value_t = false)]
    commit: bool,

    /// Token for --commit.
    #[arg(long)]
    token: Option<String>,

    /// TOML run configuration; flags are applied on top of it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// No log output.
    #[arg(long, default_value_t = false)]
    silent: bool,
}

impl RunArgs {
    /// Expand the preset into the individual flags.
    fn expanded(mut self) -> Self {
        let Some(preset) = self.preset else {
            return self;
        };
        let format = match preset {
            Preset::TsvFull | Preset::TsvSlim => OutputFormat::Tsv,
            Preset::JsonDt | Preset::JsonGit => OutputFormat::Json,
        };
        self.format = self.format.or(Some(format));
        self.datetime |= matches!(preset, Preset::TsvFull | Preset::TsvSlim | Preset::JsonDt);
        self.trades |= !matches!(preset, Preset::TsvSlim);
        self.quotes |= preset == Preset::TsvFull;
        self.limit |= preset == Preset::TsvSlim;
        if preset == Preset::JsonGit {
            self.proxy = true;
            self.commit = true;
            self.transpose = true;
        }
        self
    }

    /// `./<prefix>strat<kind><variant><order>.<ext>`.
    fn output_filename(&self, format: OutputFormat) -> String {
        let prefix = if self.datetime {
            "%DATETIME%-"
        } else if self.date {
            "%DATE%-"
        } else {
            ""
        };
        let kind = match (self.preset, self.format) {
            (Some(Preset::JsonGit), _) | (_, None) => "s",
            (_, Some(OutputFormat::Tsv)) => "Sheet",
            (_, Some(_)) => "Data",
        };
        let variant = match self.preset {
            Some(Preset::TsvFull) => "-full",
            Some(Preset::TsvSlim) => "-slim",
            _ => "",
        };
        let order = if self.order2 { "-2" } else { "" };
        format!("./{prefix}strat{kind}{variant}{order}.{}", format.extension())
    }

    /// Build the run configuration from the optional file plus flags.
    fn to_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => {
                let mut config = RunConfig::default();
                config.render.format = OutputFormat::Json;
                config
            }
        };

        let render = &mut config.render;
        if let Some(format) = self.format {
            render.format = format;
        }
        if self.quotes {
            render.sections = render.sections.clone().with(Section::Quotes);
        }
        if self.trades {
            render.sections = render.sections.clone().with(Section::Trades);
        }
        if self.limit {
            render.from_day = Some(LIMIT_FROM_DAY.to_string());
        }
        if self.transpose {
            render.transpose = true;
        }
        if self.order2 {
            render.entities = catalog::second_order();
        }
        let format = render.format;

        if self.proxy {
            config.fetch.proxy = true;
        }
        if self.config.is_none() {
            config.output.file = Some(self.output_filename(format));
        }
        if self.commit && format == OutputFormat::Json {
            config.output.file = None;
            config.commit = Some(CommitConfig {
                url: COMMIT_URL.to_string(),
                token: self.token.clone().unwrap_or_default(),
            });
        }

        config.validate().context("invalid run configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_cmd(args.expanded()),
        Commands::Strategies => {
            list_strategies();
            Ok(())
        }
    }
}

fn init_logging() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("stratsheet=info".parse()?))
        .init();
    Ok(())
}

fn run_cmd(args: RunArgs) -> Result<()> {
    if !args.silent {
        init_logging()?;
    }

    let config = args.to_config()?;
    tracing::info!(
        format = %config.render.format,
        entities = config.render.entities.len(),
        "starting"
    );
    let client = NapbotsClient::new(config.fetch.proxy).context("failed to build HTTP client")?;
    let output = run(&config, &client, chrono::Utc::now())?;

    if args.silent {
        return Ok(());
    }
    if let Some(path) = &output.written_to {
        println!("Written to: {}", path.display());
    }
    if output.committed {
        if let Some(commit) = &config.commit {
            println!("Committed to: {}", commit.url);
        }
    }
    if output.written_to.is_none() && config.output.file.as_deref().map_or(true, str::is_empty) && config.commit.is_none() {
        print!("{}", output.text);
    }
    if !output.skipped.is_empty() {
        eprintln!("Skipped: {}", output.skipped.join(", "));
    }
    Ok(())
}

fn list_strategies() {
    println!("{:<6} {}", "Name", "Code");
    println!("{}", "-".repeat(32));
    for (name, code) in catalog::STRATEGIES {
        println!("{name:<6} {code}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn args(preset: Option<Preset>) -> RunArgs {
        RunArgs {
            preset,
            ..Default::default()
        }
        .expanded()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn default_name_without_explicit_format() {
        let a = args(None);
        assert_eq!(a.output_filename(OutputFormat::Json), "./strats.json");
    }

    #[test]
    fn explicit_format_names_the_kind() {
        let a = RunArgs {
            format: Some(OutputFormat::Tsv),
            date: true,
            order2: true,
            ..Default::default()
        };
        assert_eq!(
            a.output_filename(OutputFormat::Tsv),
            "./%DATE%-stratSheet-2.tsv"
        );
    }

    #[test]
    fn presets_expand_to_flags_and_names() {
        let full = args(Some(Preset::TsvFull));
        assert!(full.trades && full.quotes && full.datetime && !full.limit);
        assert_eq!(
            full.output_filename(OutputFormat::Tsv),
            "./%DATETIME%-stratSheet-full.tsv"
        );

        let slim = args(Some(Preset::TsvSlim));
        assert!(slim.limit && !slim.trades && !slim.quotes);
        assert_eq!(
            slim.output_filename(OutputFormat::Tsv),
            "./%DATETIME%-stratSheet-slim.tsv"
        );

        let dt = args(Some(Preset::JsonDt));
        assert_eq!(
            dt.output_filename(OutputFormat::Json),
            "./%DATETIME%-stratData.json"
        );

        let git = args(Some(Preset::JsonGit));
        assert!(git.proxy && git.commit && git.transpose && git.trades && !git.datetime);
        assert_eq!(git.output_filename(OutputFormat::Json), "./strats.json");
    }

    #[test]
    fn commit_with_json_replaces_file_output() {
        let mut a = args(Some(Preset::JsonGit));
        a.token = Some("t0k".into());
        let config = a.to_config().unwrap();
        assert!(config.output.file.is_none());
        let commit = config.commit.unwrap();
        assert_eq!(commit.url, COMMIT_URL);
        assert_eq!(commit.token, "t0k");
        assert!(config.render.transpose);
        assert!(config.fetch.proxy);
    }

    #[test]
    fn commit_without_token_is_rejected() {
        assert!(args(Some(Preset::JsonGit)).to_config().is_err());
    }

    #[test]
    fn commit_is_ignored_for_non_json() {
        let a = RunArgs {
            format: Some(OutputFormat::Json5),
            commit: true,
            ..Default::default()
        };
        let config = a.to_config().unwrap();
        assert!(config.commit.is_none());
        assert_eq!(config.output.file.as_deref(), Some("./stratData.json5"));
    }

    #[test]
    fn flags_map_onto_render_options() {
        let a = RunArgs {
            quotes: true,
            limit: true,
            order2: true,
            ..Default::default()
        };
        let config = a.to_config().unwrap();
        assert_eq!(config.render.format, OutputFormat::Json);
        assert!(config.render.sections.contains(Section::Quotes));
        assert!(config.render.sections.contains(Section::Factors));
        assert!(!config.render.sections.contains(Section::Trades));
        assert_eq!(config.render.from_day.as_deref(), Some(LIMIT_FROM_DAY));
        assert_eq!(config.render.entities, catalog::second_order());
    }
}
