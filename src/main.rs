//! microflow - command line host
//!
//! Loads JSON pipeline documents, preflights and executes them, and prints
//! every pipeline message as it arrives.

use anyhow::Context;
use clap::{Parser, Subcommand};
use microflow::{
    config::EngineConfig,
    filters::CoreFilters,
    message::{PipelineEvent, PipelineMessage},
    pipeline::read_pipeline_from_file,
    Filter, FilterManager, FilterPipeline, ObserverSet,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "microflow", version, about = "Run filter pipelines")]
struct Cli {
    /// Config file (defaults to $MICROFLOW_CONFIG or the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Preflight and execute a pipeline document
    Run {
        pipeline: PathBuf,

        /// Print messages as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Validate a pipeline document without executing it
    Preflight { pipeline: PathBuf },
    /// List registered filters
    ListFilters {
        /// Only filters in this group
        #[arg(long)]
        group: Option<String>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = EngineConfig::load_or_default(cli.config.as_deref());
    let _guard = init_logging(&config);

    let mut manager = FilterManager::with_policy(config.registry.override_policy);
    manager.load_library(&CoreFilters);

    let code = match cli.command {
        Command::Run { pipeline, json } => run(&pipeline, &manager, json)?,
        Command::Preflight { pipeline } => preflight(&pipeline, &manager)?,
        Command::ListFilters { group } => {
            list_filters(&manager, group.as_deref());
            0
        }
    };

    Ok(if code < 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn init_logging(config: &EngineConfig) -> Option<WorkerGuard> {
    let env_filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter))
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    let (file_layer, guard) = match config.log_dir().filter(|_| config.logging.log_to_file) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "microflow.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(env_filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

fn print_message(message: &PipelineMessage, json: bool) {
    if json {
        match serde_json::to_string(message) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::warn!("Could not serialize message: {}", e),
        }
    } else {
        println!("{}", message);
    }
}

fn printing_observers(json: bool) -> ObserverSet {
    let mut observers = ObserverSet::new();
    observers.add(move |event: &PipelineEvent| {
        if let Some(message) = event.as_message() {
            print_message(message, json);
        }
    });
    observers
}

fn load(path: &Path, manager: &FilterManager, json: bool) -> anyhow::Result<FilterPipeline> {
    read_pipeline_from_file(path, manager, printing_observers(json))
        .with_context(|| format!("Could not load {}", path.display()))
}

fn run(path: &Path, manager: &FilterManager, json: bool) -> anyhow::Result<i32> {
    let mut pipeline = load(path, manager, json)?;
    let code = pipeline.execute();
    if !json {
        println!("Pipeline '{}' finished with code {}", pipeline.name(), code);
    }
    Ok(code)
}

fn preflight(path: &Path, manager: &FilterManager) -> anyhow::Result<i32> {
    let mut pipeline = load(path, manager, false)?;
    let ok = pipeline.preflight_pipeline();

    let first_failure = pipeline
        .filters()
        .iter()
        .position(|f| f.error_condition() < 0);
    for (index, filter) in pipeline.filters().iter().enumerate() {
        println!(
            "{:>3} {:<8} {}",
            index,
            preflight_state(filter, index, first_failure),
            filter.human_label()
        );
    }

    let code = pipeline.error_condition();
    if ok {
        println!("Preflight passed");
    } else {
        println!("Preflight failed with code {}", code);
    }
    Ok(code)
}

/// Row label for the filter at `index`; filters after the first failure never ran
fn preflight_state(filter: &Filter, index: usize, first_failure: Option<usize>) -> &'static str {
    match first_failure {
        Some(failed) if index > failed => "skipped",
        _ if filter.error_condition() < 0 => "error",
        _ if filter.warning_condition() < 0 => "warning",
        _ => "ok",
    }
}

fn list_filters(manager: &FilterManager, group: Option<&str>) {
    let mut names = match group {
        Some(group) => manager.filter_names_in_group(group),
        None => manager.filter_names(),
    };
    names.sort_unstable();

    for name in names {
        if let Some(filter) = manager.create_filter(name) {
            println!(
                "{:<24} {:<32} {}/{}",
                name,
                filter.human_label(),
                filter.group_name(),
                filter.sub_group_name()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microflow::filter::ParameterValue;
    use microflow::filters::CreateDataArray;
    use microflow::DataArrayPath;

    fn create(path: DataArrayPath) -> Filter {
        let mut filter = Filter::new(CreateDataArray::new());
        filter.set_parameter("NewArray", ParameterValue::Path(path));
        filter
    }

    #[test]
    fn test_filters_after_failure_are_skipped() {
        let mut pipeline = FilterPipeline::new();
        pipeline.push_back(create(DataArrayPath::new("Missing", "AM", "A")));
        pipeline.push_back(create(DataArrayPath::new("Missing", "AM", "B")));
        assert!(!pipeline.preflight_pipeline());

        let filters = pipeline.filters();
        let first_failure = filters.iter().position(|f| f.error_condition() < 0);
        assert_eq!(first_failure, Some(0));
        assert_eq!(preflight_state(&filters[0], 0, first_failure), "error");
        assert_eq!(preflight_state(&filters[1], 1, first_failure), "skipped");
    }
}
