//! This module contains the main entrypoint to the lookout cli.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use lookout_dataframe::DataFrame;
use lookout_widgets::{ColumnMapping, ProbClassProdMetricsMatrixWidget};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[clap(about = "Compare a model's production data with its reference data.")]
enum Options {
	#[clap(name = "metrics-matrix")]
	MetricsMatrix(MetricsMatrixOptions),
}

#[derive(Parser, Debug)]
#[clap(about = "compute the quality metrics matrix of a probabilistic classifier")]
#[clap(
	long_about = "compute precision, recall, f1 score and roc auc for each class of the production target and write them as a heatmap widget"
)]
struct MetricsMatrixOptions {
	#[clap(long, help = "the path to the reference .csv file")]
	reference: PathBuf,
	#[clap(long, help = "the path to the production .csv file")]
	production: Option<PathBuf>,
	#[clap(long, help = "the path to a .yaml or .json column mapping")]
	mapping: Option<PathBuf>,
	#[clap(long, default_value = "Production: Quality Metrics Matrix")]
	title: String,
	#[clap(short, long, help = "the path to write the widget json to")]
	output: Option<PathBuf>,
}

fn main() {
	let env = env_logger::Env::default().default_filter_or("lookout_cli=info,lookout_widgets=info");
	env_logger::Builder::from_env(env)
		.format_level(false)
		.format_module_path(false)
		.format_timestamp(None)
		.init();
	let options = Options::parse();
	let result = match options {
		Options::MetricsMatrix(options) => cli_metrics_matrix(options),
	};
	if let Err(error) = result {
		eprintln!("{}: {:#}", "error".red().bold(), error);
		std::process::exit(1);
	}
}

fn cli_metrics_matrix(options: MetricsMatrixOptions) -> Result<()> {
	let reference = load_dataframe(&options.reference)?;
	let production = options
		.production
		.as_deref()
		.map(load_dataframe)
		.transpose()?;
	let column_mapping = options
		.mapping
		.as_deref()
		.map(ColumnMapping::from_path)
		.transpose()?;

	let widget = ProbClassProdMetricsMatrixWidget::new(options.title);
	let metrics_matrix =
		widget.metrics_matrix(&reference, production.as_ref(), column_mapping.as_ref())?;
	let widget_info = match metrics_matrix {
		Some(metrics_matrix) => {
			eprintln!("{}", metrics_matrix.to_table());
			Some(widget.widget_info(&metrics_matrix)?)
		}
		None => {
			log::warn!("the metrics matrix needs production data with target and prediction columns");
			None
		}
	};

	// Write the widget info to the output path or stdout.
	let json = serde_json::to_string_pretty(&widget_info)?;
	match options.output {
		Some(output_path) => {
			std::fs::write(&output_path, json)
				.with_context(|| format!("failed to write {}", output_path.display()))?;
			log::info!("the widget was written to {}", output_path.display());
		}
		None => println!("{}", json),
	}
	Ok(())
}

fn load_dataframe(path: &Path) -> Result<DataFrame> {
	let dataframe = DataFrame::from_path(path, Default::default())
		.with_context(|| format!("failed to load {}", path.display()))?;
	log::info!(
		"loaded {} rows and {} columns from {}",
		dataframe.nrows(),
		dataframe.ncols(),
		path.display()
	);
	Ok(dataframe)
}
