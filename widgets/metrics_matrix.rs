use lookout_charts::{
	annotated_heatmap, AnnotatedHeatmapOptions, ColorScale, Figure, HeatmapError,
};
use lookout_dataframe::{Column, DataFrame};
use lookout_metrics::{
	sorted_distinct_labels, ClassificationReport, ClassificationReportInput, LabelBinarizer,
	Metric, OneVsRestAucRoc, OneVsRestAucRocInput, StreamingMetric,
};
use lookout_util::Table;
use ndarray::prelude::*;
use thiserror::Error;

/// Per class quality metrics of a probabilistic classifier on production data. Rows are metrics and columns are classes.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsMatrix {
	/// `precision`, `recall`, `f1-score`, and `roc-auc` when there are more than two score columns.
	pub metrics: Vec<String>,
	/// The distinct classes of the production target, sorted.
	pub classes: Vec<String>,
	/// (n_metrics, n_classes)
	pub values: Array2<f32>,
}

pub struct MetricsMatrixInput<'a> {
	pub reference: &'a DataFrame,
	pub production: &'a DataFrame,
	pub target_column: &'a str,
	/// One score column per class.
	pub prediction_columns: &'a [String],
	/// The class label of each score column, in the same order.
	pub prediction_labels: &'a [String],
}

#[derive(Debug, Error, PartialEq)]
pub enum MetricsMatrixError {
	#[error("a probabilistic classifier needs one score column per class but {0} prediction columns were given")]
	NotEnoughPredictionColumns(usize),
	#[error("there are {labels} class labels for {columns} prediction columns")]
	LabelCount { labels: usize, columns: usize },
	#[error("the {dataset} dataset has no column named \"{column}\"")]
	MissingColumn {
		dataset: &'static str,
		column: String,
	},
	#[error("the prediction column \"{0}\" is not a number column")]
	NotNumber(String),
	#[error("the target column \"{0}\" has no values")]
	EmptyTarget(String),
	#[error("class \"{0}\" does not appear in the reference target")]
	UnknownClass(String),
	#[error("class \"{0}\" is used for more than one prediction column")]
	DuplicateClass(String),
	#[error("the reference target has {classes} classes but there are {columns} prediction columns")]
	ClassCount { classes: usize, columns: usize },
	#[error("roc auc is undefined for class \"{0}\" because the production target does not contain both it and another class")]
	UndefinedRocAuc(String),
	#[error(transparent)]
	Chart(#[from] HeatmapError),
}

/**
Compute the metrics matrix of the production dataset.

Production rows with a missing or non-finite value in any column are dropped first. If none remain the result is `Ok(None)`. Each remaining row is predicted as the label of its highest scoring column, the first one on ties.
*/
pub fn compute_metrics_matrix(
	input: MetricsMatrixInput,
) -> Result<Option<MetricsMatrix>, MetricsMatrixError> {
	let MetricsMatrixInput {
		reference,
		production,
		target_column,
		prediction_columns,
		prediction_labels,
	} = input;
	if prediction_columns.len() < 2 {
		return Err(MetricsMatrixError::NotEnoughPredictionColumns(
			prediction_columns.len(),
		));
	}
	if prediction_labels.len() != prediction_columns.len() {
		return Err(MetricsMatrixError::LabelCount {
			labels: prediction_labels.len(),
			columns: prediction_columns.len(),
		});
	}
	check_columns(production, "production", target_column, prediction_columns)?;
	let reference_target = column(reference, "reference", target_column)?;

	// The reference target may have missing values. They do not name a class.
	let reference_labels: Vec<String> = (0..reference_target.len())
		.filter_map(|index| reference_target.label(index))
		.collect();
	let binarizer = LabelBinarizer::fit(reference_labels.iter().map(|label| label.as_str()))
		.map_err(|_| MetricsMatrixError::EmptyTarget(target_column.to_owned()))?;
	let class_indexes = score_class_indexes(&binarizer, prediction_labels)?;

	let n_rows_before = production.nrows();
	let production = production.drop_missing_rows();
	let n_rows = production.nrows();
	log::debug!(
		"dropped {} of {} production rows with missing or non-finite values",
		n_rows_before - n_rows,
		n_rows_before,
	);
	if n_rows == 0 {
		log::warn!("no production rows are left to compute the metrics matrix");
		return Ok(None);
	}

	let labels = column(&production, "production", target_column)?
		.labels()
		.ok_or_else(|| MetricsMatrixError::EmptyTarget(target_column.to_owned()))?;
	let binarized_labels = binarizer.transform(labels.iter().map(|label| label.as_str()));

	let scores = production
		.to_rows_f32(prediction_columns)
		.ok_or_else(|| MetricsMatrixError::NotNumber(prediction_columns.join(", ")))?;
	let predictions: Vec<String> = scores
		.axis_iter(Axis(0))
		.map(|row| prediction_labels[argmax(row)].clone())
		.collect();

	let classes = sorted_distinct_labels(labels.iter().map(|label| label.as_str()));
	let report_classes =
		sorted_distinct_labels(labels.iter().chain(predictions.iter()).map(|label| label.as_str()));
	let mut report = ClassificationReport::new(report_classes);
	report.update(ClassificationReportInput {
		labels: &labels,
		predictions: &predictions,
	});
	let report = match report.finalize() {
		Some(report) => report,
		None => return Ok(None),
	};

	let mut metrics = vec![
		"precision".to_owned(),
		"recall".to_owned(),
		"f1-score".to_owned(),
	];
	let mut rows: Vec<Vec<f32>> = vec![Vec::new(), Vec::new(), Vec::new()];
	for class in classes.iter() {
		let class_metrics = report
			.class(class)
			.ok_or_else(|| MetricsMatrixError::UnknownClass(class.clone()))?;
		rows[0].push(class_metrics.precision);
		rows[1].push(class_metrics.recall);
		rows[2].push(class_metrics.f1_score);
	}

	if prediction_columns.len() > 2 {
		let aucs = one_vs_rest_auc_roc(scores.view(), binarized_labels.view(), &class_indexes);
		let roc_auc = classes
			.iter()
			.map(|class| {
				binarizer
					.class_index(class)
					.ok_or_else(|| MetricsMatrixError::UnknownClass(class.clone()))
					.and_then(|index| {
						aucs[index]
							.ok_or_else(|| MetricsMatrixError::UndefinedRocAuc(class.clone()))
					})
			})
			.collect::<Result<Vec<f32>, _>>()?;
		metrics.push("roc-auc".to_owned());
		rows.push(roc_auc);
	}

	let mut values = Array2::zeros((rows.len(), classes.len()));
	for (mut values_row, row) in values.axis_iter_mut(Axis(0)).zip(rows.iter()) {
		for (value, metric) in values_row.iter_mut().zip(row.iter()) {
			*value = *metric;
		}
	}
	Ok(Some(MetricsMatrix {
		metrics,
		classes,
		values,
	}))
}

impl MetricsMatrix {
	pub fn get(&self, metric: &str, class: &str) -> Option<f32> {
		let row = self.metrics.iter().position(|name| name == metric)?;
		let column = self.classes.iter().position(|name| name == class)?;
		Some(self.values[(row, column)])
	}

	/// Draw the matrix as an annotated heatmap with classes across the top and metrics down the side.
	pub fn to_figure(&self) -> Result<Figure, HeatmapError> {
		annotated_heatmap(AnnotatedHeatmapOptions {
			z: self.values.view(),
			x: self.classes.clone(),
			y: self.metrics.clone(),
			annotation_text: None,
			colorscale: ColorScale::Bluered,
			showscale: true,
			x_axis_title: Some("Class".to_owned()),
			y_axis_title: Some("Metric".to_owned()),
		})
	}

	pub fn to_table(&self) -> Table {
		let header = std::iter::once(String::new())
			.chain(self.classes.iter().cloned())
			.collect();
		let rows = self
			.metrics
			.iter()
			.zip(self.values.axis_iter(Axis(0)))
			.map(|(metric, values)| {
				std::iter::once(metric.clone())
					.chain(values.iter().map(|value| format!("{:.3}", value)))
					.collect()
			})
			.collect();
		Table::new(header, rows)
	}
}

fn column<'a>(
	dataframe: &'a DataFrame,
	dataset: &'static str,
	name: &str,
) -> Result<&'a Column, MetricsMatrixError> {
	dataframe
		.column(name)
		.ok_or_else(|| MetricsMatrixError::MissingColumn {
			dataset,
			column: name.to_owned(),
		})
}

fn check_columns(
	dataframe: &DataFrame,
	dataset: &'static str,
	target_column: &str,
	prediction_columns: &[String],
) -> Result<(), MetricsMatrixError> {
	column(dataframe, dataset, target_column)?;
	for name in prediction_columns {
		if !column(dataframe, dataset, name)?.column_type().is_numeric() {
			return Err(MetricsMatrixError::NotNumber(name.clone()));
		}
	}
	Ok(())
}

/// The index of the largest score. The first one wins ties.
fn argmax(scores: ArrayView1<f32>) -> usize {
	let mut best = 0;
	for (index, score) in scores.iter().enumerate() {
		if *score > scores[best] {
			best = index;
		}
	}
	best
}

/// Find the binarizer class of each score column. Every class of the reference target needs exactly one score column.
fn score_class_indexes(
	binarizer: &LabelBinarizer,
	prediction_labels: &[String],
) -> Result<Vec<usize>, MetricsMatrixError> {
	if binarizer.n_classes() != prediction_labels.len() {
		return Err(MetricsMatrixError::ClassCount {
			classes: binarizer.n_classes(),
			columns: prediction_labels.len(),
		});
	}
	let mut assigned = vec![false; binarizer.n_classes()];
	prediction_labels
		.iter()
		.map(|label| {
			let index = binarizer
				.class_index(label)
				.ok_or_else(|| MetricsMatrixError::UnknownClass(label.clone()))?;
			if assigned[index] {
				return Err(MetricsMatrixError::DuplicateClass(label.clone()));
			}
			assigned[index] = true;
			Ok(index)
		})
		.collect()
}

/// Compute the one-vs-rest roc auc of every binarizer class. Score columns are reordered to match the binarizer's classes.
fn one_vs_rest_auc_roc(
	scores: ArrayView2<f32>,
	binarized_labels: ArrayView2<u8>,
	class_indexes: &[usize],
) -> Vec<Option<f32>> {
	let mut probabilities = Array2::zeros(scores.raw_dim());
	for (scores_column, index) in scores.axis_iter(Axis(1)).zip(class_indexes.iter()) {
		probabilities.column_mut(*index).assign(&scores_column);
	}
	OneVsRestAucRoc::compute(OneVsRestAucRocInput {
		probabilities: probabilities.view(),
		labels: binarized_labels.view(),
	})
}

#[cfg(test)]
fn matrix(
	classes: &[&str],
	reference: &DataFrame,
	production: &DataFrame,
) -> Result<Option<MetricsMatrix>, MetricsMatrixError> {
	let columns = crate::test::strings(classes);
	compute_metrics_matrix(MetricsMatrixInput {
		reference,
		production,
		target_column: "target",
		prediction_columns: &columns,
		prediction_labels: &columns,
	})
}

#[cfg(test)]
fn assert_close(left: f32, right: f32) {
	assert!(
		(left - right).abs() < 1e-6,
		"{} is not close to {}",
		left,
		right
	);
}

#[test]
fn test_two_classes() {
	use crate::test::scored_dataframe;
	let reference = scored_dataframe(&["A", "B"], &["A", "B"], &[&[0.9, 0.1], &[0.2, 0.8]]);
	let production = scored_dataframe(
		&["A", "B"],
		&["A", "A", "A", "B"],
		&[
			&[0.9, 0.1], // A, right
			&[0.6, 0.4], // A, right
			&[0.3, 0.7], // B, wrong
			&[0.8, 0.2], // A, wrong
		],
	);
	let matrix = matrix(&["A", "B"], &reference, &production).unwrap().unwrap();
	assert_eq!(matrix.metrics, vec!["precision", "recall", "f1-score"]);
	assert_eq!(matrix.classes, vec!["A", "B"]);
	// A: 2 true positives, 1 false positive, 1 false negative
	assert_close(matrix.get("precision", "A").unwrap(), 2.0 / 3.0);
	assert_close(matrix.get("recall", "A").unwrap(), 2.0 / 3.0);
	assert_close(matrix.get("f1-score", "A").unwrap(), 2.0 / 3.0);
	// B: no true positives
	assert_eq!(matrix.get("precision", "B"), Some(0.0));
	assert_eq!(matrix.get("recall", "B"), Some(0.0));
	assert_eq!(matrix.get("f1-score", "B"), Some(0.0));
	assert_eq!(matrix.get("roc-auc", "A"), None);
}

#[test]
fn test_three_classes_roc_auc() {
	use crate::test::scored_dataframe;
	let classes = ["a", "b", "c"];
	let reference = scored_dataframe(
		&classes,
		&["a", "b", "c"],
		&[&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]],
	);
	let production = scored_dataframe(
		&classes,
		&["a", "a", "b", "b", "c", "c"],
		&[
			&[0.7, 0.2, 0.1],
			&[0.5, 0.3, 0.2],
			&[0.2, 0.6, 0.2],
			&[0.4, 0.5, 0.1],
			&[0.1, 0.2, 0.7],
			&[0.3, 0.3, 0.4],
		],
	);
	let matrix = matrix(&classes, &reference, &production).unwrap().unwrap();
	assert_eq!(matrix.metrics, vec!["precision", "recall", "f1-score", "roc-auc"]);
	assert_eq!(matrix.values.dim(), (4, 3));
	for class in classes.iter() {
		assert_eq!(matrix.get("roc-auc", class), Some(1.0));
	}
	assert!(matrix.values.iter().all(|value| (0.0..=1.0).contains(value)));
}

#[test]
fn test_classes_come_from_production_target() {
	use crate::test::scored_dataframe;
	let classes = ["a", "b", "c"];
	let reference = scored_dataframe(
		&classes,
		&["c", "a", "b"],
		&[&[0.0, 0.0, 1.0], &[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]],
	);
	// class c is predicted once but never true in production
	let production = scored_dataframe(
		&classes,
		&["b", "a", "a", "b"],
		&[
			&[0.1, 0.8, 0.1],
			&[0.7, 0.2, 0.1],
			&[0.2, 0.1, 0.7],
			&[0.3, 0.6, 0.1],
		],
	);
	let matrix = matrix(&classes, &reference, &production).unwrap().unwrap();
	assert_eq!(matrix.classes, vec!["a", "b"]);
	assert_eq!(matrix.values.dim(), (4, 2));
	assert_close(matrix.get("precision", "a").unwrap(), 1.0);
	assert_close(matrix.get("recall", "a").unwrap(), 0.5);
	// a: positives score 0.7 and 0.2, negatives 0.1 and 0.3
	assert_close(matrix.get("roc-auc", "a").unwrap(), 0.75);
	assert_close(matrix.get("roc-auc", "b").unwrap(), 1.0);
}

#[test]
fn test_drops_rows_with_infinite_values() {
	use crate::test::{number_column, scored_dataframe};
	let reference = scored_dataframe(&["A", "B"], &["A", "B"], &[&[0.9, 0.1], &[0.2, 0.8]]);
	let mut production = scored_dataframe(
		&["A", "B"],
		&["A", "B", "B", "A", ""],
		&[
			&[0.9, 0.1],
			&[0.2, 0.8],
			&[0.1, 0.9],
			&[0.1, 0.9],
			&[0.1, 0.9],
		],
	);
	production.columns.push(number_column(
		"feature",
		&[1.0, 2.0, 3.0, f32::INFINITY, 5.0],
	));
	// The fourth row is predicted wrong and the fifth has no target.
	assert_eq!(production.nrows(), 5);
	assert_eq!(production.drop_missing_rows().nrows(), 3);
	let matrix = matrix(&["A", "B"], &reference, &production).unwrap().unwrap();
	assert_eq!(matrix.get("precision", "B"), Some(1.0));
	assert_eq!(matrix.get("recall", "A"), Some(1.0));
	let everything_missing = scored_dataframe(&["A", "B"], &[""], &[&[0.5, 0.5]]);
	assert_eq!(matrix_or_none(&reference, &everything_missing), None);
}

#[cfg(test)]
fn matrix_or_none(reference: &DataFrame, production: &DataFrame) -> Option<MetricsMatrix> {
	matrix(&["A", "B"], reference, production).unwrap()
}

#[test]
fn test_errors() {
	use crate::test::{scored_dataframe, strings, text_column};
	let reference = scored_dataframe(&["A", "B"], &["A", "B"], &[&[0.9, 0.1], &[0.2, 0.8]]);
	let production = scored_dataframe(&["A", "B"], &["A", "B"], &[&[0.9, 0.1], &[0.2, 0.8]]);
	let columns = strings(&["A", "B"]);
	let result = compute_metrics_matrix(MetricsMatrixInput {
		reference: &reference,
		production: &production,
		target_column: "target",
		prediction_columns: &columns,
		prediction_labels: &strings(&["A", "B", "C"]),
	});
	assert_eq!(
		result,
		Err(MetricsMatrixError::LabelCount {
			labels: 3,
			columns: 2
		})
	);
	assert_eq!(
		matrix(&["A", "C"], &reference, &production),
		Err(MetricsMatrixError::MissingColumn {
			dataset: "production",
			column: "C".to_owned(),
		})
	);
	let mut text_scores = production.clone();
	text_scores.columns.push(text_column("C", &["x", "y"]));
	assert_eq!(
		matrix(&["A", "C"], &reference, &text_scores),
		Err(MetricsMatrixError::NotNumber("C".to_owned()))
	);
	assert_eq!(
		matrix(&[], &reference, &production),
		Err(MetricsMatrixError::NotEnoughPredictionColumns(0))
	);
}

#[test]
fn test_undefined_roc_auc() {
	use crate::test::scored_dataframe;
	let classes = ["a", "b", "c"];
	let reference = scored_dataframe(
		&classes,
		&["a", "b", "c"],
		&[&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]],
	);
	let production = scored_dataframe(&classes, &["a", "a"], &[&[0.6, 0.3, 0.1], &[0.1, 0.3, 0.6]]);
	assert_eq!(
		matrix(&classes, &reference, &production),
		Err(MetricsMatrixError::UndefinedRocAuc("a".to_owned()))
	);
	let production = scored_dataframe(&classes, &["a", "d"], &[&[0.6, 0.3, 0.1], &[0.1, 0.3, 0.6]]);
	assert_eq!(
		matrix(&classes, &reference, &production),
		Err(MetricsMatrixError::UnknownClass("d".to_owned()))
	);
}

#[test]
fn test_table_and_figure() {
	use crate::test::scored_dataframe;
	let reference = scored_dataframe(&["A", "B"], &["A", "B"], &[&[0.9, 0.1], &[0.2, 0.8]]);
	let production = scored_dataframe(
		&["A", "B"],
		&["A", "A", "A", "B"],
		&[&[0.9, 0.1], &[0.6, 0.4], &[0.3, 0.7], &[0.8, 0.2]],
	);
	let matrix = matrix(&["A", "B"], &reference, &production).unwrap().unwrap();
	assert_eq!(
		matrix.to_table().to_string(),
		concat!(
			"|           | A     | B     |\n",
			"|-----------|-------|-------|\n",
			"| precision | 0.667 | 0.000 |\n",
			"| recall    | 0.667 | 0.000 |\n",
			"| f1-score  | 0.667 | 0.000 |\n",
		)
	);
	let figure = matrix.to_figure().unwrap();
	let texts: Vec<&str> = figure
		.layout
		.annotations
		.iter()
		.map(|annotation| annotation.text.as_str())
		.collect();
	assert_eq!(texts, vec!["0.667", "0.0", "0.667", "0.0", "0.667", "0.0"]);
	assert_eq!(figure.layout.xaxis.side.as_deref(), Some("top"));
}

#[test]
fn test_score_columns_must_name_reference_classes() {
	use crate::test::{scored_dataframe, strings};
	let reference = scored_dataframe(&["A", "B"], &["A", "B"], &[&[0.9, 0.1], &[0.2, 0.8]]);
	let production = scored_dataframe(&["A", "B"], &["A", "B"], &[&[0.9, 0.1], &[0.2, 0.8]]);
	let columns = strings(&["A", "B"]);
	let with_labels = |labels: &[&str]| {
		let labels = strings(labels);
		compute_metrics_matrix(MetricsMatrixInput {
			reference: &reference,
			production: &production,
			target_column: "target",
			prediction_columns: &columns,
			prediction_labels: &labels,
		})
	};
	assert_eq!(
		with_labels(&["x", "y"]),
		Err(MetricsMatrixError::UnknownClass("x".to_owned()))
	);
	assert_eq!(
		with_labels(&["A", "A"]),
		Err(MetricsMatrixError::DuplicateClass("A".to_owned()))
	);
	assert!(with_labels(&["B", "A"]).unwrap().is_some());
	let three_classes = scored_dataframe(
		&["A", "B"],
		&["A", "B", "C"],
		&[&[0.9, 0.1], &[0.2, 0.8], &[0.5, 0.5]],
	);
	assert_eq!(
		matrix(&["A", "B"], &three_classes, &production),
		Err(MetricsMatrixError::ClassCount {
			classes: 3,
			columns: 2
		})
	);
}
