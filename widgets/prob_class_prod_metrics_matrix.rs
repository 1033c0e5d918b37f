use crate::{
	compute_metrics_matrix, resolve_columns, ColumnMapping, MetricsMatrix, MetricsMatrixError,
	MetricsMatrixInput, Widget, WidgetInfo,
};
use lookout_dataframe::DataFrame;

/// This widget shows precision, recall, f1 score and roc auc of a probabilistic classifier for each class of the production target.
pub struct ProbClassProdMetricsMatrixWidget {
	title: String,
}

impl ProbClassProdMetricsMatrixWidget {
	pub fn new(title: impl Into<String>) -> Self {
		Self {
			title: title.into(),
		}
	}

	/// Returns `Ok(None)` if there is no production dataset, if the target or prediction columns cannot be resolved, or if no production rows are left after dropping the ones with missing values.
	pub fn metrics_matrix(
		&self,
		reference: &DataFrame,
		production: Option<&DataFrame>,
		column_mapping: Option<&ColumnMapping>,
	) -> Result<Option<MetricsMatrix>, MetricsMatrixError> {
		let production = match production {
			Some(production) => production,
			None => {
				log::debug!("{}: there is no production dataset", self.title);
				return Ok(None);
			}
		};
		let columns = resolve_columns(reference, column_mapping);
		let (target_column, prediction_columns) = match (&columns.target, &columns.prediction) {
			(Some(target_column), Some(prediction_columns)) => (target_column, prediction_columns),
			_ => {
				log::debug!("{}: the target or prediction column is not set", self.title);
				return Ok(None);
			}
		};
		let prediction_labels = columns
			.prediction_labels()
			.unwrap_or_else(|| prediction_columns.clone());
		compute_metrics_matrix(MetricsMatrixInput {
			reference,
			production,
			target_column,
			prediction_columns,
			prediction_labels: &prediction_labels,
		})
	}

	pub fn widget_info(
		&self,
		metrics_matrix: &MetricsMatrix,
	) -> Result<WidgetInfo, MetricsMatrixError> {
		let figure = metrics_matrix.to_figure()?;
		Ok(WidgetInfo::big_graph(self.title.clone(), figure))
	}
}

impl Widget for ProbClassProdMetricsMatrixWidget {
	fn title(&self) -> &str {
		&self.title
	}

	fn calculate(
		&self,
		reference: &DataFrame,
		production: Option<&DataFrame>,
		column_mapping: Option<&ColumnMapping>,
	) -> Result<Option<WidgetInfo>, MetricsMatrixError> {
		match self.metrics_matrix(reference, production, column_mapping)? {
			Some(metrics_matrix) => self.widget_info(&metrics_matrix).map(Some),
			None => Ok(None),
		}
	}
}

#[cfg(test)]
fn two_class_datasets() -> (DataFrame, DataFrame) {
	use crate::test::scored_dataframe;
	let reference = scored_dataframe(&["A", "B"], &["A", "B"], &[&[0.9, 0.1], &[0.2, 0.8]]);
	let production = scored_dataframe(
		&["A", "B"],
		&["A", "A", "B", "B"],
		&[&[0.9, 0.1], &[0.3, 0.7], &[0.2, 0.8], &[0.6, 0.4]],
	);
	(reference, production)
}

#[test]
fn test_widget_end_to_end() {
	use crate::{test::strings, Prediction};
	let (reference, production) = two_class_datasets();
	let mapping = ColumnMapping {
		target: Some("target".to_owned()),
		prediction: Some(Prediction::Scores(strings(&["A", "B"]))),
		..Default::default()
	};
	let widget = ProbClassProdMetricsMatrixWidget::new("Production: Quality Metrics Matrix");
	assert_eq!(widget.title(), "Production: Quality Metrics Matrix");
	let widget_info = widget
		.calculate(&reference, Some(&production), Some(&mapping))
		.unwrap()
		.unwrap();
	let json = serde_json::to_value(&widget_info).unwrap();
	assert_eq!(json["title"], "Production: Quality Metrics Matrix");
	assert_eq!(json["type"], "big_graph");
	assert_eq!(json["size"], 1);
	let trace = &json["params"]["data"][0];
	assert_eq!(trace["type"], "heatmap");
	assert_eq!(trace["colorscale"], "Bluered");
	assert_eq!(trace["showscale"], true);
	assert_eq!(trace["x"], serde_json::json!(["A", "B"]));
	assert_eq!(
		trace["y"],
		serde_json::json!(["precision", "recall", "f1-score"])
	);
	// Each class has one right and one wrong prediction.
	assert_eq!(
		trace["z"],
		serde_json::json!([[0.5, 0.5], [0.5, 0.5], [0.5, 0.5]])
	);
	let texts: Vec<&str> = widget_info
		.params
		.layout
		.annotations
		.iter()
		.map(|annotation| annotation.text.as_str())
		.collect();
	assert_eq!(texts, vec!["0.5"; 6]);
	assert_eq!(json["params"]["layout"]["xaxis"]["title"]["text"], "Class");
	assert_eq!(json["params"]["layout"]["yaxis"]["title"]["text"], "Metric");
}

#[test]
fn test_widget_without_mapping() {
	let (reference, production) = two_class_datasets();
	let widget = ProbClassProdMetricsMatrixWidget::new("Quality");
	// Without a mapping the prediction role goes to a column named "prediction", which these datasets lack.
	assert_eq!(
		widget.calculate(&reference, Some(&production), None),
		Ok(None)
	);
	assert_eq!(widget.calculate(&reference, None, None), Ok(None));
}

#[test]
fn test_widget_unresolved_roles() {
	use crate::{test::strings, Prediction};
	let (reference, production) = two_class_datasets();
	let widget = ProbClassProdMetricsMatrixWidget::new("Quality");
	let no_target = ColumnMapping {
		prediction: Some(Prediction::Scores(strings(&["A", "B"]))),
		..Default::default()
	};
	assert_eq!(
		widget.calculate(&reference, Some(&production), Some(&no_target)),
		Ok(None)
	);
	let no_prediction = ColumnMapping {
		target: Some("target".to_owned()),
		..Default::default()
	};
	assert_eq!(
		widget.calculate(&reference, Some(&production), Some(&no_prediction)),
		Ok(None)
	);
	let mapping = ColumnMapping {
		target: Some("target".to_owned()),
		prediction: Some(Prediction::Scores(strings(&["A", "B"]))),
		..Default::default()
	};
	assert_eq!(
		widget.calculate(&reference, None, Some(&mapping)),
		Ok(None)
	);
}

#[test]
fn test_widget_target_names() {
	use crate::{
		test::{number_column, strings, text_column},
		Prediction,
	};
	let score_columns = |targets: &[&str], scores: &[[f32; 3]]| DataFrame {
		columns: vec![
			text_column("species", targets),
			number_column("score_0", &scores.iter().map(|row| row[0]).collect::<Vec<_>>()),
			number_column("score_1", &scores.iter().map(|row| row[1]).collect::<Vec<_>>()),
			number_column("score_2", &scores.iter().map(|row| row[2]).collect::<Vec<_>>()),
		],
	};
	let reference = score_columns(
		&["setosa", "versicolor", "virginica"],
		&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
	);
	let production = score_columns(
		&["virginica", "setosa", "versicolor", "virginica"],
		&[
			[0.1, 0.2, 0.7],
			[0.8, 0.1, 0.1],
			[0.2, 0.5, 0.3],
			[0.3, 0.4, 0.3],
		],
	);
	let mapping = ColumnMapping {
		target: Some("species".to_owned()),
		prediction: Some(Prediction::Scores(strings(&["score_0", "score_1", "score_2"]))),
		target_names: Some(strings(&["setosa", "versicolor", "virginica"])),
		..Default::default()
	};
	let widget = ProbClassProdMetricsMatrixWidget::new("Quality");
	let matrix = widget
		.metrics_matrix(&reference, Some(&production), Some(&mapping))
		.unwrap()
		.unwrap();
	assert_eq!(matrix.classes, strings(&["setosa", "versicolor", "virginica"]));
	assert_eq!(
		matrix.metrics,
		strings(&["precision", "recall", "f1-score", "roc-auc"])
	);
	// The last row is a virginica predicted as versicolor.
	assert_eq!(matrix.get("precision", "versicolor"), Some(0.5));
	assert_eq!(matrix.get("recall", "virginica"), Some(0.5));
	assert_eq!(matrix.get("roc-auc", "setosa"), Some(1.0));
	let mapping = ColumnMapping {
		target_names: Some(strings(&["setosa", "versicolor"])),
		..mapping
	};
	assert_eq!(
		widget.calculate(&reference, Some(&production), Some(&mapping)),
		Err(MetricsMatrixError::LabelCount {
			labels: 2,
			columns: 3
		})
	);
}

#[test]
fn test_widget_single_prediction_column() {
	use crate::{test::number_column, Prediction};
	let dataset = DataFrame {
		columns: vec![
			number_column("target", &[0.0, 1.0, 0.0, 1.0]),
			number_column("prediction", &[0.0, 1.0, 0.0, 1.0]),
		],
	};
	let widget = ProbClassProdMetricsMatrixWidget::new("Quality");
	// The naming convention resolves a single prediction column, which holds labels and not one score per class.
	assert_eq!(
		widget.calculate(&dataset, Some(&dataset), None),
		Err(MetricsMatrixError::NotEnoughPredictionColumns(1))
	);
	let mapping = ColumnMapping {
		target: Some("target".to_owned()),
		prediction: Some(Prediction::Column("prediction".to_owned())),
		..Default::default()
	};
	assert_eq!(
		widget.calculate(&dataset, Some(&dataset), Some(&mapping)),
		Err(MetricsMatrixError::NotEnoughPredictionColumns(1))
	);
}
