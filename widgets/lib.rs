/*!
This crate contains the widgets that make up a lookout monitoring report. A widget reads a reference dataset, an optional production dataset and an optional [`ColumnMapping`](struct.ColumnMapping.html), and returns a [`WidgetInfo`](struct.WidgetInfo.html) that the report front end renders.

```no_run
use lookout_dataframe::DataFrame;
use lookout_widgets::{ProbClassProdMetricsMatrixWidget, Widget};
use std::path::Path;

let reference = DataFrame::from_path(Path::new("reference.csv"), Default::default()).unwrap();
let production = DataFrame::from_path(Path::new("production.csv"), Default::default()).unwrap();
let widget = ProbClassProdMetricsMatrixWidget::new("Production: Quality Metrics Matrix");
let widget_info = widget.calculate(&reference, Some(&production), None).unwrap();
println!("{}", serde_json::to_string(&widget_info).unwrap());
```
*/

use lookout_dataframe::DataFrame;

mod column_mapping;
mod metrics_matrix;
mod prob_class_prod_metrics_matrix;
mod widget_info;

pub use self::column_mapping::{
	resolve_columns, ColumnMapping, ColumnMappingError, Prediction, ResolvedColumns,
};
pub use self::metrics_matrix::{
	compute_metrics_matrix, MetricsMatrix, MetricsMatrixError, MetricsMatrixInput,
};
pub use self::prob_class_prod_metrics_matrix::ProbClassProdMetricsMatrixWidget;
pub use self::widget_info::{Alert, AlertStats, Insight, WidgetInfo, WidgetType};

/// A `Widget` computes one section of a report.
pub trait Widget {
	fn title(&self) -> &str;

	/// Returns `Ok(None)` when the datasets do not contain what the widget needs.
	fn calculate(
		&self,
		reference: &DataFrame,
		production: Option<&DataFrame>,
		column_mapping: Option<&ColumnMapping>,
	) -> Result<Option<WidgetInfo>, MetricsMatrixError>;
}

#[cfg(test)]
mod test {
	use lookout_dataframe::{Column, DataFrame, NumberColumn, TextColumn};

	pub fn number_column(name: &str, data: &[f32]) -> Column {
		Column::Number(NumberColumn {
			name: name.to_owned(),
			data: data.to_vec(),
		})
	}

	pub fn text_column(name: &str, data: &[&str]) -> Column {
		Column::Text(TextColumn {
			name: name.to_owned(),
			data: data.iter().map(|value| value.to_string()).collect(),
		})
	}

	pub fn strings(values: &[&str]) -> Vec<String> {
		values.iter().map(|value| value.to_string()).collect()
	}

	/// Build a dataframe with a `target` text column and one number column of scores per class.
	pub fn scored_dataframe(classes: &[&str], targets: &[&str], scores: &[&[f32]]) -> DataFrame {
		let mut columns = vec![text_column("target", targets)];
		for (index, class) in classes.iter().enumerate() {
			let data: Vec<f32> = scores.iter().map(|row| row[index]).collect();
			columns.push(number_column(class, &data));
		}
		DataFrame { columns }
	}
}
