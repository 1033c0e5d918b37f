use crate::{Axis, AxisTitle, ColorScale, Figure, Layout, Trace};
use itertools::izip;
use ndarray::prelude::*;
use thiserror::Error;

pub struct AnnotatedHeatmapOptions<'a> {
	pub z: ArrayView2<'a, f32>,
	/// One label for each column of `z`.
	pub x: Vec<String>,
	/// One label for each row of `z`.
	pub y: Vec<String>,
	/// The text drawn over each cell. When `None`, each value of `z` is formatted with [`format_annotation`](fn.format_annotation.html).
	pub annotation_text: Option<Vec<Vec<String>>>,
	pub colorscale: ColorScale,
	pub showscale: bool,
	pub x_axis_title: Option<String>,
	pub y_axis_title: Option<String>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct HeatmapTrace {
	pub z: Vec<Vec<f32>>,
	pub x: Vec<String>,
	pub y: Vec<String>,
	pub colorscale: ColorScale,
	pub showscale: bool,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct Annotation {
	pub text: String,
	pub x: String,
	pub y: String,
	pub xref: String,
	pub yref: String,
	pub font: AnnotationFont,
	pub showarrow: bool,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct AnnotationFont {
	pub color: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum HeatmapError {
	#[error("z has shape ({rows}, {columns}) but there are {y} y labels and {x} x labels")]
	Shape {
		rows: usize,
		columns: usize,
		x: usize,
		y: usize,
	},
	#[error("the annotation text does not have the same shape as z")]
	AnnotationShape,
}

/// Build a heatmap figure with one annotation drawn over each cell.
pub fn annotated_heatmap(options: AnnotatedHeatmapOptions) -> Result<Figure, HeatmapError> {
	let AnnotatedHeatmapOptions {
		z,
		x,
		y,
		annotation_text,
		colorscale,
		showscale,
		x_axis_title,
		y_axis_title,
	} = options;
	let (n_rows, n_columns) = z.dim();
	if x.len() != n_columns || y.len() != n_rows {
		return Err(HeatmapError::Shape {
			rows: n_rows,
			columns: n_columns,
			x: x.len(),
			y: y.len(),
		});
	}
	let annotation_text = match annotation_text {
		Some(annotation_text) => {
			let matches_z = annotation_text.len() == n_rows
				&& annotation_text.iter().all(|row| row.len() == n_columns);
			if !matches_z {
				return Err(HeatmapError::AnnotationShape);
			}
			annotation_text
		}
		None => z
			.outer_iter()
			.map(|row| row.iter().map(|value| format_annotation(*value)).collect())
			.collect(),
	};

	// Cells below the midpoint of the z range get the scale's min text color and the rest get its max text color.
	let (min_text_color, max_text_color) = colorscale.text_colors();
	let z_min = z.iter().cloned().fold(f32::INFINITY, f32::min);
	let z_max = z.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
	let z_mid = (z_min + z_max) / 2.0;
	let mut annotations = Vec::with_capacity(n_rows * n_columns);
	for (row, y_label, row_text) in izip!(z.outer_iter(), y.iter(), annotation_text.iter()) {
		for (value, x_label, text) in izip!(row.iter(), x.iter(), row_text.iter()) {
			let color = if *value < z_mid {
				min_text_color
			} else {
				max_text_color
			};
			annotations.push(Annotation {
				text: text.clone(),
				x: x_label.clone(),
				y: y_label.clone(),
				xref: "x".to_owned(),
				yref: "y".to_owned(),
				font: AnnotationFont {
					color: color.to_owned(),
				},
				showarrow: false,
			});
		}
	}

	let trace = HeatmapTrace {
		z: z.outer_iter().map(|row| row.to_vec()).collect(),
		x,
		y,
		colorscale,
		showscale,
	};
	let layout = Layout {
		annotations,
		xaxis: Axis {
			title: x_axis_title.map(|text| AxisTitle { text }),
			ticks: String::new(),
			dtick: Some(1.0),
			side: Some("top".to_owned()),
			gridcolor: Some("rgb(0, 0, 0)".to_owned()),
			ticksuffix: None,
		},
		yaxis: Axis {
			title: y_axis_title.map(|text| AxisTitle { text }),
			ticks: String::new(),
			dtick: Some(1.0),
			side: None,
			gridcolor: None,
			ticksuffix: Some("  ".to_owned()),
		},
	};
	Ok(Figure {
		data: vec![Trace::Heatmap(trace)],
		layout,
	})
}

/// Round `value` to 3 decimal places and print it the shortest way that still reads as a float, so `0.8333333` becomes `"0.833"` and `1.0` stays `"1.0"`.
pub fn format_annotation(value: f32) -> String {
	let rounded = (f64::from(value) * 1000.0).round() / 1000.0;
	let text = rounded.to_string();
	if rounded.is_finite() && !text.contains('.') {
		format!("{}.0", text)
	} else {
		text
	}
}

#[test]
fn test_format_annotation() {
	assert_eq!(format_annotation(0.833_333_3), "0.833");
	assert_eq!(format_annotation(2.0 / 3.0), "0.667");
	assert_eq!(format_annotation(0.5), "0.5");
	assert_eq!(format_annotation(1.0), "1.0");
	assert_eq!(format_annotation(0.0), "0.0");
	assert_eq!(format_annotation(0.9999), "1.0");
	let texts: Vec<String> = [0.833_333_3f32, 1.0, 0.0001]
		.iter()
		.map(|value| format_annotation(*value))
		.collect();
	insta::assert_debug_snapshot!(texts, @r###"
 [
     "0.833",
     "1.0",
     "0.0",
 ]
 "###);
}

#[test]
fn test_annotated_heatmap() {
	let z = arr2(&[[0.5f32, 1.0], [0.25, 0.75]]);
	let figure = annotated_heatmap(AnnotatedHeatmapOptions {
		z: z.view(),
		x: vec!["A".to_owned(), "B".to_owned()],
		y: vec!["precision".to_owned(), "recall".to_owned()],
		annotation_text: None,
		colorscale: ColorScale::Bluered,
		showscale: true,
		x_axis_title: Some("Class".to_owned()),
		y_axis_title: Some("Metric".to_owned()),
	})
	.unwrap();
	let annotation = |text: &str, x: &str, y: &str, color: &str| {
		serde_json::json!({
			"text": text,
			"x": x,
			"y": y,
			"xref": "x",
			"yref": "y",
			"font": { "color": color },
			"showarrow": false,
		})
	};
	let expected = serde_json::json!({
		"data": [{
			"type": "heatmap",
			"z": [[0.5, 1.0], [0.25, 0.75]],
			"x": ["A", "B"],
			"y": ["precision", "recall"],
			"colorscale": "Bluered",
			"showscale": true,
		}],
		"layout": {
			"annotations": [
				annotation("0.5", "A", "precision", "#000000"),
				annotation("1.0", "B", "precision", "#000000"),
				annotation("0.25", "A", "recall", "#000000"),
				annotation("0.75", "B", "recall", "#000000"),
			],
			"xaxis": {
				"title": { "text": "Class" },
				"ticks": "",
				"dtick": 1.0,
				"side": "top",
				"gridcolor": "rgb(0, 0, 0)",
			},
			"yaxis": {
				"title": { "text": "Metric" },
				"ticks": "",
				"dtick": 1.0,
				"ticksuffix": "  ",
			},
		},
	});
	assert_eq!(serde_json::to_value(&figure).unwrap(), expected);
}

#[test]
fn test_shape_errors() {
	let z = arr2(&[[0.5f32, 1.0]]);
	let options = |x: Vec<&str>, annotation_text: Option<Vec<Vec<String>>>| {
		AnnotatedHeatmapOptions {
			z: z.view(),
			x: x.into_iter().map(|x| x.to_owned()).collect(),
			y: vec!["f1-score".to_owned()],
			annotation_text,
			colorscale: ColorScale::Bluered,
			showscale: true,
			x_axis_title: None,
			y_axis_title: None,
		}
	};
	assert_eq!(
		annotated_heatmap(options(vec!["A"], None)).unwrap_err(),
		HeatmapError::Shape {
			rows: 1,
			columns: 2,
			x: 1,
			y: 1,
		}
	);
	assert_eq!(
		annotated_heatmap(options(vec!["A", "B"], Some(vec![vec!["x".to_owned()]]))).unwrap_err(),
		HeatmapError::AnnotationShape
	);
	let figure = annotated_heatmap(options(vec!["A", "B"], None)).unwrap();
	assert!(figure.layout.xaxis.title.is_none());
	assert_eq!(figure.layout.annotations.len(), 2);
}
