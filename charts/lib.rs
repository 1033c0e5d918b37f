/*!
This crate builds chart descriptions for lookout reports. A chart is a [`Figure`](struct.Figure.html): a list of traces and a layout, serialized with serde in the shape the report front end renders. Nothing here draws pixels.
*/

mod color_scale;
mod heatmap;

pub use self::color_scale::ColorScale;
pub use self::heatmap::{
	annotated_heatmap, format_annotation, AnnotatedHeatmapOptions, Annotation, AnnotationFont,
	HeatmapError, HeatmapTrace,
};

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct Figure {
	pub data: Vec<Trace>,
	pub layout: Layout,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Trace {
	#[serde(rename = "heatmap")]
	Heatmap(HeatmapTrace),
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Default)]
pub struct Layout {
	pub annotations: Vec<Annotation>,
	pub xaxis: Axis,
	pub yaxis: Axis,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq, Default)]
pub struct Axis {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<AxisTitle>,
	pub ticks: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dtick: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub side: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gridcolor: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ticksuffix: Option<String>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct AxisTitle {
	pub text: String,
}
