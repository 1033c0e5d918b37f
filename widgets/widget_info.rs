use lookout_charts::Figure;

/// The envelope the report front end expects for every widget.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetInfo {
	pub title: String,
	#[serde(rename = "type")]
	pub widget_type: WidgetType,
	pub details: String,
	pub alert_stats: AlertStats,
	pub alerts: Vec<Alert>,
	pub alerts_position: String,
	pub insights: Vec<Insight>,
	pub size: u32,
	pub params: Figure,
	pub additional_graphs: Vec<Figure>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Copy, PartialEq)]
pub enum WidgetType {
	#[serde(rename = "big_graph")]
	BigGraph,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq)]
pub struct AlertStats {}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
	pub value: String,
	pub state: String,
	pub text: String,
	pub long_text: String,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct Insight {
	pub title: String,
	pub severity: String,
	pub text: String,
}

impl WidgetInfo {
	/// A full width graph with no alerts or insights.
	pub fn big_graph(title: String, figure: Figure) -> WidgetInfo {
		WidgetInfo {
			title,
			widget_type: WidgetType::BigGraph,
			details: String::new(),
			alert_stats: AlertStats::default(),
			alerts: Vec::new(),
			alerts_position: "row".to_owned(),
			insights: Vec::new(),
			size: 1,
			params: figure,
			additional_graphs: Vec::new(),
		}
	}
}

#[test]
fn test_big_graph_json() {
	let widget_info = WidgetInfo::big_graph("Quality".to_owned(), Figure {
		data: Vec::new(),
		layout: Default::default(),
	});
	let json = serde_json::to_value(&widget_info).unwrap();
	let mut keys: Vec<&str> = json
		.as_object()
		.unwrap()
		.keys()
		.map(|key| key.as_str())
		.collect();
	keys.sort_unstable();
	insta::assert_debug_snapshot!(keys, @r###"
 [
     "additionalGraphs",
     "alertStats",
     "alerts",
     "alertsPosition",
     "details",
     "insights",
     "params",
     "size",
     "title",
     "type",
 ]
 "###);
	assert_eq!(json["type"], "big_graph");
	assert_eq!(json["alertsPosition"], "row");
	assert_eq!(json["alertStats"], serde_json::json!({}));
	assert_eq!(json["size"], 1);
	assert_eq!(json["details"], "");
	assert!(json["params"]["data"].as_array().unwrap().is_empty());
}
