/// The named color scales a heatmap can use.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Copy, PartialEq)]
pub enum ColorScale {
	/// A diverging scale from blue to red.
	Bluered,
}

const BLACK: &str = "#000000";

impl ColorScale {
	/// The annotation text colors to use over cells below and above the midpoint of the z range, in that order.
	pub fn text_colors(self) -> (&'static str, &'static str) {
		match self {
			ColorScale::Bluered => (BLACK, BLACK),
		}
	}
}

#[test]
fn test_serialize() {
	assert_eq!(
		serde_json::to_string(&ColorScale::Bluered).unwrap(),
		"\"Bluered\""
	);
	assert_eq!(ColorScale::Bluered.text_colors(), ("#000000", "#000000"));
}
