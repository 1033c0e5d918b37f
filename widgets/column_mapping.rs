use lookout_dataframe::{ColumnType, DataFrame};
use std::path::Path;
use thiserror::Error;

/**
A `ColumnMapping` tells a widget which columns of a dataset play which role. Every field is optional. When a widget is given no mapping at all, roles are resolved by column name instead, see [`resolve_columns`](fn.resolve_columns.html).

```yaml
target: species
prediction: [setosa, versicolor, virginica]
numerical_features: [sepal_length, sepal_width]
```
*/
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
	pub datetime: Option<String>,
	pub id: Option<String>,
	pub target: Option<String>,
	pub prediction: Option<Prediction>,
	pub numerical_features: Option<Vec<String>>,
	pub categorical_features: Option<Vec<String>>,
	/// The class label of each prediction score column, in the same order.
	pub target_names: Option<Vec<String>>,
}

/// A prediction is either one column of predicted labels or one score column per class.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Prediction {
	Column(String),
	Scores(Vec<String>),
}

#[derive(Debug, Error)]
pub enum ColumnMappingError {
	#[error("failed to read the column mapping: {0}")]
	Io(#[from] std::io::Error),
	#[error("failed to parse the column mapping: {0}")]
	Yaml(#[from] serde_yaml::Error),
	#[error("failed to parse the column mapping: {0}")]
	Json(#[from] serde_json::Error),
}

/// The role of every column after applying a mapping or the naming convention.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedColumns {
	pub datetime: Option<String>,
	pub id: Option<String>,
	pub target: Option<String>,
	pub prediction: Option<Vec<String>>,
	pub numerical_features: Vec<String>,
	pub categorical_features: Vec<String>,
	pub target_names: Option<Vec<String>>,
}

impl ColumnMapping {
	/// Read a mapping from a yaml file, or from a json file if the extension is `.json`.
	pub fn from_path(path: &Path) -> Result<ColumnMapping, ColumnMappingError> {
		let mapping = std::fs::read_to_string(path)?;
		let is_json = path
			.extension()
			.map(|extension| extension == "json")
			.unwrap_or(false);
		let mapping = if is_json {
			serde_json::from_str(&mapping)?
		} else {
			serde_yaml::from_str(&mapping)?
		};
		Ok(mapping)
	}
}

impl Prediction {
	pub fn columns(&self) -> Vec<String> {
		match self {
			Prediction::Column(column) => vec![column.clone()],
			Prediction::Scores(columns) => columns.clone(),
		}
	}
}

impl ResolvedColumns {
	/// The class label of each prediction column. These are the target names if the mapping has them and the prediction column names otherwise.
	pub fn prediction_labels(&self) -> Option<Vec<String>> {
		self.target_names.clone().or_else(|| self.prediction.clone())
	}
}

/**
Resolve column roles against the reference dataset.

With a mapping, the roles it names are taken as they are and both feature lists are narrowed to the number columns of `reference`. Without one, the `datetime`, `target` and `prediction` roles go to the columns with those names if they exist, and every other column becomes a numerical or categorical feature according to its type.
*/
pub fn resolve_columns(reference: &DataFrame, mapping: Option<&ColumnMapping>) -> ResolvedColumns {
	match mapping {
		Some(mapping) => {
			let numeric_columns = |names: &Option<Vec<String>>| -> Vec<String> {
				names
					.iter()
					.flatten()
					.filter(|name| {
						reference
							.column(name)
							.map(|column| column.column_type().is_numeric())
							.unwrap_or(false)
					})
					.cloned()
					.collect()
			};
			ResolvedColumns {
				datetime: mapping.datetime.clone(),
				id: mapping.id.clone(),
				target: mapping.target.clone(),
				prediction: mapping.prediction.as_ref().map(Prediction::columns),
				numerical_features: numeric_columns(&mapping.numerical_features),
				categorical_features: numeric_columns(&mapping.categorical_features),
				target_names: mapping.target_names.clone(),
			}
		}
		None => {
			let by_name = |name: &str| {
				if reference.has_column(name) {
					Some(name.to_owned())
				} else {
					None
				}
			};
			let datetime = by_name("datetime");
			let target = by_name("target");
			let prediction = by_name("prediction").map(|column| vec![column]);
			let utility_columns: Vec<&str> = datetime
				.iter()
				.chain(target.iter())
				.chain(prediction.iter().flatten())
				.map(|name| name.as_str())
				.collect();
			let features = |is_feature: fn(&ColumnType) -> bool| -> Vec<String> {
				reference
					.columns
					.iter()
					.filter(|column| !utility_columns.contains(&column.name()))
					.filter(|column| is_feature(&column.column_type()))
					.map(|column| column.name().to_owned())
					.collect()
			};
			ResolvedColumns {
				numerical_features: features(|column_type| column_type.is_numeric()),
				categorical_features: features(|column_type| column_type.is_categorical()),
				datetime,
				id: None,
				target,
				prediction,
				target_names: None,
			}
		}
	}
}

#[cfg(test)]
fn reference() -> DataFrame {
	use crate::test::{number_column, text_column};
	DataFrame {
		columns: vec![
			text_column("datetime", &["2021-01-01", "2021-01-02"]),
			number_column("age", &[31.0, 45.0]),
			text_column("city", &["Oslo", "Lima"]),
			number_column("target", &[0.0, 1.0]),
			number_column("prediction", &[0.0, 1.0]),
			number_column("income", &[1200.0, 3400.0]),
		],
	}
}

#[test]
fn test_resolve_by_name() {
	let columns = resolve_columns(&reference(), None);
	insta::assert_debug_snapshot!(columns, @r###"
 ResolvedColumns {
     datetime: Some(
         "datetime",
     ),
     id: None,
     target: Some(
         "target",
     ),
     prediction: Some(
         [
             "prediction",
         ],
     ),
     numerical_features: [
         "age",
         "income",
     ],
     categorical_features: [
         "city",
     ],
     target_names: None,
 }
 "###);
	let empty = resolve_columns(&DataFrame { columns: vec![] }, None);
	assert_eq!(empty.target, None);
	assert_eq!(empty.prediction, None);
}

#[test]
fn test_resolve_with_mapping() {
	use crate::test::strings;
	let mapping = ColumnMapping {
		target: Some("city".to_owned()),
		prediction: Some(Prediction::Scores(strings(&["a", "b", "c"]))),
		numerical_features: Some(strings(&["income", "city", "missing"])),
		categorical_features: Some(strings(&["city", "age"])),
		..Default::default()
	};
	let columns = resolve_columns(&reference(), Some(&mapping));
	assert_eq!(columns.target.as_deref(), Some("city"));
	assert_eq!(columns.datetime, None);
	assert_eq!(columns.prediction, Some(strings(&["a", "b", "c"])));
	assert_eq!(columns.numerical_features, strings(&["income"]));
	assert_eq!(columns.categorical_features, strings(&["age"]));
	assert_eq!(columns.prediction_labels(), Some(strings(&["a", "b", "c"])));
	let mapping = ColumnMapping {
		target_names: Some(strings(&["setosa", "versicolor", "virginica"])),
		..mapping
	};
	let columns = resolve_columns(&reference(), Some(&mapping));
	assert_eq!(
		columns.prediction_labels(),
		Some(strings(&["setosa", "versicolor", "virginica"]))
	);
}

#[test]
fn test_deserialize_mapping() {
	let mapping: ColumnMapping = serde_yaml::from_str(
		"
target: species
prediction: [setosa, versicolor, virginica]
numerical_features: [sepal_length]
",
	)
	.unwrap();
	assert_eq!(
		mapping.prediction,
		Some(Prediction::Scores(vec![
			"setosa".to_owned(),
			"versicolor".to_owned(),
			"virginica".to_owned()
		]))
	);
	assert_eq!(mapping.target.as_deref(), Some("species"));
	assert_eq!(mapping.categorical_features, None);
	let mapping: ColumnMapping =
		serde_json::from_str(r#"{ "target": "label", "prediction": "predicted" }"#).unwrap();
	assert_eq!(
		mapping.prediction,
		Some(Prediction::Column("predicted".to_owned()))
	);
	assert_eq!(
		mapping.prediction.unwrap().columns(),
		vec!["predicted".to_owned()]
	);
}

#[test]
fn test_from_path() {
	let dir = tempfile::TempDir::new().unwrap();
	let yaml_path = dir.path().join("mapping.yaml");
	std::fs::write(&yaml_path, "target: species\nprediction: [setosa, virginica]\n").unwrap();
	let mapping = ColumnMapping::from_path(&yaml_path).unwrap();
	assert_eq!(mapping.target.as_deref(), Some("species"));
	assert_eq!(
		mapping.prediction,
		Some(Prediction::Scores(vec![
			"setosa".to_owned(),
			"virginica".to_owned()
		]))
	);
	let json_path = dir.path().join("mapping.json");
	std::fs::write(&json_path, r#"{ "target": "label", "id": "row" }"#).unwrap();
	let mapping = ColumnMapping::from_path(&json_path).unwrap();
	assert_eq!(mapping.target.as_deref(), Some("label"));
	assert_eq!(mapping.id.as_deref(), Some("row"));
	// Yaml written to a .json file is parsed as json.
	let wrong_extension = dir.path().join("yaml.json");
	std::fs::write(&wrong_extension, "target: species\n").unwrap();
	assert!(matches!(
		ColumnMapping::from_path(&wrong_extension),
		Err(ColumnMappingError::Json(_))
	));
	assert!(matches!(
		ColumnMapping::from_path(&dir.path().join("missing.yaml")),
		Err(ColumnMappingError::Io(_))
	));
}
