use super::*;
use anyhow::Result;
use fnv::FnvHashMap;
use std::{
	collections::{BTreeMap, BTreeSet},
	path::Path,
};

#[derive(Clone)]
pub struct FromCsvOptions<'a> {
	pub column_types: Option<BTreeMap<String, ColumnType>>,
	pub infer_options: InferOptions,
	pub invalid_values: &'a [&'a str],
}

impl<'a> Default for FromCsvOptions<'a> {
	fn default() -> Self {
		Self {
			column_types: None,
			infer_options: InferOptions::default(),
			invalid_values: DEFAULT_INVALID_VALUES,
		}
	}
}

#[derive(Clone, Debug)]
pub struct InferOptions {
	pub enum_max_unique_values: usize,
}

impl Default for InferOptions {
	fn default() -> Self {
		Self {
			enum_max_unique_values: 100,
		}
	}
}

/// These values are the default values that are considered invalid.
pub const DEFAULT_INVALID_VALUES: &[&str] = &[
	"", "null", "NULL", "n/a", "N/A", "nan", "-nan", "NaN", "-NaN", "?",
];

/// These values are numeric but not finite. They do not stop a column from being inferred as a number column, and they load as missing.
const INFINITE_VALUES: &[&str] = &[
	"inf", "-inf", "+inf", "Inf", "-Inf", "INF", "-INF", "infinity", "-infinity", "Infinity",
	"-Infinity",
];

impl DataFrame {
	pub fn from_path(path: &Path, options: FromCsvOptions) -> Result<Self> {
		Self::from_csv(&mut csv::Reader::from_path(path)?, options)
	}

	pub fn from_csv<R>(reader: &mut csv::Reader<R>, options: FromCsvOptions) -> Result<Self>
	where
		R: std::io::Read + std::io::Seek,
	{
		let column_names: Vec<String> = reader
			.headers()?
			.into_iter()
			.map(|column_name| column_name.to_owned())
			.collect();
		let start_position = reader.position().clone();
		let invalid_values = options.invalid_values;

		// Columns whose types were specified in the options skip inference.
		let mut infer_stats: Vec<Option<InferStats>> = column_names
			.iter()
			.map(|column_name| {
				let specified = options
					.column_types
					.as_ref()
					.map(|column_types| column_types.contains_key(column_name))
					.unwrap_or(false);
				if specified {
					None
				} else {
					Some(InferStats::new(&options.infer_options, invalid_values))
				}
			})
			.collect();

		// Passing over the csv to infer column types is only necessary if one or more columns did not have its type specified.
		let needs_infer = infer_stats.iter().any(|infer_stats| infer_stats.is_some());
		if needs_infer {
			let mut record = csv::StringRecord::new();
			while reader.read_record(&mut record)? {
				for (infer_stats, value) in infer_stats.iter_mut().zip(record.iter()) {
					if let Some(infer_stats) = infer_stats {
						infer_stats.update(value);
					}
				}
			}
			// After inference, return back to the beginning of the csv to load the values.
			reader.seek(start_position)?;
		}
		let column_types: Vec<ColumnType> = column_names
			.iter()
			.zip(infer_stats.into_iter())
			.map(|(column_name, infer_stats)| match infer_stats {
				Some(infer_stats) => infer_stats.finalize(),
				None => options
					.column_types
					.as_ref()
					.and_then(|column_types| column_types.get(column_name))
					.cloned()
					.unwrap_or(ColumnType::Unknown),
			})
			.collect();

		let mut dataframe = Self::new(column_names, column_types);
		let enum_option_indexes: Vec<Option<FnvHashMap<String, NonZeroUsize>>> = dataframe
			.columns
			.iter()
			.map(|column| {
				column.as_enum().map(|column| {
					column
						.options
						.iter()
						.enumerate()
						.filter_map(|(index, option)| {
							NonZeroUsize::new(index + 1).map(|value| (option.clone(), value))
						})
						.collect()
				})
			})
			.collect();
		// Read each csv record and insert the values into the columns of the dataframe.
		let mut record = csv::StringRecord::new();
		while reader.read_record(&mut record)? {
			for (column, enum_option_indexes, value) in izip!(
				dataframe.columns.iter_mut(),
				enum_option_indexes.iter(),
				record.iter()
			) {
				match column {
					Column::Unknown(column) => {
						column.len += 1;
					}
					Column::Number(column) => {
						let value = match lexical::parse::<f32, &str>(value) {
							Ok(value) if value.is_finite() => value,
							_ => std::f32::NAN,
						};
						column.data.push(value);
					}
					Column::Enum(column) => {
						let value = enum_option_indexes
							.as_ref()
							.and_then(|indexes| indexes.get(value))
							.cloned();
						column.data.push(value);
					}
					Column::Text(column) => {
						let value = if invalid_values.contains(&value) {
							String::new()
						} else {
							value.to_owned()
						};
						column.data.push(value);
					}
				}
			}
		}
		Ok(dataframe)
	}
}

#[derive(Clone, Debug)]
pub struct InferStats<'a> {
	infer_options: &'a InferOptions,
	invalid_values: &'a [&'a str],
	column_type: InferColumnType,
	unique_values: Option<BTreeSet<String>>,
}

#[derive(PartialEq, Clone, Copy, Debug)]
enum InferColumnType {
	Unknown,
	Number,
	Enum,
	Text,
}

impl<'a> InferStats<'a> {
	pub fn new(infer_options: &'a InferOptions, invalid_values: &'a [&'a str]) -> Self {
		Self {
			infer_options,
			invalid_values,
			column_type: InferColumnType::Unknown,
			unique_values: Some(BTreeSet::new()),
		}
	}

	pub fn update(&mut self, value: &str) {
		if self.invalid_values.contains(&value) {
			return;
		}
		if let Some(unique_values) = self.unique_values.as_mut() {
			if !unique_values.contains(value) {
				unique_values.insert(value.to_owned());
			}
			if unique_values.len() > self.infer_options.enum_max_unique_values {
				self.unique_values = None;
			}
		}
		match self.column_type {
			InferColumnType::Unknown | InferColumnType::Number => {
				let is_number = lexical::parse::<f32, &str>(value)
					.map(|v| v.is_finite())
					.unwrap_or(false) || INFINITE_VALUES.contains(&value);
				if is_number {
					self.column_type = InferColumnType::Number;
				} else if self.unique_values.is_some() {
					self.column_type = InferColumnType::Enum;
				} else {
					self.column_type = InferColumnType::Text;
				}
			}
			InferColumnType::Enum => {
				if self.unique_values.is_none() {
					self.column_type = InferColumnType::Text;
				}
			}
			InferColumnType::Text => {}
		}
	}

	pub fn finalize(self) -> ColumnType {
		match self.column_type {
			InferColumnType::Unknown => ColumnType::Unknown,
			InferColumnType::Number => ColumnType::Number,
			InferColumnType::Enum => ColumnType::Enum {
				options: self.unique_values.unwrap_or_default().into_iter().collect(),
			},
			InferColumnType::Text => ColumnType::Text,
		}
	}
}

#[test]
fn test_infer() {
	let csv = r#"number,enum,text
1,test,hello
2,test,world
"#;
	let df = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions {
			column_types: None,
			infer_options: InferOptions {
				enum_max_unique_values: 1,
			},
			..Default::default()
		},
	)
	.unwrap();
	insta::assert_debug_snapshot!(df, @r###"
 DataFrame {
     columns: [
         Number(
             NumberColumn {
                 name: "number",
                 data: [
                     1.0,
                     2.0,
                 ],
             },
         ),
         Enum(
             EnumColumn {
                 name: "enum",
                 options: [
                     "test",
                 ],
                 data: [
                     Some(
                         1,
                     ),
                     Some(
                         1,
                     ),
                 ],
             },
         ),
         Text(
             TextColumn {
                 name: "text",
                 data: [
                     "hello",
                     "world",
                 ],
             },
         ),
     ],
 }
 "###);
}

#[test]
fn test_column_types() {
	let csv = r#"number,text,enum
1,test,hello
2,test,world
"#;
	let mut column_types = BTreeMap::new();
	column_types.insert("text".to_owned(), ColumnType::Text);
	column_types.insert(
		"enum".to_owned(),
		ColumnType::Enum {
			options: vec!["hello".to_owned(), "world".to_owned()],
		},
	);
	let df = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions {
			column_types: Some(column_types),
			infer_options: InferOptions {
				enum_max_unique_values: 2,
			},
			..Default::default()
		},
	)
	.unwrap();
	assert_eq!(df.column("number").unwrap().column_type(), ColumnType::Number);
	assert_eq!(df.column("text").unwrap().column_type(), ColumnType::Text);
	assert_eq!(
		df.column("enum").unwrap().labels().unwrap(),
		vec!["hello".to_owned(), "world".to_owned()]
	);
}

#[test]
fn test_invalid_and_infinite_values() {
	let csv = "score,target,empty\n0.5,a,\ninf,b,\n,a,?\n0.25,,\n";
	let df = DataFrame::from_csv(
		&mut csv::Reader::from_reader(std::io::Cursor::new(csv)),
		FromCsvOptions::default(),
	)
	.unwrap();
	let score = df.column("score").unwrap().as_number().unwrap();
	assert_eq!(score.data[0], 0.5);
	assert!(score.data[1].is_nan());
	assert!(score.data[2].is_nan());
	assert_eq!(score.data[3], 0.25);
	assert_eq!(
		df.column("target").unwrap().column_type(),
		ColumnType::Enum {
			options: vec!["a".to_owned(), "b".to_owned()]
		}
	);
	assert_eq!(df.column("target").unwrap().label(3), None);
	assert_eq!(df.column("empty").unwrap().column_type(), ColumnType::Unknown);
	assert_eq!(df.nrows(), 4);
	assert_eq!(df.drop_missing_rows().nrows(), 0);
}
