/*!
This crate provides a basic implementation of dataframes, which are two dimensional arrays of data where each column can have a different data type, like a spreadsheet. It only implements what lookout needs to compare reference and production data: typed columns, loading from csv, and removing rows with missing values.
*/

use itertools::izip;
use ndarray::prelude::*;
use std::num::NonZeroUsize;

pub mod load;

pub use self::load::*;

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
	pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
	Unknown(UnknownColumn),
	Number(NumberColumn),
	Enum(EnumColumn),
	Text(TextColumn),
}

/// A column in which no value could be parsed. Every value in an unknown column is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownColumn {
	pub name: String,
	pub len: usize,
}

/// A column of numbers. Missing values are stored as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumn {
	pub name: String,
	pub data: Vec<f32>,
}

/// A column whose values are drawn from a small set of options. Values are 1-indexed into `options` and missing values are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumColumn {
	pub name: String,
	pub options: Vec<String>,
	pub data: Vec<Option<NonZeroUsize>>,
}

/// A column of free text. Missing values are stored as empty strings.
#[derive(Debug, Clone, PartialEq)]
pub struct TextColumn {
	pub name: String,
	pub data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
	Unknown,
	Number,
	Enum { options: Vec<String> },
	Text,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value<'a> {
	Unknown,
	Number(f32),
	Enum(Option<NonZeroUsize>),
	Text(&'a str),
}

impl DataFrame {
	pub fn new(column_names: Vec<String>, column_types: Vec<ColumnType>) -> Self {
		let columns = column_names
			.into_iter()
			.zip(column_types.into_iter())
			.map(|(column_name, column_type)| match column_type {
				ColumnType::Unknown => Column::Unknown(UnknownColumn::new(column_name)),
				ColumnType::Number => Column::Number(NumberColumn::new(column_name)),
				ColumnType::Enum { options } => Column::Enum(EnumColumn::new(column_name, options)),
				ColumnType::Text => Column::Text(TextColumn::new(column_name)),
			})
			.collect();
		Self { columns }
	}

	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|column| column.name() == name)
	}

	pub fn has_column(&self, name: &str) -> bool {
		self.column(name).is_some()
	}

	pub fn column_names(&self) -> impl Iterator<Item = &str> {
		self.columns.iter().map(|column| column.name())
	}

	/// Return a copy of this dataframe without the rows that have a missing or non-finite value in any column.
	pub fn drop_missing_rows(&self) -> DataFrame {
		let nrows = self.nrows();
		let mut keep = vec![true; nrows];
		for column in self.columns.iter() {
			for (index, keep) in keep.iter_mut().enumerate() {
				if *keep && column.is_missing(index) {
					*keep = false;
				}
			}
		}
		let columns = self
			.columns
			.iter()
			.map(|column| column.filter_rows(&keep))
			.collect();
		DataFrame { columns }
	}

	/// Gather the named number columns into a matrix with shape (n_rows, n_columns). Returns `None` if any column is absent or not a number column.
	pub fn to_rows_f32(&self, column_names: &[String]) -> Option<Array2<f32>> {
		let mut rows = Array2::zeros((self.nrows(), column_names.len()));
		for (mut ndarray_column, column_name) in izip!(rows.axis_iter_mut(Axis(1)), column_names) {
			let column = self.column(column_name)?.as_number()?;
			for (a, b) in izip!(ndarray_column.iter_mut(), column.data.iter()) {
				*a = *b;
			}
		}
		Some(rows)
	}
}

impl Column {
	pub fn len(&self) -> usize {
		match self {
			Self::Unknown(s) => s.len,
			Self::Number(s) => s.data.len(),
			Self::Enum(s) => s.data.len(),
			Self::Text(s) => s.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Unknown(s) => s.name.as_str(),
			Self::Number(s) => s.name.as_str(),
			Self::Enum(s) => s.name.as_str(),
			Self::Text(s) => s.name.as_str(),
		}
	}

	pub fn column_type(&self) -> ColumnType {
		match self {
			Self::Unknown(_) => ColumnType::Unknown,
			Self::Number(_) => ColumnType::Number,
			Self::Enum(column) => ColumnType::Enum {
				options: column.options.clone(),
			},
			Self::Text(_) => ColumnType::Text,
		}
	}

	pub fn as_number(&self) -> Option<&NumberColumn> {
		match self {
			Self::Number(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<&EnumColumn> {
		match self {
			Self::Enum(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_text(&self) -> Option<&TextColumn> {
		match self {
			Self::Text(s) => Some(s),
			_ => None,
		}
	}

	pub fn get(&self, index: usize) -> Value {
		match self {
			Self::Unknown(_) => Value::Unknown,
			Self::Number(column) => Value::Number(column.data[index]),
			Self::Enum(column) => Value::Enum(column.data[index]),
			Self::Text(column) => Value::Text(&column.data[index]),
		}
	}

	pub fn is_missing(&self, index: usize) -> bool {
		match self.get(index) {
			Value::Unknown => true,
			Value::Number(value) => !value.is_finite(),
			Value::Enum(value) => value.is_none(),
			Value::Text(value) => value.is_empty(),
		}
	}

	/// Render the value at `index` as a class label, or `None` if it is missing.
	pub fn label(&self, index: usize) -> Option<String> {
		match self {
			Self::Unknown(_) => None,
			Self::Number(column) => {
				let value = column.data[index];
				if value.is_finite() {
					Some(value.to_string())
				} else {
					None
				}
			}
			Self::Enum(column) => column.data[index].map(|value| column.options[value.get() - 1].clone()),
			Self::Text(column) => {
				let value = &column.data[index];
				if value.is_empty() {
					None
				} else {
					Some(value.clone())
				}
			}
		}
	}

	/// Render every value in this column as a class label. Returns `None` if any value is missing.
	pub fn labels(&self) -> Option<Vec<String>> {
		(0..self.len()).map(|index| self.label(index)).collect()
	}

	fn filter_rows(&self, keep: &[bool]) -> Column {
		fn filter<T: Clone>(data: &[T], keep: &[bool]) -> Vec<T> {
			izip!(data, keep)
				.filter(|(_, keep)| **keep)
				.map(|(value, _)| value.clone())
				.collect()
		}
		match self {
			Self::Unknown(column) => Self::Unknown(UnknownColumn {
				name: column.name.clone(),
				len: keep.iter().filter(|keep| **keep).count(),
			}),
			Self::Number(column) => Self::Number(NumberColumn {
				name: column.name.clone(),
				data: filter(&column.data, keep),
			}),
			Self::Enum(column) => Self::Enum(EnumColumn {
				name: column.name.clone(),
				options: column.options.clone(),
				data: filter(&column.data, keep),
			}),
			Self::Text(column) => Self::Text(TextColumn {
				name: column.name.clone(),
				data: filter(&column.data, keep),
			}),
		}
	}
}

impl ColumnType {
	/// Number columns are numeric. This is the only type that qualifies a column as a numerical feature.
	pub fn is_numeric(&self) -> bool {
		matches!(self, ColumnType::Number)
	}

	/// Enum and text columns hold arbitrary objects and qualify as categorical features.
	pub fn is_categorical(&self) -> bool {
		matches!(self, ColumnType::Enum { .. } | ColumnType::Text)
	}
}

impl UnknownColumn {
	pub fn new(name: String) -> Self {
		Self { name, len: 0 }
	}
}

impl NumberColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}
}

impl EnumColumn {
	pub fn new(name: String, options: Vec<String>) -> Self {
		Self {
			name,
			options,
			data: Vec::new(),
		}
	}
}

impl TextColumn {
	pub fn new(name: String) -> Self {
		Self {
			name,
			data: Vec::new(),
		}
	}
}

#[test]
fn test_drop_missing_rows() {
	let df = DataFrame {
		columns: vec![
			Column::Number(NumberColumn {
				name: "feature".to_owned(),
				data: vec![1.0, std::f32::INFINITY, 3.0, 4.0, std::f32::NEG_INFINITY],
			}),
			Column::Text(TextColumn {
				name: "target".to_owned(),
				data: vec![
					"a".to_owned(),
					"b".to_owned(),
					"".to_owned(),
					"a".to_owned(),
					"b".to_owned(),
				],
			}),
			Column::Enum(EnumColumn {
				name: "color".to_owned(),
				options: vec!["red".to_owned(), "blue".to_owned()],
				data: vec![
					NonZeroUsize::new(1),
					NonZeroUsize::new(2),
					NonZeroUsize::new(1),
					NonZeroUsize::new(2),
					None,
				],
			}),
		],
	};
	assert_eq!(df.nrows(), 5);
	let cleaned = df.drop_missing_rows();
	assert_eq!(cleaned.nrows(), 2);
	assert_eq!(
		cleaned.column("feature").unwrap().as_number().unwrap().data,
		vec![1.0, 4.0]
	);
	assert_eq!(
		cleaned.column("target").unwrap().labels().unwrap(),
		vec!["a".to_owned(), "a".to_owned()]
	);
	assert_eq!(
		cleaned.column("color").unwrap().labels().unwrap(),
		vec!["red".to_owned(), "blue".to_owned()]
	);
}

#[test]
fn test_unknown_column_drops_every_row() {
	let df = DataFrame {
		columns: vec![
			Column::Number(NumberColumn {
				name: "a".to_owned(),
				data: vec![1.0, 2.0],
			}),
			Column::Unknown(UnknownColumn {
				name: "b".to_owned(),
				len: 2,
			}),
		],
	};
	let cleaned = df.drop_missing_rows();
	assert_eq!(cleaned.nrows(), 0);
	assert_eq!(cleaned.ncols(), 2);
}

#[test]
fn test_labels() {
	let column = Column::Number(NumberColumn {
		name: "target".to_owned(),
		data: vec![1.0, 0.0, 2.5, std::f32::NAN],
	});
	assert_eq!(column.label(0), Some("1".to_owned()));
	assert_eq!(column.label(1), Some("0".to_owned()));
	assert_eq!(column.label(2), Some("2.5".to_owned()));
	assert_eq!(column.label(3), None);
	assert_eq!(column.labels(), None);
}

#[test]
fn test_to_rows_f32() {
	let df = DataFrame {
		columns: vec![
			Column::Number(NumberColumn {
				name: "a".to_owned(),
				data: vec![0.1, 0.7],
			}),
			Column::Text(TextColumn {
				name: "label".to_owned(),
				data: vec!["x".to_owned(), "y".to_owned()],
			}),
			Column::Number(NumberColumn {
				name: "b".to_owned(),
				data: vec![0.9, 0.3],
			}),
		],
	};
	let rows = df
		.to_rows_f32(&["b".to_owned(), "a".to_owned()])
		.unwrap();
	let expected: Array2<f32> = arr2(&[[0.9, 0.1], [0.3, 0.7]]);
	assert_eq!(rows, expected);
	assert!(df.to_rows_f32(&["label".to_owned()]).is_none());
	assert!(df.to_rows_f32(&["missing".to_owned()]).is_none());
}

#[test]
fn test_column_type_classification() {
	assert!(ColumnType::Number.is_numeric());
	assert!(!ColumnType::Number.is_categorical());
	assert!(ColumnType::Text.is_categorical());
	assert!(ColumnType::Enum { options: vec![] }.is_categorical());
	assert!(!ColumnType::Unknown.is_numeric());
	assert!(!ColumnType::Unknown.is_categorical());
}
