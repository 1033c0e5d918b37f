use fnv::FnvHashMap;
use itertools::Itertools;
use ndarray::prelude::*;
use std::cmp::Ordering;
use thiserror::Error;

/**
A `LabelBinarizer` learns the set of classes from a column of labels and encodes labels one-vs-rest: each label becomes a row with a 1 in the column of its class and 0 everywhere else.

Classes are ordered as [`sorted_distinct_labels`](fn.sorted_distinct_labels.html) orders them.
*/
#[derive(Debug, Clone)]
pub struct LabelBinarizer {
	classes: Vec<String>,
	class_indexes: FnvHashMap<String, usize>,
}

#[derive(Debug, Error)]
#[error("a label binarizer needs at least one label to fit")]
pub struct NotBinarizableError;

impl LabelBinarizer {
	pub fn fit<'a>(labels: impl IntoIterator<Item = &'a str>) -> Result<Self, NotBinarizableError> {
		let classes = sorted_distinct_labels(labels);
		if classes.is_empty() {
			return Err(NotBinarizableError);
		}
		let class_indexes = classes
			.iter()
			.enumerate()
			.map(|(index, class)| (class.clone(), index))
			.collect();
		Ok(Self {
			classes,
			class_indexes,
		})
	}

	pub fn classes(&self) -> &[String] {
		&self.classes
	}

	pub fn n_classes(&self) -> usize {
		self.classes.len()
	}

	pub fn class_index(&self, label: &str) -> Option<usize> {
		self.class_indexes.get(label).cloned()
	}

	/// Encode `labels` as a matrix with shape (n_labels, n_classes). Labels that were not seen during `fit` encode as a row of zeros.
	pub fn transform<'a>(&self, labels: impl IntoIterator<Item = &'a str>) -> Array2<u8> {
		let labels: Vec<&str> = labels.into_iter().collect();
		let mut encoded = Array2::zeros((labels.len(), self.n_classes()));
		for (mut row, label) in encoded.axis_iter_mut(Axis(0)).zip(labels) {
			if let Some(index) = self.class_index(label) {
				row[index] = 1;
			}
		}
		encoded
	}
}

/// Deduplicate and sort class labels. Labels sort numerically when every one of them parses as a number and lexicographically otherwise.
pub fn sorted_distinct_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<String> {
	let labels: Vec<&str> = labels.into_iter().unique().collect();
	let numbers: Option<Vec<f64>> = labels.iter().map(|label| label.parse().ok()).collect();
	match numbers {
		Some(numbers) => numbers
			.into_iter()
			.zip(labels)
			.sorted_by(|(a, a_label), (b, b_label)| {
				a.partial_cmp(b)
					.unwrap_or(Ordering::Equal)
					.then_with(|| a_label.cmp(b_label))
			})
			.map(|(_, label)| label.to_owned())
			.collect(),
		None => labels.into_iter().sorted().map(|label| label.to_owned()).collect(),
	}
}

#[test]
fn test_sorted_distinct_labels() {
	assert_eq!(
		sorted_distinct_labels(vec!["b", "a", "c", "a"]),
		vec!["a", "b", "c"]
	);
	assert_eq!(
		sorted_distinct_labels(vec!["10", "2", "1", "2"]),
		vec!["1", "2", "10"]
	);
	assert_eq!(
		sorted_distinct_labels(vec!["10", "2", "x"]),
		vec!["10", "2", "x"]
	);
	assert!(sorted_distinct_labels(Vec::<&str>::new()).is_empty());
}

#[test]
fn test_label_binarizer() {
	let binarizer = LabelBinarizer::fit(vec!["dog", "cat", "bird", "cat"]).unwrap();
	insta::assert_debug_snapshot!(binarizer.classes(), @r###"
 [
     "bird",
     "cat",
     "dog",
 ]
 "###);
	assert_eq!(binarizer.class_index("cat"), Some(1));
	let encoded = binarizer.transform(vec!["cat", "dog", "fish", "bird"]);
	let expected: Array2<u8> = arr2(&[[0, 1, 0], [0, 0, 1], [0, 0, 0], [1, 0, 0]]);
	assert_eq!(encoded, expected);
	assert!(LabelBinarizer::fit(Vec::<&str>::new()).is_err());
}
