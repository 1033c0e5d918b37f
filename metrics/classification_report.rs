use super::StreamingMetric;
use fnv::FnvHashMap;
use ndarray::prelude::*;

/// `ClassificationReport` computes precision, recall and f1 score for each class from a confusion matrix of string labels.
pub struct ClassificationReport {
	classes: Vec<String>,
	class_indexes: FnvHashMap<String, usize>,
	/// The shape of the confusion matrix is (n_classes x n_classes).
	confusion_matrix: Array2<u64>,
}

pub struct ClassificationReportInput<'a> {
	/// The true label of each example.
	pub labels: &'a [String],
	/// The predicted label of each example.
	pub predictions: &'a [String],
}

#[derive(Debug, Clone)]
pub struct ClassificationReportOutput {
	pub class_metrics: Vec<ClassMetrics>,
}

#[derive(Debug, Clone)]
pub struct ClassMetrics {
	pub class_name: String,
	pub true_positives: u64,
	pub false_positives: u64,
	pub true_negatives: u64,
	pub false_negatives: u64,
	pub precision: f32,
	pub recall: f32,
	pub f1_score: f32,
	/// The number of examples whose true label is this class.
	pub support: u64,
}

impl ClassificationReport {
	pub fn new(classes: Vec<String>) -> Self {
		let n_classes = classes.len();
		let class_indexes = classes
			.iter()
			.enumerate()
			.map(|(index, class)| (class.clone(), index))
			.collect();
		//                                           prediction    label
		//                                               |           |
		//                                               v           v
		let confusion_matrix = <Array2<u64>>::zeros((n_classes, n_classes));
		Self {
			classes,
			class_indexes,
			confusion_matrix,
		}
	}

	pub fn classes(&self) -> &[String] {
		&self.classes
	}
}

impl<'a> StreamingMetric<'a> for ClassificationReport {
	type Input = ClassificationReportInput<'a>;
	type Output = Option<ClassificationReportOutput>;

	/// Examples whose label or prediction is not one of the report's classes are skipped.
	fn update(&mut self, input: ClassificationReportInput) {
		for (label, prediction) in input.labels.iter().zip(input.predictions.iter()) {
			let label_index = match self.class_indexes.get(label) {
				Some(index) => *index,
				None => continue,
			};
			let prediction_index = match self.class_indexes.get(prediction) {
				Some(index) => *index,
				None => continue,
			};
			self.confusion_matrix[(prediction_index, label_index)] += 1;
		}
	}

	fn merge(&mut self, other: Self) {
		self.confusion_matrix += &other.confusion_matrix;
	}

	fn finalize(self) -> Self::Output {
		let n_examples = self.confusion_matrix.sum();
		if n_examples == 0 {
			return None;
		}
		let confusion_matrix = self.confusion_matrix;
		let n_examples_per_class = confusion_matrix.sum_axis(Axis(0));
		let class_metrics = self
			.classes
			.into_iter()
			.enumerate()
			.map(|(class_index, class_name)| {
				let true_positives = confusion_matrix[(class_index, class_index)];
				let false_positives = confusion_matrix.row(class_index).sum() - true_positives;
				let false_negatives = confusion_matrix.column(class_index).sum() - true_positives;
				let true_negatives =
					n_examples - true_positives - false_positives - false_negatives;
				let precision = divide(true_positives, true_positives + false_positives);
				let recall = divide(true_positives, true_positives + false_negatives);
				let f1_score = if precision + recall > 0.0 {
					2.0 * (precision * recall) / (precision + recall)
				} else {
					0.0
				};
				ClassMetrics {
					class_name,
					true_positives,
					false_positives,
					true_negatives,
					false_negatives,
					precision,
					recall,
					f1_score,
					support: n_examples_per_class[class_index],
				}
			})
			.collect();
		Some(ClassificationReportOutput { class_metrics })
	}
}

impl ClassificationReportOutput {
	pub fn class(&self, class_name: &str) -> Option<&ClassMetrics> {
		self.class_metrics
			.iter()
			.find(|class| class.class_name == class_name)
	}
}

/// Divide two counts, returning 0 when the denominator is 0.
fn divide(numerator: u64, denominator: u64) -> f32 {
	if denominator == 0 {
		0.0
	} else {
		numerator as f32 / denominator as f32
	}
}

#[cfg(test)]
fn strings(values: &[&str]) -> Vec<String> {
	values.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
fn assert_close(left: f32, right: f32) {
	assert!(
		(left - right).abs() < 1e-6,
		"{} is not close to {}",
		left,
		right
	);
}

#[test]
fn test_binary() {
	let mut report = ClassificationReport::new(strings(&["Cat", "Dog"]));
	let labels = strings(&[
		"Cat", "Cat", "Cat", "Cat", "Cat", "Cat", "Cat", "Cat", "Dog", "Dog", "Dog", "Dog", "Dog",
	]);
	let predictions = strings(&[
		"Cat", // correct
		"Cat", // correct
		"Cat", // correct
		"Cat", // correct
		"Cat", // correct
		"Dog", // incorrect
		"Dog", // incorrect
		"Dog", // incorrect
		"Dog", // correct
		"Dog", // correct
		"Dog", // correct
		"Cat", // incorrect
		"Cat", // incorrect
	]);
	report.update(ClassificationReportInput {
		labels: &labels,
		predictions: &predictions,
	});
	let report = report.finalize().unwrap();
	let cat = report.class("Cat").unwrap();
	assert_eq!(
		(
			cat.true_positives,
			cat.false_positives,
			cat.true_negatives,
			cat.false_negatives,
			cat.support
		),
		(5, 2, 3, 3, 8)
	);
	assert_close(cat.precision, 5.0 / 7.0);
	assert_close(cat.recall, 0.625);
	assert_close(cat.f1_score, 2.0 / 3.0);
	let dog = report.class("Dog").unwrap();
	assert_eq!(dog.support, 5);
	assert_close(dog.precision, 0.5);
	assert_close(dog.recall, 0.6);
	assert_close(dog.f1_score, 6.0 / 11.0);
	assert_eq!(report.class_metrics.len(), 2);
}

#[test]
fn test_multiclass() {
	// example taken from https://en.wikipedia.org/wiki/Confusion_matrix
	let mut report = ClassificationReport::new(strings(&["Cat", "Dog", "Rabbit"]));
	let mut labels = Vec::new();
	let mut predictions = Vec::new();
	let mut push = |label: &str, prediction: &str, count: usize| {
		for _ in 0..count {
			labels.push(label.to_owned());
			predictions.push(prediction.to_owned());
		}
	};
	push("Cat", "Cat", 5);
	push("Cat", "Dog", 3);
	push("Dog", "Cat", 2);
	push("Dog", "Dog", 3);
	push("Dog", "Rabbit", 1);
	push("Rabbit", "Dog", 2);
	push("Rabbit", "Rabbit", 11);
	report.update(ClassificationReportInput {
		labels: &labels,
		predictions: &predictions,
	});
	let report = report.finalize().unwrap();
	let cat = report.class("Cat").unwrap();
	assert_close(cat.precision, 5.0 / 7.0);
	assert_close(cat.recall, 0.625);
	let dog = report.class("Dog").unwrap();
	assert_close(dog.precision, 0.375);
	assert_close(dog.recall, 0.5);
	assert_close(dog.f1_score, 3.0 / 7.0);
	let rabbit = report.class("Rabbit").unwrap();
	assert_close(rabbit.precision, 11.0 / 12.0);
	assert_close(rabbit.recall, 11.0 / 13.0);
	assert_close(rabbit.f1_score, 0.88);
	assert_eq!(rabbit.support, 13);
}

#[test]
fn test_zero_division() {
	let mut report = ClassificationReport::new(strings(&["a", "b", "c"]));
	report.update(ClassificationReportInput {
		labels: &strings(&["a", "a", "b"]),
		predictions: &strings(&["a", "a", "a"]),
	});
	let report = report.finalize().unwrap();
	let b = report.class("b").unwrap();
	assert_eq!((b.precision, b.recall, b.f1_score), (0.0, 0.0, 0.0));
	let c = report.class("c").unwrap();
	assert_eq!((c.precision, c.recall, c.f1_score, c.support), (0.0, 0.0, 0.0, 0));
}

#[test]
fn test_merge_and_unknown_classes() {
	let mut a = ClassificationReport::new(strings(&["x", "y"]));
	a.update(ClassificationReportInput {
		labels: &strings(&["x", "z"]),
		predictions: &strings(&["x", "x"]),
	});
	let mut b = ClassificationReport::new(strings(&["x", "y"]));
	b.update(ClassificationReportInput {
		labels: &strings(&["y"]),
		predictions: &strings(&["y"]),
	});
	a.merge(b);
	let report = a.finalize().unwrap();
	let x = report.class("x").unwrap();
	let y = report.class("y").unwrap();
	assert_eq!((x.true_positives, x.support), (1, 1));
	assert_eq!((y.true_positives, y.support), (1, 1));
	assert_close(x.precision, 1.0);
	assert_close(y.recall, 1.0);
	let empty = ClassificationReport::new(strings(&["x"]));
	assert!(empty.finalize().is_none());
}
