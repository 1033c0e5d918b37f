use super::Metric;
use ndarray::prelude::*;
use std::cmp::Ordering;

/// This function computes the area under the receiver operating characteristic curve using the trapezoid method. Returns `None` if the labels contain no positives or no negatives, because the curve is undefined.
pub fn auc_roc(probabilities: &[f32], labels: &[bool]) -> Option<f32> {
	let roc_curve = compute_roc_curve(probabilities, labels)?;
	// compute the riemann sum of the roc curve
	let auc = roc_curve
		.windows(2)
		.map(|points| {
			let left = &points[0];
			let right = &points[1];
			let y_average = (left.true_positive_rate + right.true_positive_rate) / 2.0;
			let dx = right.false_positive_rate - left.false_positive_rate;
			y_average * dx
		})
		.sum();
	Some(auc)
}

#[derive(Debug, PartialEq)]
pub struct ROCCurvePoint {
	/// The classification threshold.
	pub threshold: f32,
	/// The true positive rate for all predictions with probability >= threshold.
	pub true_positive_rate: f32,
	/// The false positive rate for all predictions with probability >= threshold.
	pub false_positive_rate: f32,
}

/// This function computes the ROC curve. The ROC curve plots the false positive rate on the x axis and the true positive rate on the y axis for various classification thresholds.
pub fn compute_roc_curve(probabilities: &[f32], labels: &[bool]) -> Option<Vec<ROCCurvePoint>> {
	let count_positives = labels.iter().filter(|label| **label).count();
	let count_negatives = labels.len() - count_positives;
	if count_positives == 0 || count_negatives == 0 {
		return None;
	}
	let mut tps_fps = compute_tps_fps_by_threshold(probabilities, labels);
	for i in 1..tps_fps.len() {
		tps_fps[i].true_positives += tps_fps[i - 1].true_positives;
		tps_fps[i].false_positives += tps_fps[i - 1].false_positives;
	}
	// add a point at (0,0) on the roc curve with a dummy threshold of 1.0
	let mut roc_curve = vec![ROCCurvePoint {
		threshold: 1.0,
		true_positive_rate: 0.0,
		false_positive_rate: 0.0,
	}];
	roc_curve.extend(tps_fps.iter().map(|point| ROCCurvePoint {
		threshold: point.threshold,
		true_positive_rate: point.true_positives as f32 / count_positives as f32,
		false_positive_rate: point.false_positives as f32 / count_negatives as f32,
	}));
	Some(roc_curve)
}

#[derive(Debug)]
struct TpsFpsPoint {
	/// The classification threshold.
	threshold: f32,
	/// The true positives for this threshold.
	true_positives: usize,
	/// The false positives for this threshold.
	false_positives: usize,
}

/**
This function computes the counts of true positives and false positives at each classification threshold. Unlike the roc curve, each point contains just the count of true positives and false positives at this threshold instead of all values greater than or equal to this threshold.
*/
fn compute_tps_fps_by_threshold(probabilities: &[f32], labels: &[bool]) -> Vec<TpsFpsPoint> {
	let mut probabilities_labels: Vec<(f32, bool)> = probabilities
		.iter()
		.cloned()
		.zip(labels.iter().cloned())
		.collect();
	probabilities_labels.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
	let mut tps_fps: Vec<TpsFpsPoint> = Vec::new();
	for (probability, label) in probabilities_labels {
		let tp = if label { 1 } else { 0 };
		match tps_fps.last_mut() {
			// if probability is same as the last one, add to the previous bucket
			Some(last) if last.threshold == probability => {
				last.true_positives += tp;
				last.false_positives += 1 - tp;
			}
			_ => tps_fps.push(TpsFpsPoint {
				threshold: probability,
				true_positives: tp,
				false_positives: 1 - tp,
			}),
		}
	}
	tps_fps
}

/// `OneVsRestAucRoc` computes the unweighted area under the roc curve of each class against all the others.
pub struct OneVsRestAucRoc;

pub struct OneVsRestAucRocInput<'a> {
	/// (n_examples, n_classes)
	pub probabilities: ArrayView2<'a, f32>,
	/// (n_examples, n_classes), 1 where the example belongs to the class, 0 otherwise.
	pub labels: ArrayView2<'a, u8>,
}

impl<'a> Metric<'a> for OneVsRestAucRoc {
	type Input = OneVsRestAucRocInput<'a>;
	/// One value per class. The value is `None` for a class that has no positive or no negative examples.
	type Output = Vec<Option<f32>>;

	fn compute(input: Self::Input) -> Self::Output {
		input
			.probabilities
			.axis_iter(Axis(1))
			.zip(input.labels.axis_iter(Axis(1)))
			.map(|(probabilities, labels)| {
				let probabilities: Vec<f32> = probabilities.iter().cloned().collect();
				let labels: Vec<bool> = labels.iter().map(|label| *label == 1).collect();
				auc_roc(&probabilities, &labels)
			})
			.collect()
	}
}

#[test]
fn test_roc_curve() {
	let labels = vec![true, true, false, false];
	let probabilities = vec![0.9, 0.4, 0.4, 0.2];
	let left = compute_roc_curve(probabilities.as_slice(), labels.as_slice()).unwrap();
	let right = vec![
		ROCCurvePoint {
			threshold: 1.0,
			true_positive_rate: 0.0,
			false_positive_rate: 0.0,
		},
		ROCCurvePoint {
			threshold: 0.9,
			true_positive_rate: 0.5,
			false_positive_rate: 0.0,
		},
		ROCCurvePoint {
			threshold: 0.4,
			true_positive_rate: 1.0,
			false_positive_rate: 0.5,
		},
		ROCCurvePoint {
			threshold: 0.2,
			true_positive_rate: 1.0,
			false_positive_rate: 1.0,
		},
	];
	assert_eq!(left, right);
	let auc = auc_roc(probabilities.as_slice(), labels.as_slice()).unwrap();
	assert!(f32::abs(auc - 0.875) < f32::EPSILON)
}

#[test]
fn test_auc_roc_undefined() {
	assert_eq!(auc_roc(&[0.1, 0.9], &[true, true]), None);
	assert_eq!(auc_roc(&[0.1, 0.9], &[false, false]), None);
}

#[test]
fn test_one_vs_rest() {
	let probabilities = arr2(&[
		[0.8, 0.1, 0.1],
		[0.2, 0.7, 0.1],
		[0.1, 0.2, 0.7],
		[0.3, 0.3, 0.4],
	]);
	let labels = arr2(&[[1, 0, 0], [0, 1, 0], [0, 0, 1], [1, 0, 0]]);
	let aucs = OneVsRestAucRoc::compute(OneVsRestAucRocInput {
		probabilities: probabilities.view(),
		labels: labels.view(),
	});
	assert_eq!(aucs.len(), 3);
	// class 0: positives score 0.8 and 0.3, negatives 0.2 and 0.1, perfectly separated
	assert_eq!(aucs[0], Some(1.0));
	// class 1: the single positive 0.7 outranks every negative
	assert_eq!(aucs[1], Some(1.0));
	// class 2: the positive 0.7 outranks 0.1, 0.1 and 0.4
	assert_eq!(aucs[2], Some(1.0));
	let labels = arr2(&[[1, 0, 0], [0, 1, 0], [0, 1, 0], [1, 0, 0]]);
	let aucs = OneVsRestAucRoc::compute(OneVsRestAucRocInput {
		probabilities: probabilities.view(),
		labels: labels.view(),
	});
	assert_eq!(aucs[2], None);
	// class 1: positives 0.7 and 0.2, negatives 0.1 and 0.3
	assert_eq!(aucs[1], Some(0.75));
}
