/*!
This crate defines the [`Metric`](trait.Metric.html) and [`StreamingMetric`](trait.StreamingMetric.html) traits and the classification metrics lookout reports on: a per class [`ClassificationReport`](struct.ClassificationReport.html), one-vs-rest [`OneVsRestAucRoc`](struct.OneVsRestAucRoc.html), and the [`LabelBinarizer`](struct.LabelBinarizer.html) that aligns string labels with probability columns.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod auc_roc;
mod classification_report;
mod label_binarizer;

pub use self::auc_roc::{
	auc_roc, compute_roc_curve, OneVsRestAucRoc, OneVsRestAucRocInput, ROCCurvePoint,
};
pub use self::classification_report::{
	ClassMetrics, ClassificationReport, ClassificationReportInput, ClassificationReportOutput,
};
pub use self::label_binarizer::{sorted_distinct_labels, LabelBinarizer, NotBinarizableError};

/**
The `Metric` trait defines a common interface to metrics that can be computed when the entire input is available at once.

The seemingly unused generic lifetime `'a` exists here to allow `Input`s and `Output`s to borrow from their enclosing scope.
*/
pub trait Metric<'a> {
	type Input;
	type Output;
	fn compute(input: Self::Input) -> Self::Output;
}

/**
The `StreamingMetric` trait defines a common interface to metrics that can be computed in a streaming manner, where the input is available in chunks.

After being initialized, a value of type `T` implementing the `StreamingMetric` trait can have `update()` called on it with values of the associated type `Input`. Multiple values of `T` can be merged together by calling `merge()`. When finished aggregating, call `finalize()` on the metric to produce the associated type `Output`.

# Examples

Here is a basic example implementation of a `Min` metric, which takes `f32`s as input and produces an `f32` as output that is the minimum of all the inputs.

```
use lookout_metrics::StreamingMetric;

struct Min(f32);

impl StreamingMetric<'_> for Min {
	type Input = f32;
	type Output = f32;
	fn update(&mut self, input: Self::Input) {
		self.0 = self.0.min(input)
	}
	fn merge(&mut self, other: Self) { self.0 = self.0.min(other.0) }
	fn finalize(self) -> Self::Output { self.0 }
}
```
*/
pub trait StreamingMetric<'a> {
	/// `Input` is the type to aggregate in calls to `update()`.
	type Input;
	/// `Output` is the return type of `finalize()`.
	type Output;
	/// Update this streaming metric with the `Input` `input`.
	fn update(&mut self, input: Self::Input);
	/// Merge multiple independently computed streaming metrics.
	fn merge(&mut self, other: Self);
	/// When you are done aggregating `Input`s, call `finalize()` to produce an `Output`.
	fn finalize(self) -> Self::Output;
}
