use crate::image_classifier::interface::Label;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    NoResult,
    Labels(Vec<Label>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub prediction: Prediction,
    pub latency: Duration,
}

impl ClassificationResult {
    /// Keeps the first `limit` labels at or above `confidence_threshold`,
    /// in the order the engine produced them.
    pub fn new(labels: Vec<Label>, latency: Duration, confidence_threshold: f32, limit: usize) -> Self {
        let kept: Vec<Label> = labels
            .into_iter()
            .filter(|label| label.confidence >= confidence_threshold)
            .take(limit)
            .collect();

        let prediction = if kept.is_empty() {
            Prediction::NoResult
        } else {
            Prediction::Labels(kept)
        };

        Self {
            prediction,
            latency,
        }
    }

    pub fn latency_ms(&self) -> u128 {
        self.latency.as_millis()
    }

    pub fn labels(&self) -> &[Label] {
        match &self.prediction {
            Prediction::NoResult => &[],
            Prediction::Labels(labels) => labels,
        }
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Latency: {}ms", self.latency_ms())?;

        if self.labels().is_empty() {
            return write!(f, "No Result");
        }

        let lines: Vec<String> = self
            .labels()
            .iter()
            .map(|label| format!("Label: {}, Confidence: {:4.2}", label.text, label.confidence))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_labels_renders_no_result() {
        let result = ClassificationResult::new(vec![], Duration::from_millis(42), 0.6, 3);

        assert_eq!(result.prediction, Prediction::NoResult);
        assert_eq!(result.to_string(), "Latency: 42ms\nNo Result");
    }

    #[test]
    fn test_labels_below_threshold_render_no_result() {
        let labels = vec![Label::new("barrel", 0.59), Label::new("drum", 0.2)];

        let result = ClassificationResult::new(labels, Duration::from_millis(7), 0.6, 3);

        assert_eq!(result.to_string(), "Latency: 7ms\nNo Result");
    }

    #[test]
    fn test_top_three_in_engine_order() {
        let labels = vec![
            Label::new("barrel", 0.97),
            Label::new("drum", 0.88),
            Label::new("tank", 0.75),
            Label::new("bucket", 0.66),
            Label::new("can", 0.61),
        ];

        let result = ClassificationResult::new(labels, Duration::from_millis(130), 0.6, 3);

        assert_eq!(
            result.to_string(),
            "Latency: 130ms\n\
             Label: barrel, Confidence: 0.97\n\
             Label: drum, Confidence: 0.88\n\
             Label: tank, Confidence: 0.75"
        );
        assert_eq!(result.labels().len(), 3);
    }

    #[test]
    fn test_confidence_is_rounded_to_two_decimals() {
        let result = ClassificationResult::new(
            vec![Label::new("barrel", 1.0), Label::new("not_barrel", 0.6049)],
            Duration::from_millis(0),
            0.6,
            3,
        );

        assert_eq!(
            result.to_string(),
            "Latency: 0ms\nLabel: barrel, Confidence: 1.00\nLabel: not_barrel, Confidence: 0.60"
        );
    }
}
