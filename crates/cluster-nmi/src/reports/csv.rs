//! `<model>,<score>` report lines.

use std::io::{self, Write};

use super::format_score;
use crate::runners::{BatchReport, ModelRecord};

/// Report line for a scored model; `None` for a failed one.
pub fn csv_line(record: &ModelRecord) -> Option<String> {
    record
        .evaluation()
        .map(|eval| format!("{},{}", record.model, format_score(eval.score.value())))
}

/// Write one line per scored model, in report order.
pub fn write_csv<W: Write>(report: &BatchReport, mut out: W) -> io::Result<()> {
    for line in report.records.iter().filter_map(csv_line) {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvalSettings;
    use crate::metrics::{EntropyPair, NmiEvaluation, NmiScore};
    use crate::runners::ModelOutcome;

    fn scored(model: &str, score: NmiScore) -> ModelRecord {
        ModelRecord {
            model: model.to_string(),
            outcome: ModelOutcome::Scored(NmiEvaluation {
                score,
                entropies: EntropyPair {
                    clustering: -1.0,
                    category: -1.0,
                },
                mutual_information: 0.0,
                item_count: 4,
                observation_count: 4,
                cluster_count: 2,
                category_count: 2,
            }),
        }
    }

    #[test]
    fn test_lines_skip_failures() {
        let report = BatchReport {
            technique: "kmeans".into(),
            settings: EvalSettings::default(),
            item_count: 4,
            records: vec![
                scored("kmeans_1.cm", NmiScore::Finite(0.25)),
                ModelRecord {
                    model: "kmeans_10.cm".into(),
                    outcome: ModelOutcome::Failed {
                        reason: "bad".into(),
                    },
                },
                scored("kmeans_2.cm", NmiScore::Degenerate(f64::NAN)),
            ],
            duration_ms: 0,
        };

        let mut buf = Vec::new();
        write_csv(&report, &mut buf).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "kmeans_1.cm,0.25\nkmeans_2.cm,NaN\n"
        );
    }
}
