//! CSV parsing of dataset sources with full input validation.

use std::collections::{BTreeSet, HashMap};
use std::io::Read;

use tracing::{debug, info, instrument};

use crate::name::LabelColumn;
use crate::{DataError, Dataset, DatasetName};

/// Parse a dataset source in the layout described by `name.source_format()`.
///
/// Labels are re-encoded to zero-based indices in ascending order of the raw
/// value (numeric order when every label is an integer). Class names fall back
/// to the raw label strings and feature names to the stringified column
/// positions when the source has neither.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::CsvParse`] | Malformed CSV record |
/// | [`DataError::EmptyDataset`] | Zero data rows |
/// | [`DataError::InconsistentRowLength`] | Row has a different column count than the first |
/// | [`DataError::NonFiniteValue`] | Feature cell is NaN, Inf, or not a number |
/// | [`DataError::ClassCountMismatch`] | Known class names do not match the distinct labels |
#[instrument(skip(reader))]
pub(crate) fn read_dataset<R: Read>(name: DatasetName, reader: R) -> Result<Dataset, DataError> {
    let format = name.source_format();
    let csv_error = |e: csv::Error| DataError::CsvParse {
        dataset: name,
        line: e.position().map_or(0, |p| p.line()),
        source: e,
    };

    // flexible(true) so that our own InconsistentRowLength check fires instead
    // of a low-level CsvParse error.
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(format.has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header: Option<Vec<String>> = if format.has_header {
        let record = rdr.headers().map_err(csv_error)?;
        Some(record.iter().map(String::from).collect())
    } else {
        None
    };

    let mut expected_cols = header.as_ref().map(Vec::len);
    let mut features = Vec::new();
    let mut raw_labels = Vec::new();
    let mut record = csv::StringRecord::new();
    let mut row_index = 0usize;

    while rdr.read_record(&mut record).map_err(csv_error)? {
        let expected = *expected_cols.get_or_insert(record.len());
        if record.len() != expected || expected < 2 {
            return Err(DataError::InconsistentRowLength {
                dataset: name,
                row_index,
                expected,
                got: record.len(),
            });
        }

        let label_col = match format.label_column {
            LabelColumn::First => 0,
            LabelColumn::Last => expected - 1,
        };
        let mut row = Vec::with_capacity(expected - 1);
        for (col_index, raw) in record.iter().enumerate() {
            if col_index == label_col {
                continue;
            }
            let value = raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| DataError::NonFiniteValue {
                    dataset: name,
                    row_index,
                    col_index,
                    raw: raw.to_string(),
                })?;
            row.push(value);
        }
        features.push(row);
        raw_labels.push(record[label_col].to_string());
        row_index += 1;
    }

    let Some(n_cols) = expected_cols.filter(|_| !features.is_empty()) else {
        return Err(DataError::EmptyDataset { dataset: name });
    };
    let n_features = n_cols - 1;
    debug!(n_rows = features.len(), n_features, "source parsed");

    let (target, raw_classes) = encode_labels(&raw_labels);
    let class_names = match format.class_names {
        Some(known) if known.len() != raw_classes.len() => {
            return Err(DataError::ClassCountMismatch {
                dataset: name,
                expected: known.len(),
                found: raw_classes.len(),
            });
        }
        Some(known) => known.iter().map(|s| s.to_string()).collect(),
        None => raw_classes,
    };

    let feature_names: Vec<String> = match (format.feature_names, header) {
        (Some(known), _) if known.len() == n_features => {
            known.iter().map(|s| s.to_string()).collect()
        }
        (_, Some(mut header)) => {
            match format.label_column {
                LabelColumn::First => header.remove(0),
                LabelColumn::Last => header.remove(n_features),
            };
            header
        }
        _ => (0..n_features).map(|i| i.to_string()).collect(),
    };

    info!(
        dataset = %name,
        n_samples = features.len(),
        n_features,
        n_classes = class_names.len(),
        "dataset loaded"
    );

    Dataset::new(name, features, target, feature_names, class_names)
}

/// Map raw labels to zero-based indices in ascending label order.
///
/// Returns the encoded targets and the distinct raw labels by index.
fn encode_labels(raw_labels: &[String]) -> (Vec<usize>, Vec<String>) {
    let distinct: BTreeSet<&str> = raw_labels.iter().map(String::as_str).collect();
    let mut classes: Vec<&str> = distinct.into_iter().collect();
    if classes.iter().all(|c| c.parse::<i64>().is_ok()) {
        classes.sort_by_key(|c| c.parse::<i64>().unwrap_or_default());
    }

    let index: HashMap<&str, usize> = classes.iter().enumerate().map(|(i, &c)| (c, i)).collect();
    let target = raw_labels.iter().map(|l| index[l.as_str()]).collect();
    (target, classes.into_iter().map(String::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headered_source_with_trailing_label() {
        let csv = "a,b,species\n1.0,2.0,setosa\n3.0,4.0,virginica\n5.0,6.0,setosa\n";
        let ds = read_dataset(DatasetName::Iris, csv.as_bytes()).unwrap();
        assert_eq!(ds.feature_names(), &["a", "b"]);
        assert_eq!(ds.class_names(), &["setosa", "virginica"]);
        assert_eq!(ds.target(), &[0, 1, 0]);
        assert_eq!(ds.features()[1], vec![3.0, 4.0]);
    }

    #[test]
    fn leading_label_uses_known_names() {
        let mut csv = String::new();
        for class in 1..=3 {
            csv.push_str(&format!("{class}"));
            for f in 0..13 {
                csv.push_str(&format!(",{}.5", f + class));
            }
            csv.push('\n');
        }
        let ds = read_dataset(DatasetName::Wine, csv.as_bytes()).unwrap();
        assert_eq!(ds.n_features(), 13);
        assert_eq!(ds.feature_names()[0], "alcohol");
        assert_eq!(ds.class_names(), &["class_0", "class_1", "class_2"]);
        assert_eq!(ds.target(), &[0, 1, 2]);
        assert!((ds.features()[0][0] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn headerless_source_falls_back_to_positions() {
        let csv = "1,0,7\n2,1,10\n3,0,2\n";
        let ds = read_dataset(DatasetName::Covertype, csv.as_bytes()).unwrap();
        assert_eq!(ds.feature_names(), &["0", "1"]);
        // Numeric order, not lexicographic: 2 < 7 < 10.
        assert_eq!(ds.class_names(), &["2", "7", "10"]);
        assert_eq!(ds.target(), &[1, 2, 0]);
    }

    #[test]
    fn inconsistent_row_length() {
        let csv = "1,2,3\n1,2\n";
        let err = read_dataset(DatasetName::Covertype, csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DataError::InconsistentRowLength { row_index: 1, expected: 3, got: 2, .. }
        ));
    }

    #[test]
    fn non_numeric_feature() {
        let csv = "a,b,label\n1.0,oops,x\n";
        let err = read_dataset(DatasetName::Iris, csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DataError::NonFiniteValue { row_index: 0, col_index: 1, ref raw, .. } if raw == "oops"
        ));
    }

    #[test]
    fn nan_feature_rejected() {
        let csv = "NaN,1.0,1\n";
        let err = read_dataset(DatasetName::Covertype, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::NonFiniteValue { col_index: 0, .. }));
    }

    #[test]
    fn header_only_is_empty() {
        let err = read_dataset(DatasetName::Iris, "a,b,label\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::EmptyDataset { .. }));
    }

    #[test]
    fn known_class_count_mismatch() {
        let mut csv = String::new();
        for class in [1, 2] {
            csv.push_str(&format!("{class}"));
            for _ in 0..13 {
                csv.push_str(",1.0");
            }
            csv.push('\n');
        }
        let err = read_dataset(DatasetName::Wine, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::ClassCountMismatch { expected: 3, found: 2, .. }));
    }
}
