// Persistence - row-oriented text format for training sets
//
// One row per sample: `<f_0>,<f_1>,...,<f_{N-1}>,<label>`. No header, no
// metadata. Rows are grouped by class in configured order.
//
// Loading is additive and skip-and-report: every row is either fully
// applied or fully rejected, and rejected rows are listed in the
// returned `LoadReport` while the remaining rows still load.

use std::fs;
use std::path::Path;

use crate::dataset::instance::{capture, DataInstance};
use crate::dataset::labels::{ClassId, ClassSet};
use crate::dataset::training_set::TrainingSet;
use crate::error::{log_dataset_error, DatasetError};

/// Column delimiter
pub const DELIMITER: char = ',';

/// A row that was rejected during load
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    /// 1-based line number in the source text
    pub line: usize,
    pub error: DatasetError,
}

/// Outcome of an additive load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Rows appended to the training set
    pub loaded: usize,
    /// Rows skipped, in file order
    pub rejected: Vec<RejectedRow>,
}

impl LoadReport {
    /// True when every non-blank row was applied
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Serialize every sample, grouped by class in configured order
pub fn save(set: &TrainingSet) -> String {
    let classes = set.class_set();
    let mut out = String::new();

    for (class, instance) in set.iter() {
        for value in instance.measurements.as_slice() {
            // Shortest round-trip formatting keeps values bit-exact on reload
            out.push_str(&value.to_string());
            out.push(DELIMITER);
        }
        out.push_str(classes.name(class));
        out.push('\n');
    }

    out
}

/// Parse one row into its class and instance
///
/// # Errors
/// * `MalformedRow` - column count differs from `bands + 1`, or a feature is not a number
/// * `UnknownLabel` - the trailing label is not a configured class
pub fn parse_row(
    row: &str,
    line: usize,
    classes: &ClassSet,
    bands: usize,
) -> Result<(ClassId, DataInstance), DatasetError> {
    let columns: Vec<&str> = row.split(DELIMITER).collect();
    if columns.len() != bands + 1 {
        return Err(DatasetError::MalformedRow {
            line,
            reason: format!(
                "expected {} columns, found {}",
                bands + 1,
                columns.len()
            ),
        });
    }

    let (label, features) = columns
        .split_last()
        .ok_or_else(|| DatasetError::MalformedRow {
            line,
            reason: "empty row".to_string(),
        })?;

    let values = features
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            raw.trim()
                .parse::<f32>()
                .map_err(|err| DatasetError::MalformedRow {
                    line,
                    reason: format!("feature {} {:?}: {}", i, raw, err),
                })
        })
        .collect::<Result<Vec<f32>, DatasetError>>()?;

    let class = classes.id_of(label.trim())?;
    let instance = capture(Some(class), &values, bands)?;
    Ok((class, instance))
}

/// Append every valid row of `text` into `set`
///
/// Pre-existing samples are kept. Blank lines are skipped silently.
pub fn load(set: &mut TrainingSet, text: &str) -> LoadReport {
    let mut report = LoadReport::default();
    let bands = set.bands();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let row = raw.trim_end_matches('\r');
        if row.trim().is_empty() {
            continue;
        }

        let parsed = parse_row(row, line, set.class_set(), bands)
            .and_then(|(class, instance)| set.append(class, instance));

        match parsed {
            Ok(()) => report.loaded += 1,
            Err(error) => {
                log_dataset_error(&error, "load");
                report.rejected.push(RejectedRow { line, error });
            }
        }
    }

    log::info!(
        "[Persistence] Loaded {} rows, rejected {}",
        report.loaded,
        report.rejected.len()
    );
    report
}

/// Write `save(set)` to `path`, replacing any existing file
pub fn save_to_file<P: AsRef<Path>>(set: &TrainingSet, path: P) -> Result<(), DatasetError> {
    fs::write(&path, save(set))
        .map_err(DatasetError::from)
        .inspect_err(|err| {
            log_dataset_error(err, "save_to_file");
        })?;
    log::info!(
        "[Persistence] Saved {} samples to {:?}",
        set.total(),
        path.as_ref()
    );
    Ok(())
}

/// Read `path` and load it additively into `set`
///
/// # Errors
/// `Io` if the file cannot be read; row-level problems are in the report.
pub fn load_from_file<P: AsRef<Path>>(
    set: &mut TrainingSet,
    path: P,
) -> Result<LoadReport, DatasetError> {
    let text = fs::read_to_string(&path).map_err(DatasetError::from)?;
    Ok(load(set, &text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn set_with(bands: usize) -> TrainingSet {
        TrainingSet::new(ClassSet::default(), bands)
    }

    fn sorted_pairs(set: &TrainingSet) -> Vec<(usize, Vec<u32>)> {
        let mut pairs: Vec<(usize, Vec<u32>)> = set
            .iter()
            .map(|(class, inst)| {
                (
                    class.index(),
                    inst.measurements
                        .as_slice()
                        .iter()
                        .map(|v| v.to_bits())
                        .collect(),
                )
            })
            .collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_save_row_format() {
        let mut set = set_with(3);
        let tap = set.class_set().id_of("Tap").unwrap();
        set.capture(tap, &[0.5, 1.0, 0.25]).unwrap();

        assert_eq!(save(&set), "0.5,1,0.25,Tap\n");
    }

    #[test]
    fn test_save_groups_by_class_order() {
        let mut set = set_with(1);
        let classes = set.class_set().clone();
        set.capture(classes.id_of("Tap").unwrap(), &[3.0]).unwrap();
        set.capture(classes.id_of("Neutral").unwrap(), &[1.0]).unwrap();
        set.capture(classes.id_of("Scratch").unwrap(), &[2.0]).unwrap();
        set.capture(classes.id_of("Tap").unwrap(), &[4.0]).unwrap();

        assert_eq!(save(&set), "1,Neutral\n2,Scratch\n3,Tap\n4,Tap\n");
    }

    #[test]
    fn test_round_trip_random_sets() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let bands = rng.gen_range(1..16);
            let mut original = set_with(bands);
            let ids: Vec<ClassId> = original.class_set().ids().collect();
            for _ in 0..rng.gen_range(1..30) {
                let class = ids[rng.gen_range(0..ids.len())];
                let values: Vec<f32> = (0..bands).map(|_| rng.gen::<f32>() * 100.0).collect();
                original.capture(class, &values).unwrap();
            }

            let mut reloaded = set_with(bands);
            let report = load(&mut reloaded, &save(&original));

            assert!(report.is_clean(), "rejected rows: {:?}", report.rejected);
            assert_eq!(report.loaded, original.total());
            assert_eq!(sorted_pairs(&reloaded), sorted_pairs(&original));
        }
    }

    #[test]
    fn test_load_is_additive() {
        let mut set = set_with(2);
        let tap = set.class_set().id_of("Tap").unwrap();
        set.capture(tap, &[1.0, 1.0]).unwrap();

        let report = load(&mut set, "2,2,Tap\n");
        assert_eq!(report.loaded, 1);
        assert_eq!(set.count_for(tap), 2);
    }

    #[test]
    fn test_load_skips_malformed_row_and_keeps_valid_rows() {
        let mut set = set_with(2);
        let text = "0.1,0.2,Scratch\n0.3,Tap\n0.5,0.6,Tap\n";

        let report = load(&mut set, text);

        assert_eq!(report.loaded, 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].line, 2);
        assert!(matches!(
            report.rejected[0].error,
            DatasetError::MalformedRow { line: 2, .. }
        ));
        assert_eq!(set.total(), 2);
    }

    #[test]
    fn test_load_rejects_unknown_label() {
        let mut set = set_with(2);
        let report = load(&mut set, "0.1,0.2,Knock\n");

        assert_eq!(report.loaded, 0);
        assert!(matches!(
            &report.rejected[0].error,
            DatasetError::UnknownLabel { label } if label == "Knock"
        ));
        assert!(set.is_empty());
    }

    #[test]
    fn test_load_rejects_non_numeric_feature() {
        let mut set = set_with(2);
        let report = load(&mut set, "0.1,abc,Tap\n");

        assert_eq!(report.loaded, 0);
        assert!(matches!(
            report.rejected[0].error,
            DatasetError::MalformedRow { line: 1, .. }
        ));
    }

    #[test]
    fn test_load_tolerates_crlf_and_blank_lines() {
        let mut set = set_with(2);
        let report = load(&mut set, "0.1,0.2,Tap\r\n\r\n\n0.3,0.4,Neutral\r\n");

        assert!(report.is_clean());
        assert_eq!(report.loaded, 2);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.csv");

        let mut set = set_with(4);
        let scratch = set.class_set().id_of("Scratch").unwrap();
        set.capture(scratch, &[0.01, 0.02, 0.03, 0.04]).unwrap();
        save_to_file(&set, &path).unwrap();

        let mut reloaded = set_with(4);
        let report = load_from_file(&mut reloaded, &path).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(reloaded.instances(scratch), set.instances(scratch));
    }

    #[test]
    fn test_load_from_missing_file() {
        let mut set = set_with(2);
        let result = load_from_file(&mut set, "/nonexistent/dir/dataset.csv");
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }
}
