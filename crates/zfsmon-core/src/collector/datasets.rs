//! Dataset property collection via `zfs list`.

use tracing::warn;

use crate::collector::CollectError;
use crate::collector::command::CommandRunner;
use crate::collector::kstat::join_names;
use crate::metrics::{Accumulator, Fields, Tags};

/// Userland tool queried for dataset properties.
const ZFS_COMMAND: &str = "zfs";

/// Property that must lead every query; it becomes the `dataset` tag.
const NAME_PROPERTY: &str = "name";

/// Measurement of per-dataset records.
pub const DATASET_MEASUREMENT: &str = "zfs_dataset";

/// Collects dataset names and, optionally, per-dataset property records.
#[derive(Debug, Clone)]
pub struct DatasetCollector {
    properties: Vec<String>,
    detail: bool,
}

impl DatasetCollector {
    /// Creates a dataset collector.
    ///
    /// # Arguments
    /// * `properties` - Properties to request; the first must be `name` and
    ///   the rest must be integer valued
    /// * `detail` - Emit one `zfs_dataset` record per dataset
    pub fn new(properties: Vec<String>, detail: bool) -> Self {
        Self { properties, detail }
    }

    /// Returns the `zfs list` arguments for the configured properties.
    pub fn list_args(&self) -> Vec<String> {
        vec![
            "list".to_string(),
            "-Hp".to_string(),
            "-o".to_string(),
            self.properties.join(","),
        ]
    }

    /// Queries dataset properties and returns all dataset names joined with `::`.
    ///
    /// Every output row contributes its first column to the joined names,
    /// even rows that are rejected for having the wrong number of columns.
    /// In detail mode such rows are skipped with a warning, while a value
    /// that fails to parse inside an accepted row aborts the whole call.
    pub fn gather<R: CommandRunner + ?Sized>(
        &self,
        runner: &R,
        acc: &mut dyn Accumulator,
    ) -> Result<String, CollectError> {
        if self.properties.first().map(String::as_str) != Some(NAME_PROPERTY) {
            return Err(CollectError::InvalidProperties(format!(
                "first dataset property must be '{}', got {:?}",
                NAME_PROPERTY, self.properties
            )));
        }

        let args = self.list_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let lines = runner.run(ZFS_COMMAND, &args)?;

        let names: Vec<&str> = lines
            .iter()
            .map(|line| line.split('\t').next().unwrap_or_default())
            .collect();

        if self.detail {
            for line in &lines {
                let columns: Vec<&str> = line.split('\t').collect();
                if columns.len() != self.properties.len() {
                    warn!(
                        line = %line,
                        expected = self.properties.len(),
                        got = columns.len(),
                        "invalid number of columns for dataset row"
                    );
                    continue;
                }

                let mut fields = Fields::new();
                for (property, value) in self.properties[1..].iter().zip(&columns[1..]) {
                    let parsed: i64 = value.parse().map_err(|_| CollectError::DatasetField {
                        dataset: columns[0].to_string(),
                        property: property.clone(),
                        value: value.to_string(),
                    })?;
                    fields.insert(property.clone(), parsed);
                }

                let mut tags = Tags::new();
                tags.insert("dataset".to_string(), columns[0].to_string());
                acc.add_fields(DATASET_MEASUREMENT, fields, tags);
            }
        }

        Ok(join_names(names.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::command::CommandError;
    use crate::collector::mock::MockCommandRunner;
    use crate::metrics::RecordBuffer;

    fn collector(properties: &[&str], detail: bool) -> DatasetCollector {
        DatasetCollector::new(properties.iter().map(|s| s.to_string()).collect(), detail)
    }

    #[test]
    fn test_list_args() {
        let c = collector(&["name", "avail", "used"], false);
        assert_eq!(c.list_args(), vec!["list", "-Hp", "-o", "name,avail,used"]);
    }

    #[test]
    fn test_gather_detail() {
        let runner = MockCommandRunner::new()
            .with_output("zfs list -Hp -o name,avail", "tank\t1024\nrpool\t2048\n");
        let mut acc = RecordBuffer::new();

        let names = collector(&["name", "avail"], true)
            .gather(&runner, &mut acc)
            .unwrap();

        assert_eq!(names, "tank::rpool");
        let records = acc.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].measurement, "zfs_dataset");
        assert_eq!(records[0].tag("dataset"), Some("tank"));
        assert_eq!(records[0].fields.len(), 1);
        assert_eq!(records[0].field("avail"), Some(1024));
        assert_eq!(records[1].tag("dataset"), Some("rpool"));
        assert_eq!(records[1].field("avail"), Some(2048));
    }

    #[test]
    fn test_gather_without_detail_emits_nothing() {
        let runner = MockCommandRunner::new()
            .with_output("zfs list -Hp -o name,avail", "tank\t1024\nrpool\tbogus\n");
        let mut acc = RecordBuffer::new();

        let names = collector(&["name", "avail"], false)
            .gather(&runner, &mut acc)
            .unwrap();

        assert_eq!(names, "tank::rpool");
        assert!(acc.is_empty());
    }

    #[test]
    fn test_gather_skips_short_rows_but_keeps_name() {
        let runner = MockCommandRunner::new().with_output(
            "zfs list -Hp -o name,avail,used",
            "tank\t1024\t512\ntank/broken\t7\nrpool\t2048\t256\n",
        );
        let mut acc = RecordBuffer::new();

        let names = collector(&["name", "avail", "used"], true)
            .gather(&runner, &mut acc)
            .unwrap();

        assert_eq!(names, "tank::tank/broken::rpool");
        let tagged: Vec<_> = acc
            .records()
            .iter()
            .filter_map(|r| r.tag("dataset"))
            .collect();
        assert_eq!(tagged, vec!["tank", "rpool"]);
    }

    #[test]
    fn test_gather_parse_failure_is_fatal() {
        let runner = MockCommandRunner::new().with_output(
            "zfs list -Hp -o name,avail",
            "tank\t1024\nrpool\tnope\nbackup\t4096\n",
        );
        let mut acc = RecordBuffer::new();

        let err = collector(&["name", "avail"], true)
            .gather(&runner, &mut acc)
            .unwrap_err();

        match err {
            CollectError::DatasetField {
                dataset,
                property,
                value,
            } => {
                assert_eq!(dataset, "rpool");
                assert_eq!(property, "avail");
                assert_eq!(value, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_gather_empty_output() {
        let runner = MockCommandRunner::new().with_output("zfs list -Hp -o name,avail", "");
        let mut acc = RecordBuffer::new();

        let names = collector(&["name", "avail"], true)
            .gather(&runner, &mut acc)
            .unwrap();

        assert_eq!(names, "");
        assert!(acc.is_empty());
    }

    #[test]
    fn test_gather_command_failure() {
        let runner = MockCommandRunner::new().with_failure(
            "zfs list -Hp -o name,avail",
            "The ZFS modules are not loaded.",
        );
        let mut acc = RecordBuffer::new();

        let err = collector(&["name", "avail"], false)
            .gather(&runner, &mut acc)
            .unwrap_err();

        assert!(matches!(
            err,
            CollectError::Command(CommandError::Failed { .. })
        ));
    }

    #[test]
    fn test_gather_requires_name_first() {
        let runner = MockCommandRunner::new();
        let mut acc = RecordBuffer::new();

        let err = collector(&["avail", "name"], false)
            .gather(&runner, &mut acc)
            .unwrap_err();
        assert!(matches!(err, CollectError::InvalidProperties(_)));

        let err = collector(&[], false).gather(&runner, &mut acc).unwrap_err();
        assert!(matches!(err, CollectError::InvalidProperties(_)));
    }
}
