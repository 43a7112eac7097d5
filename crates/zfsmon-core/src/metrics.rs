//! Metric records and the accumulator that receives them.
//!
//! Every collector in this crate produces named records with a set of
//! string tags and integer fields. Field sets are string-keyed because the
//! counters available on a host depend on the kernel module version.

use std::collections::BTreeMap;

use serde::Serialize;

/// Integer fields of a record, keyed by field name.
pub type Fields = BTreeMap<String, i64>;

/// Tags of a record, keyed by tag name.
pub type Tags = BTreeMap<String, String>;

/// A single finished metric record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricRecord {
    pub measurement: String,
    pub tags: Tags,
    pub fields: Fields,
}

impl MetricRecord {
    pub fn new(measurement: impl Into<String>, fields: Fields, tags: Tags) -> Self {
        Self {
            measurement: measurement.into(),
            tags,
            fields,
        }
    }

    /// Returns the value of a tag, if present.
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// Returns the value of a field, if present.
    pub fn field(&self, name: &str) -> Option<i64> {
        self.fields.get(name).copied()
    }
}

/// Receiver of finished records.
///
/// The collectors never inspect what the accumulator does with a record;
/// buffering, serialization and delivery are up to the implementation.
pub trait Accumulator {
    fn add_fields(&mut self, measurement: &str, fields: Fields, tags: Tags);
}

/// Accumulator that keeps records in memory, in emission order.
#[derive(Debug, Clone, Default)]
pub struct RecordBuffer {
    records: Vec<MetricRecord>,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<MetricRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the records with the given measurement name.
    pub fn by_measurement<'a>(
        &'a self,
        measurement: &'a str,
    ) -> impl Iterator<Item = &'a MetricRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.measurement == measurement)
    }
}

impl Accumulator for RecordBuffer {
    fn add_fields(&mut self, measurement: &str, fields: Fields, tags: Tags) {
        self.records
            .push(MetricRecord::new(measurement, fields, tags));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_buffer_keeps_order() {
        let mut acc = RecordBuffer::new();
        acc.add_fields("zfs_pool", Fields::new(), Tags::new());
        acc.add_fields("zfs", Fields::new(), Tags::new());

        let names: Vec<&str> = acc
            .records()
            .iter()
            .map(|r| r.measurement.as_str())
            .collect();
        assert_eq!(names, vec!["zfs_pool", "zfs"]);
    }

    #[test]
    fn test_by_measurement() {
        let mut acc = RecordBuffer::new();
        let mut tags = Tags::new();
        tags.insert("dataset".to_string(), "tank".to_string());
        let mut fields = Fields::new();
        fields.insert("avail".to_string(), 1024);

        acc.add_fields("zfs_dataset", fields, tags);
        acc.add_fields("zfs", Fields::new(), Tags::new());

        let datasets: Vec<_> = acc.by_measurement("zfs_dataset").collect();
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].tag("dataset"), Some("tank"));
        assert_eq!(datasets[0].field("avail"), Some(1024));
        assert_eq!(datasets[0].field("used"), None);
    }
}
