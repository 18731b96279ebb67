//! Table statistics
//!
//! The engine reports table statistics as a single string such as
//! `1109049927 bytes, 14093476 rows`. It is decomposed into one [`TableStat`]
//! per metric; the `stats:<metric>:<field>` string keys are only produced when
//! a column record is flattened.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single table-level statistic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStat {
    /// Metric name as reported by the engine (e.g. "bytes", "rows")
    pub metric: String,
    /// Display label
    pub label: String,
    /// Metric value
    pub value: i64,
    /// Free-form description, empty for engine-reported stats
    #[serde(default)]
    pub description: String,
    /// Whether the stat should be shown in generated docs
    pub include: bool,
}

impl TableStat {
    fn engine_reported(metric: &str, value: i64) -> Self {
        Self {
            metric: metric.to_string(),
            label: metric.to_string(),
            value,
            description: String::new(),
            include: true,
        }
    }
}

/// Ordered list of table statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableStats(Vec<TableStat>);

impl TableStats {
    /// Parse a raw `Statistics` value.
    ///
    /// Each `, `-separated part must be `<int> <metric>`; parts that are not are
    /// skipped. A repeated metric keeps its first position and takes the later
    /// value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use databricks_adapter_sdk::models::TableStats;
    ///
    /// let stats = TableStats::parse("1109049927 bytes, 14093476 rows");
    /// assert_eq!(stats.len(), 2);
    /// assert_eq!(stats.get("rows").map(|s| s.value), Some(14093476));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let mut stats: Vec<TableStat> = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let mut pieces = part.split_whitespace();
            let (Some(value), Some(metric)) = (pieces.next(), pieces.next()) else {
                tracing::debug!("Skipping statistics part without a metric: {:?}", part);
                continue;
            };
            let Ok(value) = value.parse::<i64>() else {
                tracing::debug!("Skipping non-numeric statistics part: {:?}", part);
                continue;
            };
            match stats.iter_mut().find(|s| s.metric == metric) {
                Some(existing) => existing.value = value,
                None => stats.push(TableStat::engine_reported(metric, value)),
            }
        }
        Self(stats)
    }

    /// Parse an optional raw value, yielding empty stats when absent
    pub fn from_raw(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    pub fn get(&self, metric: &str) -> Option<&TableStat> {
        self.0.iter().find(|s| s.metric == metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableStat> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append the `stats:<metric>:<field>` entries to a flattened map
    pub fn flatten_into(&self, map: &mut Map<String, Value>) {
        for stat in &self.0 {
            let prefix = format!("stats:{}", stat.metric);
            map.insert(
                format!("{}:description", prefix),
                Value::String(stat.description.clone()),
            );
            map.insert(format!("{}:include", prefix), Value::Bool(stat.include));
            map.insert(
                format!("{}:label", prefix),
                Value::String(stat.label.clone()),
            );
            map.insert(format!("{}:value", prefix), Value::from(stat.value));
        }
    }
}
