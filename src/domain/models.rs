//! Models of VAST API responses. Schemas are from their API docs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-folder entry in the capacity response.
///
/// `data` is a list of byte counts; the numbers correspond to the entries of
/// [`Capacity::keys`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityData {
    pub data: Vec<i64>,
    /// Parent folder.
    pub parent: String,
    /// Percent of the parent folder that this folder uses.
    pub percent: f64,
    /// Weighted average of file atimes in the directory, weighted by size.
    #[serde(default)]
    pub average_atime: Option<DateTime<Utc>>,
}

/// Response returned from the VAST `capacity` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capacity {
    /// Folder name plus its capacity data, one entry per folder.
    pub details: Vec<(String, CapacityData)>,
    /// What the integers in each `data` list represent.
    pub keys: Vec<String>,
    pub time: DateTime<Utc>,
    pub sort_key: String,
    /// Cluster-level totals, aligned with `keys`.
    pub root_data: Vec<i64>,
    pub small_folders: Vec<(String, CapacityData)>,
}

/// Response entry from the VAST `quotas` endpoint.
///
/// The endpoint returns many more fields than we report on; everything is
/// optional so a sparse response still parses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Quota {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub grace_period: Option<String>,
    #[serde(default)]
    pub soft_limit: Option<i64>,
    #[serde(default)]
    pub hard_limit: Option<i64>,
    #[serde(default)]
    pub soft_limit_inodes: Option<i64>,
    #[serde(default)]
    pub hard_limit_inodes: Option<i64>,
    #[serde(default)]
    pub used_inodes: Option<i64>,
    #[serde(default)]
    pub used_capacity: Option<i64>,
    #[serde(default)]
    pub used_capacity_tb: Option<f64>,
    #[serde(default)]
    pub used_effective_capacity: Option<i64>,
    #[serde(default)]
    pub percent_inodes: Option<i64>,
    #[serde(default)]
    pub percent_capacity: Option<i64>,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub tenant_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_parses_api_response() {
        let body = r#"{
            "details": [
                ["/scratch/a", {"data": [100, 90, 120], "parent": "/scratch", "percent": 60.0}],
                ["/scratch/b", {"data": [50, 40, 80], "parent": "/scratch", "percent": 40.0}]
            ],
            "keys": ["usable", "unique", "logical"],
            "time": "2025-11-12T00:00:00Z",
            "sort_key": "logical",
            "root_data": [150, 130, 200],
            "small_folders": [
                ["/scratch/tiny", {"data": [1, 1, 2], "parent": "/scratch", "percent": 0.1}]
            ]
        }"#;
        let capacity: Capacity = serde_json::from_str(body).unwrap();
        assert_eq!(capacity.keys, vec!["usable", "unique", "logical"]);
        assert_eq!(capacity.details.len(), 2);
        assert_eq!(capacity.details[0].0, "/scratch/a");
        assert_eq!(capacity.details[0].1.data, vec![100, 90, 120]);
        assert_eq!(capacity.small_folders.len(), 1);
    }

    #[test]
    fn test_quota_parses_sparse_response() {
        let body = r#"{"path": "/scratch", "state": "OK", "used_capacity": 10,
                       "soft_limit": 100, "hard_limit": 200, "percent_capacity": 5}"#;
        let quota: Quota = serde_json::from_str(body).unwrap();
        assert_eq!(quota.path.as_deref(), Some("/scratch"));
        assert_eq!(quota.state.as_deref(), Some("OK"));
        assert_eq!(quota.percent_capacity, Some(5));
        assert!(quota.cluster.is_none());
    }
}
