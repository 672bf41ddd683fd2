//! Audit event payloads for rolling updates.
//!
//! Details are serialized to raw JSON so they can be embedded verbatim in an
//! audit log record.

use std::collections::HashMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

pub const POD_ID_LABEL: &str = "pod_id";
pub const AVAILABILITY_ZONE_LABEL: &str = "availability_zone";
pub const CLUSTER_NAME_LABEL: &str = "cluster_name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "ROLLING_UPDATE_CREATION")]
    RuCreation,
    #[serde(rename = "ROLLING_UPDATE_COMPLETION")]
    RuCompletion,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::RuCreation => "ROLLING_UPDATE_CREATION",
            EventType::RuCompletion => "ROLLING_UPDATE_COMPLETION",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuCreationDetails {
    pub pod_id: String,
    pub availability_zone: String,
    pub cluster_name: String,
    pub deployer: String,
    /// Serialized pod manifest
    pub manifest: String,
    pub rolling_update_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuCompletionDetails {
    pub pod_id: String,
    pub availability_zone: String,
    pub cluster_name: String,
    pub rolling_update_id: String,
    pub succeeded: bool,
    pub canceled: bool,
}

/// Label lookup for rolling updates.
pub trait Labeler {
    fn rolling_update_labels(&self, rolling_update_id: &str)
    -> anyhow::Result<HashMap<String, String>>;
}

pub fn ru_creation_details(
    pod_id: &str,
    availability_zone: &str,
    cluster_name: &str,
    deployer: &str,
    manifest: &str,
    rolling_update_id: &str,
) -> anyhow::Result<Box<RawValue>> {
    let details = RuCreationDetails {
        pod_id: pod_id.to_string(),
        availability_zone: availability_zone.to_string(),
        cluster_name: cluster_name.to_string(),
        deployer: deployer.to_string(),
        manifest: manifest.to_string(),
        rolling_update_id: rolling_update_id.to_string(),
    };
    to_raw(&details).context("Could not marshal ru creation details as json")
}

/// Completion details, with the pod cluster resolved from the RU's labels.
pub fn ru_completion_details(
    rolling_update_id: &str,
    succeeded: bool,
    canceled: bool,
    labeler: &dyn Labeler,
) -> anyhow::Result<Box<RawValue>> {
    let labels = labeler
        .rolling_update_labels(rolling_update_id)
        .with_context(|| {
            format!(
                "Could not determine pod cluster for RU {}",
                rolling_update_id
            )
        })?;
    let label = |key: &str| labels.get(key).cloned().unwrap_or_default();

    let details = RuCompletionDetails {
        pod_id: label(POD_ID_LABEL),
        availability_zone: label(AVAILABILITY_ZONE_LABEL),
        cluster_name: label(CLUSTER_NAME_LABEL),
        rolling_update_id: rolling_update_id.to_string(),
        succeeded,
        canceled,
    };
    to_raw(&details).context("Could not marshal ru completion details as json")
}

fn to_raw<T: Serialize>(value: &T) -> serde_json::Result<Box<RawValue>> {
    RawValue::from_string(serde_json::to_string(value)?)
}
