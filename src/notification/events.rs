//! Typed cluster notification events and the `type_url` registry.
//!
//! GKE publishes four kinds of cluster notifications. Each is identified by a
//! fully-qualified `type_url` attribute and carries a JSON payload. The set is
//! closed: [`EventKind`] is the registry and an unknown `type_url` never
//! resolves to a kind.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recognised cluster notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SecurityBulletin,
    UpgradeAvailable,
    Upgrade,
    UpgradeInfo,
}

impl EventKind {
    /// Every recognised kind, in registry order.
    pub const ALL: [EventKind; 4] = [
        EventKind::SecurityBulletin,
        EventKind::UpgradeAvailable,
        EventKind::Upgrade,
        EventKind::UpgradeInfo,
    ];

    /// The `type_url` attribute value announcing this kind.
    pub const fn type_url(self) -> &'static str {
        match self {
            EventKind::SecurityBulletin => {
                "type.googleapis.com/google.container.v1beta1.SecurityBulletinEvent"
            }
            EventKind::UpgradeAvailable => {
                "type.googleapis.com/google.container.v1beta1.UpgradeAvailableEvent"
            }
            EventKind::Upgrade => "type.googleapis.com/google.container.v1beta1.UpgradeEvent",
            EventKind::UpgradeInfo => {
                "type.googleapis.com/google.container.v1beta1.UpgradeInfoEvent"
            }
        }
    }

    /// Short label used in logs and metrics.
    pub const fn name(self) -> &'static str {
        match self {
            EventKind::SecurityBulletin => "security_bulletin",
            EventKind::UpgradeAvailable => "upgrade_available",
            EventKind::Upgrade => "upgrade",
            EventKind::UpgradeInfo => "upgrade_info",
        }
    }

    /// Decode a payload as this kind.
    pub fn decode(self, payload: &str, mode: DecodeMode) -> Result<ClusterEvent, PayloadError> {
        Ok(match self {
            EventKind::SecurityBulletin => {
                ClusterEvent::SecurityBulletin(decode_typed(payload, mode)?)
            }
            EventKind::UpgradeAvailable => {
                ClusterEvent::UpgradeAvailable(decode_typed(payload, mode)?)
            }
            EventKind::Upgrade => ClusterEvent::Upgrade(decode_typed(payload, mode)?),
            EventKind::UpgradeInfo => ClusterEvent::UpgradeInfo(decode_typed(payload, mode)?),
        })
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a `type_url` is not in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized type_url `{0}`")]
pub struct UnrecognizedType(pub String);

impl FromStr for EventKind {
    type Err = UnrecognizedType;

    fn from_str(type_url: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.type_url() == type_url)
            .ok_or_else(|| UnrecognizedType(type_url.to_string()))
    }
}

/// How strictly a payload is matched against its declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// The payload must be an object whose keys all belong to the declared type.
    #[default]
    Strict,
    /// Unknown keys are ignored; the payload must still be an object and known
    /// keys must have the right shape.
    Lenient,
}

/// Why a payload could not be decoded as its declared type.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON for the declared type: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("payload field `{0}` does not belong to the declared type")]
    UnexpectedField(String),
}

/// A decoded notification payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClusterEvent {
    SecurityBulletin(SecurityBulletinEvent),
    UpgradeAvailable(UpgradeAvailableEvent),
    Upgrade(UpgradeEvent),
    UpgradeInfo(UpgradeInfoEvent),
}

impl ClusterEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ClusterEvent::SecurityBulletin(_) => EventKind::SecurityBulletin,
            ClusterEvent::UpgradeAvailable(_) => EventKind::UpgradeAvailable,
            ClusterEvent::Upgrade(_) => EventKind::Upgrade,
            ClusterEvent::UpgradeInfo(_) => EventKind::UpgradeInfo,
        }
    }
}

/// A payload schema that can be decoded from JSON.
pub trait TypedEvent: DeserializeOwned + Serialize {
    /// Top-level JSON keys the schema defines.
    const FIELDS: &'static [&'static str];
}

fn decode_typed<T: TypedEvent>(payload: &str, mode: DecodeMode) -> Result<T, PayloadError> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    let object = value.as_object().ok_or(PayloadError::NotAnObject)?;
    if mode == DecodeMode::Strict {
        if let Some(key) = object.keys().find(|key| !T::FIELDS.contains(&key.as_str())) {
            return Err(PayloadError::UnexpectedField(key.clone()));
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// A GKE security bulletin affecting the cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SecurityBulletinEvent {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub affected_supported_minors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brief_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulletin_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulletin_uri: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cve_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_steps_required: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patched_versions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type_affected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_upgrade_target: Option<String>,
}

impl TypedEvent for SecurityBulletinEvent {
    const FIELDS: &'static [&'static str] = &[
        "affectedSupportedMinors",
        "briefDescription",
        "bulletinId",
        "bulletinUri",
        "cveIds",
        "manualStepsRequired",
        "patchedVersions",
        "resourceTypeAffected",
        "severity",
        "suggestedUpgradeTarget",
    ];
}

/// A new version is available for the cluster or one of its node pools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpgradeAvailableEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_channel: Option<ReleaseChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows_versions: Option<WindowsVersions>,
}

impl TypedEvent for UpgradeAvailableEvent {
    const FIELDS: &'static [&'static str] = &[
        "releaseChannel",
        "resource",
        "resourceType",
        "version",
        "windowsVersions",
    ];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReleaseChannel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowsVersions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub windows_versions: Vec<WindowsVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowsVersion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support_end_date: Option<Date>,
}

/// Calendar date; zero components mean "unspecified".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Date {
    pub year: i64,
    pub month: i64,
    pub day: i64,
}

/// A cluster or node pool upgrade has started.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpgradeEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,
}

impl TypedEvent for UpgradeEvent {
    const FIELDS: &'static [&'static str] = &[
        "currentVersion",
        "operation",
        "operationStartTime",
        "resource",
        "resourceType",
        "targetVersion",
    ];
}

/// Progress or end-of-support information about an upgrade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpgradeInfoEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_support_end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_support_end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_version: Option<String>,
}

impl TypedEvent for UpgradeInfoEvent {
    const FIELDS: &'static [&'static str] = &[
        "currentVersion",
        "description",
        "endTime",
        "eventType",
        "extendedSupportEndTime",
        "operation",
        "resource",
        "resourceType",
        "standardSupportEndTime",
        "startTime",
        "state",
        "targetVersion",
    ];
}
