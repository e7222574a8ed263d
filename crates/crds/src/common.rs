//! Shared managed-resource vocabulary
//!
//! Every GitLab kind embeds a [`ResourceSpec`] (flattened into its spec) and
//! reports [`Condition`]s on its status. The [`Managed`] trait lets the
//! reconciler handle any kind behind a trait object.

use chrono::{DateTime, Utc};
use kube::api::ObjectMeta;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::borrow::Cow;

/// Annotation holding the remote identifier of a managed object
pub const EXTERNAL_NAME_ANNOTATION: &str = "crossplane.io/external-name";

/// A phase the controller is allowed to perform
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum ManagementAction {
    /// Every phase
    #[serde(rename = "*")]
    All,
    Observe,
    Create,
    Update,
    Delete,
    LateInitialize,
}

fn default_management_policies() -> Vec<ManagementAction> {
    vec![ManagementAction::All]
}

/// What happens to the remote object when the managed object is deleted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
pub enum DeletionPolicy {
    #[default]
    Delete,
    Orphan,
}

/// Reference to a ProviderConfig (cluster scoped)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ProviderConfigReference {
    pub name: String,
}

/// Where connection details are published
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretReference {
    pub name: String,
    /// Falls back to the controller's watch namespace when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A key inside a Secret
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    pub name: String,
    pub namespace: String,
    pub key: String,
}

/// Fields common to every managed resource spec
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    /// Phases the controller may perform, `["*"]` by default
    #[serde(default = "default_management_policies")]
    pub management_policies: Vec<ManagementAction>,

    #[serde(default)]
    pub deletion_policy: DeletionPolicy,

    /// Credentials to use; the ProviderConfig named `default` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config_ref: Option<ProviderConfigReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_connection_secret_to_ref: Option<SecretReference>,
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self {
            management_policies: default_management_policies(),
            deletion_policy: DeletionPolicy::Delete,
            provider_config_ref: None,
            write_connection_secret_to_ref: None,
        }
    }
}

impl ResourceSpec {
    /// Whether `action` is permitted by the management policies
    pub fn allows(&self, action: ManagementAction) -> bool {
        self.management_policies
            .iter()
            .any(|p| *p == ManagementAction::All || *p == action)
    }

    /// Name of the ProviderConfig to resolve credentials from
    pub fn provider_config_name(&self) -> &str {
        self.provider_config_ref
            .as_ref()
            .map(|r| r.name.as_str())
            .unwrap_or("default")
    }
}

/// Condition status value
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

/// A status condition (`Ready` or `Synced`)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub last_transition_time: DateTime<Utc>,
}

pub const TYPE_READY: &str = "Ready";
pub const TYPE_SYNCED: &str = "Synced";

impl Condition {
    fn new(type_: &str, status: ConditionStatus, reason: &str, message: Option<String>) -> Self {
        Self {
            type_: type_.to_string(),
            status,
            reason: reason.to_string(),
            message,
            last_transition_time: Utc::now(),
        }
    }

    /// Remote object exists and is usable
    pub fn available() -> Self {
        Self::new(TYPE_READY, ConditionStatus::True, "Available", None)
    }

    /// Remote object exists but cannot be used
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(TYPE_READY, ConditionStatus::False, "Unavailable", Some(message.into()))
    }

    pub fn creating() -> Self {
        Self::new(TYPE_READY, ConditionStatus::False, "Creating", None)
    }

    pub fn deleting() -> Self {
        Self::new(TYPE_READY, ConditionStatus::False, "Deleting", None)
    }

    pub fn reconcile_success() -> Self {
        Self::new(TYPE_SYNCED, ConditionStatus::True, "ReconcileSuccess", None)
    }

    /// Failed reconcile; `reason` is the stable error sentinel
    pub fn reconcile_error(reason: &str, message: impl Into<String>) -> Self {
        Self::new(TYPE_SYNCED, ConditionStatus::False, reason, Some(message.into()))
    }
}

/// Insert or replace the condition of the same type.
///
/// `lastTransitionTime` is carried over when the status did not change.
pub fn set_condition(conditions: &mut Vec<Condition>, mut condition: Condition) {
    match conditions.iter_mut().find(|c| c.type_ == condition.type_) {
        Some(existing) => {
            if existing.status == condition.status {
                condition.last_transition_time = existing.last_transition_time;
            }
            *existing = condition;
        }
        None => conditions.push(condition),
    }
}

/// GitLab access levels
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "i64", into = "i64")]
pub enum AccessLevel {
    NoPermissions,
    MinimalAccess,
    Guest,
    Reporter,
    Developer,
    Maintainer,
    Owner,
    Admin,
}

impl AccessLevel {
    pub fn value(self) -> i64 {
        match self {
            AccessLevel::NoPermissions => 0,
            AccessLevel::MinimalAccess => 5,
            AccessLevel::Guest => 10,
            AccessLevel::Reporter => 20,
            AccessLevel::Developer => 30,
            AccessLevel::Maintainer => 40,
            AccessLevel::Owner => 50,
            AccessLevel::Admin => 60,
        }
    }
}

impl TryFrom<i64> for AccessLevel {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => AccessLevel::NoPermissions,
            5 => AccessLevel::MinimalAccess,
            10 => AccessLevel::Guest,
            20 => AccessLevel::Reporter,
            30 => AccessLevel::Developer,
            40 => AccessLevel::Maintainer,
            50 => AccessLevel::Owner,
            60 => AccessLevel::Admin,
            other => return Err(format!("invalid access level {}", other)),
        })
    }
}

impl From<AccessLevel> for i64 {
    fn from(level: AccessLevel) -> Self {
        level.value()
    }
}

impl JsonSchema for AccessLevel {
    fn schema_name() -> Cow<'static, str> {
        "AccessLevel".into()
    }

    fn json_schema(_generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "integer",
            "description": "0 none, 5 minimal, 10 guest, 20 reporter, 30 developer, 40 maintainer, 50 owner, 60 admin",
            "enum": [0, 5, 10, 20, 30, 40, 50, 60]
        })
    }
}

/// Project and group visibility
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Internal,
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Internal => "internal",
            Visibility::Public => "public",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "private" => Some(Visibility::Private),
            "internal" => Some(Visibility::Internal),
            "public" => Some(Visibility::Public),
            _ => None,
        }
    }
}

/// Read the external name; an absent annotation reads as empty
pub fn external_name(meta: &ObjectMeta) -> &str {
    meta.annotations
        .as_ref()
        .and_then(|a| a.get(EXTERNAL_NAME_ANNOTATION))
        .map(String::as_str)
        .unwrap_or("")
}

pub fn set_external_name(meta: &mut ObjectMeta, name: impl Into<String>) {
    meta.annotations
        .get_or_insert_with(Default::default)
        .insert(EXTERNAL_NAME_ANNOTATION.to_string(), name.into());
}

/// Behaviour shared by every managed kind, object safe so the reconciler can
/// hand any kind to an adapter as `&mut dyn Managed`.
pub trait Managed: Any + Send + Sync {
    fn kind_name(&self) -> &'static str;
    fn meta(&self) -> &ObjectMeta;
    fn meta_mut(&mut self) -> &mut ObjectMeta;
    fn resource_spec(&self) -> &ResourceSpec;
    fn conditions(&self) -> &[Condition];
    fn set_condition(&mut self, condition: Condition);
    /// `status` serialized for a merge patch
    fn status_value(&self) -> serde_json::Result<serde_json::Value>;
    /// `spec.forProvider` serialized for a merge patch
    fn for_provider_value(&self) -> serde_json::Result<serde_json::Value>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn external_name(&self) -> &str {
        external_name(self.meta())
    }

    fn set_external_name(&mut self, name: String) {
        set_external_name(self.meta_mut(), name);
    }

    fn is_being_deleted(&self) -> bool {
        self.meta().deletion_timestamp.is_some()
    }
}

/// Implements [`Managed`] for a kind whose spec flattens `resource` next to
/// `for_provider` and whose status carries `conditions`.
macro_rules! impl_managed {
    ($kind:ty, $name:literal) => {
        impl $crate::common::Managed for $kind {
            fn kind_name(&self) -> &'static str {
                $name
            }

            fn meta(&self) -> &kube::api::ObjectMeta {
                &self.metadata
            }

            fn meta_mut(&mut self) -> &mut kube::api::ObjectMeta {
                &mut self.metadata
            }

            fn resource_spec(&self) -> &$crate::common::ResourceSpec {
                &self.spec.resource
            }

            fn conditions(&self) -> &[$crate::common::Condition] {
                self.status
                    .as_ref()
                    .map(|s| s.conditions.as_slice())
                    .unwrap_or(&[])
            }

            fn set_condition(&mut self, condition: $crate::common::Condition) {
                let status = self.status.get_or_insert_with(Default::default);
                $crate::common::set_condition(&mut status.conditions, condition);
            }

            fn status_value(&self) -> serde_json::Result<serde_json::Value> {
                serde_json::to_value(&self.status)
            }

            fn for_provider_value(&self) -> serde_json::Result<serde_json::Value> {
                serde_json::to_value(&self.spec.for_provider)
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                self
            }
        }
    };
}

pub(crate) use impl_managed;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_management_policies_default_to_all() {
        let spec: ResourceSpec = serde_json::from_str("{}").unwrap();
        assert!(spec.allows(ManagementAction::Create));
        assert!(spec.allows(ManagementAction::LateInitialize));
        assert_eq!(spec.provider_config_name(), "default");
    }

    #[test]
    fn test_observe_only_policy() {
        let spec: ResourceSpec =
            serde_json::from_str(r#"{"managementPolicies": ["Observe"], "deletionPolicy": "Orphan"}"#).unwrap();
        assert!(spec.allows(ManagementAction::Observe));
        assert!(!spec.allows(ManagementAction::Update));
        assert_eq!(spec.deletion_policy, DeletionPolicy::Orphan);
    }

    #[test]
    fn test_access_level_is_an_integer_on_the_wire() {
        let level: AccessLevel = serde_json::from_str("30").unwrap();
        assert_eq!(level, AccessLevel::Developer);
        assert_eq!(serde_json::to_string(&AccessLevel::Owner).unwrap(), "50");
        assert!(serde_json::from_str::<AccessLevel>("31").is_err());
    }

    #[test]
    fn test_transition_time_kept_when_status_unchanged() {
        let mut conditions = vec![];
        let first = Condition::available();
        let stamp = first.last_transition_time;
        set_condition(&mut conditions, first);

        let mut again = Condition::available();
        again.last_transition_time = stamp + chrono::Duration::seconds(30);
        set_condition(&mut conditions, again);
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].last_transition_time, stamp);

        let mut flipped = Condition::unavailable("pending deletion");
        let later = stamp + chrono::Duration::seconds(60);
        flipped.last_transition_time = later;
        set_condition(&mut conditions, flipped);
        assert_eq!(conditions[0].last_transition_time, later);
        assert_eq!(conditions[0].reason, "Unavailable");
    }

    #[test]
    fn test_external_name_roundtrip_on_meta() {
        let mut meta = ObjectMeta::default();
        assert_eq!(external_name(&meta), "");
        set_external_name(&mut meta, "42");
        assert_eq!(external_name(&meta), "42");
    }
}
