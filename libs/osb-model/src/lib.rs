//! Open-service-broker domain types shared across the workspace.
//!
//! `Service` is the shape of a published service definition: catalog
//! responses serve it and the template bucket stores it as YAML.
//! `ServiceInstance` and `ServiceBinding` are the records the broker
//! persists per provisioned stack.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A full catalog service definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub bindable: bool,
    #[serde(default)]
    pub plan_updatable: Option<bool>,
    #[serde(default)]
    pub plans: Vec<Plan>,
    #[serde(default)]
    pub dashboard_client: Option<DashboardClient>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// One offering tier of a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub free: Option<bool>,
    #[serde(default)]
    pub bindable: Option<bool>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// OAuth client descriptor for a service dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardClient {
    pub id: String,
    pub secret: String,
    pub redirect_uri: String,
}

/// A provisioned stack, recorded on provision and removed on deprovision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub id: String,
    pub service_id: String,
    pub plan_id: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
    pub stack_id: String,
}

/// Credentials handed out for one binding, scoped to a parent instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceBinding {
    pub id: String,
    pub instance_id: String,
    #[serde(default)]
    pub credentials: HashMap<String, serde_json::Value>,
}
