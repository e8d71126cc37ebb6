//! Device identity types.

use serde::{Deserialize, Serialize};

/// Hardware identifiers exactly as the OS reports them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawDeviceInfo {
    /// Build model string (e.g. `SM-S918B`)
    pub model: String,
    /// Build brand string (e.g. `samsung`)
    pub brand: String,
    /// Build manufacturer string
    pub manufacturer: String,
    /// Build fingerprint, `brand/product/device:version/...`
    pub fingerprint: String,
    /// OS release string (e.g. `14`)
    #[serde(default)]
    pub os_version: String,
}

/// Canonical identity of a device after suffix stripping and brand mapping.
///
/// `normalized_id` groups regional/carrier variants of one logical model;
/// `hardware_id` identifies the physical hardware and survives reinstalls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedDevice {
    pub original_model: String,
    pub normalized_model: String,
    pub normalized_brand: String,
    pub normalized_id: String,
    pub hardware_id: String,
    pub display_name: String,
}
