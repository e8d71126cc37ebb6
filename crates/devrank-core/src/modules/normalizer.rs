//! Device name normalization.
//!
//! Collapses regional and carrier variants of one model to a single grouping
//! key and derives a per-hardware id from the build fingerprint. Normalization
//! is heuristic: rules prefer leaving two variants apart over merging
//! different devices. It never fails.

use devrank_types::{NormalizedDevice, RawDeviceInfo};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Canonical brand names and the lowercase variants that map to them.
/// Variants of three characters or fewer only match the whole string.
const BRAND_TABLE: &[(&str, &[&str])] = &[
    ("Samsung", &["samsung"]),
    ("Xiaomi", &["xiaomi", "redmi", "poco"]),
    ("Google", &["google", "pixel"]),
    ("OnePlus", &["oneplus"]),
    ("OPPO", &["oppo"]),
    ("vivo", &["vivo", "iqoo"]),
    ("realme", &["realme"]),
    ("Huawei", &["huawei"]),
    ("Honor", &["honor"]),
    ("Motorola", &["motorola", "moto"]),
    ("Sony", &["sony"]),
    ("Nokia", &["nokia", "hmd"]),
    ("LG", &["lge", "lg"]),
    ("ASUS", &["asus"]),
    ("Nothing", &["nothing"]),
    ("ZTE", &["zte", "nubia"]),
    ("Lenovo", &["lenovo"]),
    ("Fairphone", &["fairphone"]),
    ("TCL", &["tcl", "alcatel"]),
];

struct SuffixRule {
    name: &'static str,
    pattern: Regex,
}

fn suffix_rules() -> &'static [SuffixRule] {
    static RULES: OnceLock<Vec<SuffixRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            // SM-S918B -> SM-S918
            ("hyphenated_region_letter", r"^([A-Z]{1,4}-[A-Z]?\d{3,4})[A-Z]$"),
            // 2201116SG -> 2201116
            ("digit_code_letters", r"^(\d{4,}[0-9A-Z]*?\d)[A-Z]{1,3}$"),
            // XT2125_4 -> XT2125
            ("short_underscore_segment", r"^(.+)_[A-Za-z0-9]{1,2}$"),
            // moto g power-VZW -> moto g power
            ("carrier_suffix", r"^(.+?)[-_][A-Za-z]{1,3}$"),
        ]
        .into_iter()
        .filter_map(|(name, src)| match Regex::new(src) {
            Ok(pattern) => Some(SuffixRule { name, pattern }),
            Err(e) => {
                tracing::error!("[Normalizer] Invalid suffix rule {}: {}", name, e);
                None
            },
        })
        .collect()
    })
}

/// Normalize raw OS-reported identifiers into a [`NormalizedDevice`].
pub fn normalize(
    model: &str,
    brand: &str,
    manufacturer: &str,
    fingerprint: &str,
) -> NormalizedDevice {
    let normalized_model = normalize_model(model);
    let normalized_brand = normalize_brand(brand, manufacturer);
    let normalized_id = grouping_key(&normalized_brand, &normalized_model);
    let hardware_id = hardware_id(fingerprint);
    let display_name = display_name(&normalized_brand, &normalized_model);

    NormalizedDevice {
        original_model: model.to_string(),
        normalized_model,
        normalized_brand,
        normalized_id,
        hardware_id,
        display_name,
    }
}

/// Convenience wrapper over [`normalize`].
pub fn normalize_raw(raw: &RawDeviceInfo) -> NormalizedDevice {
    normalize(&raw.model, &raw.brand, &raw.manufacturer, &raw.fingerprint)
}

/// Strip region/carrier suffixes. First matching rule wins.
pub fn normalize_model(model: &str) -> String {
    let trimmed = model.trim();
    for rule in suffix_rules() {
        if let Some(stripped) = rule.pattern.captures(trimmed).and_then(|c| c.get(1)) {
            let stripped = stripped.as_str().trim();
            if !stripped.is_empty() {
                tracing::trace!("[Normalizer] {} matched {} -> {}", rule.name, trimmed, stripped);
                return stripped.to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Map a brand (or, failing that, the manufacturer) to its canonical name.
pub fn normalize_brand(brand: &str, manufacturer: &str) -> String {
    if let Some(canonical) = lookup_brand(brand).or_else(|| lookup_brand(manufacturer)) {
        return canonical.to_string();
    }

    let fallback = [brand, manufacturer]
        .into_iter()
        .map(str::trim)
        .find(|s| !s.is_empty() && !s.eq_ignore_ascii_case("unknown"));
    match fallback {
        Some(name) => capitalize_first(name),
        None => "Unknown".to_string(),
    }
}

fn lookup_brand(raw: &str) -> Option<&'static str> {
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    BRAND_TABLE.iter().find_map(|(canonical, variants)| {
        variants
            .iter()
            .any(|v| if v.len() <= 3 { lower == *v } else { lower.contains(v) })
            .then_some(*canonical)
    })
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `brand_model`, lowercased, spaces/hyphens to `_`, limited to `[a-z0-9_]`.
pub fn grouping_key(brand: &str, model: &str) -> String {
    sanitize_id(&format!("{}_{}", brand, model))
}

fn sanitize_id(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

/// Stable per-hardware id from a `brand/product/device:version/...` fingerprint.
///
/// Fingerprints with fewer than three `/` segments fall back to a truncated
/// SHA-256 of the whole string.
pub fn hardware_id(fingerprint: &str) -> String {
    let segments: Vec<&str> = fingerprint.trim().split('/').collect();
    if segments.len() >= 3 {
        let id = sanitize_id(&format!("{}_{}", segments[0], segments[1]));
        if !id.trim_matches('_').is_empty() {
            return id;
        }
    }

    tracing::debug!("[Normalizer] Fingerprint has too few segments, hashing: {:?}", fingerprint);
    let digest = Sha256::digest(fingerprint.as_bytes());
    let hex: String = digest.iter().take(8).map(|b| format!("{:02x}", b)).collect();
    format!("fp_{}", hex)
}

fn display_name(brand: &str, model: &str) -> String {
    if model.to_lowercase().starts_with(&brand.to_lowercase()) {
        model.to_string()
    } else {
        format!("{} {}", brand, model)
    }
}

#[cfg(test)]
#[path = "normalizer_tests.rs"]
mod normalizer_tests;
