//! Core multi-tenant types for Campus.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Numeric tenant (school) identifier allocated by the tenant directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub i64);

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried with every tenant-scoped operation.
///
/// Services and stores take it as their first argument; it is only ever
/// built from a verified session claim (or from a freshly resolved tenant
/// during registration), never from a client-supplied parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    pub tenant_id: TenantId,
    pub slug: String,
}

impl TenantContext {
    pub fn new<S: Into<String>>(tenant_id: i64, slug: S) -> Self {
        Self {
            tenant_id: TenantId(tenant_id),
            slug: slug.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.tenant_id.0
    }
}

/// Branding attributes a school admin can set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branding {
    pub logo_url: Option<String>,
    pub background_url: Option<String>,
    pub theme: Option<String>,
    pub logo_text: Option<String>,
    pub background_color: Option<String>,
}

/// Partial branding update; `None` leaves the stored value untouched. Blank
/// strings count as absent.
///
/// Accepts the settings-form keys (`logo`, `background`, `logoText`,
/// `backgroundColor`) as well as the stored names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandingUpdate {
    #[serde(default, alias = "logo", deserialize_with = "blank_as_none")]
    pub logo_url: Option<String>,
    #[serde(default, alias = "background", deserialize_with = "blank_as_none")]
    pub background_url: Option<String>,
    #[serde(default, alias = "theme_template", deserialize_with = "blank_as_none")]
    pub theme: Option<String>,
    #[serde(default, alias = "logoText", deserialize_with = "blank_as_none")]
    pub logo_text: Option<String>,
    #[serde(default, alias = "backgroundColor", deserialize_with = "blank_as_none")]
    pub background_color: Option<String>,
}

fn blank_as_none<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(d)?;
    Ok(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}

impl BrandingUpdate {
    pub fn is_empty(&self) -> bool {
        self.logo_url.is_none()
            && self.background_url.is_none()
            && self.theme.is_none()
            && self.logo_text.is_none()
            && self.background_color.is_none()
    }

    pub fn apply(self, branding: &mut Branding) {
        if let Some(v) = self.logo_url {
            branding.logo_url = Some(v);
        }
        if let Some(v) = self.background_url {
            branding.background_url = Some(v);
        }
        if let Some(v) = self.theme {
            branding.theme = Some(v);
        }
        if let Some(v) = self.logo_text {
            branding.logo_text = Some(v);
        }
        if let Some(v) = self.background_color {
            branding.background_color = Some(v);
        }
    }
}

/// An onboarded school.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub slug: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub branding: Branding,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    pub fn context(&self) -> TenantContext {
        TenantContext {
            tenant_id: self.id,
            slug: self.slug.clone(),
        }
    }
}

/// Input for tenant creation; the slug is derived by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTenant {
    pub name: String,
    pub kind: String,
}

/// Lowercase the name, collapse whitespace runs into `-` and drop anything
/// that is not an ASCII letter, digit or `-`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.trim().chars() {
        if ch.is_whitespace() {
            pending_dash = !out.is_empty();
            continue;
        }
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() || ch == '-' {
            if pending_dash {
                out.push('-');
                pending_dash = false;
            }
            out.push(ch);
        }
    }
    out
}

/// Final tenant slug: `slugify(name)` followed by `-<id>`.
pub fn derive_slug(name: &str, id: TenantId) -> String {
    let base = slugify(name);
    if base.is_empty() {
        format!("school-{}", id.0)
    } else {
        format!("{base}-{}", id.0)
    }
}
