use campus_auth::asset_url;
use campus_core::{Tenant, TenantId};
use serde::Serialize;

/// Public view of a school: name plus branding with absolute asset URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolProfile {
    pub id: TenantId,
    pub slug: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub logo_url: Option<String>,
    pub background_url: Option<String>,
    pub theme: Option<String>,
    pub logo_text: Option<String>,
    pub background_color: Option<String>,
}

impl SchoolProfile {
    pub fn from_tenant(tenant: Tenant, asset_base_url: &str) -> Self {
        Self {
            logo_url: asset_url(asset_base_url, tenant.branding.logo_url.as_deref()),
            background_url: asset_url(asset_base_url, tenant.branding.background_url.as_deref()),
            theme: tenant.branding.theme,
            logo_text: tenant.branding.logo_text,
            background_color: tenant.branding.background_color,
            id: tenant.id,
            slug: tenant.slug,
            name: tenant.name,
            kind: tenant.kind,
        }
    }
}
