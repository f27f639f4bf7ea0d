use campus_auth::SessionClaim;
use campus_core::{bail_campus, BrandingUpdate, CampusError, CampusResult, StoreError};
use tracing::info;

use crate::services::types::{ensure_admin, ensure_slug, StoreHandle};

use super::SchoolProfile;

pub struct SchoolsService {
    pub store: StoreHandle,
    pub asset_base_url: String,
}

impl SchoolsService {
    pub fn new(store: StoreHandle, asset_base_url: impl Into<String>) -> Self {
        Self {
            store,
            asset_base_url: asset_base_url.into(),
        }
    }

    pub async fn profile(&self, slug: &str) -> CampusResult<SchoolProfile> {
        let tenant = self
            .store
            .run(self.store.store().resolve_by_slug(slug))
            .await
            .map_err(not_found_as_school)?;
        Ok(SchoolProfile::from_tenant(tenant, &self.asset_base_url))
    }

    pub async fn update_branding(
        &self,
        claim: &SessionClaim,
        slug: &str,
        update: BrandingUpdate,
    ) -> CampusResult<SchoolProfile> {
        ensure_slug(claim, slug)?;
        ensure_admin(claim)?;
        if update.is_empty() {
            bail_campus!(bad_request, "No fields to update");
        }
        let ctx = claim.tenant();
        let tenant = self
            .store
            .run(self.store.store().update_branding(&ctx, update))
            .await?;
        info!(tenant_id = %tenant.id, "branding updated");
        Ok(SchoolProfile::from_tenant(tenant, &self.asset_base_url))
    }
}

fn not_found_as_school(err: anyhow::Error) -> anyhow::Error {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::NotFound(_)) => CampusError::not_found("School not found").into_anyhow(),
        _ => err,
    }
}
