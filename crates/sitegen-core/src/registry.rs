//! In-memory site registry.
//!
//! [`SiteRegistry`] is a cheaply clonable handle around a lock-protected
//! map. The binary constructs one and hands clones to the API state and to
//! every generation stream; there is no process-wide instance.
//!
//! Identifiers are handed out in creation order, so iterating the
//! [`BTreeMap`] yields records in insertion order.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use sitegen_types::{Site, SiteId, SiteStatus};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::SiteError;

/// Input for [`SiteRegistry::create`]. Validated by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSite {
    /// The prompt the site is generated from.
    pub prompt: String,
    /// Optional display title.
    pub title: Option<String>,
}

#[derive(Debug)]
struct RegistryInner {
    next_id: SiteId,
    sites: BTreeMap<SiteId, Site>,
    /// Last fully delivered document per site.
    documents: BTreeMap<SiteId, Arc<str>>,
}

/// Shared, in-memory store of site records.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl SiteRegistry {
    /// Create an empty registry whose first site gets id 1.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner {
                next_id: SiteId::FIRST,
                sites: BTreeMap::new(),
                documents: BTreeMap::new(),
            })),
        }
    }

    /// Record a new site with status `created`.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::IdExhausted`] once every `u64` identifier has
    /// been handed out.
    pub async fn create(&self, new_site: NewSite) -> Result<Site, SiteError> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        let next_id = id.next().ok_or(SiteError::IdExhausted)?;

        let now = Utc::now();
        let site = Site {
            id,
            title: new_site.title,
            prompt: new_site.prompt,
            status: SiteStatus::Created,
            created_at: now,
            updated_at: now,
            html_url: None,
            screenshot_url: None,
        };

        inner.sites.insert(id, site.clone());
        inner.next_id = next_id;

        info!(site_id = %id, "site created");
        Ok(site)
    }

    /// Fetch a single site.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::NotFound`] when `id` was never assigned.
    pub async fn get(&self, id: SiteId) -> Result<Site, SiteError> {
        self.inner
            .read()
            .await
            .sites
            .get(&id)
            .cloned()
            .ok_or(SiteError::NotFound(id))
    }

    /// All sites in creation order.
    pub async fn list(&self) -> Vec<Site> {
        self.inner.read().await.sites.values().cloned().collect()
    }

    /// Number of recorded sites.
    pub async fn len(&self) -> usize {
        self.inner.read().await.sites.len()
    }

    /// Whether no site has been recorded yet.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.sites.is_empty()
    }

    /// Mark a site as being generated.
    ///
    /// A site that is already `generating` or `ready` keeps its status;
    /// regenerating a ready site never moves it backwards.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::NotFound`] for an unknown id.
    pub async fn begin_generation(&self, id: SiteId) -> Result<Site, SiteError> {
        let mut inner = self.inner.write().await;
        let site = inner.sites.get_mut(&id).ok_or(SiteError::NotFound(id))?;
        if site.status == SiteStatus::Created {
            advance(site, SiteStatus::Generating)?;
        }
        Ok(site.clone())
    }

    /// Mark a site as ready and keep the delivered document.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::NotFound`] for an unknown id.
    pub async fn complete_generation(
        &self,
        id: SiteId,
        document: Arc<str>,
    ) -> Result<Site, SiteError> {
        let mut inner = self.inner.write().await;
        let site = inner.sites.get_mut(&id).ok_or(SiteError::NotFound(id))?;
        let regenerated = site.is_ready();
        advance(site, SiteStatus::Ready)?;
        site.html_url = Some(Site::html_path(id));
        let site = site.clone();
        inner.documents.insert(id, document);

        info!(site_id = %id, regenerated, "site ready");
        Ok(site)
    }

    /// The last fully delivered document of a site, if any. Only a
    /// `ready` site has one.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::NotFound`] for an unknown id.
    pub async fn document(&self, id: SiteId) -> Result<Option<Arc<str>>, SiteError> {
        let inner = self.inner.read().await;
        let site = inner.sites.get(&id).ok_or(SiteError::NotFound(id))?;
        if !site.is_ready() {
            return Ok(None);
        }
        Ok(inner.documents.get(&id).cloned())
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Move `site` to `to`, refusing backward transitions.
fn advance(site: &mut Site, to: SiteStatus) -> Result<(), SiteError> {
    let from = site.status;
    if !from.can_advance_to(to) {
        return Err(SiteError::InvalidTransition {
            id: site.id,
            from,
            to,
        });
    }
    site.status = to;
    site.updated_at = Utc::now();
    debug!(site_id = %site.id, %from, %to, "site status advanced");
    Ok(())
}
