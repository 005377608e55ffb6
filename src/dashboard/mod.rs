//! Vendor dashboard: an owned view model over the proxy's data, rendered to
//! HTML, with edits sent back through the proxy.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

pub mod client;
pub mod fields;
pub mod render;
pub mod submit;
pub mod view_model;

pub use client::{ClientError, ProxyClient, VendorApi};
pub use fields::{VendorField, VendorFields};
pub use render::{Notice, Renderer};
pub use submit::{CommitState, EditError, EditOutcome};
pub use view_model::{FilterState, LoadStatus, Vendor, VendorId, VendorViewModel};

use crate::error::AppError;

pub struct Dashboard {
    api: Arc<dyn VendorApi>,
    model: RwLock<VendorViewModel>,
    /// Held for the whole of a load so concurrent first requests share one.
    load_lock: tokio::sync::Mutex<()>,
    renderer: Renderer,
    search_debounce: Duration,
}

impl Dashboard {
    pub fn new(api: Arc<dyn VendorApi>, search_debounce: Duration) -> Result<Self, AppError> {
        Ok(Self {
            api,
            model: RwLock::new(VendorViewModel::new()),
            load_lock: tokio::sync::Mutex::new(()),
            renderer: Renderer::new()?,
            search_debounce,
        })
    }

    /// Fetches every sheet through the proxy and rebuilds the vendor list.
    pub async fn load(&self) -> Result<usize, ClientError> {
        let start = std::time::Instant::now();
        match self.api.fetch_sheets().await {
            Ok(collection) => {
                let count = self.model.write().populate(&collection);
                tracing::info!("Loaded {} vendors in {:?}", count, start.elapsed());
                Ok(count)
            }
            Err(e) => {
                tracing::error!("Failed to load vendors: {}", e);
                self.model.write().mark_failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Loads unless a load has already happened. A failed load is retried only
    /// when `force` is set.
    pub async fn ensure_loaded(&self, force: bool) {
        if !force && !self.is_pending() {
            return;
        }
        let _guard = self.load_lock.lock().await;
        if !force && !self.is_pending() {
            return;
        }
        // Failure is recorded in the model and shown as the error panel.
        let _ = self.load().await;
    }

    fn is_pending(&self) -> bool {
        matches!(self.model.read().status(), LoadStatus::Pending)
    }

    pub fn vendor(&self, id: &VendorId) -> Option<Vendor> {
        self.model.read().get(id).cloned()
    }

    pub fn render_dashboard(&self, filter: &FilterState) -> Result<String, AppError> {
        let model = self.model.read();
        self.renderer
            .dashboard(&model, filter, self.search_debounce, None)
    }

    pub fn render_detail(&self, id: &VendorId, notice: Option<&Notice>) -> Result<Option<String>, AppError> {
        match self.vendor(id) {
            Some(vendor) => self.renderer.detail(&vendor, notice).map(Some),
            None => Ok(None),
        }
    }

    /// Edit form for `id`, prefilled with `fields` or the stored values.
    pub fn render_edit(
        &self,
        id: &VendorId,
        fields: Option<&VendorFields>,
        error: Option<&str>,
    ) -> Result<Option<String>, AppError> {
        match self.vendor(id) {
            Some(vendor) => self
                .renderer
                .edit(&vendor, fields.unwrap_or(&vendor.fields), error)
                .map(Some),
            None => Ok(None),
        }
    }

    pub fn render_missing(&self, message: &str) -> Result<String, AppError> {
        self.renderer.missing(message)
    }

    /// The page shown after a submission, with the commit state as a notice.
    pub fn render_outcome(&self, outcome: &EditOutcome) -> Result<String, AppError> {
        let notice = match &outcome.state {
            CommitState::Persisted => Notice::success("Vendor updated successfully!"),
            CommitState::LocalOnly { .. } => Notice::warning(
                "Changes saved locally! To update Google Sheet, edit directly in the spreadsheet.",
            ),
        };
        self.renderer.detail(&outcome.vendor, Some(&notice))
    }
}
