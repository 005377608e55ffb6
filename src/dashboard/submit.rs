use thiserror::Error;

use super::fields::VendorFields;
use super::view_model::{Vendor, VendorId};
use super::Dashboard;
use crate::models::UpdateRequest;

/// How far an edit got. The local copy is updated in both cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitState {
    Persisted,
    LocalOnly { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    pub vendor: Vendor,
    pub state: CommitState,
}

impl EditOutcome {
    pub fn is_persisted(&self) -> bool {
        self.state == CommitState::Persisted
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("Supplier / Brand is required")]
    MissingSupplier,
    #[error("Vendor {0} is no longer loaded")]
    StaleVendor(VendorId),
    /// The list was reloaded while saving, the vendor is gone from it and the
    /// store did not take the edit.
    #[error("Vendor {0} was reloaded away while saving; the edit was not kept")]
    Discarded(VendorId),
}

impl Dashboard {
    /// Applies an edit locally and tries to persist it through the proxy.
    ///
    /// A reload while the request is in flight moves the edit to the same row
    /// of the new load, matched by sheet and key value.
    pub async fn submit_edit(
        &self,
        id: &VendorId,
        fields: VendorFields,
    ) -> Result<EditOutcome, EditError> {
        if fields.supplier.trim().is_empty() {
            return Err(EditError::MissingSupplier);
        }

        let (sheet, request) = {
            let model = self.model.read();
            let vendor = model.get(id).ok_or(EditError::StaleVendor(*id))?;
            let request = UpdateRequest {
                original_supplier: vendor.original_supplier().to_string(),
                update_data: fields.to_columns(),
                sheet_name: Some(vendor.sheet.clone()),
            };
            (vendor.sheet.clone(), request)
        };

        let state = match self.api.update_vendor(&request).await {
            Ok(_) => CommitState::Persisted,
            Err(e) => {
                tracing::warn!(
                    "Update of '{}' not persisted, keeping local copy: {}",
                    request.original_supplier,
                    e
                );
                CommitState::LocalOnly {
                    reason: e.to_string(),
                }
            }
        };

        let mut model = self.model.write();
        let target = if model.get(id).is_some() {
            Some(*id)
        } else {
            let mut relocated = model.find(&sheet, &request.original_supplier);
            if relocated.is_none() && state == CommitState::Persisted {
                // The reload may already carry the new key.
                relocated = model.find(&sheet, &fields.supplier);
            }
            if let Some(new_id) = relocated {
                tracing::info!("Vendor {} was reloaded as {} while saving", id, new_id);
            }
            relocated
        };

        let vendor = match target {
            Some(target) => model
                .apply_edit(&target, &fields)
                .ok_or(EditError::StaleVendor(target))?
                .clone(),
            None => match state {
                CommitState::Persisted => {
                    tracing::warn!("Vendor {} left the list while saving; showing the stored edit", id);
                    Vendor {
                        id: *id,
                        sheet,
                        fields,
                        original: request.update_data,
                    }
                }
                CommitState::LocalOnly { .. } => {
                    tracing::error!(
                        "Edit of '{}' lost: not persisted and no longer in the list",
                        request.original_supplier
                    );
                    return Err(EditError::Discarded(*id));
                }
            },
        };

        tracing::info!("Edited vendor {} ({:?})", vendor.id, state);
        Ok(EditOutcome { vendor, state })
    }
}
