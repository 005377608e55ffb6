use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::fields::{VendorField, VendorFields};
use crate::models::{RowRecord, SheetCollection};

/// Identifies a vendor within one load. Ids from an earlier load never resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VendorId {
    generation: u64,
    position: usize,
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.generation, self.position)
    }
}

impl FromStr for VendorId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (generation, position) = s
            .split_once('-')
            .ok_or_else(|| format!("malformed vendor id '{}'", s))?;
        Ok(VendorId {
            generation: generation.parse().map_err(|_| format!("malformed vendor id '{}'", s))?,
            position: position.parse().map_err(|_| format!("malformed vendor id '{}'", s))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vendor {
    pub id: VendorId,
    pub sheet: String,
    pub fields: VendorFields,
    /// The upstream row, kept so unedited columns survive an update.
    pub original: RowRecord,
}

impl Vendor {
    pub fn search_text(&self) -> String {
        self.fields.joined()
    }

    /// Key value the store knows this row by.
    pub fn original_supplier(&self) -> &str {
        self.original
            .get(VendorField::Supplier.column())
            .map(String::as_str)
            .unwrap_or(&self.fields.supplier)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterState {
    #[serde(rename = "q")]
    pub search: String,
    pub location: String,
    pub customization: String,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.location.is_empty() && self.customization.is_empty()
    }

    fn matches(&self, needle: &str, vendor: &Vendor) -> bool {
        if !needle.is_empty() && !vendor.search_text().to_lowercase().contains(needle) {
            return false;
        }
        if !self.location.is_empty() && !vendor.fields.location.contains(&self.location) {
            return false;
        }
        if !self.customization.is_empty() && vendor.fields.customization != self.customization {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Ready,
    Failed(String),
}

#[derive(Debug)]
pub struct VendorViewModel {
    generation: u64,
    status: LoadStatus,
    vendors: Vec<Vendor>,
    locations: Vec<String>,
    customizations: Vec<String>,
}

impl Default for VendorViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl VendorViewModel {
    pub fn new() -> Self {
        Self {
            generation: 0,
            status: LoadStatus::Pending,
            vendors: Vec::new(),
            locations: Vec::new(),
            customizations: Vec::new(),
        }
    }

    /// Replaces every vendor with the rows of `collection`.
    pub fn populate(&mut self, collection: &SheetCollection) -> usize {
        self.generation += 1;
        let generation = self.generation;

        self.vendors = collection
            .sheets
            .iter()
            .flat_map(|sheet| sheet.rows.iter().map(move |row| (sheet.name.as_str(), row)))
            .map(|(sheet, row)| (sheet, VendorFields::from_row(row), row))
            .filter(|(_, fields, _)| !fields.supplier.trim().is_empty())
            .enumerate()
            .map(|(position, (sheet, fields, row))| Vendor {
                id: VendorId { generation, position },
                sheet: sheet.to_string(),
                fields,
                original: row.clone(),
            })
            .collect();

        self.derive_facets();
        self.status = LoadStatus::Ready;
        self.vendors.len()
    }

    /// Records a failed load. Vendors from an earlier load stay addressable.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = LoadStatus::Failed(message.into());
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn customizations(&self) -> &[String] {
        &self.customizations
    }

    pub fn get(&self, id: &VendorId) -> Option<&Vendor> {
        if id.generation != self.generation {
            return None;
        }
        self.vendors.get(id.position).filter(|vendor| vendor.id == *id)
    }

    /// First vendor of the current load on `sheet` whose stored key is `supplier`.
    pub fn find(&self, sheet: &str, supplier: &str) -> Option<VendorId> {
        self.vendors
            .iter()
            .find(|vendor| vendor.sheet == sheet && vendor.original_supplier() == supplier)
            .map(|vendor| vendor.id)
    }

    pub fn apply_filters(&self, filter: &FilterState) -> Vec<&Vendor> {
        let needle = filter.search.to_lowercase();
        self.vendors
            .iter()
            .filter(|vendor| filter.matches(&needle, vendor))
            .collect()
    }

    /// Overwrites a vendor's fields and the matching columns of its row.
    pub fn apply_edit(&mut self, id: &VendorId, fields: &VendorFields) -> Option<&Vendor> {
        if self.get(id).is_none() {
            return None;
        }
        let vendor = &mut self.vendors[id.position];
        for field in VendorField::ALL {
            vendor
                .original
                .insert(field.column().to_string(), fields.get(field).to_string());
        }
        vendor.fields = fields.clone();

        self.derive_facets();
        self.vendors.get(id.position)
    }

    fn derive_facets(&mut self) {
        self.locations = self
            .vendors
            .iter()
            .filter_map(|vendor| vendor.fields.location.split('/').next())
            .map(str::trim)
            .filter(|location| !location.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        self.customizations = self
            .vendors
            .iter()
            .map(|vendor| vendor.fields.customization.as_str())
            .filter(|customization| !customization.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
    }
}
