use serde::{Deserialize, Serialize};

pub use crate::models::KEY_COLUMN;
use crate::models::RowRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorField {
    Supplier,
    Location,
    Products,
    Gsm,
    Coating,
    Dishes,
    Price,
    Capacity,
    Moq,
    Customization,
    Clients,
    Usp,
}

impl VendorField {
    pub const ALL: [VendorField; 12] = [
        VendorField::Supplier,
        VendorField::Location,
        VendorField::Products,
        VendorField::Gsm,
        VendorField::Coating,
        VendorField::Dishes,
        VendorField::Price,
        VendorField::Capacity,
        VendorField::Moq,
        VendorField::Customization,
        VendorField::Clients,
        VendorField::Usp,
    ];

    /// Spreadsheet column backing this field.
    pub fn column(self) -> &'static str {
        match self {
            VendorField::Supplier => KEY_COLUMN,
            VendorField::Location => "Location (HQ / Plants)",
            VendorField::Products => "Product Portfolio",
            VendorField::Gsm => "GSM",
            VendorField::Coating => "Food-Grade Coating",
            VendorField::Dishes => "Food Dishes Best Suited",
            VendorField::Price => "Indicative Price Range",
            VendorField::Capacity => "Production capacities (Per month)",
            VendorField::Moq => "MOQ",
            VendorField::Customization => "Customization / Printing",
            VendorField::Clients => "Existing Clients / Segments",
            VendorField::Usp => "USP / Differentiation",
        }
    }

    /// Form input name.
    pub fn key(self) -> &'static str {
        match self {
            VendorField::Supplier => "supplier",
            VendorField::Location => "location",
            VendorField::Products => "products",
            VendorField::Gsm => "gsm",
            VendorField::Coating => "coating",
            VendorField::Dishes => "dishes",
            VendorField::Price => "price",
            VendorField::Capacity => "capacity",
            VendorField::Moq => "moq",
            VendorField::Customization => "customization",
            VendorField::Clients => "clients",
            VendorField::Usp => "usp",
        }
    }

    /// Label shown next to the edit input.
    pub fn label(self) -> &'static str {
        match self {
            VendorField::Capacity => "Production Capacity",
            VendorField::Clients => "Existing Clients",
            other => other.column(),
        }
    }
}

/// The semantic fields of a vendor, each empty when the column is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorFields {
    pub supplier: String,
    pub location: String,
    pub products: String,
    pub gsm: String,
    pub coating: String,
    pub dishes: String,
    pub price: String,
    pub capacity: String,
    pub moq: String,
    pub customization: String,
    pub clients: String,
    pub usp: String,
}

impl VendorFields {
    pub fn from_row(row: &RowRecord) -> Self {
        let mut fields = VendorFields::default();
        for field in VendorField::ALL {
            if let Some(value) = row.get(field.column()) {
                *fields.get_mut(field) = value.clone();
            }
        }
        fields
    }

    pub fn get(&self, field: VendorField) -> &str {
        match field {
            VendorField::Supplier => &self.supplier,
            VendorField::Location => &self.location,
            VendorField::Products => &self.products,
            VendorField::Gsm => &self.gsm,
            VendorField::Coating => &self.coating,
            VendorField::Dishes => &self.dishes,
            VendorField::Price => &self.price,
            VendorField::Capacity => &self.capacity,
            VendorField::Moq => &self.moq,
            VendorField::Customization => &self.customization,
            VendorField::Clients => &self.clients,
            VendorField::Usp => &self.usp,
        }
    }

    pub fn get_mut(&mut self, field: VendorField) -> &mut String {
        match field {
            VendorField::Supplier => &mut self.supplier,
            VendorField::Location => &mut self.location,
            VendorField::Products => &mut self.products,
            VendorField::Gsm => &mut self.gsm,
            VendorField::Coating => &mut self.coating,
            VendorField::Dishes => &mut self.dishes,
            VendorField::Price => &mut self.price,
            VendorField::Capacity => &mut self.capacity,
            VendorField::Moq => &mut self.moq,
            VendorField::Customization => &mut self.customization,
            VendorField::Clients => &mut self.clients,
            VendorField::Usp => &mut self.usp,
        }
    }

    /// Column-keyed form of every field, as sent in `updateData`.
    pub fn to_columns(&self) -> RowRecord {
        VendorField::ALL
            .iter()
            .map(|field| (field.column().to_string(), self.get(*field).to_string()))
            .collect()
    }

    /// All field values joined by spaces; what free-text search matches against.
    pub fn joined(&self) -> String {
        VendorField::ALL
            .iter()
            .map(|field| self.get(*field))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
