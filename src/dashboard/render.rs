use std::time::Duration;

use handlebars::Handlebars;
use reqwest::Url;
use serde::Serialize;

use super::fields::{VendorField, VendorFields};
use super::view_model::{FilterState, LoadStatus, Vendor, VendorViewModel};
use crate::error::AppError;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Warning, message: message.into() }
    }
}

#[derive(Serialize)]
struct OptionView<'a> {
    value: &'a str,
    selected: bool,
}

#[derive(Serialize)]
struct CardView {
    id: String,
    supplier: String,
    location: String,
    products: String,
    price: String,
    moq: String,
    gsm: String,
    usp: String,
}

#[derive(Serialize)]
struct DashboardPage<'a> {
    title: &'a str,
    notice: Option<&'a Notice>,
    error: Option<&'a str>,
    total: usize,
    filtered: usize,
    search: &'a str,
    clear_href: String,
    locations: Vec<OptionView<'a>>,
    customizations: Vec<OptionView<'a>>,
    cards: Vec<CardView>,
    debounce_ms: u64,
}

#[derive(Serialize)]
struct DetailView<'a> {
    id: String,
    supplier: &'a str,
    location: &'a str,
    products: &'a str,
    gsm: &'a str,
    coating: &'a str,
    dishes: &'a str,
    price: &'a str,
    capacity: &'a str,
    moq: &'a str,
    customization: &'a str,
    clients: &'a str,
    usp: &'a str,
}

#[derive(Serialize)]
struct DetailPage<'a> {
    title: &'a str,
    notice: Option<&'a Notice>,
    vendor: DetailView<'a>,
}

#[derive(Serialize)]
struct InputView<'a> {
    name: &'static str,
    label: &'static str,
    value: &'a str,
    required: bool,
    full_width: bool,
}

#[derive(Serialize)]
struct EditPage<'a> {
    title: &'a str,
    notice: Option<&'a Notice>,
    id: String,
    error: Option<&'a str>,
    inputs: Vec<InputView<'a>>,
}

#[derive(Serialize)]
struct MissingPage<'a> {
    title: &'a str,
    notice: Option<&'a Notice>,
    message: &'a str,
}

/// Projects the view model to HTML. Holds no vendor state of its own.
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, AppError> {
        let mut registry = Handlebars::new();
        registry.register_template_string("layout", include_str!("../../templates/layout.hbs"))?;
        registry.register_template_string("dashboard", include_str!("../../templates/dashboard.hbs"))?;
        registry.register_template_string("detail", include_str!("../../templates/detail.hbs"))?;
        registry.register_template_string("edit", include_str!("../../templates/edit.hbs"))?;
        registry.register_template_string("missing", include_str!("../../templates/missing.hbs"))?;
        Ok(Self { registry })
    }

    pub fn dashboard(
        &self,
        model: &VendorViewModel,
        filter: &FilterState,
        debounce: Duration,
        notice: Option<&Notice>,
    ) -> Result<String, AppError> {
        let visible = model.apply_filters(filter);
        let error = match model.status() {
            LoadStatus::Failed(message) => Some(message.as_str()),
            LoadStatus::Pending | LoadStatus::Ready => None,
        };

        let page = DashboardPage {
            title: "Vendors",
            notice,
            error,
            total: model.vendors().len(),
            filtered: visible.len(),
            search: &filter.search,
            clear_href: clear_search_href(filter),
            locations: options(model.locations(), &filter.location),
            customizations: options(model.customizations(), &filter.customization),
            cards: visible.into_iter().map(card_view).collect(),
            debounce_ms: u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX),
        };
        Ok(self.registry.render("dashboard", &page)?)
    }

    pub fn detail(&self, vendor: &Vendor, notice: Option<&Notice>) -> Result<String, AppError> {
        let fields = &vendor.fields;
        let page = DetailPage {
            title: or_default(&fields.supplier, "Unknown Vendor"),
            notice,
            vendor: DetailView {
                id: vendor.id.to_string(),
                supplier: or_default(&fields.supplier, "Unknown Vendor"),
                location: or_default(&fields.location, "Location not specified"),
                products: or_default(&fields.products, NOT_AVAILABLE),
                gsm: or_default(&fields.gsm, NOT_AVAILABLE),
                coating: or_default(&fields.coating, NOT_AVAILABLE),
                dishes: or_default(&fields.dishes, NOT_AVAILABLE),
                price: or_default(&fields.price, "Contact for pricing"),
                capacity: or_default(&fields.capacity, NOT_AVAILABLE),
                moq: or_default(&fields.moq, NOT_AVAILABLE),
                customization: or_default(&fields.customization, NOT_AVAILABLE),
                clients: or_default(&fields.clients, NOT_AVAILABLE),
                usp: or_default(&fields.usp, NOT_AVAILABLE),
            },
        };
        Ok(self.registry.render("detail", &page)?)
    }

    /// Edit form prefilled with `fields`, which may differ from the stored
    /// vendor when a submission is being re-shown.
    pub fn edit(
        &self,
        vendor: &Vendor,
        fields: &VendorFields,
        error: Option<&str>,
    ) -> Result<String, AppError> {
        let page = EditPage {
            title: "Edit Vendor",
            notice: None,
            id: vendor.id.to_string(),
            error,
            inputs: VendorField::ALL
                .iter()
                .map(|field| InputView {
                    name: field.key(),
                    label: field.label(),
                    value: fields.get(*field),
                    required: *field == VendorField::Supplier,
                    full_width: *field == VendorField::Supplier,
                })
                .collect(),
        };
        Ok(self.registry.render("edit", &page)?)
    }

    pub fn missing(&self, message: &str) -> Result<String, AppError> {
        let page = MissingPage {
            title: "Vendor not found",
            notice: None,
            message,
        };
        Ok(self.registry.render("missing", &page)?)
    }
}

fn card_view(vendor: &Vendor) -> CardView {
    let fields = &vendor.fields;
    CardView {
        id: vendor.id.to_string(),
        supplier: or_default(&fields.supplier, "Unknown Vendor").to_string(),
        location: truncated_or_na(&fields.location, 30),
        products: or_default(&fields.products, NOT_AVAILABLE).to_string(),
        price: truncated_or_na(&fields.price, 15),
        moq: truncated_or_na(&fields.moq, 15),
        gsm: truncated_or_na(&fields.gsm, 15),
        usp: or_default(&fields.usp, "View details for more info").to_string(),
    }
}

fn options<'a>(values: &'a [String], selected: &str) -> Vec<OptionView<'a>> {
    values
        .iter()
        .map(|value| OptionView {
            value,
            selected: value == selected,
        })
        .collect()
}

/// Link that drops the search text but keeps the facet selections.
fn clear_search_href(filter: &FilterState) -> String {
    let mut url = match Url::parse("http://dashboard.local/") {
        Ok(url) => url,
        Err(_) => return "/".to_string(),
    };
    {
        let mut query = url.query_pairs_mut();
        if !filter.location.is_empty() {
            query.append_pair("location", &filter.location);
        }
        if !filter.customization.is_empty() {
            query.append_pair("customization", &filter.customization);
        }
    }
    match url.query() {
        Some(query) if !query.is_empty() => format!("/?{}", query),
        _ => "/".to_string(),
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

fn truncated_or_na(value: &str, max_chars: usize) -> String {
    if value.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        truncate(value, max_chars)
    }
}

/// Cuts `text` to `max_chars` characters, marking the cut with `...`.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RowRecord, Sheet, SheetCollection};

    fn model_with(rows: &[&[(&str, &str)]]) -> VendorViewModel {
        let rows = rows
            .iter()
            .map(|pairs| {
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<RowRecord>()
            })
            .collect();
        let mut model = VendorViewModel::new();
        model.populate(&SheetCollection::new(vec![Sheet {
            name: "Sheet1".into(),
            rows,
        }]));
        model
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("short", 15), "short");
        assert_eq!(truncate("exactly-fifteen", 15), "exactly-fifteen");
        assert_eq!(truncate("₹10,000 - ₹50,000 per lakh", 15), "₹10,000 - ₹50,0...");
    }

    #[test]
    fn cards_follow_filtered_order_with_counts() {
        let model = model_with(&[
            &[("Supplier / Brand", "Acme"), ("GSM", "200")],
            &[("Supplier / Brand", "Bagasse Co")],
            &[("Supplier / Brand", "Acme West")],
        ]);
        let renderer = Renderer::new().unwrap();
        let filter = FilterState {
            search: "acme".into(),
            ..Default::default()
        };
        let html = renderer
            .dashboard(&model, &filter, Duration::from_millis(300), None)
            .unwrap();

        let first = html.find("<h3>Acme</h3>").unwrap();
        let second = html.find("<h3>Acme West</h3>").unwrap();
        assert!(first < second);
        assert!(!html.contains("Bagasse Co"));
        assert!(html.contains(r#"<strong id="filteredCount">2</strong>"#));
        assert!(html.contains(r#"<strong id="totalVendors">3</strong>"#));
        assert!(html.contains("300"));
    }

    #[test]
    fn empty_results_state() {
        let model = model_with(&[&[("Supplier / Brand", "Acme")]]);
        let renderer = Renderer::new().unwrap();
        let filter = FilterState {
            search: "nothing matches".into(),
            ..Default::default()
        };
        let html = renderer
            .dashboard(&model, &filter, Duration::from_millis(300), None)
            .unwrap();
        assert!(html.contains("No vendors found"));
    }

    #[test]
    fn failed_load_renders_retry_panel() {
        let mut model = VendorViewModel::new();
        model.mark_failed("Vendor API answered HTTP 500");
        let renderer = Renderer::new().unwrap();
        let html = renderer
            .dashboard(&model, &FilterState::default(), Duration::from_millis(300), None)
            .unwrap();
        assert!(html.contains("Error loading data"));
        assert!(html.contains(r#"href="/?reload=1">Retry</a>"#));
        assert!(!html.contains("cardsContainer"));
    }

    #[test]
    fn vendor_text_is_escaped() {
        let model = model_with(&[&[("Supplier / Brand", "<script>alert(1)</script>")]]);
        let renderer = Renderer::new().unwrap();
        let html = renderer
            .dashboard(&model, &FilterState::default(), Duration::from_millis(300), None)
            .unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn detail_shows_edited_values() {
        let mut model = model_with(&[&[("Supplier / Brand", "Acme"), ("GSM", "200")]]);
        let id = model.vendors()[0].id;
        let fields = VendorFields {
            supplier: "Acme Packaging".into(),
            gsm: "250".into(),
            coating: "PLA".into(),
            usp: "Compostable".into(),
            ..Default::default()
        };
        let vendor = model.apply_edit(&id, &fields).unwrap().clone();

        let renderer = Renderer::new().unwrap();
        let html = renderer.detail(&vendor, None).unwrap();
        assert!(html.contains("<h2>Acme Packaging</h2>"));
        assert!(html.contains(r#"data-field="gsm">250</div>"#));
        assert!(html.contains(r#"data-field="coating">PLA</div>"#));
        assert!(html.contains(r#"data-field="usp">Compostable</div>"#));
        assert!(html.contains("Contact for pricing"));
    }

    #[test]
    fn detail_carries_notice() {
        let model = model_with(&[&[("Supplier / Brand", "Acme")]]);
        let renderer = Renderer::new().unwrap();
        let notice = Notice::warning("Changes saved locally!");
        let html = renderer.detail(&model.vendors()[0], Some(&notice)).unwrap();
        assert!(html.contains(r#"class="notification warning""#));
        assert!(html.contains("Changes saved locally!"));
    }

    #[test]
    fn edit_form_marks_supplier_required() {
        let model = model_with(&[&[("Supplier / Brand", "Acme"), ("MOQ", "5000")]]);
        let vendor = &model.vendors()[0];
        let renderer = Renderer::new().unwrap();
        let html = renderer.edit(vendor, &vendor.fields, Some("Supplier is required")).unwrap();
        assert!(html.contains(r#"name="supplier" value="Acme" required>"#));
        assert!(html.contains(r#"name="moq" value="5000">"#));
        assert!(html.contains("Supplier is required"));
        assert!(html.contains(&format!(r#"action="/vendors/{}""#, vendor.id)));
    }

    #[test]
    fn save_button_leaves_submission_to_the_form() {
        let model = model_with(&[&[("Supplier / Brand", "Acme")]]);
        let vendor = &model.vendors()[0];
        let renderer = Renderer::new().unwrap();
        let html = renderer.edit(vendor, &vendor.fields, None).unwrap();
        assert!(html.contains(r#"<button type="submit" class="button btn-save">Save Changes</button>"#));
        assert!(html.contains("onsubmit="));
        assert!(!html.contains("form.submit()"));
    }

    #[test]
    fn clear_search_keeps_facets() {
        let filter = FilterState {
            search: "acme".into(),
            location: "Pune".into(),
            customization: "Logo only".into(),
        };
        assert_eq!(clear_search_href(&filter), "/?location=Pune&customization=Logo+only");
        assert_eq!(clear_search_href(&FilterState::default()), "/");
    }
}
