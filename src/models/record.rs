use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Column order of every exported and loaded file.
pub const COLUMNS: [&str; 16] = [
    "Title",
    "ShortDescription",
    "Condition",
    "SellerItemRevision",
    "ItemId",
    "Price",
    "Currency",
    "Color",
    "Size",
    "Material",
    "Brand",
    "SellerUsername",
    "ItemWebUrl",
    "ItemCreationDate",
    "ItemHref",
    "ImageURL",
];

// ---------------------------------------------------------------------------
// MergedRecord: one row of the tabular export
// ---------------------------------------------------------------------------

/// A summary, its detail and the query brand flattened into the fixed
/// schema. Field order matches [`COLUMNS`]; missing values are empty strings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct MergedRecord {
    pub title: String,
    pub short_description: String,
    pub condition: String,
    pub seller_item_revision: String,
    pub item_id: String,
    pub price: String,
    pub currency: String,
    pub color: String,
    pub size: String,
    pub material: String,
    pub brand: String,
    pub seller_username: String,
    pub item_web_url: String,
    pub item_creation_date: String,
    pub item_href: String,
    #[serde(rename = "ImageURL")]
    pub image_url: String,
}

impl MergedRecord {
    /// Values in [`COLUMNS`] order.
    pub fn values(&self) -> [&str; 16] {
        [
            &self.title,
            &self.short_description,
            &self.condition,
            &self.seller_item_revision,
            &self.item_id,
            &self.price,
            &self.currency,
            &self.color,
            &self.size,
            &self.material,
            &self.brand,
            &self.seller_username,
            &self.item_web_url,
            &self.item_creation_date,
            &self.item_href,
            &self.image_url,
        ]
    }
}

// ---------------------------------------------------------------------------
// ListingRow: a loaded dataset row with typed columns
// ---------------------------------------------------------------------------

/// Typed view of a [`MergedRecord`]; the raw cells stay in `record`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRow {
    /// `None` when the Price cell is empty.
    pub price: Option<f64>,
    /// `None` when the ItemCreationDate cell is empty.
    pub created: Option<NaiveDateTime>,
    pub record: MergedRecord,
}

impl ListingRow {
    pub fn brand(&self) -> &str {
        &self.record.brand
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn currency(&self) -> &str {
        &self.record.currency
    }
}
