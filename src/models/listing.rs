use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// ListingSummary: one entry of `itemSummaries` in a search page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingSummary {
    pub item_id: String,
    pub title: String,
    pub condition: String,
    pub price: Option<Amount>,
    pub item_creation_date: String,
    pub item_web_url: String,
    /// Per-item URL used for the detail lookup.
    pub item_href: String,
    pub image: Option<Image>,
}

impl ListingSummary {
    pub fn price_value(&self) -> &str {
        self.price.as_ref().map(|p| p.value.as_str()).unwrap_or("")
    }

    pub fn currency(&self) -> &str {
        self.price.as_ref().map(|p| p.currency.as_str()).unwrap_or("")
    }

    pub fn image_url(&self) -> &str {
        self.image.as_ref().map(|i| i.image_url.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Amount {
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Image {
    pub image_url: String,
}

// ---------------------------------------------------------------------------
// ListingDetail: response of the per-item lookup
// ---------------------------------------------------------------------------

/// Extended attributes of one listing. `Default` is the empty detail used
/// when a lookup fails.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingDetail {
    pub short_description: String,
    #[serde(deserialize_with = "string_or_number")]
    pub seller_item_revision: String,
    pub item_id: String,
    pub color: String,
    pub size: String,
    pub material: String,
    pub seller: Option<Seller>,
}

impl ListingDetail {
    pub fn seller_username(&self) -> &str {
        self.seller.as_ref().map(|s| s.username.as_str()).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        *self == ListingDetail::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Seller {
    pub username: String,
}

// ---------------------------------------------------------------------------
// SearchPage: one page of the search endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchPage {
    pub item_summaries: Vec<ListingSummary>,
    pub total: usize,
}

/// Accept `"12.50"`, `12.5` or `null` for fields the API is loose about.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}
