use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============ Upstream Outcomes ============

/// Outcome of a single call to the places API.
///
/// Failures are absorbed at the client boundary, but they are kept apart
/// from a genuinely empty answer here so callers can log the difference.
/// A run treats both the same way through [`Lookup::unwrap_or_empty`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// The upstream answered and the payload parsed.
    Found(T),
    /// Transport error, timeout, bad status or malformed body.
    Unavailable { reason: String },
}

impl<T: Default> Lookup<T> {
    /// Returns the payload, or the empty value when the call failed.
    pub fn unwrap_or_empty(self) -> T {
        match self {
            Lookup::Found(value) => value,
            Lookup::Unavailable { .. } => T::default(),
        }
    }
}

impl<T> Lookup<T> {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Lookup::Unavailable { .. })
    }
}

// ============ Search ============

/// One result of a text search. Only the identifier is relied upon; the
/// remaining upstream fields are carried along untouched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceStub {
    /// Opaque upstream identifier.
    pub place_id: String,
    /// Everything else the search returned for this place.
    #[serde(flatten)]
    pub raw: serde_json::Map<String, Value>,
}

impl PlaceStub {
    pub fn new(place_id: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            raw: serde_json::Map::new(),
        }
    }
}

/// One page of text-search results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub results: Vec<PlaceStub>,
    /// Continuation cursor; `None` ends the query's pagination.
    pub next_page_token: Option<String>,
}

/// Raw text-search envelope as returned by the places API.
#[derive(Debug, Deserialize)]
pub struct TextSearchResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

// ============ Details ============

/// Enriched fields for one place. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PlaceDetail {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "formatted_phone_number")]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default, rename = "formatted_address")]
    pub address: Option<String>,
    #[serde(default, rename = "url")]
    pub maps_url: Option<String>,
}

impl PlaceDetail {
    /// The phone number, if the upstream returned a non-empty one.
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref().filter(|phone| !phone.is_empty())
    }
}

/// Raw details envelope as returned by the places API.
#[derive(Debug, Deserialize)]
pub struct PlaceDetailsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub result: Option<PlaceDetail>,
}

// ============ Output ============

/// One qualifying business, as emitted to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LeadRecord {
    pub category: String,
    pub name: Option<String>,
    pub phone: String,
    pub website: Option<String>,
    pub address: Option<String>,
    #[serde(rename = "Maps")]
    pub maps_url: Option<String>,
}

impl LeadRecord {
    /// Builds a lead from a detail lookup. Returns `None` when the place has
    /// no phone number, which disqualifies it.
    pub fn from_detail(category: &str, detail: PlaceDetail) -> Option<Self> {
        let phone = detail.phone()?.to_string();
        Some(Self {
            category: category.to_string(),
            name: detail.name,
            phone,
            website: detail.website,
            address: detail.address,
            maps_url: detail.maps_url,
        })
    }
}

/// One line of the lead stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum LeadEvent {
    Lead(LeadRecord),
    /// Percentage of expanded queries fully drained, 0-100.
    Progress(u8),
}

impl LeadEvent {
    /// Serializes the event as one newline-terminated JSON line.
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

// ============ Requests ============

/// Body of a lead generation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lead_serializes_with_wire_keys() {
        let event = LeadEvent::Lead(LeadRecord {
            category: "Medical & Clinics".to_string(),
            name: Some("Acme Dental".to_string()),
            phone: "+351 21 000 0000".to_string(),
            website: None,
            address: Some("Rua Augusta 1, Lisboa".to_string()),
            maps_url: Some("https://maps.google.com/?cid=1".to_string()),
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "lead",
                "data": {
                    "Category": "Medical & Clinics",
                    "Name": "Acme Dental",
                    "Phone": "+351 21 000 0000",
                    "Website": null,
                    "Address": "Rua Augusta 1, Lisboa",
                    "Maps": "https://maps.google.com/?cid=1"
                }
            })
        );
    }

    #[test]
    fn test_progress_line_is_newline_terminated() {
        let line = LeadEvent::Progress(40).to_line().unwrap();
        assert_eq!(line, "{\"type\":\"progress\",\"data\":40}\n");
    }

    #[test]
    fn test_detail_parses_upstream_field_names() {
        let detail: PlaceDetail = serde_json::from_value(json!({
            "name": "Acme Dental",
            "formatted_phone_number": "21 000 0000",
            "formatted_address": "Rua Augusta 1",
            "url": "https://maps.google.com/?cid=1"
        }))
        .unwrap();

        assert_eq!(detail.phone(), Some("21 000 0000"));
        assert_eq!(detail.website, None);
        assert_eq!(detail.maps_url.as_deref(), Some("https://maps.google.com/?cid=1"));
    }

    #[test]
    fn test_empty_phone_disqualifies_lead() {
        let detail = PlaceDetail {
            name: Some("No Phone Ltd".to_string()),
            phone: Some(String::new()),
            ..PlaceDetail::default()
        };
        assert!(LeadRecord::from_detail("Automotive", detail).is_none());
    }

    #[test]
    fn test_stub_keeps_raw_fields() {
        let stub: PlaceStub = serde_json::from_value(json!({
            "place_id": "abc",
            "name": "Cafe Lisboa",
            "rating": 4.5
        }))
        .unwrap();

        assert_eq!(stub.place_id, "abc");
        assert_eq!(stub.raw.get("name"), Some(&json!("Cafe Lisboa")));
        assert!(!stub.raw.contains_key("place_id"));
    }

    #[test]
    fn test_unavailable_lookup_collapses_to_empty() {
        let lookup: Lookup<SearchPage> = Lookup::Unavailable {
            reason: "timeout".to_string(),
        };
        assert!(lookup.is_unavailable());
        assert_eq!(lookup.unwrap_or_empty(), SearchPage::default());
    }
}
