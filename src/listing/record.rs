//! Assembly of field results into a property record

use serde::{Deserialize, Serialize};

use crate::listing::document::PageDocument;
use crate::listing::fields::{self, FieldResult};

/// Latitude and longitude as they appear in the directions link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

/// Structured data of one listing
///
/// `None` marks a field that could not be extracted. Fields are independent
/// of one another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// Listing name (usually the address)
    pub name: Option<String>,

    /// Rent summary text
    pub cost_text: Option<String>,

    /// Bed and bath tokens
    pub rooms: Option<Vec<String>>,

    /// Parking tokens
    pub parking: Option<Vec<String>>,

    /// Description paragraph
    pub desc: Option<String>,

    pub property_type: Option<String>,

    pub date_available: Option<String>,

    pub bond: Option<String>,

    /// Additional features, empty when the listing has none
    #[serde(default)]
    pub property_features: Vec<String>,

    #[serde(default)]
    pub coordinates: Coordinates,
}

/// Whether a field is expected on every listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// Missing means the page did not have the expected structure
    Required,
    /// Missing is normal for some listings
    Optional,
}

/// What went wrong with a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum IssueKind {
    Absent,
    Malformed(String),
}

/// An unexpected outcome of one field extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub requirement: Requirement,
    pub kind: IssueKind,
}

impl FieldIssue {
    /// Whether this issue makes the record count as failed
    pub fn is_fatal(&self) -> bool {
        self.requirement == Requirement::Required
    }
}

/// A record together with the issues met while extracting it
#[derive(Debug, Clone, Default)]
pub struct RecordOutcome {
    pub record: PropertyRecord,
    pub issues: Vec<FieldIssue>,
}

impl RecordOutcome {
    /// Whether every required field was extracted
    pub fn is_complete(&self) -> bool {
        !self.issues.iter().any(FieldIssue::is_fatal)
    }

    fn take<T>(
        &mut self,
        field: &'static str,
        requirement: Requirement,
        result: FieldResult<T>,
    ) -> Option<T> {
        let kind = match result {
            FieldResult::Present(value) => return Some(value),
            FieldResult::Absent if requirement == Requirement::Optional => return None,
            FieldResult::Absent => IssueKind::Absent,
            FieldResult::Malformed(reason) => IssueKind::Malformed(reason),
        };
        self.issues.push(FieldIssue {
            field,
            requirement,
            kind,
        });
        None
    }
}

/// Run every field extractor against a listing page
pub fn extract_record(doc: &PageDocument) -> RecordOutcome {
    use Requirement::{Optional, Required};

    let mut outcome = RecordOutcome::default();

    let name = outcome.take("name", Required, fields::extract_name(doc));
    let cost_text = outcome.take("cost_text", Required, fields::extract_cost_text(doc));
    let rooms = outcome.take("rooms", Required, fields::extract_rooms(doc));
    let parking = outcome.take("parking", Required, fields::extract_parking(doc));
    let desc = outcome.take("desc", Required, fields::extract_description(doc));
    let property_type = outcome.take("property_type", Required, fields::extract_property_type(doc));
    let strip = outcome
        .take("summary_strip", Required, fields::extract_summary_strip(doc))
        .unwrap_or_default();
    let property_features = outcome
        .take("property_features", Optional, fields::extract_property_features(doc))
        .unwrap_or_default();
    let coordinates = outcome
        .take("coordinates", Optional, fields::extract_coordinates(doc))
        .unwrap_or_default();

    outcome.record = PropertyRecord {
        name,
        cost_text,
        rooms,
        parking,
        desc,
        property_type,
        date_available: strip.date_available,
        bond: strip.bond,
        property_features,
        coordinates,
    };
    outcome
}
