//! # Field Extractors
//!
//! One pure function per listing field. Each takes a parsed listing page
//! and reports a tagged `FieldResult`, so a single rule can be run and
//! tested in isolation and no rule depends on another having run first.
//!
//! The selectors below are the structural markers of the listing detail
//! page: `data-testid` attributes where the site provides them, generated
//! class names where it does not.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Selector;
use url::Url;

use crate::listing::document::{PageDocument, find_in, joined_text, stripped_text, text_of};
use crate::listing::record::Coordinates;

/// Outcome of one field extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldResult<T> {
    /// The field was found and parsed
    Present(T),
    /// The element carrying the field is not on the page
    Absent,
    /// The element is there but its content does not have the expected shape
    Malformed(String),
}

impl<T> FieldResult<T> {
    /// Wrap an optional value, `None` meaning absent
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldResult::Present(v),
            None => FieldResult::Absent,
        }
    }

    /// The value if present
    pub fn into_option(self) -> Option<T> {
        match self {
            FieldResult::Present(v) => Some(v),
            _ => None,
        }
    }
}

/// Date available and bond, read from the listing summary strip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryStrip {
    pub date_available: Option<String>,
    pub bond: Option<String>,
}

fn selector(s: &str) -> Selector {
    Selector::parse(s).expect("valid field selector")
}

static NAME: LazyLock<Selector> = LazyLock::new(|| selector("h1.css-164r41r"));
static SUMMARY_TITLE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"div[data-testid="listing-details__summary-title"]"#));
static FEATURES: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"div[data-testid="property-features"]"#));
static FEATURE_TEXT: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"span[data-testid="property-features-text-container"]"#));
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| selector("p"));
static PROPERTY_TYPE: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"div[data-testid="listing-summary-property-type"]"#));
static PROPERTY_TYPE_TEXT: LazyLock<Selector> = LazyLock::new(|| selector("span.css-in3yi3"));
static STRIP_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"div[data-testid="strip-content-list"]"#));
static SUMMARY_STRIP: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"ul[data-testid="listing-summary-strip"]"#));
static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| selector("li"));
static STRONG: LazyLock<Selector> = LazyLock::new(|| selector("strong"));
static ADDITIONAL_FEATURES: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"div[data-testid="listing-details__additional-features"]"#));
static EXPANDER_WRAPPER: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"div[data-testid="expander-wrapper"]"#));
static EXPANDER_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| selector("div.noscript-expander-content.css-1mnayj9"));
static FEATURE_LIST: LazyLock<Selector> = LazyLock::new(|| selector("ul.css-4ewd2m"));
static FEATURE_ITEM: LazyLock<Selector> = LazyLock::new(|| selector("li.css-vajaaq"));
static MAP: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"div[data-testid="listing-details__map"]"#));
static MAP_WRAPPER: LazyLock<Selector> = LazyLock::new(|| selector("div.css-yjd8ae"));
static LOCATION_MAP: LazyLock<Selector> =
    LazyLock::new(|| selector("div.listing-details__location-map--default.css-79elbk"));
static MAP_LINKS: LazyLock<Selector> = LazyLock::new(|| selector("ul.css-1vlxv67"));
static MAP_LINK_ITEM: LazyLock<Selector> = LazyLock::new(|| selector("li.css-1g3iwis"));
static DIRECTIONS: LazyLock<Selector> = LazyLock::new(|| selector("a.css-1aszeu9"));

static ROOM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s[A-Za-z]+").expect("valid room regex"));
static PARKING_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+\s[A-Za-z]+").expect("valid parking regex"));

/// Listing name, from the primary heading
pub fn extract_name(doc: &PageDocument) -> FieldResult<String> {
    FieldResult::from_option(doc.find(&NAME).map(text_of))
}

/// Rent summary line, e.g. "$650 per week"
pub fn extract_cost_text(doc: &PageDocument) -> FieldResult<String> {
    FieldResult::from_option(doc.find(&SUMMARY_TITLE).map(text_of))
}

fn feature_texts(doc: &PageDocument) -> Option<Vec<String>> {
    let container = doc.find(&FEATURES)?;
    Some(container.select(&FEATURE_TEXT).map(text_of).collect())
}

fn feature_tokens(
    doc: &PageDocument,
    keep: impl Fn(&str) -> bool,
    token: &Regex,
) -> FieldResult<Vec<String>> {
    let Some(texts) = feature_texts(doc) else {
        return FieldResult::Absent;
    };

    let mut tokens = Vec::new();
    for text in texts.iter().filter(|t| keep(t.as_str())) {
        match token.find(text) {
            Some(m) => tokens.push(m.as_str().to_string()),
            None => return FieldResult::Malformed(format!("no count in feature {:?}", text)),
        }
    }
    FieldResult::Present(tokens)
}

/// Bed and bath counts, e.g. `["2 Beds", "1 Bath"]`
pub fn extract_rooms(doc: &PageDocument) -> FieldResult<Vec<String>> {
    feature_tokens(
        doc,
        |t| t.contains("Bed") || t.contains("Bath"),
        &ROOM_TOKEN,
    )
}

/// Parking spaces, e.g. `["1 Parking"]` or `["− Parking"]`
pub fn extract_parking(doc: &PageDocument) -> FieldResult<Vec<String>> {
    feature_tokens(doc, |t| t.contains("Parking"), &PARKING_TOKEN)
}

/// Listing description: the first paragraph, line breaks kept as newlines
pub fn extract_description(doc: &PageDocument) -> FieldResult<String> {
    FieldResult::from_option(doc.find(&PARAGRAPH).map(|p| joined_text(p, "\n")))
}

/// Property type, e.g. "Apartment / Unit / Flat"
pub fn extract_property_type(doc: &PageDocument) -> FieldResult<String> {
    let span = doc
        .find(&PROPERTY_TYPE)
        .and_then(|div| find_in(div, &PROPERTY_TYPE_TEXT));
    FieldResult::from_option(span.map(text_of))
}

/// Date available and bond from the summary strip
///
/// The strip itself is expected on every listing; either value may be
/// missing from it.
pub fn extract_summary_strip(doc: &PageDocument) -> FieldResult<SummaryStrip> {
    let Some(strip) = doc
        .find(&STRIP_CONTENT)
        .and_then(|div| find_in(div, &SUMMARY_STRIP))
    else {
        return FieldResult::Absent;
    };

    let mut summary = SummaryStrip::default();
    for li in strip.select(&LIST_ITEM) {
        let Some(strong) = find_in(li, &STRONG) else {
            continue;
        };
        let value = stripped_text(strong);
        let context = stripped_text(li);
        if context.contains("Date Available:") {
            summary.date_available = Some(value);
        } else if context.contains("Bond") {
            summary.bond = Some(value);
        }
    }
    FieldResult::Present(summary)
}

/// Additional property features, e.g. `["Air conditioning", "Dishwasher"]`
///
/// Absent when any level of the features expander is missing.
pub fn extract_property_features(doc: &PageDocument) -> FieldResult<Vec<String>> {
    let list = doc
        .find(&ADDITIONAL_FEATURES)
        .and_then(|div| find_in(div, &EXPANDER_WRAPPER))
        .and_then(|wrapper| find_in(wrapper, &EXPANDER_CONTENT))
        .and_then(|content| find_in(content, &FEATURE_LIST));

    FieldResult::from_option(
        list.map(|ul| ul.select(&FEATURE_ITEM).map(stripped_text).collect()),
    )
}

/// Latitude and longitude from the map's directions link
pub fn extract_coordinates(doc: &PageDocument) -> FieldResult<Coordinates> {
    let href = doc
        .find(&MAP)
        .and_then(|div| find_in(div, &MAP_WRAPPER))
        .and_then(|wrapper| find_in(wrapper, &LOCATION_MAP))
        .and_then(|map| find_in(map, &MAP_LINKS))
        .and_then(|ul| ul.select(&MAP_LINK_ITEM).nth(1))
        .and_then(|li| find_in(li, &DIRECTIONS))
        .and_then(|a| a.value().attr("href"));

    match href {
        Some(href) => parse_destination(href),
        None => FieldResult::Absent,
    }
}

/// Parse the `destination=<lat>,<lon>` query parameter of a directions link
pub fn parse_destination(href: &str) -> FieldResult<Coordinates> {
    let parsed = match Url::parse(href) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            match Url::parse("http://localhost/").and_then(|base| base.join(href)) {
                Ok(url) => url,
                Err(e) => return FieldResult::Malformed(format!("bad directions link: {}", e)),
            }
        }
        Err(e) => return FieldResult::Malformed(format!("bad directions link: {}", e)),
    };

    let Some(destination) = parsed
        .query_pairs()
        .find(|(key, value)| key == "destination" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
    else {
        return FieldResult::Absent;
    };

    let parts: Vec<&str> = destination.split(',').collect();
    match parts.as_slice() {
        [lat, lon] => FieldResult::Present(Coordinates {
            latitude: Some(lat.to_string()),
            longitude: Some(lon.to_string()),
        }),
        _ => FieldResult::Malformed(format!("destination {:?} is not a lat,lon pair", destination)),
    }
}
