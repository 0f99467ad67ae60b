//! Listing page markup shared by the pipeline tests

pub fn features(items: &[&str]) -> String {
    let spans: String = items
        .iter()
        .map(|item| {
            format!(
                r#"<div class="css-1dtnjt5"><span data-testid="property-features-text-container">{}</span></div>"#,
                item
            )
        })
        .collect();
    format!(
        r#"<div data-testid="property-features"><div class="css-18biwo">{}</div></div>"#,
        spans
    )
}

const HEADING: &str = r#"<h1 class="css-164r41r">4/12 Example Street, Carlton VIC 3053</h1>"#;

fn summary() -> String {
    format!(
        r#"<div data-testid="listing-details__summary">
            <div data-testid="listing-details__summary-title">$650 per week</div>
            {}
        </div>
        <div data-testid="listing-details__description">
            <p>Bright apartment<br>Close to trams</p>
            <p>Contact the agent for inspections.</p>
        </div>
        <div data-testid="listing-summary-property-type"><span class="css-in3yi3">Apartment / Unit / Flat</span></div>
        <div data-testid="strip-content-list">
            <ul data-testid="listing-summary-strip">
                <li class="css-1h4fv4k">Date Available: <strong>Mon, 2 June 2025</strong></li>
                <li class="css-1h4fv4k"><strong>$2,825</strong> Bond</li>
                <li class="css-1h4fv4k">Inspections by appointment</li>
            </ul>
        </div>"#,
        features(&["2 Beds", "1 Bath", "1 Parking"])
    )
}

const EXTRAS: &str = r#"
    <div data-testid="listing-details__additional-features">
        <div data-testid="expander-wrapper">
            <div class="noscript-expander-content css-1mnayj9">
                <ul class="css-4ewd2m">
                    <li class="css-vajaaq"> Air conditioning </li>
                    <li class="css-vajaaq">Dishwasher</li>
                </ul>
            </div>
        </div>
    </div>
    <div data-testid="listing-details__map">
        <div class="css-yjd8ae">
            <div class="listing-details__location-map--default css-79elbk">
                <ul class="css-1vlxv67">
                    <li class="css-1g3iwis"><a class="css-1aszeu9" href="https://www.google.com/maps/@?api=1&amp;map_action=pano">Street view</a></li>
                    <li class="css-1g3iwis"><a class="css-1aszeu9" href="https://www.google.com/maps/dir/?api=1&amp;destination=-37.81,144.96">Directions</a></li>
                </ul>
            </div>
        </div>
    </div>"#;

fn page(parts: &[&str]) -> String {
    format!("<!DOCTYPE html><html><head><title>Listing</title></head><body><main>{}</main></body></html>", parts.concat())
}

/// A listing page carrying every field
pub fn listing_page() -> String {
    page(&[HEADING, &summary(), EXTRAS])
}

/// A listing page without features or map
pub fn listing_page_without_extras() -> String {
    page(&[HEADING, &summary()])
}

/// A listing page whose heading markup changed
pub fn listing_page_without_heading() -> String {
    page(&[r#"<h1 class="css-new">Renamed heading</h1>"#, &summary(), EXTRAS])
}
