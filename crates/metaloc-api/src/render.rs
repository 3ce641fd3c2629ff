//! Result cards as HTML fragments or terminal text.
//!
//! Every API-supplied value goes through [`escape_html`] before it is placed
//! in HTML output.

use std::fmt::Write as _;

use crate::types::SearchLocation;

const PLACEHOLDER_NAME: &str = "Unnamed Location";

#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// The results container: one card per location, or a placeholder when empty.
#[must_use]
pub fn results_html(locations: &[SearchLocation]) -> String {
    if locations.is_empty() {
        return r#"<p class="placeholder">No locations found.</p>"#.to_string();
    }

    let mut html = String::from(r#"<div class="results-list">"#);
    for (i, location) in locations.iter().enumerate() {
        html.push_str(&card_html(location, i + 1));
    }
    html.push_str("</div>");
    html
}

/// One location card; `index` is 1-based.
#[must_use]
pub fn card_html(location: &SearchLocation, index: usize) -> String {
    let name = location.name.as_deref().unwrap_or(PLACEHOLDER_NAME);

    let mut html = String::from(r#"<div class="location-card"><div class="location-header">"#);
    let _ = write!(
        html,
        r#"<span class="location-number">#{index}</span><h3>{}</h3>"#,
        escape_html(name)
    );
    if let Some(miles) = location.distance_miles() {
        let _ = write!(html, r#"<span class="distance">{miles:.2} miles</span>"#);
    }
    html.push_str(r#"</div><div class="location-details">"#);

    let lines: Vec<String> = location
        .address_lines()
        .iter()
        .map(|l| escape_html(l))
        .collect();
    if !lines.is_empty() {
        let _ = write!(html, r#"<p class="address">{}</p>"#, lines.join("<br>"));
    }

    if let Some(phone) = &location.phone {
        let _ = write!(html, r#"<p class="phone">Phone: {}</p>"#, escape_html(phone));
    }

    if let Some(email) = &location.email {
        let email = escape_html(email);
        let _ = write!(
            html,
            r#"<p class="email">Email: <a href="mailto:{email}">{email}</a></p>"#
        );
    }

    if let Some(link) = &location.link {
        let _ = write!(
            html,
            r#"<p class="website"><a href="{}" target="_blank">Visit Website</a></p>"#,
            escape_html(link)
        );
    }

    if let Some((lat, lng)) = location.coordinates() {
        let _ = write!(
            html,
            r#"<p class="coordinates">Coordinates: {}, {}</p>"#,
            escape_html(lat),
            escape_html(lng)
        );
    }

    html.push_str("</div></div>");
    html
}

/// Plain-text rendering of one card for terminal output.
#[must_use]
pub fn card_text(location: &SearchLocation, index: usize) -> String {
    let name = location.name.as_deref().unwrap_or(PLACEHOLDER_NAME);
    let mut text = format!("#{index} {name}");
    if let Some(miles) = location.distance_miles() {
        let _ = write!(text, " ({miles:.2} miles)");
    }
    for line in location.address_lines() {
        let _ = write!(text, "\n    {line}");
    }
    if let Some(phone) = &location.phone {
        let _ = write!(text, "\n    Phone: {phone}");
    }
    if let Some(email) = &location.email {
        let _ = write!(text, "\n    Email: {email}");
    }
    if let Some(link) = &location.link {
        let _ = write!(text, "\n    Website: {link}");
    }
    if let Some((lat, lng)) = location.coordinates() {
        let _ = write!(text, "\n    Coordinates: {lat}, {lng}");
    }
    text
}
