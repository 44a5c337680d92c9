//! Notable place detection and gallery responses.
//!
//! A place request needs both a viewing verb and something that names a
//! place: a category word, a literal place name, or an alias keyword.
//! Alias matches additionally require the viewing verb to sit on either
//! side of the keyword in the message, so "I like the beach weather"
//! does not trip the probe.

/// Image catalog keyed by canonical place name.
pub const NOTABLE_PLACES: &[(&str, &[&str])] = &[
    (
        "amungan elementary school",
        &[
            "Amungan_elementary_school.jpg",
            "Amungan_elementary_school2.jpg",
        ],
    ),
    ("amungan market", &["Amungan_Market.jpg"]),
    (
        "amungan national high school",
        &[
            "Amungan_national_highschool.jpg",
            "amungan_national_highschool2.jpg",
            "amungan_national_highschool3.jpg",
        ],
    ),
    (
        "barangay hall",
        &["barangay_hall.jpg", "barangay_hall2.jpg", "barangay_hall3.jpg"],
    ),
    (
        "barangay hall outside",
        &["barangay_hall_outside.jpg", "barangay_hall_outside2.jpg"],
    ),
    ("barangay health center", &["barangay_health_center.jpg"]),
    (
        "beach resort",
        &[
            "beach_resort.jpg",
            "beach_resort1.jpg",
            "beach_resort2.jpg",
            "beach_resort3.jpg",
        ],
    ),
    (
        "plaza mercado",
        &[
            "plaza_mercado.jpg",
            "plaza_mercado2.jpg",
            "plaza_mercado3.jpg",
            "plaza_mercado4.jpg",
            "plaza_mercado5.jpg",
        ],
    ),
];

/// Alias keywords per place.
const PLACE_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "amungan elementary school",
        &["elementary school", "elementary", "grade school"],
    ),
    (
        "amungan market",
        &["market", "palengke", "marketplace", "public market"],
    ),
    (
        "amungan national high school",
        &["high school", "secondary school", "national high school"],
    ),
    (
        "barangay hall",
        &["hall", "barangay office", "government office"],
    ),
    (
        "barangay hall outside",
        &["hall outside", "outside hall", "hall exterior", "barangay hall exterior"],
    ),
    (
        "barangay health center",
        &["health center", "clinic", "medical center", "health station"],
    ),
    (
        "plaza mercado",
        &["plaza", "mercado", "town plaza", "town square", "park"],
    ),
    ("beach resort", &["resort", "beach resort", "beach"]),
];

const VIEW_KEYWORDS: &[&str] = &[
    "show", "see", "view", "picture", "photo", "image", "itsura", "patingin", "look at",
];

const PLACE_RELATED: &[&str] = &[
    "place", "location", "area", "site", "spot", "landmark", "building", "school", "market",
    "hall", "plaza", "center", "beach", "resort", "beach resort",
];

const ALL_PLACES_PHRASES: &[&str] = &[
    "all places",
    "all the places",
    "mga lugar",
    "tourist spots",
    "notable places",
    "places here",
    "places in amungan",
];

/// Base path the web client prefixes onto catalog filenames.
pub const IMAGE_BASE_DIR: &str = "static/images";

/// Outcome of the place probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceQuery {
    /// Every catalogued place.
    All,
    /// One specific place, by canonical name.
    Specific(&'static str),
}

/// Check whether the message asks to see a place at all.
pub fn is_place_request(message: &str) -> bool {
    let message_lower = message.to_lowercase();

    let has_view_word = VIEW_KEYWORDS.iter().any(|w| message_lower.contains(w));
    if !has_view_word {
        return false;
    }

    if PLACE_RELATED.iter().any(|w| message_lower.contains(w)) {
        return true;
    }

    if NOTABLE_PLACES
        .iter()
        .any(|(place, _)| message_lower.contains(place))
    {
        return true;
    }

    PLACE_KEYWORDS
        .iter()
        .any(|(_, keywords)| keywords.iter().any(|k| message_lower.contains(k)))
}

/// Alias keyword match gated on a viewing verb on either side of it.
fn keyword_with_view_verb(message_lower: &str, keyword: &str) -> bool {
    let Some(keyword_at) = message_lower.find(keyword) else {
        return false;
    };

    VIEW_KEYWORDS.iter().any(|verb| {
        message_lower[..keyword_at].contains(verb)
            || message_lower[keyword_at + keyword.len()..].contains(verb)
    })
}

/// Resolve which place (or all of them) the message asks for.
///
/// Callers check [`is_place_request`] first; a `None` here means the
/// message mentioned place-ish words without naming anything we have.
pub fn detect_place(message: &str) -> Option<PlaceQuery> {
    let message_lower = message.to_lowercase();

    if ALL_PLACES_PHRASES.iter().any(|p| message_lower.contains(p)) {
        return Some(PlaceQuery::All);
    }

    // Literal place names win over aliases.
    for (place, _) in NOTABLE_PLACES {
        if message_lower.contains(place) {
            return Some(PlaceQuery::Specific(place));
        }
    }

    for (place, keywords) in PLACE_KEYWORDS {
        for keyword in *keywords {
            if keyword_with_view_verb(&message_lower, keyword) {
                return Some(PlaceQuery::Specific(place));
            }
        }
    }

    None
}

fn description_for(place: &str) -> &'static str {
    match place {
        "amungan elementary school" => {
            "Here's Amungan Elementary School, one of the primary educational institutions in Barangay Amungan where young students begin their educational journey."
        }
        "amungan market" => {
            "This is the Amungan Market, a vibrant hub of local commerce where residents buy fresh produce, goods, and other daily necessities."
        }
        "amungan national high school" => {
            "Here's Amungan National High School, which provides secondary education to the youth of Barangay Amungan and nearby areas."
        }
        "barangay hall" => {
            "This is the Barangay Hall of Amungan, the center of local governance where barangay officials work and community services are provided."
        }
        "barangay hall outside" => {
            "Here's the exterior view of the Barangay Hall of Amungan, showing the building's facade and surroundings."
        }
        "barangay health center" => {
            "This is the Barangay Health Center, which provides basic healthcare services, consultations, and health programs to Amungan residents."
        }
        "plaza mercado" => {
            "Here's Plaza Mercado, a public space in Amungan where community gatherings, events, and recreational activities take place."
        }
        "beach resort" => "Here's one of the beach resorts here in Barangay Amungan.",
        _ => "Here's a view of this notable place in Barangay Amungan.",
    }
}

/// A place reply: text plus the image paths the client should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceResponse {
    pub text: String,
    pub image_paths: Vec<String>,
}

fn image_paths_for(images: &[&str], count: usize) -> Vec<String> {
    images
        .iter()
        .take(count)
        .map(|img| format!("{}/{}", IMAGE_BASE_DIR, img))
        .collect()
}

/// Build the reply for one specific place, with up to two views.
pub fn place_response(place: &'static str) -> Option<PlaceResponse> {
    let images = NOTABLE_PLACES
        .iter()
        .find(|(name, _)| *name == place)
        .map(|(_, images)| *images)?;

    let count = images.len().min(2);
    let image_paths = image_paths_for(images, count);

    let mut text = description_for(place).to_string();
    if image_paths.len() > 1 {
        text.push_str(" I've included a couple of different views for you to see.");
    }

    Some(PlaceResponse { text, image_paths })
}

/// Build the gallery reply listing every place with one view each.
pub fn all_places_response() -> PlaceResponse {
    let mut text = String::from(
        "Here are the notable places in Barangay Amungan. Ask about any of them to see more views.",
    );
    let mut image_paths = Vec::new();

    for (place, images) in NOTABLE_PLACES {
        text.push_str(&format!("\n- {}", title_case(place)));
        image_paths.extend(image_paths_for(images, 1));
    }

    PlaceResponse { text, image_paths }
}

fn title_case(place: &str) -> String {
    place
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_view_verb() {
        assert!(is_place_request("Can you show me the barangay hall?"));
        assert!(!is_place_request("The barangay hall is open today"));
    }

    #[test]
    fn test_literal_name_wins() {
        let detected = detect_place("I want to see the plaza mercado now");
        assert_eq!(detected, Some(PlaceQuery::Specific("plaza mercado")));
    }

    #[test]
    fn test_alias_gated_on_verb() {
        let detected = detect_place("patingin ng palengke");
        assert_eq!(detected, Some(PlaceQuery::Specific("amungan market")));
        assert_eq!(detect_place("the palengke is busy"), None);
    }

    #[test]
    fn test_all_places_phrase() {
        assert_eq!(
            detect_place("show me all places in the barangay"),
            Some(PlaceQuery::All)
        );
    }

    #[test]
    fn test_specific_response_caps_at_two_images() {
        let response = place_response("plaza mercado").unwrap();
        assert_eq!(response.image_paths.len(), 2);
        assert!(response.image_paths[0].starts_with("static/images/"));
    }

    #[test]
    fn test_all_places_response_lists_everything() {
        let response = all_places_response();
        assert_eq!(response.image_paths.len(), NOTABLE_PLACES.len());
        assert!(response.text.contains("Plaza Mercado"));
    }
}
