//! Tag classifier — pure predicates over a way/area's tag map, no state.

use std::collections::HashMap;

pub type Tags = HashMap<String, String>;

const TRAIL_HIGHWAYS: &[&str] = &["path", "footway", "track", "trail", "pedestrian", "steps"];
const BAD_FOOTWAYS: &[&str] = &["sidewalk", "crossing"];

/// True iff `tags` describes a way admissible as a hiking trail.
pub fn is_trail(tags: &Tags) -> bool {
    let Some(highway) = tags.get("highway") else {
        return false;
    };
    if !TRAIL_HIGHWAYS.contains(&highway.as_str()) {
        return false;
    }
    match tags.get("footway") {
        Some(footway) => !BAD_FOOTWAYS.contains(&footway.as_str()),
        None => true,
    }
}

/// True iff `tags` describes a way or area a car could access — making its
/// nodes candidate trailheads.
pub fn is_drivable(tags: &Tags) -> bool {
    if let Some(highway) = tags.get("highway") {
        if tags.get("motor_vehicle").map(String::as_str) == Some("no") {
            return false;
        }
        if tags.get("access").map(String::as_str) == Some("no") {
            return false;
        }
        let accessible = matches!(
            tags.get("access").map(String::as_str),
            Some("yes") | Some("permissive") | None
        );
        if highway == "service"
            && tags.get("service").map(String::as_str) != Some("parking_aisle")
            && !accessible
        {
            return false;
        }
        !is_trail(tags) && accessible
    } else {
        tags.get("amenity").map(String::as_str) == Some("parking")
    }
}

/// True iff `tags` describes an area that should be considered when naming
/// a network via park-overlap resolution.
pub fn is_park_area(tags: &Tags) -> bool {
    matches!(
        tags.get("leisure").map(String::as_str),
        Some("park") | Some("nature_reserve")
    ) || matches!(
        tags.get("boundary").map(String::as_str),
        Some("national_park") | Some("protected_area")
    )
}

/// Resolve a display name for a park area lacking an explicit `name` tag.
///
/// Precedence: explicit `name`, then `landuse=conservation` (qualified by
/// `owner` when present), then `ownership=municipal` plus `owner`,
/// otherwise the literal fallback `"Unnamed park"`.
pub fn park_name(tags: &Tags) -> String {
    if let Some(name) = tags.get("name") {
        if !name.is_empty() {
            return name.clone();
        }
    }
    if tags.get("landuse").map(String::as_str) == Some("conservation") {
        return match tags.get("owner") {
            Some(owner) if !owner.is_empty() => format!("{owner} Conservation Area"),
            _ => "Conservation Area".to_string(),
        };
    }
    if tags.get("ownership").map(String::as_str) == Some("municipal") {
        if let Some(owner) = tags.get("owner") {
            if !owner.is_empty() {
                return format!("{owner} Park");
            }
        }
    }
    "Unnamed park".to_string()
}
