//! US state → destination region mapping.

use crate::domain::{NormalizedShipment, Region};

/// `(postal code, full name, region)`. Codes not listed here resolve to nothing.
pub const STATE_REGIONS: &[(&str, &str, Region)] = &[
    ("CT", "Connecticut", Region::Northeast),
    ("DC", "District of Columbia", Region::Northeast),
    ("DE", "Delaware", Region::Northeast),
    ("MA", "Massachusetts", Region::Northeast),
    ("MD", "Maryland", Region::Northeast),
    ("ME", "Maine", Region::Northeast),
    ("NH", "New Hampshire", Region::Northeast),
    ("NJ", "New Jersey", Region::Northeast),
    ("NY", "New York", Region::Northeast),
    ("PA", "Pennsylvania", Region::Northeast),
    ("RI", "Rhode Island", Region::Northeast),
    ("VT", "Vermont", Region::Northeast),
    ("AL", "Alabama", Region::Southeast),
    ("AR", "Arkansas", Region::Southeast),
    ("FL", "Florida", Region::Southeast),
    ("GA", "Georgia", Region::Southeast),
    ("KY", "Kentucky", Region::Southeast),
    ("LA", "Louisiana", Region::Southeast),
    ("MS", "Mississippi", Region::Southeast),
    ("NC", "North Carolina", Region::Southeast),
    ("SC", "South Carolina", Region::Southeast),
    ("TN", "Tennessee", Region::Southeast),
    ("VA", "Virginia", Region::Southeast),
    ("WV", "West Virginia", Region::Southeast),
    ("IA", "Iowa", Region::Midwest),
    ("IL", "Illinois", Region::Midwest),
    ("IN", "Indiana", Region::Midwest),
    ("KS", "Kansas", Region::Midwest),
    ("MI", "Michigan", Region::Midwest),
    ("MN", "Minnesota", Region::Midwest),
    ("MO", "Missouri", Region::Midwest),
    ("ND", "North Dakota", Region::Midwest),
    ("NE", "Nebraska", Region::Midwest),
    ("OH", "Ohio", Region::Midwest),
    ("SD", "South Dakota", Region::Midwest),
    ("WI", "Wisconsin", Region::Midwest),
    ("AZ", "Arizona", Region::Southwest),
    ("NM", "New Mexico", Region::Southwest),
    ("OK", "Oklahoma", Region::Southwest),
    ("TX", "Texas", Region::Southwest),
    ("AK", "Alaska", Region::West),
    ("CA", "California", Region::West),
    ("CO", "Colorado", Region::West),
    ("HI", "Hawaii", Region::West),
    ("ID", "Idaho", Region::West),
    ("MT", "Montana", Region::West),
    ("NV", "Nevada", Region::West),
    ("OR", "Oregon", Region::West),
    ("UT", "Utah", Region::West),
    ("WA", "Washington", Region::West),
    ("WY", "Wyoming", Region::West),
];

/// Region for a state code or full state name (case-insensitive).
pub fn region_for_state(state: &str) -> Option<Region> {
    let state = state.trim();
    STATE_REGIONS
        .iter()
        .find(|(code, name, _)| code.eq_ignore_ascii_case(state) || name.eq_ignore_ascii_case(state))
        .map(|(_, _, region)| *region)
}

/// Last two-letter token of an address that is a known state code,
/// e.g. `"1 Harbor Way, Long Beach, CA 90802"` → `CA`.
pub fn state_from_address(address: &str) -> Option<&'static str> {
    address
        .split(|ch: char| !ch.is_ascii_alphabetic())
        .rev()
        .filter(|token| token.len() == 2 && token.chars().all(|ch| ch.is_ascii_uppercase()))
        .find_map(|token| {
            STATE_REGIONS
                .iter()
                .find(|(code, _, _)| *code == token)
                .map(|(code, _, _)| *code)
        })
}

/// Explicit state field first, then the destination address; otherwise `Other`.
pub fn resolve_region(shipment: &NormalizedShipment) -> Region {
    shipment
        .destination_state
        .as_deref()
        .and_then(region_for_state)
        .or_else(|| {
            shipment
                .destination_address
                .as_deref()
                .and_then(state_from_address)
                .and_then(region_for_state)
        })
        .unwrap_or(Region::Other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_covers_fifty_states_and_dc_once() {
        let codes: HashSet<&str> = STATE_REGIONS.iter().map(|(code, _, _)| *code).collect();
        assert_eq!(codes.len(), 51);
        assert_eq!(STATE_REGIONS.len(), 51);
        assert!(STATE_REGIONS.iter().all(|(_, _, region)| *region != Region::Other));
    }

    #[test]
    fn every_region_except_other_is_reachable() {
        for region in Region::ALL.iter().filter(|r| **r != Region::Other) {
            assert!(STATE_REGIONS.iter().any(|(_, _, r)| r == region), "{region} unreachable");
        }
    }

    #[test]
    fn codes_and_names_resolve_case_insensitively() {
        assert_eq!(region_for_state("ca"), Some(Region::West));
        assert_eq!(region_for_state(" New Jersey "), Some(Region::Northeast));
        assert_eq!(region_for_state("ON"), None);
    }

    #[test]
    fn address_extraction_prefers_trailing_state_token() {
        assert_eq!(state_from_address("1 Harbor Way, Long Beach, CA 90802"), Some("CA"));
        assert_eq!(state_from_address("Suite 4, IN Building, Houston TX 77002"), Some("TX"));
        assert_eq!(state_from_address("Rotterdam, Netherlands"), None);
        assert_eq!(state_from_address("co Unit B, miami fl"), None);
    }

    #[test]
    fn resolution_falls_back_to_other() {
        let shipment = NormalizedShipment {
            destination_state: Some("Bavaria".to_owned()),
            destination_address: Some("Savannah, GA 31401".to_owned()),
            ..NormalizedShipment::unknown()
        };
        assert_eq!(resolve_region(&shipment), Region::Southeast);
        assert_eq!(resolve_region(&NormalizedShipment::unknown()), Region::Other);
    }
}
