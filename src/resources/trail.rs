//! Trails

use crate::core::resource::Resource;
use crate::core::validation::{FieldRule, RuleSet};

/// Accepted values of `difficulty`
pub const DIFFICULTIES: &[&str] = &["Easy", "Moderate", "Hard", "Expert"];

const RULES: &[FieldRule] = &[
    FieldRule::text("name", "Name"),
    FieldRule::text("location", "Location"),
    FieldRule::bounded_number("distance_miles", "Distance (miles)", Some(0.0), None),
    FieldRule::one_of("difficulty", "Difficulty", DIFFICULTIES),
    FieldRule::text("type", "Type"),
    FieldRule::number("elevation_gain_ft", "Elevation gain (ft)"),
    FieldRule::bounded_number("rating", "Rating", Some(0.0), Some(5.0)).optional(),
];

/// Hiking trails at `/trails`
pub struct Trails;

impl Resource for Trails {
    const PATH: &'static str = "trails";
    const COLLECTION: &'static str = "trails";
    const SINGULAR: &'static str = "trail";
    const PLURAL: &'static str = "trails";
    const TITLE: &'static str = "Trail";
    const TAG: &'static str = "Trails";
    const DESCRIPTION: &'static str = "Hiking trails with distance, difficulty and elevation";

    fn rules() -> RuleSet {
        RuleSet::new(RULES)
    }
}
