//! Wildlife sightings

use crate::core::resource::Resource;
use crate::core::validation::{FieldRule, RuleSet};

const RULES: &[FieldRule] = &[
    FieldRule::text("species", "Species"),
    FieldRule::text("location", "Location"),
    FieldRule::text("date", "Date"),
    FieldRule::text("time", "Time"),
    FieldRule::text("observer", "Observer"),
    FieldRule::integer("count", "Count", Some(1)),
    // The referenced trail is not looked up
    FieldRule::reference("trailId", "Trail ID"),
];

/// Wildlife sightings at `/wildlife`
pub struct Wildlife;

impl Resource for Wildlife {
    const PATH: &'static str = "wildlife";
    const COLLECTION: &'static str = "wildlife";
    const SINGULAR: &'static str = "sighting";
    const PLURAL: &'static str = "sightings";
    const TITLE: &'static str = "Sighting";
    const TAG: &'static str = "Wildlife";
    const DESCRIPTION: &'static str = "Wildlife sightings, each linked to the trail it was seen on";

    fn rules() -> RuleSet {
        RuleSet::new(RULES)
    }
}
