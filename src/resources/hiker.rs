//! Hikers

use crate::core::resource::Resource;
use crate::core::validation::{FieldRule, RuleSet};

const RULES: &[FieldRule] = &[
    FieldRule::text("firstName", "First name"),
    FieldRule::text("lastName", "Last name"),
    FieldRule::text("username", "Username"),
    FieldRule::email("email", "Email"),
    FieldRule::text("location", "Location"),
    FieldRule::text("memberSince", "Member since"),
    FieldRule::boolean("isAdmin", "isAdmin"),
    FieldRule::integer("trailCount", "Trail count", Some(0)).optional(),
    FieldRule::text("bio", "Bio").optional(),
];

/// Hiker profiles at `/hikers`
pub struct Hikers;

impl Resource for Hikers {
    const PATH: &'static str = "hikers";
    const COLLECTION: &'static str = "hikers";
    const SINGULAR: &'static str = "hiker";
    const PLURAL: &'static str = "hikers";
    const TITLE: &'static str = "Hiker";
    const TAG: &'static str = "Hikers";
    const DESCRIPTION: &'static str = "Hiker profiles";

    fn rules() -> RuleSet {
        RuleSet::new(RULES)
    }
}
