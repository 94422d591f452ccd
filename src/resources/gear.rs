//! Hiking gear

use crate::core::resource::Resource;
use crate::core::validation::{FieldRule, RuleSet};

const RULES: &[FieldRule] = &[
    FieldRule::text("name", "Name"),
    FieldRule::text("type", "Type"),
    FieldRule::text("brand", "Brand"),
    FieldRule::number("weightOz", "Weight"),
    FieldRule::text("category", "Category"),
    FieldRule::text("condition", "Condition"),
    FieldRule::text("owner", "Owner"),
    FieldRule::text("purchaseDate", "Purchase date"),
    FieldRule::boolean("favorite", "Favorite"),
    FieldRule::text("notes", "Notes"),
];

/// Gear items at `/gear`
pub struct GearItems;

impl Resource for GearItems {
    const PATH: &'static str = "gear";
    const COLLECTION: &'static str = "gear";
    const SINGULAR: &'static str = "gear";
    const PLURAL: &'static str = "gear";
    const TITLE: &'static str = "Gear";
    const TAG: &'static str = "Gear";
    const DESCRIPTION: &'static str = "Hiking gear owned by hikers";

    fn rules() -> RuleSet {
        RuleSet::new(RULES)
    }
}
