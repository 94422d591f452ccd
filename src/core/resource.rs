//! Resource trait
//!
//! A resource is one collection exposed over REST. Everything the generic
//! handlers, the router and the API docs need to know about it is here.

use crate::core::validation::RuleSet;

/// A collection exposed at `/{PATH}`
pub trait Resource: Send + Sync + 'static {
    /// URL segment, e.g. "trails"
    const PATH: &'static str;

    /// Store collection name
    const COLLECTION: &'static str;

    /// Lowercase singular used in messages, e.g. "trail"
    const SINGULAR: &'static str;

    /// Lowercase plural used in messages, e.g. "trails"
    const PLURAL: &'static str;

    /// Capitalised singular, e.g. "Trail"
    const TITLE: &'static str;

    /// Documentation group
    const TAG: &'static str;

    const DESCRIPTION: &'static str;

    /// Body rules for create and update
    fn rules() -> RuleSet;
}
