//! Preference aggregation
//!
//! The aggregate of a party is the per-key union of every active member's
//! submitted preferences. Values come out lexicographically ordered, so the
//! result does not depend on who submitted first.

use crate::{AggregatedPreferences, Member, Preferences};

/// Union the preferences of every active member who has submitted.
///
/// Keys no qualifying member used are absent. An empty result means nobody
/// qualified; callers treat that as a precondition failure.
pub fn aggregate_preferences<'a, I>(members: I) -> AggregatedPreferences
where
    I: IntoIterator<Item = &'a Member>,
{
    aggregate_by(members, |m| &m.preferences)
}

/// Same union rule, applied to the generation hints.
pub fn aggregate_hints<'a, I>(members: I) -> Preferences
where
    I: IntoIterator<Item = &'a Member>,
{
    aggregate_by(members, |m| &m.hints)
}

fn aggregate_by<'a, I, F>(members: I, select: F) -> Preferences
where
    I: IntoIterator<Item = &'a Member>,
    F: Fn(&'a Member) -> &'a Preferences,
{
    members
        .into_iter()
        .filter(|m| m.is_active() && m.has_submitted_preferences)
        .fold(Preferences::new(), |mut acc, m| {
            acc.merge(select(m));
            acc
        })
}
