// Date / hour / instance filtering over the immutable base table

use crate::core::format::{InstanceId, Sample};
use crate::core::selection::Selection;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Rows that survived a filter, in original row order.
///
/// Borrowed from the base table; every call derives a fresh view.
#[derive(Debug, Clone, Default)]
pub struct FilteredRows<'a> {
    rows: Vec<&'a Sample>,
}

/// Entry of the instance picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceOption {
    pub label: String,
    pub value: InstanceId,
}

/// All filtered samples of one trajectory, in row order.
#[derive(Debug, Clone)]
pub struct InstanceGroup<'a> {
    pub instance: &'a InstanceId,
    pub samples: Vec<&'a Sample>,
}

/// Keeps rows on the selected date whose hour passes the hour restriction.
pub fn filter<'a, I>(rows: I, selection: &Selection) -> FilteredRows<'a>
where
    I: IntoIterator<Item = &'a Sample>,
{
    let rows: Vec<&'a Sample> = rows
        .into_iter()
        .filter(|s| s.is_on(selection.date))
        .filter(|s| selection.hours.matches(s.hour))
        .collect();

    debug!(
        "Selection {} / {:?} matched {} rows",
        selection.date,
        selection.hours,
        rows.len()
    );

    FilteredRows { rows }
}

impl<'a> FilteredRows<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Sample> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct instances in first-seen order.
    pub fn instances(&self) -> Vec<&'a InstanceId> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|s| &s.instance)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    pub fn instance_options(&self) -> Vec<InstanceOption> {
        self.instances()
            .into_iter()
            .map(|id| InstanceOption {
                label: id.trip_label(),
                value: id.clone(),
            })
            .collect()
    }

    /// Narrows to the chosen instances; unknown ids simply match nothing.
    pub fn select_instances(&self, chosen: &[InstanceId]) -> FilteredRows<'a> {
        let chosen: HashSet<&InstanceId> = chosen.iter().collect();
        FilteredRows {
            rows: self
                .rows
                .iter()
                .copied()
                .filter(|s| chosen.contains(&s.instance))
                .collect(),
        }
    }

    /// Splits rows per instance, groups ordered by first appearance.
    pub fn groups(&self) -> Vec<InstanceGroup<'a>> {
        let mut slots: HashMap<&'a InstanceId, usize> = HashMap::new();
        let mut groups: Vec<InstanceGroup<'a>> = Vec::new();

        for &sample in &self.rows {
            let slot = *slots.entry(&sample.instance).or_insert_with(|| {
                groups.push(InstanceGroup {
                    instance: &sample.instance,
                    samples: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].samples.push(sample);
        }

        groups
    }
}

impl<'b, 'a> IntoIterator for &'b FilteredRows<'a> {
    type Item = &'a Sample;
    type IntoIter = std::iter::Copied<std::slice::Iter<'b, &'a Sample>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter().copied()
    }
}
