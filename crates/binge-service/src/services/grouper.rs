//! Notification grouper - collapses raw rows into one item per group
//!
//! Pure functions over a snapshot. The survivor of a group is its newest
//! member by `(created_at, id)`; the output is ordered by the same key,
//! newest first. Input order never affects the result.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use binge_core::{GroupKey, Notification, Snowflake};

/// Grouped snapshot of a recipient's feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedFeed {
    pub items: Vec<Notification>,
    pub unread_count: usize,
}

impl GroupedFeed {
    pub fn from_raw(notifications: &[Notification]) -> Self {
        let items = group(notifications);
        let unread_count = unread_count(&items);
        Self {
            items,
            unread_count,
        }
    }
}

/// Newest member of every group, sorted newest first
pub fn group(notifications: &[Notification]) -> Vec<Notification> {
    let mut items: Vec<Notification> = newest_per_group(notifications)
        .into_values()
        .cloned()
        .collect();
    items.sort_by(|a, b| b.recency().cmp(&a.recency()));
    items
}

/// Number of groups whose representative is unread
pub fn unread_count(groups: &[Notification]) -> usize {
    groups.iter().filter(|n| !n.read).count()
}

/// Ids of every row that is not the newest member of its group
pub fn superseded(notifications: &[Notification]) -> Vec<Snowflake> {
    let survivors = newest_per_group(notifications);
    let mut ids: Vec<Snowflake> = notifications
        .iter()
        .filter(|n| survivors.get(&n.group_key()).is_some_and(|s| s.id != n.id))
        .map(|n| n.id)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn newest_per_group(notifications: &[Notification]) -> HashMap<GroupKey, &Notification> {
    let mut newest: HashMap<GroupKey, &Notification> = HashMap::new();
    for notification in notifications {
        match newest.entry(notification.group_key()) {
            Entry::Occupied(mut slot) => {
                if notification.recency() > slot.get().recency() {
                    slot.insert(notification);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(notification);
            }
        }
    }
    newest
}
