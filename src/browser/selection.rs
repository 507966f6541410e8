//! Two-bucket trade selection.
//!
//! Cards clicked while building a trade land in either the "want" or the
//! "give" bucket. A card id is never in both buckets at once: selecting a
//! card into one bucket takes it out of the other.

use serde::{Deserialize, Serialize};

use crate::models::Card;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    #[default]
    Want,
    Give,
}

impl Bucket {
    pub fn other(self) -> Bucket {
        match self {
            Bucket::Want => Bucket::Give,
            Bucket::Give => Bucket::Want,
        }
    }
}

/// Highlight state of a card in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionState {
    None,
    Want,
    Give,
}

impl From<Bucket> for SelectionState {
    fn from(bucket: Bucket) -> Self {
        match bucket {
            Bucket::Want => SelectionState::Want,
            Bucket::Give => SelectionState::Give,
        }
    }
}

/// Snapshot of both buckets, in selection order.
///
/// Only [`SelectionEngine`] mutates the buckets, which keeps them disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectedCards {
    want: Vec<Card>,
    give: Vec<Card>,
}

impl SelectedCards {
    pub fn want(&self) -> &[Card] {
        &self.want
    }

    pub fn give(&self) -> &[Card] {
        &self.give
    }

    pub fn bucket(&self, bucket: Bucket) -> &[Card] {
        match bucket {
            Bucket::Want => &self.want,
            Bucket::Give => &self.give,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<Card> {
        match bucket {
            Bucket::Want => &mut self.want,
            Bucket::Give => &mut self.give,
        }
    }

    pub fn contains(&self, bucket: Bucket, card_id: i64) -> bool {
        self.bucket(bucket).iter().any(|c| c.id == card_id)
    }

    pub fn state_of(&self, card_id: i64) -> SelectionState {
        if self.contains(Bucket::Want, card_id) {
            SelectionState::Want
        } else if self.contains(Bucket::Give, card_id) {
            SelectionState::Give
        } else {
            SelectionState::None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.want.is_empty() && self.give.is_empty()
    }

    /// Removes `card_id` from `bucket`; true when something was removed.
    fn take(&mut self, bucket: Bucket, card_id: i64) -> bool {
        let list = self.bucket_mut(bucket);
        let before = list.len();
        list.retain(|c| c.id != card_id);
        list.len() != before
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&SelectedCards) + Send>;

pub struct SelectionEngine {
    selected: SelectedCards,
    active: Bucket,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionEngine {
    /// Empty buckets with "want" active. Construction never notifies.
    pub fn new() -> Self {
        Self {
            selected: SelectedCards::default(),
            active: Bucket::Want,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn selected(&self) -> &SelectedCards {
        &self.selected
    }

    pub fn active_bucket(&self) -> Bucket {
        self.active
    }

    pub fn set_active_bucket(&mut self, bucket: Bucket) {
        self.active = bucket;
    }

    /// Registers a listener invoked synchronously after every change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SelectedCards) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Deselects the card if it is in the active bucket, otherwise moves or
    /// adds it to the end of the active bucket. Returns the card's new state.
    pub fn toggle(&mut self, card: &Card) -> SelectionState {
        let active = self.active;
        let state = if self.selected.take(active, card.id) {
            SelectionState::None
        } else {
            self.selected.take(active.other(), card.id);
            self.selected.bucket_mut(active).push(card.clone());
            SelectionState::from(active)
        };

        debug_assert!(
            !(self.selected.contains(Bucket::Want, card.id)
                && self.selected.contains(Bucket::Give, card.id)),
            "card {} selected in both buckets",
            card.id
        );

        self.notify();
        state
    }

    /// Removes the card from the named bucket regardless of the active one.
    pub fn remove(&mut self, card_id: i64, bucket: Bucket) -> bool {
        let removed = self.selected.take(bucket, card_id);
        if removed {
            self.notify();
        }
        removed
    }

    pub fn selection_state_of(&self, card_id: i64) -> SelectionState {
        self.selected.state_of(card_id)
    }

    fn notify(&mut self) {
        let snapshot = &self.selected;
        for (_, listener) in self.subscribers.iter_mut() {
            listener(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_card;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    fn ids(cards: &[Card]) -> Vec<i64> {
        cards.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_toggle_adds_to_active_bucket() {
        let mut engine = SelectionEngine::new();
        let card_a = sample_card(1, "Pikachu", 1);

        assert_eq!(engine.toggle(&card_a), SelectionState::Want);
        assert_eq!(ids(engine.selected().want()), vec![1]);
        assert!(engine.selected().give().is_empty());
        assert_eq!(engine.selection_state_of(1), SelectionState::Want);
    }

    #[test]
    fn test_toggle_moves_between_buckets() {
        let mut engine = SelectionEngine::new();
        let card_a = sample_card(1, "Pikachu", 1);
        engine.toggle(&card_a);

        engine.set_active_bucket(Bucket::Give);
        assert_eq!(engine.toggle(&card_a), SelectionState::Give);

        assert!(engine.selected().want().is_empty());
        assert_eq!(ids(engine.selected().give()), vec![1]);
    }

    #[test]
    fn test_toggle_twice_deselects() {
        let mut engine = SelectionEngine::new();
        let card_a = sample_card(1, "Pikachu", 1);
        engine.toggle(&card_a);
        assert_eq!(engine.toggle(&card_a), SelectionState::None);
        assert!(engine.selected().is_empty());
    }

    #[test]
    fn test_selection_order_is_preserved() {
        let mut engine = SelectionEngine::new();
        for id in [5, 3, 9] {
            engine.toggle(&sample_card(id, "x", 1));
        }
        assert_eq!(ids(engine.selected().want()), vec![5, 3, 9]);
    }

    #[test]
    fn test_set_active_bucket_leaves_contents_alone() {
        let mut engine = SelectionEngine::new();
        engine.toggle(&sample_card(1, "x", 1));
        let before = engine.selected().clone();
        engine.set_active_bucket(Bucket::Give);
        assert_eq!(engine.selected(), &before);
        assert_eq!(engine.active_bucket(), Bucket::Give);
    }

    #[test]
    fn test_remove_ignores_active_bucket() {
        let mut engine = SelectionEngine::new();
        engine.toggle(&sample_card(1, "x", 1));
        engine.set_active_bucket(Bucket::Give);
        engine.toggle(&sample_card(2, "y", 1));

        assert!(!engine.remove(1, Bucket::Give));
        assert!(engine.remove(1, Bucket::Want));
        assert!(engine.selected().want().is_empty());
        assert_eq!(ids(engine.selected().give()), vec![2]);
    }

    #[test]
    fn test_subscribers_see_changes_but_not_construction() {
        let seen: Arc<Mutex<Vec<SelectedCards>>> = Arc::new(Mutex::new(Vec::new()));
        let mut engine = SelectionEngine::new();
        let sink = Arc::clone(&seen);
        let id = engine.subscribe(move |selected| sink.lock().unwrap().push(selected.clone()));
        assert!(seen.lock().unwrap().is_empty());

        engine.toggle(&sample_card(1, "x", 1));
        engine.set_active_bucket(Bucket::Give);
        engine.remove(42, Bucket::Give);
        engine.remove(1, Bucket::Want);

        {
            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), 2);
            assert_eq!(ids(seen[0].want()), vec![1]);
            assert!(seen[1].is_empty());
        }

        assert!(engine.unsubscribe(id));
        engine.toggle(&sample_card(2, "y", 1));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Toggle(i64),
        Switch(Bucket),
        Remove(i64, Bucket),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        let bucket = prop_oneof![Just(Bucket::Want), Just(Bucket::Give)];
        prop_oneof![
            (0i64..8).prop_map(Op::Toggle),
            bucket.clone().prop_map(Op::Switch),
            ((0i64..8), bucket).prop_map(|(id, b)| Op::Remove(id, b)),
        ]
    }

    proptest! {
        #[test]
        fn prop_buckets_stay_disjoint(ops in prop::collection::vec(op_strategy(), 0..64)) {
            let mut engine = SelectionEngine::new();
            for op in ops {
                match op {
                    Op::Toggle(id) => { engine.toggle(&sample_card(id, "x", 1)); }
                    Op::Switch(bucket) => engine.set_active_bucket(bucket),
                    Op::Remove(id, bucket) => { engine.remove(id, bucket); }
                }
                let want = ids(engine.selected().want());
                let give = ids(engine.selected().give());
                prop_assert!(want.iter().all(|id| !give.contains(id)));
            }
        }

        #[test]
        fn prop_double_toggle_restores_state(
            ops in prop::collection::vec(op_strategy(), 0..32),
            id in 0i64..8,
        ) {
            let mut engine = SelectionEngine::new();
            for op in ops {
                match op {
                    Op::Toggle(id) => { engine.toggle(&sample_card(id, "x", 1)); }
                    Op::Switch(bucket) => engine.set_active_bucket(bucket),
                    Op::Remove(id, bucket) => { engine.remove(id, bucket); }
                }
            }
            // Start from a state where the card is not yet in the active bucket
            let active = engine.active_bucket();
            engine.remove(id, active);
            engine.remove(id, active.other());
            let before = engine.selected().clone();

            let card = sample_card(id, "x", 1);
            engine.toggle(&card);
            engine.toggle(&card);
            prop_assert_eq!(engine.selected(), &before);
        }
    }
}
