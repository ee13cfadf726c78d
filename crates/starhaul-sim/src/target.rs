//! Per-slot weapon target assignment for the player ship.
//!
//! Bulk clears report every affected slot in a single
//! `PlayerWeaponTargetCleared` event.

use std::collections::BTreeMap;

use hecs::Entity;
use tracing::debug;

use starhaul_core::events::{CombatEvent, EventSink};
use starhaul_core::types::SlotKey;

use crate::world::CombatWorld;

#[derive(Debug, Default)]
pub struct TargetService {
    assignments: BTreeMap<SlotKey, Entity>,
}

impl TargetService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `target` to `slot`, or clear the slot with `None`.
    ///
    /// Assigning marks the target hostile to `shooter`. Clearing reports the
    /// slot as no longer out of range.
    pub fn set_target(
        &mut self,
        shooter: Entity,
        slot: SlotKey,
        target: Option<Entity>,
        world: &mut impl CombatWorld,
        sink: &mut impl EventSink,
    ) {
        match target {
            Some(target) => {
                self.assignments.insert(slot, target);
                world.mark_hostile(shooter, target);
            }
            None => {
                self.assignments.remove(&slot);
                sink.emit(CombatEvent::WeaponOutOfRange {
                    slot_key: slot,
                    out_of_range: false,
                });
            }
        }
    }

    pub fn get_target(&self, slot: SlotKey) -> Option<Entity> {
        self.assignments.get(&slot).copied()
    }

    pub fn assignments(&self) -> impl Iterator<Item = (SlotKey, Entity)> + '_ {
        self.assignments.iter().map(|(&slot, &target)| (slot, target))
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn clear_slot(&mut self, slot: SlotKey, sink: &mut impl EventSink) -> Vec<SlotKey> {
        self.clear_where(|s, _| s == slot, sink)
    }

    pub fn clear_all(&mut self, sink: &mut impl EventSink) -> Vec<SlotKey> {
        self.clear_where(|_, _| true, sink)
    }

    /// Remove only the slots pointing at `target`.
    pub fn clear_assignments_for_target(
        &mut self,
        target: Entity,
        sink: &mut impl EventSink,
    ) -> Vec<SlotKey> {
        self.clear_where(|_, t| t == target, sink)
    }

    fn clear_where(
        &mut self,
        pred: impl Fn(SlotKey, Entity) -> bool,
        sink: &mut impl EventSink,
    ) -> Vec<SlotKey> {
        let slots: Vec<SlotKey> = self
            .assignments
            .iter()
            .filter(|(&slot, &target)| pred(slot, target))
            .map(|(&slot, _)| slot)
            .collect();
        if slots.is_empty() {
            return slots;
        }
        for slot in &slots {
            self.assignments.remove(slot);
        }
        debug!(?slots, "weapon targets cleared");
        sink.emit(CombatEvent::PlayerWeaponTargetCleared {
            slots: slots.clone(),
        });
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockWorld;
    use glam::DVec2;
    use starhaul_core::enums::Relation;

    fn setup() -> (MockWorld, Entity, Entity, Entity) {
        let mut world = MockWorld::new(Relation::Neutral);
        let player = world.add(DVec2::ZERO, 0, 10.0);
        let a = world.add(DVec2::new(100.0, 0.0), 1, 10.0);
        let b = world.add(DVec2::new(0.0, 100.0), 2, 10.0);
        (world, player, a, b)
    }

    #[test]
    fn test_assignment_marks_hostile() {
        let (mut world, player, a, _) = setup();
        let mut targets = TargetService::new();
        let mut events: Vec<CombatEvent> = Vec::new();

        targets.set_target(player, SlotKey(0), Some(a), &mut world, &mut events);
        assert_eq!(targets.get_target(SlotKey(0)), Some(a));
        assert_eq!(world.hostile, vec![(player, a)]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_clearing_with_none_reports_in_range() {
        let (mut world, player, a, _) = setup();
        let mut targets = TargetService::new();
        let mut events: Vec<CombatEvent> = Vec::new();

        targets.set_target(player, SlotKey(1), Some(a), &mut world, &mut events);
        targets.set_target(player, SlotKey(1), None, &mut world, &mut events);
        assert_eq!(targets.get_target(SlotKey(1)), None);
        assert_eq!(
            events,
            vec![CombatEvent::WeaponOutOfRange {
                slot_key: SlotKey(1),
                out_of_range: false,
            }]
        );
    }

    #[test]
    fn test_replacing_target_overwrites_slot() {
        let (mut world, player, a, b) = setup();
        let mut targets = TargetService::new();
        let mut events: Vec<CombatEvent> = Vec::new();
        targets.set_target(player, SlotKey(0), Some(a), &mut world, &mut events);
        targets.set_target(player, SlotKey(0), Some(b), &mut world, &mut events);
        assert_eq!(targets.get_target(SlotKey(0)), Some(b));
        assert_eq!(targets.assignments().count(), 1);
    }

    #[test]
    fn test_clear_for_target_emits_once_with_all_slots() {
        let (mut world, player, a, b) = setup();
        let mut targets = TargetService::new();
        let mut events: Vec<CombatEvent> = Vec::new();
        targets.set_target(player, SlotKey(0), Some(a), &mut world, &mut events);
        targets.set_target(player, SlotKey(1), Some(b), &mut world, &mut events);
        targets.set_target(player, SlotKey(2), Some(a), &mut world, &mut events);

        let cleared = targets.clear_assignments_for_target(a, &mut events);
        assert_eq!(cleared, vec![SlotKey(0), SlotKey(2)]);
        assert_eq!(
            events,
            vec![CombatEvent::PlayerWeaponTargetCleared {
                slots: vec![SlotKey(0), SlotKey(2)],
            }]
        );
        assert_eq!(targets.get_target(SlotKey(1)), Some(b));
    }

    #[test]
    fn test_clear_with_nothing_assigned_is_silent() {
        let (_, _, a, _) = setup();
        let mut targets = TargetService::new();
        let mut events: Vec<CombatEvent> = Vec::new();
        assert!(targets.clear_assignments_for_target(a, &mut events).is_empty());
        assert!(targets.clear_slot(SlotKey(3), &mut events).is_empty());
        assert!(targets.clear_all(&mut events).is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_clear_slot_and_clear_all() {
        let (mut world, player, a, b) = setup();
        let mut targets = TargetService::new();
        let mut events: Vec<CombatEvent> = Vec::new();
        targets.set_target(player, SlotKey(0), Some(a), &mut world, &mut events);
        targets.set_target(player, SlotKey(1), Some(b), &mut world, &mut events);

        assert_eq!(targets.clear_slot(SlotKey(0), &mut events), vec![SlotKey(0)]);
        assert_eq!(targets.clear_all(&mut events), vec![SlotKey(1)]);
        assert!(targets.is_empty());
        assert_eq!(events.len(), 2);
    }
}
