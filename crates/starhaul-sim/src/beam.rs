//! Continuous-damage beam weapons.
//!
//! A beam applies its damage on a repeating timer until its duration runs
//! out. Only a naturally completed beam starts the refresh cooldown; a beam
//! interrupted early (target lost, out of range, cleared) ends without one.

use std::collections::BTreeMap;

use hecs::Entity;
use tracing::{debug, info};

use starhaul_core::config::WeaponDef;
use starhaul_core::events::{CombatEvent, EventSink};
use starhaul_core::types::SlotKey;

use crate::cooldown::CooldownService;
use crate::scheduler::{TimerId, TimerRegistry, TimerTask};
use crate::world::{entity_id, CombatWorld};

/// A live beam for one shooter slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    pub shooter: Entity,
    pub slot: SlotKey,
    pub target: Entity,
    /// Index into `GameConfig::weapons`.
    pub weapon: usize,
    pub damage: f64,
    pub range: f64,
    pub started_at_ms: f64,
    pub elapsed_ms: f64,
    pub duration_ms: f64,
    pub refresh_ms: f64,
    pub ticks_applied: u32,
    timer: TimerId,
}

/// What a timer firing did to a beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamTickOutcome {
    /// No matching beam (already ended or stale timer).
    Ignored,
    Applied,
    /// Duration elapsed; refresh cooldown started.
    Completed,
    /// Continuation check failed; no cooldown.
    Interrupted,
}

#[derive(Debug, Default)]
pub struct BeamService {
    beams: BTreeMap<(Entity, SlotKey), Beam>,
}

impl BeamService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a beam for `shooter`'s `slot` unless one is already running.
    ///
    /// Returns true when a new beam was created. Weapons without beam
    /// parameters are ignored.
    #[allow(clippy::too_many_arguments)]
    pub fn ensure_beam(
        &mut self,
        shooter: Entity,
        slot: SlotKey,
        weapon_index: usize,
        weapon: &WeaponDef,
        target: Entity,
        now_ms: f64,
        timers: &mut TimerRegistry,
        sink: &mut impl EventSink,
    ) -> bool {
        let key = (shooter, slot);
        if self.beams.contains_key(&key) {
            return false;
        }
        let Some(spec) = weapon.beam.as_ref() else {
            return false;
        };

        let timer = timers.register(
            now_ms + spec.tick_ms,
            Some(spec.tick_ms),
            TimerTask::BeamTick { shooter, slot },
        );
        self.beams.insert(
            key,
            Beam {
                shooter,
                slot,
                target,
                weapon: weapon_index,
                damage: weapon.damage,
                range: weapon.range,
                started_at_ms: now_ms,
                elapsed_ms: 0.0,
                duration_ms: spec.duration_ms,
                refresh_ms: spec.refresh_ms,
                ticks_applied: 0,
                timer,
            },
        );
        info!(
            shooter = entity_id(shooter),
            %slot,
            target = entity_id(target),
            duration_ms = spec.duration_ms,
            "beam started"
        );
        sink.emit(CombatEvent::BeamStart {
            shooter: entity_id(shooter),
            slot_key: slot,
            duration_ms: spec.duration_ms,
        });
        true
    }

    /// Handle a `BeamTick` timer firing scheduled for `now_ms`.
    ///
    /// `should_continue` is asked before damage is applied; a false answer
    /// ends the beam early. Inactive shooters or targets always end it.
    #[allow(clippy::too_many_arguments)]
    pub fn on_tick<W: CombatWorld>(
        &mut self,
        shooter: Entity,
        slot: SlotKey,
        timer: TimerId,
        now_ms: f64,
        world: &mut W,
        should_continue: impl FnOnce(&Beam, &W) -> bool,
        cooldowns: &mut CooldownService,
        timers: &mut TimerRegistry,
        sink: &mut impl EventSink,
    ) -> BeamTickOutcome {
        let key = (shooter, slot);
        let Some(beam) = self.beams.get_mut(&key) else {
            return BeamTickOutcome::Ignored;
        };
        if beam.timer != timer {
            return BeamTickOutcome::Ignored;
        }

        let target = beam.target;
        if !world.is_active(shooter) || !world.is_active(target) || !should_continue(beam, world) {
            self.end(key, false, timers, sink);
            return BeamTickOutcome::Interrupted;
        }

        if !world.is_invulnerable(target) {
            world.apply_damage(target, beam.damage, shooter);
        }
        if let Some(at) = world.position(target) {
            world.hit_effect(at);
        }
        beam.ticks_applied += 1;
        beam.elapsed_ms = now_ms - beam.started_at_ms;
        if beam.elapsed_ms < beam.duration_ms {
            return BeamTickOutcome::Applied;
        }

        let refresh_ms = beam.refresh_ms;
        sink.emit(CombatEvent::BeamRefresh {
            shooter: entity_id(shooter),
            slot_key: slot,
            refresh_ms,
        });
        cooldowns.set_beam_ready_at(shooter, slot, now_ms + refresh_ms);
        self.end(key, true, timers, sink);
        BeamTickOutcome::Completed
    }

    /// End a beam early. No refresh cooldown is started.
    pub fn stop_beam(
        &mut self,
        shooter: Entity,
        slot: SlotKey,
        timers: &mut TimerRegistry,
        sink: &mut impl EventSink,
    ) -> bool {
        self.end((shooter, slot), false, timers, sink)
    }

    /// End every beam fired by or aimed at `entity`.
    pub fn stop_involving(
        &mut self,
        entity: Entity,
        timers: &mut TimerRegistry,
        sink: &mut impl EventSink,
    ) -> usize {
        let keys: Vec<_> = self
            .beams
            .iter()
            .filter(|(_, b)| b.shooter == entity || b.target == entity)
            .map(|(&key, _)| key)
            .collect();
        for &key in &keys {
            self.end(key, false, timers, sink);
        }
        keys.len()
    }

    /// Drop every beam and its timer without emitting events (teardown).
    pub fn stop_all(&mut self, timers: &mut TimerRegistry) -> usize {
        let count = self.beams.len();
        for beam in self.beams.values() {
            timers.unregister(beam.timer);
        }
        self.beams.clear();
        count
    }

    pub fn get(&self, shooter: Entity, slot: SlotKey) -> Option<&Beam> {
        self.beams.get(&(shooter, slot))
    }

    pub fn beams(&self) -> impl Iterator<Item = &Beam> {
        self.beams.values()
    }

    pub fn len(&self) -> usize {
        self.beams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beams.is_empty()
    }

    fn end(
        &mut self,
        key: (Entity, SlotKey),
        completed: bool,
        timers: &mut TimerRegistry,
        sink: &mut impl EventSink,
    ) -> bool {
        let Some(beam) = self.beams.remove(&key) else {
            return false;
        };
        timers.unregister(beam.timer);
        debug!(
            shooter = entity_id(beam.shooter),
            slot = %beam.slot,
            completed,
            ticks = beam.ticks_applied,
            "beam ended"
        );
        sink.emit(CombatEvent::BeamEnded {
            shooter: entity_id(beam.shooter),
            slot_key: beam.slot,
            completed,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockWorld;
    use glam::DVec2;
    use starhaul_core::config::GameConfig;
    use starhaul_core::enums::Relation;

    struct Rig {
        world: MockWorld,
        beams: BeamService,
        cooldowns: CooldownService,
        timers: TimerRegistry,
        events: Vec<CombatEvent>,
        weapon: WeaponDef,
        shooter: Entity,
        target: Entity,
    }

    impl Rig {
        fn new() -> Self {
            let mut world = MockWorld::new(Relation::Confrontation);
            let shooter = world.add(DVec2::ZERO, 0, 10.0);
            let target = world.add(DVec2::new(200.0, 0.0), 2, 10.0);
            Self {
                world,
                beams: BeamService::new(),
                cooldowns: CooldownService::new(),
                timers: TimerRegistry::new(),
                events: Vec::new(),
                // cutting-beam: 4 dmg, tick 100, duration 1500, refresh 3000
                weapon: GameConfig::default().weapons[2].clone(),
                shooter,
                target,
            }
        }

        fn start(&mut self, now_ms: f64) -> bool {
            self.beams.ensure_beam(
                self.shooter,
                SlotKey(2),
                2,
                &self.weapon,
                self.target,
                now_ms,
                &mut self.timers,
                &mut self.events,
            )
        }

        /// Fire due timers up to `now_ms` with a fixed continuation answer.
        fn run_until(&mut self, now_ms: f64, keep_going: bool) -> Vec<BeamTickOutcome> {
            let mut outcomes = Vec::new();
            for firing in self.timers.drain_due(now_ms) {
                let TimerTask::BeamTick { shooter, slot } = firing.task;
                outcomes.push(self.beams.on_tick(
                    shooter,
                    slot,
                    firing.id,
                    firing.due_at_ms,
                    &mut self.world,
                    |_, _| keep_going,
                    &mut self.cooldowns,
                    &mut self.timers,
                    &mut self.events,
                ));
            }
            outcomes
        }
    }

    #[test]
    fn test_ensure_beam_is_idempotent() {
        let mut rig = Rig::new();
        assert!(rig.start(0.0));
        assert!(!rig.start(50.0));
        assert_eq!(rig.beams.len(), 1);
        assert_eq!(rig.timers.len(), 1);
        assert_eq!(
            rig.events,
            vec![CombatEvent::BeamStart {
                shooter: entity_id(rig.shooter),
                slot_key: SlotKey(2),
                duration_ms: 1500.0,
            }]
        );
    }

    #[test]
    fn test_natural_completion_starts_refresh() {
        let mut rig = Rig::new();
        rig.start(0.0);

        let mut outcomes = Vec::new();
        let mut now = 0.0;
        while now < 2000.0 {
            now += 50.0;
            outcomes.extend(rig.run_until(now, true));
        }

        let applied = outcomes
            .iter()
            .filter(|&&o| o == BeamTickOutcome::Applied)
            .count();
        assert_eq!(applied, 14);
        assert_eq!(outcomes.last(), Some(&BeamTickOutcome::Completed));
        // 15 ticks of 4 damage
        assert_eq!(rig.world.damage.len(), 15);
        assert!(rig.beams.is_empty());
        assert!(rig.timers.is_empty());

        assert!(rig.events.contains(&CombatEvent::BeamRefresh {
            shooter: entity_id(rig.shooter),
            slot_key: SlotKey(2),
            refresh_ms: 3000.0,
        }));
        assert_eq!(rig.cooldowns.get_beam_ready_at(rig.shooter, SlotKey(2)), Some(4500.0));
        assert!(rig.cooldowns.is_weapon_charging(rig.shooter, SlotKey(2), 4000.0));
    }

    #[test]
    fn test_single_long_drain_applies_every_tick() {
        let mut rig = Rig::new();
        rig.start(0.0);

        let outcomes = rig.run_until(2000.0, true);
        let applied = outcomes
            .iter()
            .filter(|&&o| o == BeamTickOutcome::Applied)
            .count();
        assert_eq!(applied, 14);
        assert_eq!(outcomes[14], BeamTickOutcome::Completed);
        assert_eq!(rig.world.damage.len(), 15);
        assert!(rig.beams.is_empty());
        assert!(rig.timers.is_empty());
        // refresh anchored to the completing firing, not the drain time
        assert_eq!(rig.cooldowns.get_beam_ready_at(rig.shooter, SlotKey(2)), Some(4500.0));
    }

    #[test]
    fn test_interruption_skips_refresh() {
        let mut rig = Rig::new();
        rig.start(0.0);
        rig.run_until(300.0, true);
        let outcomes = rig.run_until(400.0, false);

        assert_eq!(outcomes, vec![BeamTickOutcome::Interrupted]);
        assert!(rig.beams.is_empty());
        assert!(rig.timers.is_empty());
        assert!(!rig
            .events
            .iter()
            .any(|e| matches!(e, CombatEvent::BeamRefresh { .. })));
        assert_eq!(rig.cooldowns.get_beam_ready_at(rig.shooter, SlotKey(2)), None);
        assert!(rig.events.contains(&CombatEvent::BeamEnded {
            shooter: entity_id(rig.shooter),
            slot_key: SlotKey(2),
            completed: false,
        }));
    }

    #[test]
    fn test_lost_target_ends_beam() {
        let mut rig = Rig::new();
        rig.start(0.0);
        rig.run_until(100.0, true);
        rig.world.body(rig.target).active = false;

        assert_eq!(rig.run_until(200.0, true), vec![BeamTickOutcome::Interrupted]);
        assert_eq!(rig.world.damage.len(), 1);
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let mut rig = Rig::new();
        rig.start(0.0);
        let mut sink: Vec<CombatEvent> = Vec::new();
        let stale = rig.timers.register(0.0, None, TimerTask::BeamTick {
            shooter: rig.shooter,
            slot: SlotKey(2),
        });
        let outcome = rig.beams.on_tick(
            rig.shooter,
            SlotKey(2),
            stale,
            0.0,
            &mut rig.world,
            |_, _| true,
            &mut rig.cooldowns,
            &mut rig.timers,
            &mut sink,
        );
        assert_eq!(outcome, BeamTickOutcome::Ignored);
        assert!(rig.world.damage.is_empty());
    }

    #[test]
    fn test_stop_all_cancels_timers_silently() {
        let mut rig = Rig::new();
        rig.start(0.0);
        rig.events.clear();
        assert_eq!(rig.beams.stop_all(&mut rig.timers), 1);
        assert!(rig.timers.is_empty());
        assert!(rig.events.is_empty());
        assert!(rig.run_until(10_000.0, true).is_empty());
    }

    #[test]
    fn test_stop_involving_target() {
        let mut rig = Rig::new();
        rig.start(0.0);
        assert_eq!(rig.beams.stop_involving(rig.target, &mut rig.timers, &mut rig.events), 1);
        assert!(rig.beams.get(rig.shooter, SlotKey(2)).is_none());
    }
}
