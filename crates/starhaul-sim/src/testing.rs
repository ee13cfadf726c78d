//! In-memory `CombatWorld` for service tests.

use std::collections::HashMap;

use glam::DVec2;
use hecs::{Entity, World};

use starhaul_core::enums::Relation;
use starhaul_core::types::{FactionId, KinematicState};

use crate::world::CombatWorld;

#[derive(Debug, Clone)]
pub struct MockBody {
    pub active: bool,
    pub state: KinematicState,
    pub faction: FactionId,
    pub radius: f64,
    pub invulnerable: bool,
}

pub struct MockWorld {
    /// Only used to mint entity handles.
    ecs: World,
    pub bodies: HashMap<Entity, MockBody>,
    /// Relation returned for any two different factions.
    pub relation: Relation,
    pub damage: Vec<(Entity, f64, Entity)>,
    pub effects: Vec<DVec2>,
    pub fow_checks: Vec<u64>,
    pub visible: bool,
    pub hostile: Vec<(Entity, Entity)>,
}

impl MockWorld {
    pub fn new(relation: Relation) -> Self {
        Self {
            ecs: World::new(),
            bodies: HashMap::new(),
            relation,
            damage: Vec::new(),
            effects: Vec::new(),
            fow_checks: Vec::new(),
            visible: true,
            hostile: Vec::new(),
        }
    }

    pub fn add(&mut self, pos: DVec2, faction: u32, radius: f64) -> Entity {
        let entity = self.ecs.spawn(());
        self.bodies.insert(
            entity,
            MockBody {
                active: true,
                state: KinematicState::new(pos.x, pos.y, 0.0, 0.0),
                faction: FactionId(faction),
                radius,
                invulnerable: false,
            },
        );
        entity
    }

    pub fn body(&mut self, entity: Entity) -> &mut MockBody {
        self.bodies.get_mut(&entity).expect("unknown mock entity")
    }
}

impl CombatWorld for MockWorld {
    fn is_active(&self, entity: Entity) -> bool {
        self.bodies.get(&entity).is_some_and(|b| b.active)
    }

    fn position(&self, entity: Entity) -> Option<DVec2> {
        self.bodies.get(&entity).map(|b| b.state.position())
    }

    fn velocity_ref(&self, entity: Entity) -> Option<KinematicState> {
        self.bodies.get(&entity).map(|b| b.state)
    }

    fn faction(&self, entity: Entity) -> Option<FactionId> {
        self.bodies.get(&entity).map(|b| b.faction)
    }

    fn relation(&self, a: FactionId, b: FactionId) -> Relation {
        if a == b {
            Relation::Own
        } else {
            self.relation
        }
    }

    fn effective_radius(&self, target: Entity) -> f64 {
        self.bodies.get(&target).map_or(0.0, |b| b.radius)
    }

    fn is_invulnerable(&self, target: Entity) -> bool {
        self.bodies.get(&target).is_some_and(|b| b.invulnerable)
    }

    fn apply_damage(&mut self, target: Entity, amount: f64, shooter: Entity) {
        self.damage.push((target, amount, shooter));
    }

    fn hit_effect(&mut self, at: DVec2) {
        self.effects.push(at);
    }

    fn set_visible_by_fow(&mut self, projectile_id: u64, _pos: DVec2) -> bool {
        self.fow_checks.push(projectile_id);
        self.visible
    }

    fn mark_hostile(&mut self, shooter: Entity, target: Entity) {
        self.hostile.push((shooter, target));
    }

    /// Visibility is driven by `visible`, so no player is needed.
    fn player_ship(&self) -> Option<Entity> {
        None
    }
}
