use conquest_protocol::CombatReport;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::unit::Unit;

/// Why an attack was refused before any dice were rolled.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AttackDenied {
    #[error("Attacker is destroyed")]
    AttackerDestroyed,
    #[error("Defender is destroyed")]
    DefenderDestroyed,
    #[error("Cannot attack own units")]
    SameOwner,
    #[error("Unit has already attacked this turn")]
    AlreadyAttacked,
    #[error("Target out of range (range: {range}, distance: {distance})")]
    OutOfRange { range: i32, distance: i32 },
}

/// Check whether `attacker` may attack `defender` at hex `distance`.
pub fn check_attack(attacker: &Unit, defender: &Unit, distance: i32) -> Result<(), AttackDenied> {
    if attacker.is_destroyed() {
        return Err(AttackDenied::AttackerDestroyed);
    }
    if defender.is_destroyed() {
        return Err(AttackDenied::DefenderDestroyed);
    }
    if attacker.owner == defender.owner {
        return Err(AttackDenied::SameOwner);
    }
    if !attacker.can_attack() {
        return Err(AttackDenied::AlreadyAttacked);
    }

    let range = attacker.stats().range;
    if distance > range {
        return Err(AttackDenied::OutOfRange { range, distance });
    }

    Ok(())
}

/// Resolve one exchange of fire with two independent d6 rolls.
pub fn resolve_combat<R: Rng + ?Sized>(
    attacker: &mut Unit,
    defender: &mut Unit,
    terrain_modifier: i32,
    rng: &mut R,
) -> CombatReport {
    let attack_roll = rng.gen_range(1..=6);
    let defense_roll = rng.gen_range(1..=6);
    resolve_with_rolls(attacker, defender, terrain_modifier, attack_roll, defense_roll)
}

/// Resolve combat with fixed dice.
///
/// Strength scales with remaining health:
/// `attack = atk * hp / max_hp + roll`, `defense = (def + terrain) * hp / max_hp + roll`.
/// The defender loses `attack - defense / 2` and the attacker `defense / 2 - attack / 3`,
/// each truncated toward zero and floored at zero.
pub fn resolve_with_rolls(
    attacker: &mut Unit,
    defender: &mut Unit,
    terrain_modifier: i32,
    attack_roll: i32,
    defense_roll: i32,
) -> CombatReport {
    let att_stats = attacker.stats();
    let def_stats = defender.stats();

    let attack_power = f64::from(att_stats.attack) * health_ratio(attacker)
        + f64::from(attack_roll);
    let defense_power = f64::from(def_stats.defense + terrain_modifier) * health_ratio(defender)
        + f64::from(defense_roll);

    let (damage_to_defender, damage_to_attacker) = combat_damage(attack_power, defense_power);

    defender.health = (defender.health - damage_to_defender).max(0);
    attacker.health = (attacker.health - damage_to_attacker).max(0);
    attacker.has_attacked = true;

    debug!(
        attacker = %attacker.id,
        defender = %defender.id,
        attack_roll,
        defense_roll,
        attack_power,
        defense_power,
        damage_to_defender,
        damage_to_attacker,
        "combat resolved"
    );

    CombatReport {
        attacker: attacker.id,
        defender: defender.id,
        attack_roll,
        defense_roll,
        damage_to_defender,
        damage_to_attacker,
        attacker_health: attacker.health,
        defender_health: defender.health,
        defender_destroyed: defender.health <= 0,
        attacker_survived: attacker.health > 0,
    }
}

/// Damage dealt to (defender, attacker) for the given effective powers.
pub fn combat_damage(attack_power: f64, defense_power: f64) -> (i32, i32) {
    let to_defender = (attack_power - defense_power / 2.0).trunc() as i32;
    let to_attacker = (defense_power / 2.0 - attack_power / 3.0).trunc() as i32;
    (to_defender.max(0), to_attacker.max(0))
}

fn health_ratio(unit: &Unit) -> f64 {
    let max = unit.stats().max_health;
    if max <= 0 {
        return 0.0;
    }
    f64::from(unit.health) / f64::from(max)
}
