use super::*;
use crate::CatalogId;
use crate::INSTANCE_STRIDE;
use crate::InstanceId;

/// Immutable echo table. Fully loaded before the gateway accepts its
/// first connection and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<EchoDefinition>,
}

impl Catalog {
    pub fn by_id(&self, id: CatalogId) -> Option<&EchoDefinition> {
        self.entries.iter().find(|e| e.id == id)
    }
    pub fn by_instance(&self, instance: InstanceId) -> Option<&EchoDefinition> {
        self.by_id(instance / INSTANCE_STRIDE)
    }
    pub fn ids(&self) -> impl Iterator<Item = CatalogId> {
        self.entries.iter().map(|e| e.id)
    }
    pub fn of_rarity(&self, rarity: Rarity) -> Vec<CatalogId> {
        self.entries
            .iter()
            .filter(|e| e.rarity == rarity)
            .map(|e| e.id)
            .collect()
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// The shipped balance table. Numbers are live-tuned; the shape is
    /// the contract.
    pub fn standard() -> Self {
        let entries = vec![
            echo(1, "Cinder Whelp", Rarity::Common, Class::Striker, ResonanceKind::Ember)
                .hp(450).attack(45).build(),
            echo(2, "Tidecaller", Rarity::Common, Class::Arcanist, ResonanceKind::Frost)
                .hp(400).attack(35).mana(60).cast(MEND).build(),
            echo(3, "Stonehide", Rarity::Common, Class::Vanguard, ResonanceKind::Verdant)
                .hp(650).attack(30).defense(25).build(),
            echo(4, "Gale Archer", Rarity::Common, Class::Sniper, ResonanceKind::Storm)
                .hp(380).attack(50).crit(15).build(),
            echo(5, "Gloom Acolyte", Rarity::Common, Class::Warden, ResonanceKind::Umbral)
                .hp(500).attack(35).resist(20).build(),
            echo(6, "Emberblade", Rarity::Uncommon, Class::Striker, ResonanceKind::Ember)
                .hp(550).attack(60).speed(110).build(),
            echo(7, "Frost Warden", Rarity::Uncommon, Class::Warden, ResonanceKind::Frost)
                .hp(700).attack(40).defense(30).mana(80).cast(SHOCKWAVE).build(),
            echo(8, "Storm Herald", Rarity::Uncommon, Class::Arcanist, ResonanceKind::Storm)
                .hp(480).attack(55).mana(70).cast(CHAIN_STRIKE).build(),
            echo(9, "Briar Sentinel", Rarity::Uncommon, Class::Vanguard, ResonanceKind::Verdant)
                .hp(800).attack(35).defense(35).mana(90).cast(BULWARK).build(),
            echo(10, "Nightsinger", Rarity::Rare, Class::Sniper, ResonanceKind::Umbral)
                .hp(520).attack(75).crit(25).mana(80).cast(PIERCING_SHOT).build(),
            echo(11, "Pyre Titan", Rarity::Rare, Class::Vanguard, ResonanceKind::Ember)
                .hp(950).attack(50).defense(40).mana(100).cast(SHOCKWAVE).build(),
            echo(12, "Mistweaver", Rarity::Rare, Class::Arcanist, ResonanceKind::Frost)
                .hp(600).attack(60).mana(60).cast(MEND).cast(VEIL).build(),
            echo(13, "Thunder Exarch", Rarity::Epic, Class::Striker, ResonanceKind::Storm)
                .hp(850).attack(90).speed(115).mana(90).cast(CHAIN_STRIKE).build(),
            echo(14, "Verdant Oracle", Rarity::Epic, Class::Warden, ResonanceKind::Verdant)
                .hp(750).attack(55).resist(40).mana(70).cast(MEND).cast(RALLY).build(),
            echo(15, "Prism Avatar", Rarity::Legendary, Class::Arcanist, ResonanceKind::Prism)
                .hp(900).attack(85).mana(80).cast(VENOM).cast(RALLY).build(),
            echo(16, "Umbra Sovereign", Rarity::Legendary, Class::Vanguard, ResonanceKind::Umbral)
                .hp(1200).attack(70).defense(45).resist(45).mana(110).cast(BULWARK).cast(VENOM).build(),
        ];
        Self { entries }
    }
}

/// tiny builder so the table above stays legible
fn echo(id: CatalogId, name: &'static str, rarity: Rarity, class: Class, resonance: ResonanceKind) -> EchoBuilder {
    EchoBuilder {
        def: EchoDefinition {
            id,
            name,
            rarity,
            class,
            resonance,
            stats: BaseStats {
                hp: 500,
                mana: 0,
                attack: 40,
                defense: 10,
                magic_resist: 10,
                attack_speed: 100,
                attack_range: 0,
                crit_chance: 5,
                crit_multiplier_x100: 150,
            },
            abilities: Vec::new(),
        },
    }
}

struct EchoBuilder {
    def: EchoDefinition,
}

impl EchoBuilder {
    fn hp(mut self, hp: i32) -> Self {
        self.def.stats.hp = hp;
        self
    }
    fn mana(mut self, mana: i32) -> Self {
        self.def.stats.mana = mana;
        self
    }
    fn attack(mut self, attack: i32) -> Self {
        self.def.stats.attack = attack;
        self
    }
    fn defense(mut self, defense: i32) -> Self {
        self.def.stats.defense = defense;
        self
    }
    fn resist(mut self, resist: i32) -> Self {
        self.def.stats.magic_resist = resist;
        self
    }
    fn speed(mut self, speed: i32) -> Self {
        self.def.stats.attack_speed = speed;
        self
    }
    fn crit(mut self, chance: i32) -> Self {
        self.def.stats.crit_chance = chance;
        self
    }
    fn cast(mut self, ability: crate::AbilityId) -> Self {
        self.def.abilities.push(ability);
        self
    }
    fn build(self) -> EchoDefinition {
        self.def
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_instance_strips_the_stride() {
        let catalog = Catalog::standard();
        let def = catalog.by_instance(3042).expect("catalog id 3");
        assert!(def.id == 3);
        assert!(def.name == "Stonehide");
    }

    #[test]
    fn every_rarity_is_represented() {
        let catalog = Catalog::standard();
        for rarity in Rarity::ALL {
            assert!(!catalog.of_rarity(rarity).is_empty());
        }
    }

    #[test]
    fn ids_are_unique() {
        let catalog = Catalog::standard();
        let mut ids = catalog.ids().collect::<Vec<_>>();
        ids.sort();
        ids.dedup();
        assert!(ids.len() == catalog.len());
    }
}
