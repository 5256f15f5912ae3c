use crate::Energy;
use crate::Experience;
use crate::Gold;
use crate::Health;
use crate::Tick;
use crate::catalog::Rarity;
use crate::intervention::InterventionKind;

/// Full configuration surface for one session.
/// Every knob ships a default; the binary only overrides port,
/// player count and seed from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub net: NetSettings,
    pub player: PlayerSettings,
    pub shop: ShopSettings,
    pub combat: CombatSettings,
    pub intervention: InterventionSettings,
    pub resonance: ResonanceSettings,
    pub phase: PhaseSettings,
    pub pool: PoolSettings,
    pub seed: u64,
    pub round_cap: u32,
    /// nexus health under which a pairing makes the marquee
    pub at_risk_hp: Health,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            net: NetSettings::default(),
            player: PlayerSettings::default(),
            shop: ShopSettings::default(),
            combat: CombatSettings::default(),
            intervention: InterventionSettings::default(),
            resonance: ResonanceSettings::default(),
            phase: PhaseSettings::default(),
            pool: PoolSettings::default(),
            seed: 0,
            round_cap: 30,
            at_risk_hp: 20,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NetSettings {
    pub port: u16,
    pub max_clients: usize,
    pub ack_timeout_ms: u64,
    pub ack_max_retries: u32,
}

impl Default for NetSettings {
    fn default() -> Self {
        Self {
            port: 7777,
            max_clients: 8,
            ack_timeout_ms: 800,
            ack_max_retries: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerSettings {
    pub starting_health: Health,
    pub starting_gold: Gold,
    pub max_gold: Gold,
    pub level_cap: u8,
    /// xp required to leave level i+1, indexed from level 1
    pub xp_thresholds: Vec<Experience>,
    pub xp_per_round: Experience,
    pub xp_buy_cost: Gold,
    pub xp_buy_amount: Experience,
    pub base_income: Gold,
    pub interest_cap: Gold,
    /// gold bonus at streak lengths 2, 3, 4, 5+
    pub streak_bonus: Vec<Gold>,
    pub lobby_countdown_secs: f64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            starting_health: 100,
            starting_gold: 5,
            max_gold: 100,
            level_cap: 10,
            xp_thresholds: vec![2, 4, 8, 12, 20, 30, 42, 56, 72],
            xp_per_round: 2,
            xp_buy_cost: 4,
            xp_buy_amount: 4,
            base_income: 5,
            interest_cap: 5,
            streak_bonus: vec![1, 2, 3, 4],
            lobby_countdown_secs: 3.0,
        }
    }
}

/// One row of rarity weights; the roll picks uniformly in [0, total).
#[derive(Debug, Clone, Copy)]
pub struct RarityRow {
    pub common: u32,
    pub uncommon: u32,
    pub rare: u32,
    pub epic: u32,
    pub legendary: u32,
}

impl RarityRow {
    pub fn total(&self) -> u32 {
        self.common + self.uncommon + self.rare + self.epic + self.legendary
    }
    pub fn weight(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShopSettings {
    pub slots: usize,
    pub refresh_cost: Gold,
    pub pity_rare: u32,
    pub pity_epic: u32,
    pub pity_legendary: u32,
    /// coarse level buckets, ordered, inclusive bounds
    pub rows: Vec<((u8, u8), RarityRow)>,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            slots: 5,
            refresh_cost: 2,
            pity_rare: 6,
            pity_epic: 12,
            pity_legendary: 20,
            rows: vec![
                ((1, 1), RarityRow { common: 100, uncommon: 0, rare: 0, epic: 0, legendary: 0 }),
                ((2, 3), RarityRow { common: 75, uncommon: 25, rare: 0, epic: 0, legendary: 0 }),
                ((4, 6), RarityRow { common: 50, uncommon: 33, rare: 15, epic: 2, legendary: 0 }),
                ((7, 9), RarityRow { common: 30, uncommon: 35, rare: 25, epic: 9, legendary: 1 }),
                ((10, 10), RarityRow { common: 15, uncommon: 25, rare: 35, epic: 20, legendary: 5 }),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct CombatSettings {
    pub max_ticks: Tick,
    pub snapshot_interval_ticks: Tick,
    /// nexus damage on loss: base + round + survivors
    pub base_damage: Health,
    pub mana_per_attack: i32,
    pub mana_per_hit: i32,
    pub move_speed: i32,
    /// per star level 2 and 3, x100 fixed point
    pub star_hp_multiplier_x100: [i32; 2],
    pub star_attack_multiplier_x100: [i32; 2],
    /// attack cooldown in ticks by class, indexed by Class order
    pub class_cooldown: [Tick; 5],
    /// attack range in cells by class, indexed by Class order
    pub class_range: [i32; 5],
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            max_ticks: 60 * 90,
            snapshot_interval_ticks: 3,
            base_damage: 2,
            mana_per_attack: 10,
            mana_per_hit: 5,
            move_speed: 25,
            star_hp_multiplier_x100: [180, 324],
            star_attack_multiplier_x100: [160, 256],
            class_cooldown: [45, 30, 60, 50, 40],
            class_range: [1, 1, 3, 1, 4],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CardSettings {
    pub cost: Energy,
    pub cooldown_secs: f64,
}

#[derive(Debug, Clone)]
pub struct InterventionSettings {
    pub max_energy: Energy,
    pub passive_interval_ticks: Tick,
    pub kill_gain: Energy,
    pub damage_per_energy: i32,
    pub reposition: CardSettings,
    pub focus: CardSettings,
    pub barrier: CardSettings,
    pub accelerate: CardSettings,
    pub retreat: CardSettings,
    pub focus_duration: Tick,
    pub accelerate_duration: Tick,
    pub retreat_duration: Tick,
    pub barrier_shield_hp: i32,
}

impl InterventionSettings {
    pub fn card(&self, kind: InterventionKind) -> CardSettings {
        match kind {
            InterventionKind::Reposition => self.reposition,
            InterventionKind::Focus => self.focus,
            InterventionKind::Barrier => self.barrier,
            InterventionKind::Accelerate => self.accelerate,
            InterventionKind::TacticalRetreat => self.retreat,
        }
    }
}

impl Default for InterventionSettings {
    fn default() -> Self {
        Self {
            max_energy: 10,
            passive_interval_ticks: 180,
            kill_gain: 2,
            damage_per_energy: 50,
            reposition: CardSettings { cost: 2, cooldown_secs: 6.0 },
            focus: CardSettings { cost: 4, cooldown_secs: 12.0 },
            barrier: CardSettings { cost: 3, cooldown_secs: 10.0 },
            accelerate: CardSettings { cost: 5, cooldown_secs: 15.0 },
            retreat: CardSettings { cost: 3, cooldown_secs: 10.0 },
            focus_duration: 180,
            accelerate_duration: 240,
            retreat_duration: 120,
            barrier_shield_hp: 150,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResonanceSettings {
    /// unit counts unlocking tiers 1, 2, 3
    pub thresholds: [usize; 3],
    /// flat stat bonus per tier, applied by the simulator at spawn
    pub tier_hp_bonus: [i32; 3],
    pub tier_attack_bonus: [i32; 3],
}

impl Default for ResonanceSettings {
    fn default() -> Self {
        Self {
            thresholds: [2, 4, 6],
            tier_hp_bonus: [50, 120, 250],
            tier_attack_bonus: [5, 12, 25],
        }
    }
}

#[derive(Debug, Clone)]
pub struct PhaseSettings {
    pub preparation_secs: f64,
    pub combat_max_secs: f64,
    pub reward_secs: f64,
    pub mutation_secs: f64,
}

impl Default for PhaseSettings {
    fn default() -> Self {
        Self {
            preparation_secs: 30.0,
            combat_max_secs: 90.0,
            reward_secs: 5.0,
            mutation_secs: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub common_copies: u32,
    pub uncommon_copies: u32,
    pub rare_copies: u32,
    pub epic_copies: u32,
    pub legendary_copies: u32,
}

impl PoolSettings {
    pub fn copies(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Common => self.common_copies,
            Rarity::Uncommon => self.uncommon_copies,
            Rarity::Rare => self.rare_copies,
            Rarity::Epic => self.epic_copies,
            Rarity::Legendary => self.legendary_copies,
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            common_copies: 29,
            uncommon_copies: 22,
            rare_copies: 18,
            epic_copies: 12,
            legendary_copies: 10,
        }
    }
}
