//! Card templates and the generators the engine draws new cards from.

use once_cell::sync::Lazy;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::config::DEFAULT_PROVOCATEUR_ODDS;
use super::state::{
    CardId, Equipment, EquipmentSlot, Hero, HeroClass, Location, Monster, Stat, Unit, UnitRole,
};

const FIRST_GENERATED_ID: CardId = 1_000;

/// Source of heroes, monsters, units and equipment.
///
/// The engine treats everything returned here as immutable input; how an
/// implementation rolls its numbers is its own business.
pub trait Catalog {
    fn heroes(&self) -> Vec<Hero>;
    fn generate_monsters(&mut self, location: Location, count: usize) -> Vec<Monster>;
    fn generate_units(&mut self, location: Location, count: usize) -> Vec<Unit>;
    fn sample_equipment(&mut self, count: usize) -> Vec<Equipment>;

    /// Called before each operation with the highest id already in play, so
    /// snapshots from elsewhere never collide with fresh cards.
    fn reserve_ids(&mut self, _highest_in_use: CardId) {}
}

#[derive(Debug, Clone, Copy)]
enum Affinity {
    Physical,
    Magical,
    Hybrid,
}

#[derive(Debug, Clone, Copy)]
struct MonsterTemplate {
    name: &'static str,
    image: &'static str,
    description: &'static str,
    affinity: Affinity,
}

/// Inclusive stat ranges for one location.
#[derive(Debug, Clone, Copy)]
struct LocationTier {
    hp: (u32, u32),
    power: (u32, u32),
    gold: (u32, u32),
}

const TIERS: [LocationTier; 6] = [
    LocationTier { hp: (4, 8), power: (1, 3), gold: (1, 3) },
    LocationTier { hp: (7, 12), power: (2, 4), gold: (2, 4) },
    LocationTier { hp: (10, 16), power: (3, 5), gold: (3, 5) },
    LocationTier { hp: (14, 20), power: (4, 7), gold: (4, 7) },
    LocationTier { hp: (18, 26), power: (5, 9), gold: (5, 9) },
    LocationTier { hp: (24, 34), power: (7, 12), gold: (7, 12) },
];

const fn template(
    name: &'static str,
    image: &'static str,
    description: &'static str,
    affinity: Affinity,
) -> MonsterTemplate {
    MonsterTemplate {
        name,
        image,
        description,
        affinity,
    }
}

const FOREST: [MonsterTemplate; 4] = [
    template("Goblin", "goblin", "A sneaky goblin that likes shiny things.", Affinity::Physical),
    template("Grey Wolf", "wolf", "Hunts in packs under the old pines.", Affinity::Physical),
    template("Wisp", "wisp", "A flickering light that burns to the touch.", Affinity::Magical),
    template("Giant Spider", "spider", "A venomous spider with sticky webs.", Affinity::Hybrid),
];
const RUINS: [MonsterTemplate; 4] = [
    template("Bandit", "bandit", "Picks over the bones of the keep.", Affinity::Physical),
    template("Stone Golem", "golem", "Animated masonry that never tires.", Affinity::Physical),
    template("Hexer", "hexer", "A renegade mage hiding among the rubble.", Affinity::Magical),
    template("Gargoyle", "gargoyle", "Wakes when the sun goes down.", Affinity::Hybrid),
];
const CATACOMBS: [MonsterTemplate; 4] = [
    template("Skeleton", "skeleton", "Rattling bones with a rusted blade.", Affinity::Physical),
    template("Ghoul", "ghoul", "Feeds on whatever the tunnels offer.", Affinity::Physical),
    template("Banshee", "banshee", "Its wail chills the blood.", Affinity::Magical),
    template("Bone Warden", "warden", "Guardian of the ossuary gates.", Affinity::Hybrid),
];
const NECROPOLIS: [MonsterTemplate; 4] = [
    template("Death Knight", "death_knight", "A fallen paladin in black plate.", Affinity::Physical),
    template("Mummy Lord", "mummy", "Wrapped in cursed linen.", Affinity::Hybrid),
    template("Lich", "lich", "A sorcerer who outlived death.", Affinity::Magical),
    template("Wraith", "wraith", "Cold hatred given shape.", Affinity::Magical),
];
const CHTHONIAN: [MonsterTemplate; 4] = [
    template("Hellhound", "hellhound", "Breathes cinders and smoke.", Affinity::Physical),
    template("Pit Fiend", "pit_fiend", "A brute from the burning deep.", Affinity::Hybrid),
    template("Succubus", "succubus", "Beguiles before it burns.", Affinity::Magical),
    template("Magma Titan", "titan", "Molten rock with a grudge.", Affinity::Physical),
];
const CRYPT: [MonsterTemplate; 4] = [
    template("Dracolich", "dracolich", "The bones of a dragon, still hungry.", Affinity::Hybrid),
    template("Crypt Lord", "crypt_lord", "Master of the final vault.", Affinity::Physical),
    template("Void Seer", "void_seer", "Sees the end of every story.", Affinity::Magical),
    template("Abomination", "abomination", "Stitched from a hundred heroes.", Affinity::Physical),
];

fn bestiary(location: Location) -> &'static [MonsterTemplate] {
    match location {
        Location::Forest => &FOREST,
        Location::Ruins => &RUINS,
        Location::Catacombs => &CATACOMBS,
        Location::Necropolis => &NECROPOLIS,
        Location::Chthonian => &CHTHONIAN,
        Location::Crypt => &CRYPT,
    }
}

#[derive(Debug, Clone, Copy)]
struct EquipmentTemplate {
    name: &'static str,
    image: &'static str,
    description: &'static str,
    slot: EquipmentSlot,
    stat: Stat,
    amount: u32,
    cost: u32,
}

const ARMORY: [EquipmentTemplate; 9] = [
    EquipmentTemplate {
        name: "Sword",
        image: "sword",
        description: "A sharp sword that increases attack.",
        slot: EquipmentSlot::Weapon,
        stat: Stat::Ap,
        amount: 2,
        cost: 4,
    },
    EquipmentTemplate {
        name: "Battle Axe",
        image: "axe",
        description: "A heavy axe that greatly increases attack.",
        slot: EquipmentSlot::Weapon,
        stat: Stat::Ap,
        amount: 4,
        cost: 7,
    },
    EquipmentTemplate {
        name: "Oak Wand",
        image: "wand",
        description: "Channels a steady trickle of power.",
        slot: EquipmentSlot::Weapon,
        stat: Stat::Mp,
        amount: 2,
        cost: 4,
    },
    EquipmentTemplate {
        name: "Arcane Staff",
        image: "staff",
        description: "Amplifies every spell cast through it.",
        slot: EquipmentSlot::Weapon,
        stat: Stat::Mp,
        amount: 4,
        cost: 7,
    },
    EquipmentTemplate {
        name: "Twin Daggers",
        image: "daggers",
        description: "Light enough to strike twice.",
        slot: EquipmentSlot::Weapon,
        stat: Stat::Sp,
        amount: 1,
        cost: 8,
    },
    EquipmentTemplate {
        name: "Shield",
        image: "shield",
        description: "A sturdy shield that increases defense.",
        slot: EquipmentSlot::Armor,
        stat: Stat::Dp,
        amount: 2,
        cost: 4,
    },
    EquipmentTemplate {
        name: "Helmet",
        image: "helmet",
        description: "A reinforced helmet.",
        slot: EquipmentSlot::Armor,
        stat: Stat::Dp,
        amount: 1,
        cost: 2,
    },
    EquipmentTemplate {
        name: "Warded Cloak",
        image: "cloak",
        description: "Stitched with sigils against sorcery.",
        slot: EquipmentSlot::Armor,
        stat: Stat::Rp,
        amount: 2,
        cost: 4,
    },
    EquipmentTemplate {
        name: "Amulet",
        image: "amulet",
        description: "A magical amulet that increases health.",
        slot: EquipmentSlot::Armor,
        stat: Stat::Hp,
        amount: 5,
        cost: 5,
    },
];

static HERO_TEMPLATES: Lazy<Vec<Hero>> = Lazy::new(|| {
    vec![
        Hero::new(1, "Warrior", HeroClass::Warrior)
            .with_stats(30, 6, 0, 3, 1, 1)
            .with_description("A mighty warrior with strong physical attacks.", "warrior"),
        Hero::new(2, "Mage", HeroClass::Mage)
            .with_stats(24, 0, 7, 1, 3, 1)
            .with_description("A powerful spellcaster with magical abilities.", "mage"),
        Hero::new(3, "Paladin", HeroClass::Warrior)
            .with_stats(28, 4, 3, 2, 2, 1)
            .with_description("Steel and scripture in equal measure.", "paladin"),
        Hero::new(4, "Spellblade", HeroClass::Mage)
            .with_stats(22, 3, 5, 1, 2, 2)
            .with_description("Quick enough to cut and cast in one turn.", "spellblade"),
    ]
});

/// Recruitment price derived from a monster's stats.
fn unit_cost(monster: &Monster) -> u32 {
    (monster.hp / 2 + monster.ap + monster.mp).max(1)
}

fn unit_from_monster(monster: Monster, role: UnitRole) -> Unit {
    Unit {
        id: monster.id,
        cost: unit_cost(&monster),
        name: monster.name,
        description: monster.description,
        image: monster.image,
        hp: monster.hp,
        max_hp: monster.max_hp,
        ap: monster.ap,
        mp: monster.mp,
        role,
        location: monster.location,
    }
}

/// Default catalog backed by a seedable small RNG.
#[derive(Debug, Clone)]
pub struct StandardCatalog {
    rng: SmallRng,
    next_id: CardId,
    provocateur_odds: u32,
}

impl StandardCatalog {
    pub fn new(seed: Option<u64>, provocateur_odds: u32) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            rng,
            next_id: FIRST_GENERATED_ID,
            provocateur_odds: provocateur_odds.max(1),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(Some(seed), DEFAULT_PROVOCATEUR_ODDS)
    }

    fn allocate_id(&mut self) -> CardId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(FIRST_GENERATED_ID);
        id
    }

    fn roll(&mut self, (low, high): (u32, u32)) -> u32 {
        self.rng.gen_range(low..=high.max(low))
    }

    fn roll_monster(&mut self, location: Location) -> Option<Monster> {
        let template = *bestiary(location).choose(&mut self.rng)?;
        let tier = TIERS[location.severity().min(TIERS.len() - 1)];
        let hp = self.roll(tier.hp);
        let power = self.roll(tier.power);
        let (ap, mp) = match template.affinity {
            Affinity::Physical => (power, 0),
            Affinity::Magical => (0, power),
            Affinity::Hybrid => ((power + 1) / 2, power / 2),
        };
        let gold_reward = self.roll(tier.gold);
        Some(Monster {
            id: self.allocate_id(),
            name: template.name.to_string(),
            description: template.description.to_string(),
            image: template.image.to_string(),
            hp,
            max_hp: hp,
            ap,
            mp,
            gold_reward,
            location,
        })
    }
}

impl Default for StandardCatalog {
    fn default() -> Self {
        Self::new(None, DEFAULT_PROVOCATEUR_ODDS)
    }
}

impl Catalog for StandardCatalog {
    fn heroes(&self) -> Vec<Hero> {
        HERO_TEMPLATES.clone()
    }

    fn reserve_ids(&mut self, highest_in_use: CardId) {
        if highest_in_use >= self.next_id {
            self.next_id = highest_in_use.saturating_add(1);
        }
    }

    fn generate_monsters(&mut self, location: Location, count: usize) -> Vec<Monster> {
        (0..count)
            .filter_map(|_| self.roll_monster(location))
            .collect()
    }

    fn generate_units(&mut self, location: Location, count: usize) -> Vec<Unit> {
        self.generate_monsters(location, count)
            .into_iter()
            .map(|monster| {
                let role = if self.rng.gen_ratio(1, self.provocateur_odds) {
                    UnitRole::Provocateur
                } else {
                    UnitRole::Standard
                };
                unit_from_monster(monster, role)
            })
            .collect()
    }

    fn sample_equipment(&mut self, count: usize) -> Vec<Equipment> {
        let picks: Vec<EquipmentTemplate> = ARMORY
            .choose_multiple(&mut self.rng, count)
            .copied()
            .collect();
        picks
            .into_iter()
            .map(|item| Equipment {
                id: self.allocate_id(),
                name: item.name.to_string(),
                description: item.description.to_string(),
                image: item.image.to_string(),
                slot: item.slot,
                bonus_stat: item.stat,
                bonus_amount: item.amount,
                cost: item.cost,
            })
            .collect()
    }
}

/// Deterministic catalog for tests: every generated card is a copy of a
/// configurable template with a fresh id.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct FixedCatalog {
    pub monster: Monster,
    pub unit: Unit,
    pub equipment: Equipment,
    pub heroes: Vec<Hero>,
    next_id: CardId,
}

#[cfg(test)]
impl FixedCatalog {
    pub fn new() -> Self {
        Self {
            monster: Monster {
                id: 0,
                name: "Training Dummy".into(),
                description: String::new(),
                image: String::new(),
                hp: 4,
                max_hp: 4,
                ap: 2,
                mp: 0,
                gold_reward: 2,
                location: Location::Forest,
            },
            unit: Unit {
                id: 0,
                name: "Militia".into(),
                description: String::new(),
                image: String::new(),
                hp: 5,
                max_hp: 5,
                ap: 2,
                mp: 0,
                cost: 5,
                role: UnitRole::Standard,
                location: Location::Forest,
            },
            equipment: Equipment {
                id: 0,
                name: "Shield".into(),
                description: String::new(),
                image: String::new(),
                slot: EquipmentSlot::Armor,
                bonus_stat: Stat::Dp,
                bonus_amount: 2,
                cost: 5,
            },
            heroes: HERO_TEMPLATES.clone(),
            next_id: FIRST_GENERATED_ID,
        }
    }

    fn allocate_id(&mut self) -> CardId {
        self.next_id += 1;
        self.next_id
    }
}

#[cfg(test)]
impl Catalog for FixedCatalog {
    fn heroes(&self) -> Vec<Hero> {
        self.heroes.clone()
    }

    fn generate_monsters(&mut self, location: Location, count: usize) -> Vec<Monster> {
        (0..count)
            .map(|_| Monster {
                id: self.allocate_id(),
                location,
                ..self.monster.clone()
            })
            .collect()
    }

    fn generate_units(&mut self, location: Location, count: usize) -> Vec<Unit> {
        (0..count)
            .map(|_| Unit {
                id: self.allocate_id(),
                location,
                ..self.unit.clone()
            })
            .collect()
    }

    fn sample_equipment(&mut self, count: usize) -> Vec<Equipment> {
        (0..count)
            .map(|_| Equipment {
                id: self.allocate_id(),
                ..self.equipment.clone()
            })
            .collect()
    }
}
