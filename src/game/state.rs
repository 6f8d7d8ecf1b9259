use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// Identifier carried by every generated card.
pub type CardId = u32;
/// Player identifier, `1` or `2`.
pub type PlayerId = u8;

pub const PLAYER_ONE: PlayerId = 1;
pub const PLAYER_TWO: PlayerId = 2;

/// Ordered sequence of places the duel travels through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Forest,
    Ruins,
    Catacombs,
    Necropolis,
    Chthonian,
    Crypt,
}

impl Default for Location {
    fn default() -> Self {
        Location::Forest
    }
}

impl Location {
    pub const ALL: [Location; 6] = [
        Location::Forest,
        Location::Ruins,
        Location::Catacombs,
        Location::Necropolis,
        Location::Chthonian,
        Location::Crypt,
    ];

    /// Position in the travel order; higher is harder.
    pub fn severity(self) -> usize {
        Self::ALL
            .iter()
            .position(|location| *location == self)
            .unwrap_or_default()
    }

    pub fn name(self) -> &'static str {
        match self {
            Location::Forest => "Forest",
            Location::Ruins => "Ruins",
            Location::Catacombs => "Catacombs",
            Location::Necropolis => "Necropolis",
            Location::Chthonian => "Chthonian Depths",
            Location::Crypt => "Crypt",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Location::Forest => "Dense woods where wolves and goblins prey on the unwary.",
            Location::Ruins => "Crumbling walls of a fallen keep, haunted by bandits and golems.",
            Location::Catacombs => "Bone-lined tunnels where the restless dead keep watch.",
            Location::Necropolis => "A city of tombs ruled by liches and their servants.",
            Location::Chthonian => "Burning caverns beneath the world, home to fiends.",
            Location::Crypt => "The final vault. Nothing that enters leaves unchanged.",
        }
    }
}

/// The six hero statistics equipment can raise.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    Hp,
    Ap,
    Mp,
    Dp,
    Rp,
    Sp,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HeroClass {
    Warrior,
    Mage,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttackType {
    Physical,
    Magical,
}

impl FromStr for AttackType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "physical" | "ap" => Ok(AttackType::Physical),
            "magical" | "magic" | "mp" => Ok(AttackType::Magical),
            _ => Err(()),
        }
    }
}

/// Who is acting: the hero alone, or the pooled unit roster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    Hero,
    Unit,
}

impl FromStr for ActorKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hero" => Ok(ActorKind::Hero),
            "unit" | "units" => Ok(ActorKind::Unit),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnitRole {
    Standard,
    Provocateur,
}

impl Default for UnitRole {
    fn default() -> Self {
        UnitRole::Standard
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentSlot {
    Weapon,
    Armor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Hero {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub class: HeroClass,
    pub hp: u32,
    pub max_hp: u32,
    pub ap: u32,
    pub mp: u32,
    pub dp: u32,
    pub rp: u32,
    pub sp: u32,
}

impl Hero {
    pub fn new(id: CardId, name: impl Into<String>, class: HeroClass) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            image: String::new(),
            class,
            hp: 1,
            max_hp: 1,
            ap: 0,
            mp: 0,
            dp: 0,
            rp: 0,
            sp: 1,
        }
    }

    pub fn with_stats(mut self, max_hp: u32, ap: u32, mp: u32, dp: u32, rp: u32, sp: u32) -> Self {
        self.hp = max_hp;
        self.max_hp = max_hp;
        self.ap = ap;
        self.mp = mp;
        self.dp = dp;
        self.rp = rp;
        self.sp = sp;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>, image: impl Into<String>) -> Self {
        self.description = description.into();
        self.image = image.into();
        self
    }

    pub fn power(&self, attack_type: AttackType) -> u32 {
        match attack_type {
            AttackType::Physical => self.ap,
            AttackType::Magical => self.mp,
        }
    }

    pub fn can_attack(&self) -> bool {
        self.ap > 0 || self.mp > 0
    }

    /// The only attack type this hero can use, if it has exactly one.
    pub fn single_attack_type(&self) -> Option<AttackType> {
        match (self.ap > 0, self.mp > 0) {
            (true, false) => Some(AttackType::Physical),
            (false, true) => Some(AttackType::Magical),
            _ => None,
        }
    }

    /// Applies damage floored at zero and returns the damage actually taken.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.hp);
        self.hp -= taken;
        taken
    }

    /// Permanent stat increase from equipment. Health raises both current and max.
    pub fn apply_bonus(&mut self, stat: Stat, amount: u32) {
        match stat {
            Stat::Hp => {
                self.max_hp = self.max_hp.saturating_add(amount);
                self.hp = self.hp.saturating_add(amount);
            }
            Stat::Ap => self.ap = self.ap.saturating_add(amount),
            Stat::Mp => self.mp = self.mp.saturating_add(amount),
            Stat::Dp => self.dp = self.dp.saturating_add(amount),
            Stat::Rp => self.rp = self.rp.saturating_add(amount),
            Stat::Sp => self.sp = self.sp.saturating_add(amount),
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Unit {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub hp: u32,
    pub max_hp: u32,
    pub ap: u32,
    pub mp: u32,
    pub cost: u32,
    #[serde(default)]
    pub role: UnitRole,
    #[serde(default)]
    pub location: Location,
}

impl Unit {
    pub fn is_provocateur(&self) -> bool {
        self.role == UnitRole::Provocateur
    }

    pub fn power(&self, attack_type: AttackType) -> u32 {
        match attack_type {
            AttackType::Physical => self.ap,
            AttackType::Magical => self.mp,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Monster {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub hp: u32,
    pub max_hp: u32,
    pub ap: u32,
    pub mp: u32,
    pub gold_reward: u32,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Equipment {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(rename = "equipment_type")]
    pub slot: EquipmentSlot,
    pub bonus_stat: Stat,
    pub bonus_amount: u32,
    pub cost: u32,
}

/// Every card the engine handles, discriminated by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Card {
    Hero(Hero),
    Unit(Unit),
    Monster(Monster),
    Equipment(Equipment),
}

impl Card {
    pub fn id(&self) -> CardId {
        match self {
            Card::Hero(hero) => hero.id,
            Card::Unit(unit) => unit.id,
            Card::Monster(monster) => monster.id,
            Card::Equipment(equipment) => equipment.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Card::Hero(hero) => &hero.name,
            Card::Unit(unit) => &unit.name,
            Card::Monster(monster) => &monster.name,
            Card::Equipment(equipment) => &equipment.name,
        }
    }

    /// Purchase price; only units and equipment are for sale.
    pub fn cost(&self) -> Option<u32> {
        match self {
            Card::Unit(unit) => Some(unit.cost),
            Card::Equipment(equipment) => Some(equipment.cost),
            Card::Hero(_) | Card::Monster(_) => None,
        }
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        match &mut self {
            Card::Unit(unit) => unit.cost = cost,
            Card::Equipment(equipment) => equipment.cost = cost,
            Card::Hero(_) | Card::Monster(_) => {}
        }
        self
    }

    pub fn is_purchasable(&self) -> bool {
        self.cost().is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EquipmentSlots {
    pub weapon: Option<Equipment>,
    pub armor: Option<Equipment>,
}

impl EquipmentSlots {
    /// Places the item in its slot and returns whatever it displaced.
    pub fn equip(&mut self, equipment: Equipment) -> Option<Equipment> {
        let slot = match equipment.slot {
            EquipmentSlot::Weapon => &mut self.weapon,
            EquipmentSlot::Armor => &mut self.armor,
        };
        slot.replace(equipment)
    }

    pub fn get(&self, slot: EquipmentSlot) -> Option<&Equipment> {
        match slot {
            EquipmentSlot::Weapon => self.weapon.as_ref(),
            EquipmentSlot::Armor => self.armor.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub hero: Option<Hero>,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub equipment: EquipmentSlots,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            hero: None,
            units: Vec::new(),
            gold: 0,
            equipment: EquipmentSlots::default(),
        }
    }

    pub fn with_hero(mut self, hero: Hero) -> Self {
        self.hero = Some(hero);
        self
    }

    pub fn total_unit_hp(&self) -> u32 {
        self.units
            .iter()
            .map(|unit| unit.hp)
            .fold(0, u32::saturating_add)
    }

    /// Pooled power of the whole roster for one attack type.
    pub fn unit_power(&self, attack_type: AttackType) -> u32 {
        self.units
            .iter()
            .map(|unit| unit.power(attack_type))
            .fold(0, u32::saturating_add)
    }

    /// Index of the first provocateur in roster order.
    pub fn provocateur_index(&self) -> Option<usize> {
        self.units.iter().position(Unit::is_provocateur)
    }
}

/// Coarse game phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Setup,
    ChooseHero,
    Player1Turn,
    Player2Turn,
    GameOver,
}

impl Default for GamePhase {
    fn default() -> Self {
        Self::Setup
    }
}

impl GamePhase {
    pub fn turn_of(player_id: PlayerId) -> Self {
        if player_id == PLAYER_TWO {
            GamePhase::Player2Turn
        } else {
            GamePhase::Player1Turn
        }
    }

    pub fn is_player_turn(self) -> bool {
        matches!(self, GamePhase::Player1Turn | GamePhase::Player2Turn)
    }
}

/// Sub-phase inside a player's turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionPhase {
    Buy,
    HeroAction,
    UnitAction,
    End,
}

impl Default for ActionPhase {
    fn default() -> Self {
        Self::Buy
    }
}

impl ActionPhase {
    /// Following sub-phase, or `None` from `End` (the turn passes instead).
    pub fn next(self) -> Option<Self> {
        match self {
            ActionPhase::Buy => Some(ActionPhase::HeroAction),
            ActionPhase::HeroAction => Some(ActionPhase::UnitAction),
            ActionPhase::UnitAction => Some(ActionPhase::End),
            ActionPhase::End => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionsUsed {
    pub buy: bool,
    pub hero_action: bool,
    pub unit_action: bool,
}

/// Actor chosen for the pending attack.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    pub actor: ActorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_index: Option<usize>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Target {
    Hero { player_id: PlayerId },
    Unit { player_id: PlayerId, index: usize },
    Monster { index: usize },
}

impl Target {
    /// Owning player of a hero or unit target; monsters belong to nobody.
    pub fn defender(&self) -> Option<PlayerId> {
        match self {
            Target::Hero { player_id } | Target::Unit { player_id, .. } => Some(*player_id),
            Target::Monster { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum VictoryReason {
    HeroDefeated { loser: PlayerId },
    KilledByMonster { loser: PlayerId, monster_id: CardId },
    DayLimitReached { day: u32 },
}

/// Final result; `winner` is `None` for a draw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VictoryState {
    pub winner: Option<PlayerId>,
    pub reason: VictoryReason,
}

/// Structured record of everything an operation changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    GameInitialized,
    HeroSelected {
        player_id: PlayerId,
        hero_id: CardId,
    },
    TurnStarted {
        player_id: PlayerId,
        day: u32,
        location: Location,
    },
    LocationChanged {
        from: Location,
        to: Location,
    },
    GoldGranted {
        player_id: PlayerId,
        amount: u32,
        balance: u32,
    },
    PhaseAdvanced {
        player_id: PlayerId,
        from: ActionPhase,
        to: ActionPhase,
    },
    PhaseSkipped {
        player_id: PlayerId,
        phase: ActionPhase,
    },
    CardPurchased {
        player_id: PlayerId,
        card: Card,
        price: u32,
    },
    EquipmentEquipped {
        player_id: PlayerId,
        equipment_id: CardId,
        slot: EquipmentSlot,
        #[serde(skip_serializing_if = "Option::is_none")]
        displaced: Option<CardId>,
    },
    ShopRestocked {
        location: Location,
        offers: usize,
    },
    MonstersSpawned {
        location: Location,
        monster_ids: Vec<CardId>,
    },
    ActorSelected {
        player_id: PlayerId,
        actor: ActorKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        attack_type: Option<AttackType>,
    },
    AttackRepelled {
        player_id: PlayerId,
        target: Target,
        attack_value: u32,
        threshold: u32,
    },
    HeroDamaged {
        attacker: PlayerId,
        defender: PlayerId,
        amount: u32,
        remaining_hp: u32,
    },
    UnitsDestroyed {
        player_id: PlayerId,
        unit_ids: Vec<CardId>,
    },
    MonsterDefeated {
        player_id: PlayerId,
        monster_id: CardId,
        gold_reward: u32,
    },
    Counterattack {
        player_id: PlayerId,
        monster_id: CardId,
        amount: u32,
        remaining_hp: u32,
    },
    GameOver {
        #[serde(skip_serializing_if = "Option::is_none")]
        winner: Option<PlayerId>,
        reason: VictoryReason,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, thiserror::Error)]
#[serde(tag = "type")]
pub enum IntegrityError {
    #[error("player {player_id} is not part of this duel")]
    InvalidPlayer { player_id: PlayerId },
    #[error("card {card_id} appears more than once")]
    DuplicateCardId { card_id: CardId },
    #[error("hero of player {player_id} has {hp} hp above its maximum {max_hp}")]
    HealthAboveMaximum {
        player_id: PlayerId,
        hp: u32,
        max_hp: u32,
    },
    #[error("targeting mode and selection disagree")]
    TargetingMismatch,
    #[error("shop offer {index} is not for sale")]
    UnsellableOffer { index: usize },
    #[error("current player {player_id} does not match the game phase")]
    TurnMismatch { player_id: PlayerId },
}

/// Root aggregate. Operations never mutate a snapshot in place; they hand back a new one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameState {
    pub players: [Player; 2],
    pub current_player: PlayerId,
    #[serde(default)]
    pub monsters: Vec<Monster>,
    #[serde(default)]
    pub shop: Vec<Card>,
    pub game_phase: GamePhase,
    pub action_phase: ActionPhase,
    #[serde(default)]
    pub actions_used: ActionsUsed,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
    #[serde(default)]
    pub targeting_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_type: Option<AttackType>,
    pub day: u32,
    pub location: Location,
    #[serde(default)]
    pub remaining_hero_actions: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<VictoryState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub event_log: Vec<GameEvent>,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            players: [Player::new(PLAYER_ONE), Player::new(PLAYER_TWO)],
            current_player: PLAYER_ONE,
            monsters: Vec::new(),
            shop: Vec::new(),
            game_phase: GamePhase::Setup,
            action_phase: ActionPhase::Buy,
            actions_used: ActionsUsed::default(),
            selection: None,
            targeting_mode: false,
            attack_type: None,
            day: 1,
            location: Location::default(),
            remaining_hero_actions: 0,
            outcome: None,
            event_log: Vec::new(),
        }
    }

    pub fn with_phase(mut self, phase: GamePhase) -> Self {
        self.game_phase = phase;
        self
    }

    pub fn record_event(&mut self, event: GameEvent) {
        self.event_log.push(event);
    }

    /// Drops the oldest events so at most `limit` remain.
    pub fn trim_event_log(&mut self, limit: usize) {
        let excess = self.event_log.len().saturating_sub(limit);
        self.event_log.drain(..excess);
    }

    pub fn player_index(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|player| player.id == id)
    }

    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }

    pub fn opponent_of(&self, player_id: PlayerId) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|player| player.id != player_id)
            .map(|player| player.id)
    }

    pub fn current(&self) -> Option<&Player> {
        self.get_player(self.current_player)
    }

    pub fn current_mut(&mut self) -> Option<&mut Player> {
        let id = self.current_player;
        self.get_player_mut(id)
    }

    pub fn is_player_turn(&self) -> bool {
        self.game_phase.is_player_turn()
    }

    pub fn is_finished(&self) -> bool {
        self.game_phase == GamePhase::GameOver
    }

    pub fn both_heroes_chosen(&self) -> bool {
        self.players.iter().all(|player| player.hero.is_some())
    }

    /// Drops the pending actor, targeting flag and attack type together.
    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.targeting_mode = false;
        self.attack_type = None;
    }

    /// Day within the current location, counting from 1.
    pub fn location_day(&self, days_per_location: u32) -> u32 {
        if days_per_location == 0 {
            return 1;
        }
        (self.day.saturating_sub(1) % days_per_location) + 1
    }

    pub fn days_remaining(&self, day_limit: u32) -> u32 {
        day_limit.saturating_sub(self.day)
    }

    pub fn declare_victory(&mut self, winner: Option<PlayerId>, reason: VictoryReason) -> VictoryState {
        let victory = VictoryState { winner, reason };
        if self.outcome.is_none() {
            self.record_event(GameEvent::GameOver {
                winner: victory.winner,
                reason: victory.reason.clone(),
            });
            self.outcome = Some(victory.clone());
        }
        self.game_phase = GamePhase::GameOver;
        self.clear_selection();
        victory
    }

    /// Ends the game if a hero already sits at zero health.
    pub fn evaluate_victory(&mut self) -> Option<VictoryState> {
        if let Some(outcome) = &self.outcome {
            return Some(outcome.clone());
        }
        if !self.is_player_turn() {
            return None;
        }

        let loser = self
            .players
            .iter()
            .find(|player| player.hero.as_ref().is_some_and(Hero::is_defeated))
            .map(|player| player.id)?;
        let winner = self.opponent_of(loser);
        Some(self.declare_victory(winner, VictoryReason::HeroDefeated { loser }))
    }

    /// Highest id among units, monsters and shop offers.
    pub fn highest_card_id(&self) -> CardId {
        let units = self.players.iter().flat_map(|player| player.units.iter().map(|unit| unit.id));
        let monsters = self.monsters.iter().map(|monster| monster.id);
        let offers = self.shop.iter().map(Card::id);
        units.chain(monsters).chain(offers).max().unwrap_or_default()
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        for (slot, player) in self.players.iter().enumerate() {
            if usize::from(player.id) != slot + 1 {
                return Err(IntegrityError::InvalidPlayer {
                    player_id: player.id,
                });
            }
        }
        if self.player_index(self.current_player).is_none() {
            return Err(IntegrityError::InvalidPlayer {
                player_id: self.current_player,
            });
        }
        if self.is_player_turn() && self.game_phase != GamePhase::turn_of(self.current_player) {
            return Err(IntegrityError::TurnMismatch {
                player_id: self.current_player,
            });
        }
        if self.targeting_mode != self.selection.is_some() {
            return Err(IntegrityError::TargetingMismatch);
        }

        let mut seen = HashSet::new();
        for player in &self.players {
            if let Some(hero) = &player.hero {
                if hero.hp > hero.max_hp {
                    return Err(IntegrityError::HealthAboveMaximum {
                        player_id: player.id,
                        hp: hero.hp,
                        max_hp: hero.max_hp,
                    });
                }
            }
            for unit in &player.units {
                if !seen.insert(unit.id) {
                    return Err(IntegrityError::DuplicateCardId { card_id: unit.id });
                }
            }
        }
        for monster in &self.monsters {
            if !seen.insert(monster.id) {
                return Err(IntegrityError::DuplicateCardId {
                    card_id: monster.id,
                });
            }
        }
        for (index, card) in self.shop.iter().enumerate() {
            if !card.is_purchasable() {
                return Err(IntegrityError::UnsellableOffer { index });
            }
            if !seen.insert(card.id()) {
                return Err(IntegrityError::DuplicateCardId { card_id: card.id() });
            }
        }

        Ok(())
    }

    /// A mid-duel snapshot for front-end debugging: player one in the buy phase
    /// on day 2 with a full shop, two monsters and a provocateur guarding player two.
    pub fn sample() -> Self {
        let knight = Hero::new(1, "Knight", HeroClass::Warrior)
            .with_stats(30, 6, 0, 3, 1, 1)
            .with_description("A sworn blade of the old kingdom.", "knight");
        let sorceress = Hero::new(2, "Sorceress", HeroClass::Mage)
            .with_stats(24, 0, 7, 1, 3, 1)
            .with_description("Commands storm and flame alike.", "sorceress");

        let wolf = Unit {
            id: 101,
            name: "Grey Wolf".into(),
            description: "Hunts in packs.".into(),
            image: "wolf".into(),
            hp: 5,
            max_hp: 5,
            ap: 2,
            mp: 0,
            cost: 3,
            role: UnitRole::Standard,
            location: Location::Forest,
        };
        let treant = Unit {
            id: 102,
            name: "Young Treant".into(),
            description: "Roots itself in front of its allies.".into(),
            image: "treant".into(),
            hp: 8,
            max_hp: 8,
            ap: 1,
            mp: 1,
            cost: 4,
            role: UnitRole::Provocateur,
            location: Location::Forest,
        };

        let goblin = Monster {
            id: 201,
            name: "Goblin".into(),
            description: "A sneaky goblin that likes shiny things.".into(),
            image: "goblin".into(),
            hp: 5,
            max_hp: 5,
            ap: 2,
            mp: 0,
            gold_reward: 2,
            location: Location::Forest,
        };
        let sprite = Monster {
            id: 202,
            name: "Wisp".into(),
            description: "A flickering light that burns to the touch.".into(),
            image: "wisp".into(),
            hp: 4,
            max_hp: 4,
            ap: 0,
            mp: 3,
            gold_reward: 2,
            location: Location::Forest,
        };

        let boar = Unit {
            id: 301,
            name: "Wild Boar".into(),
            description: "Charges anything that moves.".into(),
            image: "boar".into(),
            hp: 6,
            max_hp: 6,
            ap: 3,
            mp: 0,
            cost: 4,
            role: UnitRole::Standard,
            location: Location::Forest,
        };
        let sword = Equipment {
            id: 302,
            name: "Sword".into(),
            description: "A sharp sword that increases attack.".into(),
            image: "sword".into(),
            slot: EquipmentSlot::Weapon,
            bonus_stat: Stat::Ap,
            bonus_amount: 2,
            cost: 3,
        };

        let mut player_one = Player::new(PLAYER_ONE).with_hero(knight);
        player_one.gold = 5;
        player_one.units.push(wolf);
        let mut player_two = Player::new(PLAYER_TWO).with_hero(sorceress);
        player_two.units.push(treant);

        let mut state = GameState::new().with_phase(GamePhase::Player1Turn);
        state.players = [player_one, player_two];
        state.monsters = vec![goblin, sprite];
        state.shop = vec![Card::Unit(boar), Card::Equipment(sword)];
        state.day = 2;
        state.remaining_hero_actions = 1;
        state.record_event(GameEvent::TurnStarted {
            player_id: PLAYER_ONE,
            day: 2,
            location: Location::Forest,
        });
        state
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_state_is_consistent() {
        let state = GameState::sample();
        assert_eq!(state.integrity_check(), Ok(()));
        assert_eq!(state.game_phase, GamePhase::Player1Turn);
        assert_eq!(state.get_player(2).and_then(Player::provocateur_index), Some(0));
    }

    #[test]
    fn health_bonus_raises_current_and_maximum() {
        let mut hero = Hero::new(9, "Tester", HeroClass::Warrior).with_stats(20, 3, 0, 1, 1, 1);
        hero.take_damage(5);
        hero.apply_bonus(Stat::Hp, 4);
        assert_eq!(hero.max_hp, 24);
        assert_eq!(hero.hp, 19);
    }

    #[test]
    fn damage_floors_at_zero() {
        let mut hero = Hero::new(9, "Tester", HeroClass::Mage).with_stats(6, 0, 4, 1, 1, 1);
        assert_eq!(hero.take_damage(10), 6);
        assert!(hero.is_defeated());
    }

    #[test]
    fn equipping_replaces_slot_item() {
        let mut slots = EquipmentSlots::default();
        let mut first = Equipment {
            id: 1,
            name: "Helmet".into(),
            description: String::new(),
            image: String::new(),
            slot: EquipmentSlot::Armor,
            bonus_stat: Stat::Dp,
            bonus_amount: 1,
            cost: 2,
        };
        assert!(slots.equip(first.clone()).is_none());
        first.id = 2;
        let displaced = slots.equip(first).expect("previous armor is returned");
        assert_eq!(displaced.id, 1);
        assert_eq!(slots.get(EquipmentSlot::Armor).map(|item| item.id), Some(2));
        assert!(slots.weapon.is_none());
    }

    #[test]
    fn roster_totals_saturate() {
        let mut player = GameState::sample().players[1].clone();
        let mut twin = player.units[0].clone();
        twin.id = 103;
        player.units.push(twin);
        for unit in &mut player.units {
            unit.hp = u32::MAX;
            unit.mp = u32::MAX;
        }
        assert_eq!(player.total_unit_hp(), u32::MAX);
        assert_eq!(player.unit_power(AttackType::Magical), u32::MAX);
        assert_eq!(player.unit_power(AttackType::Physical), 2);
    }

    #[test]
    fn targeting_flag_must_follow_selection() {
        let mut state = GameState::sample();
        state.targeting_mode = true;
        assert_eq!(state.integrity_check(), Err(IntegrityError::TargetingMismatch));
    }

    #[test]
    fn location_day_cycles_within_location() {
        let mut state = GameState::new();
        state.day = 4;
        assert_eq!(state.location_day(3), 1);
        state.day = 6;
        assert_eq!(state.location_day(3), 3);
        assert_eq!(state.days_remaining(18), 12);
    }

    #[test]
    fn actor_and_attack_type_parse_loosely() {
        assert_eq!("Units".parse::<ActorKind>(), Ok(ActorKind::Unit));
        assert_eq!("magic".parse::<AttackType>(), Ok(AttackType::Magical));
        assert!("ranged".parse::<AttackType>().is_err());
    }

    #[test]
    fn card_json_uses_type_discriminant() {
        let state = GameState::sample();
        let json = serde_json::to_value(&state.shop[1]).expect("card serializes");
        assert_eq!(json["type"], "equipment");
        assert_eq!(json["equipment_type"], "weapon");
        assert_eq!(json["bonus_stat"], "ap");
    }
}
