//! Shop pricing, restocking and purchases.

use super::catalog::Catalog;
use super::config::EngineConfig;
use super::rules::{Outcome, Report, RuleError};
use super::state::{ActionPhase, Card, GameEvent, GameState, Location};

/// Discounted price: `max(1, floor(cost * percent / 100))`.
pub fn reduce_cost(cost: u32, percent: u32) -> u32 {
    let reduced = u64::from(cost) * u64::from(percent) / 100;
    u32::try_from(reduced).unwrap_or(u32::MAX).max(1)
}

pub fn discounted(card: Card, config: &EngineConfig) -> Card {
    match card.cost() {
        Some(cost) => card.with_cost(reduce_cost(cost, config.cost_reduction_percent)),
        None => card,
    }
}

/// Fresh offer list for `location`: units first, then equipment.
pub fn build_shop<C: Catalog>(catalog: &mut C, location: Location, config: &EngineConfig) -> Vec<Card> {
    let units = catalog
        .generate_units(location, config.unit_offers)
        .into_iter()
        .map(Card::Unit);
    let equipment = catalog
        .sample_equipment(config.equipment_offers)
        .into_iter()
        .map(Card::Equipment);
    units
        .chain(equipment)
        .map(|card| discounted(card, config))
        .collect()
}

/// A same-kind replacement for an offer that was just bought.
pub fn replacement_offer<C: Catalog>(
    catalog: &mut C,
    bought: &Card,
    location: Location,
    config: &EngineConfig,
) -> Option<Card> {
    let card = match bought {
        Card::Unit(_) => catalog.generate_units(location, 1).into_iter().next().map(Card::Unit),
        Card::Equipment(_) => catalog.sample_equipment(1).into_iter().next().map(Card::Equipment),
        Card::Hero(_) | Card::Monster(_) => None,
    }?;
    Some(discounted(card, config))
}

pub fn can_afford_any(shop: &[Card], gold: u32) -> bool {
    shop.iter()
        .filter_map(Card::cost)
        .any(|cost| cost <= gold)
}

pub(crate) fn restock_shop<C: Catalog>(
    state: &mut GameState,
    catalog: &mut C,
    config: &EngineConfig,
    report: &mut Report,
) {
    state.shop = build_shop(catalog, state.location, config);
    report.event(GameEvent::ShopRestocked {
        location: state.location,
        offers: state.shop.len(),
    });
}

/// Validates and applies one purchase for the current player.
pub(crate) fn purchase<C: Catalog>(
    state: &mut GameState,
    offer_index: usize,
    catalog: &mut C,
    config: &EngineConfig,
    report: &mut Report,
) -> Result<(), RuleError> {
    if state.actions_used.buy {
        return Err(RuleError::ActionAlreadyUsed {
            phase: ActionPhase::Buy,
        });
    }

    let offer = state
        .shop
        .get(offer_index)
        .cloned()
        .ok_or(RuleError::OfferNotFound { index: offer_index })?;
    let price = offer
        .cost()
        .ok_or(RuleError::OfferNotFound { index: offer_index })?;

    let player_id = state.current_player;
    let player = state
        .get_player_mut(player_id)
        .ok_or(RuleError::PlayerNotFound { player_id })?;
    if player.gold < price {
        return Err(RuleError::InsufficientGold {
            required: price,
            available: player.gold,
        });
    }

    match offer.clone() {
        Card::Unit(unit) => {
            if player.units.len() >= config.max_units {
                return Err(RuleError::UnitLimitReached {
                    limit: config.max_units,
                });
            }
            player.gold -= price;
            report.notify(Outcome::success(
                format!("Recruited {}!", unit.name),
                format!("{} joins your ranks for {price} gold.", unit.name),
            ));
            player.units.push(unit);
        }
        Card::Equipment(equipment) => {
            let hero = player
                .hero
                .as_mut()
                .ok_or(RuleError::NoHero { player_id })?;
            hero.apply_bonus(equipment.bonus_stat, equipment.bonus_amount);
            player.gold -= price;

            let equipment_id = equipment.id;
            let slot = equipment.slot;
            report.notify(Outcome::success(
                format!("Equipped {}!", equipment.name),
                format!(
                    "+{} {:?} for {price} gold.",
                    equipment.bonus_amount, equipment.bonus_stat
                ),
            ));
            let displaced = player.equipment.equip(equipment).map(|item| item.id);
            report.event(GameEvent::EquipmentEquipped {
                player_id,
                equipment_id,
                slot,
                displaced,
            });
        }
        Card::Hero(_) | Card::Monster(_) => {
            return Err(RuleError::OfferNotFound { index: offer_index });
        }
    }

    match replacement_offer(catalog, &offer, state.location, config) {
        Some(card) => state.shop[offer_index] = card,
        None => {
            state.shop.remove(offer_index);
        }
    }
    state.actions_used.buy = true;
    report.event(GameEvent::CardPurchased {
        player_id,
        card: offer,
        price,
    });
    Ok(())
}
