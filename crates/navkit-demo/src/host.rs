#![forbid(unsafe_code)]

//! A simulated colony: the host application the demo features decorate.
//!
//! It owns a stockpile filter (allowed flags plus quality and hit-point
//! ranges), a silver balance and a trader's inventory. Individual defs can
//! be marked broken to exercise host failures.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use navkit::prelude::*;
use navkit::widgets::slider::ValueFormat;

/// Host key for filter tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKey {
    /// A thing category (not stored by the host).
    Category(&'static str),
    /// A thing def.
    Def(&'static str),
    /// The quality range slider.
    Quality,
    /// The hit-point range slider.
    HitPoints,
    /// The trailing "Done" action.
    Done,
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(name) | Self::Def(name) => f.write_str(name),
            Self::Quality => f.write_str("quality"),
            Self::HitPoints => f.write_str("hit points"),
            Self::Done => f.write_str("done"),
        }
    }
}

/// Thing categories and their defs, in display order.
pub const CATEGORIES: [(&str, &[&str]); 3] = [
    ("Foods", &["Rice", "Corn", "Berries"]),
    ("Materials", &["Wood", "Steel", "Cloth"]),
    ("Medicine", &["Herbal medicine", "Medicine"]),
];

/// One trader offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Good {
    /// Display name.
    pub name: &'static str,
    /// Price in silver.
    pub price: u32,
    /// Units the trader has left.
    pub stock: u32,
}

/// The simulated host.
#[derive(Debug, Clone)]
pub struct Colony {
    allowed: BTreeMap<&'static str, bool>,
    broken: BTreeSet<&'static str>,
    quality: RangeValue,
    hit_points: RangeValue,
    silver: u32,
    goods: Vec<Good>,
    pending_trade: Option<usize>,
    log: Vec<String>,
}

impl Default for Colony {
    fn default() -> Self {
        Self::new()
    }
}

impl Colony {
    /// A colony with 100 silver, everything but Berries allowed, and a
    /// trader offering four goods.
    #[must_use]
    pub fn new() -> Self {
        let allowed = CATEGORIES
            .iter()
            .flat_map(|(_, defs)| defs.iter())
            .map(|&def| (def, def != "Berries"))
            .collect();
        Self {
            allowed,
            broken: BTreeSet::new(),
            quality: percent_range(0.05),
            hit_points: percent_range(0.05),
            silver: 100,
            goods: vec![
                Good { name: "Rice", price: 20, stock: 5 },
                Good { name: "Steel", price: 60, stock: 3 },
                Good { name: "Medicine", price: 150, stock: 2 },
                Good { name: "Cloth", price: 35, stock: 4 },
            ],
            pending_trade: None,
            log: Vec::new(),
        }
    }

    /// Use `step` for both range sliders.
    #[must_use]
    pub fn with_slider_step(mut self, step: f64) -> Self {
        self.quality = percent_range(step).with_values(self.quality.min(), self.quality.max());
        self.hit_points =
            percent_range(step).with_values(self.hit_points.min(), self.hit_points.max());
        self
    }

    /// Set the silver balance.
    #[must_use]
    pub fn with_silver(mut self, silver: u32) -> Self {
        self.silver = silver;
        self
    }

    /// Make every read and write of `def` fail.
    pub fn break_def(&mut self, def: &'static str) {
        self.broken.insert(def);
    }

    /// Silver on hand.
    #[must_use]
    pub fn silver(&self) -> u32 {
        self.silver
    }

    /// The trader's goods.
    #[must_use]
    pub fn goods(&self) -> &[Good] {
        &self.goods
    }

    /// Whether `def` is allowed in the stockpile.
    #[must_use]
    pub fn allowed(&self, def: &str) -> Option<bool> {
        self.allowed.get(def).copied()
    }

    /// Current quality range.
    #[must_use]
    pub fn quality(&self) -> RangeValue {
        self.quality
    }

    /// Current hit-point range.
    #[must_use]
    pub fn hit_points(&self) -> RangeValue {
        self.hit_points
    }

    /// Things the host did, oldest first.
    #[must_use]
    pub fn log(&self) -> &[String] {
        &self.log
    }

    /// Why `good` cannot be bought right now, if it cannot.
    #[must_use]
    pub fn purchase_blocker(&self, good: &Good) -> Option<&'static str> {
        if good.stock == 0 {
            Some("Out of stock")
        } else if good.price > self.silver {
            Some("Not enough silver")
        } else {
            None
        }
    }

    /// Remember which good the pending confirmation is about.
    pub fn stage_trade(&mut self, index: usize) -> HostResult<&Good> {
        let good = self
            .goods
            .get(index)
            .ok_or_else(|| HostError::unavailable(format!("trade offer {index}")))?;
        self.pending_trade = Some(index);
        Ok(good)
    }

    /// The staged good.
    #[must_use]
    pub fn pending_trade(&self) -> Option<&Good> {
        self.pending_trade.and_then(|i| self.goods.get(i))
    }

    /// Buy the staged good.
    pub fn complete_trade(&mut self) -> HostResult<&'static str> {
        let index = self
            .pending_trade
            .take()
            .ok_or_else(|| HostError::unavailable("pending trade"))?;
        let silver = self.silver;
        let good = self
            .goods
            .get_mut(index)
            .ok_or_else(|| HostError::unavailable(format!("trade offer {index}")))?;
        if good.stock == 0 {
            return Err(HostError::rejected("out of stock"));
        }
        if good.price > silver {
            return Err(HostError::rejected("not enough silver"));
        }
        good.stock -= 1;
        self.silver = silver - good.price;
        let name = good.name;
        self.log.push(format!("bought {name}"));
        Ok(name)
    }

    /// Drop the staged good.
    pub fn cancel_trade(&mut self) {
        self.pending_trade = None;
    }

    /// The filter tree as the host presents it right now.
    #[must_use]
    pub fn filter_tree(&self) -> TreeNode<FilterKey> {
        let categories = CATEGORIES
            .iter()
            .map(|&(name, defs)| {
                let leaves = defs
                    .iter()
                    .map(|&def| {
                        TreeNode::leaf(def, FilterKey::Def(def), self.allowed(def).unwrap_or(false))
                    })
                    .collect();
                TreeNode::category(name, FilterKey::Category(name)).with_children(leaves)
            })
            .collect();
        TreeNode::category("All things", FilterKey::Category("All things"))
            .with_children(categories)
            .with_expanded(true)
    }

    fn def(&self, key: &FilterKey) -> HostResult<&'static str> {
        let FilterKey::Def(def) = key else {
            return Err(HostError::unavailable(format!("{key} is not a thing def")));
        };
        if self.broken.contains(def) {
            return Err(HostError::missing(format!("ThingFilter.{def}")));
        }
        Ok(*def)
    }
}

impl FilterHost<FilterKey> for Colony {
    fn is_allowed(&self, key: &FilterKey) -> HostResult<bool> {
        let def = self.def(key)?;
        self.allowed
            .get(def)
            .copied()
            .ok_or_else(|| HostError::missing(format!("ThingFilter.{def}")))
    }

    fn set_allowed(&mut self, key: &FilterKey, allowed: bool) -> HostResult<()> {
        let def = self.def(key)?;
        let slot = self
            .allowed
            .get_mut(def)
            .ok_or_else(|| HostError::missing(format!("ThingFilter.{def}")))?;
        *slot = allowed;
        self.log.push(format!(
            "{} {def}",
            if allowed { "allowed" } else { "disallowed" }
        ));
        Ok(())
    }

    fn set_range(&mut self, key: &FilterKey, range: RangeValue) -> HostResult<()> {
        match key {
            FilterKey::Quality => self.quality = range,
            FilterKey::HitPoints => self.hit_points = range,
            other => {
                return Err(HostError::unavailable(format!("{other} has no range")));
            }
        }
        self.log.push(format!("{key} set to {range}"));
        Ok(())
    }
}

fn percent_range(step: f64) -> RangeValue {
    RangeValue::new(0.0, 1.0, step).with_format(ValueFormat::Percent)
}
