#![forbid(unsafe_code)]

//! Priority-ordered dispatch table.
//!
//! One row per registered feature, sorted by priority (highest first, ties
//! in registration order). Adding a feature is one `insert`; routing order is
//! the row order.

use std::fmt;

use crate::feature::{Feature, FeatureId, Priority};

/// A feature could not be registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteError {
    /// A feature with the same id is already registered.
    Duplicate(FeatureId),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(id) => write!(f, "feature already registered: {id}"),
        }
    }
}

impl std::error::Error for RouteError {}

/// One row of the table.
pub struct Route<H> {
    /// Feature id, cached from the feature.
    pub id: FeatureId,
    /// Routing priority.
    pub priority: Priority,
    /// The feature.
    pub feature: Box<dyn Feature<H>>,
}

impl<H> fmt::Debug for Route<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("active", &self.feature.is_active())
            .finish()
    }
}

/// Features sorted by routing priority.
pub struct RouteTable<H> {
    rows: Vec<Route<H>>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for RouteTable<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.rows).finish()
    }
}

impl<H> RouteTable<H> {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Register `feature` at `priority`.
    pub fn insert(
        &mut self,
        priority: Priority,
        feature: Box<dyn Feature<H>>,
    ) -> Result<(), RouteError> {
        let id = feature.id();
        if self.contains(id) {
            return Err(RouteError::Duplicate(id));
        }
        let at = self
            .rows
            .iter()
            .position(|row| row.priority < priority)
            .unwrap_or(self.rows.len());
        self.rows.insert(
            at,
            Route {
                id,
                priority,
                feature,
            },
        );
        Ok(())
    }

    /// Unregister a feature.
    pub fn remove(&mut self, id: FeatureId) -> Option<Box<dyn Feature<H>>> {
        let at = self.rows.iter().position(|row| row.id == id)?;
        Some(self.rows.remove(at).feature)
    }

    /// Whether `id` is registered.
    #[must_use]
    pub fn contains(&self, id: FeatureId) -> bool {
        self.rows.iter().any(|row| row.id == id)
    }

    /// The row for `id`.
    #[must_use]
    pub fn get(&self, id: FeatureId) -> Option<&Route<H>> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// The row for `id`, mutably.
    pub fn get_mut(&mut self, id: FeatureId) -> Option<&mut Route<H>> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    /// Priority of `id`.
    #[must_use]
    pub fn priority(&self, id: FeatureId) -> Option<Priority> {
        self.get(id).map(|row| row.priority)
    }

    /// Whether `id` is registered and active.
    #[must_use]
    pub fn is_active(&self, id: FeatureId) -> bool {
        self.get(id).is_some_and(|row| row.feature.is_active())
    }

    /// Whether any feature is active.
    #[must_use]
    pub fn any_active(&self) -> bool {
        self.rows.iter().any(|row| row.feature.is_active())
    }

    /// Rows in routing order.
    pub fn iter(&self) -> impl Iterator<Item = &Route<H>> {
        self.rows.iter()
    }

    /// Rows in routing order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Route<H>> {
        self.rows.iter_mut()
    }

    /// Ids in routing order.
    #[must_use]
    pub fn ids(&self) -> Vec<FeatureId> {
        self.rows.iter().map(|row| row.id).collect()
    }

    /// Ids of active features in routing order.
    #[must_use]
    pub fn active_ids(&self) -> Vec<FeatureId> {
        self.rows
            .iter()
            .filter(|row| row.feature.is_active())
            .map(|row| row.id)
            .collect()
    }

    /// Ids of inactive features in routing order.
    #[must_use]
    pub fn inactive_ids(&self) -> Vec<FeatureId> {
        self.rows
            .iter()
            .filter(|row| !row.feature.is_active())
            .map(|row| row.id)
            .collect()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
