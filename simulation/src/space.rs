//! Toroidal sparse grid: food growth, occupancy tracking, movement.
//!
//! `Space` is the sole owner of `Location` lifetime and the only module that
//! touches the `cells`/`occupants` pair. Agents never hold a location; they
//! are resolved through the occupant index on every use.

use std::collections::{BTreeMap, HashMap, HashSet};

use hecs::Entity;
use rand::Rng;
use thiserror::Error;

/// Radius searched around a random drop point when looking for an existing
/// food cluster to join.
const CLUSTER_RADIUS: i64 = 4;

/// Fatal index-corruption errors. These must surface to the caller; a silent
/// no-op would hide a broken occupancy invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpaceError {
    #[error("agent {0:?} is already present in the space")]
    AlreadyPresent(Entity),
    #[error("agent {0:?} is not present at its mapped location")]
    NotPresent(Entity),
    #[error("agent {0:?} is not tracked by the space")]
    NotTracked(Entity),
}

/// A growing pile of food at one cell. Never exists with `amount == 0`; the
/// owning `Location` deletes it instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Food {
    amount: u64,
}

impl Food {
    pub fn new(amount: u64) -> Self {
        Self { amount }
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn add(&mut self, amount: u64) {
        self.amount += amount;
    }

    /// Attempt to take `amount` from the pile:
    ///
    /// * `n > 0`: success, pile lives on (`n == amount`).
    /// * `n == 0`: success, but the pile is exactly exhausted.
    /// * `n < 0`: `amount` exceeded the pile; `-n` was actually taken.
    ///
    /// On the two non-positive outcomes the caller must destroy the pile;
    /// the pile does not delete itself.
    pub fn subtract(&mut self, amount: u64) -> i64 {
        if amount > self.amount {
            -(self.amount as i64)
        } else if amount == self.amount {
            self.amount = 0;
            0
        } else {
            self.amount -= amount;
            amount as i64
        }
    }
}

/// One cell of the sparse grid: an optional food pile plus the agents
/// standing there, in arrival order.
#[derive(Debug)]
pub struct Location {
    pub coords: (i64, i64),
    food: Option<Food>,
    occupants: Vec<Entity>,
}

impl Location {
    fn new(coords: (i64, i64)) -> Self {
        Self {
            coords,
            food: None,
            occupants: Vec::new(),
        }
    }

    /// Empty cells must not linger in the grid; they are reclaimed lazily on
    /// the next full scan.
    pub fn is_empty(&self) -> bool {
        self.food.is_none() && self.occupants.is_empty()
    }

    pub fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }

    pub fn has_food(&self) -> bool {
        self.food.is_some()
    }

    pub fn food_amount(&self) -> u64 {
        self.food.as_ref().map(Food::amount).unwrap_or(0)
    }

    pub fn occupants(&self) -> &[Entity] {
        &self.occupants
    }

    fn enter(&mut self, agent: Entity) -> Result<(), SpaceError> {
        if self.occupants.contains(&agent) {
            return Err(SpaceError::AlreadyPresent(agent));
        }
        self.occupants.push(agent);
        Ok(())
    }

    fn leave(&mut self, agent: Entity) -> Result<(), SpaceError> {
        match self.occupants.iter().position(|&o| o == agent) {
            Some(idx) => {
                self.occupants.remove(idx);
                Ok(())
            }
            None => Err(SpaceError::NotPresent(agent)),
        }
    }

    fn add_food(&mut self, amount: u64) {
        match self.food.as_mut() {
            Some(food) => food.add(amount),
            None => self.food = Some(Food::new(amount)),
        }
    }

    /// Eat up to `amount` from the cell, returning the yield actually
    /// obtained. An exhausted pile is destroyed here.
    fn eat(&mut self, amount: u64) -> u64 {
        let Some(food) = self.food.as_mut() else {
            return 0;
        };
        let res = food.subtract(amount);
        if res <= 0 {
            self.food = None;
            if res == 0 {
                // Finished the pile off exactly.
                amount
            } else {
                (-res) as u64
            }
        } else {
            res as u64
        }
    }
}

/// The world grid: a torus of `dimension` x `dimension` cells, stored
/// sparsely, with an inverse index from agent to coordinates.
#[derive(Debug)]
pub struct Space {
    dimension: i64,
    food_growth_rate: u32,
    cells: BTreeMap<(i64, i64), Location>,
    occupants: HashMap<Entity, (i64, i64)>,
    calories: u64,
}

impl Space {
    pub fn new(dimension: i64, food_growth_rate: u32) -> Self {
        assert!(dimension > 0, "grid dimension must be positive");
        Self {
            dimension,
            food_growth_rate,
            cells: BTreeMap::new(),
            occupants: HashMap::new(),
            calories: 0,
        }
    }

    pub fn dimension(&self) -> i64 {
        self.dimension
    }

    /// Total food ever deposited, a diagnostic counter only.
    pub fn total_calories(&self) -> u64 {
        self.calories
    }

    /// Food currently stored across all cells.
    pub fn total_food(&self) -> u64 {
        self.cells.values().map(Location::food_amount).sum()
    }

    pub fn population(&self) -> usize {
        self.occupants.len()
    }

    pub fn contains(&self, agent: Entity) -> bool {
        self.occupants.contains_key(&agent)
    }

    /// Coordinates of `agent`, if it is tracked.
    pub fn coords_of(&self, agent: Entity) -> Option<(i64, i64)> {
        self.occupants.get(&agent).copied()
    }

    fn wrap(&self, x: i64, y: i64) -> (i64, i64) {
        (x.rem_euclid(self.dimension), y.rem_euclid(self.dimension))
    }

    pub fn get(&self, x: i64, y: i64) -> Option<&Location> {
        self.cells.get(&self.wrap(x, y))
    }

    fn get_or_make(&mut self, x: i64, y: i64) -> &mut Location {
        let coords = self.wrap(x, y);
        self.cells
            .entry(coords)
            .or_insert_with(|| Location::new(coords))
    }

    /// Coordinates of every existing cell inside the inclusive Chebyshev box
    /// of side `2 * distance + 1` around `(x, y)`. The box wraps around the
    /// torus; cells are reported once even when the box covers the grid more
    /// than once. Iteration order is not part of the contract.
    pub fn within(&self, x: i64, y: i64, distance: i64) -> Vec<(i64, i64)> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for dy in -distance..=distance {
            for dx in -distance..=distance {
                let coords = self.wrap(x + dx, y + dy);
                if seen.insert(coords) && self.cells.contains_key(&coords) {
                    found.push(coords);
                }
            }
        }
        found
    }

    /// Place one unit of food at a uniformly random cell, preferring any
    /// existing pile within `CLUSTER_RADIUS` so that food accretes into
    /// patches rather than uniform scatter.
    pub fn one_food(&mut self, rng: &mut impl Rng) {
        let x = rng.gen_range(0..self.dimension);
        let y = rng.gen_range(0..self.dimension);

        let nearby: Vec<(i64, i64)> = self
            .within(x, y, CLUSTER_RADIUS)
            .into_iter()
            .filter(|&(cx, cy)| {
                self.cells
                    .get(&(cx, cy))
                    .is_some_and(Location::has_food)
            })
            .collect();

        let coords = if nearby.is_empty() {
            (x, y)
        } else {
            nearby[rng.gen_range(0..nearby.len())]
        };
        self.add_food(coords.0, coords.1, 1);
    }

    /// Per-tick food regeneration: `food_growth_rate` single drops.
    pub fn generate(&mut self, rng: &mut impl Rng) {
        for _ in 0..self.food_growth_rate {
            self.one_food(rng);
        }
    }

    /// Deposit `amount` food at `(x, y)`, tracking the calorie counter.
    pub fn add_food(&mut self, x: i64, y: i64, amount: u64) {
        self.get_or_make(x, y).add_food(amount);
        self.calories += amount;
    }

    /// Place `agent` at `(x, y)`.
    pub fn enter(&mut self, x: i64, y: i64, agent: Entity) -> Result<(), SpaceError> {
        if self.occupants.contains_key(&agent) {
            return Err(SpaceError::AlreadyPresent(agent));
        }
        let coords = self.wrap(x, y);
        self.get_or_make(coords.0, coords.1).enter(agent)?;
        self.occupants.insert(agent, coords);
        Ok(())
    }

    /// Remove `agent` from the grid. Its cell is reclaimed lazily.
    pub fn leave(&mut self, agent: Entity) -> Result<(), SpaceError> {
        let coords = self
            .occupants
            .remove(&agent)
            .ok_or(SpaceError::NotTracked(agent))?;
        self.cells
            .get_mut(&coords)
            .ok_or(SpaceError::NotPresent(agent))?
            .leave(agent)
    }

    /// Move `agent` by `(dx, dy)`, wrapping at the borders, and return the
    /// energy cost: `round(sqrt(dx^2 + dy^2))`. A move that lands on the
    /// origin cell changes nothing and costs 0.
    pub fn move_by(&mut self, dx: i64, dy: i64, agent: Entity) -> Result<i64, SpaceError> {
        let coords = *self
            .occupants
            .get(&agent)
            .ok_or(SpaceError::NotTracked(agent))?;
        let dest = self.wrap(coords.0 + dx, coords.1 + dy);
        if dest == coords {
            return Ok(0);
        }

        self.cells
            .get_mut(&coords)
            .ok_or(SpaceError::NotPresent(agent))?
            .leave(agent)?;
        self.get_or_make(dest.0, dest.1).enter(agent)?;
        self.occupants.insert(agent, dest);

        Ok((((dx * dx + dy * dy) as f64).sqrt()).round() as i64)
    }

    /// Eat one unit of food at the agent's current cell, returning the yield.
    pub fn forage(&mut self, agent: Entity) -> Result<u64, SpaceError> {
        let coords = *self
            .occupants
            .get(&agent)
            .ok_or(SpaceError::NotTracked(agent))?;
        Ok(self
            .cells
            .get_mut(&coords)
            .ok_or(SpaceError::NotPresent(agent))?
            .eat(1))
    }

    /// Register a newborn at the exact cell of its parent.
    pub fn new_life(&mut self, parent: Entity, child: Entity) -> Result<(), SpaceError> {
        let coords = *self
            .occupants
            .get(&parent)
            .ok_or(SpaceError::NotTracked(parent))?;
        if self.occupants.contains_key(&child) {
            return Err(SpaceError::AlreadyPresent(child));
        }
        self.cells
            .get_mut(&coords)
            .ok_or(SpaceError::NotPresent(parent))?
            .enter(child)?;
        self.occupants.insert(child, coords);
        Ok(())
    }

    /// All other agents within the Chebyshev box of `distance` around
    /// `agent`, excluding `agent` itself.
    pub fn neighbours(&self, agent: Entity, distance: i64) -> Result<Vec<Entity>, SpaceError> {
        let (x, y) = *self
            .occupants
            .get(&agent)
            .ok_or(SpaceError::NotTracked(agent))?;
        let mut people = Vec::new();
        for coords in self.within(x, y, distance) {
            if let Some(cell) = self.cells.get(&coords) {
                people.extend(cell.occupants.iter().copied().filter(|&o| o != agent));
            }
        }
        Ok(people)
    }

    /// `(dx, dy)` offsets from `agent` to every food-bearing cell within
    /// `distance`. Offsets, not coordinates: callers combine them with the
    /// agent's current position via `move_by`.
    pub fn nearby_foods(
        &self,
        agent: Entity,
        distance: i64,
    ) -> Result<Vec<(i64, i64)>, SpaceError> {
        let (x, y) = *self
            .occupants
            .get(&agent)
            .ok_or(SpaceError::NotTracked(agent))?;
        let mut seen = HashSet::new();
        let mut offsets = Vec::new();
        for dy in -distance..=distance {
            for dx in -distance..=distance {
                let coords = self.wrap(x + dx, y + dy);
                if seen.insert(coords)
                    && self.cells.get(&coords).is_some_and(Location::has_food)
                {
                    offsets.push((dx, dy));
                }
            }
        }
        Ok(offsets)
    }

    /// Snapshot of every agent on the grid, in cell traversal order. Empty
    /// cells found along the way are reclaimed; the key snapshot keeps the
    /// scan safe against that removal.
    pub fn people(&mut self) -> Vec<Entity> {
        let keys: Vec<(i64, i64)> = self.cells.keys().copied().collect();
        let mut people = Vec::new();
        for key in keys {
            let Some(cell) = self.cells.get(&key) else {
                continue;
            };
            if cell.is_empty() {
                self.cells.remove(&key);
            } else {
                people.extend(cell.occupants.iter().copied());
            }
        }
        people
    }
}
