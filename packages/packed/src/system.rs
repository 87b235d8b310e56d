//! Composable ECS systems.

use log::trace;

use crate::world::World;

/// An ECS system.
pub trait System {
    /// Update the system.
    ///
    /// `delta_time` is the time in seconds since the previous update.
    fn update(&mut self, world: &mut World, delta_time: f32);
}

impl<F> System for F
    where F: FnMut(&mut World, f32)
{
    fn update(&mut self, world: &mut World, delta_time: f32) {
        self(world, delta_time)
    }
}

/// A boxed system, for storing systems of different types together.
pub type BoxSystem = Box<dyn System>;

/// A token which represents a system in a `SystemGroup`.
///
/// These tokens are not unique between `SystemGroup`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SystemToken(pub usize);

/// An ordered list of systems which are updated one after another.
#[derive(Default)]
pub struct SystemGroup {
    next_token: usize,
    systems: Vec<(SystemToken, BoxSystem)>,
}

impl SystemGroup {
    /// Create a new empty `SystemGroup`.
    pub fn new() -> SystemGroup {
        SystemGroup::default()
    }

    /// Return the number of systems in the group.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Returns true if there are no systems in the group.
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Add a system after every existing system.
    pub fn insert(&mut self, system: impl System + 'static) -> SystemToken {
        let token = self.next_token();
        self.systems.push((token, Box::new(system)));
        token
    }

    /// Add a system so that it updates before the system represented by
    /// `before`.
    ///
    /// Returns `None` if `before` is not in this group.
    pub fn insert_before(&mut self, before: SystemToken, system: impl System + 'static) -> Option<SystemToken> {
        let index = self.systems.iter().position(|(token, _)| *token == before)?;
        let token = self.next_token();
        self.systems.insert(index, (token, Box::new(system)));
        Some(token)
    }

    /// Remove a system from the group.
    pub fn remove(&mut self, token: SystemToken) -> Option<BoxSystem> {
        let index = self.systems.iter().position(|(t, _)| *t == token)?;
        Some(self.systems.remove(index).1)
    }

    fn next_token(&mut self) -> SystemToken {
        let token = SystemToken(self.next_token);
        self.next_token += 1;
        token
    }

    /// Run an update for every system, in order.
    pub fn update(&mut self, world: &mut World, delta_time: f32) {
        for (token, system) in self.systems.iter_mut() {
            trace!("updating system {:?}", token);
            system.update(world, delta_time);
        }
    }
}

impl System for SystemGroup {
    fn update(&mut self, world: &mut World, delta_time: f32) {
        SystemGroup::update(self, world, delta_time)
    }
}
