//! Counted-owner handles into an arena, with copy-on-write mutation.
//!
//! Every [`Shared`] handle points at one arena slot. Duplicating a handle only
//! bumps the slot's owner count. Mutating through a handle whose slot has more
//! than one owner first moves that handle onto a fresh slot holding a clone,
//! so no other owner ever observes the change.
//!
//! Handles are `!Send`: the counts are plain integers behind an `Rc`.
//!
//! A handle dropped while its arena is borrowed (inside a [`Shared::read`]
//! closure, say) queues its release, which is applied on the next mutable
//! access to the arena.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

struct Slot<T> {
    value: Option<T>,
    owners: usize,
}

/// Storage shared by all handles descending from one [`Shared::new`] call.
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
}

impl<T> Arena<T> {
    fn new() -> Self {
        Self { slots: Vec::new(), free: Vec::new() }
    }

    fn alloc(&mut self, value: T) -> usize {
        let slot = Slot { value: Some(value), owners: 1 };
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = slot;
                index
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        slot.owners -= 1;
        if slot.owners == 0 {
            slot.value = None;
            self.free.push(index);
        }
    }

    /// Number of slots currently holding a value.
    pub fn live_slots(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

struct ArenaCell<T> {
    arena: RefCell<Arena<T>>,
    deferred: RefCell<Vec<usize>>,
}

impl<T> ArenaCell<T> {
    /// Borrows the arena mutably, settling releases queued while it was busy.
    fn borrow_mut(&self) -> RefMut<'_, Arena<T>> {
        let mut arena = self.arena.borrow_mut();
        Self::settle(&mut arena, &self.deferred);
        arena
    }

    /// Borrows the arena for reading, settling queued releases when it is free to.
    fn borrow(&self) -> Ref<'_, Arena<T>> {
        if let Ok(mut arena) = self.arena.try_borrow_mut() {
            Self::settle(&mut arena, &self.deferred);
        }
        self.arena.borrow()
    }

    fn settle(arena: &mut Arena<T>, deferred: &RefCell<Vec<usize>>) {
        let pending = std::mem::take(&mut *deferred.borrow_mut());
        for index in pending {
            arena.release(index);
        }
    }
}

pub struct Shared<T: Clone> {
    arena: Rc<ArenaCell<T>>,
    index: usize,
}

impl<T: Clone> Shared<T> {
    pub fn new(value: T) -> Self {
        let mut arena = Arena::new();
        let index = arena.alloc(value);
        let cell = ArenaCell { arena: RefCell::new(arena), deferred: RefCell::new(Vec::new()) };
        Self { arena: Rc::new(cell), index }
    }

    /// A new owner of the same value. O(1), no copy.
    pub fn duplicate(&self) -> Self {
        self.arena.borrow_mut().slots[self.index].owners += 1;
        Self { arena: Rc::clone(&self.arena), index: self.index }
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let arena = self.arena.arena.borrow();
        match arena.slots[self.index].value.as_ref() {
            Some(value) => f(value),
            None => unreachable!("live handle points at a freed slot"),
        }
    }

    /// Mutates this owner's value, cloning it first if other owners share it.
    pub fn modify<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut arena = self.arena.borrow_mut();
        if arena.slots[self.index].owners > 1 {
            let copy = match arena.slots[self.index].value.as_ref() {
                Some(value) => value.clone(),
                None => unreachable!("live handle points at a freed slot"),
            };
            arena.slots[self.index].owners -= 1;
            self.index = arena.alloc(copy);
        }
        match arena.slots[self.index].value.as_mut() {
            Some(value) => f(value),
            None => unreachable!("live handle points at a freed slot"),
        }
    }

    pub fn share_count(&self) -> usize {
        self.arena.borrow().slots[self.index].owners
    }

    /// True when both handles currently point at the same slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.arena, &other.arena) && self.index == other.index
    }

    pub fn live_slots(&self) -> usize {
        self.arena.borrow().live_slots()
    }
}

impl<T: Clone> Clone for Shared<T> {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

impl<T: Clone> Drop for Shared<T> {
    fn drop(&mut self) {
        match self.arena.arena.try_borrow_mut() {
            Ok(mut arena) => {
                ArenaCell::settle(&mut arena, &self.arena.deferred);
                arena.release(self.index);
            }
            Err(_) => {
                log::debug!("Arena busy, deferring release of slot {}", self.index);
                self.arena.deferred.borrow_mut().push(self.index);
            }
        }
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read(|value| {
            f.debug_struct("Shared")
                .field("index", &self.index)
                .field("owners", &self.share_count_unchecked())
                .field("value", value)
                .finish()
        })
    }
}

impl<T: Clone> Shared<T> {
    fn share_count_unchecked(&self) -> usize {
        self.arena
            .arena
            .try_borrow()
            .map(|arena| arena.slots[self.index].owners)
            .unwrap_or(0)
    }
}
