// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A manager shared between threads.

use crate::ResourceManager;
use std::sync::{Arc, Mutex, PoisonError};

/// Cloneable handle to one [`ResourceManager`] behind a mutex.
///
/// Each [`with`](Self::with) call holds the lock for its whole closure, so a
/// multi-step sequence (find a set, then reserve it) is atomic with respect
/// to other handles.
///
/// # Example
/// ```
/// use fabric_topology::UnitType;
/// use resource_manager::{ResourceManager, SharedResourceManager};
///
/// let shared = SharedResourceManager::new(ResourceManager::with_default_topology().unwrap());
/// let reservation = shared
///     .with(|rm| {
///         let set = rm.find_units_set(0, 1, &[UnitType::Gn])?;
///         rm.reserve_units_set(0, &set.tiles)
///     })
///     .unwrap();
/// assert_eq!(reservation.tiles, vec![0]);
/// ```
#[derive(Debug, Clone)]
pub struct SharedResourceManager {
    inner: Arc<Mutex<ResourceManager>>,
}

impl SharedResourceManager {
    pub fn new(manager: ResourceManager) -> Self {
        Self {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Runs `f` with exclusive access to the manager.
    ///
    /// A panic in another holder does not lock the manager out: every
    /// operation leaves the manager consistent before it can panic.
    pub fn with<R>(&self, f: impl FnOnce(&mut ResourceManager) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }
}

impl From<ResourceManager> for SharedResourceManager {
    fn from(manager: ResourceManager) -> Self {
        Self::new(manager)
    }
}
