//! Opaque handle lifecycle for engine instances.
//!
//! The managed side owns engines only through 64-bit integer handles. A
//! handle packs a slot index and that slot's generation; destroying a slot
//! bumps its generation, so any retained copy of the old handle fails
//! validation instead of reaching freed state. Zero is reserved as the
//! managed null sentinel and is never a live handle.

use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use geographiclib_rs::Geodesic;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleError {
    #[error("null engine handle")]
    Null,
    #[error("unknown engine handle {0:#x}")]
    Unknown(u64),
    #[error("stale engine handle {0:#x}: engine already destroyed")]
    Stale(u64),
}

type Result<T> = std::result::Result<T, HandleError>;

/// Opaque engine handle, passed across the managed boundary as a `long`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct EngineHandle(u64);

impl EngineHandle {
    /// Decode a raw managed-side value. Zero is the null sentinel.
    pub fn from_raw(raw: i64) -> Result<EngineHandle> {
        if raw == 0 {
            Err(HandleError::Null)
        } else {
            Ok(EngineHandle(raw as u64))
        }
    }

    /// The raw value handed back to the managed side.
    pub fn as_raw(self) -> i64 {
        self.0 as i64
    }

    fn pack(index: u32, generation: u32) -> EngineHandle {
        EngineHandle((generation as u64) << 32 | index as u64)
    }

    fn index(self) -> u32 {
        self.0 as u32
    }

    fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

struct Slot {
    generation: u32,
    engine: Option<Geodesic>,
}

/// Slot arena mapping opaque handles to live engine instances.
///
/// A slot's generation only matches handles minted while its engine is
/// live, and generation 0 is never minted, so no live handle is ever zero
/// and no recycled slot can revive an old handle.
#[derive(Default)]
pub struct EngineRegistry {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl EngineRegistry {
    pub fn new() -> EngineRegistry {
        EngineRegistry::default()
    }

    /// Store `engine` and mint the handle that refers to it.
    pub fn insert(&mut self, engine: Geodesic) -> EngineHandle {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.engine = Some(engine);
                EngineHandle::pack(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 1,
                    engine: Some(engine),
                });
                EngineHandle::pack(index, 1)
            }
        }
    }

    /// Resolve a handle to the engine it was minted for.
    pub fn get(&self, handle: EngineHandle) -> Result<&Geodesic> {
        let slot = self
            .slots
            .get(handle.index() as usize)
            .ok_or(HandleError::Unknown(handle.0))?;
        if slot.generation != handle.generation() {
            return Err(HandleError::Stale(handle.0));
        }
        slot.engine.as_ref().ok_or(HandleError::Stale(handle.0))
    }

    /// Remove a handle's engine, invalidating every copy of the handle.
    pub fn remove(&mut self, handle: EngineHandle) -> Result<Geodesic> {
        let index = handle.index();
        let slot = self
            .slots
            .get_mut(index as usize)
            .ok_or(HandleError::Unknown(handle.0))?;
        if slot.generation != handle.generation() {
            return Err(HandleError::Stale(handle.0));
        }
        let engine = slot.engine.take().ok_or(HandleError::Stale(handle.0))?;
        // Generation 0 is reserved so a recycled slot can never mint the
        // zero handle.
        slot.generation = slot.generation.wrapping_add(1).max(1);
        self.free.push(index);
        Ok(engine)
    }

    /// Number of live engines.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-wide registry shared by every boundary entry point.
static REGISTRY: LazyLock<Mutex<EngineRegistry>> = LazyLock::new(Mutex::default);

fn registry() -> MutexGuard<'static, EngineRegistry> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Construct an engine for the given ellipsoid and return its handle.
///
/// Parameter ranges are not validated here; that policy belongs to the
/// engine.
pub fn create(equatorial_radius: f64, flattening: f64) -> EngineHandle {
    let handle = registry().insert(Geodesic::new(equatorial_radius, flattening));
    debug!(
        "created engine {:#x} (a={equatorial_radius}, f={flattening})",
        handle.as_raw()
    );
    handle
}

/// Destroy the engine behind `raw`.
///
/// Zero is the managed null sentinel and destroying it is a no-op. A stale
/// or unknown handle is an error; the registry is left unchanged.
pub fn destroy(raw: i64) -> Result<()> {
    if raw == 0 {
        return Ok(());
    }
    let handle = EngineHandle::from_raw(raw)?;
    registry().remove(handle)?;
    debug!("destroyed engine {raw:#x}");
    Ok(())
}

/// Resolve `raw` and run `op` against its engine.
pub fn with_engine<T>(raw: i64, op: impl FnOnce(&Geodesic) -> T) -> Result<T> {
    let handle = EngineHandle::from_raw(raw)?;
    let guard = registry();
    let engine = guard.get(handle)?;
    Ok(op(engine))
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;

    use super::*;

    const WGS84_A: f64 = 6378137.0;
    const WGS84_F: f64 = 1.0 / 298.257223563;

    #[test]
    fn insert_then_get_passes_parameters_through() {
        let mut reg = EngineRegistry::new();
        let handle = reg.insert(Geodesic::new(WGS84_A, WGS84_F));
        let engine = reg.get(handle).unwrap();
        assert_eq!(engine.a, WGS84_A);
        assert_eq!(engine.f, WGS84_F);
    }

    #[test]
    fn destroy_zero_handle_is_a_noop() {
        assert_eq!(destroy(0), Ok(()));
    }

    #[test]
    fn destroyed_handle_is_stale() {
        let mut reg = EngineRegistry::new();
        let handle = reg.insert(Geodesic::new(WGS84_A, WGS84_F));
        reg.remove(handle).unwrap();
        assert!(matches!(reg.get(handle), Err(HandleError::Stale(_))));
    }

    #[test]
    fn double_destroy_is_an_error() {
        let mut reg = EngineRegistry::new();
        let handle = reg.insert(Geodesic::new(WGS84_A, WGS84_F));
        assert!(reg.remove(handle).is_ok());
        assert!(matches!(reg.remove(handle), Err(HandleError::Stale(_))));
        assert!(reg.is_empty());
    }

    #[test]
    fn slot_reuse_does_not_resurrect_old_handles() {
        let mut reg = EngineRegistry::new();
        let first = reg.insert(Geodesic::new(WGS84_A, WGS84_F));
        reg.remove(first).unwrap();
        let second = reg.insert(Geodesic::new(WGS84_A, 0.0));
        assert_ne!(first, second);
        assert!(reg.get(first).is_err());
        assert_eq!(reg.get(second).unwrap().f, 0.0);
    }

    #[test]
    fn unknown_handle_is_rejected() {
        let reg = EngineRegistry::new();
        let bogus = EngineHandle::pack(7, 3);
        assert!(matches!(reg.get(bogus), Err(HandleError::Unknown(_))));
    }

    #[test]
    fn global_create_and_accessors_round_trip() -> anyhow::Result<()> {
        let handle = create(WGS84_A, WGS84_F);
        let (a, f) = with_engine(handle.as_raw(), |e| (e.a, e.f))?;
        assert_eq!(a, WGS84_A);
        assert_eq!(f, WGS84_F);
        destroy(handle.as_raw())?;
        assert!(matches!(
            with_engine(handle.as_raw(), |_| ()),
            Err(HandleError::Stale(_))
        ));
        Ok(())
    }

    #[quickcheck]
    fn handles_are_never_zero_and_never_collide(count: u8) -> bool {
        let mut reg = EngineRegistry::new();
        let mut handles = Vec::new();
        for i in 0..count as usize {
            // Alternate insert/remove to exercise slot reuse.
            let handle = reg.insert(Geodesic::new(WGS84_A, WGS84_F));
            if i % 3 == 0 {
                reg.remove(handle).unwrap();
            } else {
                handles.push(handle);
            }
        }
        handles.iter().all(|h| h.as_raw() != 0)
            && handles.windows(2).all(|w| w[0] != w[1])
            && handles.iter().all(|h| reg.get(*h).is_ok())
    }

    #[quickcheck]
    fn nonzero_raw_values_round_trip(raw: i64) -> bool {
        match EngineHandle::from_raw(raw) {
            Ok(handle) => raw != 0 && handle.as_raw() == raw,
            Err(HandleError::Null) => raw == 0,
            Err(_) => false,
        }
    }
}
