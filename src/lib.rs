//! Rust-native backend for the GeographicLib Java `Geodesic` bindings.
//!
//! Builds on [geographiclib-rs](https://docs.rs/geographiclib-rs), the Rust
//! port of Charles Karney's geodesic algorithms, to serve direct and inverse
//! geodesic solves to a managed caller. This crate contains no geodesic
//! mathematics of its own; it owns the three concerns of the boundary:
//!
//! - [`registry`] hands engine instances to the managed side as opaque
//!   64-bit handles and validates every handle it is given back, so a stale
//!   or forged handle is an error instead of undefined behavior.
//! - [`solve`] marshals plain scalar arguments into the engine's general
//!   direct/inverse solvers and captures their outputs as plain records.
//! - [`mask`] carries the output-selection bitmask from the caller through
//!   the solver into the result, unchanged.
//!
//! The JNI exports live in the `geobridge-jni` workspace member; everything
//! here is runtime-agnostic and testable without a JVM.

pub mod mask;
pub mod registry;
pub mod solve;

pub use mask::OutputMask;
pub use registry::{EngineHandle, EngineRegistry, HandleError};
pub use solve::{DirectSolution, InverseSolution};
