//! JNI surface for the managed `net.sf.geographiclib.Geodesic` class.
//!
//! Each export decodes its JNI scalars, runs the bridge core, and re-encodes
//! the outputs as a managed result object built through the constructors
//! cached by [`cache`]. Errors never unwind across the boundary: a failed
//! body leaves a pending `IllegalStateException` on the thread and returns
//! the export's null or zero value.
//!
//! The managed class is expected to declare this native surface:
//!
//! ```java
//! private static native void staticInit();
//! private static native long nativeCreate(double a, double f);
//! private static native void nativeDestroy(long handle);
//! private static native Geodesic nativeWgs84();
//! private static native DirectResult nativeDirect(
//!     Geodesic owner, long handle,
//!     double lat1, double lon1, double azi1, double s12);
//! private static native DirectResult nativeArcDirect(
//!     Geodesic owner, long handle,
//!     double lat1, double lon1, double azi1, double a12);
//! private static native DirectResult nativeGenDirect(
//!     Geodesic owner, long handle,
//!     double lat1, double lon1, double azi1,
//!     boolean arcmode, double s12OrA12, long outmask);
//! private static native InverseResult nativeInverse(
//!     Geodesic owner, long handle,
//!     double lat1, double lon1, double lat2, double lon2);
//! private static native InverseResult nativeGenInverse(
//!     Geodesic owner, long handle,
//!     double lat1, double lon1, double lat2, double lon2, long outmask);
//! private static native double nativeMajorRadius(long handle);
//! private static native double nativeFlattening(long handle);
//! private static native double nativeEllipsoidArea(long handle);
//! ```
//!
//! `staticInit` must run (once) before any entry point that constructs a
//! managed object; the class's static initializer is the natural place.

#![allow(clippy::too_many_arguments)]

pub mod cache;

use jni::JNIEnv;
use jni::objects::{JClass, JObject, JValue};
use jni::sys::{JNI_VERSION_1_6, jboolean, jdouble, jint, jlong, jobject};
use log::error;
use thiserror::Error;

use geobridge::{OutputMask, registry, solve};

use crate::cache::MetadataCache;

#[derive(Error, Debug)]
enum BridgeError {
    #[error("JNI error: {0}")]
    Jni(#[from] jni::errors::Error),
    #[error("result metadata not initialized; staticInit must run first")]
    Uninitialized,
    #[error(transparent)]
    Handle(#[from] geobridge::HandleError),
}

type Result<T> = std::result::Result<T, BridgeError>;

/// Run a fallible entry-point body, converting an error into a pending
/// managed exception plus `fallback` as the return value.
fn catch<'local, T>(
    env: &mut JNIEnv<'local>,
    fallback: T,
    body: impl FnOnce(&mut JNIEnv<'local>) -> Result<T>,
) -> T {
    match body(&mut *env) {
        Ok(value) => value,
        Err(err) => {
            error!("geodesic bridge: {err}");
            // A JavaException already left a pending exception on the
            // thread; throwing again would clobber it.
            if !matches!(err, BridgeError::Jni(jni::errors::Error::JavaException)) {
                let _ = env.throw_new("java/lang/IllegalStateException", err.to_string());
            }
            fallback
        }
    }
}

fn metadata() -> Result<&'static MetadataCache> {
    cache::get().ok_or(BridgeError::Uninitialized)
}

fn direct_result<'local>(
    env: &mut JNIEnv<'local>,
    owner: &JObject<'local>,
    solution: &solve::DirectSolution,
) -> Result<jobject> {
    let args = [
        JValue::Object(owner).as_jni(),
        JValue::Long(solution.mask.bits() as i64).as_jni(),
        JValue::Double(solution.lat2).as_jni(),
        JValue::Double(solution.lon2).as_jni(),
        JValue::Double(solution.azi2).as_jni(),
        JValue::Double(solution.m12).as_jni(),
        JValue::Double(solution.M12).as_jni(),
        JValue::Double(solution.M21).as_jni(),
        JValue::Double(solution.S12).as_jni(),
        JValue::Double(solution.a12).as_jni(),
        JValue::Double(solution.s12).as_jni(),
    ];
    let result = unsafe { metadata()?.direct_result.construct(env, &args)? };
    Ok(result.into_raw())
}

fn inverse_result<'local>(
    env: &mut JNIEnv<'local>,
    owner: &JObject<'local>,
    solution: &solve::InverseSolution,
) -> Result<jobject> {
    let args = [
        JValue::Object(owner).as_jni(),
        JValue::Long(solution.mask.bits() as i64).as_jni(),
        JValue::Double(solution.s12).as_jni(),
        JValue::Double(solution.azi1).as_jni(),
        JValue::Double(solution.azi2).as_jni(),
        JValue::Double(solution.m12).as_jni(),
        JValue::Double(solution.M12).as_jni(),
        JValue::Double(solution.M21).as_jni(),
        JValue::Double(solution.S12).as_jni(),
        JValue::Double(solution.a12).as_jni(),
    ];
    let result = unsafe { metadata()?.inverse_result.construct(env, &args)? };
    Ok(result.into_raw())
}

/// Pins the minimum JNI version the exports require.
#[unsafe(no_mangle)]
pub extern "system" fn JNI_OnLoad(
    _vm: *mut jni::sys::JavaVM,
    _reserved: *mut std::ffi::c_void,
) -> jint {
    JNI_VERSION_1_6
}

/// `static native void staticInit()`
///
/// Resolves and pins the managed classes and constructor overloads every
/// other entry point marshals into. Idempotent; raises
/// `IllegalStateException` if any lookup fails, publishing nothing.
#[unsafe(no_mangle)]
pub extern "system" fn Java_net_sf_geographiclib_Geodesic_staticInit<'local>(
    mut env: JNIEnv<'local>,
    class: JClass<'local>,
) {
    catch(&mut env, (), |env| {
        cache::initialize(env, &class)?;
        Ok(())
    })
}

/// `static native long nativeCreate(double a, double f)`
///
/// Constructs an engine for the given equatorial radius and flattening and
/// returns its opaque handle. Never zero.
#[unsafe(no_mangle)]
pub extern "system" fn Java_net_sf_geographiclib_Geodesic_nativeCreate(
    _env: JNIEnv,
    _class: JClass,
    a: jdouble,
    f: jdouble,
) -> jlong {
    registry::create(a, f).as_raw()
}

/// `static native void nativeDestroy(long handle)`
///
/// Destroys the engine behind `handle`. Zero is a no-op; a stale or unknown
/// handle raises `IllegalStateException`.
#[unsafe(no_mangle)]
pub extern "system" fn Java_net_sf_geographiclib_Geodesic_nativeDestroy(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) {
    catch(&mut env, (), |_env| Ok(registry::destroy(handle)?))
}

/// `static native Geodesic nativeWgs84()`
///
/// Builds a managed engine object for the reference WGS84 ellipsoid through
/// the cached `Geodesic(double, double)` constructor.
#[unsafe(no_mangle)]
pub extern "system" fn Java_net_sf_geographiclib_Geodesic_nativeWgs84<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jobject {
    catch(&mut env, std::ptr::null_mut(), |env| {
        let (a, f) = solve::wgs84_parameters();
        let args = [JValue::Double(a).as_jni(), JValue::Double(f).as_jni()];
        let engine = unsafe { metadata()?.geodesic.construct(env, &args)? };
        Ok(engine.into_raw())
    })
}

/// `static native DirectResult nativeDirect(...)`
///
/// Direct problem for a distance in meters, computing every output.
#[unsafe(no_mangle)]
pub extern "system" fn Java_net_sf_geographiclib_Geodesic_nativeDirect<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    owner: JObject<'local>,
    handle: jlong,
    lat1: jdouble,
    lon1: jdouble,
    azi1: jdouble,
    s12: jdouble,
) -> jobject {
    catch(&mut env, std::ptr::null_mut(), |env| {
        let solution =
            registry::with_engine(handle, |engine| solve::direct(engine, lat1, lon1, azi1, s12))?;
        direct_result(env, &owner, &solution)
    })
}

/// `static native DirectResult nativeArcDirect(...)`
///
/// Direct problem for an arc length in degrees, computing every output.
#[unsafe(no_mangle)]
pub extern "system" fn Java_net_sf_geographiclib_Geodesic_nativeArcDirect<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    owner: JObject<'local>,
    handle: jlong,
    lat1: jdouble,
    lon1: jdouble,
    azi1: jdouble,
    a12: jdouble,
) -> jobject {
    catch(&mut env, std::ptr::null_mut(), |env| {
        let solution = registry::with_engine(handle, |engine| {
            solve::arc_direct(engine, lat1, lon1, azi1, a12)
        })?;
        direct_result(env, &owner, &solution)
    })
}

/// `static native DirectResult nativeGenDirect(...)`
///
/// General direct problem: `s12_a12` is a distance when `arcmode` is false,
/// an arc length when true; `outmask` selects the outputs to compute.
#[unsafe(no_mangle)]
pub extern "system" fn Java_net_sf_geographiclib_Geodesic_nativeGenDirect<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    owner: JObject<'local>,
    handle: jlong,
    lat1: jdouble,
    lon1: jdouble,
    azi1: jdouble,
    arcmode: jboolean,
    s12_a12: jdouble,
    outmask: jlong,
) -> jobject {
    catch(&mut env, std::ptr::null_mut(), |env| {
        let mask = OutputMask::from_bits(outmask as u64);
        let solution = registry::with_engine(handle, |engine| {
            solve::gen_direct(engine, lat1, lon1, azi1, arcmode != 0, s12_a12, mask)
        })?;
        direct_result(env, &owner, &solution)
    })
}

/// `static native InverseResult nativeInverse(...)`
///
/// Inverse problem between two points, computing every output.
#[unsafe(no_mangle)]
pub extern "system" fn Java_net_sf_geographiclib_Geodesic_nativeInverse<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    owner: JObject<'local>,
    handle: jlong,
    lat1: jdouble,
    lon1: jdouble,
    lat2: jdouble,
    lon2: jdouble,
) -> jobject {
    catch(&mut env, std::ptr::null_mut(), |env| {
        let solution = registry::with_engine(handle, |engine| {
            solve::inverse(engine, lat1, lon1, lat2, lon2)
        })?;
        inverse_result(env, &owner, &solution)
    })
}

/// `static native InverseResult nativeGenInverse(...)`
///
/// General inverse problem; `outmask` selects the outputs to compute.
#[unsafe(no_mangle)]
pub extern "system" fn Java_net_sf_geographiclib_Geodesic_nativeGenInverse<'local>(
    mut env: JNIEnv<'local>,
    _class: JClass<'local>,
    owner: JObject<'local>,
    handle: jlong,
    lat1: jdouble,
    lon1: jdouble,
    lat2: jdouble,
    lon2: jdouble,
    outmask: jlong,
) -> jobject {
    catch(&mut env, std::ptr::null_mut(), |env| {
        let mask = OutputMask::from_bits(outmask as u64);
        let solution = registry::with_engine(handle, |engine| {
            solve::gen_inverse(engine, lat1, lon1, lat2, lon2, mask)
        })?;
        inverse_result(env, &owner, &solution)
    })
}

/// `static native double nativeMajorRadius(long handle)`
#[unsafe(no_mangle)]
pub extern "system" fn Java_net_sf_geographiclib_Geodesic_nativeMajorRadius(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jdouble {
    catch(&mut env, f64::NAN, |_env| {
        Ok(registry::with_engine(handle, solve::equatorial_radius)?)
    })
}

/// `static native double nativeFlattening(long handle)`
#[unsafe(no_mangle)]
pub extern "system" fn Java_net_sf_geographiclib_Geodesic_nativeFlattening(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jdouble {
    catch(&mut env, f64::NAN, |_env| {
        Ok(registry::with_engine(handle, solve::flattening)?)
    })
}

/// `static native double nativeEllipsoidArea(long handle)`
#[unsafe(no_mangle)]
pub extern "system" fn Java_net_sf_geographiclib_Geodesic_nativeEllipsoidArea(
    mut env: JNIEnv,
    _class: JClass,
    handle: jlong,
) -> jdouble {
    catch(&mut env, f64::NAN, |_env| {
        Ok(registry::with_engine(handle, solve::ellipsoid_area)?)
    })
}
