//! One-time cache of managed-side class and constructor metadata.
//!
//! Result objects are built through JNI reflection; resolving a class and
//! constructor on every solve would dominate the cost of the solve itself.
//! Each managed type is resolved once, pinned with a global reference, and
//! published for the life of the process. Initialization is idempotent: a
//! failed resolution publishes nothing, and concurrent first calls observe
//! exactly one published cache.

use std::sync::OnceLock;

use jni::JNIEnv;
use jni::objects::{GlobalRef, JClass, JMethodID, JObject};

/// JVM name of the managed engine class.
pub const GEODESIC_CLASS: &str = "net/sf/geographiclib/Geodesic";
/// JVM name of the direct-problem result class.
pub const DIRECT_RESULT_CLASS: &str = "net/sf/geographiclib/Geodesic$DirectResult";
/// JVM name of the inverse-problem result class.
pub const INVERSE_RESULT_CLASS: &str = "net/sf/geographiclib/Geodesic$InverseResult";

// Constructor overloads the bridge marshals into: the engine takes
// (a, f); the result records take the owning engine, the output mask, and
// their scalar fields in fixed positional order.
const GEODESIC_CTOR: &str = "(DD)V";
const DIRECT_RESULT_CTOR: &str = "(Lnet/sf/geographiclib/Geodesic;JDDDDDDDDD)V";
const INVERSE_RESULT_CTOR: &str = "(Lnet/sf/geographiclib/Geodesic;JDDDDDDDD)V";

/// A managed class pinned with a global reference, plus one constructor.
pub struct CtorRef {
    class: GlobalRef,
    ctor: JMethodID,
}

impl CtorRef {
    fn resolve(env: &mut JNIEnv, class: &JClass, signature: &str) -> jni::errors::Result<CtorRef> {
        Ok(CtorRef {
            ctor: env.get_method_id(class, "<init>", signature)?,
            class: env.new_global_ref(class)?,
        })
    }

    /// Construct an instance through the cached constructor.
    ///
    /// # Safety
    ///
    /// `args` must match the arity and JNI types of the constructor
    /// signature this entry was resolved with.
    pub unsafe fn construct<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        args: &[jni::sys::jvalue],
    ) -> jni::errors::Result<JObject<'local>> {
        let class = JClass::from(env.new_local_ref(self.class.as_obj())?);
        unsafe { env.new_object_unchecked(class, self.ctor, args) }
    }
}

/// Cached metadata for every managed type the bridge constructs.
pub struct MetadataCache {
    pub geodesic: CtorRef,
    pub direct_result: CtorRef,
    pub inverse_result: CtorRef,
}

static CACHE: OnceLock<MetadataCache> = OnceLock::new();

/// Resolve and publish the cache, or return the already-published one.
pub fn initialize<'local>(
    env: &mut JNIEnv<'local>,
    geodesic_class: &JClass<'local>,
) -> jni::errors::Result<&'static MetadataCache> {
    if let Some(cache) = CACHE.get() {
        return Ok(cache);
    }
    let resolved = resolve(env, geodesic_class)?;
    // A concurrent initializer may have won the race; its cache is
    // equivalent and ours is discarded.
    Ok(CACHE.get_or_init(|| resolved))
}

/// The published cache, if [`initialize`] has succeeded.
pub fn get() -> Option<&'static MetadataCache> {
    CACHE.get()
}

fn resolve<'local>(
    env: &mut JNIEnv<'local>,
    geodesic_class: &JClass<'local>,
) -> jni::errors::Result<MetadataCache> {
    let geodesic = CtorRef::resolve(env, geodesic_class, GEODESIC_CTOR)?;

    let direct_class = env.find_class(DIRECT_RESULT_CLASS)?;
    let direct_result = CtorRef::resolve(env, &direct_class, DIRECT_RESULT_CTOR)?;

    let inverse_class = env.find_class(INVERSE_RESULT_CLASS)?;
    let inverse_result = CtorRef::resolve(env, &inverse_class, INVERSE_RESULT_CTOR)?;

    Ok(MetadataCache {
        geodesic,
        direct_result,
        inverse_result,
    })
}
