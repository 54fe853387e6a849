//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge. Both return
//! JSON, or null when the score cannot be parsed or laid out.

use jni::objects::{JByteArray, JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;

use crate::{layout_bytes_to_json, timemap_bytes_to_json};

fn read_args(env: &mut JNIEnv, data: &JByteArray, extension: &JString) -> Option<(Vec<u8>, Option<String>)> {
    let bytes = env.convert_byte_array(data).ok()?;
    let ext: Option<String> = if extension.is_null() {
        None
    } else {
        env.get_string(extension).ok().map(|s| s.into())
    };
    Some((bytes, ext))
}

fn to_jstring(env: &mut JNIEnv, result: Result<String, String>) -> jstring {
    match result {
        Ok(json) => match env.new_string(&json) {
            Ok(js) => js.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(e) => {
            log::warn!("stafflayout JNI call failed: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Lay out score bytes.
///
/// Called from Kotlin as:
///   external fun layoutBytes(data: ByteArray, extension: String?): String?
#[no_mangle]
pub extern "system" fn Java_com_notelab_app_StaffLayout_layoutBytes(
    mut env: JNIEnv,
    _class: JClass,
    data: JByteArray,
    extension: JString,
) -> jstring {
    let Some((bytes, ext)) = read_args(&mut env, &data, &extension) else {
        return std::ptr::null_mut();
    };
    let result = layout_bytes_to_json(&bytes, ext.as_deref());
    to_jstring(&mut env, result)
}

/// Playback timeline of score bytes.
///
/// Called from Kotlin as:
///   external fun timemapBytes(data: ByteArray, extension: String?): String?
#[no_mangle]
pub extern "system" fn Java_com_notelab_app_StaffLayout_timemapBytes(
    mut env: JNIEnv,
    _class: JClass,
    data: JByteArray,
    extension: JString,
) -> jstring {
    let Some((bytes, ext)) = read_args(&mut env, &data, &extension) else {
        return std::ptr::null_mut();
    };
    let result = timemap_bytes_to_json(&bytes, ext.as_deref());
    to_jstring(&mut env, result)
}
