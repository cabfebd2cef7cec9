//! JNI bridge exposing the engine to a mobile/desktop frontend host, in the
//! same `{"ok": ..., "result"/"error": ...}` JSON-envelope style used
//! throughout this bridge.

use engine::descriptor::{EnemyDescriptor, PlayerDescriptor};
use engine::dice::Dice;
use jni::objects::{JClass, JString};
use jni::sys::{jint, jlong, jstring};
use jni::JNIEnv;
use serde_json::json;

fn ok(env: &JNIEnv, value: serde_json::Value) -> jstring {
    let payload = json!({ "ok": true, "result": value });
    env.new_string(serde_json::to_string(&payload).unwrap())
        .unwrap()
        .into_raw()
}

fn err(env: &JNIEnv, e: impl std::fmt::Display) -> jstring {
    env.new_string(format!(r#"{{"ok":false,"error":"{}"}}"#, e))
        .unwrap()
        .into_raw()
}

#[no_mangle]
pub extern "system" fn Java_com_pfsim_Ffi_version<'local>(env: JNIEnv<'local>, _class: JClass<'local>) -> JString<'local> {
    env.new_string(env!("CARGO_PKG_VERSION")).expect("new_string failed")
}

/// Runs a full 100-simulation batch. `party_json` is an array of player
/// descriptors; `enemies_json` is an array of already-resolved enemy
/// descriptors (id-to-descriptor resolution is the host's job, same as the
/// `cli` crate's bestiary lookup).
#[no_mangle]
pub extern "system" fn Java_com_pfsim_Ffi_runSimulationsJson(
    mut env: JNIEnv,
    _class: JClass,
    party_json: JString,
    enemies_json: JString,
    seed: jlong,
) -> jstring {
    let party_raw: String = match env.get_string(&party_json) {
        Ok(s) => s.into(),
        Err(e) => return err(&env, e),
    };
    let enemies_raw: String = match env.get_string(&enemies_json) {
        Ok(s) => s.into(),
        Err(e) => return err(&env, e),
    };

    let party: Vec<PlayerDescriptor> = match serde_json::from_str(&party_raw) {
        Ok(p) => p,
        Err(e) => return err(&env, format!("invalid_party: {e}")),
    };
    let enemies: Vec<EnemyDescriptor> = match serde_json::from_str(&enemies_raw) {
        Ok(e) => e,
        Err(e) => return err(&env, format!("invalid_enemies: {e}")),
    };

    let seed = if seed < 0 { None } else { Some(seed as u64) };
    match engine::run_simulations(&party, &enemies, seed) {
        Ok(result) => ok(&env, serde_json::to_value(result).unwrap()),
        Err(e) => err(&env, e),
    }
}

/// Exposes the engine's own die roller for host-side debug rolls, rather
/// than reimplementing a PRNG on the JNI side.
#[no_mangle]
pub extern "system" fn Java_com_pfsim_Ffi_rollJson(_env: JNIEnv, _class: JClass, seed: jlong, n: jint, sides: jint) -> jint {
    roll_internal(seed, n, sides)
}

/// Internal helper exercised directly by tests, without JNI overhead.
pub fn roll_internal(seed: jlong, n: jint, sides: jint) -> jint {
    let mut dice = Dice::from_seed(seed as u64);
    dice.roll_sum(n.max(0) as u32, sides.max(1) as u32)
}
