//! Integration tests for the configuration lifecycle.
//!
//! # Purpose
//!
//! These tests exercise the config store through its *public* API in the same
//! way the command flows use it, against a real (temporary) filesystem.  They
//! verify:
//!
//! - The round-trip law: `load` after `save` returns an equal mapping,
//!   including keys this build of the tool does not recognise.
//! - Read resolution: the first *existing* candidate wins, probed with the
//!   real filesystem rather than an injected closure.
//! - Write resolution: deterministic on privilege level, no probing.
//! - The incremental lifecycle: the file starts empty, `auth` semantics add
//!   `{ip, mac, client_key}`, `setmac` touches only `mac`.
//!
//! # Why a temp directory per test?
//!
//! Every test builds its own candidate set under a uuid-suffixed directory in
//! the system temp dir, so tests can run in parallel and never touch the real
//! `/etc` or `~/.config`.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use lgtv_control::domain::DeviceConfig;
use lgtv_control::infrastructure::{CandidatePaths, ConfigStore};

/// Fresh candidate paths rooted in a uuid-suffixed temp directory.
fn temp_candidates() -> (CandidatePaths, PathBuf) {
    let dir = std::env::temp_dir().join(format!("lgtv_it_{}", Uuid::new_v4()));
    let paths = CandidatePaths {
        system: dir.join("etc").join("lgtv-control").join("config.json"),
        user: dir
            .join("home")
            .join(".config")
            .join("lgtv-control")
            .join("config.json"),
        fallback: dir.join("lgtv_config.json"),
    };
    (paths, dir)
}

fn write_json(path: &Path, json: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, json).unwrap();
}

// ── Round-trip law ────────────────────────────────────────────────────────────

#[test]
fn test_save_then_load_returns_equal_mapping() {
    // Arrange
    let (paths, dir) = temp_candidates();
    let store = ConfigStore::new(paths, false);
    let cfg = DeviceConfig {
        ip: Some("192.168.1.50".to_string()),
        mac: Some("AA:BB:CC:DD:EE:FF".to_string()),
        client_key: Some("0123456789abcdef".to_string()),
        ..DeviceConfig::default()
    };

    // Act
    store.save(&cfg).expect("save");
    let loaded = store.load().expect("load");

    // Assert
    assert_eq!(loaded, cfg);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_round_trip_preserves_unrecognised_keys() {
    // Arrange: a config containing fields from some future version
    let (paths, dir) = temp_candidates();
    let store = ConfigStore::new(paths.clone(), false);
    write_json(
        &paths.user,
        r#"{"ip":"10.1.2.3","pulse_seconds":45,"rooms":["living","office"]}"#,
    );

    // Act: load → save → load, as every mutating command does
    let loaded = store.load().expect("load");
    store.save(&loaded).expect("save");
    let reloaded = store.load().expect("reload");

    // Assert
    assert_eq!(loaded, reloaded);
    assert_eq!(
        reloaded.extra.get("pulse_seconds"),
        Some(&serde_json::Value::from(45))
    );
    assert!(reloaded.extra.contains_key("rooms"));

    std::fs::remove_dir_all(&dir).ok();
}

// ── Read resolution against the real filesystem ───────────────────────────────

#[test]
fn test_read_prefers_system_file_over_user_file() {
    // Arrange: both the system and user candidates exist
    let (paths, dir) = temp_candidates();
    write_json(&paths.system, r#"{"ip":"system"}"#);
    write_json(&paths.user, r#"{"ip":"user"}"#);
    let store = ConfigStore::new(paths.clone(), false);

    // Act / Assert
    assert_eq!(store.read_path(), paths.system);
    assert_eq!(store.load().expect("load").ip(), Some("system"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_read_uses_user_file_when_system_file_is_absent() {
    let (paths, dir) = temp_candidates();
    write_json(&paths.user, r#"{"ip":"user"}"#);
    let store = ConfigStore::new(paths.clone(), false);

    assert_eq!(store.read_path(), paths.user);
    assert_eq!(store.load().expect("load").ip(), Some("user"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_read_defaults_to_nonexistent_fallback_and_loads_empty() {
    // No candidate exists: read resolves to the fallback path, which does
    // not exist either, and load maps that to the empty config.
    let (paths, dir) = temp_candidates();
    let store = ConfigStore::new(paths.clone(), false);

    assert_eq!(store.read_path(), paths.fallback);
    assert!(!paths.fallback.exists());
    assert_eq!(store.load().expect("load"), DeviceConfig::default());

    std::fs::remove_dir_all(&dir).ok();
}

// ── Write resolution ──────────────────────────────────────────────────────────

#[test]
fn test_write_path_depends_only_on_privilege_level() {
    // Even with an existing user file, an elevated store writes to the
    // system path, and vice versa.  No probing on the write side.
    let (paths, dir) = temp_candidates();
    write_json(&paths.user, "{}");

    let elevated = ConfigStore::new(paths.clone(), true);
    let unprivileged = ConfigStore::new(paths.clone(), false);

    assert_eq!(elevated.write_path(), paths.system);
    assert_eq!(unprivileged.write_path(), paths.user);

    std::fs::remove_dir_all(&dir).ok();
}

// ── Incremental lifecycle ─────────────────────────────────────────────────────

#[test]
fn test_config_grows_incrementally_and_never_loses_fields() {
    // Arrange
    let (paths, dir) = temp_candidates();
    let store = ConfigStore::new(paths, false);

    // First run: nothing stored yet
    assert_eq!(store.load().expect("load"), DeviceConfig::default());

    // setmac semantics: merge mac only
    let mut cfg = store.load().expect("load");
    cfg.mac = Some("11:22:33:44:55:66".to_string());
    store.save(&cfg).expect("save");

    // auth semantics: merge ip + mac + client_key into the existing mapping
    let mut cfg = store.load().expect("load");
    cfg.ip = Some("192.168.1.50".to_string());
    cfg.mac = Some("AA:BB:CC:DD:EE:FF".to_string());
    cfg.client_key = Some("issued-key".to_string());
    store.save(&cfg).expect("save");

    // A later setmac must leave ip and client_key untouched
    let mut cfg = store.load().expect("load");
    cfg.mac = Some("77:88:99:AA:BB:CC".to_string());
    store.save(&cfg).expect("save");

    // Assert
    let final_cfg = store.load().expect("load");
    assert_eq!(final_cfg.ip(), Some("192.168.1.50"));
    assert_eq!(final_cfg.mac(), Some("77:88:99:AA:BB:CC"));
    assert_eq!(final_cfg.client_key(), Some("issued-key"));

    std::fs::remove_dir_all(&dir).ok();
}
