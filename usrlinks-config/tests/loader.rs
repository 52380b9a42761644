use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use tempfile::TempDir;
use usrlinks_config::{ConfigLoader, ConfigSource, EnvOverrides};

fn empty_root() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

#[test]
fn defaults_when_nothing_is_configured() -> Result<()> {
    let root = empty_root();
    let load = ConfigLoader::new()
        .with_search_root(root.path())
        .load_with_env(&EnvOverrides::default())?;

    assert_eq!(load.source, ConfigSource::Default);
    assert_eq!(load.config.server.port, 8080);
    assert_eq!(load.config.engine.retry.max_attempts, 3);
    assert_eq!(load.config.registry.path, None);
    Ok(())
}

#[test]
fn default_candidate_file_is_found() -> Result<()> {
    let root = empty_root();
    fs::create_dir(root.path().join("config"))?;
    fs::write(
        root.path().join("config/usrlinks.toml"),
        "[server]\nport = 9100\n\n[engine.reconcile]\nmax_rounds = 5\n",
    )?;

    let load = ConfigLoader::new()
        .with_search_root(root.path())
        .load_with_env(&EnvOverrides::default())?;

    assert_eq!(
        load.source,
        ConfigSource::File(root.path().join("config/usrlinks.toml"))
    );
    assert_eq!(load.config.server.port, 9100);
    assert_eq!(load.config.server.host, "0.0.0.0");
    assert_eq!(load.config.engine.reconcile.max_rounds, 5);
    Ok(())
}

#[test]
fn env_path_beats_inline_json_and_default_files() -> Result<()> {
    let root = empty_root();
    fs::write(root.path().join("usrlinks.toml"), "[server]\nport = 1111\n")?;
    let chosen = root.path().join("chosen.json");
    fs::write(&chosen, r#"{"server": {"port": 2222}}"#)?;

    let env = EnvOverrides {
        config_path: Some(chosen.display().to_string()),
        config_json: Some(r#"{"server": {"port": 3333}}"#.into()),
        ..EnvOverrides::default()
    };
    let load = ConfigLoader::new()
        .with_search_root(root.path())
        .load_with_env(&env)?;

    assert_eq!(load.source, ConfigSource::EnvPath(chosen));
    assert_eq!(load.config.server.port, 2222);
    Ok(())
}

#[test]
fn inline_json_is_used_without_a_path() -> Result<()> {
    let root = empty_root();
    let env = EnvOverrides {
        config_json: Some(r#"{"engine": {"retry": {"backoff_step_ms": 0}}}"#.into()),
        ..EnvOverrides::default()
    };
    let load = ConfigLoader::new()
        .with_search_root(root.path())
        .load_with_env(&env)?;

    assert_eq!(load.source, ConfigSource::EnvInline);
    assert_eq!(load.config.engine.retry.backoff_step_ms, 0);
    assert_eq!(load.config.engine.retry.max_attempts, 3);
    Ok(())
}

#[test]
fn explicit_path_wins_over_env() -> Result<()> {
    let root = empty_root();
    let explicit = root.path().join("cli.toml");
    fs::write(&explicit, "[server]\nhost = \"127.0.0.1\"\n")?;

    let env = EnvOverrides {
        config_json: Some(r#"{"server": {"host": "10.0.0.1"}}"#.into()),
        ..EnvOverrides::default()
    };
    let load = ConfigLoader::new()
        .with_search_root(root.path())
        .with_config_path(&explicit)
        .load_with_env(&env)?;

    assert_eq!(load.source, ConfigSource::Explicit(explicit));
    assert_eq!(load.config.server.host, "127.0.0.1");
    Ok(())
}

#[test]
fn env_overrides_apply_on_top() -> Result<()> {
    let root = empty_root();
    let env = EnvOverrides {
        host: Some("127.0.0.1".into()),
        port: Some(" 7000 ".into()),
        platforms_path: Some("/etc/usrlinks/platforms.json".into()),
        ..EnvOverrides::default()
    };
    let load = ConfigLoader::new()
        .with_search_root(root.path())
        .load_with_env(&env)?;

    assert_eq!(load.config.server.host, "127.0.0.1");
    assert_eq!(load.config.server.port, 7000);
    assert_eq!(
        load.config.registry.path,
        Some(PathBuf::from("/etc/usrlinks/platforms.json"))
    );
    Ok(())
}

#[test]
fn invalid_port_is_an_error() {
    let root = empty_root();
    let env = EnvOverrides {
        port: Some("http".into()),
        ..EnvOverrides::default()
    };
    let err = ConfigLoader::new()
        .with_search_root(root.path())
        .load_with_env(&env)
        .unwrap_err();
    assert!(err.to_string().contains("USRLINKS_PORT"));
}

#[test]
fn missing_explicit_file_is_an_error() {
    let root = empty_root();
    let result = ConfigLoader::new()
        .with_config_path(root.path().join("nope.toml"))
        .load_with_env(&EnvOverrides::default());
    assert!(result.is_err());
}

#[test]
fn extensionless_file_accepts_either_format() -> Result<()> {
    let root = empty_root();
    let path = root.path().join("usrlinks.conf");
    fs::write(&path, r#"{"registry": {"path": "platforms.json"}}"#)?;

    let load = ConfigLoader::new()
        .with_config_path(&path)
        .load_with_env(&EnvOverrides::default())?;
    assert_eq!(load.config.registry.path, Some(PathBuf::from("platforms.json")));
    Ok(())
}
