use endorse_core::domain::{CommitStrategy, EndorsementPolicy, QuorumRule};
use endorse_core::foundation::ErrorCode;
use endorse_core::infrastructure::config::{load_app_config, load_app_config_from_path, load_config_from_file, AppConfig};
use figment::Jail;
use std::path::Path;

const CONFIG: &str = r#"
[endorsement]
timeout_ms = 1500
quorum = { policy = { out_of = { n = 2, rules = [{ signed_by = "Org1MSP" }, { signed_by = "Org2MSP" }, { signed_by = "Org3MSP" }] } } }

[commit]
strategy = "network_scope_any_for_tx"

[discovery]
enabled = false
as_localhost = true

[[discovery.static_peers]]
name = "peer0.org1.example.com"
msp_id = "Org1MSP"
url = "grpcs://peer0.org1.example.com:7051"

[logging]
filters = "info,endorse_core=debug"
"#;

#[test]
fn test_load_when_file_and_env_then_env_wins() {
    Jail::expect_with(|jail| {
        jail.create_file("endorse.toml", CONFIG)?;
        jail.set_env("ENDORSE_COMMIT__TIMEOUT_SECS", "9");

        let config = load_app_config(jail.directory()).map_err(|err| err.to_string())?;

        assert_eq!(config.endorsement.timeout_ms, 1500);
        assert_eq!(config.commit.timeout_secs, 9);
        assert_eq!(config.commit.strategy, CommitStrategy::NetworkScopeAnyForTx);
        assert!(!config.discovery.enabled);
        assert!(config.discovery.as_localhost);
        assert_eq!(config.discovery.static_peers.len(), 1);
        assert_eq!(config.logging.filters, "info,endorse_core=debug");
        let QuorumRule::Policy(policy) = &config.endorsement.quorum else {
            panic!("expected explicit policy, got {:?}", config.endorsement.quorum);
        };
        assert_eq!(
            policy,
            &EndorsementPolicy::n_of(2, ["Org1MSP", "Org2MSP", "Org3MSP"].map(EndorsementPolicy::signed_by))
        );
        Ok(())
    });
}

#[test]
fn test_load_when_config_path_env_set_then_that_file_used() {
    Jail::expect_with(|jail| {
        jail.create_dir("conf")?;
        jail.create_file("conf/custom.toml", "[endorsement]\ntimeout_ms = 750\n")?;
        jail.set_env("ENDORSE_CONFIG_PATH", "conf/custom.toml");

        let config = load_app_config(Path::new("/nonexistent")).map_err(|err| err.to_string())?;

        assert_eq!(config.endorsement.timeout_ms, 750);
        Ok(())
    });
}

#[test]
fn test_load_when_file_missing_then_defaults() {
    Jail::expect_with(|jail| {
        let config = load_config_from_file(&jail.directory().join("absent.toml")).map_err(|err| err.to_string())?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    });
}

#[test]
fn test_load_when_invalid_values_then_config_error_lists_problems() {
    Jail::expect_with(|jail| {
        jail.create_file("bad.toml", "[endorsement]\ntimeout_ms = 0\nmax_concurrent_peers = 0\n")?;

        let err = load_app_config_from_path(&jail.directory().join("bad.toml")).expect_err("invalid");

        assert_eq!(err.code(), ErrorCode::ConfigError);
        let message = err.to_string();
        assert!(message.contains("timeout_ms"), "{message}");
        assert!(message.contains("max_concurrent_peers"), "{message}");
        Ok(())
    });
}

#[test]
fn test_load_when_env_value_malformed_then_config_error() {
    Jail::expect_with(|jail| {
        jail.set_env("ENDORSE_ENDORSEMENT__TIMEOUT_MS", "soon");

        let err = load_config_from_file(&jail.directory().join("endorse.toml")).expect_err("malformed");

        assert_eq!(err.code(), ErrorCode::ConfigError);
        Ok(())
    });
}
