// tests/config_file.rs
use signal_desk::config::{EngineConfig, DEFAULT_CONFIG_PATH, ENV_ACCEPT_THRESHOLD, ENV_CONFIG_PATH};
use signal_desk::{BelowThresholdPolicy, MatchScope};
use std::{env, fs};

const REPO_CONFIG: &str = include_str!("../config/signal.toml");

#[test]
fn shipped_config_parses() {
    let cfg = EngineConfig::from_toml_str(REPO_CONFIG).expect("config/signal.toml");
    assert_eq!(cfg.classifier.accept_threshold, 2);
    assert_eq!(cfg.classifier.signal_keywords.len(), 15);
    assert_eq!(cfg.classifier.noise_scope, MatchScope::TitleAndBody);
    assert_eq!(cfg.classifier.below_threshold, BelowThresholdPolicy::AcceptLongForm);
    assert!(cfg.classifier.short_body_requires_threshold);
    assert_eq!(cfg.sections.section_for(Some("stat.ML")), "Machine Learning");
    assert_eq!(cfg.sections.section_for(Some("q-fin.ST")), "Industry");
    assert_eq!(cfg.sources.arxiv.as_ref().unwrap().categories.len(), 4);
    assert!(cfg.sources.rss.is_empty());
    assert!(cfg.sources.news_api.is_none());
}

#[test]
fn invalid_documents_are_rejected_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("bad.toml");
    fs::write(&p, "[classifier]\naccept_threshold = 2\n[classifier.signal_keywords]\nai = 0\n").unwrap();
    let err = EngineConfig::load_from(&p).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("bad.toml"), "{msg}");
    assert!(msg.contains("weight 0"), "{msg}");
}

#[serial_test::serial]
#[test]
fn default_path_is_picked_up_from_cwd() {
    // Isolate CWD so the repo's own config/ is not read.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_ACCEPT_THRESHOLD);

    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(
        tmp.path().join(DEFAULT_CONFIG_PATH),
        "[classifier]\naccept_threshold = 7\n[assembly]\nper_section_cap = 1\n",
    )
    .unwrap();

    let cfg = EngineConfig::load_default().unwrap();
    assert_eq!(cfg.classifier.accept_threshold, 7);
    assert_eq!(cfg.assembly.per_section_cap, 1);
    assert_eq!(cfg.sections.order, vec!["General".to_string()]);

    env::set_current_dir(&old).unwrap();
}
