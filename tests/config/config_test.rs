//! Coverage for config parsing and path resolution.

use std::path::{Path, PathBuf};

use persona_card::config::{load_config, runtime_paths, Config};
use persona_card::render::RenderConfig;

#[test]
fn runtime_paths_live_under_config_dir() {
    let paths = runtime_paths();
    assert!(paths.is_ok());
    let paths = match paths {
        Ok(paths) => paths,
        Err(err) => panic!("runtime paths should resolve: {err}"),
    };
    assert!(paths.root.ends_with(".persona-card"));
    assert_eq!(paths.config_toml, paths.root.join("config.toml"));
    assert_eq!(paths.env_file, paths.root.join(".env"));
    assert_eq!(paths.logs_dir, paths.root.join("logs"));
}

#[test]
fn parse_partial_config_keeps_other_defaults() {
    let toml_str = r#"
[models]
default = "openai/gpt-4o-mini"
api_key_env = "OPENAI_API_KEY"

[reddit]
post_limit = 25

[render]
width = 1200
wrap_width = 80
header_font = "/opt/fonts/DejaVuSans-Bold.ttf"

[output]
dir = "personas"
"#;
    let config_parse = toml::from_str::<Config>(toml_str);
    assert!(config_parse.is_ok());
    let config = match config_parse {
        Ok(config) => config,
        Err(err) => panic!("partial config should parse: {err}"),
    };

    assert_eq!(config.models.default, "openai/gpt-4o-mini");
    assert_eq!(config.models.api_key_env, "OPENAI_API_KEY");
    assert_eq!(config.models.max_tokens, 4096);
    assert_eq!(config.reddit.post_limit, 25);
    assert_eq!(config.reddit.comment_limit, 50);
    assert_eq!(config.reddit.client_id_env, "REDDIT_CLIENT_ID");
    assert_eq!(config.render.width, 1200);
    assert_eq!(config.render.wrap_width, 80);
    assert_eq!(
        config.render.header_font,
        PathBuf::from("/opt/fonts/DejaVuSans-Bold.ttf")
    );
    assert_eq!(config.render.body_font, RenderConfig::default().body_font);
    assert_eq!(config.render.line_pitch, 32);
    assert_eq!(config.output.dir, Path::new("personas"));
}

#[test]
fn render_defaults_match_layout_constants() {
    let render = RenderConfig::default();
    assert_eq!(render.width, 1400);
    assert_eq!(render.initial_height, 3000);
    assert_eq!(render.margin, 60);
    assert_eq!(render.spacing, 40);
    assert_eq!(render.section_padding, 30);
    assert_eq!(render.line_pitch, 32);
    assert_eq!(render.wrap_width, 95);
    assert_eq!(render.bottom_margin, 40);
    assert!((render.header_size - 26.0).abs() < f32::EPSILON);
    assert!((render.body_size - 22.0).abs() < f32::EPSILON);
}

#[test]
fn load_config_reads_file() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[render]\nspacing = 20\n").expect("should write config");

    let loaded = load_config(&path);
    assert!(loaded.is_ok());
    let config = match loaded {
        Ok(config) => config,
        Err(err) => panic!("config should load: {err}"),
    };
    assert_eq!(config.render.spacing, 20);
}

#[test]
fn load_config_reports_bad_toml() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[render\nwidth = ").expect("should write config");

    let loaded = load_config(&path);
    match loaded {
        Err(err) => assert!(err.to_string().contains("failed to parse config")),
        Ok(_) => panic!("malformed config should not load"),
    }
}

#[test]
fn load_config_reports_missing_file() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let loaded = load_config(&dir.path().join("absent.toml"));
    assert!(loaded.is_err());
}
