use std::env;
use std::fs;
use std::path::Path;

use toml::Value;
use vitrine_core::config::{resolve_config_path, AppConfig, LoadOptions};

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str], flag: Option<&str>| {
        let file_path = config_file_path.as_deref();
        field_source(key_path, env_keys, flag, config_file_doc.as_ref(), file_path)
    };

    let overrides = &options.overrides;
    let lines = [
        "effective config (source precedence: flag > env > file > default):".to_string(),
        render_line(
            "catalog.data_path",
            &config.catalog.data_path.display().to_string(),
            source(
                "catalog.data_path",
                &["VITRINE_CATALOG_DATA_PATH"],
                overrides.data_path.as_ref().map(|_| "--data"),
            ),
        ),
        render_line(
            "catalog.import_policy",
            &format!("{:?}", config.catalog.import_policy),
            source(
                "catalog.import_policy",
                &["VITRINE_CATALOG_IMPORT_POLICY"],
                overrides.import_policy.map(|_| "--strict"),
            ),
        ),
        render_line(
            "logging.level",
            &config.logging.level,
            source("logging.level", &["VITRINE_LOGGING_LEVEL", "VITRINE_LOG_LEVEL"], None),
        ),
        render_line(
            "logging.format",
            &format!("{:?}", config.logging.format),
            source("logging.format", &["VITRINE_LOGGING_FORMAT", "VITRINE_LOG_FORMAT"], None),
        ),
    ];

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    flag: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(flag) = flag {
        return format!("flag ({flag})");
    }

    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use toml::Value;

    use super::{contains_path, field_source};

    #[test]
    fn flag_wins_over_every_other_source() {
        let doc: Value = "[catalog]\ndata_path = \"x.json\"\n".parse().expect("valid toml");

        let source = field_source("catalog.data_path", &[], Some("--data"), Some(&doc), None);
        assert_eq!(source, "flag (--data)");
    }

    #[test]
    fn file_source_names_the_file() {
        let doc: Value = "[logging]\nlevel = \"debug\"\n".parse().expect("valid toml");

        assert!(contains_path(&doc, "logging.level"));
        assert!(!contains_path(&doc, "logging.format"));
        assert_eq!(
            field_source("logging.level", &[], None, Some(&doc), Some(Path::new("vitrine.toml"))),
            "file (vitrine.toml)"
        );
        assert_eq!(field_source("logging.format", &[], None, Some(&doc), None), "default");
    }
}
