use std::fs;

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend_url: String,
    pub request_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8443".into(),
            request_timeout_seconds: 30,
        }
    }
}

/// Defaults, then `client.toml`, then environment overrides; later layers win.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("client.toml") {
        apply_file_config(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Ok(v) = std::env::var("APP__BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Ok(v) = std::env::var("REQUEST_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse() {
            settings.request_timeout_seconds = parsed;
        }
    }

    settings
}

fn apply_file_config(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = raw.parse::<toml::Table>() else {
        return;
    };
    if let Some(v) = file_cfg.get("backend_url").and_then(toml::Value::as_str) {
        settings.backend_url = v.to_string();
    }
    // Accept both `= 10` and `= "10"` for the timeout.
    match file_cfg.get("request_timeout_seconds") {
        Some(toml::Value::Integer(v)) => {
            if let Ok(parsed) = u64::try_from(*v) {
                settings.request_timeout_seconds = parsed;
            }
        }
        Some(toml::Value::String(v)) => {
            if let Ok(parsed) = v.parse() {
                settings.request_timeout_seconds = parsed;
            }
        }
        _ => {}
    }
}
