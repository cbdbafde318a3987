//! Doctor command - verify provider credentials and configuration.

use crate::cli::{mask_secret, Output};
use crate::config::{Settings, MAX_ATTEMPTS};
use crate::heuristics::is_valid_url;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        eprintln!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            eprintln!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("Studykit Doctor");
    eprintln!();

    let lookup = |name: &str| std::env::var(name).ok();
    let sections = [
        ("Primary Provider", check_primary(settings, lookup)),
        ("Free-text Endpoints", check_secondary(settings, lookup)),
        ("Configuration", check_configuration(settings, config_path)),
    ];

    let mut errors = 0;
    let mut warnings = 0;
    for (title, checks) in &sections {
        eprintln!("{}", style(title).bold());
        for check in checks {
            check.print();
            match check.status {
                CheckStatus::Error => errors += 1,
                CheckStatus::Warning => warnings += 1,
                CheckStatus::Ok => {}
            }
        }
        eprintln!();
    }

    if errors > 0 {
        Output::error(&format!("{} error(s) found. Please fix them before using Studykit.", errors));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Studykit is ready to use.");
    }

    Ok(())
}

fn check_primary(settings: &Settings, lookup: impl Fn(&str) -> Option<String>) -> Vec<CheckResult> {
    let primary = &settings.primary;
    if !primary.enabled {
        return vec![CheckResult::warning(
            "Primary provider",
            "disabled",
            "Enable with [primary] enabled = true",
        )];
    }

    let key_check = match lookup(&primary.api_key_env) {
        Some(key) if key.starts_with("sk-") && key.len() > 20 => {
            CheckResult::ok(&primary.api_key_env, &format!("configured ({})", mask_secret(&key)))
        }
        Some(key) if key.trim().is_empty() => CheckResult::warning(
            &primary.api_key_env,
            "empty, free-text endpoints will be used",
            &format!("Set with: export {}='sk-...'", primary.api_key_env),
        ),
        Some(_) => CheckResult::warning(
            &primary.api_key_env,
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        None => CheckResult::warning(
            &primary.api_key_env,
            "not set, free-text endpoints will be used",
            &format!("Set with: export {}='sk-...'", primary.api_key_env),
        ),
    };

    vec![key_check, CheckResult::ok("Model", &primary.model)]
}

fn check_secondary(settings: &Settings, lookup: impl Fn(&str) -> Option<String>) -> Vec<CheckResult> {
    let secondary = &settings.secondary;
    if !secondary.enabled {
        return vec![CheckResult::warning(
            "Free-text endpoints",
            "disabled, heuristics only",
            "Enable with [secondary] enabled = true",
        )];
    }

    let mut results = Vec::new();

    if secondary.endpoints.is_empty() {
        results.push(CheckResult::warning(
            "Endpoints",
            "none configured, heuristics only",
            "Add URLs to [secondary] endpoints",
        ));
    }
    for endpoint in &secondary.endpoints {
        if is_valid_url(endpoint) {
            results.push(CheckResult::ok("Endpoint", endpoint));
        } else {
            results.push(CheckResult::error(
                "Endpoint",
                &format!("{} is not a valid http(s) URL", endpoint),
                "Fix the entry in [secondary] endpoints",
            ));
        }
    }

    results.push(match lookup(&secondary.token_env).filter(|t| !t.trim().is_empty()) {
        Some(token) => CheckResult::ok(&secondary.token_env, &format!("configured ({})", mask_secret(&token))),
        None => CheckResult::warning(
            &secondary.token_env,
            "not set, anonymous requests are heavily rate limited",
            &format!("Set with: export {}='hf_...'", secondary.token_env),
        ),
    });

    if secondary.max_attempts == 0 {
        results.push(CheckResult::warning(
            "Retry",
            "max_attempts is 0, treated as 1",
            "Set [secondary] max_attempts to at least 1",
        ));
    } else if secondary.max_attempts > MAX_ATTEMPTS {
        results.push(CheckResult::warning(
            "Retry",
            &format!("max_attempts is {}, capped at {}", secondary.max_attempts, MAX_ATTEMPTS),
            &format!("Set [secondary] max_attempts to at most {}", MAX_ATTEMPTS),
        ));
    } else {
        results.push(CheckResult::ok(
            "Retry",
            &format!(
                "{} attempt(s), backoff unit {} ms",
                secondary.max_attempts, secondary.backoff_base_ms
            ),
        ));
    }

    results
}

fn check_configuration(settings: &Settings, config_path: &Path) -> Vec<CheckResult> {
    let mut results = Vec::new();

    if config_path.exists() {
        results.push(CheckResult::ok("Config file", &config_path.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: studykit config edit",
        ));
    }

    if let Some(dir) = &settings.prompts.custom_dir {
        let path = Settings::expand_path(dir);
        if path.is_dir() {
            results.push(CheckResult::ok("Prompt directory", &path.display().to_string()));
        } else {
            results.push(CheckResult::error(
                "Prompt directory",
                &format!("{} does not exist", path.display()),
                "Create it or remove [prompts] custom_dir",
            ));
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_missing_key_is_only_a_warning() {
        let checks = check_primary(&Settings::default(), |_| None);
        assert_eq!(checks[0].status, CheckStatus::Warning);
        assert!(checks.iter().all(|c| c.status != CheckStatus::Error));
    }

    #[test]
    fn test_key_is_masked() {
        let checks = check_primary(&Settings::default(), |_| Some("sk-abcdefghijklmnopqrstuvwxyz".to_string()));
        assert_eq!(checks[0].status, CheckStatus::Ok);
        assert!(!checks[0].message.contains("ijklmnop"));
    }

    #[test]
    fn test_invalid_endpoint_is_error() {
        let mut settings = Settings::default();
        settings.secondary.endpoints = vec!["not a url".to_string()];

        let checks = check_secondary(&settings, |_| None);
        assert!(checks.iter().any(|c| c.status == CheckStatus::Error));
    }

    #[test]
    fn test_attempts_above_ceiling_warn() {
        let mut settings = Settings::default();
        settings.secondary.max_attempts = 8;

        let checks = check_secondary(&settings, |_| None);
        let retry = checks.iter().find(|c| c.name == "Retry").unwrap();
        assert_eq!(retry.status, CheckStatus::Warning);
        assert!(retry.message.contains("capped at 3"));
    }

    #[test]
    fn test_missing_prompt_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.prompts.custom_dir = Some(dir.path().join("nope").display().to_string());

        let checks = check_configuration(&settings, &dir.path().join("config.toml"));
        assert_eq!(checks[0].status, CheckStatus::Warning);
        assert_eq!(checks[1].status, CheckStatus::Error);
    }
}
