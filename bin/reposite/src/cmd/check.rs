//! Check command - validate configuration, template choice and content

use std::{fs, path::Path};

use color_eyre::eyre::{Result, bail};
use reposite_core::{Config, SectionType};
use reposite_generator::TemplateKind;
use reposite_parser::{ContentNormalizer, RawContent};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates the configuration and, when given, the template key and the
/// content file, without writing anything.
pub fn run(
    config_path: &Path,
    content: Option<&Path>,
    template: Option<&str>,
    strict: bool,
) -> Result<()> {
    tracing::info!(?config_path, ?content, ?template, strict, "Checking");

    let result = validate(config_path, content, template);

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Collect errors and warnings for the given inputs.
pub fn validate(
    config_path: &Path,
    content: Option<&Path>,
    template: Option<&str>,
) -> ValidationResult {
    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = if config_path.exists() {
        match Config::load_with_env(config_path) {
            Ok(c) => {
                println!("  ✓ Configuration valid");
                Some(c)
            }
            Err(e) => {
                result.add_error(format!("Configuration error: {e}"));
                println!("  ✗ Configuration invalid: {e}");
                None
            }
        }
    } else {
        result.add_warning(format!(
            "Configuration file {} not found, defaults apply",
            config_path.display()
        ));
        Some(Config::default())
    };

    if let Some(ref cfg) = config {
        println!("\nChecking configuration values...");
        check_config_values(cfg, &mut result);
    }

    if let Some(key) = template {
        println!("\nChecking template...");
        check_template(key, &mut result);
    }

    if let Some(path) = content {
        println!("\nChecking content...");
        check_content(path, &mut result);
    }

    result
}

/// Check configuration values for common issues.
fn check_config_values(config: &Config, result: &mut ValidationResult) {
    let fallback = &config.site.fallback_base_url;
    if !fallback.starts_with("http://") && !fallback.starts_with("https://") {
        result.add_warning("site.fallback_base_url should start with http:// or https://");
    }

    if config.site.analytics_endpoint.trim().is_empty() {
        result.add_warning("site.analytics_endpoint is empty; page views will not be recorded");
    }

    if let Some(dir) = &config.styles.dir {
        if !dir.is_dir() {
            result.add_warning(format!(
                "styles.dir {} is not a directory; template stylesheets will be placeholders",
                dir.display()
            ));
        } else {
            for kind in TemplateKind::all() {
                let css = dir.join(format!("{}.css", kind.key()));
                if !css.is_file() {
                    result.add_warning(format!("Missing template stylesheet: {}", css.display()));
                }
            }
        }
    }

    println!("  ✓ Configuration values checked");
}

fn check_template(key: &str, result: &mut ValidationResult) {
    match TemplateKind::from_key(key.trim()) {
        Some(kind) => println!("  ✓ Template {kind} available"),
        None => {
            let known: Vec<&str> = TemplateKind::all().iter().map(|k| k.key()).collect();
            result.add_warning(format!(
                "Unknown template '{key}' will fall back to {}; known templates: {}",
                TemplateKind::ModernWeb.key(),
                known.join(", ")
            ));
        }
    }
}

fn check_content(path: &Path, result: &mut ValidationResult) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            result.add_error(format!("Cannot read {}: {e}", path.display()));
            return;
        }
    };

    let source_id = path.to_string_lossy();
    match ContentNormalizer::new().normalize(&RawContent::detect(text), &source_id) {
        Ok(content) => {
            println!(
                "  ✓ {} section(s), title \"{}\"",
                content.sections.len(),
                content.title
            );
            if content.description.is_empty() {
                result.add_warning("Content has no description paragraph");
            }
            let docs = content
                .sections
                .iter()
                .filter(|s| s.section_type.is_secondary_page())
                .count();
            if docs > 0 {
                println!("  ℹ {docs} documentation page(s) will be generated");
            }
            if content.sections.len() == 1 && content.sections[0].section_type == SectionType::Overview
            {
                result.add_warning("Content has no `##` sections; everything renders as the overview");
            }
        }
        Err(e) => result.add_error(format!("Content error in {}: {e}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_defaults_warns_about_missing_config() {
        let tmp = tempfile::tempdir().unwrap();
        let result = validate(&tmp.path().join("absent.toml"), None, None);
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_unknown_template_is_a_warning() {
        let tmp = tempfile::tempdir().unwrap();
        let result = validate(&tmp.path().join("absent.toml"), None, Some("fancy"));
        assert!(result.warnings.iter().any(|w| w.contains("fancy")));
        assert!(run(&tmp.path().join("absent.toml"), None, Some("fancy"), true).is_err());
        assert!(run(&tmp.path().join("absent.toml"), None, Some("fancy"), false).is_ok());
    }

    #[test]
    fn test_empty_content_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let content = tmp.path().join("content.md");
        fs::write(&content, "  \n").unwrap();

        let result = validate(&tmp.path().join("absent.toml"), Some(&content), None);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_content_with_sections() {
        let tmp = tempfile::tempdir().unwrap();
        let content = tmp.path().join("content.md");
        fs::write(&content, "# Acme\n\nAcme does X.\n\n## API\n\nCall it.\n").unwrap();

        let result = validate(&tmp.path().join("absent.toml"), Some(&content), None);
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_missing_styles_dir_warns() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("reposite.toml");
        fs::write(&config_path, "[styles]\ndir = \"/nonexistent/styles\"\n").unwrap();

        let result = validate(&config_path, None, None);
        assert!(result.errors.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("styles.dir")));
    }
}
