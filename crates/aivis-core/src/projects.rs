use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One tracked project in `config/projects.yaml`: the domain whose visibility
/// is measured, plus the keywords scanned against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSeed {
    pub name: String,
    pub domain: String,
    #[serde(default = "default_location")]
    pub target_location: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn default_location() -> String {
    "United States".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ProjectsFile {
    pub projects: Vec<ProjectSeed>,
}

/// Load and validate the projects configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_projects(path: &Path) -> Result<ProjectsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProjectsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let projects_file: ProjectsFile = serde_yaml::from_str(&content)?;

    validate_projects(&projects_file)?;

    Ok(projects_file)
}

fn validate_projects(projects_file: &ProjectsFile) -> Result<(), ConfigError> {
    let mut seen_domains = HashSet::new();

    for project in &projects_file.projects {
        if project.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "project name must be non-empty".to_string(),
            ));
        }

        let domain = project.domain.trim();
        if domain.is_empty() {
            return Err(ConfigError::Validation(format!(
                "project '{}' has an empty domain",
                project.name
            )));
        }

        if !seen_domains.insert(domain.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate project domain: '{domain}'"
            )));
        }

        let mut seen_terms = HashSet::new();
        for term in &project.keywords {
            if term.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "project '{}' contains an empty keyword",
                    project.name
                )));
            }
            if !seen_terms.insert(term.trim().to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "project '{}' has duplicate keyword '{term}'",
                    project.name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(domain: &str, keywords: &[&str]) -> ProjectSeed {
        ProjectSeed {
            name: "Test".to_string(),
            domain: domain.to_string(),
            target_location: default_location(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    #[test]
    fn valid_file_passes() {
        let file = ProjectsFile {
            projects: vec![seed("hypefresh.co", &["best crm software"])],
        };
        assert!(validate_projects(&file).is_ok());
    }

    #[test]
    fn empty_domain_is_rejected() {
        let file = ProjectsFile {
            projects: vec![seed("  ", &[])],
        };
        assert!(validate_projects(&file).is_err());
    }

    #[test]
    fn duplicate_domain_is_rejected() {
        let file = ProjectsFile {
            projects: vec![seed("a.co", &[]), seed("A.CO", &[])],
        };
        assert!(validate_projects(&file).is_err());
    }

    #[test]
    fn duplicate_keyword_is_rejected() {
        let file = ProjectsFile {
            projects: vec![seed("a.co", &["crm", "CRM "])],
        };
        assert!(validate_projects(&file).is_err());
    }

    #[test]
    fn yaml_defaults_fill_location_and_keywords() {
        let parsed: ProjectsFile =
            serde_yaml::from_str("projects:\n  - name: X\n    domain: x.io\n").unwrap();
        assert_eq!(parsed.projects[0].target_location, "United States");
        assert!(parsed.projects[0].keywords.is_empty());
    }
}
