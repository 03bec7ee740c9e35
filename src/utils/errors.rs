//! Enhanced error types with actionable suggestions

use colored::Colorize;
use thiserror::Error;

/// Top-level error with suggestions for the user
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ChainnetDevError {
    pub message: String,
    pub suggestions: Vec<String>,
}

impl ChainnetDevError {
    /// Create a new error with suggestions
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    /// Add a suggestion to the error
    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Display the error with suggestions
    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.message);

        if !self.suggestions.is_empty() {
            eprintln!();
            eprintln!("{}", "Suggestions:".yellow().bold());
            for suggestion in &self.suggestions {
                eprintln!("  {} {}", "→".blue(), suggestion);
            }
        }
    }

    /// Docker daemon could not be reached
    pub fn docker_unreachable() -> Self {
        Self::new("Docker daemon is not reachable")
            .suggest("Start Docker Desktop or the docker service")
            .suggest("Verify with: docker info")
    }

    /// Cluster API could not be reached
    pub fn cluster_unreachable() -> Self {
        Self::new("Kubernetes cluster is not reachable")
            .suggest("Create the clusters with: chainnet-dev clusters create")
            .suggest("Check the active context with: kubectl config current-context")
    }

    /// Manifest file missing on disk
    pub fn manifest_missing(detail: &str) -> Self {
        Self::new(format!("Manifest file not found: {}", detail))
            .suggest("Run chainnet-dev from the repository root")
            .suggest("Adjust [[manifests]] paths with: chainnet-dev config init")
    }

    /// Tool not found error
    pub fn tool_not_found(tool: &str, install_hint: &str) -> Self {
        Self::new(format!("Required tool '{}' not found", tool))
            .suggest(install_hint.to_string())
            .suggest("Ensure the tool is in your PATH")
    }
}

/// Helper to display error and exit
pub fn display_error_and_exit(error: ChainnetDevError) -> ! {
    error.display();
    std::process::exit(1);
}

/// Convert anyhow error to ChainnetDevError when possible
pub fn enhance_error(err: &anyhow::Error) -> ChainnetDevError {
    let err_str = format!("{:#}", err);

    if err_str.contains("docker info") || err_str.contains("Cannot connect to the Docker daemon") {
        return ChainnetDevError::docker_unreachable().suggest(err_str);
    }

    if err_str.contains("cluster-info") || err_str.contains("connection refused") {
        return ChainnetDevError::cluster_unreachable().suggest(err_str);
    }

    if let Some(pos) = err_str.find("manifest file not found: ") {
        let detail = &err_str[pos + "manifest file not found: ".len()..];
        return ChainnetDevError::manifest_missing(detail.lines().next().unwrap_or(detail));
    }

    if err_str.contains("minikube version") {
        return ChainnetDevError::tool_not_found(
            "minikube",
            "Install from: https://minikube.sigs.k8s.io/docs/start/",
        );
    }

    // Default error with generic suggestion
    ChainnetDevError::new(err_str)
        .suggest("Run with -v for more details")
        .suggest("Run 'chainnet-dev check' to verify prerequisites")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_suggestions() {
        let err = ChainnetDevError::new("test")
            .suggest("suggestion 1")
            .suggest("suggestion 2");
        assert_eq!(err.suggestions.len(), 2);
    }

    #[test]
    fn test_enhance_manifest_missing() {
        let err = anyhow::anyhow!("manifest file not found: deploy/redis/redis-service.yaml");
        let enhanced = enhance_error(&err);
        assert!(enhanced.message.contains("deploy/redis/redis-service.yaml"));
        assert_eq!(enhanced.suggestions.len(), 2);
    }

    #[test]
    fn test_enhance_default() {
        let err = anyhow::anyhow!("something odd");
        let enhanced = enhance_error(&err);
        assert_eq!(enhanced.message, "something odd");
    }
}
