//! Kubectl command lines, executed through a [`CommandRunner`]

use std::path::Path;

use crate::config::Action;
use crate::utils::{CommandError, CommandOutput, CommandRunner, command_line};

/// `kubectl apply -f <path>` or `kubectl delete -f <path>`, with `-n` when given
pub fn manifest_command(action: Action, path: &Path, namespace: Option<&str>) -> String {
    let path = path.to_string_lossy();
    let mut args = vec!["kubectl", action.kubectl_verb(), "-f", path.as_ref()];

    if let Some(ns) = namespace {
        args.push("-n");
        args.push(ns);
    }

    command_line(args)
}

/// Apply or delete a manifest file
pub fn run_manifest(
    runner: &dyn CommandRunner,
    action: Action,
    path: &Path,
    namespace: Option<&str>,
) -> Result<CommandOutput, CommandError> {
    runner.run(&manifest_command(action, path, namespace))
}

/// Switch the current kubectl context
pub fn use_context(runner: &dyn CommandRunner, context: &str) -> Result<CommandOutput, CommandError> {
    runner.run(&command_line(["kubectl", "config", "use-context", context]))
}

/// Check that the current context answers
pub fn cluster_info(runner: &dyn CommandRunner) -> Result<CommandOutput, CommandError> {
    runner.run("kubectl cluster-info")
}

/// `kubectl get <resource> -o json`, returning raw stdout
pub fn get_json(runner: &dyn CommandRunner, resource: &str) -> Result<String, CommandError> {
    runner
        .run(&command_line(["kubectl", "get", resource, "-o", "json"]))
        .map(|out| out.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::shell::testing::RecordingRunner;

    #[test]
    fn test_manifest_command() {
        let path = Path::new("deploy/seed/seed-node-service.yaml");
        assert_eq!(
            manifest_command(Action::Create, path, None),
            "kubectl apply -f deploy/seed/seed-node-service.yaml"
        );
        assert_eq!(
            manifest_command(Action::Remove, path, Some("chain")),
            "kubectl delete -f deploy/seed/seed-node-service.yaml -n chain"
        );
    }

    #[test]
    fn test_use_context() {
        let runner = RecordingRunner::new();
        use_context(&runner, "seed-cluster").unwrap();
        assert_eq!(runner.calls(), vec!["kubectl config use-context seed-cluster"]);
    }

    #[test]
    fn test_get_json_returns_stdout() {
        let runner = RecordingRunner::new().responding("get nodes", r#"{"items":[]}"#);
        assert_eq!(get_json(&runner, "nodes").unwrap(), r#"{"items":[]}"#);
    }
}
