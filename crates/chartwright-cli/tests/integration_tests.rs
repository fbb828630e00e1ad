//! Integration tests for the chartwright binary

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const MANIFESTS: &str = r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: shop-config
  namespace: prod
data:
  logLevel: debug
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: shop-web
  namespace: prod
  labels:
    app: web
spec:
  replicas: 3
  selector:
    matchLabels:
      app: web
  template:
    metadata:
      labels:
        app: web
    spec:
      containers:
      - name: app
        image: registry.example.com/shop/web:1.4.2
        envFrom:
        - configMapRef:
            name: shop-config
---
apiVersion: v1
kind: Service
metadata:
  name: shop-web
  namespace: prod
spec:
  type: ClusterIP
  selector:
    app: web
  ports:
  - port: 80
    targetPort: 8080
"#;

/// Helper to run chartwright command
fn chartwright(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chartwright"))
        .args(args)
        .output()
        .expect("Failed to execute chartwright")
}

fn chartwright_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_chartwright"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute chartwright");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for chartwright")
}

fn manifests_in(dir: &Path) -> String {
    let path = dir.join("manifests.yaml");
    fs::write(&path, MANIFESTS).unwrap();
    path.display().to_string()
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

mod write_chart {
    use super::*;

    #[test]
    fn test_writes_chart_layout() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = manifests_in(dir.path());
        let chart_dir = dir.path().join("shop");

        let output = chartwright(&[&path_arg(&chart_dir), "-f", &manifests]);

        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        for file in [
            "Chart.yaml",
            "values.yaml",
            "templates/_helpers.tpl",
            "templates/configmap.yaml",
            "templates/web-deployment.yaml",
            "templates/web-service.yaml",
        ] {
            assert!(chart_dir.join(file).exists(), "missing {}", file);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("templates/web-deployment.yaml"));
    }

    #[test]
    fn test_values_are_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = manifests_in(dir.path());
        let chart_dir = dir.path().join("shop");

        let output = chartwright(&[&path_arg(&chart_dir), "-f", &manifests]);
        assert!(output.status.success());

        let values: serde_yaml::Value =
            serde_yaml::from_str(&fs::read_to_string(chart_dir.join("values.yaml")).unwrap())
                .unwrap();
        assert_eq!(values["web"]["replicas"].as_u64(), Some(3));
        assert_eq!(values["web"]["type"].as_str(), Some("ClusterIP"));
        assert_eq!(
            values["web"]["app"]["image"]["repository"].as_str(),
            Some("registry.example.com/shop/web")
        );
        assert_eq!(values["web"]["app"]["image"]["tag"].as_str(), Some("1.4.2"));
        assert_eq!(values["config"]["logLevel"].as_str(), Some("debug"));
    }

    #[test]
    fn test_templates_use_chart_naming() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = manifests_in(dir.path());
        let chart_dir = dir.path().join("shop");

        chartwright(&[&path_arg(&chart_dir), "-f", &manifests]);

        let deployment =
            fs::read_to_string(chart_dir.join("templates/web-deployment.yaml")).unwrap();
        assert!(deployment.contains(r#"name: {{ include "shop.fullname" . }}-web"#));
        assert!(deployment.contains("namespace: {{ .Release.Namespace | quote }}"));
        assert!(deployment.contains("replicas: {{ .Values.web.replicas }}"));
        assert!(deployment.contains(r#"name: {{ include "shop.fullname" . }}-config"#));
        assert!(!deployment.contains("prod"));
    }

    #[test]
    fn test_rerun_keeps_chart_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = manifests_in(dir.path());
        let chart_dir = dir.path().join("shop");
        fs::create_dir_all(&chart_dir).unwrap();
        fs::write(chart_dir.join("Chart.yaml"), "apiVersion: v2\nname: shop\nversion: 2.0.0\n").unwrap();

        let output = chartwright(&[&path_arg(&chart_dir), "-f", &manifests]);
        assert!(output.status.success());

        assert!(
            fs::read_to_string(chart_dir.join("Chart.yaml"))
                .unwrap()
                .contains("version: 2.0.0")
        );
    }

    #[test]
    fn test_name_flag_overrides_directory() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = manifests_in(dir.path());
        let chart_dir = dir.path().join("Out_Dir");

        let output = chartwright(&[&path_arg(&chart_dir), "--name", "shop", "-f", &manifests]);
        assert!(output.status.success());

        let chart_yaml = fs::read_to_string(chart_dir.join("Chart.yaml")).unwrap();
        assert!(chart_yaml.contains("name: shop"));
    }

    #[test]
    fn test_app_name_flag_sets_description() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = manifests_in(dir.path());
        let chart_dir = dir.path().join("shop");

        let output = chartwright(&[&path_arg(&chart_dir), "--app-name", "Storefront", "-f", &manifests]);
        assert!(output.status.success());

        let chart_yaml = fs::read_to_string(chart_dir.join("Chart.yaml")).unwrap();
        assert!(chart_yaml.contains("description: A Helm chart for Storefront"));
        assert!(chart_yaml.contains("name: shop"));
    }
}

mod inputs {
    use super::*;

    #[test]
    fn test_directory_input() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_dir = dir.path().join("manifests");
        fs::create_dir(&manifest_dir).unwrap();
        manifests_in(&manifest_dir);
        let chart_dir = dir.path().join("shop");

        let output = chartwright(&[&path_arg(&chart_dir), "-f", &path_arg(&manifest_dir)]);

        assert!(output.status.success());
        assert!(chart_dir.join("templates/web-service.yaml").exists());
    }

    #[test]
    fn test_stdin_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let chart_dir = dir.path().join("shop");

        let output = chartwright_stdin(&[&path_arg(&chart_dir), "--stdout"], MANIFESTS);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.starts_with("---\n# Source: shop/values.yaml\n"));
        assert!(stdout.contains("# Source: shop/templates/web-service.yaml"));
        assert!(!chart_dir.exists(), "--stdout must not write files");
    }
}

mod failures {
    use super::*;

    #[test]
    fn test_invalid_chart_name() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = manifests_in(dir.path());

        let output = chartwright(&[&path_arg(&dir.path().join("My_Chart")), "-f", &manifests]);

        assert_eq!(output.status.code(), Some(64));
    }

    #[test]
    fn test_invalid_document() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = dir.path().join("broken.yaml");
        fs::write(&manifests, "apiVersion: v1\nkind: ConfigMap\n").unwrap();
        let chart_dir = dir.path().join("shop");

        let output = chartwright(&[&path_arg(&chart_dir), "-f", &path_arg(&manifests)]);

        assert_eq!(output.status.code(), Some(2));
        assert!(!chart_dir.exists());
    }

    #[test]
    fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();

        let output = chartwright(&[
            &path_arg(&dir.path().join("shop")),
            "-f",
            &path_arg(&dir.path().join("missing.yaml")),
        ]);

        assert_eq!(output.status.code(), Some(5));
    }

    #[test]
    fn test_empty_input() {
        let dir = tempfile::tempdir().unwrap();

        let output = chartwright_stdin(&[&path_arg(&dir.path().join("shop"))], "");

        assert_eq!(output.status.code(), Some(2));
    }
}

mod warnings {
    use super::*;

    #[test]
    fn test_unknown_kind_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = dir.path().join("widget.yaml");
        fs::write(
            &manifests,
            "apiVersion: example.com/v1\nkind: Widget\nmetadata:\n  name: gizmo\nspec:\n  size: 1\n",
        )
        .unwrap();
        let chart_dir = dir.path().join("shop");

        let output = chartwright(&[&path_arg(&chart_dir), "-f", &path_arg(&manifests)]);

        assert!(output.status.success());
        assert!(chart_dir.join("templates/gizmo-widget.yaml").exists());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Unknown kinds"));
    }

    #[test]
    fn test_namespace_is_folded() {
        let dir = tempfile::tempdir().unwrap();
        let manifests = dir.path().join("all.yaml");
        fs::write(
            &manifests,
            format!("apiVersion: v1\nkind: Namespace\nmetadata:\n  name: prod\n---\n{}", MANIFESTS),
        )
        .unwrap();
        let chart_dir = dir.path().join("shop");

        let output = chartwright(&[&path_arg(&chart_dir), "-f", &path_arg(&manifests)]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Folded"));
        assert!(stdout.contains("--create-namespace"));
        assert!(!stdout.contains("review recommended"));
        assert!(!chart_dir.join("templates/namespace.yaml").exists());
    }
}
