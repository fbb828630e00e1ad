//! Conversion settings

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};

/// Valid Helm chart name
static CHART_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

/// Settings shared by every converter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartConfig {
    /// Chart name, also the prefix of every helper template
    pub chart_name: String,
    /// Directory the chart is written to
    pub chart_dir: PathBuf,
    /// Application name recorded in `Chart.yaml`
    pub app_name: String,
    /// Wire `imagePullSecrets` of pod templates to values
    pub image_pull_secrets: bool,
}

impl ChartConfig {
    /// Config for a chart written to `chart_dir`
    ///
    /// The chart name defaults to the directory's file name.
    pub fn new(chart_dir: impl AsRef<Path>, name: Option<&str>) -> Result<Self> {
        let chart_dir = chart_dir.as_ref().to_path_buf();
        let chart_name = match name {
            Some(name) => name.to_string(),
            None => chart_dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string(),
        };

        if !CHART_NAME.is_match(&chart_name) {
            return Err(ConvertError::InvalidChartName(chart_name));
        }

        Ok(Self {
            app_name: chart_name.clone(),
            chart_name,
            chart_dir,
            image_pull_secrets: false,
        })
    }

    pub fn with_image_pull_secrets(mut self, enabled: bool) -> Self {
        self.image_pull_secrets = enabled;
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_from_directory() {
        let config = ChartConfig::new("out/my-app", None).unwrap();

        assert_eq!(config.chart_name, "my-app");
        assert_eq!(config.app_name, "my-app");
        assert!(!config.image_pull_secrets);
    }

    #[test]
    fn test_explicit_name_overrides_directory() {
        let config = ChartConfig::new("charts/x", Some("shop")).unwrap();

        assert_eq!(config.chart_name, "shop");
        assert_eq!(config.chart_dir, PathBuf::from("charts/x"));
    }

    #[test]
    fn test_invalid_names() {
        for name in ["My_App", "-app", "app-", ""] {
            assert!(
                matches!(
                    ChartConfig::new("chart", Some(name)),
                    Err(ConvertError::InvalidChartName(_))
                ),
                "{name:?} accepted"
            );
        }
    }
}
