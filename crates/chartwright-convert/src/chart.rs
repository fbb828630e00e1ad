//! Chart skeleton
//!
//! `Chart.yaml` metadata and the `_helpers.tpl` named templates every
//! generated template relies on (`<chart>.fullname`, `<chart>.labels`,
//! `<chart>.selectorLabels`).

use serde::Serialize;

/// Version written to new charts
pub const INITIAL_VERSION: &str = "0.1.0";

/// Placeholder for the chart name in [`HELPERS_TEMPLATE`]
const CHART_PLACEHOLDER: &str = "%CHART%";

const HELPERS_TEMPLATE: &str = r#"{{/*
Expand the name of the chart.
*/}}
{{- define "%CHART%.name" -}}
{{- default .Chart.Name .Values.nameOverride | trunc 63 | trimSuffix "-" }}
{{- end }}

{{/*
Create a default fully qualified app name.
Names are truncated at 63 characters, the limit of some Kubernetes name fields.
If the release name contains the chart name it is used as the full name.
*/}}
{{- define "%CHART%.fullname" -}}
{{- if .Values.fullnameOverride }}
{{- .Values.fullnameOverride | trunc 63 | trimSuffix "-" }}
{{- else }}
{{- $name := default .Chart.Name .Values.nameOverride }}
{{- if contains $name .Release.Name }}
{{- .Release.Name | trunc 63 | trimSuffix "-" }}
{{- else }}
{{- printf "%s-%s" .Release.Name $name | trunc 63 | trimSuffix "-" }}
{{- end }}
{{- end }}
{{- end }}

{{/*
Create chart name and version as used by the chart label.
*/}}
{{- define "%CHART%.chart" -}}
{{- printf "%s-%s" .Chart.Name .Chart.Version | replace "+" "_" | trunc 63 | trimSuffix "-" }}
{{- end }}

{{/*
Common labels
*/}}
{{- define "%CHART%.labels" -}}
helm.sh/chart: {{ include "%CHART%.chart" . }}
{{ include "%CHART%.selectorLabels" . }}
{{- if .Chart.AppVersion }}
app.kubernetes.io/version: {{ .Chart.AppVersion | quote }}
{{- end }}
app.kubernetes.io/managed-by: {{ .Release.Service }}
{{- end }}

{{/*
Selector labels
*/}}
{{- define "%CHART%.selectorLabels" -}}
app.kubernetes.io/name: {{ include "%CHART%.name" . }}
app.kubernetes.io/instance: {{ .Release.Name }}
{{- end }}
"#;

/// Helm `Chart.yaml`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    /// Chart API version (always v2)
    pub api_version: String,

    /// Chart name
    pub name: String,

    /// Chart description
    pub description: String,

    /// Chart type
    #[serde(rename = "type")]
    pub chart_type: String,

    /// Chart version (SemVer)
    pub version: String,

    /// Version of the packaged application
    pub app_version: String,
}

impl ChartMeta {
    /// Metadata for a freshly generated application chart
    pub fn new(chart_name: &str, app_name: &str) -> Self {
        Self {
            api_version: "v2".to_string(),
            name: chart_name.to_string(),
            description: format!("A Helm chart for {}", app_name),
            chart_type: "application".to_string(),
            version: INITIAL_VERSION.to_string(),
            app_version: INITIAL_VERSION.to_string(),
        }
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// `_helpers.tpl` content for a chart
pub fn helpers(chart_name: &str) -> String {
    HELPERS_TEMPLATE.replace(CHART_PLACEHOLDER, chart_name)
}
