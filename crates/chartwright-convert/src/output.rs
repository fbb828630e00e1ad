//! Chart output
//!
//! Templates sharing a filename are written to the same file, separated by
//! `---`, in the order they were converted.

use indexmap::IndexMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::chart::{ChartMeta, helpers};
use crate::context::Chart;
use crate::error::{ConvertError, Result};
use crate::template::Template;

/// Destination of a converted chart
pub trait Output {
    fn write(&mut self, chart: &Chart) -> Result<()>;
}

/// Group templates by filename, keeping first-seen file order
pub fn group_templates(templates: &[Template]) -> IndexMap<&str, Vec<&Template>> {
    let mut files: IndexMap<&str, Vec<&Template>> = IndexMap::new();
    for template in templates {
        files.entry(template.filename()).or_default().push(template);
    }
    files
}

/// Concatenate templates into one YAML stream
pub fn render_file(templates: &[&Template]) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    for (i, template) in templates.iter().enumerate() {
        if i > 0 {
            out.write_all(b"---\n")?;
        }
        template.write(&mut out)?;
    }
    Ok(out)
}

/// Writes the chart into a directory
///
/// `Chart.yaml` and `templates/_helpers.tpl` are only created when missing so
/// hand edits survive a re-run; `values.yaml` and generated templates are
/// replaced.
#[derive(Debug, Clone)]
pub struct ChartWriter {
    dir: PathBuf,
}

impl ChartWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).map_err(|source| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    })
}

impl Output for ChartWriter {
    fn write(&mut self, chart: &Chart) -> Result<()> {
        let templates_dir = self.dir.join("templates");
        fs::create_dir_all(&templates_dir).map_err(|source| ConvertError::Write {
            path: templates_dir.clone(),
            source,
        })?;

        let chart_yaml = self.dir.join("Chart.yaml");
        if chart_yaml.exists() {
            tracing::debug!(path = %chart_yaml.display(), "keeping existing Chart.yaml");
        } else {
            let meta = ChartMeta::new(&chart.chart_name, &chart.app_name);
            write_file(&chart_yaml, meta.to_yaml()?.as_bytes())?;
        }

        let helpers_tpl = templates_dir.join("_helpers.tpl");
        if !helpers_tpl.exists() {
            write_file(&helpers_tpl, helpers(&chart.chart_name).as_bytes())?;
        }

        write_file(&self.dir.join("values.yaml"), chart.values.to_yaml()?.as_bytes())?;

        for (filename, templates) in group_templates(&chart.templates) {
            let path = templates_dir.join(filename);
            let contents = render_file(&templates).map_err(|source| ConvertError::Write {
                path: path.clone(),
                source,
            })?;
            write_file(&path, &contents)?;
            tracing::info!(path = %path.display(), templates = templates.len(), "wrote template");
        }

        Ok(())
    }
}

/// Prints the chart as a single YAML stream
///
/// Each file is preceded by a `# Source:` comment, like `helm template`.
pub struct StreamWriter<W> {
    sink: W,
}

/// Chart preview on standard output
pub type StdoutWriter = StreamWriter<io::Stdout>;

impl StreamWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StreamWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn emit(&mut self, chart: &Chart) -> io::Result<()> {
        let name = &chart.chart_name;
        let values = chart
            .values
            .to_yaml()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(self.sink, "---\n# Source: {}/values.yaml", name)?;
        self.sink.write_all(values.as_bytes())?;

        for (filename, templates) in group_templates(&chart.templates) {
            writeln!(self.sink, "---\n# Source: {}/templates/{}", name, filename)?;
            self.sink.write_all(&render_file(&templates)?)?;
        }
        self.sink.flush()
    }
}

impl<W: Write> Output for StreamWriter<W> {
    fn write(&mut self, chart: &Chart) -> Result<()> {
        self.emit(chart).map_err(ConvertError::Io)
    }
}
