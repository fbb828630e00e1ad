//! Convert command - turn Kubernetes manifests into a Helm chart
//!
//! Decoding and conversion run on a blocking thread; Ctrl-C cancels the
//! shared token and the run stops before anything is written.

use chartwright_convert::output::group_templates;
use chartwright_convert::{
    ChartConfig, ChartWriter, Context, Conversion, ConversionWarning, StdoutWriter,
    WarningCategory, WarningSeverity, decode,
};
use console::style;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use crate::error::{CliError, Result};
use crate::{exit_codes, input};

/// Options of a conversion run
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    pub chart_dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub recursive: bool,
    pub name: Option<String>,
    pub app_name: Option<String>,
    pub image_pull_secrets: bool,
    pub stdout: bool,
}

pub async fn run(args: ConvertArgs) -> Result<()> {
    let cancel = CancellationToken::new();

    let interrupt = cancel.clone();
    let signals = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        tracing::warn!("interrupted, stopping before the chart is written");
        interrupt.cancel();

        // a blocked stdin read never reaches the next cancellation check
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(exit_codes::INTERRUPTED);
        }
    });

    let worker = cancel.clone();
    let outcome = tokio::task::spawn_blocking(move || convert(&args, &worker))
        .await
        .map_err(|e| CliError::internal(format!("conversion task failed: {}", e)))?;

    signals.abort();
    outcome
}

fn convert(args: &ConvertArgs, cancel: &CancellationToken) -> Result<()> {
    let mut config = ChartConfig::new(&args.chart_dir, args.name.as_deref())?
        .with_image_pull_secrets(args.image_pull_secrets);
    if let Some(app_name) = &args.app_name {
        config = config.with_app_name(app_name);
    }
    let inputs = input::collect(&args.files, args.recursive)?;

    let mut ctx = Context::new(config);
    for source in &inputs {
        let count = ctx.extend(decode::from_reader(source.name(), source.open()?))?;
        tracing::debug!(source = %source.name(), objects = count, "decoded");
        if cancel.is_cancelled() {
            return Err(CliError::Interrupted);
        }
    }

    if ctx.is_empty() {
        return Err(CliError::input("no Kubernetes objects found in the input"));
    }

    if args.stdout {
        let conversion = ctx
            .run(&mut StdoutWriter::stdout(), cancel)?
            .ok_or(CliError::Interrupted)?;
        // stdout carries the chart, keep the notes on stderr
        for warning in &conversion.warnings {
            eprintln!("{}", warning);
        }
        return Ok(());
    }

    print_header(&inputs, &args.chart_dir, ctx.len());

    let mut writer = ChartWriter::new(&args.chart_dir);
    let conversion = ctx.run(&mut writer, cancel)?.ok_or(CliError::Interrupted)?;

    print_files(&conversion);
    print_warnings(&conversion);
    print_summary(&conversion);
    print_next_steps(&conversion, writer.dir());

    Ok(())
}

fn print_header(inputs: &[input::Input], chart_dir: &Path, objects: usize) {
    println!();
    println!(
        "  {} {} {}",
        style("Chartwright").bold().cyan(),
        style("─").dim(),
        style("manifests → Helm chart").dim()
    );
    println!();
    for source in inputs {
        println!(
            "  {} {}",
            style("Source:").dim(),
            style(source.name()).cyan()
        );
    }
    println!(
        "  {} {} {}",
        style("Target:").dim(),
        style(chart_dir.display()).green(),
        style(format!("({} objects)", objects)).dim()
    );
    println!();
}

fn print_files(conversion: &Conversion) {
    println!("  {}", style("Templates").bold());
    println!("  {}", style("─────────").dim());

    for (filename, templates) in group_templates(&conversion.chart.templates) {
        if templates.len() > 1 {
            println!(
                "  {} templates/{} {}",
                style("✓").green().bold(),
                filename,
                style(format!("({} objects)", templates.len())).dim()
            );
        } else {
            println!("  {} templates/{}", style("✓").green().bold(), filename);
        }
    }
    println!("  {} values.yaml", style("✓").green().bold());

    println!();
}

fn print_warnings(conversion: &Conversion) {
    if conversion.warnings.is_empty() {
        return;
    }

    let mut by_category: HashMap<WarningCategory, Vec<_>> = HashMap::new();
    for warning in &conversion.warnings {
        by_category
            .entry(warning.category)
            .or_default()
            .push(warning);
    }

    println!("  {}", style("Conversion Notes").bold());
    println!("  {}", style("────────────────").dim());
    println!();

    if let Some(unknown) = by_category.get(&WarningCategory::UnknownKind) {
        println!(
            "  {} {}",
            style("Unknown kinds").magenta().bold(),
            style("─ copied without parameters").dim()
        );
        for warning in unknown {
            print_warning(warning);
        }
        println!();
    }

    if let Some(namespaces) = by_category.get(&WarningCategory::Namespace) {
        println!(
            "  {} {}",
            style("Namespaces").yellow().bold(),
            style("─ review for compatibility").dim()
        );
        for warning in namespaces {
            print_warning(warning);
        }
        println!();
    }

    if let Some(absorbed) = by_category.get(&WarningCategory::Absorbed) {
        println!(
            "  {} {}",
            style("Folded").cyan().bold(),
            style("─ no template generated").dim()
        );
        for warning in absorbed {
            print_warning(warning);
        }
        println!();
    }
}

fn print_warning(warning: &ConversionWarning) {
    let icon = match warning.severity {
        WarningSeverity::Info => style(warning.severity.icon()).cyan(),
        WarningSeverity::Warning => style(warning.severity.icon()).yellow(),
    };
    println!("    {} {}", icon, style(&warning.object).bold());
    println!("      {}", style(&warning.message).dim());

    if let Some(ref suggestion) = warning.suggestion {
        println!("      {} {}", style("→").green(), suggestion);
    }
}

fn print_summary(conversion: &Conversion) {
    let chart = &conversion.chart;
    let templates = chart.templates.len();
    let values = chart.values.len();
    let warnings = conversion
        .warnings
        .iter()
        .filter(|w| w.severity == WarningSeverity::Warning)
        .count();

    println!("  {}", style("Summary").bold());
    println!("  {}", style("───────").dim());

    println!(
        "  {} template{} generated",
        style(format!("{:>3}", templates)).green().bold(),
        if templates == 1 { "" } else { "s" }
    );

    println!(
        "  {} top-level values key{}",
        style(format!("{:>3}", values)).blue().bold(),
        if values == 1 { "" } else { "s" }
    );

    if warnings > 0 {
        println!(
            "  {} warning{} {}",
            style(format!("{:>3}", warnings)).yellow().bold(),
            if warnings == 1 { "" } else { "s" },
            style("(review recommended)").dim()
        );
    }

    if !chart.namespace.is_empty() {
        println!(
            "      {} {}",
            style("namespace").dim(),
            style(format!("{} → {{{{ .Release.Namespace }}}}", chart.namespace)).cyan()
        );
    }

    println!();
}

fn print_next_steps(conversion: &Conversion, chart_dir: &Path) {
    println!("  {}", style("Next Steps").bold());
    println!("  {}", style("──────────").dim());

    println!(
        "  {} {}",
        style("1.").dim(),
        style(format!("helm lint {}", chart_dir.display())).cyan()
    );
    println!("     {}", style("Validate the generated chart").dim());

    println!();
    println!(
        "  {} {}",
        style("2.").dim(),
        style(format!(
            "helm template {} {}",
            conversion.chart.chart_name,
            chart_dir.display()
        ))
        .cyan()
    );
    println!(
        "     {}",
        style("Compare the rendered output with the original manifests").dim()
    );

    println!();
}
