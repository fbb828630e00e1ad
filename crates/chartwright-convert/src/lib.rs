//! Chartwright Convert - Kubernetes manifests to Helm chart converter
//!
//! This crate turns a stream of plain Kubernetes manifests into a
//! parameterized Helm chart: every object becomes a template whose tunable
//! fields read from `values.yaml`, and object names follow the chart's
//! `<chart>.fullname` helper.
//!
//! | Manifest                         | Chart template                                        |
//! |----------------------------------|-------------------------------------------------------|
//! | `name: shop-web`                 | `name: {{ include "shop.fullname" . }}-web`           |
//! | `namespace: prod`                | `namespace: {{ .Release.Namespace \| quote }}`        |
//! | `replicas: 3`                    | `replicas: {{ .Values.web.replicas }}`                |
//! | `LOG_LEVEL: debug`               | `LOG_LEVEL: {{ .Values.config.logLevel \| quote }}`   |
//!
//! # Example
//!
//! ```no_run
//! use chartwright_convert::{ChartConfig, ChartWriter, Context, decode};
//! use tokio_util::sync::CancellationToken;
//!
//! let manifests = std::fs::File::open("manifests.yaml")?;
//! let config = ChartConfig::new("./charts/shop", None)?;
//! let mut writer = ChartWriter::new(&config.chart_dir);
//!
//! let mut ctx = Context::new(config);
//! ctx.extend(decode::from_reader("manifests.yaml", manifests))?;
//!
//! if let Some(conversion) = ctx.run(&mut writer, &CancellationToken::new())? {
//!     for warning in &conversion.warnings {
//!         println!("{}", warning);
//!     }
//! }
//! # Ok::<(), chartwright_convert::ConvertError>(())
//! ```
//!
//! # Adding a converter
//!
//! A converter implements [`Processor`]: it declines objects it does not
//! handle and otherwise builds a [`Template`] from [`process_obj_meta`], the
//! naming operations of [`AppMeta`](chartwright_core::AppMeta) and the `add*`
//! operations of [`ValuesMap`](chartwright_core::ValuesMap).

pub mod chart;
pub mod config;
pub mod context;
pub mod decode;
pub mod error;
pub mod meta;
pub mod output;
pub mod processor;
pub mod processors;
pub mod template;
pub mod yaml;

// Re-exports
pub use config::ChartConfig;
pub use context::{Chart, Context, Conversion};
pub use error::{ConversionWarning, ConvertError, Result, WarningCategory, WarningSeverity};
pub use meta::process_obj_meta;
pub use output::{ChartWriter, Output, StdoutWriter, StreamWriter};
pub use processor::{Dispatch, Outcome, Processor, ProcessorChain};
pub use processors::standard_chain;
pub use template::Template;
