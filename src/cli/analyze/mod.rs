// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The analyze subcommand: read a file's tables, infer their structure and
//! report on it.


use std::{
    borrow::Cow,
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, InfoPrinter, Warn, ARG_FILE_HELP};
use crate::{
    constants::{DEFAULT_MAX_MISSING_PRINTED, UNDEFINED_TARGET_NAME},
    context::{AnalysisParams, FileContext},
    granule::NightId,
    table::{OiFileData, OiTable, Table},
    OiStructureError,
};

lazy_static::lazy_static! {
    static ref UNDEFINED_TARGET_HELP: String =
        format!("The name of the target given to rows whose target identifier isn't described. Default: {UNDEFINED_TARGET_NAME}");

    static ref MAX_MISSING_HELP: String =
        format!("The maximum number of unobserved station tuples to print per table. Default: {DEFAULT_MAX_MISSING_PRINTED}");
}

#[derive(Parser, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct AnalyzeArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    /// The file describing the tables to analyse (toml or json).
    #[clap(short, long, parse(from_os_str), help_heading = "INPUT FILES")]
    pub(super) tables: Option<PathBuf>,

    #[clap(long, help = UNDEFINED_TARGET_HELP.as_str(), help_heading = "ANALYSIS")]
    pub(super) undefined_target: Option<String>,

    /// Don't print the station tuples that are implied by the inferred
    /// configurations but weren't observed.
    #[clap(long, help_heading = "ANALYSIS")]
    #[serde(default)]
    pub(super) no_missing: bool,

    #[clap(long, help = MAX_MISSING_HELP.as_str(), help_heading = "ANALYSIS")]
    pub(super) max_missing: Option<usize>,

    /// Write a json report of the analysis to this file.
    #[clap(short, long, parse(from_os_str), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,
}

/// Parameters derived from [`AnalyzeArgs`].
#[derive(Debug)]
struct AnalyzeParams {
    table_file: PathBuf,
    analysis: AnalysisParams,
    output: Option<PathBuf>,
}

impl AnalyzeArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<AnalyzeArgs, OiStructureError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let AnalyzeArgs {
                args_file: _,
                tables,
                undefined_target,
                no_missing,
                max_missing,
                output,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(AnalyzeArgs {
                args_file: None,
                tables: cli_args.tables.or(tables),
                undefined_target: cli_args.undefined_target.or(undefined_target),
                no_missing: cli_args.no_missing || no_missing,
                max_missing: cli_args.max_missing.or(max_missing),
                output: cli_args.output.or(output),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<AnalyzeParams, AnalyzeArgsError> {
        debug!("{:#?}", self);

        let AnalyzeArgs {
            args_file: _,
            tables,
            undefined_target,
            no_missing,
            max_missing,
            output,
        } = self;

        let table_file = tables.ok_or(AnalyzeArgsError::NoTableFile)?;
        let defaults = AnalysisParams::default();
        let analysis = AnalysisParams {
            undefined_target: undefined_target.unwrap_or(defaults.undefined_target),
            log_missing: !no_missing,
            max_missing_printed: max_missing.unwrap_or(defaults.max_missing_printed),
        };

        let mut printer = InfoPrinter::new("Analysis set up".into());
        printer.push_line(format!("Tables: {}", table_file.display()).into());
        printer.push_line(format!("Undefined target: {}", analysis.undefined_target).into());
        if analysis.log_missing {
            printer.push_line(
                format!(
                    "Printing up to {} unobserved tuples per table",
                    analysis.max_missing_printed
                )
                .into(),
            );
        }
        if let Some(output) = &output {
            printer.push_line(format!("Report: {}", output.display()).into());
        }
        printer.display();

        Ok(AnalyzeParams {
            table_file,
            analysis,
            output,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), OiStructureError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()
    }
}

impl AnalyzeParams {
    fn run(self) -> Result<(), OiStructureError> {
        let AnalyzeParams {
            table_file,
            analysis,
            output,
        } = self;

        let file = OiFileData::read(&table_file)?.into_file()?;
        info!(
            "Read {} tables from {}",
            file.tables().len(),
            table_file.display()
        );

        let mut context = FileContext::new(analysis);
        context.analyze(file.tables(), file.targets());

        let report = AnalysisReport::new(&context, file.tables());
        report.display(context.params());

        if let Some(output) = output {
            let mut f = BufWriter::new(File::create(&output).map_err(AnalyzeArgsError::from)?);
            serde_json::to_writer_pretty(&mut f, &report).map_err(AnalyzeArgsError::from)?;
            f.flush().map_err(AnalyzeArgsError::from)?;
            info!("Wrote report to {}", output.display());
        }

        let failed = report
            .tables
            .iter()
            .filter(|t| t.error.is_some())
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>();
        for table in &report.tables {
            if let Some(error) = &table.error {
                error.clone().warn();
            }
        }
        display_warnings();
        if !failed.is_empty() {
            return Err(AnalyzeArgsError::FailedTables {
                num: failed.len(),
                tables: failed.join(", "),
            }
            .into());
        }

        Ok(())
    }
}

/// A summary of the structure of a file, suitable for serialisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct AnalysisReport {
    pub(super) tables: Vec<TableReport>,
    pub(super) baselines: Vec<BaselineReport>,
    pub(super) granules: Vec<GranuleReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct TableReport {
    pub(super) name: String,
    pub(super) num_rows: usize,
    pub(super) configurations: Vec<String>,
    pub(super) missing: Vec<String>,
    pub(super) mjd_range: Option<(f64, f64)>,
    pub(super) error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct BaselineReport {
    pub(super) sorted_name: String,
    pub(super) name: String,
    pub(super) orientation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct GranuleReport {
    pub(super) target: String,
    pub(super) ins_mode: String,
    pub(super) night: NightId,
    pub(super) mjd_range: Option<(f64, f64)>,
    pub(super) num_rows: usize,
    pub(super) baselines: Vec<String>,
    pub(super) configurations: Vec<String>,
    pub(super) tables: Vec<String>,
}

impl AnalysisReport {
    fn new(context: &FileContext, tables: &[Table]) -> AnalysisReport {
        let table_reports = context
            .tables()
            .iter()
            .zip(tables)
            .map(|(structure, table)| TableReport {
                name: structure.name().to_string(),
                num_rows: table.num_rows(),
                configurations: structure.configuration_labels().to_vec(),
                missing: structure
                    .missing()
                    .iter()
                    .map(|t| table.station_names().label(t))
                    .collect(),
                mjd_range: structure.mjd_range(),
                error: structure.error().map(|e| e.to_string()),
            })
            .collect();

        let baselines = context
            .baseline_registry()
            .iter()
            .map(|(sorted_name, names_dir)| BaselineReport {
                sorted_name: sorted_name.clone(),
                name: names_dir.name.clone(),
                orientation: names_dir.orientation,
            })
            .collect();

        let granules = context
            .granules()
            .iter()
            .map(|(id, granule)| GranuleReport {
                target: granule.target().name().to_string(),
                ins_mode: granule.ins_mode().name().to_string(),
                night: granule.night(),
                mjd_range: granule.mjd_range(),
                num_rows: granule.num_rows(),
                baselines: granule.baselines().iter().cloned().collect(),
                configurations: granule.configurations().iter().cloned().collect(),
                tables: context
                    .tables_for_granule(id)
                    .into_iter()
                    .flatten()
                    .filter_map(|&i_table| context.table(i_table))
                    .map(|t| t.name().to_string())
                    .collect(),
            })
            .collect();

        AnalysisReport {
            tables: table_reports,
            baselines,
            granules,
        }
    }

    fn display(&self, params: &AnalysisParams) {
        for table in &self.tables {
            let mut printer =
                InfoPrinter::new(format!("Table '{}' ({} rows)", table.name, table.num_rows).into());
            if let Some((min, max)) = table.mjd_range {
                printer.push_line(format!("MJD {min:.5} to {max:.5}").into());
            }
            if table.error.is_some() {
                printer.push_line("Station configurations couldn't be determined".into());
            } else if table.configurations.is_empty() {
                printer.push_line("No stations".into());
            } else {
                let mut block: Vec<Cow<'static, str>> = vec![format!(
                    "{} station configuration(s):",
                    table.configurations.len()
                )
                .into()];
                block.extend(table.configurations.iter().map(|c| c.clone().into()));
                printer.push_block(block);
            }
            if params.log_missing && !table.missing.is_empty() {
                let max = params.max_missing_printed;
                let mut block: Vec<Cow<'static, str>> = vec![format!(
                    "{} unobserved station tuple(s):",
                    table.missing.len()
                )
                .into()];
                block.extend(table.missing.iter().take(max).map(|m| m.clone().into()));
                if table.missing.len() > max {
                    block.push(format!("... and {} more", table.missing.len() - max).into());
                }
                printer.push_block(block);
            }
            printer.display();
        }

        let mut printer =
            InfoPrinter::new(format!("{} baseline name(s)", self.baselines.len()).into());
        printer.push_block(
            self.baselines
                .iter()
                .map(|b| {
                    format!(
                        "{} as {}{}",
                        b.sorted_name,
                        b.name,
                        if b.orientation { "" } else { " (reversed)" }
                    )
                    .into()
                })
                .collect(),
        );
        printer.display();

        let mut printer = InfoPrinter::new(format!("{} granule(s)", self.granules.len()).into());
        for granule in &self.granules {
            let mut block: Vec<Cow<'static, str>> = vec![format!(
                "{} / {} / {}",
                granule.target, granule.ins_mode, granule.night
            )
            .into()];
            block.push(
                format!(
                    "{} rows from {}",
                    granule.num_rows,
                    granule.tables.iter().join(", ")
                )
                .into(),
            );
            if !granule.configurations.is_empty() {
                block.push(
                    format!("Configurations: {}", granule.configurations.iter().join(", ")).into(),
                );
            }
            printer.push_block(block);
        }
        printer.display();
    }
}

#[derive(thiserror::Error, Debug)]
pub(super) enum AnalyzeArgsError {
    #[error("No table file was specified")]
    NoTableFile,

    #[error("The structure of {num} table(s) couldn't be determined: {tables}")]
    FailedTables { num: usize, tables: String },

    #[error("Couldn't write the report: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
