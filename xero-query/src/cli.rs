///
/// This module implements the CLI for xero-query: argument parsing, mapping
/// flags onto the core [`Query`] builder, and printing results as JSON.
///
/// All query semantics (clause rendering, parameter assembly, paging rules)
/// live in `xero-query-core`; this module is glue only.
///
/// ## Clause order
/// [`Cli::parse_ordered`] keeps the filters in the order they were typed,
/// across all four `--where*` flags. A `Cli` built by plain `Cli::parse`
/// falls back to grouping by flag: every `--where`, then `--where-int`,
/// then `--where-bool`, then `--where-raw`.
use crate::load_config::{build_registry, load_config};
use crate::transport::{Credentials, HttpTransport};
use anyhow::Result;
use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::path::PathBuf;
use xero_query_core::config::Config;
use xero_query_core::query::{DEFAULT_OFFSET, DEFAULT_PAGE, DEFAULT_STANDARD_LAYOUT};
use xero_query_core::{
    Application, Collection, Direction, Query, Record, Transport, WhereValue,
};

/// CLI for xero-query: build and run filtered accounting API queries.
#[derive(Parser)]
#[clap(
    name = "xero-query",
    version,
    about = "Build, inspect and run filtered queries against the Xero accounting API"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Parse the process arguments, exiting on error like `Cli::parse`.
    pub fn parse_ordered() -> Self {
        Self::from_matches(&Self::command().get_matches()).unwrap_or_else(|e| e.exit())
    }

    pub fn try_parse_ordered_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::from_matches(&Self::command().try_get_matches_from(args)?)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let mut cli = Self::from_arg_matches(matches)?;
        match &mut cli.command {
            Commands::Query(args) => {
                if let Some(sub) = matches.subcommand_matches("query") {
                    args.filters = Some(args.filters_in_command_line_order(sub));
                }
            }
        }
        Ok(cli)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Query one model and print the matching records as JSON
    Query(QueryArgs),
}

/// One `--where*` flag, ready to apply to a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Equals(String, WhereValue),
    Raw(String),
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Path to the YAML config file (built-in defaults when omitted)
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Model to query, e.g. Contact or Accounting\Invoice
    #[clap(long)]
    pub model: String,

    /// String filter FIELD=VALUE
    #[clap(long = "where", value_parser = parse_assignment)]
    pub wheres: Vec<(String, String)>,

    /// Integer filter FIELD=N
    #[clap(long = "where-int", value_parser = parse_int_assignment)]
    pub where_ints: Vec<(String, i64)>,

    /// Boolean filter FIELD=true|false
    #[clap(long = "where-bool", value_parser = parse_bool_assignment)]
    pub where_bools: Vec<(String, bool)>,

    /// Raw filter expression, appended verbatim
    #[clap(long = "where-raw")]
    pub where_raws: Vec<String>,

    /// Field to order by
    #[clap(long)]
    pub order: Option<String>,

    /// Order descending instead of ascending
    #[clap(long, requires = "order")]
    pub desc: bool,

    /// Only records modified after this RFC 3339 timestamp (epoch when no value)
    #[clap(long)]
    pub modified_after: Option<Option<DateTime<FixedOffset>>>,

    #[clap(long)]
    pub from_date: Option<NaiveDate>,

    #[clap(long)]
    pub to_date: Option<NaiveDate>,

    #[clap(long)]
    pub date: Option<NaiveDate>,

    /// Page number (1 when no value); the model must be pageable
    #[clap(long)]
    pub page: Option<Option<u32>>,

    /// Record offset (0 when no value)
    #[clap(long)]
    pub offset: Option<Option<u32>>,

    /// Standard layout flag passed through to the API ("true" when no value)
    #[clap(long)]
    pub standard_layout: Option<Option<String>>,

    /// Print the rendered request instead of sending it
    #[clap(long)]
    pub dry_run: bool,

    /// Filters in command-line order, filled by [`Cli::parse_ordered`].
    #[clap(skip)]
    pub filters: Option<Vec<Filter>>,
}

impl QueryArgs {
    /// Filters to apply, in command-line order when known.
    pub fn filters(&self) -> Vec<Filter> {
        match &self.filters {
            Some(filters) => filters.clone(),
            None => self.grouped_filters().into_iter().map(|(_, f)| f).collect(),
        }
    }

    /// Every filter tagged with its flag group and position inside that group.
    fn grouped_filters(&self) -> Vec<(&'static str, Filter)> {
        let equals = self
            .wheres
            .iter()
            .map(|(field, value)| ("wheres", Filter::Equals(field.clone(), value.into())));
        let ints = self
            .where_ints
            .iter()
            .map(|(field, value)| ("where_ints", Filter::Equals(field.clone(), (*value).into())));
        let bools = self
            .where_bools
            .iter()
            .map(|(field, value)| ("where_bools", Filter::Equals(field.clone(), (*value).into())));
        let raws = self
            .where_raws
            .iter()
            .map(|expression| ("where_raws", Filter::Raw(expression.clone())));
        equals.chain(ints).chain(bools).chain(raws).collect()
    }

    fn filters_in_command_line_order(&self, matches: &ArgMatches) -> Vec<Filter> {
        let mut positions: Vec<(usize, Filter)> = Vec::new();
        for id in ["wheres", "where_ints", "where_bools", "where_raws"] {
            let indices = matches.indices_of(id).into_iter().flatten();
            let filters = self
                .grouped_filters()
                .into_iter()
                .filter(|(group, _)| *group == id)
                .map(|(_, filter)| filter);
            positions.extend(indices.zip(filters));
        }
        positions.sort_by_key(|(index, _)| *index);
        positions.into_iter().map(|(_, filter)| filter).collect()
    }
}

fn split_assignment(raw: &str) -> Result<(&str, &str), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field, value)),
        _ => Err(format!("expected FIELD=VALUE, got `{raw}`")),
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (field, value) = split_assignment(raw)?;
    Ok((field.to_string(), value.to_string()))
}

fn parse_int_assignment(raw: &str) -> Result<(String, i64), String> {
    let (field, value) = split_assignment(raw)?;
    let value = value
        .parse::<i64>()
        .map_err(|e| format!("`{value}` is not an integer: {e}"))?;
    Ok((field.to_string(), value))
}

fn parse_bool_assignment(raw: &str) -> Result<(String, bool), String> {
    let (field, value) = split_assignment(raw)?;
    let value = value
        .parse::<bool>()
        .map_err(|_| format!("`{value}` is not true or false"))?;
    Ok((field.to_string(), value))
}

/// Apply every filter and option from the command line to `query`.
pub fn apply_args<A, T>(query: &mut Query<'_, A, T>, args: &QueryArgs) -> Result<()>
where
    A: Application + ?Sized,
    T: Transport + ?Sized,
{
    query.from(&args.model)?;

    for filter in args.filters() {
        match filter {
            Filter::Equals(field, value) => query.where_equals(&field, value),
            Filter::Raw(expression) => query.where_raw(expression),
        };
    }

    if let Some(order) = &args.order {
        let direction = if args.desc {
            Direction::Desc
        } else {
            Direction::Asc
        };
        query.order_by(order, direction);
    }
    if let Some(since) = args.modified_after {
        query.modified_after(since);
    }
    if let Some(date) = args.from_date {
        query.from_date(date);
    }
    if let Some(date) = args.to_date {
        query.to_date(date);
    }
    if let Some(date) = args.date {
        query.date(date);
    }
    if let Some(page) = args.page {
        query.page(page.unwrap_or(DEFAULT_PAGE))?;
    }
    if let Some(offset) = args.offset {
        query.offset(offset.unwrap_or(DEFAULT_OFFSET));
    }
    if let Some(layout) = &args.standard_layout {
        query.standard_layout(layout.as_deref().unwrap_or(DEFAULT_STANDARD_LAYOUT));
    }
    Ok(())
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Query(args) => {
            let config = match &args.config {
                Some(path) => load_config(path)?,
                None => Config::default(),
            };
            let registry = build_registry(&config);
            let mut transport = HttpTransport::new(config.api.base_url.clone());
            if !args.dry_run {
                transport = transport.with_credentials(Credentials::new_from_env()?);
            }

            let mut query = Query::new(&registry, &transport);
            apply_args(&mut query, &args)?;

            if args.dry_run {
                let request = query.request()?;
                tracing::info!(command = "query", model = %args.model, "Dry run, not sending");
                println!("{}", serde_json::to_string_pretty(&request)?);
                return Ok(());
            }

            match query.execute::<Record>().await {
                Ok(records) => {
                    tracing::info!(command = "query", count = records.len(), "Query complete");
                    print_records(&records)
                }
                Err(e) => {
                    tracing::error!(command = "query", error = %e, "Query failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
    }
}

fn print_records(records: &Collection<Record>) -> Result<()> {
    let fields: Vec<_> = records.iter().map(|record| &record.fields).collect();
    println!("{}", serde_json::to_string_pretty(&fields)?);
    Ok(())
}
