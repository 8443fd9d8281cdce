use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use popdash::countries::{aggregate_ids, only_countries};
use popdash::format::{fmt_growth, fmt_num, fmt_year};
use popdash::prefs::{Prefs, Theme};
use popdash::stats::{KpiSnapshot, top_countries};
use popdash::table::{SortColumn, SortOrder, paginate, sort_rows};
use popdash::{
    CancelToken, Client, ClientConfig, Dashboard, DashboardConfig, FilterCriteria, LoadEvent,
    YearRange, storage,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "popdash",
    version,
    about = "World Bank population dashboard: KPIs, series, rankings and tables"
)]
struct Cli {
    /// API base URL.
    #[arg(long, global = true, default_value = "https://api.worldbank.org/v2")]
    base_url: String,
    /// Total request timeout in seconds.
    #[arg(long, global = true, default_value_t = 30)]
    timeout_secs: u64,
    /// Locale for number formatting (en, de, es, fr, it, pt, nl).
    #[arg(long, global = true, default_value = "en")]
    locale: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print KPIs, the annual series and the latest-year ranking.
    Summary(SummaryArgs),
    /// Print a sorted page of the filtered rows.
    Table(TableArgs),
    /// Print the top countries for the most recent year with data.
    Top(TopArgs),
    /// List countries and aggregates from the metadata endpoint.
    Countries(CountriesArgs),
    /// Show or change the saved theme preference.
    Theme(ThemeArgs),
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Country id (ISO3 like DEU, ISO2 like DE, or an aggregate code like WLD).
    #[arg(long)]
    country: Option<String>,
    /// Exact country name as reported by the API (e.g. "Congo, Dem. Rep.").
    #[arg(long)]
    country_name: Option<String>,
    /// First year (inclusive). Alone it selects a single year.
    #[arg(long)]
    from: Option<String>,
    /// Last year (inclusive). Order relative to --from does not matter.
    #[arg(long)]
    to: Option<String>,
    /// Start of the range fetched from the API.
    #[arg(long, default_value_t = 1960)]
    fetch_start: i32,
    /// End of the range fetched from the API.
    #[arg(long, default_value_t = 2024)]
    fetch_end: i32,
}

impl FilterArgs {
    fn criteria(&self) -> Result<FilterCriteria> {
        let c = FilterCriteria::from_inputs(
            self.country.as_deref().unwrap_or(""),
            self.country_name.as_deref().unwrap_or(""),
            self.from.as_deref().unwrap_or(""),
            self.to.as_deref().unwrap_or(""),
        )?;
        Ok(c)
    }
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[command(flatten)]
    filter: FilterArgs,
    /// Number of ranking entries to print.
    #[arg(long, default_value_t = 10)]
    top: usize,
    /// Print the snapshot as JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Save the filtered rows (.csv or .json).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Save the snapshot as JSON.
    #[arg(long)]
    snapshot_out: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Code,
    Name,
    Population,
    Year,
}

impl From<SortArg> for SortColumn {
    fn from(s: SortArg) -> Self {
        match s {
            SortArg::Code => SortColumn::Code,
            SortArg::Name => SortColumn::Name,
            SortArg::Population => SortColumn::Population,
            SortArg::Year => SortColumn::Year,
        }
    }
}

#[derive(Args, Debug)]
struct TableArgs {
    #[command(flatten)]
    filter: FilterArgs,
    /// Column to sort by; rows keep API order when omitted.
    #[arg(long, value_enum)]
    sort: Option<SortArg>,
    /// Sort descending.
    #[arg(long, default_value_t = false)]
    desc: bool,
    /// Page number (1-based).
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Rows per page.
    #[arg(long, default_value_t = 25)]
    page_size: usize,
}

#[derive(Args, Debug)]
struct TopArgs {
    /// Upper bound of the search window (default: current year).
    #[arg(long)]
    year: Option<i32>,
    /// Number of countries to show.
    #[arg(long, default_value_t = 10)]
    top: usize,
    /// How many years back to look for data.
    #[arg(long, default_value_t = 5)]
    lookback: u32,
}

#[derive(Args, Debug)]
struct CountriesArgs {
    /// Hide regions and income groups.
    #[arg(long, default_value_t = false)]
    only_countries: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThemeAction {
    Show,
    Toggle,
    Light,
    Dark,
}

#[derive(Args, Debug)]
struct ThemeArgs {
    #[arg(value_enum, default_value_t = ThemeAction::Show)]
    action: ThemeAction,
    /// Preference file (default: <config dir>/popdash/prefs.json).
    #[arg(long)]
    prefs: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = ClientConfig {
        base_url: cli.base_url.trim_end_matches('/').to_string(),
        timeout: Duration::from_secs(cli.timeout_secs),
        ..ClientConfig::default()
    };
    match cli.cmd {
        Command::Summary(args) => cmd_summary(config, &cli.locale, args),
        Command::Table(args) => cmd_table(config, &cli.locale, args),
        Command::Top(args) => cmd_top(config, &cli.locale, args),
        Command::Countries(args) => cmd_countries(config, args),
        Command::Theme(args) => cmd_theme(args),
    }
}

/// Fetch the full range once and apply the filter client-side.
fn load_dashboard(config: ClientConfig, filter: &FilterArgs) -> Result<Dashboard<Client>> {
    let criteria = filter.criteria()?;
    let client = Client::new(config).context("build http client")?;
    let mut dash = Dashboard::new(
        client,
        DashboardConfig {
            full_range: YearRange::new(filter.fetch_start, filter.fetch_end),
            ..DashboardConfig::default()
        },
    );
    dash.reload();
    match dash.wait() {
        LoadEvent::Applied { rows } => eprintln!("Loaded {} rows", rows),
        LoadEvent::Failed(msg) => bail!("failed to load population data: {}", msg),
        other => bail!("load did not complete: {:?}", other),
    }
    dash.set_criteria(criteria);
    Ok(dash)
}

fn print_snapshot(s: &KpiSnapshot, locale: &str, top: usize) {
    let year_hint = s
        .latest_year
        .map(|y| format!(" (year {})", y))
        .unwrap_or_default();
    println!("Total population{}: {}", year_hint, fmt_num(s.total_pop_latest, locale));
    println!("Latest year: {}", fmt_year(s.latest_year));
    println!("Countries: {}", fmt_num(Some(s.countries_count as f64), locale));
    println!(
        "Growth vs. previous year: {}",
        fmt_growth(s.growth_abs, s.growth_pct, locale)
    );

    if !s.series.is_empty() {
        println!();
        println!("Year  Total");
        for p in &s.series {
            println!("{}  {}", p.year, fmt_num(Some(p.total), locale));
        }
    }

    if !s.country_totals_latest.is_empty() {
        println!();
        println!("Top {} in {}", top, fmt_year(s.latest_year));
        for (i, c) in s.country_totals_latest.iter().take(top).enumerate() {
            println!("{:>3}. {}  {}", i + 1, c.name, fmt_num(Some(c.total), locale));
        }
    }
}

fn cmd_summary(config: ClientConfig, locale: &str, args: SummaryArgs) -> Result<()> {
    let mut dash = load_dashboard(config, &args.filter)?;

    if let Some(path) = args.out.as_ref() {
        let rows = dash.filtered();
        storage::save_rows(rows, path)?;
        eprintln!("Saved {} rows to {}", rows.len(), path.display());
    }

    let snapshot = dash.snapshot();
    if let Some(path) = args.snapshot_out.as_ref() {
        storage::save_snapshot(snapshot, path)?;
        eprintln!("Saved snapshot to {}", path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    } else {
        print_snapshot(snapshot, locale, args.top);
    }
    Ok(())
}

fn cmd_table(config: ClientConfig, locale: &str, args: TableArgs) -> Result<()> {
    let mut dash = load_dashboard(config, &args.filter)?;
    let mut rows = dash.filtered().to_vec();
    if let Some(col) = args.sort {
        let order = if args.desc { SortOrder::Desc } else { SortOrder::Asc };
        sort_rows(&mut rows, col.into(), order);
    }
    let page = paginate(&rows, args.page, args.page_size);
    println!("ISO\tCountry\tPopulation\tYear");
    for r in page.rows {
        println!("{}\t{}\t{}\t{}", r.code, r.name, fmt_num(r.population, locale), r.year);
    }
    println!(
        "Page {} of {} ({} rows)",
        page.page, page.total_pages, page.total_rows
    );
    Ok(())
}

fn cmd_top(config: ClientConfig, locale: &str, args: TopArgs) -> Result<()> {
    let client = Client::new(config).context("build http client")?;
    let token = CancelToken::new();
    let aggregates = match client.fetch_countries(&token) {
        Ok(list) => aggregate_ids(&list),
        Err(e) => {
            log::warn!("country metadata unavailable, aggregates not excluded: {}", e);
            Default::default()
        }
    };
    let (window, rows) = client
        .fetch_top_window(args.year, args.lookback, &token)
        .context("fetch top-countries window")?;
    let top = top_countries(&rows, &aggregates, args.top);

    let shown_year = top.year.unwrap_or(window.end);
    println!("Top {} countries by population - year {}", args.top, shown_year);
    if top.entries.is_empty() {
        println!("No data available for {}", window.to_query_param());
        return Ok(());
    }
    for (i, c) in top.entries.iter().enumerate() {
        println!("{:>3}. {}  {}", i + 1, c.name, fmt_num(Some(c.total), locale));
    }
    Ok(())
}

fn cmd_countries(config: ClientConfig, args: CountriesArgs) -> Result<()> {
    let client = Client::new(config).context("build http client")?;
    let mut list = client
        .fetch_countries(&CancelToken::new())
        .context("fetch country metadata")?;
    if args.only_countries {
        list = only_countries(&list);
    }
    for c in &list {
        println!("{}\t{}", c.id, c.name);
    }
    eprintln!("{} entries", list.len());
    Ok(())
}

fn cmd_theme(args: ThemeArgs) -> Result<()> {
    let path = match args.prefs {
        Some(p) => p,
        None => Prefs::default_path()?,
    };
    let mut prefs = Prefs::load(&path);
    let next = match args.action {
        ThemeAction::Show => None,
        ThemeAction::Toggle => Some(prefs.theme.toggle()),
        ThemeAction::Light => Some(Theme::Light),
        ThemeAction::Dark => Some(Theme::Dark),
    };
    if let Some(theme) = next {
        prefs.theme = theme;
        prefs.save(&path)?;
    }
    println!("{}", prefs.theme.as_str());
    Ok(())
}
