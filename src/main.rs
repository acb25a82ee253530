//! AidScope CLI - financial-aid context data from public APIs
//!
//! Looks up College Scorecard schools, FRED economic series, and U.S.
//! Treasury rates, printing each result as pretty JSON.

use std::process;

use clap::Parser;
use serde::Serialize;

use aidscope::cli::{self, Cli, Command, SchoolFilterArgs};
use aidscope::config::Config;
use aidscope::data::{FredClient, ScorecardClient, SearchParams, TreasuryClient};

/// The three upstream clients, each with its own cache
struct Clients {
    treasury: TreasuryClient,
    fred: FredClient,
    scorecard: ScorecardClient,
}

impl Clients {
    fn new(config: &Config) -> Self {
        Self {
            treasury: TreasuryClient::new(),
            fred: FredClient::new(config.fred_api_key.clone()),
            scorecard: ScorecardClient::new(config.scorecard_api_key.clone()),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

/// Builds school search parameters from location arguments plus shared filters
fn school_search(
    filters: &SchoolFilterArgs,
    location: SearchParams,
) -> Result<SearchParams, cli::CliError> {
    let params = filters.search_params()?;
    Ok(SearchParams {
        name: location.name,
        state: location.state,
        city: location.city,
        zip: location.zip,
        distance: location.distance,
        ..params
    })
}

/// Runs one subcommand and renders its result
///
/// Arguments are validated before any request is sent.
async fn run(command: Command, clients: &Clients) -> Result<String, Box<dyn std::error::Error>> {
    let output = match command {
        Command::Rates { range, security_type } => {
            let filters = range.treasury_filters(security_type)?;
            to_json(&clients.treasury.get_interest_rates(&filters).await?)?
        }
        Command::LatestRates => to_json(&clients.treasury.get_latest_interest_rates().await?)?,
        Command::Debt { range } => {
            let filters = range.treasury_filters(None)?;
            to_json(&clients.treasury.get_debt_data(&filters).await?)?
        }
        Command::RateContext => to_json(&clients.treasury.get_student_loan_rate_context().await?)?,
        Command::RateTrends { years } => {
            let years = cli::validate_years(years)?;
            to_json(&clients.treasury.get_interest_rate_trends(years).await?)?
        }
        Command::Series { id } => {
            to_json(&clients.fred.get_series_info(&cli::series_id_arg(&id)).await?)?
        }
        Command::Observations { id, range } => {
            let query = range.observation_query()?;
            let id = cli::series_id_arg(&id);
            to_json(&clients.fred.get_series_observations(&id, &query).await?)?
        }
        Command::Latest { id } => {
            to_json(&clients.fred.get_latest_observation(&cli::series_id_arg(&id)).await?)?
        }
        Command::Inflation => to_json(&clients.fred.get_inflation_data().await?)?,
        Command::Indicators => to_json(&clients.fred.get_economic_indicators().await)?,
        Command::StudentLoans => to_json(&clients.fred.get_total_student_loans().await?)?,
        Command::CpiHistory { years } => {
            let years = cli::validate_years(years)?;
            to_json(&clients.fred.get_cpi_history(years).await?)?
        }
        Command::Adjust { amount, from, to } => {
            let adjusted = clients.fred.adjust_for_inflation(amount, from, to).await?;
            to_json(&serde_json::json!({
                "amount": amount,
                "fromYear": from,
                "toYear": to,
                "adjustedAmount": adjusted,
            }))?
        }
        Command::SearchSeries { query, limit } => {
            to_json(&clients.fred.search_series(&query, limit).await?)?
        }
        Command::Poverty => to_json(&clients.fred.get_poverty_context().await?)?,
        Command::Schools {
            name,
            state,
            city,
            zip,
            distance,
            filters,
        } => {
            let location = SearchParams {
                name,
                state,
                city,
                zip,
                distance,
                ..Default::default()
            };
            let params = school_search(&filters, location)?;
            to_json(&clients.scorecard.search_schools(&params).await?)?
        }
        Command::School { id } => to_json(&clients.scorecard.get_school_by_id(id).await?)?,
        Command::NearZip { zip, distance, filters } => {
            let extra = filters.search_params()?;
            to_json(&clients.scorecard.get_schools_near_zip(&zip, distance, extra).await?)?
        }
        Command::ByState { state, filters } => {
            let extra = filters.search_params()?;
            to_json(&clients.scorecard.get_schools_by_state(&state, extra).await?)?
        }
        Command::Autocomplete { query, limit } => {
            to_json(&clients.scorecard.autocomplete_schools(&query, limit).await?)?
        }
        Command::FinancialAid { id } => {
            to_json(&clients.scorecard.get_school_financial_aid(id).await?)?
        }
        Command::Policy { year } => to_json(cli::policy_arg(year.as_deref())?)?,
    };
    Ok(output)
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let clients = Clients::new(&config);

    match run(cli.command, &clients).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
