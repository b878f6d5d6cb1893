use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lifecover_core::config::Settings;
use lifecover_core::domain::{rules, validation};
use lifecover_core::storage::{PgSubmissionStore, SubmissionStore};

#[derive(Debug, Parser)]
#[command(name = "lifecover")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate the rule table locally without touching the database.
    Quote {
        #[arg(long, allow_negative_numbers = true)]
        age: f64,

        #[arg(long, allow_negative_numbers = true)]
        income: f64,

        #[arg(long, allow_negative_numbers = true)]
        dependents: f64,

        /// Low, Medium or High.
        #[arg(long)]
        risk_tolerance: String,

        /// Print the full breakdown as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print a persisted submission as JSON.
    Show {
        #[arg(long)]
        id: i64,
    },

    /// Apply pending database migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Quote {
            age,
            income,
            dependents,
            risk_tolerance,
            json,
        } => {
            let payload = json!({
                "age": age,
                "income": income,
                "dependents": dependents,
                "riskTolerance": risk_tolerance,
            });
            let profile = match validation::validate(&payload) {
                Ok(p) => p,
                Err(e) => {
                    for msg in e.messages() {
                        eprintln!("{msg}");
                    }
                    anyhow::bail!("invalid input ({} problem(s))", e.messages().len());
                }
            };

            let outcome = rules::recommend(&profile);
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("{}", outcome.recommendation);
                println!("{}", outcome.explanation);
            }
        }
        Command::Show { id } => {
            let store = PgSubmissionStore::connect(&settings.database).await?;
            let submission = store
                .find(id)
                .await
                .map_err(anyhow::Error::new)?
                .with_context(|| format!("submission {id} not found"))?;
            println!("{}", serde_json::to_string_pretty(&submission)?);
        }
        Command::Migrate => {
            let store = PgSubmissionStore::connect(&settings.database).await?;
            if let Err(e) = lifecover_core::storage::migrate(store.pool()).await {
                sentry_anyhow::capture_anyhow(&e);
                return Err(e);
            }
            tracing::info!(db = %settings.database.redacted_url(), "migrations applied");
        }
    }

    Ok(())
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quote_arguments() {
        let args = Args::try_parse_from([
            "lifecover",
            "quote",
            "--age",
            "45",
            "--income",
            "50000",
            "--dependents",
            "0",
            "--risk-tolerance",
            "High",
        ])
        .unwrap();
        let Command::Quote {
            age,
            risk_tolerance,
            json,
            ..
        } = args.command
        else {
            panic!("expected quote");
        };
        assert_eq!(age, 45.0);
        assert_eq!(risk_tolerance, "High");
        assert!(!json);
    }

    #[test]
    fn negative_values_reach_the_validator() {
        let args = Args::try_parse_from([
            "lifecover",
            "quote",
            "--age",
            "30",
            "--income",
            "1",
            "--dependents",
            "-1",
            "--risk-tolerance",
            "Low",
        ])
        .unwrap();
        assert!(matches!(args.command, Command::Quote { dependents, .. } if dependents == -1.0));
    }

    #[test]
    fn show_requires_id() {
        assert!(Args::try_parse_from(["lifecover", "show"]).is_err());
    }
}
