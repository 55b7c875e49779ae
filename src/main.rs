use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wealth_engine::config::Settings;
use wealth_engine::logging::{init_logging, LoggingConfig};
use wealth_engine::session::{clamp_portfolio_value, parse_portfolio_value};
use wealth_engine::{
    recommend, ModelCatalog, ModelOverride, Questionnaire, Recommendation, ReferenceDataset,
    SessionState, SessionStore, Stage, Theme,
};

#[derive(Debug, Parser)]
#[command(name = "wealth_engine", about = "Risk questionnaire and model portfolio projections")]
struct Args {
    /// Session file. Defaults to WEALTH_SESSION_PATH or ./wealth_session.json.
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    /// Replacement reference dataset (JSON). Defaults to WEALTH_DATASET_PATH or the builtin set.
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the questions and their options.
    Questions,
    /// List the model portfolios.
    Models,
    /// Answer a question (1-based question and option numbers).
    Answer { question: usize, option: usize },
    /// Clear the answer to a question (1-based).
    Clear { question: usize },
    /// Pin a model, or "Auto" to let the score decide.
    Override { model: String },
    /// Set the portfolio value, e.g. "$250,000".
    Value { amount: String },
    /// Switch the display theme.
    Theme { theme: ThemeArg },
    /// Restart the questionnaire.
    Reset,
    /// Score the answers and print the recommended model's projections.
    Report {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeArg {
    Dark,
    Light,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Light => Theme::Light,
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env();
    init_logging(&LoggingConfig::new(settings.log_level.clone()))?;

    let args = Args::parse();

    let dataset_path = args.dataset.clone().or_else(|| settings.dataset_path.clone());
    let loaded_dataset = match dataset_path {
        Some(path) => Some(
            ReferenceDataset::load_json(&path)
                .with_context(|| format!("loading dataset {}", path.display()))?,
        ),
        None => None,
    };
    let dataset = loaded_dataset.as_ref().unwrap_or_else(|| ReferenceDataset::builtin());

    let catalog = ModelCatalog::builtin();
    catalog
        .validate(dataset)
        .context("model catalog does not match the reference dataset")?;

    let questionnaire = Questionnaire::builtin();
    let store = SessionStore::new(args.session.clone().unwrap_or(settings.session_path.clone()));
    let mut state = store.load(questionnaire);

    match args.command {
        Command::Questions => print_questions(questionnaire, &state),
        Command::Models => print_models(catalog),
        Command::Answer { question, option } => {
            let q = to_index(question, "question")?;
            let o = to_index(option, "option")?;
            let score = state.answer(questionnaire, q, o)?;
            tracing::info!(question, option, score, "answer recorded");
            save(&store, &state)?;
            print_progress(questionnaire, &state);
        }
        Command::Clear { question } => {
            let q = to_index(question, "question")?;
            state.answers.clear(q)?;
            state.stage = Stage::Quiz(q);
            save(&store, &state)?;
            print_progress(questionnaire, &state);
        }
        Command::Override { model } => {
            let model_override: ModelOverride = model.parse()?;
            state.model_override = model_override;
            save(&store, &state)?;
            println!("Model override: {}", model_override);
        }
        Command::Value { amount } => {
            let parsed = parse_portfolio_value(&amount);
            if parsed == 0.0 && !amount.trim().is_empty() {
                tracing::warn!(input = %amount, "could not read portfolio value, using 0");
            }
            state.portfolio_value = parsed;
            save(&store, &state)?;
            println!("Portfolio value: ${:.2}", state.portfolio_value);
        }
        Command::Theme { theme } => {
            state.theme = theme.into();
            save(&store, &state)?;
            println!("Theme: {:?}", state.theme);
        }
        Command::Reset => {
            state.reset();
            save(&store, &state)?;
            println!("Questionnaire reset.");
        }
        Command::Report { json } => {
            let value = clamp_portfolio_value(state.portfolio_value);
            let rec = match recommend(
                state.answers.slots(),
                state.model_override,
                value,
                catalog,
                dataset,
            ) {
                Ok(rec) => rec,
                Err(e) => {
                    tracing::error!(error = %e, "could not compute recommendation");
                    anyhow::bail!("Something went wrong building your results.");
                }
            };

            if state.stage != Stage::Results && state.answers.is_complete() {
                state.stage = Stage::Results;
                save(&store, &state)?;
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&rec)?);
            } else {
                print_report(&rec, value, &state);
            }
        }
    }

    Ok(())
}

fn to_index(n: usize, what: &str) -> anyhow::Result<usize> {
    n.checked_sub(1)
        .with_context(|| format!("{what} numbers start at 1"))
}

fn save(store: &SessionStore, state: &SessionState) -> anyhow::Result<()> {
    store
        .save(state)
        .with_context(|| format!("saving session to {}", store.path().display()))
}

fn print_questions(questionnaire: &Questionnaire, state: &SessionState) {
    for (i, question) in questionnaire.questions().iter().enumerate() {
        println!("{}. {}", i + 1, question.prompt);
        let chosen = state.answers.slots().get(i).copied().flatten();
        for (j, option) in question.options.iter().enumerate() {
            // Two options never share a score within one question
            let marker = if chosen == Some(option.score) { "*" } else { " " };
            println!("   {} {}) {}", marker, j + 1, option.label);
        }
    }
}

fn print_models(catalog: &ModelCatalog) {
    for model in catalog.iter() {
        let weights: Vec<String> = model
            .weights
            .iter()
            .map(|(ticker, w)| format!("{ticker} {w}%"))
            .collect();
        println!("{}: {}", model.name, weights.join(", "));
        println!("   {}", model.notes);
    }
}

fn print_progress(questionnaire: &Questionnaire, state: &SessionState) {
    println!(
        "Answered {}/{} questions.",
        state.answers.answered_count(),
        questionnaire.len()
    );
    match state.stage {
        Stage::Quiz(next) => {
            if let Some(q) = questionnaire.questions().get(next) {
                println!("Next: {}. {}", next + 1, q.prompt);
            }
        }
        Stage::Results => println!("All done. Run `report` to see your results."),
        Stage::Intro => {}
    }
}

fn print_report(rec: &Recommendation, value: f64, state: &SessionState) {
    let m = &rec.metrics;
    println!("Risk score: {}/100", rec.risk_score);
    if rec.overridden {
        println!("Model: {} (chosen manually)", rec.model);
    } else {
        println!("Model: {}", rec.model);
    }
    if !state.answers.is_complete() {
        println!(
            "Note: {} of {} questions unanswered; they count as neutral.",
            state.answers.len() - state.answers.answered_count(),
            state.answers.len()
        );
    }
    println!("{}", rec.notes);
    println!();
    for h in &rec.holdings {
        println!(
            "  {:<5} {:>5.1}%  ${:>12.2}  {} ({})",
            h.ticker,
            h.weight * 100.0,
            h.amount,
            h.name,
            h.sector
        );
    }
    println!();
    println!("Portfolio value:        ${:.2}", value);
    println!("Expected return:        {:.2}% p.a.", m.expected_return * 100.0);
    println!("Fee drag:               {:.3}% p.a.", m.fee_drag * 100.0);
    println!("Yield:                  {:.2}%", m.yield_pct * 100.0);
    println!("Volatility:             {:.2}%", m.volatility * 100.0);
    println!("Projected income:       ${:.2} p.a.", m.projected_income);
    println!("Projected 10-year value: ${:.2}", m.projected_value_10y);
    println!("Diversification:        {:.2}", m.diversification);
    println!();
    println!("Illustrative only. Past returns do not predict future returns.");
}
