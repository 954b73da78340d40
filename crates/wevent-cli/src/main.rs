use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wevent_catalog::load_catalog_or_builtin;
use wevent_core::{CategoryKey, Event, EventType, LocationKey};
use wevent_filter::{
    facet_counts, results_heading, DateRange, EventFilterEngine, FilterState, NO_RESULTS_MESSAGE,
};
use wevent_forms::{AcceptAll, AnswerWidget, RandomIds, RegistrationForm, RegistrationFormModel};
use wevent_session::{AuthSession, Authenticator, FileSessionStore, MockAuthenticator, SignInRequest};

#[derive(Debug, Parser)]
#[command(name = "wevent")]
#[command(about = "Browse, filter and prepare Wevent events")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List catalog events matching the given filters.
    List {
        #[arg(long, short)]
        query: Option<String>,
        #[arg(long = "type")]
        types: Vec<EventType>,
        #[arg(long = "location")]
        locations: Vec<LocationKey>,
        #[arg(long, default_value_t = DateRange::AllDates)]
        range: DateRange,
        /// Skip events with unreadable dates instead of failing.
        #[arg(long)]
        lenient: bool,
        #[arg(long)]
        json: bool,
    },
    /// Per-category and per-location counts for the catalog.
    Facets,
    /// Render the participant preview of a saved registration form.
    Preview { path: PathBuf },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct WeventConfig {
    catalog_path: Option<PathBuf>,
    session_path: PathBuf,
    sign_in_delay: Duration,
}

impl WeventConfig {
    fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            catalog_path: lookup("WEVENT_CATALOG_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            session_path: lookup("WEVENT_SESSION_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./.wevent-session.json")),
            sign_in_delay: Duration::from_millis(
                lookup("WEVENT_SIGN_IN_DELAY_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1000),
            ),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = WeventConfig::from_env();

    match cli.command.unwrap_or(Commands::List {
        query: None,
        types: vec![],
        locations: vec![],
        range: DateRange::AllDates,
        lenient: false,
        json: false,
    }) {
        Commands::List {
            query,
            types,
            locations,
            range,
            lenient,
            json,
        } => {
            let catalog = load_catalog_or_builtin(config.catalog_path.as_deref())?;
            let state = list_filter_state(query, &types, &locations, range);

            let engine = EventFilterEngine::new();
            let events = if lenient {
                engine.filter_lenient(&catalog, &state).events
            } else {
                engine.filter(&catalog, &state)?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else {
                print_events(&events);
            }
        }
        Commands::Facets => {
            let catalog = load_catalog_or_builtin(config.catalog_path.as_deref())?;
            let facets = facet_counts(&catalog, &FilterState::new());
            println!("Тип события");
            for row in facets.categories {
                let label = match row.key {
                    CategoryKey::Known(t) => t.label(),
                    CategoryKey::Unmapped => "(без категории)",
                };
                println!("  {label}: {}", row.count);
            }
            println!("Местоположение");
            for row in facets.locations {
                println!("  {}: {}", row.key.label(), row.count);
            }
        }
        Commands::Preview { path } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let form: RegistrationForm =
                serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
            let model = RegistrationFormModel::from_form(form, RandomIds, AcceptAll)?;
            print_preview(&model);
        }
        Commands::Login { email, password } => {
            let auth = MockAuthenticator::demo(config.sign_in_delay);
            let request = SignInRequest {
                email,
                password,
                remember_me: true,
            };
            let profile = auth.sign_in(&request).await?;
            let mut session = AuthSession::new(FileSessionStore::new(&config.session_path));
            session.login(profile)?;
            if let Some(user) = session.current_user() {
                println!("Вход выполнен: {} <{}>", user.name, user.email);
            }
        }
        Commands::Logout => {
            let mut session = AuthSession::new(FileSessionStore::new(&config.session_path));
            session.logout()?;
            println!("Сеанс завершён");
        }
        Commands::Whoami => {
            let mut session = AuthSession::new(FileSessionStore::new(&config.session_path));
            match session.restore()? {
                Some(user) => println!("{} <{}>", user.name, user.email),
                None => println!("Вход не выполнен"),
            }
        }
    }

    Ok(())
}

fn list_filter_state(
    query: Option<String>,
    types: &[EventType],
    locations: &[LocationKey],
    range: DateRange,
) -> FilterState {
    let mut state = FilterState::new();
    for t in types {
        state.select_event_type(*t);
    }
    for l in locations {
        state.select_location(*l);
    }
    state.set_date_range(range);
    if let Some(query) = query {
        state.set_search_query(query);
    }
    state
}

fn print_events(events: &[&Event]) {
    println!("{}", results_heading(events.len()));
    if events.is_empty() {
        println!("{NO_RESULTS_MESSAGE}");
        return;
    }
    for e in events {
        println!("- [{}] {}", e.category, e.title);
        println!("  {} · {}", e.date, e.location);
    }
}

fn print_preview<G, V>(model: &RegistrationFormModel<G, V>)
where
    G: wevent_forms::IdGenerator,
    V: wevent_forms::QuestionValidator,
{
    let preview = model.preview();
    println!("{}", preview.title);
    if let Some(intro) = &preview.intro {
        println!("{intro}");
    }
    for item in &preview.items {
        let marker = if item.required { " *" } else { "" };
        println!("{}. {}{}", item.number, item.label, marker);
        if let Some(comment) = &item.comment {
            println!("   {comment}");
        }
        match &item.widget {
            AnswerWidget::TextInput { placeholder }
            | AnswerWidget::TextArea { placeholder, .. }
            | AnswerWidget::PhoneInput { placeholder } => println!("   [{placeholder}]"),
            AnswerWidget::RadioGroup { options } => {
                for o in options {
                    println!("   ( ) {o}");
                }
            }
            AnswerWidget::CheckboxGroup { options } => {
                for o in options {
                    println!("   [ ] {o}");
                }
            }
            AnswerWidget::FileUpload { button, note } => println!("   <{button}> {note}"),
        }
    }
}
