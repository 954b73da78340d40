//! Event catalog sources: JSON/YAML catalog files and the built-in demo catalog.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};
use wevent_core::Event;

pub const CRATE_NAME: &str = "wevent-catalog";

/// On-disk catalog document. Either `{"events": [...]}` or a bare array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CatalogDocument {
    Wrapped { events: Vec<Event> },
    Bare(Vec<Event>),
}

impl CatalogDocument {
    pub fn into_events(self) -> Vec<Event> {
        match self {
            CatalogDocument::Wrapped { events } => events,
            CatalogDocument::Bare(events) => events,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Yaml,
}

impl CatalogFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(CatalogFormat::Json),
            "yaml" | "yml" => Some(CatalogFormat::Yaml),
            _ => None,
        }
    }
}

/// Events with unparsable dates are kept but reported at warn level.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Vec<Event>> {
    let path = path.as_ref();
    let Some(format) = CatalogFormat::from_path(path) else {
        bail!("unsupported catalog extension for {}", path.display());
    };
    let doc: CatalogDocument = match format {
        CatalogFormat::Json => read_json_file(path)?,
        CatalogFormat::Yaml => read_yaml_file(path)?,
    };
    let events = doc.into_events();
    report_malformed_dates(&events);
    debug!(path = %path.display(), events = events.len(), "catalog loaded");
    Ok(events)
}

pub fn load_catalog_or_builtin(path: Option<&Path>) -> Result<Vec<Event>> {
    match path {
        Some(path) => load_catalog(path),
        None => Ok(builtin_catalog()),
    }
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn read_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_yaml::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn report_malformed_dates(events: &[Event]) {
    for (index, event) in events.iter().enumerate() {
        if let Err(err) = event.parsed_date() {
            warn!(index, title = %event.title, error = %err, "catalog event has a malformed date");
        }
    }
}

fn demo_event(category: &str, title: &str, description: &str, date: &str, location: &str) -> Event {
    Event {
        category: category.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        date: date.to_string(),
        location: location.to_string(),
        image_url: None,
    }
}

pub fn builtin_catalog() -> Vec<Event> {
    vec![
        demo_event(
            "Конференция",
            "Цифровая трансформация промышленности 2025",
            "Крупнейшая конференция по внедрению Industry 4.0 в России. Доклады от ведущих экспертов, кейсы компаний...",
            "15 октября 2025",
            "Москва",
        ),
        demo_event(
            "Выставка",
            "Агротех-Экспо: Инновации для села",
            "Выставка современной сельхозтехники, оборудования и технологий для агробизнеса. Участвуют 200+ компаний...",
            "22 мая 2025",
            "Тамбов",
        ),
        demo_event(
            "Мастерская",
            "Интенсив по Data Science для начинающих",
            "Практический двухдневный воркшоп по основам анализа данных и машинного обучения на Python. Все материалы предоставляются...",
            "10 декабря 2025",
            "Санкт-Петербург",
        ),
        demo_event(
            "Другое",
            "Хакатон FinTech Solutions",
            "48-часовой марафон по разработке инновационных решений для финансового сектора. Призы от партнеров, менторская поддержка...",
            "5 сентября 2025",
            "Казань",
        ),
        demo_event(
            "Конференция",
            "Будущее образования: EdTech форум",
            "Обсуждение цифровизации образования, презентации образовательных платформ, опыт внедрения в вузах и школах...",
            "18 апреля 2025",
            "Новосибирск",
        ),
        demo_event(
            "Выставка",
            "Арт-Москва: Современное искусство",
            "Ежегодная выставка-ярмарка современного искусства. Галереи из России и стран СНГ, лекции, кураторские туры...",
            "12 февраля 2026",
            "Москва",
        ),
    ]
}
