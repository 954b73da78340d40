//! Event-creation wizard state: the event draft (step 1) and the
//! registration-form builder (step 2) with its preview projection.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;
use wevent_core::{format_event_date, Event, EventType};

pub const CRATE_NAME: &str = "wevent-forms";

pub const COMMENT_SOFT_LIMIT: usize = 200;
pub const INTRO_SOFT_LIMIT: usize = 1000;
pub const TITLE_SOFT_LIMIT: usize = 100;
pub const SHORT_DESCRIPTION_SOFT_LIMIT: usize = 200;
pub const FULL_DESCRIPTION_SOFT_LIMIT: usize = 2000;

const SEED_QUESTION_TEXT: &str = "E-mail";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub Uuid);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

pub trait IdGenerator {
    fn next_id(&mut self) -> QuestionId;
}

#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    issued: u128,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> QuestionId {
        self.issued += 1;
        QuestionId(Uuid::from_u128(self.issued))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> QuestionId {
        QuestionId(Uuid::new_v4())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    #[default]
    ShortText,
    LongText,
    SingleChoice,
    MultipleChoice,
    File,
    Phone,
}

impl QuestionType {
    pub const ALL: [QuestionType; 6] = [
        QuestionType::ShortText,
        QuestionType::LongText,
        QuestionType::SingleChoice,
        QuestionType::MultipleChoice,
        QuestionType::File,
        QuestionType::Phone,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QuestionType::ShortText => "Короткий произвольный ответ",
            QuestionType::LongText => "Длинный произвольный ответ",
            QuestionType::SingleChoice => "Выбор одного варианта",
            QuestionType::MultipleChoice => "Выбор нескольких вариантов",
            QuestionType::File => "Прикрепление файла (доступно в тарифе «Расширенный»)",
            QuestionType::Phone => "Номер телефона",
        }
    }

    pub fn uses_options(self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultipleChoice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub comment: String,
    pub is_required: bool,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub is_collapsed: bool,
}

impl Question {
    fn blank(id: QuestionId) -> Self {
        Self {
            id,
            text: String::new(),
            comment: String::new(),
            is_required: false,
            question_type: QuestionType::ShortText,
            options: Vec::new(),
            is_collapsed: false,
        }
    }

    fn seed(id: QuestionId) -> Self {
        Self {
            text: SEED_QUESTION_TEXT.to_string(),
            is_required: true,
            ..Self::blank(id)
        }
    }

    fn option_index(&self, index: usize) -> Result<usize, FormError> {
        if index < self.options.len() {
            Ok(index)
        } else {
            Err(FormError::IndexOutOfRange {
                index,
                len: self.options.len(),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionField {
    Text(String),
    Comment(String),
    Required(bool),
    Type(QuestionType),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    #[serde(default)]
    pub intro_text: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("question {0} not found")]
    NotFound(QuestionId),
    #[error("option index {index} out of range for {len} options")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    #[error("question {id} rejected: {reason}")]
    Validation { id: QuestionId, reason: String },
}

/// Hook run by [`RegistrationFormModel::save`] before a question collapses.
pub trait QuestionValidator {
    fn validate(&self, question: &Question) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl QuestionValidator for AcceptAll {
    fn validate(&self, _question: &Question) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharCounter {
    pub used: usize,
    pub limit: usize,
}

impl CharCounter {
    pub fn of(text: &str, limit: usize) -> Self {
        Self {
            used: text.chars().count(),
            limit,
        }
    }

    pub fn is_over(&self) -> bool {
        self.used > self.limit
    }
}

impl fmt::Display for CharCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.used, self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionSummary {
    pub text: String,
    pub type_label: &'static str,
}

#[derive(Debug, Clone)]
pub struct RegistrationFormModel<G = SequentialIds, V = AcceptAll> {
    form: RegistrationForm,
    ids: G,
    validator: V,
}

impl RegistrationFormModel<SequentialIds, AcceptAll> {
    pub fn new() -> Self {
        Self::with_parts(SequentialIds::default(), AcceptAll)
    }
}

impl Default for RegistrationFormModel<SequentialIds, AcceptAll> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator, V: QuestionValidator> RegistrationFormModel<G, V> {
    pub fn with_parts(mut ids: G, validator: V) -> Self {
        let seed = Question::seed(ids.next_id());
        Self {
            form: RegistrationForm {
                intro_text: String::new(),
                questions: vec![seed],
            },
            ids,
            validator,
        }
    }

    /// Resume editing a saved form. The form must hold at least one question
    /// and its ids must be unique.
    pub fn from_form(form: RegistrationForm, ids: G, validator: V) -> Result<Self, FormError> {
        if form.questions.is_empty() {
            return Err(FormError::InvalidOperation("a form needs at least one question"));
        }
        let mut seen = HashSet::new();
        if !form.questions.iter().all(|q| seen.insert(q.id)) {
            return Err(FormError::InvalidOperation("duplicate question ids"));
        }
        Ok(Self {
            form,
            ids,
            validator,
        })
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn questions(&self) -> &[Question] {
        &self.form.questions
    }

    pub fn question(&self, id: QuestionId) -> Result<&Question, FormError> {
        self.form
            .questions
            .iter()
            .find(|q| q.id == id)
            .ok_or(FormError::NotFound(id))
    }

    fn question_mut(&mut self, id: QuestionId) -> Result<&mut Question, FormError> {
        self.form
            .questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(FormError::NotFound(id))
    }

    fn fresh_id(&mut self) -> QuestionId {
        loop {
            let id = self.ids.next_id();
            if self.form.questions.iter().all(|q| q.id != id) {
                return id;
            }
        }
    }

    pub fn set_intro_text(&mut self, text: impl Into<String>) {
        self.form.intro_text = text.into();
    }

    pub fn intro_counter(&self) -> CharCounter {
        CharCounter::of(&self.form.intro_text, INTRO_SOFT_LIMIT)
    }

    pub fn add_question(&mut self) -> QuestionId {
        let id = self.fresh_id();
        self.form.questions.push(Question::blank(id));
        debug!(%id, total = self.form.questions.len(), "question added");
        id
    }

    /// Remove a question. The last remaining question can never be removed.
    pub fn remove_question(&mut self, id: QuestionId) -> Result<Question, FormError> {
        let pos = self
            .form
            .questions
            .iter()
            .position(|q| q.id == id)
            .ok_or(FormError::NotFound(id))?;
        if self.form.questions.len() == 1 {
            return Err(FormError::InvalidOperation("cannot remove the last question"));
        }
        Ok(self.form.questions.remove(pos))
    }

    pub fn update_question_field(&mut self, id: QuestionId, field: QuestionField) -> Result<(), FormError> {
        let q = self.question_mut(id)?;
        match field {
            QuestionField::Text(text) => q.text = text,
            QuestionField::Comment(comment) => q.comment = comment,
            QuestionField::Required(required) => q.is_required = required,
            QuestionField::Type(question_type) => q.question_type = question_type,
        }
        Ok(())
    }

    pub fn add_option(&mut self, id: QuestionId) -> Result<usize, FormError> {
        let q = self.question_mut(id)?;
        q.options.push(String::new());
        Ok(q.options.len() - 1)
    }

    pub fn remove_option(&mut self, id: QuestionId, index: usize) -> Result<String, FormError> {
        let q = self.question_mut(id)?;
        let index = q.option_index(index)?;
        Ok(q.options.remove(index))
    }

    pub fn update_option(&mut self, id: QuestionId, index: usize, value: impl Into<String>) -> Result<(), FormError> {
        let q = self.question_mut(id)?;
        let index = q.option_index(index)?;
        q.options[index] = value.into();
        Ok(())
    }

    pub fn toggle_collapse(&mut self, id: QuestionId) -> Result<bool, FormError> {
        let q = self.question_mut(id)?;
        q.is_collapsed = !q.is_collapsed;
        Ok(q.is_collapsed)
    }

    pub fn edit(&mut self, id: QuestionId) -> Result<(), FormError> {
        self.question_mut(id)?.is_collapsed = false;
        Ok(())
    }

    /// Validate and collapse. A rejected question stays as it was.
    pub fn save(&mut self, id: QuestionId) -> Result<(), FormError> {
        let question = self.question(id)?;
        self.validator
            .validate(question)
            .map_err(|reason| FormError::Validation { id, reason })?;
        debug!(%id, text = %question.text, "question saved");
        self.question_mut(id)?.is_collapsed = true;
        Ok(())
    }

    pub fn comment_counter(&self, id: QuestionId) -> Result<CharCounter, FormError> {
        Ok(CharCounter::of(&self.question(id)?.comment, COMMENT_SOFT_LIMIT))
    }

    /// Summary line for a collapsed question; `None` while editing or when
    /// the question has no text yet.
    pub fn summary(&self, id: QuestionId) -> Result<Option<QuestionSummary>, FormError> {
        let q = self.question(id)?;
        if !q.is_collapsed || q.text.is_empty() {
            return Ok(None);
        }
        Ok(Some(QuestionSummary {
            text: q.text.clone(),
            type_label: q.question_type.label(),
        }))
    }

    /// Discard all edits: back to the single seeded question.
    pub fn reset(&mut self) {
        let seed = Question::seed(self.ids.next_id());
        self.form = RegistrationForm {
            intro_text: String::new(),
            questions: vec![seed],
        };
    }

    pub fn preview(&self) -> FormPreview {
        preview_of(&self.form)
    }

    pub fn submit(&self) -> RegistrationForm {
        info!(
            questions = self.form.questions.len(),
            required = self.form.questions.iter().filter(|q| q.is_required).count(),
            "registration form submitted"
        );
        self.form.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum AnswerWidget {
    TextInput { placeholder: &'static str },
    TextArea { placeholder: &'static str, rows: u8 },
    PhoneInput { placeholder: &'static str },
    RadioGroup { options: Vec<String> },
    CheckboxGroup { options: Vec<String> },
    FileUpload { button: &'static str, note: &'static str },
}

impl AnswerWidget {
    pub fn for_question(q: &Question) -> Self {
        match q.question_type {
            QuestionType::ShortText => AnswerWidget::TextInput {
                placeholder: "Короткий ответ...",
            },
            QuestionType::LongText => AnswerWidget::TextArea {
                placeholder: "Длинный ответ...",
                rows: 3,
            },
            QuestionType::Phone => AnswerWidget::PhoneInput {
                placeholder: "+7 (___) ___-__-__",
            },
            QuestionType::SingleChoice => AnswerWidget::RadioGroup {
                options: option_labels(&q.options),
            },
            QuestionType::MultipleChoice => AnswerWidget::CheckboxGroup {
                options: option_labels(&q.options),
            },
            QuestionType::File => AnswerWidget::FileUpload {
                button: "Прикрепить файл",
                note: "Доступно в тарифе «Расширенный»",
            },
        }
    }
}

fn option_labels(options: &[String]) -> Vec<String> {
    options
        .iter()
        .enumerate()
        .map(|(i, o)| {
            if o.is_empty() {
                format!("Вариант {}", i + 1)
            } else {
                o.clone()
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewItem {
    pub number: usize,
    pub label: String,
    pub required: bool,
    pub comment: Option<String>,
    pub widget: AnswerWidget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormPreview {
    pub title: &'static str,
    pub intro: Option<String>,
    pub items: Vec<PreviewItem>,
}

pub fn preview_of(form: &RegistrationForm) -> FormPreview {
    let items = form
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| PreviewItem {
            number: i + 1,
            label: if q.text.is_empty() {
                format!("Вопрос {}", i + 1)
            } else {
                q.text.clone()
            },
            required: q.is_required,
            comment: (!q.comment.is_empty()).then(|| q.comment.clone()),
            widget: AnswerWidget::for_question(q),
        })
        .collect();
    FormPreview {
        title: "Регистрация на событие",
        intro: (!form.intro_text.is_empty()).then(|| form.intro_text.clone()),
        items,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    pub file_name: String,
    /// `data:` URL of the uploaded file, used for the preview thumbnail.
    pub data_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    pub short_description: String,
    pub full_description: String,
    pub category: Option<EventType>,
    pub city: String,
    pub address: String,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub cover: Option<CoverImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftCounters {
    pub title: CharCounter,
    pub short_description: CharCounter,
    pub full_description: CharCounter,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("event draft is incomplete: {}", .0.keys().copied().collect::<Vec<_>>().join(", "))]
pub struct DraftErrors(pub BTreeMap<&'static str, &'static str>);

impl EventDraft {
    pub fn attach_cover(&mut self, file_name: impl Into<String>, data_url: impl Into<String>) {
        self.cover = Some(CoverImage {
            file_name: file_name.into(),
            data_url: data_url.into(),
        });
    }

    pub fn remove_cover(&mut self) {
        self.cover = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn counters(&self) -> DraftCounters {
        DraftCounters {
            title: CharCounter::of(&self.title, TITLE_SOFT_LIMIT),
            short_description: CharCounter::of(&self.short_description, SHORT_DESCRIPTION_SOFT_LIMIT),
            full_description: CharCounter::of(&self.full_description, FULL_DESCRIPTION_SOFT_LIMIT),
        }
    }

    /// Every field except the cover is required.
    pub fn validate(&self) -> Result<(), DraftErrors> {
        let mut errors = BTreeMap::new();
        let blank = |s: &str| s.trim().is_empty();
        if blank(&self.title) {
            errors.insert("title", "Введите название мероприятия");
        }
        if self.category.is_none() {
            errors.insert("category", "Выберите категорию");
        }
        if blank(&self.city) {
            errors.insert("city", "Укажите город");
        }
        if blank(&self.address) {
            errors.insert("address", "Укажите адрес");
        }
        if self.date.is_none() {
            errors.insert("date", "Укажите дату");
        }
        if self.start_time.is_none() {
            errors.insert("startTime", "Укажите время начала");
        }
        if blank(&self.short_description) {
            errors.insert("shortDescription", "Добавьте краткое описание");
        }
        if blank(&self.full_description) {
            errors.insert("fullDescription", "Добавьте полное описание");
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(DraftErrors(errors))
        }
    }

    pub fn to_event(&self) -> Result<Event, DraftErrors> {
        self.validate()?;
        let (Some(category), Some(date)) = (self.category, self.date) else {
            return Err(DraftErrors::default());
        };
        Ok(Event {
            category: category.label().to_string(),
            title: self.title.trim().to_string(),
            description: self.short_description.trim().to_string(),
            date: format_event_date(date),
            location: self.city.trim().to_string(),
            image_url: self.cover.as_ref().map(|c| c.data_url.clone()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    EventDetails,
    Registration,
}

#[derive(Debug, Clone)]
pub struct CreateEventWizard<G = SequentialIds, V = AcceptAll> {
    pub step: WizardStep,
    pub draft: EventDraft,
    pub registration: RegistrationFormModel<G, V>,
}

impl CreateEventWizard<SequentialIds, AcceptAll> {
    pub fn new() -> Self {
        Self {
            step: WizardStep::default(),
            draft: EventDraft::default(),
            registration: RegistrationFormModel::new(),
        }
    }
}

impl Default for CreateEventWizard<SequentialIds, AcceptAll> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator, V: QuestionValidator> CreateEventWizard<G, V> {
    pub fn go_to(&mut self, step: WizardStep) {
        self.step = step;
    }
}
