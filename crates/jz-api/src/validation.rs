//! Validation of the topic and event forms.
//!
//! Rejected forms are answered with a redirect; the field errors travel in the
//! session under the `form` key.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use jz_db::models::{NewEvent, NewTopic, Topic};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MAX_TOPIC_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_EVENT_TITLE_LEN: usize = 110;

/// Error message per form field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopicForm {
    pub title: String,
    pub start_year: String,
    pub end_year: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventForm {
    pub title: String,
    pub year: String,
    /// Optional `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
}

fn check_title(errors: &mut FormErrors, title: &str, max: usize) -> String {
    let title = title.trim();
    let len = title.chars().count();
    if len == 0 {
        errors.add("title", "Please enter a title.");
    } else if len > max {
        errors.add("title", format!("The title may not be longer than {max} characters."));
    }
    title.to_string()
}

fn check_year(errors: &mut FormErrors, field: &str, value: &str, current_year: i32) -> i32 {
    match value.trim().parse::<i32>() {
        Ok(year) if year <= 0 => {
            errors.add(field, "Only positive years are supported.");
            year
        }
        Ok(year) if year > current_year => {
            errors.add(field, "The year may not lie in the future.");
            year
        }
        Ok(year) => year,
        Err(_) => {
            errors.add(field, "Please enter a valid year.");
            0
        }
    }
}

pub fn validate_topic(form: &TopicForm, current_year: i32) -> Result<NewTopic, FormErrors> {
    let mut errors = FormErrors::default();

    let title = check_title(&mut errors, &form.title, MAX_TOPIC_TITLE_LEN);
    let start_year = check_year(&mut errors, "start_year", &form.start_year, current_year);
    let end_year = check_year(&mut errors, "end_year", &form.end_year, current_year);

    if errors.get("start_year").is_none() && errors.get("end_year").is_none() && start_year > end_year
    {
        errors.add("end_year", "The end year may not be before the start year.");
    }

    let description = form.description.trim().to_string();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.add(
            "description",
            format!("The description may not be longer than {MAX_DESCRIPTION_LEN} characters."),
        );
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewTopic {
        title,
        start_year,
        end_year,
        description,
    })
}

pub fn validate_event(
    form: &EventForm,
    topic: &Topic,
    current_year: i32,
) -> Result<NewEvent, FormErrors> {
    let mut errors = FormErrors::default();

    let title = check_title(&mut errors, &form.title, MAX_EVENT_TITLE_LEN);
    let year = check_year(&mut errors, "year", &form.year, current_year);

    if errors.get("year").is_none() && !(topic.start_year..=topic.end_year).contains(&year) {
        errors.add(
            "year",
            format!(
                "The year must lie within the topic ({} to {}).",
                topic.start_year, topic.end_year
            ),
        );
    }

    let date = match form.date.trim() {
        "" => None,
        raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) if chrono::Datelike::year(&date) == year => Some(date),
            Ok(_) => {
                errors.add("date", "The date must lie within the event's year.");
                None
            }
            Err(_) => {
                errors.add("date", "Please enter a date as YYYY-MM-DD.");
                None
            }
        },
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewEvent {
        topic_id: topic.id,
        title,
        year,
        date,
    })
}
