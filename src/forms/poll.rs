use serde::Serialize;

use super::{optional_image, optional_text, required_text, FieldErrors, FormData};
use crate::config::PollFormConfig;
use crate::core::models::question::Create as QuestionCreate;
use crate::core::models::upload_file::Category;

pub static CHOICES: &str = "choices";

fn text_field(slot: usize) -> String {
    format!("choices-{}-text", slot)
}

fn delete_field(slot: usize) -> String {
    format!("choices-{}-delete", slot)
}

#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct ChoiceSlot {
    pub text: String,
    pub delete: bool,
}

/// Poll form and its choice slots as shown on the creation page.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Values {
    pub question_text: String,
    pub question_description: String,
    pub choices: Vec<ChoiceSlot>,
    pub min_choices: usize,
}

impl Values {
    pub fn blank(config: &PollFormConfig) -> Self {
        Self {
            choices: vec![ChoiceSlot::default(); config.choice_slots],
            min_choices: config.min_choices,
            ..Default::default()
        }
    }

    pub fn from_form(data: &FormData, config: &PollFormConfig) -> Self {
        Self {
            question_text: data.text("question_text").unwrap_or_default().to_owned(),
            question_description: data.text("question_description").unwrap_or_default().to_owned(),
            choices: (0..config.choice_slots)
                .map(|slot| ChoiceSlot {
                    text: data.text(&text_field(slot)).unwrap_or_default().to_owned(),
                    delete: data.has(&delete_field(slot)),
                })
                .collect(),
            min_choices: config.min_choices,
        }
    }
}

fn slot_of(field: &str) -> Option<usize> {
    field.strip_prefix("choices-")?.strip_suffix("-text")?.parse().ok()
}

pub fn validate(data: &FormData, config: &PollFormConfig) -> Result<QuestionCreate, FieldErrors> {
    let mut errors = FieldErrors::default();
    let question_text = required_text(data, &mut errors, "question_text", 200);
    let question_description = optional_text(data, &mut errors, "question_description", 500);
    let picture = optional_image(data, &mut errors, "picture", Category::Picture);

    if data.fields.iter().any(|(k, v)| !v.trim().is_empty() && slot_of(k).map_or(false, |slot| slot >= config.choice_slots)) {
        errors.add(CHOICES, format!("Please submit at most {} choices.", config.choice_slots));
    }
    let mut choices = Vec::new();
    for slot in 0..config.choice_slots {
        if data.has(&delete_field(slot)) {
            continue;
        }
        let field = text_field(slot);
        let text = optional_text(data, &mut errors, &field, 200);
        if !text.is_empty() {
            choices.push(text);
        }
    }
    if choices.len() < config.min_choices {
        errors.add(CHOICES, format!("Please submit at least {} choices.", config.min_choices));
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(QuestionCreate {
        question_text,
        question_description,
        picture,
        choices,
    })
}
