//! Multipart profile forms.
//!
//! Browsers post every profile attribute as a text part, so structured
//! values (lists, nested objects, numbers, dates) arrive as strings and are
//! parsed here. Empty parts count as "not provided".

use axum::extract::Multipart;
use bytes::Bytes;
use chrono::NaiveDate;
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};
use crate::models::candidate::CandidateProfile;

/// Profile key holding the stored avatar path; only the server writes it.
pub const AVATAR_KEY: &str = "avatar";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct FormData {
    pub fields: Vec<(String, String)>,
    pub files: Vec<UploadedFile>,
}

impl FormData {
    pub async fn read(multipart: &mut Multipart) -> Result<Self> {
        let mut form = FormData::default();
        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::error!("Failed to get next field: {}", e);
            Error::Multipart(e)
        })? {
            let name = field.name().unwrap_or_default().to_string();
            if name.is_empty() {
                continue;
            }
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await.map_err(|e| {
                        tracing::error!("Failed to read upload bytes: {}", e);
                        Error::Multipart(e)
                    })?;
                    // An untouched file input still posts an empty part.
                    if !data.is_empty() {
                        form.files.push(UploadedFile {
                            field: name,
                            file_name,
                            data,
                        });
                    }
                }
                None => {
                    let text = field.text().await?;
                    form.fields.push((name, text));
                }
            }
        }
        Ok(form)
    }

    pub fn file(&self, field: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.field == field)
    }

    /// Non-blank values for `key`, matched on the normalized field name.
    fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(name, _)| normalize_key(name) == key)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn text(&self, key: &str) -> Option<String> {
        self.values(key).last().map(str::to_string)
    }
}

/// `first_name`, `firstName` and `FirstName` all name the same field.
fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_int(form: &FormData, key: &str, label: &str) -> Result<Option<i32>> {
    form.text(key)
        .map(|raw| {
            raw.parse::<i32>()
                .map_err(|_| Error::BadRequest(format!("{} must be a whole number", label)))
        })
        .transpose()
}

fn parse_date(form: &FormData, key: &str, label: &str) -> Result<Option<NaiveDate>> {
    form.text(key)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| Error::BadRequest(format!("{} must be a YYYY-MM-DD date", label)))
        })
        .transpose()
}

/// Splits one raw value into list entries: a JSON string array, or commas.
fn split_list(raw: &str) -> Vec<String> {
    if let Ok(JsonValue::Array(items)) = serde_json::from_str::<JsonValue>(raw) {
        return items
            .into_iter()
            .filter_map(|item| match item {
                JsonValue::String(s) => Some(s),
                JsonValue::Null => None,
                other => Some(other.to_string()),
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_list(form: &FormData, key: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in form.values(key) {
        for item in split_list(value) {
            if !out.contains(&item) {
                out.push(item);
            }
        }
    }
    out
}

fn parse_languages(form: &FormData) -> Option<JsonValue> {
    let raw = form.text("languages")?;
    match serde_json::from_str::<JsonValue>(&raw) {
        Ok(value @ (JsonValue::Array(_) | JsonValue::Object(_))) => Some(value),
        _ => {
            let list = parse_list(form, "languages");
            Some(JsonValue::Array(
                list.into_iter().map(JsonValue::String).collect(),
            ))
        }
    }
}

/// Builds the descriptive part of a candidate profile from form fields.
/// Upload columns are left empty; the caller fills them.
pub fn candidate_from_form(user_id: uuid::Uuid, form: &FormData) -> Result<CandidateProfile> {
    let salary_min = parse_int(form, "salarymin", "salaryMin")?;
    let salary_max = parse_int(form, "salarymax", "salaryMax")?;
    if let (Some(min), Some(max)) = (salary_min, salary_max) {
        if min > max {
            return Err(Error::BadRequest(
                "salaryMin cannot be greater than salaryMax".into(),
            ));
        }
    }

    Ok(CandidateProfile {
        user_id,
        first_name: form.text("firstname"),
        last_name: form.text("lastname"),
        location: form.text("location"),
        phone: form.text("phone"),
        birth_date: parse_date(form, "birthdate", "birthDate")?,
        job_role: form.text("jobrole"),
        experience: form.text("experience"),
        education: form.text("education"),
        languages: parse_languages(form),
        salary_min,
        salary_max,
        availability: form.text("availability"),
        remote_work: form.text("remotework"),
        relocation: form.text("relocation"),
        summary: form.text("summary"),
        sectors: parse_list(form, "sectors"),
        software: parse_list(form, "software"),
        ..CandidateProfile::empty(user_id)
    })
}

fn field_value(raw: &str) -> JsonValue {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<JsonValue>(trimmed) {
            return value;
        }
    }
    JsonValue::String(trimmed.to_string())
}

/// Turns a free-form profile form into the JSON blob stored on the user.
///
/// A `profileData` part holding a JSON object is taken as the base; every
/// other text part becomes a key on top of it, replacing the base value.
/// Repeated keys collect into an array. `avatar` is never taken from the
/// client.
pub fn profile_from_form(form: &FormData) -> Result<JsonValue> {
    let mut profile = Map::new();

    if let Some(raw) = form.text("profiledata") {
        match serde_json::from_str::<JsonValue>(&raw) {
            Ok(JsonValue::Object(base)) => profile.extend(base),
            _ => {
                return Err(Error::BadRequest(
                    "profileData must be a JSON object".into(),
                ))
            }
        }
    }

    let mut fields: Vec<(&str, Vec<JsonValue>)> = Vec::new();
    for (name, raw) in &form.fields {
        let key = normalize_key(name);
        if key == "profiledata" || key == "userid" || raw.trim().is_empty() {
            continue;
        }
        let value = field_value(raw);
        match fields.iter_mut().find(|(existing, _)| *existing == name.as_str()) {
            Some((_, values)) => values.push(value),
            None => fields.push((name.as_str(), vec![value])),
        }
    }

    for (name, mut values) in fields {
        let value = if values.len() == 1 {
            values.remove(0)
        } else {
            JsonValue::Array(values)
        };
        profile.insert(name.to_string(), value);
    }

    profile.remove(AVATAR_KEY);
    Ok(JsonValue::Object(profile))
}
