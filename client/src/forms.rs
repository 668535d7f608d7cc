//! Form binding: raw text inputs validated by the server's own schemas, so
//! the messages shown inline match what the API would answer.

use crate::error::ClientError;
use booknest::model::{NewBook, NewGoal, NewReview, ProgressUpdate, RatingBounds};
use booknest::validation::{self, ValidationErrors};
use chrono::{Datelike, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::future::Future;

pub trait FormSchema {
    type Output;
    const FIELDS: &'static [&'static str];

    fn validate(&self, input: &Map<String, Value>) -> Result<Self::Output, ValidationErrors>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BookSchema;

impl FormSchema for BookSchema {
    type Output = NewBook;
    const FIELDS: &'static [&'static str] = &["title", "author", "year", "genre", "page_count", "isbn", "synopsis"];

    fn validate(&self, input: &Map<String, Value>) -> Result<NewBook, ValidationErrors> {
        validation::new_book(input, Utc::now().year())
    }
}

/// Carries the rating bounds the server was configured with.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewSchema {
    pub bounds: RatingBounds,
}

impl FormSchema for ReviewSchema {
    type Output = NewReview;
    const FIELDS: &'static [&'static str] = &["rating", "text", "visibility"];

    fn validate(&self, input: &Map<String, Value>) -> Result<NewReview, ValidationErrors> {
        validation::new_review(input, self.bounds)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GoalSchema;

impl FormSchema for GoalSchema {
    type Output = NewGoal;
    const FIELDS: &'static [&'static str] = &["year", "target_books", "target_pages"];

    fn validate(&self, input: &Map<String, Value>) -> Result<NewGoal, ValidationErrors> {
        validation::new_goal(input)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressSchema;

impl FormSchema for ProgressSchema {
    type Output = ProgressUpdate;
    const FIELDS: &'static [&'static str] = &["current_page"];

    fn validate(&self, input: &Map<String, Value>) -> Result<ProgressUpdate, ValidationErrors> {
        validation::progress_update(input)
    }
}

pub struct Form<S: FormSchema> {
    values: BTreeMap<String, String>,
    errors: ValidationErrors,
    schema: S,
}

impl<S: FormSchema + Default> Default for Form<S> {
    fn default() -> Self {
        Form::with_schema(S::default())
    }
}

impl<S: FormSchema + Default> Form<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefilled, e.g. from the entity being edited.
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new().prefilled(values)
    }
}

impl<S: FormSchema> Form<S> {
    pub fn with_schema(schema: S) -> Self {
        Form {
            values: BTreeMap::new(),
            errors: ValidationErrors::new(),
            schema,
        }
    }

    pub fn prefilled<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in values {
            self.set(k, v);
        }
        self
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// Editing a field clears its error.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        self.errors = clear_field(&self.errors, &field);
        self.values.insert(field, value.into());
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn field_errors(&self, field: &str) -> &[String] {
        self.errors.field(field)
    }

    /// Clears values and errors, keeping the schema.
    pub fn reset(&mut self) {
        self.values.clear();
        self.errors = ValidationErrors::new();
    }

    fn input(&self) -> Map<String, Value> {
        S::FIELDS
            .iter()
            .filter_map(|f| self.values.get(*f).map(|v| (f.to_string(), Value::String(v.clone()))))
            .collect()
    }

    pub fn validate(&mut self) -> Option<S::Output> {
        match self.schema.validate(&self.input()) {
            Ok(out) => {
                self.errors = ValidationErrors::new();
                Some(out)
            }
            Err(errors) => {
                self.errors = errors;
                None
            }
        }
    }

    /// Shows the field messages of a rejected submission.
    pub fn apply_server_errors(&mut self, err: &ClientError) {
        if let Some(errors) = err.field_errors() {
            self.errors = errors;
        }
    }

    /// Calls `handler` only when nothing is pending and the input is valid.
    pub async fn submit<F, Fut, T>(&mut self, pending: bool, handler: F) -> Option<T>
    where
        F: FnOnce(S::Output) -> Fut,
        Fut: Future<Output = T>,
    {
        if pending {
            return None;
        }
        let output = self.validate()?;
        Some(handler(output).await)
    }
}

fn clear_field(errors: &ValidationErrors, field: &str) -> ValidationErrors {
    let mut kept = ValidationErrors::new();
    for (name, messages) in errors.fields() {
        if name != field {
            for m in messages {
                kept.add(name, m.clone());
            }
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use booknest::model::{Genre, Visibility};
    use std::cell::Cell;

    #[tokio::test]
    async fn invalid_book_never_reaches_the_handler() {
        let mut form: Form<BookSchema> = Form::with_values([("title", ""), ("author", "A"), ("page_count", "0")]);
        let called = Cell::new(false);
        let flag = &called;
        let out = form.submit(false, |_| async move { flag.set(true) }).await;
        assert!(out.is_none());
        assert!(!called.get());
        assert!(!form.field_errors("title").is_empty());
        assert!(!form.field_errors("author").is_empty());
        assert!(!form.field_errors("page_count").is_empty());
        assert!(!form.field_errors("genre").is_empty());
    }

    #[tokio::test]
    async fn valid_book_is_typed() {
        let mut form: Form<BookSchema> = Form::with_values([
            ("title", "Dune"),
            ("author", "Frank Herbert"),
            ("year", "1965"),
            ("genre", "Science Fiction"),
            ("page_count", "412"),
            ("isbn", ""),
        ]);
        let book = form.submit(false, |book| async move { book }).await.unwrap();
        assert_eq!(book.genre, Genre::ScienceFiction);
        assert_eq!(book.page_count, 412);
        assert_eq!(book.isbn, None);
        assert!(form.errors().is_empty());
    }

    #[tokio::test]
    async fn pending_blocks_submission() {
        let mut form: Form<ReviewSchema> = Form::with_values([("rating", "4")]);
        assert!(form.submit(true, |r| async move { r }).await.is_none());
        let review = form.submit(false, |r| async move { r }).await.unwrap();
        assert_eq!(review.rating, 4);
        assert_eq!(review.visibility, Visibility::Private);
    }

    #[test]
    fn review_rating_follows_the_configured_bounds() {
        let mut default_form: Form<ReviewSchema> = Form::with_values([("rating", "8")]);
        assert!(default_form.validate().is_none());
        assert!(default_form.errors().contains("rating"));

        let wide = ReviewSchema {
            bounds: RatingBounds { min: 0, max: 10 },
        };
        let mut form = Form::with_schema(wide).prefilled([("rating", "8")]);
        assert_eq!(form.validate().map(|r| r.rating), Some(8));

        form.reset();
        assert_eq!(form.value("rating"), "");
        assert_eq!(form.schema().bounds.max, 10);
        form.set("rating", "0");
        assert!(form.validate().is_some());
    }

    #[test]
    fn editing_clears_that_field_only() {
        let mut form: Form<GoalSchema> = Form::with_values([("year", "1800"), ("target_books", "0")]);
        assert!(form.validate().is_none());
        assert!(form.errors().contains("year"));
        form.set("year", "2025");
        assert!(!form.errors().contains("year"));
        assert!(form.errors().contains("target_books"));
    }

    #[test]
    fn server_errors_are_shown_inline() {
        let mut form: Form<ProgressSchema> = Form::with_values([("current_page", "900")]);
        assert!(form.validate().is_some());
        let err = ClientError::Api {
            status: 422,
            code: "validation_error".into(),
            message: "invalid input".into(),
            details: Some(serde_json::json!({ "current_page": ["current_page cannot exceed page count 320"] })),
        };
        form.apply_server_errors(&err);
        assert_eq!(form.field_errors("current_page").len(), 1);
    }
}
