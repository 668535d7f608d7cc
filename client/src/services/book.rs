use crate::error::Result;
use crate::http::ApiClient;
use booknest::cover::CoverUpload;
use booknest::extractors::COVER_FIELD;
use booknest::model::{Book, BookFilter, BookPatch, NewBook};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use uuid::Uuid;

#[derive(Clone, Debug)]
pub struct BookService {
    api: ApiClient,
}

fn filter_query(filter: &BookFilter) -> Vec<(&'static str, String)> {
    let mut query = vec![("page", filter.page.to_string()), ("limit", filter.limit.to_string())];
    if let Some(s) = &filter.search {
        query.push(("search", s.clone()));
    }
    if let Some(g) = filter.genre {
        query.push(("genre", g.as_str().to_string()));
    }
    if let Some(a) = &filter.author {
        query.push(("author", a.clone()));
    }
    query
}

/// Text parts for every set field; absent fields are left out of the form.
fn text_fields(patch: &BookPatch) -> Vec<(&'static str, String)> {
    let mut fields = Vec::new();
    if let Some(v) = &patch.title {
        fields.push(("title", v.clone()));
    }
    if let Some(v) = &patch.author {
        fields.push(("author", v.clone()));
    }
    if let Some(v) = patch.year {
        fields.push(("year", v.to_string()));
    }
    if let Some(v) = patch.genre {
        fields.push(("genre", v.as_str().to_string()));
    }
    if let Some(v) = patch.page_count {
        fields.push(("page_count", v.to_string()));
    }
    if let Some(v) = &patch.isbn {
        fields.push(("isbn", v.clone()));
    }
    if let Some(v) = &patch.synopsis {
        fields.push(("synopsis", v.clone()));
    }
    fields
}

fn multipart(fields: Vec<(&'static str, String)>, cover: Option<&CoverUpload>) -> Result<Form> {
    let mut form = fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));
    if let Some(cover) = cover {
        let part = Part::bytes(cover.bytes.clone())
            .file_name(COVER_FIELD)
            .mime_str(&cover.content_type)?;
        form = form.part(COVER_FIELD, part);
    }
    Ok(form)
}

impl BookService {
    pub fn new(api: ApiClient) -> Self {
        BookService { api }
    }

    pub async fn list(&self, filter: &BookFilter) -> Result<Vec<Book>> {
        self.api.get("/book", &filter_query(filter)).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Book> {
        self.api.get(&format!("/book/{}", id), &[]).await
    }

    /// Always sent as multipart so a cover can ride along.
    pub async fn create(&self, book: &NewBook, cover: Option<&CoverUpload>) -> Result<Book> {
        let patch = BookPatch {
            title: Some(book.title.clone()),
            author: Some(book.author.clone()),
            year: Some(book.year),
            genre: Some(book.genre),
            page_count: Some(book.page_count),
            isbn: book.isbn.clone(),
            synopsis: book.synopsis.clone(),
        };
        let form = multipart(text_fields(&patch), cover)?;
        self.api.send_multipart(Method::POST, "/book", form).await
    }

    pub async fn update(&self, id: Uuid, patch: &BookPatch, cover: Option<&CoverUpload>) -> Result<Book> {
        let path = format!("/book/{}", id);
        match cover {
            Some(_) => {
                let form = multipart(text_fields(patch), cover)?;
                self.api.send_multipart(Method::PUT, &path, form).await
            }
            None => {
                let body: serde_json::Map<String, serde_json::Value> = text_fields(patch)
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), serde_json::Value::String(v)))
                    .collect();
                self.api.send_json(Method::PUT, &path, &body).await
            }
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.api.delete(&format!("/book/{}", id)).await
    }
}
