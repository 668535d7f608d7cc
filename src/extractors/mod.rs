//! Request extractors shared by the handlers.

mod book_form;
mod json_body;
mod owner;

pub use book_form::{BookForm, COVER_FIELD};
pub use json_body::JsonObject;
pub use owner::{OwnerId, OWNER_ID_HEADER};
