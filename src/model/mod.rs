//! Domain types shared by the service and the client.

pub mod book;
pub mod goal;
pub mod review;
pub mod shelf;
pub mod statistics;

pub use book::*;
pub use goal::*;
pub use review::*;
pub use shelf::*;
pub use statistics::*;

/// Everything one owner has stored; input to the derived views.
#[derive(Clone, Debug, Default)]
pub struct LibrarySnapshot {
    pub books: Vec<Book>,
    pub shelves: Vec<ShelfEntry>,
    pub reviews: Vec<Review>,
}
