//! One service per resource, each a typed view over [`ApiClient`].

mod book;
mod goal;
mod review;
mod shelf;
mod statistics;

pub use book::BookService;
pub use goal::GoalService;
pub use review::ReviewService;
pub use shelf::ShelfService;
pub use statistics::StatisticsService;

use crate::http::ApiClient;

/// All services sharing one connection pool and owner.
#[derive(Clone, Debug)]
pub struct Services {
    pub books: BookService,
    pub shelf: ShelfService,
    pub reviews: ReviewService,
    pub goals: GoalService,
    pub statistics: StatisticsService,
}

impl Services {
    pub fn new(api: ApiClient) -> Self {
        Services {
            books: BookService::new(api.clone()),
            shelf: ShelfService::new(api.clone()),
            reviews: ReviewService::new(api.clone()),
            goals: GoalService::new(api.clone()),
            statistics: StatisticsService::new(api),
        }
    }
}
