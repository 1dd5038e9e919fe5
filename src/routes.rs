use crate::models::MovieId;
use serde::Deserialize;

/// Pre-filter carried by the home route's query string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HomeFilter {
    #[default]
    None,
    Genre(i64),
    Keyword { id: i64, name: Option<String> },
}

/// Raw `?genre=&keyword=&name=` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HomeQuery {
    pub genre: Option<String>,
    pub keyword: Option<String>,
    pub name: Option<String>,
}

impl HomeQuery {
    /// Genre wins over keyword; ids that are not integers are ignored.
    pub fn filter(&self) -> HomeFilter {
        if let Some(id) = parse_id(self.genre.as_deref()) {
            return HomeFilter::Genre(id);
        }
        if let Some(id) = parse_id(self.keyword.as_deref()) {
            let name = self
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(|n| n.to_string());
            return HomeFilter::Keyword { id, name };
        }
        HomeFilter::None
    }
}

fn parse_id(raw: Option<&str>) -> Option<i64> {
    raw.map(str::trim).and_then(|s| s.parse().ok())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home(HomeFilter),
    Movie(MovieId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home(HomeFilter::None) => "/".to_string(),
            Route::Home(HomeFilter::Genre(id)) => format!("/?genre={id}"),
            Route::Home(HomeFilter::Keyword { id, name }) => match name {
                Some(name) => format!("/?keyword={id}&name={}", urlencoding::encode(name)),
                None => format!("/?keyword={id}"),
            },
            Route::Movie(id) => format!("/movie/{id}"),
        }
    }
}
