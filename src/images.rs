//! Image CDN URLs for paths returned by TMDB.

const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Poster in a results grid.
    GridPoster,
    /// Poster on the movie detail page.
    DetailPoster,
    Backdrop,
    Profile,
}

impl ImageKind {
    fn size(self) -> &'static str {
        match self {
            ImageKind::GridPoster => "w500",
            ImageKind::DetailPoster => "w300",
            ImageKind::Backdrop => "original",
            ImageKind::Profile => "w200",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            ImageKind::GridPoster => "https://via.placeholder.com/500x750?text=No+Image",
            ImageKind::DetailPoster => "https://via.placeholder.com/300x450?text=No+Poster",
            ImageKind::Backdrop => "https://via.placeholder.com/1920x1080?text=No+Backdrop",
            ImageKind::Profile => "https://via.placeholder.com/200x300?text=No+Image",
        }
    }
}

pub fn image_url(path: Option<&str>, kind: ImageKind) -> String {
    match path.filter(|p| !p.is_empty()) {
        Some(p) => format!("{IMAGE_BASE}/{}{p}", kind.size()),
        None => kind.placeholder().to_string(),
    }
}

pub fn youtube_embed_url(key: &str) -> String {
    format!("https://www.youtube.com/embed/{key}?autoplay=1")
}
