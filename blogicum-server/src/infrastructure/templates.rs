use axum::http::StatusCode;
use tera::{Context, Tera};

/// Fixed pages served as HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Page {
    About,
    Rules,
    NotFound,
    CsrfFailure,
    ServerError,
}

impl Page {
    pub(crate) fn template(self) -> &'static str {
        match self {
            Page::About => "pages/about.html",
            Page::Rules => "pages/rules.html",
            Page::NotFound => "pages/404.html",
            Page::CsrfFailure => "pages/403csrf.html",
            Page::ServerError => "pages/500.html",
        }
    }

    pub(crate) fn status(self) -> StatusCode {
        match self {
            Page::About | Page::Rules => StatusCode::OK,
            Page::NotFound => StatusCode::NOT_FOUND,
            Page::CsrfFailure => StatusCode::FORBIDDEN,
            Page::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(crate) struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub(crate) fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../../templates/base.html")),
            ("pages/about.html", include_str!("../../templates/pages/about.html")),
            ("pages/rules.html", include_str!("../../templates/pages/rules.html")),
            ("pages/404.html", include_str!("../../templates/pages/404.html")),
            ("pages/403csrf.html", include_str!("../../templates/pages/403csrf.html")),
            ("pages/500.html", include_str!("../../templates/pages/500.html")),
        ])?;
        Ok(Self { tera })
    }

    pub(crate) fn render(&self, page: Page) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("status", &page.status().as_u16());
        self.tera.render(page.template(), &context)
    }
}
