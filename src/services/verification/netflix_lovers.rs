/// Netflix Lovers Italia verifier
///
/// Scrapes the site's WordPress search page. Flow:
/// 1. Search: /?s={slug} → first `article` gives title, link and thumbnail
/// 2. Article: GET link → first two paragraphs of `div.entry-content`
///
/// When the search request itself fails, the same page is fetched once more
/// and only its visible text is inspected. A match found that way carries the
/// search URL as its article URL and no image or description.
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client as HttpClient, Url};
use scraper::{ElementRef, Html, Selector};
use urlencoding::encode;

use super::{NotFound, ShowVerifier};
use crate::{
    error::{AppError, AppResult},
    models::VerificationResult,
    services::sanitize::sanitize_title,
};

const SOURCE_LABEL: &str = "Netflix Lovers Italia";
const NO_RESULTS_MARKER: &str = "Nessun risultato";
const DESCRIPTION_PARAGRAPHS: usize = 2;

/// CSS selectors describing one site's search and article markup
#[derive(Debug)]
pub struct SiteSelectors {
    /// One element per search result
    pub result: Selector,
    /// Link inside a result
    pub link: Selector,
    /// Thumbnail inside a result
    pub image: Selector,
    /// Main content container of an article page
    pub content: Selector,
    pub paragraph: Selector,
    /// Text shown by the search page when nothing matched
    pub no_results_marker: String,
}

impl SiteSelectors {
    pub fn new(
        result: &str,
        link: &str,
        image: &str,
        content: &str,
        paragraph: &str,
        no_results_marker: &str,
    ) -> AppResult<Self> {
        Ok(Self {
            result: parse_selector(result)?,
            link: parse_selector(link)?,
            image: parse_selector(image)?,
            content: parse_selector(content)?,
            paragraph: parse_selector(paragraph)?,
            no_results_marker: no_results_marker.to_string(),
        })
    }

    /// Markup of the Netflix Lovers WordPress theme
    pub fn netflix_lovers() -> AppResult<Self> {
        Self::new("article", "a", "img", "div.entry-content", "p", NO_RESULTS_MARKER)
    }
}

fn parse_selector(css: &str) -> AppResult<Selector> {
    Selector::parse(css)
        .map_err(|e| AppError::Internal(format!("Invalid CSS selector '{}': {}", css, e)))
}

/// First search result, before the article page is fetched
#[derive(Debug, Clone, PartialEq)]
struct SearchHit {
    title: Option<String>,
    article_url: String,
    image_url: Option<String>,
}

#[derive(Clone)]
pub struct NetflixLoversClient {
    http_client: HttpClient,
    base_url: String,
    timeout: Duration,
    selectors: Arc<SiteSelectors>,
}

impl NetflixLoversClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            selectors: Arc::new(SiteSelectors::netflix_lovers()?),
        })
    }

    /// Swap the markup description, e.g. after a theme change
    pub fn with_selectors(mut self, selectors: SiteSelectors) -> Self {
        self.selectors = Arc::new(selectors);
        self
    }

    pub fn search_url(&self, title: &str) -> String {
        format!("{}/?s={}", self.base_url, encode(&sanitize_title(title)))
    }

    async fn fetch_html(&self, url: &str) -> Result<String, reqwest::Error> {
        self.http_client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    /// Picks the first search result out of a search page
    fn parse_search_page(&self, html: &str, search_url: &str) -> Result<SearchHit, NotFound> {
        let document = Html::parse_document(html);

        let first = document
            .select(&self.selectors.result)
            .next()
            .ok_or(NotFound::NoResults)?;

        let link = first
            .select(&self.selectors.link)
            .next()
            .ok_or(NotFound::NoLink)?;

        let href = link
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or(NotFound::NoLink)?;

        let article_url = Url::parse(search_url)
            .and_then(|base| base.join(href))
            .map(|url| url.to_string())
            .unwrap_or_else(|_| href.to_string());

        let title = link
            .value()
            .attr("title")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| non_empty(collapsed_text(&link)));

        let image_url = first
            .select(&self.selectors.image)
            .next()
            .and_then(|img| {
                let src = img
                    .value()
                    .attr("src")
                    .map(str::trim)
                    .filter(|src| !src.is_empty() && !src.starts_with("data:"));
                src.or_else(|| img.value().attr("data-src").map(str::trim))
            })
            .filter(|src| !src.is_empty())
            .map(str::to_string);

        Ok(SearchHit {
            title,
            article_url,
            image_url,
        })
    }

    /// Leading paragraphs of an article's main content
    fn parse_article_description(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let content = document.select(&self.selectors.content).next()?;

        let paragraphs: Vec<String> = content
            .select(&self.selectors.paragraph)
            .take(DESCRIPTION_PARAGRAPHS)
            .map(|p| collapsed_text(&p))
            .collect();

        non_empty(paragraphs.join(" ").trim().to_string())
    }

    /// Error pages are never mined for a description, so a non-2xx article
    /// response counts as a failed fetch.
    async fn fetch_description(&self, article_url: &str) -> Option<String> {
        match self.fetch_html(article_url).await {
            Ok(html) => self.parse_article_description(&html),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    article_url = %article_url,
                    "Article fetch failed, continuing without description"
                );
                None
            }
        }
    }

    /// Second attempt after the search request failed: plain text only
    async fn fallback_lookup(
        &self,
        title: &str,
        search_url: &str,
    ) -> Result<VerificationResult, NotFound> {
        let html = self.fetch_html(search_url).await.map_err(|e| {
            tracing::warn!(error = %e, search_url = %search_url, "Fallback fetch failed");
            NotFound::Unreachable(e.to_string())
        })?;

        let text = page_text(&html);
        if text.is_empty() || text.contains(&self.selectors.no_results_marker) {
            tracing::warn!(title = %title, "No search results found in fallback text");
            return Err(NotFound::NoResults);
        }

        Ok(VerificationResult {
            title: title.to_string(),
            found: true,
            source: SOURCE_LABEL.to_string(),
            search_url: search_url.to_string(),
            article_url: search_url.to_string(),
            image_url: None,
            description: None,
        })
    }
}

#[async_trait::async_trait]
impl ShowVerifier for NetflixLoversClient {
    async fn lookup(&self, title: &str) -> Result<VerificationResult, NotFound> {
        let search_url = self.search_url(title);
        tracing::info!(title = %title, search_url = %search_url, "Searching Netflix Lovers");

        let page = match self.fetch_html(&search_url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(error = %e, title = %title, "Search request failed, trying text fallback");
                return self.fallback_lookup(title, &search_url).await;
            }
        };

        let hit = self.parse_search_page(&page, &search_url).map_err(|reason| {
            tracing::warn!(title = %title, reason = %reason, "No usable search result");
            reason
        })?;

        let description = self.fetch_description(&hit.article_url).await;

        tracing::info!(
            title = %title,
            article_url = %hit.article_url,
            has_image = hit.image_url.is_some(),
            has_description = description.is_some(),
            "Show verified"
        );

        Ok(VerificationResult {
            title: hit.title.unwrap_or_else(|| title.to_string()),
            found: true,
            source: SOURCE_LABEL.to_string(),
            search_url,
            article_url: hit.article_url,
            image_url: hit.image_url,
            description,
        })
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Element text with runs of whitespace collapsed to single spaces
fn collapsed_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Visible text of a whole page, skipping scripts and styles
fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut words = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(ElementRef::wrap)
            .map(|parent| matches!(parent.value().name(), "script" | "style" | "noscript"))
            .unwrap_or(false);
        if !hidden {
            words.extend(text.split_whitespace());
        }
    }

    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Query, State},
        http::StatusCode,
        response::Html as HtmlResponse,
        routing::get,
        Router,
    };
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SEARCH_PAGE: &str = r#"
        <html><body>
          <main>
            <article class="post">
              <a href="/serie-tv/dark-recensione/" title="Dark: la recensione">
                <img src="https://cdn.example.test/dark.jpg" alt="Dark">
              </a>
            </article>
            <article class="post">
              <a href="/serie-tv/altro/">Altro</a>
            </article>
          </main>
        </body></html>
    "#;

    const ARTICLE_PAGE: &str = r#"
        <html><body>
          <div class="entry-content">
            <p>Dark è una serie tedesca   creata da Baran bo Odar.</p>
            <p>Quattro famiglie cercano un bambino scomparso.</p>
            <p>Questo paragrafo non serve.</p>
          </div>
        </body></html>
    "#;

    const EMPTY_SEARCH_PAGE: &str = r#"
        <html><body><h1>Nessun risultato</h1><p>Prova con altre parole.</p></body></html>
    "#;

    async fn search(Query(params): Query<HashMap<String, String>>) -> HtmlResponse<String> {
        let page = match params.get("s").map(String::as_str) {
            Some("dark") => SEARCH_PAGE.to_string(),
            Some("no-link") => "<article><span>Senza link</span></article>".to_string(),
            Some("text-link") => {
                r#"<article><a href="https://other.test/post">  Il   Trono di Spade </a>
                   <img src="data:image/gif;base64,R0lG" data-src="https://cdn.example.test/got.jpg"></article>"#
                    .to_string()
            }
            _ => EMPTY_SEARCH_PAGE.to_string(),
        };
        HtmlResponse(page)
    }

    async fn spawn_site(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str) -> NetflixLoversClient {
        NetflixLoversClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_search_url_uses_slug() {
        let client = client("https://www.netflixlovers.it/");
        assert_eq!(
            client.search_url("Stranger Things 4!"),
            "https://www.netflixlovers.it/?s=stranger-things-4"
        );
    }

    #[test]
    fn test_parse_search_page_takes_first_result() {
        let client = client("https://www.netflixlovers.it");
        let hit = client
            .parse_search_page(SEARCH_PAGE, "https://www.netflixlovers.it/?s=dark")
            .unwrap();

        assert_eq!(hit.title.as_deref(), Some("Dark: la recensione"));
        assert_eq!(
            hit.article_url,
            "https://www.netflixlovers.it/serie-tv/dark-recensione/"
        );
        assert_eq!(
            hit.image_url.as_deref(),
            Some("https://cdn.example.test/dark.jpg")
        );
    }

    #[test]
    fn test_parse_search_page_without_results() {
        let client = client("https://www.netflixlovers.it");
        let result = client.parse_search_page(EMPTY_SEARCH_PAGE, "https://www.netflixlovers.it/?s=x");
        assert_eq!(result, Err(NotFound::NoResults));
    }

    #[test]
    fn test_parse_search_page_without_link() {
        let client = client("https://www.netflixlovers.it");
        let result = client.parse_search_page(
            "<article><a>no href</a></article>",
            "https://www.netflixlovers.it/?s=x",
        );
        assert_eq!(result, Err(NotFound::NoLink));
    }

    #[test]
    fn test_parse_article_description_joins_two_paragraphs() {
        let client = client("https://www.netflixlovers.it");
        let description = client.parse_article_description(ARTICLE_PAGE).unwrap();
        assert_eq!(
            description,
            "Dark è una serie tedesca creata da Baran bo Odar. Quattro famiglie cercano un bambino scomparso."
        );
    }

    #[test]
    fn test_parse_article_description_without_content() {
        let client = client("https://www.netflixlovers.it");
        assert_eq!(
            client.parse_article_description("<html><body><p>Orphan</p></body></html>"),
            None
        );
    }

    #[test]
    fn test_custom_selectors() {
        let selectors =
            SiteSelectors::new("li.hit", "a.title", "img", "section", "p", "No results").unwrap();
        let client = client("https://example.test").with_selectors(selectors);

        let hit = client
            .parse_search_page(
                r#"<ul><li class="hit"><a class="title" href="/x">X</a></li></ul>"#,
                "https://example.test/?s=x",
            )
            .unwrap();
        assert_eq!(hit.article_url, "https://example.test/x");
        assert_eq!(hit.title.as_deref(), Some("X"));
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let result = SiteSelectors::new("article[", "a", "img", "div", "p", "none");
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_page_text_skips_scripts() {
        let text = page_text(
            "<html><head><script>var x = 1;</script><style>p{}</style></head>\
             <body><p>Hello   <b>world</b></p></body></html>",
        );
        assert_eq!(text, "Hello world");
    }

    #[tokio::test]
    async fn test_lookup_found_with_description() {
        let app = Router::new()
            .route("/", get(search))
            .route("/serie-tv/dark-recensione/", get(|| async { HtmlResponse(ARTICLE_PAGE) }));
        let base_url = spawn_site(app).await;

        let result = client(&base_url).lookup("Dark").await.unwrap();

        assert!(result.found);
        assert_eq!(result.title, "Dark: la recensione");
        assert_eq!(result.source, "Netflix Lovers Italia");
        assert_eq!(result.search_url, format!("{}/?s=dark", base_url));
        assert_eq!(
            result.article_url,
            format!("{}/serie-tv/dark-recensione/", base_url)
        );
        assert_eq!(
            result.image_url.as_deref(),
            Some("https://cdn.example.test/dark.jpg")
        );
        assert!(result
            .description
            .unwrap()
            .starts_with("Dark è una serie tedesca"));
    }

    #[tokio::test]
    async fn test_lookup_survives_article_failure() {
        // Article link points to an external host that is not served here
        let base_url = spawn_site(Router::new().route("/", get(search))).await;

        let result = NetflixLoversClient::new(&base_url, Duration::from_millis(500))
            .unwrap()
            .lookup("Text Link")
            .await
            .unwrap();

        assert_eq!(result.title, "Il Trono di Spade");
        assert_eq!(result.article_url, "https://other.test/post");
        assert_eq!(
            result.image_url.as_deref(),
            Some("https://cdn.example.test/got.jpg")
        );
        assert_eq!(result.description, None);
    }

    #[tokio::test]
    async fn test_article_error_page_gives_no_description() {
        let app = Router::new().route("/", get(search)).route(
            "/serie-tv/dark-recensione/",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, HtmlResponse(ARTICLE_PAGE)) }),
        );
        let base_url = spawn_site(app).await;

        let result = client(&base_url).lookup("Dark").await.unwrap();

        assert!(result.found);
        assert_eq!(
            result.article_url,
            format!("{}/serie-tv/dark-recensione/", base_url)
        );
        assert_eq!(result.description, None);
    }

    #[tokio::test]
    async fn test_lookup_no_results() {
        let base_url = spawn_site(Router::new().route("/", get(search))).await;
        let result = client(&base_url).lookup("Unknown Show").await;
        assert_eq!(result, Err(NotFound::NoResults));
    }

    #[tokio::test]
    async fn test_lookup_result_without_link() {
        let base_url = spawn_site(Router::new().route("/", get(search))).await;
        let result = client(&base_url).lookup("No Link").await;
        assert_eq!(result, Err(NotFound::NoLink));
    }

    #[tokio::test]
    async fn test_lookup_404_is_not_found() {
        let app = Router::new().fallback(|| async { (StatusCode::NOT_FOUND, "missing") });
        let base_url = spawn_site(app).await;

        let result = client(&base_url).lookup("Dark").await;
        assert!(matches!(result, Err(NotFound::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_lookup_timeout_is_not_found() {
        let app = Router::new().route(
            "/",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                HtmlResponse(SEARCH_PAGE)
            }),
        );
        let base_url = spawn_site(app).await;

        let result = NetflixLoversClient::new(&base_url, Duration::from_millis(100))
            .unwrap()
            .lookup("Dark")
            .await;
        assert!(matches!(result, Err(NotFound::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_lookup_unreachable_host_is_not_found() {
        let result = NetflixLoversClient::new("http://127.0.0.1:9", Duration::from_millis(500))
            .unwrap()
            .lookup("Dark")
            .await;
        assert!(matches!(result, Err(NotFound::Unreachable(_))));
    }

    async fn flaky_search(State(hits): State<Arc<AtomicUsize>>) -> (StatusCode, HtmlResponse<&'static str>) {
        if hits.fetch_add(1, Ordering::SeqCst) == 0 {
            (StatusCode::SERVICE_UNAVAILABLE, HtmlResponse("busy"))
        } else {
            (StatusCode::OK, HtmlResponse(SEARCH_PAGE))
        }
    }

    #[tokio::test]
    async fn test_fallback_result_has_normalized_shape() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/", get(flaky_search))
            .with_state(hits.clone());
        let base_url = spawn_site(app).await;

        let result = client(&base_url).lookup("Dark").await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(result.found);
        assert_eq!(result.title, "Dark");
        assert_eq!(result.article_url, result.search_url);
        assert_eq!(result.image_url, None);
        assert_eq!(result.description, None);
    }

    #[tokio::test]
    async fn test_fallback_honours_no_results_marker() {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                        (StatusCode::BAD_GATEWAY, HtmlResponse(""))
                    } else {
                        (StatusCode::OK, HtmlResponse(EMPTY_SEARCH_PAGE))
                    }
                }),
            )
            .with_state(hits);
        let base_url = spawn_site(app).await;

        let result = client(&base_url).lookup("Dark").await;
        assert_eq!(result, Err(NotFound::NoResults));
    }
}
