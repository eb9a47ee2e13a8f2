// tests/providers_news_api.rs
use signal_desk::ingest::providers::news_api::{NewsApiFlavor, NewsApiProvider};
use signal_desk::ingest::types::SourceProvider;

const NEWSAPI_JSON: &str = include_str!("fixtures/newsapi.json");
const GNEWS_JSON: &str = include_str!("fixtures/gnews.json");

#[tokio::test]
async fn newsapi_fixture_merges_description_and_content() {
    let provider = NewsApiProvider::from_fixture(NewsApiFlavor::NewsApi, NEWSAPI_JSON);
    assert_eq!(provider.name(), "NewsAPI");

    let items = provider.fetch_latest().await.expect("newsapi parse ok");
    assert_eq!(items.len(), 1, "removed article with empty url is skipped");

    let a = &items[0];
    assert_eq!(a.title, "Open-source model tops reasoning benchmarks");
    assert_eq!(
        a.body_text,
        "A new open-source release beats larger models on several benchmarks. \
         The release includes weights and an inference API for deployment"
    );
    assert_eq!(a.author.as_deref(), Some("Sam Writer"));
    assert_eq!(a.source_domain, "theverge.com");
    assert!(a.published_at.is_some());
}

#[tokio::test]
async fn gnews_fixture_falls_back_to_source_name() {
    let provider = NewsApiProvider::from_fixture(NewsApiFlavor::GNews, GNEWS_JSON);
    assert_eq!(provider.name(), "GNews");

    let items = provider.fetch_latest().await.expect("gnews parse ok");
    assert_eq!(items.len(), 1);
    let a = &items[0];
    assert_eq!(a.author.as_deref(), Some("Example News"));
    assert_eq!(
        a.body_text,
        "The company plans a wider deployment of its arms. \
         Investors backed the startup's architecture for fleet control"
    );
    assert_eq!(a.source_domain, "news.example.com");
}

#[tokio::test]
async fn http_errors_never_carry_the_api_key() {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(2))
        .build()
        .unwrap();
    let url = "http://127.0.0.1:1/v2/everything?q=ai&apiKey=SECRET123";
    let provider = NewsApiProvider::from_url(NewsApiFlavor::NewsApi, url, client);

    let err = provider.fetch_latest().await.unwrap_err();
    assert!(!format!("{err:?}").contains("SECRET123"), "{err:?}");
    assert!(!format!("{err:#}").contains("SECRET123"), "{err:#}");
}
