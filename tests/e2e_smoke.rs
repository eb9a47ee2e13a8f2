// tests/e2e_smoke.rs
// All provider fixtures → ingest::run_once → Pipeline with the built-in seed config.

use signal_desk::ingest::providers::{
    arxiv::ArxivProvider,
    hn::HackerNewsProvider,
    news_api::{NewsApiFlavor, NewsApiProvider},
    rss::RssProvider,
};
use signal_desk::ingest::types::SourceProvider;
use signal_desk::ingest::run_once;
use signal_desk::{Badge, EngineConfig, Pipeline, ReasonCode};

fn fixture_providers() -> Vec<Box<dyn SourceProvider>> {
    vec![
        Box::new(HackerNewsProvider::from_fixture(include_str!("fixtures/hn_search.json"))),
        Box::new(ArxivProvider::from_fixture(include_str!("fixtures/arxiv_atom.xml"))),
        Box::new(RssProvider::from_fixture("Tech Wire", include_str!("fixtures/news_rss.xml"))),
        Box::new(NewsApiProvider::from_fixture(
            NewsApiFlavor::NewsApi,
            include_str!("fixtures/newsapi.json"),
        )),
        Box::new(NewsApiProvider::from_fixture(
            NewsApiFlavor::GNews,
            include_str!("fixtures/gnews.json"),
        )),
    ]
}

#[tokio::test]
async fn fixtures_flow_into_sectioned_batch() {
    let cfg = EngineConfig::default_seed();
    let (items, ingest) = run_once(&fixture_providers(), &cfg.dedup).await;
    assert_eq!(ingest.fetched, 10);
    assert_eq!(ingest.duplicates, 1, "cross-listed arxiv entry");
    assert_eq!(items.len(), 9);

    let out = Pipeline::new(cfg).run(items);
    assert_eq!(out.stats.accepted, 7);
    assert_eq!(out.stats.trusted, 3);
    assert_eq!(out.stats.rejected_noise, 1);
    assert_eq!(out.stats.rejected_insufficient, 1);

    assert_eq!(
        out.batch.section_names(),
        vec!["Industry", "Machine Learning", "Vision"]
    );

    let industry = out.batch.get("Industry").unwrap();
    let titles: Vec<&str> = industry.items.iter().map(|e| e.item.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "New paper from the lab",
            "Open-source model tops reasoning benchmarks",
            "Quantization of transformer weights without accuracy loss",
            "Chipmaker ships new inference accelerator - benchmarks inside",
            "Robotics startup raises funds for warehouse arms",
        ]
    );
    assert_eq!(industry.items[0].reason, ReasonCode::TrustedSource);
    assert_eq!(industry.items[0].badge, Some(Badge::Trusted));
    assert_eq!(industry.items[1].badge, Some(Badge::HighPriority));
    assert_eq!(industry.items[4].badge, None);
    assert_eq!(industry.items[4].byline(), "Example News");

    let ml = out.batch.get("Machine Learning").unwrap();
    assert_eq!(ml.items.len(), 1);
    assert_eq!(ml.items[0].item.category_code.as_deref(), Some("cs.LG"));
}

#[tokio::test]
async fn batch_serializes_for_the_renderer() {
    let cfg = EngineConfig::default_seed();
    let (items, _) = run_once(&fixture_providers(), &cfg.dedup).await;
    let out = Pipeline::new(cfg).run(items);

    let v = serde_json::to_value(&out.batch).unwrap();
    let first = &v["sections"][0];
    assert_eq!(first["name"], "Industry");
    assert_eq!(first["items"][0]["reason"], "TRUSTED_SOURCE");
    assert_eq!(first["items"][0]["badge"], "trusted");
    assert!(first["items"][0].get("index").is_none());
}
