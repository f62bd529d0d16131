use std::collections::HashMap;
use std::sync::Arc;

use apostila::error::{AppError, Result};
use apostila::models::Config;
use apostila::pipeline::{RunStatus, run_crawler};
use apostila::storage::{LocalStorage, ScheduleStorage};
use apostila::utils::http::PageSource;
use async_trait::async_trait;
use tempfile::TempDir;

struct StaticSite(HashMap<String, String>);

#[async_trait]
impl PageSource for StaticSite {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.0
            .get(url)
            .map(|html| html.as_bytes().to_vec())
            .ok_or_else(|| AppError::transport(url, "timed out"))
    }
}

fn config() -> Arc<Config> {
    let mut config = Config::default();
    config.site.base_url = "https://wol.test".to_string();
    config.site.index_url = "https://wol.test/pt/apostilas/apostila-2026".to_string();
    config.site.month_path_segment = "/apostila-2026/".to_string();
    config.crawler.retry_delay_ms = 0;
    config.crawler.request_delay_ms = 0;
    Arc::new(config)
}

fn site() -> StaticSite {
    let pages = [
        (
            "https://wol.test/pt/apostilas/apostila-2026",
            r#"<ul class="directory">
                 <li class="row"><a href="/pt/apostilas/apostila-2026/janeiro">Janeiro</a></li>
               </ul>"#,
        ),
        (
            "https://wol.test/pt/apostilas/apostila-2026/janeiro",
            r#"<ul class="directory">
                 <li class="row"><a href="/pt/capa">Apostila da Reunião</a></li>
                 <li class="row"><a href="/pt/semana/1">5-11 de janeiro</a></li>
               </ul>"#,
        ),
        (
            "https://wol.test/pt/semana/1",
            r#"<html><body>
                 <h1 id="p1">5-11 de janeiro</h1>
                 <h2>Tesouros</h2>
                 <h3>Leitura da Bíblia (4 min)</h3>
                 <p>Is 1:1-9</p>
               </body></html>"#,
        ),
    ];
    StaticSite(
        pages
            .into_iter()
            .map(|(url, html)| (url.to_string(), html.to_string()))
            .collect(),
    )
}

#[tokio::test]
async fn crawl_persists_single_week() {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path().join("agenda_2026.json"));

    let status = run_crawler(config(), site(), &storage).await.unwrap();
    assert!(matches!(status, RunStatus::Saved { count: 1, .. }));

    let raw = std::fs::read_to_string(storage.path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {
                "semana": "5-11 de janeiro",
                "secoes": [
                    {
                        "titulo": "Tesouros",
                        "partes": [
                            {"titulo_parte": "Leitura da Bíblia", "tempo": 4, "tem_contador": false}
                        ]
                    }
                ]
            }
        ])
    );
}

#[tokio::test]
async fn crawl_without_weeks_reports_empty() {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path().join("agenda_2026.json"));

    let mut pages = site().0;
    pages.remove("https://wol.test/pt/semana/1");

    let status = run_crawler(config(), StaticSite(pages), &storage)
        .await
        .unwrap();
    assert_eq!(status, RunStatus::Empty);
    assert!(storage.load_schedule().await.unwrap().is_none());
}

#[tokio::test]
async fn crawl_fails_when_index_unreachable() {
    let dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(dir.path().join("agenda_2026.json"));

    let result = run_crawler(config(), StaticSite(HashMap::new()), &storage).await;
    assert!(matches!(result, Err(AppError::Fetch { .. })));
}
