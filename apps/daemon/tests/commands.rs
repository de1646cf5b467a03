use std::path::Path;
use std::time::Duration;

use quotesync_core::sync::SyncIssueKind;
use quotesync_core::Quote;
use quotesync_daemon::{build_state, cli::Commands, config::Config, run_command};
use tempfile::tempdir;

fn offline_config(store_path: &Path) -> Config {
    Config {
        api_url: "http://127.0.0.1:9/posts".to_string(),
        store_path: store_path.to_path_buf(),
        sync_interval: Duration::from_secs(60),
        request_timeout: Duration::from_millis(500),
        user_id: 1,
    }
}

#[tokio::test]
async fn fresh_store_starts_from_seed_and_exports() {
    let tmp = tempdir().unwrap();
    let config = offline_config(&tmp.path().join("quotes.json"));
    let state = build_state(&config).unwrap();
    assert_eq!(state.store.len(), 3);

    run_command(
        state.clone(),
        Commands::Add {
            text: "Keep shipping".to_string(),
            category: "Work".to_string(),
        },
    )
    .await
    .unwrap();

    let export_path = tmp.path().join("export.json");
    run_command(
        state.clone(),
        Commands::Export {
            path: export_path.clone(),
        },
    )
    .await
    .unwrap();

    let exported: Vec<Quote> =
        serde_json::from_str(&std::fs::read_to_string(&export_path).unwrap()).unwrap();
    assert_eq!(exported.len(), 4);
    assert_eq!(exported[3], Quote::new_local("Keep shipping", "Work").unwrap());

    // A second process sees the persisted collection.
    let reopened = build_state(&config).unwrap();
    assert_eq!(reopened.store.current(), exported);
}

#[tokio::test]
async fn import_rejects_non_array_file() {
    let tmp = tempdir().unwrap();
    let state = build_state(&offline_config(&tmp.path().join("quotes.json"))).unwrap();

    let bad = tmp.path().join("bad.json");
    std::fs::write(&bad, r#"{"text": "not an array"}"#).unwrap();
    let result = run_command(state.clone(), Commands::Import { path: bad }).await;
    assert!(result.is_err());
    assert_eq!(state.store.len(), 3);

    let good = tmp.path().join("good.json");
    std::fs::write(&good, r#"[{"id": 5, "text": "Imported", "category": "misc"}]"#).unwrap();
    run_command(state.clone(), Commands::Import { path: good })
        .await
        .unwrap();
    assert_eq!(state.store.unsynced().len(), 4);
}

#[tokio::test]
async fn sync_against_unreachable_remote_keeps_local_quotes() {
    let tmp = tempdir().unwrap();
    let state = build_state(&offline_config(&tmp.path().join("quotes.json"))).unwrap();
    let before = state.store.current();

    run_command(state.clone(), Commands::Sync).await.unwrap();

    let report = state.orchestrator.last_report().unwrap();
    assert!(report.remote_unavailable());
    assert!(report
        .errors
        .iter()
        .any(|e| e.kind == SyncIssueKind::PushFailed));
    assert_eq!(report.pushed, 0);
    assert_eq!(state.store.current(), before);
}
