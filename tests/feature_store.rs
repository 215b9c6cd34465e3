use crossterm::event::KeyCode;
use serde_json::Value;
use std::sync::Arc;
use zhitou::pages::{feature_store_page, Outgoing, Page};
use zhitou::session::{ApiError, Backend};
use zhitou::storage::{establish_connection, FeatureCatalog, FeatureRepository};

async fn catalog(seed: bool, failure_rate: f64) -> FeatureCatalog {
    let db = establish_connection("sqlite::memory:").await.unwrap();
    if seed {
        FeatureRepository::seed_if_empty(&db).await.unwrap();
    }
    FeatureCatalog::new(Arc::new(db), failure_rate)
}

/// 执行页面发出的请求，把结果喂回页面，直到没有后续请求
async fn drive<P: Page>(page: &mut P, backend: &FeatureCatalog, mut out: Outgoing) -> Vec<String> {
    let mut seen = Vec::new();
    while !out.is_empty() {
        let mut next = Vec::new();
        for (op, req) in out {
            seen.push(req.to_string());
            let result: Result<Value, ApiError> = backend.execute(&req).await;
            next.extend(page.on_response(op, result));
        }
        out = next;
    }
    seen
}

async fn press<P: Page>(page: &mut P, backend: &FeatureCatalog, key: KeyCode) -> Vec<String> {
    let out = page.handle_key(key);
    drive(page, backend, out).await
}

#[tokio::test]
async fn seeded_catalog_lists_three_features() {
    let backend = catalog(true, 0.0).await;
    let mut page = feature_store_page();
    let out = page.activate();
    drive(&mut page, &backend, out).await;

    assert_eq!(page.list.records.len(), 3);
    assert_eq!(page.list.records[0].name, "动量因子");
    assert!(page.list.error.is_none());
}

#[tokio::test]
async fn seeding_is_skipped_when_catalog_has_rows() {
    let db = establish_connection("sqlite::memory:").await.unwrap();
    assert_eq!(FeatureRepository::seed_if_empty(&db).await.unwrap(), 3);
    assert_eq!(FeatureRepository::seed_if_empty(&db).await.unwrap(), 0);
    assert_eq!(FeatureRepository::list_all(&db).await.unwrap().len(), 3);
}

#[tokio::test]
async fn create_through_form_then_delete() {
    let backend = catalog(false, 0.0).await;
    let mut page = feature_store_page();
    let out = page.activate();
    drive(&mut page, &backend, out).await;
    assert!(page.list.records.is_empty());

    press(&mut page, &backend, KeyCode::Char('a')).await;
    for c in "换手率".chars() {
        press(&mut page, &backend, KeyCode::Char(c)).await;
    }
    // 类型 -> 版本
    press(&mut page, &backend, KeyCode::Tab).await;
    press(&mut page, &backend, KeyCode::Tab).await;
    for c in "v1".chars() {
        press(&mut page, &backend, KeyCode::Char(c)).await;
    }
    press(&mut page, &backend, KeyCode::Tab).await;
    for c in "张三".chars() {
        press(&mut page, &backend, KeyCode::Char(c)).await;
    }
    let calls = press(&mut page, &backend, KeyCode::Enter).await;
    assert_eq!(calls, vec!["POST /features/", "GET /features/"]);
    assert!(page.form.is_none());
    assert_eq!(page.list.records.len(), 1);
    let created = &page.list.records[0];
    assert_eq!(created.feature_type, "数值");
    assert_eq!(created.status, "active");
    let id = created.id;

    press(&mut page, &backend, KeyCode::Char('d')).await;
    assert!(page.list.pending_delete.is_some());
    let calls = press(&mut page, &backend, KeyCode::Char('y')).await;
    assert_eq!(
        calls,
        vec![format!("DELETE /features/{}", id), "GET /features/".to_string()]
    );
    assert!(page.list.records.is_empty());
}

#[tokio::test]
async fn name_length_boundary() {
    let backend = catalog(false, 0.0).await;
    let mut page = feature_store_page();
    page.open_create();
    let form = page.form.as_mut().unwrap();
    form.draft.name = "特".repeat(51);
    form.draft.version = "v1".to_string();
    form.draft.created_by = "李四".to_string();

    let calls = press(&mut page, &backend, KeyCode::Enter).await;
    assert!(calls.is_empty());
    assert_eq!(
        page.form.as_ref().unwrap().error.as_deref(),
        Some("特征名称不能超过50字")
    );

    page.form.as_mut().unwrap().draft.name = "特".repeat(50);
    let calls = press(&mut page, &backend, KeyCode::Enter).await;
    assert_eq!(calls, vec!["POST /features/", "GET /features/"]);
    assert!(page.form.is_none());
}

#[tokio::test]
async fn version_and_creator_length_boundary() {
    let backend = catalog(false, 0.0).await;
    let mut page = feature_store_page();
    page.open_create();
    let form = page.form.as_mut().unwrap();
    form.draft.name = "波动率".to_string();
    form.draft.version = "v".repeat(21);
    form.draft.created_by = "王".repeat(20);

    let calls = press(&mut page, &backend, KeyCode::Enter).await;
    assert!(calls.is_empty());
    assert_eq!(
        page.form.as_ref().unwrap().error.as_deref(),
        Some("版本不能超过20字")
    );

    let form = page.form.as_mut().unwrap();
    form.draft.version = "v".repeat(20);
    form.draft.created_by = "王".repeat(21);
    let calls = press(&mut page, &backend, KeyCode::Enter).await;
    assert!(calls.is_empty());
    assert_eq!(
        page.form.as_ref().unwrap().error.as_deref(),
        Some("创建人不能超过20字")
    );

    // 两个字段都恰好 20 字时可以保存
    page.form.as_mut().unwrap().draft.created_by = "王".repeat(20);
    let calls = press(&mut page, &backend, KeyCode::Enter).await;
    assert_eq!(calls, vec!["POST /features/", "GET /features/"]);
    assert!(page.form.is_none());
    assert_eq!(page.list.records[0].version, "v".repeat(20));
    assert_eq!(page.list.records[0].created_by, "王".repeat(20));
}

#[tokio::test]
async fn simulated_delete_failure_keeps_row() {
    let backend = catalog(true, 1.0).await;
    let mut page = feature_store_page();
    let out = page.activate();
    drive(&mut page, &backend, out).await;

    press(&mut page, &backend, KeyCode::Char('d')).await;
    let calls = press(&mut page, &backend, KeyCode::Char('y')).await;
    assert_eq!(calls, vec!["DELETE /features/1"]);
    assert_eq!(page.list.records.len(), 3);
    assert_eq!(page.list.notice.as_deref(), Some("删除失败，请重试"));
    assert!(!page.list.deleting);
}
