//! In-process stand-ins for the activities, subscriptions and search APIs.
#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use gym_index_sync::config::Config;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MockServices {
    /// Body served by `GET /actividades`.
    pub activities: Arc<Mutex<Value>>,
    /// Plans served by `GET /plans` and appended by `POST /plans`.
    pub plans: Arc<Mutex<Vec<Value>>>,
    /// Plan names `POST /plans` rejects with 400.
    pub rejected_plans: Arc<Mutex<HashSet<String>>>,
    /// Current index content keyed by document id.
    pub index: Arc<Mutex<BTreeMap<String, Value>>>,
    /// Document ids `POST /search/index` answers with 500.
    pub failing_ids: Arc<Mutex<HashSet<String>>>,
    /// Every index request's Authorization header, in order.
    pub index_auth: Arc<Mutex<Vec<Option<String>>>>,
    /// Page numbers requested on `GET /plans`.
    pub plan_pages: Arc<Mutex<Vec<usize>>>,
}

impl MockServices {
    pub fn with_activities(self, activities: Value) -> Self {
        *self.activities.lock().unwrap() = activities;
        self
    }

    pub fn with_plans(self, plans: Vec<Value>) -> Self {
        *self.plans.lock().unwrap() = plans;
        self
    }

    pub fn failing(self, ids: &[&str]) -> Self {
        self.failing_ids
            .lock()
            .unwrap()
            .extend(ids.iter().map(|s| s.to_string()));
        self
    }

    pub fn rejecting_plan(self, name: &str) -> Self {
        self.rejected_plans.lock().unwrap().insert(name.to_string());
        self
    }

    pub fn index_snapshot(&self) -> BTreeMap<String, Value> {
        self.index.lock().unwrap().clone()
    }

    pub fn index_requests(&self) -> usize {
        self.index_auth.lock().unwrap().len()
    }

    /// Serve on an ephemeral port; returns the base URL.
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/actividades", get(list_activities))
            .route("/plans", get(list_plans).post(create_plan))
            .route("/search/index", axum::routing::post(index_document))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<usize>,
    page_size: Option<usize>,
}

async fn list_activities(State(state): State<MockServices>) -> Json<Value> {
    Json(state.activities.lock().unwrap().clone())
}

async fn list_plans(State(state): State<MockServices>, Query(q): Query<PageQuery>) -> Json<Value> {
    let plans = state.plans.lock().unwrap().clone();
    let page = q.page.unwrap_or(1).max(1);
    let page_size = q.page_size.unwrap_or(10).max(1);
    state.plan_pages.lock().unwrap().push(page);

    let total_pages = plans.len().div_ceil(page_size);
    let items: Vec<Value> = plans
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    Json(json!({
        "plans": items,
        "total": state.plans.lock().unwrap().len(),
        "page": page,
        "page_size": page_size,
        "total_pages": total_pages
    }))
}

async fn create_plan(
    State(state): State<MockServices>,
    Json(mut plan): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let name = plan["nombre"].as_str().unwrap_or_default().to_string();
    if state.rejected_plans.lock().unwrap().contains(&name) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "plan rejected" })),
        );
    }

    let mut plans = state.plans.lock().unwrap();
    plan["id"] = json!(format!("p{}", plans.len() + 1));
    plans.push(plan.clone());
    (StatusCode::CREATED, Json(plan))
}

async fn index_document(
    State(state): State<MockServices>,
    headers: HeaderMap,
    Json(doc): Json<Value>,
) -> (StatusCode, String) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.index_auth.lock().unwrap().push(auth);

    let id = doc["id"].as_str().unwrap_or_default().to_string();
    if state.failing_ids.lock().unwrap().contains(&id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "index unavailable".to_string());
    }

    let existed = state.index.lock().unwrap().insert(id, doc).is_some();
    if existed {
        (StatusCode::OK, "updated".to_string())
    } else {
        (StatusCode::CREATED, "created".to_string())
    }
}

/// Config pointing every HTTP endpoint at `base`.
pub fn config_for(base: &str) -> Config {
    let mut cfg = Config::default();
    cfg.search.index_url = format!("{}/search/index", base);
    cfg.activities.list_url = format!("{}/actividades", base);
    cfg.plans.api_url = format!("{}/plans", base);
    cfg.http.timeout_secs = 5;
    cfg
}

/// A URL on a port nothing listens on.
pub fn closed_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

pub fn three_activities() -> Value {
    json!([
        {
            "id": 1, "titulo": "Yoga", "descripcion": "Clase suave", "categoria": "yoga",
            "instructor": "Ana", "dia": "Lunes", "horario_inicio": "09:00",
            "horario_final": "10:00", "lugares": 12, "sucursal_id": 1
        },
        {
            "id": 2, "titulo": "Spinning", "categoria": "cardio", "instructor": "Luis",
            "dia": "Martes", "horario_inicio": "18:00", "horario_final": "19:00", "lugares": 0
        },
        {
            "id": 3, "titulo": "Funcional", "categoria": "fuerza", "instructor": "Sofía",
            "dia": "Jueves", "horario_inicio": "07:00", "horario_final": "08:00",
            "lugares": 20, "sucursal_id": null
        }
    ])
}
