// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, storage::ExamStore, utils::hash::AdminCredentials};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ExamStore>,
    pub config: Config,
    pub admin: Arc<AdminCredentials>,
}

impl FromRef<AppState> for Arc<dyn ExamStore> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<AdminCredentials> {
    fn from_ref(state: &AppState) -> Self {
        state.admin.clone()
    }
}
