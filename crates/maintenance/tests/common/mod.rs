use serde_json::json;
use tourney_core::index::IndexKey;
use tourney_core::models::Team;
use tourney_db::memory::{MemoryConnector, MemoryStore};
use tourney_db::ConnectOptions;

/// Connection options the memory connector accepts.
pub fn test_options() -> ConnectOptions {
    ConnectOptions::new("mongodb://localhost:27017", "tourney_test")
}

/// Build a team document, with `name` explicitly `null` when `None`.
pub fn team(id: u32, name: Option<&str>) -> serde_json::Value {
    let team = Team {
        name: name.map(str::to_string),
        tournament: "spring-open".to_string(),
        team_name: None,
        members: vec![],
    };
    let mut doc = serde_json::to_value(team).expect("team should serialize");
    doc["_id"] = json!(id);
    doc
}

/// A `teams` collection with `unnamed` null-name records and `named` good ones.
pub fn seeded_teams(unnamed: u32, named: u32) -> MemoryStore {
    let store = MemoryStore::new();
    store.insert_many("teams", (0..unnamed).map(|i| team(i, None)));
    store.insert_many(
        "teams",
        (0..named).map(|i| team(1_000 + i, Some(&format!("Team {i}")))),
    );
    store
}

/// Store whose `teams` collection carries the stale compound index.
pub fn with_team_name_index() -> MemoryStore {
    let store = seeded_teams(0, 2);
    store.create_index(
        "teams",
        &[IndexKey::asc("tournament"), IndexKey::asc("teamName")],
    );
    store
}

pub fn connector(store: &MemoryStore) -> MemoryConnector {
    MemoryConnector::new(store.clone())
}
