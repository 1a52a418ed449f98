use serde_json::{json, Value};

use crate::model::language::{Language, LanguageInfo};
use crate::services::index::{LoadStatus, PhraseIndex, ALL};

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn get_str<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

/// Answers one JSON-lines request against the index.
pub async fn handle(index: &PhraseIndex, input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let payload = get_payload(&req);

    match Command::from(get_cmd(&req)) {
        Command::Ping => ok(id, json!({ "message": "phrase-core alive" })),

        Command::Status => {
            let state = index.status();
            match index.try_catalog() {
                Some(catalog) if state == LoadStatus::Ready => ok(
                    id,
                    json!({
                        "state": state,
                        "phrases": catalog.len(),
                        "fingerprint": catalog.fingerprint(),
                        "report": catalog.report(),
                    }),
                ),
                _ => ok(id, json!({ "state": state })),
            }
        }

        Command::LanguagesList => {
            let languages: Vec<LanguageInfo> = Language::ALL.into_iter().map(LanguageInfo::from).collect();
            ok(id, json!({ "languages": languages }))
        }

        Command::PhrasesAll => {
            let catalog = index.ensure_loaded().await;
            ok(id, json!({ "phrases": catalog.phrases() }))
        }

        Command::PhrasesGet => {
            let phrase_id = get_str(payload, "id");
            if phrase_id.is_empty() {
                return err(id, "payload.id is required");
            }
            let catalog = index.ensure_loaded().await;
            match catalog.by_id(phrase_id) {
                Some(p) => ok(id, json!({ "phrase": p })),
                None => err(id, format!("phrase not found: {phrase_id}")),
            }
        }

        Command::PhrasesByCategory => {
            let category_id = match get_str(payload, "category_id") {
                "" => ALL,
                c => c,
            };
            let catalog = index.ensure_loaded().await;
            ok(id, json!({ "phrases": catalog.by_category(category_id) }))
        }

        Command::PhrasesByParentCategory => {
            let parent_id = match get_str(payload, "parent_id") {
                "" => ALL,
                c => c,
            };
            let catalog = index.ensure_loaded().await;
            ok(id, json!({ "phrases": catalog.by_parent_category(parent_id) }))
        }

        Command::CategoriesList => {
            let catalog = index.ensure_loaded().await;
            ok(id, json!({ "categories": catalog.categories() }))
        }

        Command::CategoriesParents => {
            let catalog = index.ensure_loaded().await;
            ok(id, json!({ "categories": catalog.parent_categories() }))
        }

        Command::Unknown => err(id, "unknown command"),
    }
}
