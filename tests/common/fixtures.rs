//! Metadata and detail fixtures

use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Metadata index body listing `(id, slug)` pairs in the given order
pub fn metadata_index(entries: &[(u32, &str)]) -> Value {
    let pairs: Vec<Value> = entries
        .iter()
        .map(|(id, slug)| {
            json!({
                "stat": {
                    "question_id": id,
                    "question__title": title_for(slug),
                    "question__title_slug": slug,
                    "question__hide": false,
                    "total_acs": 100,
                    "total_submitted": 200,
                    "frontend_question_id": id,
                    "is_new_question": false
                },
                "status": null,
                "difficulty": { "level": 1 },
                "paid_only": false,
                "is_favor": false,
                "frequency": 0,
                "progress": 0
            })
        })
        .collect();

    json!({
        "user_name": "",
        "num_solved": 0,
        "num_total": entries.len(),
        "stat_status_pairs": pairs
    })
}

/// Detail response for `slug`, with some non-ASCII content
pub fn question_detail(id: u32, slug: &str) -> Value {
    json!({
        "data": {
            "question": {
                "questionId": id.to_string(),
                "questionFrontendId": id.to_string(),
                "title": title_for(slug),
                "titleSlug": slug,
                "translatedTitle": "两数之和",
                "content": "<p>Given an array of integers <code>nums</code>…</p>",
                "isPaidOnly": false,
                "difficulty": "Easy",
                "topicTags": [{ "name": "Array", "slug": "array", "translatedName": "数组" }],
                "codeSnippets": [{ "lang": "Rust", "langSlug": "rust", "code": "impl Solution {\n}" }],
                "hints": [],
                "note": null
            }
        }
    })
}

/// Human-readable title derived from a slug
pub fn title_for(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write a metadata snapshot into `dir` and return its path
pub fn write_snapshot(dir: &Path, entries: &[(u32, &str)]) -> PathBuf {
    let path = dir.join("metadata.json");
    std::fs::write(&path, serde_json::to_vec(&metadata_index(entries)).unwrap()).unwrap();
    path
}

/// Sorted file names in `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
