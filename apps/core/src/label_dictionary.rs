use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::Value;

use crate::model::LabelDictionary;
use crate::store::{KeyValueStore, StoreError};

pub const DICTIONARY_KEY: &str = "labelDictionary";

const PREFIX_MATCH_MAX_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("label dictionary entry '{label}' is not a list of shortcuts")]
pub struct DictionaryCorruption {
    pub label: String,
}

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Corrupt(#[from] DictionaryCorruption),
}

pub fn validate(value: Option<Value>) -> Result<LabelDictionary, DictionaryCorruption> {
    let map = match value {
        None | Some(Value::Null) => return Ok(LabelDictionary::new()),
        Some(Value::Object(map)) => map,
        Some(_) => {
            return Err(DictionaryCorruption {
                label: String::new(),
            })
        }
    };

    let mut dict = LabelDictionary::new();
    for (label, shortcuts) in map {
        let Value::Array(items) = shortcuts else {
            return Err(DictionaryCorruption { label });
        };
        let mut parsed = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(s) => parsed.push(s),
                _ => return Err(DictionaryCorruption { label }),
            }
        }
        dict.insert(label, parsed);
    }
    Ok(dict)
}

pub struct LabelDictionaryStore {
    store: Arc<dyn KeyValueStore>,
}

impl LabelDictionaryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn load(&self) -> Result<LabelDictionary, LoadError> {
        let raw = self.store.get(DICTIONARY_KEY).await?;
        Ok(validate(raw)?)
    }

    async fn save(&self, dict: &LabelDictionary) -> Result<(), StoreError> {
        let value = serde_json::to_value(dict)?;
        self.store.set(DICTIONARY_KEY, value).await
    }

    pub async fn get(&self) -> LabelDictionary {
        match self.load().await {
            Ok(dict) => dict,
            Err(error) => {
                log::warn!("label dictionary unusable ({error}), resetting");
                self.clear().await;
                self.load().await.unwrap_or_default()
            }
        }
    }

    pub async fn add(&self, shortcut: &str, full_label: &str) -> bool {
        let mut dict = self.get().await;
        let shortcuts = dict.entry(full_label.to_string()).or_default();
        let shortcut = shortcut.trim();
        if !shortcut.is_empty() && !shortcuts.iter().any(|s| s == shortcut) {
            shortcuts.push(shortcut.to_string());
        }
        self.persist(&dict, "add").await
    }

    /// `None` drops the whole entry. Removing the last shortcut keeps the label with `[]`.
    pub async fn remove(&self, full_label: &str, shortcut: Option<&str>) -> bool {
        let mut dict = self.get().await;
        match shortcut.filter(|s| !s.is_empty()) {
            Some(shortcut) => {
                if let Some(shortcuts) = dict.get_mut(full_label) {
                    shortcuts.retain(|s| s != shortcut);
                }
            }
            None => {
                dict.remove(full_label);
            }
        }
        self.persist(&dict, "remove").await
    }

    pub async fn clear(&self) -> bool {
        match self.save(&LabelDictionary::new()).await {
            Ok(()) => {
                log::info!("label dictionary cleared");
                true
            }
            Err(error) => {
                log::error!("failed to clear label dictionary: {error}");
                false
            }
        }
    }

    pub async fn expand(&self, query: &str) -> String {
        match self.load().await {
            Ok(dict) => expand_with(&dict, query),
            Err(error) => {
                log::warn!("cannot expand label shortcuts ({error}), resetting dictionary");
                self.clear().await;
                query.to_string()
            }
        }
    }

    async fn persist(&self, dict: &LabelDictionary, op: &str) -> bool {
        match self.save(dict).await {
            Ok(()) => true,
            Err(error) => {
                log::error!("label dictionary {op} failed: {error}");
                false
            }
        }
    }
}

fn label_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"#([^\s]+)").expect("label token pattern is valid"))
}

// `needle` is already lowercase.
fn starts_with_ignore_case(haystack: &str, needle: &str) -> bool {
    let mut lowered = haystack.chars().flat_map(char::to_lowercase);
    needle.chars().all(|c| lowered.next() == Some(c))
}

fn shortcuts<'d>(dict: &'d LabelDictionary) -> impl Iterator<Item = (&'d str, &'d str)> + 'd {
    dict.iter().flat_map(|(label, shortcuts)| {
        shortcuts
            .iter()
            .map(move |shortcut| (shortcut.as_str(), label.as_str()))
    })
}

fn resolve_token<'d>(dict: &'d LabelDictionary, token: &str) -> Option<&'d str> {
    // A shortcut listed under several labels maps to the last of them.
    if let Some((_, label)) = shortcuts(dict).filter(|(s, _)| *s == token).last() {
        return Some(label);
    }
    if token.chars().count() > PREFIX_MATCH_MAX_CHARS {
        return None;
    }
    let needle = token.to_lowercase();
    shortcuts(dict)
        .find(|(shortcut, _)| starts_with_ignore_case(shortcut, &needle))
        .map(|(_, label)| label)
        .or_else(|| {
            dict.keys()
                .find(|label| starts_with_ignore_case(label, &needle))
                .map(String::as_str)
        })
}

pub fn expand_with(dict: &LabelDictionary, query: &str) -> String {
    if dict.is_empty() {
        return query.to_string();
    }

    let matches: Vec<(usize, usize, &str)> = label_token_pattern()
        .captures_iter(query)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let token = caps.get(1)?;
            Some((whole.start(), whole.end(), token.as_str()))
        })
        .collect();

    let mut expanded = query.to_string();
    // Right to left so earlier byte offsets stay valid while splicing.
    for &(start, end, token) in matches.iter().rev() {
        if let Some(label) = resolve_token(dict, token) {
            expanded.replace_range(start..end, &format!("#{label}"));
        }
    }
    expanded
}
