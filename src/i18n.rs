// i18n.rs — 运行时多语言
//
// 文案来源（按顺序）:
//   1) <exe_dir>/assets/i18n/<lang>.json 或 ./assets/i18n/<lang>.json
//   2) assets/i18n.json（多语言合并文件: { "<lang>": { "key": "value" } }）
//   3) 内置英文（编译期嵌入），找不到的 key 原样返回
// 查找: tr("key") / tr_with("key", &[("name", ...)])，占位符写作 {name}

use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

pub const FALLBACK_LANG: &str = "en";

const EMBEDDED_EN: &str = include_str!("../assets/i18n/en.json");

type Strings = HashMap<String, String>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum I18nFile {
    Flat(Strings),
    Multi(HashMap<String, Strings>),
}

#[derive(Debug, Clone, Default)]
struct Catalog {
    lang: String,
    strings: Strings,
    fallback: Strings,
}

static I18N: OnceCell<RwLock<Catalog>> = OnceCell::new();

fn parse(text: &str, lang: &str) -> Option<Strings> {
    match serde_json::from_str::<I18nFile>(text) {
        Ok(I18nFile::Flat(map)) => Some(map),
        Ok(I18nFile::Multi(mut all)) => all.remove(lang),
        Err(e) => {
            log::warn!("ignoring malformed i18n file: {e}");
            None
        }
    }
}

/// Candidate paths, exe-relative first, then the working directory.
fn search(relative: &Path) -> Option<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    exe_dir
        .into_iter()
        .chain(std::iter::once(PathBuf::from(".")))
        .map(|dir| dir.join("assets").join(relative))
        .find(|p| p.exists())
}

fn load_lang(lang: &str) -> Option<Strings> {
    let per_lang = Path::new("i18n").join(format!("{lang}.json"));
    let candidates = [search(&per_lang), search(Path::new("i18n.json"))];

    candidates.into_iter().flatten().find_map(|path| {
        let text = std::fs::read_to_string(&path).ok()?;
        let map = parse(&text, lang)?;
        log::debug!("loaded {} strings for {lang} from {}", map.len(), path.display());
        Some(map)
    })
}

fn embedded_fallback() -> Strings {
    parse(EMBEDDED_EN, FALLBACK_LANG).unwrap_or_default()
}

/// (Re)initialize the global catalog. Later calls replace the current language.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();

    let mut fallback = embedded_fallback();
    if let Some(overrides) = load_lang(FALLBACK_LANG) {
        fallback.extend(overrides);
    }

    let strings = if lang == FALLBACK_LANG {
        Strings::new()
    } else {
        load_lang(&lang).unwrap_or_else(|| {
            log::warn!("no strings for language {lang:?}, using {FALLBACK_LANG}");
            Strings::new()
        })
    };

    let catalog = Catalog {
        lang,
        strings,
        fallback,
    };

    match I18N.get() {
        Some(lock) => {
            if let Ok(mut w) = lock.write() {
                *w = catalog;
            }
        }
        None => {
            let _ = I18N.set(RwLock::new(catalog));
        }
    }
}

/// Active language code, or the fallback before `init`.
pub fn current_lang() -> String {
    I18N.get()
        .and_then(|l| l.read().ok().map(|c| c.lang.clone()))
        .unwrap_or_else(|| FALLBACK_LANG.to_string())
}

/// Localized text for `key`; the key itself when missing.
pub fn tr(key: &str) -> String {
    let Some(catalog) = I18N.get().and_then(|l| l.read().ok()) else {
        return key.to_string();
    };

    catalog
        .strings
        .get(key)
        .or_else(|| catalog.fallback.get(key))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

/// Like [`tr`], substituting `{name}` placeholders. Unknown placeholders stay as-is.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    args.iter().fold(tr(key), |s, (k, v)| s.replace(&format!("{{{k}}}"), v))
}
