use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Active locale of a page. Every label, field and text direction branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Ar,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language {0:?}")]
pub struct UnknownLang(pub String);

impl FromStr for Lang {
    type Err = UnknownLang;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Lang::En),
            "ar" => Ok(Lang::Ar),
            other => Err(UnknownLang(other.to_owned())),
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Lang {
    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ar => "ar",
        }
    }

    pub fn dir(self) -> &'static str {
        match self {
            Lang::En => "ltr",
            Lang::Ar => "rtl",
        }
    }

    pub fn other(self) -> Lang {
        match self {
            Lang::En => Lang::Ar,
            Lang::Ar => Lang::En,
        }
    }

    pub fn is_rtl(self) -> bool {
        self == Lang::Ar
    }

    /// Picks the variant of a bilingual value for this locale.
    pub fn pick<'a>(self, en: &'a str, ar: &'a str) -> &'a str {
        match self {
            Lang::En => en,
            Lang::Ar => ar,
        }
    }

    /// Locale named by the first segment of a request path.
    pub fn from_path(path: &str) -> Option<Lang> {
        path.trim_start_matches('/').split('/').next()?.parse().ok()
    }

    pub fn home_path(self) -> String {
        format!("/{}", self.code())
    }

    pub fn login_path(self) -> String {
        format!("/{}/admin/login", self.code())
    }

    pub fn dashboard_path(self) -> String {
        format!("/{}/admin/dashboard", self.code())
    }

    /// Rewrites `path` so that it points to the same page in the other locale.
    /// Paths without a locale prefix get one prepended.
    pub fn switch_path(self, path: &str) -> String {
        let prefix = self.home_path();
        let target = self.other().home_path();
        match path.strip_prefix(prefix.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') => {
                format!("{target}{rest}")
            }
            _ if path == "/" || path.is_empty() => target,
            _ => format!("{target}{path}"),
        }
    }

    pub fn dictionary(self) -> &'static Dictionary {
        match self {
            Lang::En => &EN,
            Lang::Ar => &AR,
        }
    }
}

/// Static UI strings for one locale.
#[derive(Debug)]
pub struct Dictionary {
    pub site_title: &'static str,
    pub side_note_title: &'static str,
    pub side_note: &'static str,
    pub answers: &'static str,
    pub no_categories: &'static str,
    pub category_not_found: &'static str,
    pub back_home: &'static str,
    pub no_questions: &'static str,
    pub no_questions_hint: &'static str,
    pub external_resources: &'static str,
    pub admin_login: &'static str,
    pub switch_language: &'static str,
    pub load_categories_failed: &'static str,
    pub load_questions_failed: &'static str,
}

static EN: Dictionary = Dictionary {
    site_title: "Learn2ux",
    side_note_title: "Side Note",
    side_note: "Get 150+ answers about interface design for free. Every answer is written by practitioners and reviewed before it is published.",
    answers: "answers",
    no_categories: "No categories available yet.",
    category_not_found: "Category not found",
    back_home: "Back to home",
    no_questions: "No questions yet",
    no_questions_hint: "Questions for this category will appear here.",
    external_resources: "External Resources:",
    admin_login: "Admin Login",
    switch_language: "Switch to Arabic",
    load_categories_failed: "Failed to load categories. Please refresh the page.",
    load_questions_failed: "Failed to load questions. Please refresh the page.",
};

static AR: Dictionary = Dictionary {
    site_title: "Learn2ux",
    side_note_title: "ملاحظة جانبية",
    side_note: "احصل على أكثر من 150 إجابة حول تصميم الواجهات مجانًا. كل إجابة كتبها ممارسون وتمت مراجعتها قبل نشرها.",
    answers: "إجابة",
    no_categories: "لا توجد فئات متاحة بعد.",
    category_not_found: "الفئة غير موجودة",
    back_home: "العودة إلى الصفحة الرئيسية",
    no_questions: "لا توجد أسئلة بعد",
    no_questions_hint: "ستظهر الأسئلة الخاصة بهذه الفئة هنا.",
    external_resources: "مصادر خارجية:",
    admin_login: "دخول المشرف",
    switch_language: "التبديل إلى الإنجليزية",
    load_categories_failed: "تعذر تحميل الفئات. يرجى تحديث الصفحة.",
    load_questions_failed: "تعذر تحميل الأسئلة. يرجى تحديث الصفحة.",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_codes_only() {
        assert_eq!("en".parse::<Lang>(), Ok(Lang::En));
        assert_eq!("ar".parse::<Lang>(), Ok(Lang::Ar));
        assert!("fr".parse::<Lang>().is_err());
        assert!("EN".parse::<Lang>().is_err());
    }

    #[test]
    fn arabic_is_right_to_left() {
        assert_eq!(Lang::Ar.dir(), "rtl");
        assert_eq!(Lang::En.dir(), "ltr");
        assert!(Lang::Ar.is_rtl());
    }

    #[test]
    fn switch_path_replaces_locale_prefix() {
        assert_eq!(Lang::En.switch_path("/en"), "/ar");
        assert_eq!(Lang::En.switch_path("/en/abc123"), "/ar/abc123");
        assert_eq!(Lang::Ar.switch_path("/ar/admin/login"), "/en/admin/login");
        assert_eq!(Lang::En.switch_path("/en?open=1"), "/ar?open=1");
        // "/english" is not a locale prefix
        assert_eq!(Lang::En.switch_path("/english"), "/ar/english");
        assert_eq!(Lang::En.switch_path("/"), "/ar");
    }

    #[test]
    fn locale_from_request_path() {
        assert_eq!(Lang::from_path("/ar/abc"), Some(Lang::Ar));
        assert_eq!(Lang::from_path("/en"), Some(Lang::En));
        assert_eq!(Lang::from_path("/metrics"), None);
        assert_eq!(Lang::from_path("/"), None);
    }

    #[test]
    fn pick_follows_locale() {
        assert_eq!(Lang::En.pick("Hello", "مرحبا"), "Hello");
        assert_eq!(Lang::Ar.pick("Hello", "مرحبا"), "مرحبا");
    }
}
