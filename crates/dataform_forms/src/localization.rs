use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    #[default]
    Russian,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Localization {
    pub language: Language,
    pub progress_wait: &'static str,
    pub file_upload: &'static str,
    pub file_fatal_error: &'static str,
    pub file_empty: &'static str,
    pub hold_error: &'static str,
}

const ENGLISH: Localization = Localization {
    language: Language::English,
    progress_wait: "Wait",
    file_upload: "Download",
    file_fatal_error: "Fatal error",
    file_empty: "Select file",
    hold_error: "Connection with the server is lost",
};

const RUSSIAN: Localization = Localization {
    language: Language::Russian,
    progress_wait: "Ожидание",
    file_upload: "Загрузить",
    file_fatal_error: "Непоправимая ошибка",
    file_empty: "Выберите файл",
    hold_error: "Потеряно соединение с сервером",
};

impl Localization {
    pub fn for_language(language: Language) -> &'static Localization {
        match language {
            Language::English => &ENGLISH,
            Language::Russian => &RUSSIAN,
        }
    }
}
