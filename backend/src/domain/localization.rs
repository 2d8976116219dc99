//! Reply message keys and the built-in Japanese catalog.
//!
//! Conversation code refers to replies by [`MessageKey`]; adapters render
//! them through a [`MessageCatalog`].

use std::collections::BTreeMap;
use std::fmt;

use super::ports::MessageCatalog;

/// Fixed set of reply keys used by the conversation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MessageKey {
    Greeting,
    AskPrefecture,
    PrefectureNotFound,
    AskMunicipality,
    MunicipalityNotFound,
    ConfirmLocation,
    ConfirmRetry,
    SelectAreaClass10,
    SelectAreaClass15,
    SelectAreaClass20,
    SelectionNotFound,
    LocationRegistered,
    DefaultReply,
    NotInList,
    Yes,
    No,
}

impl MessageKey {
    /// Catalog key string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::AskPrefecture => "askPrefecture",
            Self::PrefectureNotFound => "prefectureNotFound",
            Self::AskMunicipality => "askMunicipality",
            Self::MunicipalityNotFound => "municipalityNotFound",
            Self::ConfirmLocation => "confirmLocation",
            Self::ConfirmRetry => "confirmRetry",
            Self::SelectAreaClass10 => "selectAreaClass10",
            Self::SelectAreaClass15 => "selectAreaClass15",
            Self::SelectAreaClass20 => "selectAreaClass20",
            Self::SelectionNotFound => "selectionNotFound",
            Self::LocationRegistered => "locationRegistered",
            Self::DefaultReply => "defaultReply",
            Self::NotInList => "notInList",
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const JAPANESE_MESSAGES: &[(&str, &str)] = &[
    ("greeting", "こんにちは！ご登録ありがとうございます。"),
    ("askPrefecture", "都道府県名を入力してください（例: 東京都、大阪府 など）"),
    (
        "prefectureNotFound",
        "都道府県が見つかりませんでした。正しい都道府県名を入力してください。",
    ),
    ("askMunicipality", "市区町村名を入力してください（例: 新宿区、名古屋市 など）"),
    (
        "municipalityNotFound",
        "市区町村が見つかりませんでした。正しい市区町村名を入力してください。",
    ),
    ("confirmLocation", "{0} でよろしいですか？"),
    ("confirmRetry", "「はい」か「いいえ」で答えてください。"),
    ("selectAreaClass10", "より詳細な地域を選択してください："),
    ("selectAreaClass15", "より詳細な地域を選択してください："),
    ("selectAreaClass20", "より詳細な地域を選択してください："),
    (
        "selectionNotFound",
        "選択された地域が見つかりませんでした。もう一度選択してください。",
    ),
    ("locationRegistered", "地域の登録が完了しました！"),
    (
        "defaultReply",
        "現在の設定状況です。必要に応じて情報を更新してください。",
    ),
    ("notInList", "この中にはない"),
    ("yes", "はい"),
    ("no", "いいえ"),
];

/// In-memory catalog.
#[derive(Debug, Clone)]
pub struct StaticMessageCatalog {
    messages: BTreeMap<String, String>,
}

impl StaticMessageCatalog {
    /// The built-in Japanese catalog.
    #[must_use]
    pub fn japanese() -> Self {
        Self::from_pairs(JAPANESE_MESSAGES.iter().copied())
    }

    /// Build a catalog from key/text pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            messages: pairs
                .into_iter()
                .map(|(key, text)| (key.to_owned(), text.to_owned()))
                .collect(),
        }
    }
}

impl Default for StaticMessageCatalog {
    fn default() -> Self {
        Self::japanese()
    }
}

impl MessageCatalog for StaticMessageCatalog {
    fn text(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn unknown_keys_fall_back_to_key() {
        let catalog = StaticMessageCatalog::japanese();
        assert_eq!(catalog.text("noSuchKey"), "noSuchKey");
    }

    #[rstest]
    fn render_substitutes_positional_arguments() {
        let catalog = StaticMessageCatalog::japanese();
        assert_eq!(
            catalog.render(MessageKey::ConfirmLocation.as_str(), &["新宿区"]),
            "新宿区 でよろしいですか？"
        );
    }

    #[rstest]
    fn every_key_has_japanese_text() {
        let catalog = StaticMessageCatalog::japanese();
        let keys = [
            MessageKey::Greeting,
            MessageKey::AskPrefecture,
            MessageKey::PrefectureNotFound,
            MessageKey::AskMunicipality,
            MessageKey::MunicipalityNotFound,
            MessageKey::ConfirmLocation,
            MessageKey::ConfirmRetry,
            MessageKey::SelectAreaClass10,
            MessageKey::SelectAreaClass15,
            MessageKey::SelectAreaClass20,
            MessageKey::SelectionNotFound,
            MessageKey::LocationRegistered,
            MessageKey::DefaultReply,
            MessageKey::NotInList,
            MessageKey::Yes,
            MessageKey::No,
        ];
        for key in keys {
            assert_ne!(catalog.text(key.as_str()), key.as_str(), "{key} missing");
        }
    }

    #[rstest]
    fn not_in_list_literal_matches_flow_input() {
        let catalog = StaticMessageCatalog::japanese();
        assert_eq!(catalog.text(MessageKey::NotInList.as_str()), "この中にはない");
    }
}
