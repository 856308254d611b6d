//! Canonical Zotero item types.
//!
//! Zotero's web interface accepts more type names than its underlying
//! vocabulary distinguishes, so several source spellings collapse onto one
//! canonical type (e.g. "dissertation" is stored as a thesis). The mapping
//! is a fixed table; the raw spelling is kept on the item itself.

use serde::{Deserialize, Serialize};

/// A canonical Zotero item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemType {
    // Academic publications
    JournalArticle,
    ConferencePaper,
    Preprint,

    // Books and chapters
    Book,
    BookSection,

    // Academic works
    Thesis,

    // Reports and documents
    Report,

    // Web and digital
    Webpage,
    BlogPost,
    ForumPost,

    // Legal and IP
    Patent,
    Case,
    Statute,
    Bill,
    Hearing,

    // Media and arts
    Artwork,
    AudioRecording,
    VideoRecording,
    Film,
    TvBroadcast,
    RadioBroadcast,
    Podcast,

    // News and magazines
    NewspaperArticle,
    MagazineArticle,

    // Reference works
    EncyclopediaArticle,
    DictionaryEntry,

    // Software and data
    ComputerProgram,

    // Presentations
    Presentation,

    // Correspondence
    Email,
    Letter,
    InstantMessage,

    // Interviews
    Interview,

    // Documents and archives
    Document,
    Manuscript,
    Map,
}

impl ItemType {
    /// All canonical type names, in declaration order.
    pub const CANONICAL_NAMES: &'static [&'static str] = &[
        "journalArticle",
        "conferencePaper",
        "preprint",
        "book",
        "bookSection",
        "thesis",
        "report",
        "webpage",
        "blogPost",
        "forumPost",
        "patent",
        "case",
        "statute",
        "bill",
        "hearing",
        "artwork",
        "audioRecording",
        "videoRecording",
        "film",
        "tvBroadcast",
        "radioBroadcast",
        "podcast",
        "newspaperArticle",
        "magazineArticle",
        "encyclopediaArticle",
        "dictionaryEntry",
        "computerProgram",
        "presentation",
        "email",
        "letter",
        "instantMessage",
        "interview",
        "document",
        "manuscript",
        "map",
    ];

    /// The canonical Zotero string for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::JournalArticle => "journalArticle",
            ItemType::ConferencePaper => "conferencePaper",
            ItemType::Preprint => "preprint",
            ItemType::Book => "book",
            ItemType::BookSection => "bookSection",
            ItemType::Thesis => "thesis",
            ItemType::Report => "report",
            ItemType::Webpage => "webpage",
            ItemType::BlogPost => "blogPost",
            ItemType::ForumPost => "forumPost",
            ItemType::Patent => "patent",
            ItemType::Case => "case",
            ItemType::Statute => "statute",
            ItemType::Bill => "bill",
            ItemType::Hearing => "hearing",
            ItemType::Artwork => "artwork",
            ItemType::AudioRecording => "audioRecording",
            ItemType::VideoRecording => "videoRecording",
            ItemType::Film => "film",
            ItemType::TvBroadcast => "tvBroadcast",
            ItemType::RadioBroadcast => "radioBroadcast",
            ItemType::Podcast => "podcast",
            ItemType::NewspaperArticle => "newspaperArticle",
            ItemType::MagazineArticle => "magazineArticle",
            ItemType::EncyclopediaArticle => "encyclopediaArticle",
            ItemType::DictionaryEntry => "dictionaryEntry",
            ItemType::ComputerProgram => "computerProgram",
            ItemType::Presentation => "presentation",
            ItemType::Email => "email",
            ItemType::Letter => "letter",
            ItemType::InstantMessage => "instantMessage",
            ItemType::Interview => "interview",
            ItemType::Document => "document",
            ItemType::Manuscript => "manuscript",
            ItemType::Map => "map",
        }
    }

    /// Resolve a source-facing type name to its canonical type.
    ///
    /// Accepts both canonical names and the source spellings Zotero collapses
    /// onto them. Returns `None` for names outside the vocabulary.
    pub fn from_source_name(name: &str) -> Option<Self> {
        let item_type = match name {
            "journalArticle" => ItemType::JournalArticle,
            "conferencePaper" => ItemType::ConferencePaper,
            "preprint" => ItemType::Preprint,
            "book" => ItemType::Book,
            "bookSection" => ItemType::BookSection,
            "thesis" | "dissertation" => ItemType::Thesis,
            "report" | "workingPaper" | "whitePaper" => ItemType::Report,
            "webpage" => ItemType::Webpage,
            "blogPost" => ItemType::BlogPost,
            "forumPost" => ItemType::ForumPost,
            "patent" => ItemType::Patent,
            "case" => ItemType::Case,
            "statute" => ItemType::Statute,
            "bill" => ItemType::Bill,
            "hearing" => ItemType::Hearing,
            "artwork" => ItemType::Artwork,
            "audioRecording" => ItemType::AudioRecording,
            "videoRecording" => ItemType::VideoRecording,
            "film" => ItemType::Film,
            "tvBroadcast" => ItemType::TvBroadcast,
            "radioBroadcast" => ItemType::RadioBroadcast,
            "podcast" => ItemType::Podcast,
            "newspaperArticle" => ItemType::NewspaperArticle,
            "magazineArticle" => ItemType::MagazineArticle,
            "encyclopediaArticle" => ItemType::EncyclopediaArticle,
            "dictionaryEntry" => ItemType::DictionaryEntry,
            "computerProgram" | "software" | "dataset" => ItemType::ComputerProgram,
            "presentation" | "conferencePresentation" => ItemType::Presentation,
            "email" => ItemType::Email,
            "letter" => ItemType::Letter,
            "instantMessage" => ItemType::InstantMessage,
            "interview" | "personalCommunication" => ItemType::Interview,
            "document" => ItemType::Document,
            "manuscript" => ItemType::Manuscript,
            "map" => ItemType::Map,
            _ => return None,
        };
        Some(item_type)
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
