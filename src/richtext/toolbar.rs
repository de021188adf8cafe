use super::{RichText, Selection};

/// Answer fields the toolbar can format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerField {
    AnswerEn,
    AnswerAr,
}

impl AnswerField {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerField::AnswerEn => "answer_en",
            AnswerField::AnswerAr => "answer_ar",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "answer_en" => Some(AnswerField::AnswerEn),
            "answer_ar" => Some(AnswerField::AnswerAr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatAction {
    Bold,
    Italic,
    Underline,
    Code,
    BulletList,
    NumberedList,
    Heading,
    /// `None` when no URL was entered.
    Link(Option<String>),
}

impl FormatAction {
    pub fn parse(name: &str, link_url: Option<String>) -> Option<Self> {
        let action = match name {
            "bold" => FormatAction::Bold,
            "italic" => FormatAction::Italic,
            "underline" => FormatAction::Underline,
            "code" => FormatAction::Code,
            "bullet_list" => FormatAction::BulletList,
            "numbered_list" => FormatAction::NumberedList,
            "heading" => FormatAction::Heading,
            "link" => FormatAction::Link(link_url),
            _ => return None,
        };
        Some(action)
    }
}

/// Forms holding rich-text answers.
pub trait RichTextFields {
    fn answer_html(&self, field: AnswerField) -> &str;
    fn set_answer_html(&mut self, field: AnswerField, html: String);
}

/// Formatting toolbar. Actions go to the answer field that last had focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Toolbar {
    focused: Option<AnswerField>,
}

impl Toolbar {
    pub fn focused_on(field: Option<AnswerField>) -> Self {
        Self { focused: field }
    }

    pub fn focus(&mut self, field: AnswerField) {
        self.focused = Some(field);
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    pub fn focused(&self) -> Option<AnswerField> {
        self.focused
    }

    /// Formats the selection in the focused field and writes the resulting
    /// HTML back. Without focus nothing happens.
    pub fn apply(
        &self,
        action: &FormatAction,
        selection: &Selection,
        fields: &mut impl RichTextFields,
    ) -> bool {
        let Some(field) = self.focused else {
            return false;
        };
        let mut text = RichText::from_html(fields.answer_html(field));
        if !text.apply(action, selection) {
            return false;
        }
        fields.set_answer_html(field, text.to_html());
        true
    }
}
