//! Assistant form state and the pure rules behind its pickers.
//!
//! # Design
//! - The form keeps one voice per language; picking a second voice for a
//!   language replaces the first in place.
//! - Voice and data-collection changes are computed as diffs against the
//!   saved assistant so the submit saga only sends what changed.

use dealerdesk_api_models::{Assistant, AssistantInput, Subscription, Voice};
use uuid::Uuid;

use crate::core::validation::{FieldErrors, is_blank};

/// Languages an assistant can answer in, as `(code, label)`.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("fr", "French"),
    ("de", "German"),
    ("es", "Spanish"),
    ("sr", "Serbian"),
    ("hr", "Croatian"),
    ("sl", "Slovenian"),
];

/// Personality presets, as `(value, label)`.
pub const PERSONALITIES: &[(&str, &str)] = &[
    ("friendly", "Friendly"),
    ("professional", "Professional"),
    ("enthusiastic", "Enthusiastic"),
    ("concise", "Concise"),
    ("empathetic", "Empathetic"),
];

/// Label of a language code, falling back to the upper-cased code.
#[must_use]
pub fn language_label(code: &str) -> String {
    LANGUAGES
        .iter()
        .find(|(candidate, _)| *candidate == code)
        .map_or_else(|| code.to_uppercase(), |(_, label)| (*label).to_string())
}

/// Editable assistant fields.
#[derive(Clone, Debug, PartialEq)]
pub struct AssistantForm {
    /// Display name.
    pub name: String,
    /// Personality preset.
    pub personality: Option<String>,
    /// Answer languages.
    pub supported_languages: Vec<String>,
    /// Virtual office placement.
    pub virtual_office_id: Option<Uuid>,
    /// Attached knowledge base.
    pub data_collection_id: Option<Uuid>,
    /// Raw message-limit input.
    pub user_message_limit: String,
    /// Consumed subscription (root only).
    pub subscription_id: Option<Uuid>,
    /// Text-to-speech toggle.
    pub use_tts: bool,
    /// Selected voices, at most one per language.
    pub voices: Vec<Voice>,
}

impl Default for AssistantForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            personality: None,
            supported_languages: vec!["en".to_string()],
            virtual_office_id: None,
            data_collection_id: None,
            user_message_limit: String::new(),
            subscription_id: None,
            use_tts: false,
            voices: Vec::new(),
        }
    }
}

impl AssistantForm {
    /// Prefill from a saved assistant.
    #[must_use]
    pub fn from_assistant(assistant: &Assistant) -> Self {
        let supported_languages = if assistant.supported_languages.is_empty() {
            vec!["en".to_string()]
        } else {
            assistant.supported_languages.clone()
        };
        Self {
            name: assistant.name.clone(),
            personality: assistant.personality.clone(),
            supported_languages,
            virtual_office_id: assistant.virtual_office_id,
            data_collection_id: assistant.data_collection.as_ref().map(|dc| dc.id),
            user_message_limit: assistant
                .user_message_limit
                .map(|limit| limit.to_string())
                .unwrap_or_default(),
            subscription_id: assistant.subscription_id,
            use_tts: assistant.use_tts,
            voices: unique_by_language(assistant.voices.clone()),
        }
    }

    /// Add or replace a voice, keeping one per language.
    pub fn pick_voice(&mut self, voice: Voice) {
        let mut voices = std::mem::take(&mut self.voices);
        voices.push(voice);
        self.voices = unique_by_language(voices);
    }

    /// Drop a selected voice.
    pub fn remove_voice(&mut self, voice_id: Uuid) {
        self.voices.retain(|voice| voice.id != voice_id);
    }

    /// Toggle an answer language.
    pub fn toggle_language(&mut self, code: &str) {
        if let Some(index) = self.supported_languages.iter().position(|lang| lang == code) {
            self.supported_languages.remove(index);
        } else {
            self.supported_languages.push(code.to_string());
        }
    }

    /// Ids of the selected voices.
    #[must_use]
    pub fn voice_ids(&self) -> Vec<Uuid> {
        self.voices.iter().map(|voice| voice.id).collect()
    }

    /// Validate and build the request body.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when a rule fails.
    pub fn validate(&self) -> Result<AssistantInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check(is_blank(&self.name), "name", "Name is required");
        let limit = self.user_message_limit.trim();
        let parsed_limit = if limit.is_empty() {
            None
        } else {
            let parsed = limit.parse::<u32>().ok().filter(|value| *value > 0);
            errors.check(
                parsed.is_none(),
                "user_message_limit",
                "Message limit must be a positive whole number",
            );
            parsed
        };
        errors.finish(|| AssistantInput {
            name: self.name.trim().to_string(),
            personality: self.personality.clone().filter(|value| !value.is_empty()),
            supported_languages: self.supported_languages.clone(),
            virtual_office_id: self.virtual_office_id,
            user_message_limit: parsed_limit,
            subscription_id: self.subscription_id,
            use_tts: self.use_tts,
        })
    }
}

/// Keep one voice per language; a later voice replaces an earlier one in place.
#[must_use]
pub fn unique_by_language(voices: Vec<Voice>) -> Vec<Voice> {
    let mut unique: Vec<Voice> = Vec::with_capacity(voices.len());
    for voice in voices {
        match unique
            .iter()
            .position(|existing| existing.language == voice.language)
        {
            Some(index) => unique[index] = voice,
            None => unique.push(voice),
        }
    }
    unique
}

/// Voice ids to attach and to detach when moving from `current` to `wanted`.
#[must_use]
pub fn voice_diff(current: &[Uuid], wanted: &[Uuid]) -> (Vec<Uuid>, Vec<Uuid>) {
    let add = wanted
        .iter()
        .filter(|id| !current.contains(id))
        .copied()
        .collect();
    let remove = current
        .iter()
        .filter(|id| !wanted.contains(id))
        .copied()
        .collect();
    (add, remove)
}

/// Knowledge-base change requested by a submit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataCollectionChange {
    /// Attach this collection (the backend replaces any previous one).
    Attach(Uuid),
    /// Detach the current collection.
    Detach(Uuid),
}

impl DataCollectionChange {
    /// Change needed to go from `current` to `wanted`, if any.
    #[must_use]
    pub fn between(current: Option<Uuid>, wanted: Option<Uuid>) -> Option<Self> {
        match (current, wanted) {
            (current, Some(wanted)) if current != Some(wanted) => Some(Self::Attach(wanted)),
            (Some(current), None) => Some(Self::Detach(current)),
            _ => None,
        }
    }
}

/// Active subscriptions not consumed by another assistant.
///
/// `editing` is the assistant being edited, whose own subscription stays available.
#[must_use]
pub fn available_subscriptions<'a>(
    subscriptions: &'a [Subscription],
    assistants: &[Assistant],
    editing: Option<Uuid>,
) -> Vec<&'a Subscription> {
    let taken: Vec<Uuid> = assistants
        .iter()
        .filter(|assistant| Some(assistant.id) != editing)
        .filter_map(|assistant| assistant.subscription_id)
        .collect();
    subscriptions
        .iter()
        .filter(|subscription| subscription.is_active() && !taken.contains(&subscription.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dealerdesk_api_models::{Gender, SubscriptionType};

    fn voice(language: &str) -> Voice {
        Voice {
            id: Uuid::new_v4(),
            name: format!("{language}-voice"),
            display_name: None,
            language: language.to_string(),
            gender: Some(Gender::Female),
            pitch: 0.0,
            speaking_rate: 1.0,
            provider: None,
        }
    }

    fn assistant(subscription_id: Option<Uuid>) -> Assistant {
        Assistant {
            id: Uuid::new_v4(),
            company_id: None,
            name: "Ana".into(),
            personality: None,
            supported_languages: Vec::new(),
            virtual_office_id: None,
            data_collection: None,
            user_message_limit: None,
            subscription_id,
            use_tts: false,
            icon_url: None,
            voices: Vec::new(),
        }
    }

    fn subscription(status: &str) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            company_id: None,
            package_id: Uuid::new_v4(),
            package: None,
            start_date: Utc::now(),
            end_date: None,
            kind: SubscriptionType::Basic,
            status: status.into(),
            conversations_count: 0,
        }
    }

    #[test]
    fn picking_a_second_voice_for_a_language_replaces_the_first() {
        let mut form = AssistantForm::default();
        let english = voice("en");
        let serbian = voice("sr");
        let other_english = voice("en");
        form.pick_voice(english);
        form.pick_voice(serbian.clone());
        form.pick_voice(other_english.clone());
        assert_eq!(form.voice_ids(), vec![other_english.id, serbian.id]);
    }

    #[test]
    fn voice_diff_lists_additions_and_removals() {
        let keep = Uuid::new_v4();
        let old = Uuid::new_v4();
        let new = Uuid::new_v4();
        let (add, remove) = voice_diff(&[keep, old], &[keep, new]);
        assert_eq!(add, vec![new]);
        assert_eq!(remove, vec![old]);
    }

    #[test]
    fn data_collection_changes() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(DataCollectionChange::between(None, None), None);
        assert_eq!(DataCollectionChange::between(Some(a), Some(a)), None);
        assert_eq!(
            DataCollectionChange::between(Some(a), Some(b)),
            Some(DataCollectionChange::Attach(b))
        );
        assert_eq!(
            DataCollectionChange::between(Some(a), None),
            Some(DataCollectionChange::Detach(a))
        );
    }

    #[test]
    fn subscriptions_taken_by_other_assistants_are_hidden() {
        let free = subscription("active");
        let taken = subscription("active");
        let mine = subscription("active");
        let expired = subscription("expired");
        let subscriptions = vec![free.clone(), taken.clone(), mine.clone(), expired];
        let other = assistant(Some(taken.id));
        let editing = assistant(Some(mine.id));
        let available = available_subscriptions(
            &subscriptions,
            &[other, editing.clone()],
            Some(editing.id),
        );
        let ids: Vec<Uuid> = available.iter().map(|sub| sub.id).collect();
        assert_eq!(ids, vec![free.id, mine.id]);
    }

    #[test]
    fn message_limit_must_be_positive() {
        let mut form = AssistantForm {
            name: "Ana".into(),
            ..AssistantForm::default()
        };
        assert_eq!(form.validate().expect("valid").user_message_limit, None);
        form.user_message_limit = "0".into();
        assert!(form.validate().expect_err("zero").has("user_message_limit"));
        form.user_message_limit = " 25 ".into();
        let input = form.validate().expect("valid");
        assert_eq!(input.user_message_limit, Some(25));
        assert_eq!(input.supported_languages, vec!["en".to_string()]);
    }

    #[test]
    fn toggling_languages() {
        let mut form = AssistantForm::default();
        form.toggle_language("sr");
        form.toggle_language("en");
        assert_eq!(form.supported_languages, vec!["sr".to_string()]);
        assert_eq!(language_label("sr"), "Serbian");
        assert_eq!(language_label("it"), "IT");
    }
}
