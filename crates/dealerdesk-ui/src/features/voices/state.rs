//! Voice form.

use dealerdesk_api_models::{Gender, Voice, VoiceInput};

use crate::core::validation::{FieldErrors, check_catalogue_name, is_blank, optional, parse_number};

/// Editable voice fields, kept as raw input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceForm {
    /// Provider voice name.
    pub name: String,
    /// ISO language code.
    pub language: String,
    /// `male` or `female`.
    pub gender: String,
    /// Pitch in semitones.
    pub pitch: String,
    /// Speaking rate multiplier.
    pub speaking_rate: String,
    /// Upstream provider.
    pub provider: String,
}

impl Default for VoiceForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            language: String::new(),
            gender: String::new(),
            pitch: "0".to_string(),
            speaking_rate: "1".to_string(),
            provider: String::new(),
        }
    }
}

impl VoiceForm {
    /// Prefill from a saved voice.
    #[must_use]
    pub fn from_voice(voice: &Voice) -> Self {
        Self {
            name: voice.name.clone(),
            language: voice.language.clone(),
            gender: voice.gender.map(Gender::as_str).unwrap_or_default().to_string(),
            pitch: voice.pitch.to_string(),
            speaking_rate: voice.speaking_rate.to_string(),
            provider: voice.provider.clone().unwrap_or_default(),
        }
    }

    /// Validate and build the request body.
    ///
    /// # Errors
    ///
    /// Returns per-field messages when a rule fails.
    pub fn validate(&self) -> Result<VoiceInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        check_catalogue_name(&mut errors, "name", &self.name);
        errors.check(is_blank(&self.language), "language", "Language is required");

        let gender = match self.gender.trim() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "" => {
                errors.insert("gender", "Gender is required");
                None
            }
            _ => {
                errors.insert("gender", r#"Gender must be "male" or "female""#);
                None
            }
        };

        let pitch = parse_number(&self.pitch);
        match pitch {
            None => errors.insert("pitch", "Pitch is required"),
            Some(value) if value < -10.0 => errors.insert("pitch", "Pitch cannot be less than -10"),
            Some(value) if value > 10.0 => errors.insert("pitch", "Pitch cannot be more than 10"),
            Some(_) => {}
        }

        let speaking_rate = parse_number(&self.speaking_rate);
        match speaking_rate {
            None => errors.insert("speaking_rate", "Speaking rate is required"),
            Some(value) if value < 0.5 => {
                errors.insert("speaking_rate", "Speaking rate cannot be less than 0.5");
            }
            Some(value) if value > 2.0 => {
                errors.insert("speaking_rate", "Speaking rate cannot be more than 2");
            }
            Some(_) => {}
        }

        match (gender, pitch, speaking_rate) {
            (Some(gender), Some(pitch), Some(speaking_rate)) if errors.is_empty() => Ok(VoiceInput {
                name: self.name.trim().to_string(),
                language: self.language.trim().to_string(),
                gender,
                pitch,
                speaking_rate,
                provider: optional(&self.provider),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> VoiceForm {
        VoiceForm {
            name: "Emma".into(),
            language: "en".into(),
            gender: "female".into(),
            ..VoiceForm::default()
        }
    }

    #[test]
    fn defaults_are_neutral_and_valid() {
        let input = form().validate().expect("valid");
        assert!((input.pitch - 0.0).abs() < f64::EPSILON);
        assert!((input.speaking_rate - 1.0).abs() < f64::EPSILON);
        assert_eq!(input.gender, Gender::Female);
        assert_eq!(input.provider, None);
    }

    #[test]
    fn ranges_are_enforced() {
        let mut voice = form();
        voice.pitch = "10.5".into();
        voice.speaking_rate = "0.4".into();
        let errors = voice.validate().expect_err("out of range");
        assert_eq!(errors.get("pitch"), Some("Pitch cannot be more than 10"));
        assert_eq!(
            errors.get("speaking_rate"),
            Some("Speaking rate cannot be less than 0.5")
        );
    }

    #[test]
    fn name_gender_and_language_are_checked() {
        let voice = VoiceForm {
            name: "E".into(),
            gender: "robot".into(),
            ..VoiceForm::default()
        };
        let errors = voice.validate().expect_err("invalid");
        assert_eq!(errors.get("name"), Some("Name should be at least 2 characters"));
        assert_eq!(errors.get("language"), Some("Language is required"));
        assert_eq!(errors.get("gender"), Some(r#"Gender must be "male" or "female""#));
    }
}
