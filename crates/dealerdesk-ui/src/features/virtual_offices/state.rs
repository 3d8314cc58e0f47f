//! Virtual office form and edit permissions.
//!
//! # Design
//! - Only root users see the template type and screen placement inputs;
//!   company admins edit the name and media.
//! - Non-root users need the `Avatars` company feature to edit an office.

use dealerdesk_api_models::{Role, User, VirtualOffice, VirtualOfficeInput};
use serde_json::{Map, Value};

use crate::core::validation::{FieldErrors, is_blank, parse_number};

/// Company feature that unlocks office editing for non-root users.
pub const AVATARS_FEATURE: &str = "Avatars";

/// Office templates, as `(value, label)`.
pub const OFFICE_TYPES: &[(&str, &str)] = &[
    ("default", "Default"),
    ("info", "Info"),
    ("service", "Service"),
];

/// Screen placement keys inside `configuration`.
pub const PLACEMENT_KEYS: [&str; 4] = ["x", "y", "width", "height"];

/// Whether `user` may open the edit dialog for `office`.
#[must_use]
pub fn can_edit(user: &User, office: &VirtualOffice) -> bool {
    if office.file_generation_in_progress {
        return false;
    }
    user.role == Role::Root || user.has_feature(AVATARS_FEATURE)
}

/// Whether `user` may delete offices.
#[must_use]
pub fn can_delete(user: &User) -> bool {
    user.role == Role::Root
}

/// Editable office fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VirtualOfficeForm {
    /// Display name.
    pub name: String,
    /// Template type.
    pub kind: String,
    /// Screen placement as typed, in [`PLACEMENT_KEYS`] order.
    pub placement: [String; 4],
}

impl VirtualOfficeForm {
    /// Prefill from a saved office.
    #[must_use]
    pub fn from_office(office: &VirtualOffice) -> Self {
        let placement = PLACEMENT_KEYS.map(|key| {
            office
                .configuration
                .as_ref()
                .and_then(|config| config.get(key))
                .map(|value| match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_default()
        });
        Self {
            name: office.name.clone(),
            kind: office.kind.clone().unwrap_or_default(),
            placement,
        }
    }

    /// Validate and build the request body.
    ///
    /// `with_layout` includes type and placement (root users only).
    ///
    /// # Errors
    ///
    /// Returns per-field messages when a rule fails.
    pub fn validate(&self, with_layout: bool) -> Result<VirtualOfficeInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check(is_blank(&self.name), "name", "Name is required");

        let mut configuration = Map::new();
        if with_layout {
            for (key, raw) in PLACEMENT_KEYS.iter().zip(&self.placement) {
                if is_blank(raw) {
                    continue;
                }
                match parse_number(raw) {
                    Some(number) => {
                        configuration.insert((*key).to_string(), Value::from(number));
                    }
                    None => errors.insert(placement_field(key), "Must be a number"),
                }
            }
        }

        errors.finish(|| VirtualOfficeInput {
            name: self.name.trim().to_string(),
            kind: with_layout
                .then(|| self.kind.trim().to_string())
                .filter(|kind| !kind.is_empty()),
            configuration: (with_layout && !configuration.is_empty())
                .then_some(Value::Object(configuration)),
        })
    }
}

fn placement_field(key: &str) -> &'static str {
    match key {
        "x" => "configuration.x",
        "y" => "configuration.y",
        "width" => "configuration.width",
        _ => "configuration.height",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::sample_user;
    use dealerdesk_api_models::{Feature, UserCompany};
    use serde_json::json;
    use uuid::Uuid;

    fn office(in_progress: bool) -> VirtualOffice {
        VirtualOffice {
            id: Uuid::new_v4(),
            name: "Showroom".into(),
            kind: Some("info".into()),
            configuration: Some(json!({"x": 10, "y": 20, "width": 300, "height": 200})),
            background_url: None,
            avatar_url: None,
            file_generation_in_progress: in_progress,
        }
    }

    #[test]
    fn admins_need_the_avatars_feature() {
        let mut admin = sample_user(Role::Admin);
        assert!(!can_edit(&admin, &office(false)));
        admin.company = Some(UserCompany {
            id: Uuid::new_v4(),
            features: vec![Feature {
                id: Uuid::new_v4(),
                name: AVATARS_FEATURE.into(),
                description: None,
            }],
        });
        assert!(can_edit(&admin, &office(false)));
        assert!(!can_edit(&admin, &office(true)));
        assert!(!can_delete(&admin));
        assert!(can_edit(&sample_user(Role::Root), &office(false)));
    }

    #[test]
    fn layout_round_trips_through_the_form() {
        let form = VirtualOfficeForm::from_office(&office(false));
        assert_eq!(form.placement[2], "300");
        let input = form.validate(true).expect("valid");
        assert_eq!(input.kind.as_deref(), Some("info"));
        assert_eq!(
            input.configuration,
            Some(json!({"x": 10.0, "y": 20.0, "width": 300.0, "height": 200.0}))
        );
    }

    #[test]
    fn admins_only_send_the_name() {
        let form = VirtualOfficeForm::from_office(&office(false));
        let input = form.validate(false).expect("valid");
        assert_eq!(input.kind, None);
        assert_eq!(input.configuration, None);
    }

    #[test]
    fn placement_must_be_numeric() {
        let mut form = VirtualOfficeForm {
            name: "Lobby".into(),
            ..VirtualOfficeForm::default()
        };
        form.placement[1] = "top".into();
        let errors = form.validate(true).expect_err("invalid");
        assert_eq!(errors.get("configuration.y"), Some("Must be a number"));
    }
}
