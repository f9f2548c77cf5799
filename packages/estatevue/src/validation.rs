//! Per-step validation for the listing wizard.
//!
//! Pure functions from a [`Draft`] to a [`FieldErrors`] map. An empty map
//! means the step is valid.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::draft::Draft;

/// Wizard step. Steps are always visited in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum WizardStep {
    #[default]
    BasicInfo,
    Location,
    Features,
    Images,
}

impl WizardStep {
    pub const FIRST: WizardStep = WizardStep::BasicInfo;
    pub const LAST: WizardStep = WizardStep::Images;

    pub fn number(&self) -> u8 {
        match self {
            WizardStep::BasicInfo => 1,
            WizardStep::Location => 2,
            WizardStep::Features => 3,
            WizardStep::Images => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(WizardStep::BasicInfo),
            2 => Some(WizardStep::Location),
            3 => Some(WizardStep::Features),
            4 => Some(WizardStep::Images),
            _ => None,
        }
    }

    /// Following step, capped at the last one.
    pub fn next(&self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(Self::LAST)
    }

    /// Preceding step, floored at the first one.
    pub fn previous(&self) -> Self {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(Self::FIRST)
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "Basic Info",
            WizardStep::Location => "Location",
            WizardStep::Features => "Features",
            WizardStep::Images => "Images",
        }
    }

    pub fn all() -> [WizardStep; 4] {
        [
            WizardStep::BasicInfo,
            WizardStep::Location,
            WizardStep::Features,
            WizardStep::Images,
        ]
    }
}

/// A validated draft field. Errors are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Title,
    Description,
    Price,
    PropertyType,
    Address,
    City,
    State,
    Zip,
    Bedrooms,
    Bathrooms,
    SquareFeet,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Price => "price",
            Field::PropertyType => "propertyType",
            Field::Address => "address",
            Field::City => "city",
            Field::State => "state",
            Field::Zip => "zip",
            Field::Bedrooms => "bedrooms",
            Field::Bathrooms => "bathrooms",
            Field::SquareFeet => "squareFeet",
        }
    }

    /// Step on which the field is entered.
    pub fn step(&self) -> WizardStep {
        match self {
            Field::Title | Field::Description | Field::Price | Field::PropertyType => {
                WizardStep::BasicInfo
            }
            Field::Address | Field::City | Field::State | Field::Zip => WizardStep::Location,
            Field::Bedrooms | Field::Bathrooms | Field::SquareFeet => WizardStep::Features,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name to error message. Ordered so rendering is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Remove the error for one field. Returns whether one was present.
    pub fn clear(&mut self, field: Field) -> bool {
        self.0.remove(&field).is_some()
    }

    pub fn merge(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }
}

/// Validate the fields belonging to `step`.
pub fn validate_step(step: WizardStep, draft: &Draft) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match step {
        WizardStep::BasicInfo => {
            require(&mut errors, Field::Title, &draft.title, "Title is required");
            require(
                &mut errors,
                Field::Description,
                &draft.description,
                "Description is required",
            );
            if is_blank(&draft.price) {
                errors.insert(Field::Price, "Price is required");
            } else if parse_price(&draft.price).is_none() {
                errors.insert(Field::Price, "Price must be a number greater than 0");
            }
        }
        WizardStep::Location => {
            require(&mut errors, Field::Address, &draft.address, "Address is required");
            require(&mut errors, Field::City, &draft.city, "City is required");
            require(&mut errors, Field::State, &draft.state, "State is required");
            require(&mut errors, Field::Zip, &draft.zip, "ZIP code is required");
        }
        WizardStep::Features => {
            if is_blank(&draft.bedrooms) {
                errors.insert(Field::Bedrooms, "Bedrooms is required");
            } else if parse_count(&draft.bedrooms).is_none() {
                errors.insert(Field::Bedrooms, "Bedrooms must be a whole number of 0 or more");
            }

            if is_blank(&draft.bathrooms) {
                errors.insert(Field::Bathrooms, "Bathrooms is required");
            } else if parse_bathrooms(&draft.bathrooms).is_none() {
                errors.insert(
                    Field::Bathrooms,
                    "Bathrooms must be 0 or more, in whole or half steps",
                );
            }

            if is_blank(&draft.square_feet) {
                errors.insert(Field::SquareFeet, "Square feet is required");
            } else if parse_area(&draft.square_feet).is_none() {
                errors.insert(
                    Field::SquareFeet,
                    "Square feet must be a whole number greater than 0",
                );
            }
        }
        // Images are optional.
        WizardStep::Images => {}
    }

    errors
}

/// Validate every step. Returns the first failing step and the errors of
/// all failing steps, or `None` when the whole draft is valid.
pub fn first_invalid_step(draft: &Draft) -> Option<(WizardStep, FieldErrors)> {
    let mut first = None;
    let mut all = FieldErrors::new();

    for step in WizardStep::all() {
        let errors = validate_step(step, draft);
        if !errors.is_empty() {
            first.get_or_insert(step);
            all.merge(errors);
        }
    }

    first.map(|step| (step, all))
}

fn require(errors: &mut FieldErrors, field: Field, value: &str, message: &str) {
    if is_blank(value) {
        errors.insert(field, message);
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub(crate) fn parse_price(value: &str) -> Option<Decimal> {
    Decimal::from_str(value.trim())
        .ok()
        .filter(|price| price.is_sign_positive() && !price.is_zero())
}

pub(crate) fn parse_count(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

pub(crate) fn parse_area(value: &str) -> Option<u32> {
    parse_count(value).filter(|area| *area > 0)
}

pub(crate) fn parse_bathrooms(value: &str) -> Option<Decimal> {
    let bathrooms = Decimal::from_str(value.trim()).ok()?;
    if bathrooms.is_sign_negative() && !bathrooms.is_zero() {
        return None;
    }
    bathrooms
        .checked_mul(Decimal::TWO)?
        .fract()
        .is_zero()
        .then_some(bathrooms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::DraftEdit;

    fn draft_with(edits: Vec<DraftEdit>) -> Draft {
        let mut draft = Draft::default();
        for edit in edits {
            draft.apply(edit);
        }
        draft
    }

    fn valid_draft() -> Draft {
        draft_with(vec![
            DraftEdit::Title("Modern Waterfront Villa".into()),
            DraftEdit::Description("Four bedrooms on the bay".into()),
            DraftEdit::Price("1250000".into()),
            DraftEdit::Address("1 Ocean Dr".into()),
            DraftEdit::City("Miami".into()),
            DraftEdit::State("FL".into()),
            DraftEdit::Zip("33139".into()),
            DraftEdit::Bedrooms("4".into()),
            DraftEdit::Bathrooms("3".into()),
            DraftEdit::SquareFeet("2800".into()),
        ])
    }

    #[test]
    fn test_step_navigation_caps_and_floors() {
        assert_eq!(WizardStep::BasicInfo.next(), WizardStep::Location);
        assert_eq!(WizardStep::Images.next(), WizardStep::Images);
        assert_eq!(WizardStep::BasicInfo.previous(), WizardStep::BasicInfo);
        assert_eq!(WizardStep::Features.previous(), WizardStep::Location);
        assert_eq!(WizardStep::from_number(0), None);
        assert_eq!(WizardStep::from_number(5), None);
    }

    #[test]
    fn test_empty_draft_fails_every_required_step() {
        let draft = Draft::default();

        let basic = validate_step(WizardStep::BasicInfo, &draft);
        assert_eq!(
            basic.fields().collect::<Vec<_>>(),
            vec![Field::Title, Field::Description, Field::Price]
        );

        let location = validate_step(WizardStep::Location, &draft);
        assert_eq!(location.len(), 4);

        let features = validate_step(WizardStep::Features, &draft);
        assert_eq!(
            features.fields().collect::<Vec<_>>(),
            vec![Field::Bedrooms, Field::Bathrooms, Field::SquareFeet]
        );
    }

    #[test]
    fn test_images_step_is_always_valid() {
        assert!(validate_step(WizardStep::Images, &Draft::default()).is_empty());
        assert!(validate_step(WizardStep::Images, &valid_draft()).is_empty());
    }

    #[test]
    fn test_valid_draft_passes_every_step() {
        let draft = valid_draft();
        for step in WizardStep::all() {
            assert!(validate_step(step, &draft).is_empty(), "step {:?}", step);
        }
        assert!(first_invalid_step(&draft).is_none());
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let mut draft = valid_draft();
        draft.apply(DraftEdit::Price("-5".into()));

        let errors = validate_step(WizardStep::BasicInfo, &draft);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Price), Some("Price must be a number greater than 0"));
    }

    #[test]
    fn test_price_must_be_numeric_and_nonzero() {
        for bad in ["abc", "0", "0.00", "-0.5"] {
            let mut draft = valid_draft();
            draft.apply(DraftEdit::Price(bad.into()));
            assert!(
                validate_step(WizardStep::BasicInfo, &draft).contains(Field::Price),
                "price {:?} should fail",
                bad
            );
        }

        let mut draft = valid_draft();
        draft.apply(DraftEdit::Price(" 99.99 ".into()));
        assert!(validate_step(WizardStep::BasicInfo, &draft).is_empty());
    }

    #[test]
    fn test_whitespace_only_is_missing() {
        let mut draft = valid_draft();
        draft.apply(DraftEdit::City("   ".into()));

        let errors = validate_step(WizardStep::Location, &draft);
        assert_eq!(errors.get(Field::City), Some("City is required"));
    }

    #[test]
    fn test_zip_has_no_format_check() {
        let mut draft = valid_draft();
        draft.apply(DraftEdit::Zip("not-a-zip".into()));
        assert!(validate_step(WizardStep::Location, &draft).is_empty());
    }

    #[test]
    fn test_features_step_accepts_half_bathrooms() {
        let mut draft = valid_draft();
        draft.apply(DraftEdit::Bedrooms("2".into()));
        draft.apply(DraftEdit::Bathrooms("1.5".into()));
        draft.apply(DraftEdit::SquareFeet("1200".into()));

        assert!(validate_step(WizardStep::Features, &draft).is_empty());
    }

    #[test]
    fn test_features_step_rejects_bad_numbers() {
        let mut draft = valid_draft();
        draft.apply(DraftEdit::Bedrooms("-1".into()));
        draft.apply(DraftEdit::Bathrooms("1.25".into()));
        draft.apply(DraftEdit::SquareFeet("0".into()));

        let errors = validate_step(WizardStep::Features, &draft);
        assert!(errors.contains(Field::Bedrooms));
        assert!(errors.contains(Field::Bathrooms));
        assert!(errors.contains(Field::SquareFeet));
    }

    #[test]
    fn test_bathrooms_beyond_decimal_range_is_a_field_error() {
        let mut draft = valid_draft();
        draft.apply(DraftEdit::Bathrooms("79228162514264337593543950335".into()));

        let errors = validate_step(WizardStep::Features, &draft);
        assert_eq!(
            errors.get(Field::Bathrooms),
            Some("Bathrooms must be 0 or more, in whole or half steps")
        );
        assert!(first_invalid_step(&draft).is_some());
    }

    #[test]
    fn test_zero_bedrooms_and_bathrooms_are_allowed() {
        let mut draft = valid_draft();
        draft.apply(DraftEdit::Bedrooms("0".into()));
        draft.apply(DraftEdit::Bathrooms("0".into()));

        assert!(validate_step(WizardStep::Features, &draft).is_empty());
    }

    #[test]
    fn test_first_invalid_step_reports_earliest() {
        let mut draft = valid_draft();
        draft.apply(DraftEdit::SquareFeet(String::new()));
        draft.apply(DraftEdit::Zip(String::new()));

        let (step, errors) = first_invalid_step(&draft).expect("draft should be invalid");
        assert_eq!(step, WizardStep::Location);
        assert!(errors.contains(Field::Zip));
        assert!(errors.contains(Field::SquareFeet));
    }

    #[test]
    fn test_errors_serialize_with_field_names() {
        let errors = validate_step(WizardStep::Features, &Draft::default());
        let json = serde_json::to_value(&errors).unwrap();
        assert!(json.get("squareFeet").is_some());
        assert!(json.get("bedrooms").is_some());
    }
}
