//! Converters exercised through models, the way schemas use them.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use docview::{
    Field, Model, ModelOptions, Registry, Schema,
    convert::{BoolStyle, ConversionService, DateFormat, Tristate, from_fn},
};
use serde_json::{Value, json};

use crate::helpers::*;

struct Flags {
    plain: Field<bool>,
    yes_no: Field<bool>,
    letter: Field<bool>,
    numeric: Field<bool>,
    maybe: Field<Tristate>,
    maybe_letter: Field<Tristate>,
}

impl Schema for Flags {
    fn register(fields: &mut Registry) -> Self {
        Flags {
            plain: fields.boolean("plain", false, BoolStyle::Boolean),
            yes_no: fields.boolean("yesNo", false, BoolStyle::YesNo),
            letter: fields.boolean("letter", true, BoolStyle::TrueFalse),
            numeric: fields.boolean("numeric", false, BoolStyle::Numeric),
            maybe: fields.tristate("maybe", BoolStyle::Boolean),
            maybe_letter: fields.tristate("maybeLetter", BoolStyle::TrueFalse),
        }
    }
}

#[test]
fn test_boolean_spellings() {
    let data = json!({
        "plain": "Yes",
        "yesNo": "true",
        "letter": "n",
        "numeric": 2,
        "maybe": "F",
        "maybeLetter": "t"
    });
    let model = Model::<Flags>::from_value(data, true).unwrap();
    assert!(model.plain.value());
    assert!(model.yes_no.value());
    assert!(!model.letter.value());
    assert!(model.numeric.value());
    assert_eq!(model.maybe.value(), Tristate::False);
    assert_eq!(model.maybe_letter.value(), Tristate::True);

    let output = model.current_data(false, true);
    assert_eq!(output["plain"], true);
    assert_eq!(output["yesNo"], "yes");
    assert_eq!(output["letter"], "F");
    assert_eq!(output["numeric"], 1);
    assert_eq!(output["maybe"], false);
    assert_eq!(output["maybeLetter"], "T");
}

#[test]
fn test_tristate_not_set() {
    let model = Model::<Flags>::from_value(json!({}), true).unwrap();
    assert_eq!(model.maybe.value(), Tristate::NotSet);
    assert!(!model.maybe.value().is_set());
    assert!(model.maybe.value().or(true));
    assert!(model.letter.value());

    let output = model.current_data(false, true);
    assert!(!output.contains_key("maybe"));
    assert_eq!(output["letter"], "T");

    model.maybe.set(Tristate::from(true)).unwrap();
    assert_eq!(model.current_data(false, true)["maybe"], true);
    model.maybe.set(Tristate::NotSet).unwrap();
    assert!(!model.current_data(false, true).contains_key("maybe"));
}

#[test]
fn test_unusable_boolean_reads_default() {
    let model = Model::<Flags>::from_value(json!({"letter": "", "plain": [1]}), false).unwrap();
    assert!(model.letter.value());
    assert!(!model.letter.has_value());
    assert!(!model.plain.value());
}

struct Upper {
    code: Field<String>,
}

impl Schema for Upper {
    fn register(fields: &mut Registry) -> Self {
        Upper {
            code: fields.convert(
                "code",
                String::new(),
                from_fn(
                    |value: &Value| value.as_str().map(str::to_uppercase),
                    |native: &String| Some(json!(native.to_lowercase())),
                ),
            ),
        }
    }
}

#[test]
fn test_custom_converter() {
    let model = Model::<Upper>::from_json(r#"{"code": "abc"}"#, true).unwrap();
    assert_eq!(model.code.value(), "ABC");
    model.code.set("XYZ".into()).unwrap();
    assert_eq!(model.current_data(false, true)["code"], "xyz");

    let model = Model::<Upper>::from_json(r#"{"code": 5}"#, false).unwrap();
    assert!(!model.code.has_value());
}

struct Stamped {
    at: Field<Option<DateTime<Utc>>>,
}

impl Schema for Stamped {
    fn register(fields: &mut Registry) -> Self {
        Stamped {
            at: fields.date("at", DateFormat::Dashes),
        }
    }
}

#[test]
fn test_date_fallback_and_preferred_output() {
    for text in [
        "2018-02-15",
        "2018/02/15",
        "20180215",
        "2018-02-15T00:00:00Z",
        "Thu Feb 15 2018 00:00:00 GMT",
    ] {
        let model = Model::<Stamped>::from_value(json!({"at": text}), false).unwrap();
        assert_eq!(
            model.current_data(false, true)["at"],
            "2018-02-15",
            "failed for {text}"
        );
    }

    let model = Model::<Stamped>::from_value(json!({"at": 20180215}), false).unwrap();
    let at = model.at.value().unwrap();
    assert_eq!((at.year(), at.month(), at.day()), (2018, 2, 15));

    let model = Model::<Stamped>::from_value(json!({"at": "someday"}), false).unwrap();
    assert_eq!(model.at.value(), None);
}

#[test]
fn test_injected_conversion_service() {
    let service = Arc::new(ConversionService::new().with_fallback_order(vec![DateFormat::Dashes]));
    let options = ModelOptions::new().conversions(Arc::clone(&service));

    // Slashes is neither preferred nor in the fallback order.
    let model = Model::<Stamped>::from_value_with(json!({"at": "2018/02/15"}), &options).unwrap();
    assert_eq!(model.at.value(), None);

    let model = Model::<Stamped>::from_value_with(json!({"at": "2018-02-15"}), &options).unwrap();
    assert!(model.at.value().is_some());
    assert_eq!(service.memo_len(), 2);

    // Copies keep using the injected service.
    let copy = model.mutable_copy();
    copy.at.clear();
    assert!(copy.at.value().is_some());
    assert_eq!(service.memo_len(), 2);
}

#[test]
fn test_enum_labels() {
    let data = document(json!({"rewardLevel": "Diamond", "oldRewardLevel": "Platinum"}));
    let model = Model::<Customer>::new(data, true);
    assert_eq!(model.reward_level.value(), RewardLevel::Bronze);
    assert!(!model.reward_level.has_value());
    assert_eq!(model.old_reward_level.value(), RewardLevel::Platinum);

    model.reward_level.set(RewardLevel::Gold).unwrap();
    let output = model.current_data(false, true);
    assert_eq!(output["rewardLevel"], "Gold");
    assert_eq!(output["oldRewardLevel"], "Platinum");
}

#[test]
fn test_lenient_numbers() {
    let data = document(json!({
        "numberOfPurchases": "42",
        "numberOfReturns": 2.5,
        "score1": -2.5,
        "conversionRate": "0.75",
        "preciseConvRate": "lots"
    }));
    let model = Model::<Customer>::new(data, false);
    assert_eq!(model.num_purchases.value(), 42);
    assert_eq!(model.num_returns.value(), Some(3));
    assert_eq!(model.first_score.value(), -3);
    assert!(approx_eq(model.conversion_rate.value(), 0.75));
    assert!(!model.precise_rate.has_value());

    let output = model.current_data(false, true);
    assert_eq!(output["numberOfPurchases"], 42);
    assert_eq!(output["score1"], "-3");
}
