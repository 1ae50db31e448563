//! Shared fixtures for the model benchmarks

use docview::{Document, Field, Registry, Schema};
use serde_json::{Value, json};

/// Twenty fields over three levels of nesting.
pub struct Person {
    pub first_name: Field<String>,
    pub last_name: Field<String>,
    pub email: Field<String>,
    pub phone: Field<String>,
    pub age: Field<i64>,
    pub score: Field<f64>,
    pub is_active: Field<bool>,
    pub rating: Field<f64>,
    pub bio: Field<String>,
    pub username: Field<String>,
    pub city: Field<String>,
    pub street: Field<String>,
    pub zip: Field<String>,
    pub state: Field<String>,
    pub country: Field<String>,
    pub lat: Field<f64>,
    pub lon: Field<f64>,
    pub tagline: Field<String>,
    pub website: Field<String>,
    pub follower_count: Field<i64>,
}

impl Schema for Person {
    fn register(fields: &mut Registry) -> Self {
        Person {
            first_name: fields.field("first_name", String::new()),
            last_name: fields.field("last_name", String::new()),
            email: fields.field("email", String::new()),
            phone: fields.field("phone_number", String::new()),
            age: fields.int("age", 0),
            score: fields.float("score", 0.0),
            is_active: fields.field("is_active", false),
            rating: fields.float("rating", 0.0),
            bio: fields.field("biography", String::new()),
            username: fields.field("username", String::new()),
            city: fields.field("address.city", String::new()),
            street: fields.field("address.street", String::new()),
            zip: fields.field("address.zip_code", String::new()),
            state: fields.field("address.state", String::new()),
            country: fields.field("address.country", String::new()),
            lat: fields.float("address.coordinates.latitude", 0.0),
            lon: fields.float("address.coordinates.longitude", 0.0),
            tagline: fields.field("profile.tagline", String::new()),
            website: fields.field("profile.website", String::new()),
            follower_count: fields.int("profile.stats.followers", 0),
        }
    }
}

/// Builds the person document, varying the identifying fields by `seed`.
pub fn person_data(seed: usize) -> Document {
    let value = json!({
        "first_name": format!("John {seed}"),
        "last_name": "Appleseed",
        "email": format!("john{seed}@apple.com"),
        "phone_number": "1-800-MY-APPLE",
        "age": 69,
        "score": 9001.0,
        "is_active": true,
        "rating": 5.0,
        "biography": "Sent from my iPhone",
        "username": "john.appleseed",
        "address": {
            "city": "Cupertino",
            "street": "1 Apple Park Way",
            "zip_code": "95014",
            "state": "CA",
            "country": "US",
            "coordinates": {"latitude": 37.3349, "longitude": -122.009}
        },
        "profile": {
            "tagline": "Think different",
            "website": "https://apple.com",
            "stats": {"followers": 1000000000}
        }
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!("fixture is an object"),
    }
}

/// The same document as JSON text.
pub fn person_json(seed: usize) -> String {
    serde_json::to_string(&person_data(seed)).expect("Failed to encode fixture")
}
